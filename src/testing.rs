//! Mock transport shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::{CallArg, Client, OcaError, Response};

/// Records every call and answers from a scripted queue. When the queue runs
/// dry it answers [`Response::Empty`], which is what the status-style methods
/// expect anyway.
#[derive(Default)]
pub(crate) struct MockClient {
    calls: RefCell<Vec<(String, Vec<CallArg>)>>,
    responses: RefCell<VecDeque<Result<Response, OcaError>>>,
}

impl MockClient {
    pub fn new() -> Self {
        MockClient::default()
    }

    pub fn answering(response: Response) -> Self {
        let mock = MockClient::new();
        mock.push(Ok(response));
        mock
    }

    pub fn push(&self, response: Result<Response, OcaError>) {
        self.responses.borrow_mut().push_back(response);
    }

    pub fn calls(&self) -> Vec<(String, Vec<CallArg>)> {
        self.calls.borrow().clone()
    }
}

impl Client for MockClient {
    fn call(&self, method: &str, args: &[CallArg]) -> Result<Response, OcaError> {
        self.calls
            .borrow_mut()
            .push((method.to_string(), args.to_vec()));
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or(Ok(Response::Empty))
    }
}
