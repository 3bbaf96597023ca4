//! Client bindings for the OpenNebula XML-RPC management API, host subset.
//!
//! The crate wraps the wire protocol in thin typed objects: [`Host`] is one
//! managed hypervisor host backed by a parsed XML snapshot, [`HostPool`]
//! materializes the whole host list from a single `hostpool.info` call, and
//! [`Template`] gives key/value access to the free-form template sections the
//! service embeds in every host document.
//!
//! The transport is not part of this crate. Callers implement [`Client`] on
//! top of whatever XML-RPC stack they already use and inject it; every
//! operation here is a single synchronous call through that handle.
//!
//! ```rust,no_run
//! use oca::{CallArg, Client, Host, HostPool, OcaError, Response};
//!
//! # struct Rpc;
//! # impl Client for Rpc {
//! #     fn call(&self, _method: &str, _args: &[CallArg]) -> Result<Response, OcaError> {
//! #         Ok(Response::Empty)
//! #     }
//! # }
//! # fn run() -> Result<(), OcaError> {
//! let client = Rpc;
//! let id = Host::allocate(&client, "node01", "kvm", "kvm", "shared")?;
//! println!("allocated host {id}");
//! for host in HostPool::new(&client).info()? {
//!     println!("{} [{}]", host.name(), host.short_state()?);
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod host;
pub mod pool;
pub mod template;
pub mod xml;

#[cfg(test)]
pub(crate) mod testing;

pub use host::{Host, HostMethod, HostState, ShortState};
pub use pool::HostPool;
pub use template::Template;
pub use xml::{parse, Element};

/// Error type produced by every operation in this crate.
#[derive(Debug, Error)]
pub enum OcaError {
    /// The remote service rejected or could not complete a call. Propagated
    /// verbatim from the transport, never retried.
    #[error("remote fault: {0}")]
    Fault(String),
    /// An expected XML field is missing or malformed.
    #[error("parse error: {0}")]
    Parse(String),
    /// A host state code outside the canonical `[0, 8]` range.
    #[error("host state {0} out of range")]
    State(i64),
    /// The transport returned a value of the wrong shape for the operation.
    #[error("unexpected response: {0}")]
    Response(String),
    /// An id-scoped operation was attempted on a host whose XML carried no id.
    #[error("host has no id")]
    MissingId,
}

/// Synchronous transport handle used to issue remote procedure calls.
///
/// Implementations are expected to block until the service answers and to
/// surface faults as [`OcaError::Fault`]. The crate never retries, never
/// caches, and never mutates the handle; thread safety of concurrent calls is
/// the implementation's concern.
pub trait Client {
    /// Issue one remote call and return its result or fault.
    fn call(&self, method: &str, args: &[CallArg]) -> Result<Response, OcaError>;
}

/// One positional argument of a remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    /// Integer argument (ids, status codes, flags).
    Int(i64),
    /// String argument (names, driver names, template bodies).
    Str(String),
}

impl From<i64> for CallArg {
    fn from(value: i64) -> Self {
        CallArg::Int(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        CallArg::Str(value.to_string())
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        CallArg::Str(value)
    }
}

/// Result value of a successful remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The call succeeded and carries no payload (`host.status`, `host.update`).
    Empty,
    /// Integer payload (`host.allocate` returns the new id).
    Int(i64),
    /// XML document payload (`host.info`, `hostpool.info`).
    Body(String),
}

impl Response {
    /// Consume the response expecting an integer payload.
    pub fn into_int(self) -> Result<i64, OcaError> {
        match self {
            Response::Int(value) => Ok(value),
            other => Err(OcaError::Response(format!(
                "expected integer result, got {other:?}"
            ))),
        }
    }

    /// Consume the response expecting an XML document payload.
    pub fn into_body(self) -> Result<String, OcaError> {
        match self {
            Response::Body(body) => Ok(body),
            other => Err(OcaError::Response(format!(
                "expected XML body, got {other:?}"
            ))),
        }
    }
}
