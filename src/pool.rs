//! Host collection: one `hostpool.info` call materialized into typed hosts.

use tracing::debug;

use crate::host::{self, Host};
use crate::xml;
use crate::{Client, OcaError};

/// Root tag of the batch document.
pub const POOL_ELEMENT_NAME: &str = "HOST_POOL";

/// Wire-level name of the pool info method.
pub const POOL_INFO_METHOD: &str = "hostpool.info";

/// Fetches the registered hosts from the service.
pub struct HostPool<'a, C: Client + ?Sized> {
    client: &'a C,
}

impl<'a, C: Client + ?Sized> HostPool<'a, C> {
    /// Bind the pool to a transport handle.
    pub fn new(client: &'a C) -> Self {
        HostPool { client }
    }

    /// Fetch the full host list.
    ///
    /// Issues one `hostpool.info` call and builds one [`Host`] per `HOST`
    /// fragment of the returned batch document, in document order. An empty
    /// pool is a valid empty vector, not an error.
    pub fn info(&self) -> Result<Vec<Host<'a, C>>, OcaError> {
        debug!(method = POOL_INFO_METHOD, "remote call");
        let body = self.client.call(POOL_INFO_METHOD, &[])?.into_body()?;
        let root = xml::parse(&body)?;
        if root.name != POOL_ELEMENT_NAME {
            return Err(OcaError::Parse(format!(
                "expected <{POOL_ELEMENT_NAME}> document, got <{}>",
                root.name
            )));
        }
        root.children
            .into_iter()
            .filter(|child| child.name == host::ELEMENT_NAME)
            .map(|child| Host::from_element(self.client, child))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClient;
    use crate::{CallArg, Response};

    fn host_fragment(id: i64, name: &str, state: i64) -> String {
        format!(
            "<HOST><ID>{id}</ID><NAME>{name}</NAME><STATE>{state}</STATE>\
             <IM_MAD>kvm</IM_MAD><VM_MAD>kvm</VM_MAD><LAST_MON_TIME>0</LAST_MON_TIME>\
             <CLUSTER>default</CLUSTER><CLUSTER_ID>0</CLUSTER_ID>\
             <VMS><ID>{}</ID></VMS></HOST>",
            id * 10
        )
    }

    fn pool_body(fragments: &[String]) -> String {
        format!("<HOST_POOL>{}</HOST_POOL>", fragments.concat())
    }

    #[test]
    fn empty_pool_is_a_valid_empty_vector() {
        let client = MockClient::answering(Response::Body("<HOST_POOL></HOST_POOL>".into()));
        let hosts = HostPool::new(&client).info().unwrap();
        assert!(hosts.is_empty());
        assert_eq!(
            client.calls(),
            vec![("hostpool.info".to_string(), Vec::<CallArg>::new())]
        );
    }

    #[test]
    fn single_fragment_matches_single_host_construction() {
        let fragment = host_fragment(7, "node01", 2);
        let client = MockClient::answering(Response::Body(pool_body(&[fragment.clone()])));
        let hosts = HostPool::new(&client).info().unwrap();
        assert_eq!(hosts.len(), 1);

        let single = Host::parse(&client, &fragment).unwrap();
        assert_eq!(hosts[0].id(), single.id());
        assert_eq!(hosts[0].name(), single.name());
        assert_eq!(hosts[0].state_code(), single.state_code());
        assert_eq!(hosts[0].vm_ids(), single.vm_ids());
    }

    #[test]
    fn three_fragments_come_back_in_document_order() {
        let fragments = [
            host_fragment(3, "gamma", 2),
            host_fragment(1, "alpha", 4),
            host_fragment(2, "beta", 3),
        ];
        let client = MockClient::answering(Response::Body(pool_body(&fragments)));
        let hosts = HostPool::new(&client).info().unwrap();
        let ids: Vec<Option<i64>> = hosts.iter().map(|h| h.id()).collect();
        assert_eq!(ids, vec![Some(3), Some(1), Some(2)]);
        let names: Vec<&str> = hosts.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["gamma", "alpha", "beta"]);
    }

    #[test]
    fn foreign_children_are_skipped() {
        let body = format!(
            "<HOST_POOL><QUOTAS/>{}<QUOTAS/></HOST_POOL>",
            host_fragment(5, "node05", 0)
        );
        let client = MockClient::answering(Response::Body(body));
        let hosts = HostPool::new(&client).info().unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].id(), Some(5));
    }

    #[test]
    fn pool_root_mismatch_is_a_parse_error() {
        let client = MockClient::answering(Response::Body("<VM_POOL></VM_POOL>".into()));
        let err = HostPool::new(&client).info().unwrap_err();
        assert!(matches!(err, OcaError::Parse(_)));
    }

    #[test]
    fn pool_faults_propagate_unmodified() {
        let client = MockClient::new();
        client.push(Err(OcaError::Fault("authentication required".into())));
        let err = HostPool::new(&client).info().unwrap_err();
        assert!(matches!(err, OcaError::Fault(_)));
    }

    #[test]
    fn fetched_hosts_can_issue_their_own_calls() {
        let client = MockClient::answering(Response::Body(pool_body(&[host_fragment(
            4, "node04", 2,
        )])));
        let hosts = HostPool::new(&client).info().unwrap();
        hosts[0].disable().unwrap();
        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(
            calls[1],
            ("host.status".to_string(), vec![4i64.into(), 1i64.into()])
        );
    }
}
