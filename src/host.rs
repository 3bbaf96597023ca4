//! Single host entity: typed view over one `HOST` XML document plus the
//! remote operations scoped to it.

use std::fmt;

use tracing::debug;

use crate::template::Template;
use crate::xml::{self, Element};
use crate::{CallArg, Client, OcaError};

/// Root tag of a host document on the wire.
pub const ELEMENT_NAME: &str = "HOST";

/// Cluster id the service treats as "no cluster".
pub const DEFAULT_CLUSTER_ID: i64 = -1;

/// Remote procedures available for a single host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostMethod {
    /// Fetch one host document.
    Info,
    /// Register a new host.
    Allocate,
    /// Remove a host from the host list.
    Delete,
    /// Change the host status (enable/disable/offline).
    Status,
    /// Replace or merge the host template.
    Update,
}

impl HostMethod {
    /// Wire-level method name, verbatim as the service expects it.
    pub const fn wire_name(self) -> &'static str {
        match self {
            HostMethod::Info => "host.info",
            HostMethod::Allocate => "host.allocate",
            HostMethod::Delete => "host.delete",
            HostMethod::Status => "host.status",
            HostMethod::Update => "host.update",
        }
    }
}

/// Status codes accepted by `host.status`.
///
/// Code 2 is reserved by the service and intentionally absent here.
pub mod status {
    /// Enable the host.
    pub const ENABLE: i64 = 0;
    /// Disable the host.
    pub const DISABLE: i64 = 1;
    /// Mark the host as fully offline.
    pub const OFFLINE: i64 = 3;
}

/// Flag values for the third argument of `host.update`.
mod update_flag {
    /// Merge the payload into the existing template.
    pub const MERGE: i64 = 1;
    /// Replace the template wholesale.
    pub const REPLACE: i64 = 0;
}

/// Monitoring lifecycle state of a host.
///
/// Transitions are driven entirely by the remote service; this client only
/// observes the state and nudges it through the three status calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostState {
    /// Initial state for enabled hosts.
    Init,
    /// Monitoring the host (from monitored).
    MonitoringMonitored,
    /// The host has been successfully monitored.
    Monitored,
    /// An error occurred while monitoring the host.
    Error,
    /// The host is disabled.
    Disabled,
    /// Monitoring the host (from error).
    MonitoringError,
    /// Monitoring the host (from init).
    MonitoringInit,
    /// Monitoring the host (from disabled).
    MonitoringDisabled,
    /// The host is totally offline.
    Offline,
}

/// Every canonical host state, in wire-code order.
pub const HOST_STATES: [HostState; 9] = [
    HostState::Init,
    HostState::MonitoringMonitored,
    HostState::Monitored,
    HostState::Error,
    HostState::Disabled,
    HostState::MonitoringError,
    HostState::MonitoringInit,
    HostState::MonitoringDisabled,
    HostState::Offline,
];

impl HostState {
    /// Convert from the raw integer carried in the `STATE` field.
    pub fn from_code(code: i64) -> Result<Self, OcaError> {
        match code {
            0 => Ok(HostState::Init),
            1 => Ok(HostState::MonitoringMonitored),
            2 => Ok(HostState::Monitored),
            3 => Ok(HostState::Error),
            4 => Ok(HostState::Disabled),
            5 => Ok(HostState::MonitoringError),
            6 => Ok(HostState::MonitoringInit),
            7 => Ok(HostState::MonitoringDisabled),
            8 => Ok(HostState::Offline),
            other => Err(OcaError::State(other)),
        }
    }

    /// Raw wire code of this state.
    pub const fn code(self) -> i64 {
        match self {
            HostState::Init => 0,
            HostState::MonitoringMonitored => 1,
            HostState::Monitored => 2,
            HostState::Error => 3,
            HostState::Disabled => 4,
            HostState::MonitoringError => 5,
            HostState::MonitoringInit => 6,
            HostState::MonitoringDisabled => 7,
            HostState::Offline => 8,
        }
    }

    /// Canonical state name as used in service output.
    pub const fn name(self) -> &'static str {
        match self {
            HostState::Init => "INIT",
            HostState::MonitoringMonitored => "MONITORING_MONITORED",
            HostState::Monitored => "MONITORED",
            HostState::Error => "ERROR",
            HostState::Disabled => "DISABLED",
            HostState::MonitoringError => "MONITORING_ERROR",
            HostState::MonitoringInit => "MONITORING_INIT",
            HostState::MonitoringDisabled => "MONITORING_DISABLED",
            HostState::Offline => "OFFLINE",
        }
    }

    /// Three-valued summary of the state.
    pub const fn short(self) -> ShortState {
        match self {
            HostState::Error => ShortState::Err,
            HostState::Disabled | HostState::Offline => ShortState::Off,
            HostState::Init
            | HostState::MonitoringMonitored
            | HostState::Monitored
            | HostState::MonitoringError
            | HostState::MonitoringInit
            | HostState::MonitoringDisabled => ShortState::On,
        }
    }
}

impl fmt::Display for HostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Short host state summary shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShortState {
    /// The host is enabled and participating in monitoring.
    On,
    /// The host is disabled or offline.
    Off,
    /// Monitoring failed.
    Err,
}

impl ShortState {
    /// Listing representation: `on`, `off` or `err`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ShortState::On => "on",
            ShortState::Off => "off",
            ShortState::Err => "err",
        }
    }
}

impl fmt::Display for ShortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One managed host.
///
/// The instance is an immutable snapshot of the document the service returned
/// when it was built. Mutating operations only issue remote calls; observing
/// their effect requires fetching a fresh snapshot through [`Host::info`] or
/// [`HostPool::info`](crate::HostPool::info).
pub struct Host<'a, C: Client + ?Sized> {
    client: &'a C,
    id: Option<i64>,
    name: String,
    state: i64,
    im_mad: String,
    vm_mad: String,
    last_mon_time: i64,
    cluster: String,
    cluster_id: i64,
    vm_ids: Vec<i64>,
    template: Template,
    host_share: Template,
    xml: Element,
}

impl<'a, C: Client + ?Sized> Host<'a, C> {
    /// Build a host from an already parsed `HOST` element, converting every
    /// schema field eagerly.
    ///
    /// Only `ID` may be absent (the document then describes an unallocated
    /// shell); any other missing or malformed schema field is a parse error.
    pub fn from_element(client: &'a C, root: Element) -> Result<Self, OcaError> {
        if root.name != ELEMENT_NAME {
            return Err(OcaError::Parse(format!(
                "expected <{ELEMENT_NAME}> document, got <{}>",
                root.name
            )));
        }
        let vm_ids = match root.child("VMS") {
            Some(vms) => vms
                .children
                .iter()
                .map(|vm| xml::parse_int("VMS", &vm.text))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        Ok(Host {
            id: root.opt_int("ID")?,
            name: root.require_text("NAME")?.to_string(),
            state: root.require_int("STATE")?,
            im_mad: root.require_text("IM_MAD")?.to_string(),
            vm_mad: root.require_text("VM_MAD")?.to_string(),
            last_mon_time: root.require_int("LAST_MON_TIME")?,
            cluster: root.require_text("CLUSTER")?.to_string(),
            cluster_id: root.require_int("CLUSTER_ID")?,
            vm_ids,
            template: root
                .child("TEMPLATE")
                .cloned()
                .map(Template::new)
                .unwrap_or_default(),
            host_share: root
                .child("HOST_SHARE")
                .cloned()
                .map(Template::new)
                .unwrap_or_default(),
            xml: root,
            client,
        })
    }

    /// Build a host from the raw XML text of one `HOST` document.
    pub fn parse(client: &'a C, body: &str) -> Result<Self, OcaError> {
        Self::from_element(client, xml::parse(body)?)
    }

    /// Fetch one host by id through `host.info`.
    pub fn info(client: &'a C, id: i64) -> Result<Self, OcaError> {
        debug!(method = HostMethod::Info.wire_name(), id, "remote call");
        let body = client
            .call(HostMethod::Info.wire_name(), &[CallArg::Int(id)])?
            .into_body()?;
        Self::parse(client, &body)
    }

    /// Register a new host, outside any cluster. Returns the new host id.
    ///
    /// `im_mad`, `vm_mad` and `tm_mad` name the information, virtualization
    /// and transfer drivers the service should manage the host with. No local
    /// validation is attempted; the service is the source of truth and a
    /// fault means no host was created.
    pub fn allocate(
        client: &C,
        hostname: &str,
        im_mad: &str,
        vm_mad: &str,
        tm_mad: &str,
    ) -> Result<i64, OcaError> {
        Self::allocate_in_cluster(client, hostname, im_mad, vm_mad, tm_mad, DEFAULT_CLUSTER_ID)
    }

    /// Register a new host in the given cluster. Returns the new host id.
    pub fn allocate_in_cluster(
        client: &C,
        hostname: &str,
        im_mad: &str,
        vm_mad: &str,
        tm_mad: &str,
        cluster_id: i64,
    ) -> Result<i64, OcaError> {
        debug!(
            method = HostMethod::Allocate.wire_name(),
            hostname, cluster_id, "remote call"
        );
        client
            .call(
                HostMethod::Allocate.wire_name(),
                &[
                    hostname.into(),
                    im_mad.into(),
                    vm_mad.into(),
                    tm_mad.into(),
                    cluster_id.into(),
                ],
            )?
            .into_int()
    }

    /// Enable this host.
    pub fn enable(&self) -> Result<(), OcaError> {
        self.set_status(status::ENABLE)
    }

    /// Disable this host.
    pub fn disable(&self) -> Result<(), OcaError> {
        self.set_status(status::DISABLE)
    }

    /// Mark this host as offline.
    pub fn offline(&self) -> Result<(), OcaError> {
        self.set_status(status::OFFLINE)
    }

    fn set_status(&self, code: i64) -> Result<(), OcaError> {
        let id = self.require_id()?;
        debug!(method = HostMethod::Status.wire_name(), id, code, "remote call");
        self.client.call(
            HostMethod::Status.wire_name(),
            &[CallArg::Int(id), CallArg::Int(code)],
        )?;
        Ok(())
    }

    /// Update the template of this host with a pre-serialized payload.
    ///
    /// With `merge` the payload is merged into the existing template;
    /// otherwise the template is replaced wholesale.
    pub fn update(&self, template: &str, merge: bool) -> Result<(), OcaError> {
        let id = self.require_id()?;
        let flag = if merge {
            update_flag::MERGE
        } else {
            update_flag::REPLACE
        };
        debug!(method = HostMethod::Update.wire_name(), id, flag, "remote call");
        self.client.call(
            HostMethod::Update.wire_name(),
            &[id.into(), template.into(), flag.into()],
        )?;
        Ok(())
    }

    /// Remove this host from the host list.
    pub fn delete(&self) -> Result<(), OcaError> {
        let id = self.require_id()?;
        debug!(method = HostMethod::Delete.wire_name(), id, "remote call");
        self.client
            .call(HostMethod::Delete.wire_name(), &[CallArg::Int(id)])?;
        Ok(())
    }

    fn require_id(&self) -> Result<i64, OcaError> {
        self.id.ok_or(OcaError::MissingId)
    }

    /// Host id, `None` when the document carried no `ID` tag.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Host name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw state code exactly as carried in the document.
    pub fn state_code(&self) -> i64 {
        self.state
    }

    /// Typed state; fails loudly when the code is outside `[0, 8]`.
    pub fn state(&self) -> Result<HostState, OcaError> {
        HostState::from_code(self.state)
    }

    /// Canonical state name such as `MONITORED`.
    pub fn state_name(&self) -> Result<&'static str, OcaError> {
        self.state().map(HostState::name)
    }

    /// Three-valued state summary (`on`, `off`, `err`).
    pub fn short_state(&self) -> Result<ShortState, OcaError> {
        self.state().map(HostState::short)
    }

    /// Information driver name.
    pub fn im_mad(&self) -> &str {
        &self.im_mad
    }

    /// Virtualization driver name.
    pub fn vm_mad(&self) -> &str {
        &self.vm_mad
    }

    /// Unix timestamp of the last monitoring round.
    pub fn last_mon_time(&self) -> i64 {
        self.last_mon_time
    }

    /// Name of the cluster the host belongs to.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// Id of the cluster the host belongs to, `-1` when unclustered.
    pub fn cluster_id(&self) -> i64 {
        self.cluster_id
    }

    /// Ids of the virtual machines running on the host, in document order.
    pub fn vm_ids(&self) -> &[i64] {
        &self.vm_ids
    }

    /// Free-form host template.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Capacity and usage section reported by the monitoring drivers.
    pub fn host_share(&self) -> &Template {
        &self.host_share
    }

    /// Full parsed snapshot, for fields outside the typed schema.
    pub fn xml(&self) -> &Element {
        &self.xml
    }
}

impl<C: Client + ?Sized> fmt::Debug for Host<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
