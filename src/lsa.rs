// Link State Advertisements as stored in the link-state database

use std::cell::Cell;
use std::fmt;
use std::net::Ipv4Addr;
use serde::{Deserialize, Serialize};

/// Mask used when resolving a single interface address.
pub const HOST_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 255);

/// Network address of `addr` under `mask`.
pub fn combine_mask(addr: Ipv4Addr, mask: Ipv4Addr) -> Ipv4Addr {
    Ipv4Addr::from(u32::from(addr) & u32::from(mask))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkType {
    PointToPoint,
    TransitNetwork,
    StubNetwork,
}

/// One link of a router advertisement.
///
/// * `PointToPoint`: `link_id` is the neighbor router id, `link_data` the local interface address.
/// * `TransitNetwork`: `link_id` identifies the network (its designated address),
///   `link_data` the local interface address on that network.
/// * `StubNetwork`: `link_id` is the network address, `link_data` its mask.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub link_type: LinkType,
    pub link_id: Ipv4Addr,
    pub link_data: Ipv4Addr,
    pub metric: u32,
}

impl LinkRecord {
    pub fn point_to_point(neighbor: Ipv4Addr, local_address: Ipv4Addr, metric: u32) -> Self {
        Self { link_type: LinkType::PointToPoint, link_id: neighbor, link_data: local_address, metric }
    }

    pub fn transit_network(network: Ipv4Addr, local_address: Ipv4Addr, metric: u32) -> Self {
        Self { link_type: LinkType::TransitNetwork, link_id: network, link_data: local_address, metric }
    }

    pub fn stub_network(network: Ipv4Addr, mask: Ipv4Addr, metric: u32) -> Self {
        Self { link_type: LinkType::StubNetwork, link_id: network, link_data: mask, metric }
    }

    /// Point-to-point and transit records lead to another vertex; stub records do not.
    pub fn is_transit(&self) -> bool {
        self.link_type != LinkType::StubNetwork
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LsaKind {
    Router,
    Network,
    AsExternal,
}

impl fmt::Display for LsaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsaKind::Router => write!(f, "router"),
            LsaKind::Network => write!(f, "network"),
            LsaKind::AsExternal => write!(f, "as-external"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LsaBody {
    Router {
        links: Vec<LinkRecord>,
    },
    Network {
        network_mask: Ipv4Addr,
        attached_routers: Vec<Ipv4Addr>,
    },
    AsExternal {
        network_mask: Ipv4Addr,
        advertising_router: Ipv4Addr,
    },
}

/// Exploration state of an advertisement during one SPF run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpfStatus {
    #[default]
    NotExplored,
    Candidate,
    InTree,
}

#[derive(Debug, Clone)]
pub struct Lsa {
    pub link_state_id: Ipv4Addr,
    pub body: LsaBody,
    // Scratch state of the SPF run in progress; the database stays shared while it changes.
    status: Cell<SpfStatus>,
}

impl Lsa {
    pub fn new(link_state_id: Ipv4Addr, body: LsaBody) -> Self {
        Self { link_state_id, body, status: Cell::new(SpfStatus::NotExplored) }
    }

    pub fn router(router_id: Ipv4Addr, links: Vec<LinkRecord>) -> Self {
        Self::new(router_id, LsaBody::Router { links })
    }

    pub fn network(designated: Ipv4Addr, network_mask: Ipv4Addr, attached_routers: Vec<Ipv4Addr>) -> Self {
        Self::new(designated, LsaBody::Network { network_mask, attached_routers })
    }

    pub fn as_external(prefix: Ipv4Addr, network_mask: Ipv4Addr, advertising_router: Ipv4Addr) -> Self {
        Self::new(prefix, LsaBody::AsExternal { network_mask, advertising_router })
    }

    pub fn kind(&self) -> LsaKind {
        match self.body {
            LsaBody::Router { .. } => LsaKind::Router,
            LsaBody::Network { .. } => LsaKind::Network,
            LsaBody::AsExternal { .. } => LsaKind::AsExternal,
        }
    }

    /// Link records of a router advertisement; empty for every other kind.
    pub fn links(&self) -> &[LinkRecord] {
        match &self.body {
            LsaBody::Router { links } => links,
            _ => &[],
        }
    }

    pub fn status(&self) -> SpfStatus {
        self.status.get()
    }

    pub fn set_status(&self, status: SpfStatus) {
        self.status.set(status);
    }
}

impl PartialEq for Lsa {
    fn eq(&self, other: &Self) -> bool {
        self.link_state_id == other.link_state_id && self.body == other.body
    }
}

impl Eq for Lsa {}

impl fmt::Display for Lsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.body {
            LsaBody::Router { links } => {
                write!(f, "router-LSA {} ({} links)", self.link_state_id, links.len())
            }
            LsaBody::Network { network_mask, attached_routers } => write!(
                f,
                "network-LSA {}/{} ({} attached)",
                self.link_state_id,
                network_mask,
                attached_routers.len()
            ),
            LsaBody::AsExternal { network_mask, advertising_router } => write!(
                f,
                "as-external-LSA {}/{} from {}",
                self.link_state_id, network_mask, advertising_router
            ),
        }
    }
}
