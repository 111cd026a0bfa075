// Library interface of the SPF route computation, exporting the core modules and the types most callers need.

pub mod core;
pub mod error;
pub mod init;
pub mod lsa;
pub mod read_config;

pub use crate::core::lsdb::Lsdb;
pub use crate::core::neighbor_discovery::{GlobalRouter, RouterDiscovery, StaticRouter};
pub use crate::core::network_interface::{InterfaceResolver, InterfaceTable, NetworkInterface};
pub use crate::core::path_calculation::{spf_calculate, SpfOutcome, StubCheck};
pub use crate::core::route_manager::RouteManager;
pub use crate::core::routing_table::{Route, RouteKind, RouteSink, RoutingTable};
pub use error::{AppError, Result};
pub use lsa::{LinkRecord, LinkType, Lsa, LsaBody, LsaKind};
