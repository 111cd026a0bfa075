// Router collaborators: advertisement discovery plus the in-memory router used by the binary and tests

use std::net::Ipv4Addr;
use crate::lsa::Lsa;
use super::network_interface::{InterfaceResolver, InterfaceTable, NetworkInterface};
use super::routing_table::{RouteSink, RoutingTable};

/// Source of a router's own advertisements.
pub trait RouterDiscovery {
    fn router_id(&self) -> Ipv4Addr;

    /// Enumerates the router's links and returns its router advertisement plus
    /// any network or external advertisements it originates.
    fn discover_advertisements(&mut self) -> Vec<Lsa>;
}

/// Everything the route manager needs from one router.
pub trait GlobalRouter: RouterDiscovery + InterfaceResolver + RouteSink {}

impl<T: RouterDiscovery + InterfaceResolver + RouteSink> GlobalRouter for T {}

/// Router whose advertisements and interfaces are known up front.
#[derive(Debug, Clone)]
pub struct StaticRouter {
    router_id: Ipv4Addr,
    interfaces: InterfaceTable,
    advertisements: Vec<Lsa>,
    routing_table: RoutingTable,
}

impl StaticRouter {
    pub fn new(router_id: Ipv4Addr) -> Self {
        Self {
            router_id,
            interfaces: InterfaceTable::new(),
            advertisements: Vec::new(),
            routing_table: RoutingTable::new(),
        }
    }

    pub fn with_interface(mut self, index: u32, address: Ipv4Addr, mask: Ipv4Addr) -> Self {
        self.interfaces.add_interface(NetworkInterface::new(index, address, mask));
        self
    }

    pub fn with_advertisement(mut self, lsa: Lsa) -> Self {
        self.advertisements.push(lsa);
        self
    }

    pub fn add_interface(&mut self, interface: NetworkInterface) {
        self.interfaces.add_interface(interface);
    }

    pub fn add_advertisement(&mut self, lsa: Lsa) {
        self.advertisements.push(lsa);
    }

    pub fn interfaces(&self) -> &InterfaceTable {
        &self.interfaces
    }

    pub fn advertisements(&self) -> &[Lsa] {
        &self.advertisements
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }
}

impl RouterDiscovery for StaticRouter {
    fn router_id(&self) -> Ipv4Addr {
        self.router_id
    }

    fn discover_advertisements(&mut self) -> Vec<Lsa> {
        self.advertisements.clone()
    }
}

impl InterfaceResolver for StaticRouter {
    fn find_outgoing_interface(&self, address: Ipv4Addr, mask: Ipv4Addr) -> Option<u32> {
        self.interfaces.find_outgoing_interface(address, mask)
    }
}

impl RouteSink for StaticRouter {
    fn add_host_route(&mut self, dest: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.routing_table.add_host_route(dest, next_hop, interface, metric);
    }

    fn add_network_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.routing_table.add_network_route(dest, mask, next_hop, interface, metric);
    }

    fn add_external_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.routing_table.add_external_route(dest, mask, next_hop, interface, metric);
    }

    fn remove_all_routes(&mut self) {
        self.routing_table.remove_all_routes();
    }

    fn route_count(&self) -> usize {
        self.routing_table.route_count()
    }
}
