// Routing table of a router: the sink the route installer writes into

use std::fmt;
use std::net::Ipv4Addr;
use serde::Serialize;
use crate::lsa::HOST_MASK;

/// Per-router destination for computed routes.
pub trait RouteSink {
    fn add_host_route(&mut self, dest: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32);
    fn add_network_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32);
    fn add_external_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32);
    fn remove_all_routes(&mut self);
    fn route_count(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteKind {
    Host,
    Network,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Route {
    pub kind: RouteKind,
    pub destination: Ipv4Addr,
    pub mask: Ipv4Addr,
    pub next_hop: Ipv4Addr,
    pub interface: u32,
    pub metric: u32,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = u32::from(self.mask).count_ones();
        let kind = match self.kind {
            RouteKind::Host => "host",
            RouteKind::Network => "net",
            RouteKind::External => "ext",
        };
        write!(
            f,
            "{:<4} {:>18} via {:<15} if {:<3} metric {}",
            kind,
            format!("{}/{}", self.destination, prefix),
            self.next_hop,
            self.interface,
            self.metric
        )
    }
}

/// In-memory routing table. Entries keep insertion order; equal-cost entries
/// for one destination sit side by side.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: Vec<Route>,
}

impl RoutingTable {
    pub fn new() -> Self {
        RoutingTable { routes: Vec::new() }
    }

    pub fn add_route(&mut self, route: Route) {
        log::debug!("add route {}", route);
        self.routes.push(route);
    }

    pub fn get_routes(&self, destination: Ipv4Addr) -> Vec<&Route> {
        self.routes.iter().filter(|r| r.destination == destination).collect()
    }

    pub fn list_routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn clear(&mut self) {
        self.routes.clear();
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl RouteSink for RoutingTable {
    fn add_host_route(&mut self, dest: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.add_route(Route { kind: RouteKind::Host, destination: dest, mask: HOST_MASK, next_hop, interface, metric });
    }

    fn add_network_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.add_route(Route { kind: RouteKind::Network, destination: dest, mask, next_hop, interface, metric });
    }

    fn add_external_route(&mut self, dest: Ipv4Addr, mask: Ipv4Addr, next_hop: Ipv4Addr, interface: u32, metric: u32) {
        self.add_route(Route { kind: RouteKind::External, destination: dest, mask, next_hop, interface, metric });
    }

    fn remove_all_routes(&mut self) {
        self.clear();
    }

    fn route_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_keeps_equal_cost_entries() {
        let mut table = RoutingTable::new();
        let dest = Ipv4Addr::new(10, 0, 0, 9);
        table.add_host_route(dest, Ipv4Addr::new(10, 1, 1, 2), 1, 2);
        table.add_host_route(dest, Ipv4Addr::new(10, 1, 2, 2), 2, 2);
        table.add_network_route(Ipv4Addr::new(192, 0, 2, 0), Ipv4Addr::new(255, 255, 255, 0), Ipv4Addr::new(10, 1, 1, 2), 1, 1);

        assert_eq!(table.route_count(), 3);
        let routes = table.get_routes(dest);
        assert_eq!(routes.len(), 2);
        assert!(routes.iter().all(|r| r.kind == RouteKind::Host && r.mask == HOST_MASK));

        table.remove_all_routes();
        assert!(table.is_empty());
    }

    #[test]
    fn display_uses_prefix_length() {
        let route = Route {
            kind: RouteKind::External,
            destination: Ipv4Addr::new(172, 16, 0, 0),
            mask: Ipv4Addr::new(255, 240, 0, 0),
            next_hop: Ipv4Addr::new(10, 1, 1, 2),
            interface: 3,
            metric: 4,
        };
        let text = route.to_string();
        assert!(text.starts_with("ext"));
        assert!(text.contains("172.16.0.0/12"));
        assert!(text.contains("via 10.1.1.2"));
    }
}
