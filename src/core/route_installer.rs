// Route installation from a finished shortest-path tree
//
// Every pass walks the tree depth first from the root, visits each vertex
// once and never installs anything for the root itself. One entry is written
// per root exit direction so equal-cost paths show up side by side.

use log::{debug, trace};
use crate::lsa::{combine_mask, LinkType, Lsa, LsaBody};
use super::lsdb::Lsdb;
use super::routing_table::RouteSink;
use super::vertex::{RootExit, SpfTree, VertexKind};

/// Runs every pass over `tree` and returns the number of routes written.
pub fn install_routes<S>(tree: &mut SpfTree<'_>, lsdb: &Lsdb, sink: &mut S) -> usize
where
    S: RouteSink + ?Sized,
{
    let mut installed = install_intra_area_routes(tree, sink);
    installed += process_stubs(tree, sink);
    for external in lsdb.externals() {
        installed += process_as_external(tree, external, sink);
    }
    installed
}

/// Host routes to the point-to-point addresses of every router, and a network
/// route to every transit network.
pub fn install_intra_area_routes<S>(tree: &mut SpfTree<'_>, sink: &mut S) -> usize
where
    S: RouteSink + ?Sized,
{
    let root = tree.root();
    let mut installed = 0;
    for handle in tree.depth_first() {
        if handle == root {
            continue;
        }
        let vertex = tree.vertex(handle);
        let metric = vertex.distance_from_root();
        match vertex.kind() {
            VertexKind::Router { links } => {
                for link in links.iter().filter(|l| l.link_type == LinkType::PointToPoint) {
                    for (next_hop, interface) in usable_exits(vertex.root_exit_directions()) {
                        sink.add_host_route(link.link_data, next_hop, interface, metric);
                        installed += 1;
                    }
                }
            }
            VertexKind::Network { network_mask, .. } => {
                let destination = combine_mask(vertex.id(), network_mask);
                for (next_hop, interface) in usable_exits(vertex.root_exit_directions()) {
                    sink.add_network_route(destination, network_mask, next_hop, interface, metric);
                    installed += 1;
                }
            }
        }
    }
    debug!("{} intra-area routes installed", installed);
    installed
}

/// Network routes to the stub prefixes advertised by every router in the tree.
pub fn process_stubs<S>(tree: &mut SpfTree<'_>, sink: &mut S) -> usize
where
    S: RouteSink + ?Sized,
{
    let root = tree.root();
    let mut installed = 0;
    for handle in tree.depth_first() {
        if handle == root {
            continue;
        }
        let vertex = tree.vertex(handle);
        let VertexKind::Router { links } = vertex.kind() else {
            continue;
        };
        for stub in links.iter().filter(|l| l.link_type == LinkType::StubNetwork) {
            let destination = combine_mask(stub.link_id, stub.link_data);
            for (next_hop, interface) in usable_exits(vertex.root_exit_directions()) {
                sink.add_network_route(destination, stub.link_data, next_hop, interface, vertex.distance_from_root());
                installed += 1;
            }
        }
    }
    installed
}

/// External route for `external` through its advertising router, when that
/// router is in the tree and is not the root.
pub fn process_as_external<S>(tree: &mut SpfTree<'_>, external: &Lsa, sink: &mut S) -> usize
where
    S: RouteSink + ?Sized,
{
    let LsaBody::AsExternal { network_mask, advertising_router } = external.body else {
        return 0;
    };
    let root = tree.root();
    let order = tree.depth_first();
    let Some(handle) = order
        .into_iter()
        .find(|h| tree.vertex(*h).is_router() && tree.vertex(*h).id() == advertising_router)
    else {
        trace!("advertising router {} of {} not reachable", advertising_router, external);
        return 0;
    };
    if handle == root {
        return 0;
    }

    let vertex = tree.vertex(handle);
    let destination = combine_mask(external.link_state_id, network_mask);
    let mut installed = 0;
    for (next_hop, interface) in usable_exits(vertex.root_exit_directions()) {
        sink.add_external_route(destination, network_mask, next_hop, interface, vertex.distance_from_root());
        installed += 1;
    }
    installed
}

fn usable_exits(exits: &[RootExit]) -> impl Iterator<Item = (std::net::Ipv4Addr, u32)> + '_ {
    exits.iter().filter_map(|exit| exit.interface.map(|interface| (exit.next_hop, interface)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use crate::core::routing_table::{RouteKind, RoutingTable};
    use crate::core::vertex::SpfVertex;
    use crate::lsa::LinkRecord;

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, b, c, d)
    }

    // root -> r2 with two exits, one of which has no local interface.
    fn advertisements() -> Vec<Lsa> {
        vec![
            Lsa::router(
                ip(10, 0, 0, 1),
                vec![
                    LinkRecord::point_to_point(ip(10, 0, 0, 2), ip(10, 1, 1, 1), 1),
                    LinkRecord::stub_network(ip(198, 51, 100, 0), ip(255, 255, 255, 0), 1),
                ],
            ),
            Lsa::router(
                ip(10, 0, 0, 2),
                vec![
                    LinkRecord::point_to_point(ip(10, 0, 0, 1), ip(10, 1, 1, 2), 1),
                    LinkRecord::stub_network(ip(192, 0, 2, 77), ip(255, 255, 255, 0), 1),
                ],
            ),
        ]
    }

    fn tree(lsas: &[Lsa]) -> SpfTree<'_> {
        let mut tree = SpfTree::new(SpfVertex::new(&lsas[0]).unwrap());
        let mut r2 = SpfVertex::new(&lsas[1]).unwrap();
        r2.set_distance_from_root(3);
        r2.set_root_exit_directions(vec![
            RootExit { next_hop: ip(10, 1, 1, 2), interface: Some(1) },
            RootExit { next_hop: ip(10, 1, 9, 2), interface: None },
        ]);
        r2.set_parent(tree.root());
        let handle = tree.insert(r2);
        tree.add_to_parents(handle);
        tree
    }

    #[test]
    fn it_installs_host_routes_and_skips_root() {
        let lsas = advertisements();
        let mut tree = tree(&lsas);
        let mut table = RoutingTable::new();

        assert_eq!(install_intra_area_routes(&mut tree, &mut table), 1);
        let routes = table.get_routes(ip(10, 1, 1, 2));
        assert_eq!(routes.len(), 1);
        assert_eq!(routes[0].kind, RouteKind::Host);
        assert_eq!(routes[0].metric, 3);
        assert!(table.get_routes(ip(10, 1, 1, 1)).is_empty());
    }

    #[test]
    fn stub_prefix_is_masked() {
        let lsas = advertisements();
        let mut tree = tree(&lsas);
        let mut table = RoutingTable::new();

        assert_eq!(process_stubs(&mut tree, &mut table), 1);
        let routes = table.list_routes();
        assert_eq!(routes[0].destination, ip(192, 0, 2, 0));
        assert_eq!(routes[0].mask, ip(255, 255, 255, 0));
        assert_eq!(routes[0].next_hop, ip(10, 1, 1, 2));
        // the root's own stub is not installed
        assert!(table.get_routes(ip(198, 51, 100, 0)).is_empty());
    }

    #[test]
    fn externals_follow_their_advertising_router() {
        let lsas = advertisements();
        let mut tree = tree(&lsas);
        let mut table = RoutingTable::new();
        let mask = ip(255, 240, 0, 0);

        let via_r2 = Lsa::as_external(ip(172, 16, 0, 0), mask, ip(10, 0, 0, 2));
        let via_root = Lsa::as_external(ip(172, 32, 0, 0), mask, ip(10, 0, 0, 1));
        let unknown = Lsa::as_external(ip(172, 48, 0, 0), mask, ip(10, 0, 0, 9));

        assert_eq!(process_as_external(&mut tree, &via_r2, &mut table), 1);
        assert_eq!(process_as_external(&mut tree, &via_root, &mut table), 0);
        assert_eq!(process_as_external(&mut tree, &unknown, &mut table), 0);
        assert_eq!(table.list_routes()[0].kind, RouteKind::External);
        assert_eq!(table.list_routes()[0].metric, 3);
    }

    #[test]
    fn install_routes_runs_every_pass() {
        let lsas = advertisements();
        let mut tree = tree(&lsas);
        let mut lsdb = Lsdb::new();
        lsdb.insert(Lsa::as_external(ip(172, 16, 0, 0), ip(255, 240, 0, 0), ip(10, 0, 0, 2)));
        let mut table = RoutingTable::new();

        assert_eq!(install_routes(&mut tree, &lsdb, &mut table), 3);
        assert_eq!(table.len(), 3);
    }
}
