// Shortest-path-first computation over the link-state database
//
// Builds the shortest-path tree rooted at one router (Dijkstra over router and
// network vertices), resolving for every vertex the set of first hops out of
// the root, with equal-cost paths merged. Routers with a single point-to-point
// uplink take a fast path that only installs a default route.

use std::net::Ipv4Addr;
use log::{debug, info, trace, warn};
use crate::error::{AppError, Result};
use crate::lsa::{LinkRecord, LinkType, Lsa, LsaKind, SpfStatus, HOST_MASK};
use super::candidate_queue::CandidateQueue;
use super::lsdb::Lsdb;
use super::network_interface::InterfaceResolver;
use super::route_installer;
use super::routing_table::RouteSink;
use super::vertex::{RootExit, SpfTree, SpfVertex, VertexHandle, VertexKind};

/// Result of the stub fast-path check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubCheck {
    /// No point-to-point or transit links at all.
    Isolated,
    /// Single point-to-point uplink: everything leaves through `exit`.
    Stub { exit: RootExit, metric: u32 },
    /// Needs the full computation.
    Transit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpfOutcome {
    Isolated,
    Stub { exit: RootExit },
    Tree { vertices: usize, routes: usize },
}

/// Decides whether `root` can skip the full computation.
///
/// Only a single point-to-point link qualifies, and only when the neighbor
/// advertises a point-to-point link back. A single transit-network link always
/// goes through the full computation.
pub fn check_for_stub_node<I>(lsdb: &Lsdb, root_lsa: &Lsa, resolver: &I) -> StubCheck
where
    I: InterfaceResolver + ?Sized,
{
    let mut transit_links = root_lsa.links().iter().filter(|l| l.is_transit());
    let uplink = match (transit_links.next(), transit_links.next()) {
        (None, _) => return StubCheck::Isolated,
        (Some(link), None) => link,
        (Some(_), Some(_)) => return StubCheck::Transit,
    };
    if uplink.link_type != LinkType::PointToPoint {
        return StubCheck::Transit;
    }
    let Some(neighbor) = lsdb.get(uplink.link_id) else {
        debug!("stub check: no advertisement for neighbor {}", uplink.link_id);
        return StubCheck::Transit;
    };
    let back_link = neighbor
        .links()
        .iter()
        .find(|l| l.link_type == LinkType::PointToPoint && l.link_id == root_lsa.link_state_id);
    match back_link {
        Some(back) => StubCheck::Stub {
            exit: RootExit {
                next_hop: back.link_data,
                interface: resolver.find_outgoing_interface(uplink.link_data, HOST_MASK),
            },
            metric: uplink.metric,
        },
        None => StubCheck::Transit,
    }
}

/// Computes and installs every route of `root` into `router`.
pub fn spf_calculate<R>(lsdb: &Lsdb, root: Ipv4Addr, router: &mut R) -> Result<SpfOutcome>
where
    R: InterfaceResolver + RouteSink + ?Sized,
{
    lsdb.reset();
    let root_lsa = lsdb.get(root).ok_or(AppError::UnknownRoot(root))?;
    if root_lsa.kind() != LsaKind::Router {
        return Err(AppError::RoutingError(format!("root {} is not a router advertisement", root)));
    }

    match check_for_stub_node(lsdb, root_lsa, &*router) {
        StubCheck::Isolated => {
            debug!("SPF {}: isolated router, no routes", root);
            return Ok(SpfOutcome::Isolated);
        }
        StubCheck::Stub { exit, metric } => {
            debug!("SPF {}: stub router, default route via {}", root, exit.next_hop);
            match exit.interface {
                Some(interface) => router.add_network_route(
                    Ipv4Addr::UNSPECIFIED,
                    Ipv4Addr::UNSPECIFIED,
                    exit.next_hop,
                    interface,
                    metric,
                ),
                None => warn!("SPF {}: no local interface for the uplink, default route dropped", root),
            }
            return Ok(SpfOutcome::Stub { exit });
        }
        StubCheck::Transit => {}
    }

    let mut tree = shortest_path_tree(lsdb, root, &*router)?;
    let routes = route_installer::install_routes(&mut tree, lsdb, router);
    info!("SPF {}: {} vertices in tree, {} routes installed", root, tree.len(), routes);
    Ok(SpfOutcome::Tree { vertices: tree.len(), routes })
}

/// Builds the full shortest-path tree rooted at `root`, without the stub
/// fast path and without installing anything.
pub fn shortest_path_tree<'a, I>(lsdb: &'a Lsdb, root: Ipv4Addr, resolver: &I) -> Result<SpfTree<'a>>
where
    I: InterfaceResolver + ?Sized,
{
    lsdb.reset();
    let root_lsa = lsdb.get(root).ok_or(AppError::UnknownRoot(root))?;
    let root_vertex = match SpfVertex::new(root_lsa) {
        Some(vertex) if vertex.is_router() => vertex,
        _ => {
            return Err(AppError::RoutingError(format!("root {} is not a router advertisement", root)));
        }
    };
    root_lsa.set_status(SpfStatus::InTree);

    let mut tree = SpfTree::new(root_vertex);
    let mut candidates = CandidateQueue::new();
    let mut v = tree.root();
    loop {
        spf_next(lsdb, &mut tree, &mut candidates, v, resolver);
        let Some(next) = candidates.pop() else {
            break;
        };
        v = next;
        let vertex = tree.vertex(v);
        vertex.lsa().set_status(SpfStatus::InTree);
        trace!("settled {} at distance {}", vertex.id(), vertex.distance_from_root());
        tree.add_to_parents(v);
    }
    Ok(tree)
}

/// Examines every neighbor of the freshly settled vertex `v` and updates the
/// candidate list.
fn spf_next<'a, I>(
    lsdb: &'a Lsdb,
    tree: &mut SpfTree<'a>,
    candidates: &mut CandidateQueue,
    v: VertexHandle,
    resolver: &I,
) where
    I: InterfaceResolver + ?Sized,
{
    let v_distance = tree.vertex(v).distance_from_root();
    let neighbors: Vec<(&'a Lsa, Option<&'a LinkRecord>)> = match tree.vertex(v).kind() {
        VertexKind::Router { links } => links
            .iter()
            .filter(|l| l.is_transit())
            .filter_map(|l| match lsdb.get(l.link_id) {
                Some(w_lsa) => Some((w_lsa, Some(l))),
                None => {
                    warn!("no advertisement for {} (linked from {})", l.link_id, tree.vertex(v).id());
                    None
                }
            })
            .collect(),
        VertexKind::Network { attached_routers, .. } => attached_routers
            .iter()
            .filter_map(|addr| lsdb.get_by_link_data(*addr).map(|w_lsa| (w_lsa, None)))
            .collect(),
    };

    for (w_lsa, link) in neighbors {
        if w_lsa.status() == SpfStatus::InTree {
            continue;
        }
        let distance = match link {
            Some(l) => v_distance.saturating_add(l.metric),
            None => v_distance,
        };
        let Some(mut w) = SpfVertex::new(w_lsa) else {
            continue;
        };

        match w_lsa.status() {
            SpfStatus::NotExplored => {
                spf_nexthop_calculation(tree, v, &mut w, link, distance, resolver);
                w_lsa.set_status(SpfStatus::Candidate);
                let id = w.id();
                let handle = tree.insert(w);
                candidates.push(handle, id, distance);
            }
            SpfStatus::Candidate => {
                let Some(cw) = candidates.find(w_lsa.link_state_id) else {
                    warn!("{} marked candidate but not queued", w_lsa.link_state_id);
                    continue;
                };
                let cw_distance = tree.vertex(cw).distance_from_root();
                if cw_distance < distance {
                    continue;
                }
                // w is scratch: only its exits and parent survive, folded into cw.
                spf_nexthop_calculation(tree, v, &mut w, link, distance, resolver);
                if cw_distance == distance {
                    trace!("equal-cost path to {} through {}", w.id(), tree.vertex(v).id());
                    let candidate = tree.vertex_mut(cw);
                    candidate.merge_root_exit_directions(w.root_exit_directions());
                    candidate.merge_parents(w.parents());
                } else {
                    let candidate = tree.vertex_mut(cw);
                    candidate.set_root_exit_directions(w.root_exit_directions().to_vec());
                    candidate.set_distance_from_root(distance);
                    candidate.set_parent(v);
                    candidates.reorder(cw, w.id(), distance);
                }
            }
            SpfStatus::InTree => {}
        }
    }
}

/// Resolves the first hops out of the root for `w`, reached from `v` at
/// `distance`, and records `v` as its parent.
fn spf_nexthop_calculation<'a, I>(
    tree: &SpfTree<'a>,
    v: VertexHandle,
    w: &mut SpfVertex<'a>,
    link: Option<&LinkRecord>,
    distance: u32,
    resolver: &I,
) where
    I: InterfaceResolver + ?Sized,
{
    let root = tree.root();
    let parent = tree.vertex(v);

    let exits = if v == root {
        match w.kind() {
            VertexKind::Router { links } => {
                let interface = link.and_then(|l| resolver.find_outgoing_interface(l.link_data, HOST_MASK));
                links
                    .iter()
                    .find(|l| l.link_type == LinkType::PointToPoint && l.link_id == parent.id())
                    .map(|back| RootExit { next_hop: back.link_data, interface })
                    .into_iter()
                    .collect()
            }
            VertexKind::Network { network_mask, .. } => vec![RootExit {
                next_hop: Ipv4Addr::UNSPECIFIED,
                interface: resolver.find_outgoing_interface(w.id(), network_mask),
            }],
        }
    } else {
        match (parent.kind(), w.kind()) {
            (VertexKind::Network { .. }, VertexKind::Router { links }) => {
                // Exits onto a network attached to the root carry no next hop yet:
                // w's own address on the network fills it in. Exits through another
                // router are inherited as they are.
                let mut exits = Vec::new();
                for exit in parent.root_exit_directions() {
                    if exit.next_hop != Ipv4Addr::UNSPECIFIED {
                        exits.push(*exit);
                        continue;
                    }
                    exits.extend(
                        links
                            .iter()
                            .filter(|l| l.is_transit() && l.link_id == parent.id())
                            .map(|back| RootExit { next_hop: back.link_data, interface: exit.interface }),
                    );
                }
                exits
            }
            _ => parent.root_exit_directions().to_vec(),
        }
    };

    if exits.is_empty() {
        debug!("no root exit resolved for {} via {}", w.id(), parent.id());
    }
    w.set_root_exit_directions(exits);
    w.set_distance_from_root(distance);
    w.set_parent(v);
}
