// Route manager: owns the link-state database and drives SPF for every router

use std::net::Ipv4Addr;
use log::{debug, info, warn};
use serde::Serialize;
use crate::error::{AppError, Result};
use super::lsdb::Lsdb;
use super::neighbor_discovery::{GlobalRouter, RouterDiscovery, StaticRouter};
use super::routing_table::Route;
use super::path_calculation::{spf_calculate, SpfOutcome};

/// Global route computation over a set of routers.
///
/// The database is rebuilt from the routers' own advertisements and every
/// router that contributed at least one advertisement gets its routes
/// recomputed from scratch.
pub struct RouteManager<R: GlobalRouter> {
    routers: Vec<R>,
    lsdb: Lsdb,
    // Indices into `routers` whose advertisements are in the current database.
    advertised: Vec<usize>,
}

impl<R: GlobalRouter> RouteManager<R> {
    pub fn new() -> Self {
        Self { routers: Vec::new(), lsdb: Lsdb::new(), advertised: Vec::new() }
    }

    pub fn add_router(&mut self, router: R) {
        self.routers.push(router);
    }

    /// Collects the advertisements of every router into the database.
    pub fn build_database(&mut self) {
        let mut count = 0;
        for (index, router) in self.routers.iter_mut().enumerate() {
            let lsas = router.discover_advertisements();
            if lsas.is_empty() {
                debug!("router {} advertises nothing", router.router_id());
                continue;
            }
            count += lsas.len();
            for lsa in lsas {
                self.lsdb.insert(lsa);
            }
            if !self.advertised.contains(&index) {
                self.advertised.push(index);
            }
        }
        info!(
            "LSDB built: {} advertisements, {} external, from {} routers",
            self.lsdb.len(),
            self.lsdb.external_count(),
            self.advertised.len()
        );
    }

    /// Runs SPF rooted at every advertising router and returns how many roots
    /// were computed. A root missing from the database is logged and skipped.
    pub fn initialize_routes(&mut self) -> usize {
        let mut computed = 0;
        for &index in &self.advertised {
            let router = &mut self.routers[index];
            let root = router.router_id();
            match spf_calculate(&self.lsdb, root, router) {
                Ok(outcome) => {
                    computed += 1;
                    if let SpfOutcome::Stub { exit } = outcome {
                        debug!("{} is a stub, default route via {}", root, exit.next_hop);
                    }
                }
                Err(AppError::UnknownRoot(id)) => warn!("no router advertisement for {}, skipped", id),
                Err(e) => warn!("SPF for {} failed: {}", root, e),
            }
        }
        info!("routes computed for {} of {} routers", computed, self.routers.len());
        computed
    }

    /// Clears the routes of every router and empties the database.
    pub fn delete_routes(&mut self) {
        for router in &mut self.routers {
            router.remove_all_routes();
        }
        self.lsdb = Lsdb::new();
        self.advertised.clear();
    }

    /// Full recomputation from scratch.
    pub fn recompute(&mut self) -> usize {
        self.delete_routes();
        self.build_database();
        self.initialize_routes()
    }

    /// First-time population, without clearing anything.
    pub fn populate(&mut self) -> usize {
        self.build_database();
        self.initialize_routes()
    }

    /// Replaces the database with one built by the caller. Every router with a
    /// router advertisement in it becomes a root.
    pub fn use_lsdb(&mut self, lsdb: Lsdb) {
        self.lsdb = lsdb;
        self.advertised = self
            .routers
            .iter()
            .enumerate()
            .filter(|(_, r)| self.lsdb.get(r.router_id()).is_some())
            .map(|(index, _)| index)
            .collect();
    }

    /// Runs SPF for a single root.
    pub fn calculate_for(&mut self, root: Ipv4Addr) -> Result<SpfOutcome> {
        let router = self
            .routers
            .iter_mut()
            .find(|r| r.router_id() == root)
            .ok_or_else(|| AppError::RoutingError(format!("no router with id {}", root)))?;
        spf_calculate(&self.lsdb, root, router)
    }

    pub fn lsdb(&self) -> &Lsdb {
        &self.lsdb
    }

    pub fn routers(&self) -> &[R] {
        &self.routers
    }

    pub fn router(&self, id: Ipv4Addr) -> Option<&R> {
        self.routers.iter().find(|r| r.router_id() == id)
    }
}

/// Routes of one router, as written by [`RouteManager::json_report`].
#[derive(Debug, Serialize)]
pub struct RouterReport<'a> {
    pub router_id: Ipv4Addr,
    pub routes: &'a [Route],
}

impl RouteManager<StaticRouter> {
    pub fn report(&self) -> Vec<RouterReport<'_>> {
        self.routers
            .iter()
            .map(|r| RouterReport { router_id: r.router_id(), routes: r.routing_table().list_routes() })
            .collect()
    }

    /// Installed routes of every router as pretty-printed JSON.
    pub fn json_report(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.report())?)
    }
}

impl<R: GlobalRouter> Default for RouteManager<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: GlobalRouter> FromIterator<R> for RouteManager<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        let mut manager = RouteManager::new();
        for router in iter {
            manager.add_router(router);
        }
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::routing_table::RouteSink;
    use crate::lsa::{LinkRecord, Lsa};

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, b, c, d)
    }

    const P2P: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 252);

    fn pair() -> RouteManager<StaticRouter> {
        let (a, b) = (ip(10, 0, 0, 1), ip(10, 0, 0, 2));
        vec![
            StaticRouter::new(a)
                .with_interface(1, ip(10, 1, 1, 1), P2P)
                .with_advertisement(Lsa::router(a, vec![LinkRecord::point_to_point(b, ip(10, 1, 1, 1), 1)])),
            StaticRouter::new(b)
                .with_interface(1, ip(10, 1, 1, 2), P2P)
                .with_advertisement(Lsa::router(b, vec![LinkRecord::point_to_point(a, ip(10, 1, 1, 2), 1)])),
            // Never advertises: not a root.
            StaticRouter::new(ip(10, 0, 0, 3)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn populate_only_computes_advertising_routers() {
        let mut manager = pair();
        assert_eq!(manager.populate(), 2);
        assert_eq!(manager.lsdb().len(), 2);
        // Each side is a stub of the other: one default route apiece.
        for id in [ip(10, 0, 0, 1), ip(10, 0, 0, 2)] {
            assert_eq!(manager.router(id).map(|r| r.route_count()), Some(1));
        }
        assert_eq!(manager.router(ip(10, 0, 0, 3)).map(|r| r.route_count()), Some(0));
    }

    #[test]
    fn delete_routes_clears_everything() {
        let mut manager = pair();
        manager.populate();
        manager.delete_routes();
        assert!(manager.lsdb().is_empty());
        assert!(manager.routers().iter().all(|r| r.route_count() == 0));
        assert_eq!(manager.initialize_routes(), 0);
    }

    #[test]
    fn calculate_for_unknown_router_is_an_error() {
        let mut manager = pair();
        manager.build_database();
        assert!(matches!(manager.calculate_for(ip(10, 0, 0, 9)), Err(AppError::RoutingError(_))));
        assert!(matches!(manager.calculate_for(ip(10, 0, 0, 3)), Err(AppError::UnknownRoot(_))));
        assert!(matches!(manager.calculate_for(ip(10, 0, 0, 1)), Ok(SpfOutcome::Stub { .. })));
    }

    #[test]
    fn json_report_lists_every_router() {
        let mut manager = pair();
        manager.populate();
        let json: serde_json::Value = serde_json::from_str(&manager.json_report().unwrap()).unwrap();
        let routers = json.as_array().unwrap();
        assert_eq!(routers.len(), 3);
        assert_eq!(routers[0]["router_id"], "10.0.0.1");
        assert_eq!(routers[0]["routes"][0]["kind"], "network");
        assert_eq!(routers[0]["routes"][0]["next_hop"], "10.1.1.2");
        assert_eq!(routers[2]["routes"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn use_lsdb_selects_roots_from_the_database() {
        let mut manager = pair();
        let mut lsdb = Lsdb::new();
        lsdb.insert(Lsa::router(ip(10, 0, 0, 3), vec![]));
        manager.use_lsdb(lsdb);
        assert_eq!(manager.initialize_routes(), 1);
        assert!(manager.routers().iter().all(|r| r.route_count() == 0));
    }
}
