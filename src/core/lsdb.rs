// Link-State Database: owns every advertisement used by a route computation

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use crate::lsa::{LinkType, Lsa, LsaKind, SpfStatus};

/// Router and network advertisements keyed by link state id, plus the
/// AS-external advertisements in insertion order.
///
/// External advertisements are kept apart because several of them may share
/// the same id or advertising router.
#[derive(Debug, Default)]
pub struct Lsdb {
    database: BTreeMap<Ipv4Addr, Lsa>,
    external: Vec<Lsa>,
}

impl Lsdb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an advertisement. A router or network advertisement replaces any
    /// previous one with the same id.
    pub fn insert(&mut self, lsa: Lsa) {
        match lsa.kind() {
            LsaKind::AsExternal => self.external.push(lsa),
            LsaKind::Router | LsaKind::Network => {
                if let Some(previous) = self.database.insert(lsa.link_state_id, lsa) {
                    log::debug!("LSDB: replaced {}", previous);
                }
            }
        }
    }

    pub fn get(&self, id: Ipv4Addr) -> Option<&Lsa> {
        self.database.get(&id)
    }

    /// Finds the router advertisement owning a transit-network link whose
    /// interface address is `addr`.
    pub fn get_by_link_data(&self, addr: Ipv4Addr) -> Option<&Lsa> {
        self.database.values().find(|lsa| {
            lsa.links()
                .iter()
                .any(|l| l.link_type == LinkType::TransitNetwork && l.link_data == addr)
        })
    }

    pub fn get_external(&self, index: usize) -> Option<&Lsa> {
        self.external.get(index)
    }

    pub fn external_count(&self) -> usize {
        self.external.len()
    }

    pub fn externals(&self) -> impl Iterator<Item = &Lsa> + '_ {
        self.external.iter()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lsa> + '_ {
        self.database.values()
    }

    /// Marks every stored advertisement as not explored, ready for a new SPF run.
    pub fn reset(&self) {
        for lsa in self.database.values().chain(self.external.iter()) {
            lsa.set_status(SpfStatus::NotExplored);
        }
    }

    /// Number of router and network advertisements.
    pub fn len(&self) -> usize {
        self.database.len()
    }

    pub fn is_empty(&self) -> bool {
        self.database.is_empty() && self.external.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lsa::LinkRecord;

    fn ip(a: u8, b: u8, c: u8, d: u8) -> Ipv4Addr {
        Ipv4Addr::new(a, b, c, d)
    }

    #[test]
    fn it_keys_router_and_network_advertisements() {
        let mut lsdb = Lsdb::new();
        lsdb.insert(Lsa::router(ip(10, 0, 0, 1), vec![]));
        lsdb.insert(Lsa::network(ip(10, 1, 0, 1), ip(255, 255, 255, 0), vec![ip(10, 1, 0, 1)]));

        assert_eq!(lsdb.len(), 2);
        assert_eq!(lsdb.get(ip(10, 0, 0, 1)).map(Lsa::kind), Some(LsaKind::Router));
        assert_eq!(lsdb.get(ip(10, 1, 0, 1)).map(Lsa::kind), Some(LsaKind::Network));
        assert!(lsdb.get(ip(10, 9, 9, 9)).is_none());
    }

    #[test]
    fn it_appends_externals_without_uniqueness() {
        let mut lsdb = Lsdb::new();
        let mask = ip(255, 255, 0, 0);
        lsdb.insert(Lsa::as_external(ip(172, 16, 0, 0), mask, ip(10, 0, 0, 1)));
        lsdb.insert(Lsa::as_external(ip(172, 16, 0, 0), mask, ip(10, 0, 0, 2)));

        assert_eq!(lsdb.len(), 0);
        assert_eq!(lsdb.external_count(), 2);
        assert!(lsdb.get(ip(172, 16, 0, 0)).is_none());
        match lsdb.get_external(1).map(|lsa| &lsa.body) {
            Some(crate::lsa::LsaBody::AsExternal { advertising_router, .. }) => {
                assert_eq!(*advertising_router, ip(10, 0, 0, 2));
            }
            other => panic!("unexpected external: {:?}", other),
        }
        assert!(lsdb.get_external(2).is_none());
    }

    #[test]
    fn duplicate_id_overwrites() {
        let mut lsdb = Lsdb::new();
        let id = ip(10, 0, 0, 1);
        lsdb.insert(Lsa::router(id, vec![]));
        lsdb.insert(Lsa::router(id, vec![LinkRecord::stub_network(ip(192, 0, 2, 0), ip(255, 255, 255, 0), 1)]));

        assert_eq!(lsdb.len(), 1);
        assert_eq!(lsdb.get(id).map(|lsa| lsa.links().len()), Some(1));
    }

    #[test]
    fn it_finds_router_by_transit_link_data_only() {
        let mut lsdb = Lsdb::new();
        let lan = ip(10, 1, 0, 1);
        lsdb.insert(Lsa::router(
            ip(10, 0, 0, 1),
            vec![LinkRecord::point_to_point(ip(10, 0, 0, 3), ip(10, 2, 0, 1), 1)],
        ));
        lsdb.insert(Lsa::router(
            ip(10, 0, 0, 2),
            vec![LinkRecord::transit_network(lan, ip(10, 1, 0, 2), 1)],
        ));

        let found = lsdb.get_by_link_data(ip(10, 1, 0, 2)).map(|lsa| lsa.link_state_id);
        assert_eq!(found, Some(ip(10, 0, 0, 2)));
        assert!(lsdb.get_by_link_data(ip(10, 2, 0, 1)).is_none());
    }

    #[test]
    fn reset_clears_every_status() {
        let mut lsdb = Lsdb::new();
        lsdb.insert(Lsa::router(ip(10, 0, 0, 1), vec![]));
        lsdb.insert(Lsa::router(ip(10, 0, 0, 2), vec![]));
        for lsa in lsdb.iter() {
            lsa.set_status(SpfStatus::InTree);
        }

        lsdb.reset();
        assert!(lsdb.iter().all(|lsa| lsa.status() == SpfStatus::NotExplored));
    }
}
