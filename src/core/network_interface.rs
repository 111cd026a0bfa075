// Interfaces of a router, used to map advertised addresses back to a local outgoing interface

use std::net::Ipv4Addr;
use pnet::ipnetwork::Ipv4Network;
use serde::{Deserialize, Serialize};

/// Maps an advertised address (or prefix) to the local interface that reaches it.
pub trait InterfaceResolver {
    /// Index of the interface whose address lies in `address/mask`, if any.
    fn find_outgoing_interface(&self, address: Ipv4Addr, mask: Ipv4Addr) -> Option<u32>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub index: u32,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl NetworkInterface {
    pub fn new(index: u32, address: Ipv4Addr, mask: Ipv4Addr) -> Self {
        Self { index, address, mask }
    }

    pub fn network(&self) -> Option<Ipv4Network> {
        Ipv4Network::with_netmask(self.address, self.mask).ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceTable {
    interfaces: Vec<NetworkInterface>,
}

impl InterfaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_interface(&mut self, interface: NetworkInterface) {
        self.interfaces.retain(|iface| iface.index != interface.index);
        self.interfaces.push(interface);
    }

    pub fn get_interface(&self, index: u32) -> Option<&NetworkInterface> {
        self.interfaces.iter().find(|iface| iface.index == index)
    }

    pub fn interfaces(&self) -> &[NetworkInterface] {
        &self.interfaces
    }
}

impl FromIterator<NetworkInterface> for InterfaceTable {
    fn from_iter<T: IntoIterator<Item = NetworkInterface>>(iter: T) -> Self {
        let mut table = InterfaceTable::new();
        for interface in iter {
            table.add_interface(interface);
        }
        table
    }
}

impl InterfaceResolver for InterfaceTable {
    fn find_outgoing_interface(&self, address: Ipv4Addr, mask: Ipv4Addr) -> Option<u32> {
        let prefix = match Ipv4Network::with_netmask(address, mask) {
            Ok(prefix) => prefix,
            Err(e) => {
                log::warn!("Invalid prefix {}/{}: {}", address, mask, e);
                return None;
            }
        };
        let wanted = prefix.network();
        self.interfaces
            .iter()
            .find(|iface| {
                Ipv4Network::with_netmask(iface.address, prefix.mask())
                    .map(|net| net.network() == wanted)
                    .unwrap_or(false)
            })
            .map(|iface| iface.index)
    }
}
