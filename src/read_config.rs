// Topology snapshot configuration, one file per host

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use crate::core::neighbor_discovery::StaticRouter;
use crate::core::network_interface::NetworkInterface;
use crate::error::{AppError, Result};
use crate::lsa::{LinkRecord, Lsa, LsaBody, LsaKind};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TopologyConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub routers: Vec<RouterConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RouterConfig {
    pub router_id: Ipv4Addr,
    #[serde(default)]
    pub interfaces: Vec<InterfaceConfig>,
    #[serde(default)]
    pub advertisements: Vec<AdvertisementConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InterfaceConfig {
    pub index: u32,
    pub address: Ipv4Addr,
    pub mask: Ipv4Addr,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AdvertisementConfig {
    pub link_state_id: Ipv4Addr,
    pub kind: LsaKind,
    #[serde(default)]
    pub links: Vec<LinkRecord>,
    pub network_mask: Option<Ipv4Addr>,
    #[serde(default)]
    pub attached_routers: Vec<Ipv4Addr>,
    pub advertising_router: Option<Ipv4Addr>,
}

impl TryFrom<AdvertisementConfig> for Lsa {
    type Error = AppError;

    fn try_from(adv: AdvertisementConfig) -> Result<Self> {
        let missing = |field: &str| {
            AppError::ConfigError(format!("{} advertisement {} has no {}", adv.kind, adv.link_state_id, field))
        };
        let body = match adv.kind {
            LsaKind::Router => LsaBody::Router { links: adv.links.clone() },
            LsaKind::Network => LsaBody::Network {
                network_mask: adv.network_mask.ok_or_else(|| missing("network_mask"))?,
                attached_routers: adv.attached_routers.clone(),
            },
            LsaKind::AsExternal => LsaBody::AsExternal {
                network_mask: adv.network_mask.ok_or_else(|| missing("network_mask"))?,
                advertising_router: adv.advertising_router.ok_or_else(|| missing("advertising_router"))?,
            },
        };
        Ok(Lsa::new(adv.link_state_id, body))
    }
}

impl RouterConfig {
    pub fn into_router(self) -> Result<StaticRouter> {
        let mut router = StaticRouter::new(self.router_id);
        for iface in self.interfaces {
            router.add_interface(NetworkInterface::new(iface.index, iface.address, iface.mask));
        }
        for adv in self.advertisements {
            router.add_advertisement(Lsa::try_from(adv)?);
        }
        Ok(router)
    }
}

/// Parses a topology snapshot from TOML text.
pub fn parse_topology_config(text: &str) -> Result<TopologyConfig> {
    toml::from_str(text).map_err(|e| AppError::ConfigError(format!("Failed to parse topology: {}", e)))
}

/// Reads the topology snapshot at `path`.
pub fn read_topology_config(path: &Path) -> Result<TopologyConfig> {
    if !path.exists() {
        return Err(AppError::ConfigError(format!("Config file not found: {}", path.display())));
    }
    let content = fs::read_to_string(path)?;
    let config = parse_topology_config(&content)?;

    log::info!("Loaded topology with {} routers from {}", config.routers.len(), path.display());
    log::debug!("Config: {:?}", config);
    Ok(config)
}

/// `conf/config_<hostname>.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(PathBuf::from(format!("conf/config_{}.toml", get_hostname()?)))
}

fn get_hostname() -> Result<String> {
    hostname::get()
        .map_err(|e| AppError::ConfigError(format!("Failed to get hostname: {}", e)))?
        .to_string_lossy()
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::ConfigError("Invalid hostname".to_string()))
}
