use env_logger::Env;
use crate::core::neighbor_discovery::StaticRouter;
use crate::core::route_manager::RouteManager;
use crate::error::Result;
use crate::read_config::TopologyConfig;

/// Installs the global logger. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) {
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .try_init();
}

pub fn build_route_manager(config: TopologyConfig) -> Result<RouteManager<StaticRouter>> {
    let mut manager = RouteManager::new();
    for router in config.routers {
        manager.add_router(router.into_router()?);
    }
    log::debug!("route manager ready with {} routers", manager.routers().len());
    Ok(manager)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_config::parse_topology_config;

    #[test]
    fn it_builds_one_router_per_entry() {
        let config = parse_topology_config(
            r#"
[[routers]]
router_id = "10.0.0.1"

[[routers]]
router_id = "10.0.0.2"
"#,
        )
        .unwrap();
        init_logging("warn");
        let manager = build_route_manager(config).unwrap();
        assert_eq!(manager.routers().len(), 2);
        assert!(manager.lsdb().is_empty());
    }
}
