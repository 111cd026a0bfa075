use std::error::Error as StdError;
use std::path::PathBuf;
use log::info;
use spf_routing::core::neighbor_discovery::{RouterDiscovery, StaticRouter};
use spf_routing::init::{build_route_manager, init_logging};
use spf_routing::read_config::{default_config_path, read_topology_config};

fn parse_args() -> spf_routing::Result<(PathBuf, bool)> {
    let mut path = None;
    let mut json = false;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            flag if flag.starts_with('-') => {
                return Err(spf_routing::AppError::ConfigError(format!(
                    "unknown option {} (usage: routing [CONFIG] [--json])",
                    flag
                )));
            }
            _ => path = Some(PathBuf::from(arg)),
        }
    }
    let path = match path {
        Some(path) => path,
        None => default_config_path()?,
    };
    Ok((path, json))
}

fn print_table(router: &StaticRouter) {
    println!("Router {}", router.router_id());
    let routes = router.routing_table().list_routes();
    if routes.is_empty() {
        println!("  (no routes)");
    }
    for route in routes {
        println!("  {}", route);
    }
}

fn main() -> std::result::Result<(), Box<dyn StdError>> {
    let (path, json) = parse_args()?;
    let config = read_topology_config(&path)?;
    init_logging(&config.log_level);

    let mut manager = build_route_manager(config)?;
    let computed = manager.recompute();
    info!("{} routers computed from {}", computed, path.display());

    if json {
        println!("{}", manager.json_report()?);
    } else {
        for router in manager.routers() {
            print_table(router);
        }
    }
    Ok(())
}
