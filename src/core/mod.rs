// Route computation core: link-state database, SPF engine and the router collaborators it drives

pub mod candidate_queue;
pub mod lsdb;
pub mod neighbor_discovery;
pub mod network_interface;
pub mod path_calculation;
pub mod route_installer;
pub mod route_manager;
pub mod routing_table;
pub mod vertex;
