pub mod commands;
pub mod config;
pub mod elevate;
pub mod network;
pub mod policy;
pub mod probe;
pub mod types;
pub mod validation;

pub use commands::{SwitchOutcome, read_current_dns, switch_dns};
pub use config::{AppConfig, load_config, save_config};
pub use elevate::PrivilegeExecutor;
pub use network::list_eligible_services;
pub use policy::install_passwordless_access;
pub use probe::check_connectivity;
pub use types::{CurrentDns, DnsProvider, NetworkService};
