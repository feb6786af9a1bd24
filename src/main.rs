mod dns;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::Level;

use dns::{
    AppConfig, PrivilegeExecutor, check_connectivity, install_passwordless_access,
    list_eligible_services, load_config, read_current_dns, save_config, switch_dns,
};
use state::DnsState;

#[derive(Parser)]
#[command(
    name = "dns-switcher",
    about = "Switch the DNS servers of every active network service",
    version
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a provider by name, or a literal address, to all eligible services
    Switch {
        /// Provider name from the table, or an IPv4/IPv6 literal
        target: String,
    },
    /// Read the DNS configured on the first eligible service
    Status,
    /// List the configured DNS providers
    Providers {
        /// Write the current table to the config file for editing
        #[arg(long)]
        init: bool,
    },
    /// Install a sudoers policy so future changes skip the password prompt
    InstallPolicy,
    /// Check whether DNS resolution currently works
    Probe,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("failed to load config, using built-in providers: {e}");
            AppConfig::default()
        }
    };

    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands, config: &AppConfig) -> Result<(), String> {
    match command {
        Commands::Switch { target } => switch(config, &target).await,
        Commands::Status => status().await,
        Commands::Providers { init } => providers(config, init),
        Commands::InstallPolicy => install_policy().await,
        Commands::Probe => probe().await,
    }
}

async fn switch(config: &AppConfig, target: &str) -> Result<(), String> {
    let address = match config.find_provider(target) {
        Some(provider) => provider.address.clone(),
        None => target.to_string(),
    };

    let executor = Arc::new(PrivilegeExecutor::new());
    let mut state = DnsState::new();

    let outcome = switch_dns(&executor, &mut state, &address)
        .await
        .map_err(|e| format!("failed to switch DNS: {e}"))?;

    println!("DNS set to {} on:", state.describe());
    for service in &outcome.services {
        println!("  {}", service.name);
    }

    // The verification task only logs; wait for its lines to land before
    // the process exits.
    let _ = outcome.verification.await;
    Ok(())
}

async fn status() -> Result<(), String> {
    let services = list_eligible_services()
        .await
        .map_err(|e| e.to_string())?;
    let Some(reference) = services.first() else {
        return Err("no eligible network services".to_string());
    };

    let executor = PrivilegeExecutor::new();
    let mut state = DnsState::new();
    match read_current_dns(&executor, reference).await {
        Ok(reading) => state.record_reading(reading),
        Err(e) => {
            tracing::warn!("DNS read on {} failed: {e}", reference.name);
            state.mark_unknown();
        }
    }

    println!("{}: {}", reference.name, state.describe());
    Ok(())
}

fn providers(config: &AppConfig, init: bool) -> Result<(), String> {
    for provider in &config.providers {
        println!("{} ({})", provider.name, provider.address);
    }

    if init {
        save_config(config).map_err(|e| format!("failed to write config: {e}"))?;
        println!("Provider table written to the config file.");
    }
    Ok(())
}

async fn install_policy() -> Result<(), String> {
    let executor = PrivilegeExecutor::new();
    install_passwordless_access(&executor)
        .await
        .map_err(|e| format!("failed to install policy: {e}"))?;
    println!("Passwordless access configured; future DNS changes skip the password prompt.");
    Ok(())
}

async fn probe() -> Result<(), String> {
    if check_connectivity().await {
        println!("DNS resolution: ok");
        Ok(())
    } else {
        Err("DNS resolution: failed".to_string())
    }
}
