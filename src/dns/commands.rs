use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::dns::elevate::{ElevateError, PrivilegeExecutor};
use crate::dns::network::{self, NetworkError};
use crate::dns::types::{CurrentDns, NetworkService};
use crate::dns::validation::validate_address;
use crate::state::DnsState;

#[derive(Error, Debug)]
pub enum DnsCommandError {
    #[error(transparent)]
    Elevation(#[from] ElevateError),
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error("not a valid IPv4 or IPv6 address: {0}")]
    InvalidAddress(String),
    #[error("no eligible network services to configure")]
    NoEligibleServices,
    #[error("unexpected output from networksetup: {0:?}")]
    ParseFailure(String),
}

pub type Result<T> = std::result::Result<T, DnsCommandError>;

/// Delay before the post-switch verification read.
const VERIFY_DELAY: Duration = Duration::from_secs(1);

/// Sentence networksetup prints when a service has no DNS servers set.
const NO_SERVERS_MARKER: &str = "aren't any DNS Servers";

/// Result of a completed switch.
pub struct SwitchOutcome {
    /// Services the address was applied to, in enumeration order.
    pub services: Vec<NetworkService>,
    /// The detached verification task. Purely observational; callers may
    /// await it before exiting, or drop it.
    pub verification: JoinHandle<()>,
}

/// Reads the configured DNS of one reference service.
///
/// Failures are for the caller to map to "unknown" state; an explicit
/// "no servers set" answer is [`CurrentDns::Automatic`], which is a
/// different thing.
pub async fn read_current_dns(
    executor: &PrivilegeExecutor,
    service: &NetworkService,
) -> Result<CurrentDns> {
    let command = format!("networksetup -getdnsservers {}", service.quoted());
    let output = executor.run_elevated(&command).await?;
    parse_dns_servers(&output)
}

/// One server per line; only the first is reported.
fn parse_dns_servers(output: &str) -> Result<CurrentDns> {
    let first_line = output.lines().next().map(str::trim).unwrap_or("");
    if first_line.is_empty() {
        return Err(DnsCommandError::ParseFailure(output.to_string()));
    }
    if first_line.contains(NO_SERVERS_MARKER) {
        return Ok(CurrentDns::Automatic);
    }
    Ok(CurrentDns::Servers(first_line.to_string()))
}

fn build_switch_command(services: &[NetworkService], address: &str) -> String {
    services
        .iter()
        .map(|service| format!("networksetup -setdnsservers {} {}", service.quoted(), address))
        .collect::<Vec<_>>()
        .join(" && ")
}

/// Applies `address` to every eligible service as one elevated transaction,
/// then schedules a delayed verification read against the first service.
///
/// The service list is enumerated fresh on every call, and the switch is
/// executed in full even when `state` already records `address`, since the
/// recorded state may be stale relative to the OS.
pub async fn switch_dns(
    executor: &Arc<PrivilegeExecutor>,
    state: &mut DnsState,
    address: &str,
) -> Result<SwitchOutcome> {
    if !validate_address(address) {
        return Err(DnsCommandError::InvalidAddress(address.to_string()));
    }

    let services = network::list_eligible_services().await?;
    apply_dns(executor, state, services, address).await
}

/// The sub-commands short-circuit on `&&`, so a failure on service *i*
/// stops the batch before *i+1..n*; the OS error for the failing service is
/// surfaced and `state` stays untouched.
async fn apply_dns(
    executor: &Arc<PrivilegeExecutor>,
    state: &mut DnsState,
    services: Vec<NetworkService>,
    address: &str,
) -> Result<SwitchOutcome> {
    if services.is_empty() {
        return Err(DnsCommandError::NoEligibleServices);
    }

    let command = build_switch_command(&services, address);
    tracing::debug!(
        "applying DNS {address} to {} services with a single prompt",
        services.len()
    );
    executor.run_elevated(&command).await?;

    state.record_applied(address);
    tracing::info!("DNS set to {address} on all eligible services");

    let verification = spawn_verification(
        Arc::clone(executor),
        services[0].clone(),
        address.to_string(),
    );

    Ok(SwitchOutcome {
        services,
        verification,
    })
}

/// The verification read is observability, not a gate: it runs after a
/// fixed delay, never blocks the switch, and never writes [`DnsState`].
fn spawn_verification(
    executor: Arc<PrivilegeExecutor>,
    service: NetworkService,
    expected: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(VERIFY_DELAY).await;
        match read_current_dns(&executor, &service).await {
            Ok(CurrentDns::Servers(actual)) if actual == expected => {
                tracing::info!("verified {expected} on {}", service.name);
            }
            Ok(reading) => {
                tracing::warn!(
                    "verification on {} expected {expected}, found {reading}",
                    service.name
                );
            }
            Err(e) => {
                tracing::warn!("verification read on {} failed: {e}", service.name);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_takes_first_server_line() {
        assert_eq!(
            parse_dns_servers("8.8.8.8\n8.8.4.4\n").unwrap(),
            CurrentDns::Servers("8.8.8.8".to_string())
        );
        assert_eq!(
            parse_dns_servers("  1.1.1.1  \n").unwrap(),
            CurrentDns::Servers("1.1.1.1".to_string())
        );
    }

    #[test]
    fn test_parse_detects_unset_dns() {
        assert_eq!(
            parse_dns_servers("There aren't any DNS Servers set on Wi-Fi.\n").unwrap(),
            CurrentDns::Automatic
        );
    }

    #[test]
    fn test_parse_rejects_empty_output() {
        assert!(matches!(
            parse_dns_servers(""),
            Err(DnsCommandError::ParseFailure(_))
        ));
        assert!(matches!(
            parse_dns_servers("\n\n"),
            Err(DnsCommandError::ParseFailure(_))
        ));
    }

    #[test]
    fn test_build_switch_command_joins_with_and() {
        let services = vec![
            NetworkService::new("Wi-Fi"),
            NetworkService::new("Ethernet"),
        ];
        let command = build_switch_command(&services, "1.1.1.1");
        assert_eq!(
            command,
            "networksetup -setdnsservers \"Wi-Fi\" 1.1.1.1 && \
             networksetup -setdnsservers \"Ethernet\" 1.1.1.1"
        );
        assert_eq!(command.matches("-setdnsservers").count(), 2);
    }

    #[tokio::test]
    async fn test_switch_rejects_invalid_address() {
        let executor = Arc::new(PrivilegeExecutor::new());
        let mut state = DnsState::new();

        let result = switch_dns(&executor, &mut state, "not-an-address").await;
        assert!(matches!(
            result,
            Err(DnsCommandError::InvalidAddress(addr)) if addr == "not-an-address"
        ));
        assert_eq!(state.current(), None);
    }

    #[tokio::test]
    async fn test_apply_with_no_services_leaves_state_untouched() {
        let executor = Arc::new(PrivilegeExecutor::new());
        let mut state = DnsState::new();

        let result = apply_dns(&executor, &mut state, Vec::new(), "1.1.1.1").await;
        assert!(matches!(result, Err(DnsCommandError::NoEligibleServices)));
        assert_eq!(state.current(), None);
    }
}
