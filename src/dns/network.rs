use thiserror::Error;
use tokio::process::Command;

use crate::dns::types::NetworkService;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("failed to list network services: {0}")]
    CommandFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NetworkError>;

/// Services that must never have their DNS reassigned: the Thunderbolt
/// bridge and tethered-device interfaces.
const EXCLUDED_SERVICES: &[&str] = &["Thunderbolt Bridge", "iPhone USB"];

/// Lists the network services eligible for a DNS change, in the order the
/// OS reports them.
///
/// Enumeration runs unprivileged. An empty list is a valid outcome, not an
/// error; the switcher treats it as "nothing to do".
pub async fn list_eligible_services() -> Result<Vec<NetworkService>> {
    let output = Command::new("networksetup")
        .arg("-listallnetworkservices")
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(NetworkError::CommandFailed(stderr.trim().to_string()));
    }

    Ok(parse_service_list(&String::from_utf8_lossy(&output.stdout)))
}

/// The first line is a legend; a `*` prefix marks a disabled service.
fn parse_service_list(output: &str) -> Vec<NetworkService> {
    output
        .lines()
        .skip(1)
        .filter(|line| !line.trim_start().starts_with('*'))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter(|name| !EXCLUDED_SERVICES.contains(name))
        .map(NetworkService::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "An asterisk (*) denotes that a network service is disabled.\n\
                           Wi-Fi\n\
                           Ethernet\n\
                           Thunderbolt Bridge\n";

    fn names(output: &str) -> Vec<String> {
        parse_service_list(output)
            .into_iter()
            .map(|s| s.name)
            .collect()
    }

    #[test]
    fn test_parse_drops_header_and_exclusions() {
        assert_eq!(names(LISTING), vec!["Wi-Fi", "Ethernet"]);
    }

    #[test]
    fn test_parse_drops_disabled_services() {
        let output = "An asterisk (*) denotes that a network service is disabled.\n\
                      *Wi-Fi\n\
                      Ethernet\n";
        assert_eq!(names(output), vec!["Ethernet"]);
    }

    #[test]
    fn test_parse_drops_tethered_devices() {
        let output = "An asterisk (*) denotes that a network service is disabled.\n\
                      iPhone USB\n\
                      Wi-Fi\n";
        assert_eq!(names(output), vec!["Wi-Fi"]);
    }

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let output = "legend\n  Wi-Fi  \n\n";
        assert_eq!(names(output), vec!["Wi-Fi"]);
    }

    #[test]
    fn test_empty_listing_is_not_an_error() {
        assert!(names("An asterisk (*) denotes that a network service is disabled.\n").is_empty());
        assert!(names("").is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn test_list_eligible_services() {
        let services = list_eligible_services().await.expect("should enumerate");
        for service in services {
            assert!(!service.name.is_empty());
            assert!(!EXCLUDED_SERVICES.contains(&service.name.as_str()));
        }
    }
}
