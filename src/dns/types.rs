use std::fmt;

use serde::{Deserialize, Serialize};

/// A configurable network service as reported by `networksetup`.
///
/// Re-enumerated on every switch request; names are only valid for the
/// request that produced them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct NetworkService {
    pub name: String,
}

impl NetworkService {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The service name quoted for interpolation into a shell command.
    /// Service names regularly contain spaces ("Thunderbolt Bridge").
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.name)
    }
}

/// A DNS provider offered by the control surface. The provider table is
/// ordered; insertion order is presentation order.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Debug)]
pub struct DnsProvider {
    pub name: String,
    pub address: String,
}

impl DnsProvider {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// DNS configuration reported by the OS for a single service.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CurrentDns {
    /// The first configured server.
    Servers(String),
    /// No servers configured; the service uses DHCP-supplied DNS.
    Automatic,
}

impl fmt::Display for CurrentDns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentDns::Servers(address) => f.write_str(address),
            CurrentDns::Automatic => f.write_str("Automatic"),
        }
    }
}
