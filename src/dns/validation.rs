use std::net::IpAddr;

/// Returns true when `addr` is a syntactically valid IPv4 or IPv6 literal.
///
/// Checked before any command is built; an invalid address never reaches
/// the OS.
pub fn validate_address(addr: &str) -> bool {
    addr.parse::<IpAddr>().is_ok()
}
