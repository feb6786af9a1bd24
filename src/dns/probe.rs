use tokio::net::lookup_host;

/// Well-known name resolved to judge reachability. The port only satisfies
/// the lookup API; no connection is made.
const PROBE_HOST: &str = "google.com:443";

/// Reports whether a DNS resolution currently succeeds. A boolean signal
/// for the control surface, never a gate on any operation.
pub async fn check_connectivity() -> bool {
    match lookup_host(PROBE_HOST).await {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore]
    async fn test_check_connectivity() {
        assert!(check_connectivity().await);
    }
}
