//! Small network helpers for the front end.

use tokio::net::lookup_host;
use tracing::debug;

/// Best-effort DNS existence probe for a hostname.
///
/// Used by front ends to warn about typos before a build is started;
/// resolution failure is advisory, never fatal.
pub async fn domain_exists(hostname: &str) -> bool {
    if hostname.is_empty() {
        return false;
    }
    match lookup_host((hostname, 443)).await {
        Ok(mut addrs) => addrs.next().is_some(),
        Err(error) => {
            debug!(hostname, %error, "DNS lookup failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::domain_exists;

    #[tokio::test]
    async fn empty_hostname_does_not_exist() {
        assert!(!domain_exists("").await);
    }

    #[tokio::test]
    async fn localhost_resolves() {
        assert!(domain_exists("localhost").await);
    }

    #[tokio::test]
    async fn invalid_tld_does_not_resolve() {
        assert!(!domain_exists("no-such-host.invalid").await);
    }
}
