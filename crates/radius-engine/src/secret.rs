//! Shared-secret resolution.

/// Resolves the RADIUS shared secret for a peer, keyed on the dotted-quad
/// source IP. Invoked synchronously while each datagram is decoded.
///
/// `Config` implements this over its client list; `StaticSecret` serves the
/// single-secret case, and `SecretFn` wraps a plain function.
pub trait SecretProvider: Send + Sync {
    fn shared_secret(&self, nas_ip: &str) -> String;
}

/// One secret for every peer.
pub struct StaticSecret(pub String);

impl SecretProvider for StaticSecret {
    fn shared_secret(&self, _nas_ip: &str) -> String {
        self.0.clone()
    }
}

/// A resolver backed by a function or closure.
pub struct SecretFn<F>(pub F);

impl<F> SecretProvider for SecretFn<F>
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn shared_secret(&self, nas_ip: &str) -> String {
        (self.0)(nas_ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_secret() {
        let provider = StaticSecret("testing123".to_string());
        assert_eq!(provider.shared_secret("192.0.2.1"), "testing123");
        assert_eq!(provider.shared_secret("10.0.0.1"), "testing123");
    }

    #[test]
    fn test_fn_provider() {
        let provider = SecretFn(|nas_ip: &str| {
            if nas_ip == "10.0.0.1" {
                "special".to_string()
            } else {
                "default".to_string()
            }
        });
        assert_eq!(provider.shared_secret("10.0.0.1"), "special");
        assert_eq!(provider.shared_secret("192.0.2.1"), "default");
    }
}
