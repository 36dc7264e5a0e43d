//! # Host Resolver Module
//!
//! Maps a compiled request path to the host that should serve it. The
//! default resolver carries one fixed host string; a custom implementation
//! can pick hosts per call (the template is available for that decision).

use crate::env::resolve_placeholders;
use crate::template::RequestTemplate;

const PATH_SEPARATOR: char = '/';
const DEFAULT_LOCAL_HOST: &str = "http://127.0.0.1:80";

/// Resolves the host half of the final URL.
pub trait HostResolver: Send + Sync {
    fn host(&self) -> String;

    /// Glue the host and path together with exactly one `/` between them.
    fn append_path(&self, path: &str, _template: &RequestTemplate) -> String {
        let host = self.host();
        if !host.ends_with(PATH_SEPARATOR) && !path.starts_with(PATH_SEPARATOR) {
            format!("{host}/{path}")
        } else {
            format!("{host}{path}")
        }
    }
}

/// Fixed-host resolver. A blank host falls back to the local loopback
/// default; `${VAR}` placeholders resolve against the environment.
pub struct DefaultHostResolver {
    host: String,
}

impl DefaultHostResolver {
    #[must_use]
    pub fn new(host: &str) -> Self {
        let resolved = resolve_placeholders(host);
        let host = if resolved.trim().is_empty() {
            DEFAULT_LOCAL_HOST.to_string()
        } else {
            resolved
        };
        Self { host }
    }
}

impl HostResolver for DefaultHostResolver {
    fn host(&self) -> String {
        self.host.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    fn template() -> RequestTemplate {
        RequestTemplate::new(String::new(), "/x".to_string(), Method::GET)
    }

    #[test]
    fn test_blank_host_defaults_to_loopback() {
        let resolver = DefaultHostResolver::new("  ");
        assert_eq!(resolver.host(), "http://127.0.0.1:80");
    }

    #[test]
    fn test_append_path_inserts_single_separator() {
        let resolver = DefaultHostResolver::new("http://api.local");
        assert_eq!(
            resolver.append_path("users", &template()),
            "http://api.local/users"
        );
        assert_eq!(
            resolver.append_path("/users", &template()),
            "http://api.local/users"
        );
    }

    #[test]
    fn test_append_path_host_with_trailing_slash() {
        let resolver = DefaultHostResolver::new("http://api.local/");
        assert_eq!(
            resolver.append_path("users", &template()),
            "http://api.local/users"
        );
    }

    #[test]
    fn test_env_placeholder_resolution() {
        std::env::set_var("RESTBIND_TEST_RESOLVER_HOST", "http://resolved:9090");
        let resolver = DefaultHostResolver::new("${RESTBIND_TEST_RESOLVER_HOST}");
        assert_eq!(resolver.host(), "http://resolved:9090");
    }
}
