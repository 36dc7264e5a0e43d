//! # Environment Configuration Module
//!
//! Resolves `${NAME}` placeholders in host and path strings against process
//! environment variables, so client declarations can be parameterised per
//! deployment without code changes:
//!
//! ```rust
//! use restbind::env::resolve_placeholders;
//!
//! std::env::set_var("USER_SERVICE_HOST", "http://users.internal:8080");
//! let host = resolve_placeholders("${USER_SERVICE_HOST}");
//! assert_eq!(host, "http://users.internal:8080");
//! ```
//!
//! A placeholder whose variable is unset is left verbatim, which keeps
//! misconfiguration visible in logs and error messages instead of silently
//! collapsing to an empty string.

use tracing::debug;

/// Replace every `${NAME}` occurrence with the value of the `NAME` environment
/// variable. Unset variables and malformed placeholders are passed through
/// verbatim. Single-pass, no recursion: a resolved value containing `${` is
/// not expanded again.
#[must_use]
pub fn resolve_placeholders(input: &str) -> String {
    if !input.contains("${") {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match std::env::var(name) {
                    Ok(value) => {
                        debug!(placeholder = name, "resolved environment placeholder");
                        out.push_str(&value);
                    }
                    Err(_) => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                // No closing brace; keep the remainder as-is.
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
