use tracing::debug;

/// SPI: final formatting pass over the assembled URL before it reaches the
/// transport.
pub trait UriHandler: Send + Sync {
    fn expand(&self, url: &str) -> String;
}

/// Default URI handler: percent-encodes each query value, leaving names and
/// URL structure untouched.
///
/// A parameter without a value (`...&flag` or `...&flag=`) is kept verbatim.
pub struct SimpleUriHandler;

impl UriHandler for SimpleUriHandler {
    fn expand(&self, url: &str) -> String {
        let expanded = format_uri(url);
        debug!(url = %expanded, "final request uri");
        expanded
    }
}

fn format_uri(url: &str) -> String {
    let Some(param_start) = url.find('?') else {
        return url.to_string();
    };
    if param_start + 1 == url.len() {
        return url.to_string();
    }

    let head = &url[..=param_start];
    let params = &url[param_start + 1..];
    let encoded = params
        .split('&')
        .map(|pair| match pair.find('=') {
            Some(eq) if eq + 1 < pair.len() => {
                let (name, value) = (&pair[..=eq], &pair[eq + 1..]);
                format!("{name}{}", urlencoding::encode(value))
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");
    format!("{head}{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_query_values() {
        let url = SimpleUriHandler.expand("http://api.local/search?q=a b&lang=en");
        assert_eq!(url, "http://api.local/search?q=a%20b&lang=en");
    }

    #[test]
    fn test_no_query_untouched() {
        let url = SimpleUriHandler.expand("http://api.local/users/1");
        assert_eq!(url, "http://api.local/users/1");
    }

    #[test]
    fn test_trailing_question_mark_untouched() {
        let url = SimpleUriHandler.expand("http://api.local/users?");
        assert_eq!(url, "http://api.local/users?");
    }

    #[test]
    fn test_valueless_param_kept_verbatim() {
        let url = SimpleUriHandler.expand("http://api.local/x?flag&a=1");
        assert_eq!(url, "http://api.local/x?flag&a=1");
    }

    #[test]
    fn test_reserved_characters_encoded() {
        let url = SimpleUriHandler.expand("http://api.local/x?sign=a+b/c");
        assert_eq!(url, "http://api.local/x?sign=a%2Bb%2Fc");
    }
}
