//! # Path Template Module
//!
//! Placeholder scan and substitution over URL path templates like
//! `/api/v1/product/{productId}/detail`.
//!
//! The syntax is deliberately small: `{identifier}` placeholders, scanned
//! left-to-right in a single linear pass. There is no nesting and no escaping;
//! a lone `{` without a closing brace is passed through verbatim. This keeps
//! matching O(n) over the path with no regex machinery.

use smallvec::SmallVec;

/// Maximum path variables kept inline before spilling to the heap.
/// Most REST paths carry at most a couple of variables.
pub const MAX_INLINE_PATH_VARS: usize = 4;

/// Stack-allocated (name, value) binding list for path substitution.
pub type PathVarVec = SmallVec<[(String, String); MAX_INLINE_PATH_VARS]>;

const LEFT: char = '{';
const RIGHT: char = '}';

/// Collect the placeholder names of a path template, in order of appearance.
///
/// ```rust
/// use restbind::path_template::extract_names;
///
/// let names = extract_names("/api/project/{projectId}/task/{taskId}");
/// assert_eq!(names, vec!["projectId", "taskId"]);
/// ```
///
/// A `{` that never closes contributes nothing.
#[must_use]
pub fn extract_names(path: &str) -> Vec<String> {
    let mut names = Vec::new();
    if path.trim().is_empty() {
        return names;
    }
    let mut current = String::new();
    let mut in_braces = false;
    for c in path.chars() {
        if c == LEFT && !in_braces {
            in_braces = true;
        } else if c == RIGHT && in_braces {
            in_braces = false;
            names.push(std::mem::take(&mut current));
        } else if in_braces {
            current.push(c);
        }
    }
    names
}

/// Replace each `{name}` in the template with its bound value.
///
/// Bindings are applied in order; placeholders without a binding remain
/// verbatim, as does any text outside a complete `{...}` pair.
///
/// ```rust
/// use restbind::path_template::substitute;
///
/// let path = substitute("/api/v1/product/{id}/detail", &[("id".to_string(), "42".to_string())]);
/// assert_eq!(path, "/api/v1/product/42/detail");
/// ```
#[must_use]
pub fn substitute(path: &str, bindings: &[(String, String)]) -> String {
    if bindings.is_empty() {
        return path.to_string();
    }
    let mut result = path.to_string();
    for (name, value) in bindings {
        let placeholder = format!("{{{name}}}");
        if result.contains(&placeholder) {
            result = result.replace(&placeholder, value);
        }
    }
    result
}
