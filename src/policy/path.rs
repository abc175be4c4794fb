//! Path normalization helpers

/// Strip a single trailing slash, unless the path is the root
pub fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Resource identifier of a gated path: the single segment after `prefix`
///
/// `prefix` is expected to end with `/`. Returns `None` for the bare prefix and for
/// nested paths, which the gated route does not serve.
pub fn gated_resource_id<'a>(prefix: &str, path: &'a str) -> Option<&'a str> {
    let rest = path.strip_prefix(prefix)?;
    let rest = rest.strip_suffix('/').unwrap_or(rest);
    if rest.is_empty() || rest.contains('/') {
        return None;
    }
    Some(rest)
}
