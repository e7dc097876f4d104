use std::fmt;

/// Replacement for every character the target loader rejects.
pub const REPLACEMENT: char = '_';

/// An output entry name: destination prefix followed by the sanitized source name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SanitizedName {
    pub original: String,
    pub resolved: String,
}

impl SanitizedName {
    pub fn new(original: &str, destination_prefix: &str) -> Self {
        let mut resolved = String::with_capacity(destination_prefix.len() + original.len());
        resolved.push_str(destination_prefix);
        resolved.push_str(&sanitize_name(original));
        Self {
            original: original.to_string(),
            resolved,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.resolved
    }
}

impl fmt::Display for SanitizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.resolved)
    }
}

/// Replace every character outside `[A-Za-z0-9_.]` with `_`.
///
/// Path separators are replaced too, so nested source entries flatten into
/// the destination directory.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if is_allowed(c) { c } else { REPLACEMENT })
        .collect()
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}
