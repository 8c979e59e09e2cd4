//! Component identifiers

use crate::error::GenerateError;
use std::fmt;

/// Normalized component name: lowercase snake_case, the key into both the
/// dependency catalog and the template tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(String);

impl ComponentId {
    /// Normalize a user- or catalog-supplied name (`DatePicker`, `date-picker`, `date_picker`)
    pub fn parse(name: &str) -> Result<Self, GenerateError> {
        let id = underscore(name.trim());

        // Only plain directory names: nothing that could escape the template or target tree
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

        if valid {
            Ok(Self(id))
        } else {
            Err(GenerateError::InvalidName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// CamelCase to snake_case, keeping acronym runs together (`HTTPHeader` -> `http_header`)
fn underscore(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '-' | ' ' => out.push('_'),
            c if c.is_ascii_uppercase() => {
                if i > 0 {
                    let prev = chars[i - 1];
                    let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_ascii_lowercase());
                    let boundary = prev.is_ascii_lowercase()
                        || prev.is_ascii_digit()
                        || (prev.is_ascii_uppercase() && next_is_lower);
                    if boundary {
                        out.push('_');
                    }
                }
                out.push(c.to_ascii_lowercase());
            }
            c => out.push(c),
        }
    }

    out
}
