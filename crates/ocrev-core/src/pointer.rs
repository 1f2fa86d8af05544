//! JSON-pointer path building (RFC 6901).
//!
//! Every validation finding carries a pointer locating it inside the
//! submitted document. Checks build these incrementally while walking the
//! value tree.

use std::fmt;

/// An owned JSON pointer, built segment by segment.
///
/// The root pointer renders as the empty string; child segments are escaped
/// per RFC 6901 (`~` → `~0`, `/` → `~1`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct JsonPointer(String);

impl JsonPointer {
    /// The root pointer (`""`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Pointer to a named member of the value at `self`.
    pub fn child(&self, key: &str) -> Self {
        Self(format!("{}/{}", self.0, escape(key)))
    }

    /// Pointer to an array element of the value at `self`.
    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}/{}", self.0, i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JsonPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
