//! Per-call key/value metadata.
//!
//! Each RPC carries an ordered mapping from header name to string value, in
//! both directions. The authentication protocol uses exactly two entries:
//! the client's public key on every call, and an authentication tag once a
//! session secret exists.

/// Header carrying the base64url-encoded P-256 public key.
///
/// Attached unconditionally on every outgoing call; present on handshake
/// replies carrying the server's key.
pub const PUBLIC_KEY_HEADER: &str = "public-key";

/// Header carrying the base64url-encoded HMAC-SHA256 tag over the canonical
/// serialized request payload.
///
/// Attached iff a session secret exists at send time; client-to-server only.
pub const AUTH_TOKEN_HEADER: &str = "auth-token";

/// Ordered per-call metadata.
///
/// Insertion order is preserved; inserting an existing header overwrites its
/// value in place.
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    entries: Vec<(String, String)>,
}

impl CallMetadata {
    /// Create empty metadata.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `name` to `value`, overwriting any existing entry.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.into(),
            None => self.entries.push((name.to_owned(), value.into())),
        }
    }

    /// Get the value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the metadata is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
