//! Token scopes and permission checks

use serde::{Deserialize, Serialize};

/// Parsed set of token scopes.
///
/// Scopes are stored as a space-separated string (`"read write"`). The
/// wildcard `*` grants everything, including admin operations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scopes(Vec<String>);

impl Scopes {
    /// Parse a space-separated scope string.
    pub fn parse(raw: &str) -> Self {
        Self(raw.split_whitespace().map(|s| s.to_string()).collect())
    }

    /// Scopes granted to a freshly registered (non-admin) user.
    pub fn default_user() -> Self {
        Self(vec!["read".to_string(), "write".to_string()])
    }

    /// All scopes, for admin users and development sessions.
    pub fn all() -> Self {
        Self(vec!["*".to_string()])
    }

    /// Check if a scope is present.
    pub fn has(&self, scope: &str) -> bool {
        self.0.iter().any(|s| s == scope || s == "*")
    }

    /// Check if the holder can read forum content.
    pub fn can_read(&self) -> bool {
        self.has("read")
    }

    /// Check if the holder can create and edit forum content.
    pub fn can_write(&self) -> bool {
        self.has("write")
    }

    /// Check if the holder can administer users, categories and tags.
    pub fn is_admin(&self) -> bool {
        self.has("admin")
    }

    /// Check that every scope in `requested` is also held here.
    ///
    /// Used when minting tokens: a token can never carry more scopes than
    /// the credentials that created it.
    pub fn covers(&self, requested: &Scopes) -> bool {
        requested.0.iter().all(|s| self.has(s))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for Scopes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_check() {
        let scopes = Scopes::parse("read write");
        assert!(scopes.can_read());
        assert!(scopes.can_write());
        assert!(!scopes.is_admin());
    }

    #[test]
    fn test_wildcard() {
        let scopes = Scopes::all();
        assert!(scopes.can_read());
        assert!(scopes.can_write());
        assert!(scopes.is_admin());
        assert!(scopes.has("anything"));
    }

    #[test]
    fn test_covers() {
        let holder = Scopes::parse("read write");
        assert!(holder.covers(&Scopes::parse("read")));
        assert!(holder.covers(&Scopes::parse("read write")));
        assert!(!holder.covers(&Scopes::parse("admin")));

        let admin = Scopes::all();
        assert!(admin.covers(&Scopes::parse("read write admin")));
    }

    #[test]
    fn test_display_round_trip() {
        let scopes = Scopes::parse("read  write");
        assert_eq!(scopes.to_string(), "read write");
        assert_eq!(Scopes::parse(&scopes.to_string()), scopes);
    }

    #[test]
    fn test_empty() {
        let scopes = Scopes::parse("");
        assert!(scopes.is_empty());
        assert!(!scopes.can_read());
    }
}
