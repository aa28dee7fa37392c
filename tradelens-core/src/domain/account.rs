use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a copy-trading portfolio (the `Port_IDs` column).
///
/// Kept as an opaque string: exports mix numeric and alphanumeric IDs, and
/// numeric-looking IDs can exceed `i64`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_id() {
        let id = AccountId::new("3987739404363490816");
        assert_eq!(id.to_string(), "3987739404363490816");
        assert_eq!(id.as_str(), "3987739404363490816");
    }

    #[test]
    fn serializes_transparently() {
        let id = AccountId::from("A");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"A\"");
        let back: AccountId = serde_json::from_str("\"A\"").unwrap();
        assert_eq!(back, id);
    }
}
