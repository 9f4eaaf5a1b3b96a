//! Naming strategies that derive backend names from source names

use convert_case::{Case, Casing};
use serde::{Deserialize, Serialize};

/// Case conversion applied by a [`NamingStrategy`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCase {
    /// Keep the name as written
    #[default]
    Identity,
    Snake,
    UpperSnake,
    Camel,
    Pascal,
    Lower,
    Upper,
}

/// Maps a source name (method or parameter) to a backend name
///
/// # Examples
///
/// ```
/// use sprocket_dispatch::{NameCase, NamingStrategy};
///
/// let strategy = NamingStrategy::new(NameCase::Snake).with_prefix("p_");
/// assert_eq!(strategy.apply("userId"), "p_user_id");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingStrategy {
    pub case: NameCase,
    /// Prepended after case conversion
    pub prefix: Option<String>,
}

impl NamingStrategy {
    pub fn new(case: NameCase) -> Self {
        Self { case, prefix: None }
    }

    pub fn identity() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn apply(&self, name: &str) -> String {
        let converted = match self.case {
            NameCase::Identity => name.to_string(),
            NameCase::Snake => name.to_case(Case::Snake),
            NameCase::UpperSnake => name.to_case(Case::UpperSnake),
            NameCase::Camel => name.to_case(Case::Camel),
            NameCase::Pascal => name.to_case(Case::Pascal),
            NameCase::Lower => name.to_lowercase(),
            NameCase::Upper => name.to_uppercase(),
        };
        match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, converted),
            None => converted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identity_keeps_name() {
        assert_eq!(NamingStrategy::identity().apply("getUser"), "getUser");
    }

    #[test]
    fn test_case_conversions() {
        assert_eq!(NamingStrategy::new(NameCase::Snake).apply("getUser"), "get_user");
        assert_eq!(
            NamingStrategy::new(NameCase::UpperSnake).apply("getUser"),
            "GET_USER"
        );
        assert_eq!(NamingStrategy::new(NameCase::Camel).apply("get_user"), "getUser");
        assert_eq!(NamingStrategy::new(NameCase::Pascal).apply("get_user"), "GetUser");
        assert_eq!(NamingStrategy::new(NameCase::Upper).apply("getUser"), "GETUSER");
    }

    #[test]
    fn test_prefix_after_case() {
        let strategy = NamingStrategy::new(NameCase::UpperSnake).with_prefix("P_");
        assert_eq!(strategy.apply("accountId"), "P_ACCOUNT_ID");
    }
}
