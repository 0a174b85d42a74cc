//! Product categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Product category.
///
/// The storefront knows a small fixed set of categories. Anything else the
/// entity store sends is kept verbatim in [`Category::Other`] so a new
/// category never breaks catalog parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Streaming,
    Musica,
    Ferramentas,
    Educacao,
    Other(String),
}

impl Category {
    /// Wire value of the category (as stored in the entity store).
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Streaming => "streaming",
            Self::Musica => "musica",
            Self::Ferramentas => "ferramentas",
            Self::Educacao => "educacao",
            Self::Other(raw) => raw,
        }
    }

    /// Section heading shown above the category's products.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::Streaming => "TELAS STREAMING".to_string(),
            Self::Musica => "MÚSICA".to_string(),
            Self::Ferramentas => "FERRAMENTAS".to_string(),
            Self::Educacao => "EDUCAÇÃO".to_string(),
            Self::Other(raw) => raw.to_uppercase(),
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "streaming" => Self::Streaming,
            "musica" => Self::Musica,
            "ferramentas" => Self::Ferramentas,
            "educacao" => Self::Educacao,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        match category {
            Category::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_known_categories_parse() {
        let category: Category = serde_json::from_str("\"streaming\"").unwrap();
        assert_eq!(category, Category::Streaming);
        assert_eq!(category.title(), "TELAS STREAMING");
        assert_eq!(Category::from("educacao").title(), "EDUCAÇÃO");
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let category: Category = serde_json::from_str("\"games\"").unwrap();
        assert_eq!(category, Category::Other("games".to_string()));
        assert_eq!(category.as_str(), "games");
        assert_eq!(category.title(), "GAMES");
        assert_eq!(serde_json::to_string(&category).unwrap(), "\"games\"");
    }

    #[test]
    fn test_matching_is_exact() {
        // Case matters: the entity store's values are lowercase.
        assert_eq!(
            Category::from("Streaming"),
            Category::Other("Streaming".to_string())
        );
    }
}
