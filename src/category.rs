//! Defines the [`Category`] type. Unlike freeform tags, categories are a
//! closed set: every post belongs to exactly one of them, and each one gets
//! its own group of index pages. The pseudo-filter "all posts" is represented
//! by the main index rather than by a [`Category`] value.

use std::fmt;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use url::Url;

/// A blog post category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    Nature,
    Culture,
    Food,
    Cities,
    Tips,
}

/// Every category, in the order the filter row displays them.
pub const ALL: [Category; 5] = [
    Category::Nature,
    Category::Culture,
    Category::Food,
    Category::Cities,
    Category::Tips,
];

impl Category {
    /// The URL-safe identifier, used in frontmatter, badge classes, and index
    /// page paths.
    pub fn name(&self) -> &'static str {
        match self {
            Category::Nature => "nature",
            Category::Culture => "culture",
            Category::Food => "food",
            Category::Cities => "cities",
            Category::Tips => "tips",
        }
    }

    /// The human-readable label shown on filter buttons and badges.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Nature => "Nature & Mountains",
            Category::Culture => "History & Culture",
            Category::Food => "Food & Wine",
            Category::Cities => "Cities & People",
            Category::Tips => "Travel Tips",
        }
    }

    /// The URL of the category's first index page, given the base URL for
    /// index pages. The base URL must end in a trailing slash.
    pub fn index_url(&self, index_base_url: &Url) -> Result<Url, url::ParseError> {
        index_base_url.join(&format!("{}/index.html", self.name()))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = UnknownCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nature" => Ok(Category::Nature),
            "culture" => Ok(Category::Culture),
            "food" => Ok(Category::Food),
            "cities" => Ok(Category::Cities),
            "tips" => Ok(Category::Tips),
            _ => Err(UnknownCategoryError(s.to_owned())),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Category, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse::<Category>()
            .map_err(|e| D::Error::custom(format!("{}", e)))
    }
}

/// Returned when frontmatter names a category outside the closed set.
#[derive(Debug)]
pub struct UnknownCategoryError(pub String);

impl fmt::Display for UnknownCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unknown category `{}`", &self.0)
    }
}

impl std::error::Error for UnknownCategoryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_known_categories() -> Result<(), UnknownCategoryError> {
        for category in ALL.iter() {
            assert_eq!(*category, category.name().parse::<Category>()?);
        }
        Ok(())
    }

    #[test]
    fn test_parse_unknown_category() {
        assert!("wine-tasting".parse::<Category>().is_err());
    }

    #[test]
    fn test_index_url() -> Result<(), url::ParseError> {
        let base = Url::parse("https://example.org/pages/")?;
        assert_eq!(
            "https://example.org/pages/nature/index.html",
            Category::Nature.index_url(&base)?.as_str(),
        );
        Ok(())
    }
}
