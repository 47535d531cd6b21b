/// Crawl target definitions
///
/// A `Source` is immutable once built; its name is validated so it can be
/// embedded in a listing URL path and in an output file name.
use crate::ScraperError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ranking of a listing endpoint
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    New,
    Rising,
    Controversial,
    Top,
}

impl SortOrder {
    /// Returns the path segment / file name form of the sort order
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Rising => "rising",
            Self::Controversial => "controversial",
            Self::Top => "top",
        }
    }

    /// Parses a sort order from its lowercase string form
    ///
    /// Returns None if the string doesn't match any known sort order.
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "rising" => Some(Self::Rising),
            "controversial" => Some(Self::Controversial),
            "top" => Some(Self::Top),
            _ => None,
        }
    }

    /// Returns all sort orders
    pub fn all() -> [Self; 4] {
        [Self::New, Self::Rising, Self::Controversial, Self::Top]
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
            .ok_or_else(|| ScraperError::InvalidSource(format!("unknown sort order '{}'", s)))
    }
}

/// One crawl target: a subreddit name and the sort order to page through
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    name: String,
    sort: SortOrder,
}

impl Source {
    /// Creates a new source
    ///
    /// # Arguments
    ///
    /// * `name` - Subreddit name, without the `r/` prefix
    /// * `sort` - Listing sort order
    ///
    /// # Returns
    ///
    /// * `Ok(Source)` - The name is usable as a path segment
    /// * `Err(ScraperError::InvalidSource)` - The name is empty or not in `[A-Za-z0-9_]`
    pub fn new(name: impl Into<String>, sort: SortOrder) -> Result<Self, ScraperError> {
        let name = name.into();
        validate_source_name(&name)?;
        Ok(Self { name, sort })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r/{} ({})", self.name, self.sort)
    }
}

/// Checks that a source name can be used in a URL path and a file name
pub fn validate_source_name(name: &str) -> Result<(), ScraperError> {
    if name.is_empty() {
        return Err(ScraperError::InvalidSource(
            "source name cannot be empty".to_string(),
        ));
    }

    // Subreddit names are ASCII letters, digits and underscores
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ScraperError::InvalidSource(format!(
            "source name may only contain letters, digits and underscores, got '{}'",
            name
        )));
    }

    Ok(())
}
