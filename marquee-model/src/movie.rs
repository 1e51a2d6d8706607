/// Category used when the info text carries no usable category segment.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// Rating used when the info text carries no rating segment.
pub const NOT_RATED: &str = "Not Rated";

/// Alternate sentinel some listings print verbatim.
pub const NO_RATING: &str = "No Rating";

pub const UNKNOWN_RATING: &str = "Unknown";

/// A normalized movie listing.
///
/// `rating` is kept as an opaque string: listings use MPAA style labels
/// (`PG-13`, `R`, ...) but nothing guarantees the source sticks to them.
/// `length_minutes` is `None` when no duration could be read; `Some(0)` is a
/// real zero-length entry and is counted by the statistics.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MovieRecord {
    pub name: String,
    pub category: String,
    pub rating: String,
    #[cfg_attr(feature = "serde", serde(rename = "length"))]
    pub length_minutes: Option<u32>,
}

impl MovieRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        rating: impl Into<String>,
        length_minutes: Option<u32>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            rating: rating.into(),
            length_minutes,
        }
    }

    /// Case-insensitive key used for snapshot ordering.
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }

    pub fn has_rating(&self, rating: &str) -> bool {
        self.rating.to_lowercase() == rating.trim().to_lowercase()
    }

    /// False for any of the fallback sentinels.
    pub fn is_rated(&self) -> bool {
        ![NOT_RATED, NO_RATING, UNKNOWN_RATING].contains(&self.rating.as_str())
    }
}
