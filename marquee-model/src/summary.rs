use std::fmt;

/// Aggregate figures over one snapshot.
///
/// `measured_records` counts the records that contributed a length to
/// `average_length`; when it is zero the average is reported as `0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Summary {
    pub average_length: u32,
    /// Every rating tied for the highest count, ascending.
    pub modal_ratings: Vec<String>,
    pub modal_count: usize,
    pub total_records: usize,
    pub measured_records: usize,
}

impl Summary {
    pub fn is_tied(&self) -> bool {
        self.modal_ratings.len() > 1
    }

    /// Ratings joined the way the summary sentence prints them ("PG and R").
    pub fn modal_ratings_text(&self) -> String {
        self.modal_ratings.join(" and ")
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The average length of all movies is {} minutes.",
            self.average_length
        )?;

        if self.modal_ratings.is_empty() {
            return write!(f, " No ratings available.");
        }

        let count_text = if self.modal_count == 1 {
            "movie has"
        } else {
            "movies have"
        };
        let tail = if self.is_tied() {
            "which are the most common ratings."
        } else {
            "which is the most common rating."
        };

        write!(
            f,
            " {} {} the rating of {} {}",
            self.modal_count,
            count_text,
            self.modal_ratings_text(),
            tail
        )
    }
}
