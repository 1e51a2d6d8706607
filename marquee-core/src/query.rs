use std::collections::BTreeSet;

use marquee_model::{MovieRecord, Summary};

use crate::error::Result;
use crate::snapshot::SnapshotRepository;
use crate::stats::StatisticsEngine;

/// Read-only view over the newest snapshot.
///
/// Holds no cached data: every call resolves and reads the latest file
/// again, so two calls may observe different snapshots if a write lands in
/// between. Repository errors are passed through untouched.
#[derive(Debug, Clone)]
pub struct QueryService {
    repository: SnapshotRepository,
    stats: StatisticsEngine,
}

impl QueryService {
    pub fn new(repository: SnapshotRepository) -> Self {
        Self {
            repository,
            stats: StatisticsEngine::new(),
        }
    }

    pub fn repository(&self) -> &SnapshotRepository {
        &self.repository
    }

    /// Every record of the latest snapshot, in stored order.
    pub fn list_all(&self) -> Result<Vec<MovieRecord>> {
        Ok(self.repository.latest()?.into_records())
    }

    /// Records whose rating equals `rating`, ignoring case.
    pub fn list_by_rating(&self, rating: &str) -> Result<Vec<MovieRecord>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|record| record.has_rating(rating))
            .collect())
    }

    /// `list_by_rating` when a rating is given, otherwise `list_all`.
    pub fn list(&self, rating: Option<&str>) -> Result<Vec<MovieRecord>> {
        match rating {
            Some(rating) => self.list_by_rating(rating),
            None => self.list_all(),
        }
    }

    /// Unique ratings present in the latest snapshot, ascending.
    pub fn list_distinct_ratings(&self) -> Result<Vec<String>> {
        let ratings: BTreeSet<String> = self
            .repository
            .latest()?
            .into_records()
            .into_iter()
            .map(|record| record.rating)
            .collect();
        Ok(ratings.into_iter().collect())
    }

    pub fn summary(&self) -> Result<Summary> {
        let snapshot = self.repository.latest()?;
        Ok(self.stats.summarize(&snapshot))
    }
}
