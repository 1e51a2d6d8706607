use std::{fmt, sync::Arc};

use marquee_core::{QueryService, SnapshotRepository};

use crate::errors::{AppError, AppResult};
use crate::infra::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub query: Arc<QueryService>,
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("data_dir", &self.config.data_dir)
            .finish_non_exhaustive()
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let repository = SnapshotRepository::new(&config.data_dir);
        Self {
            config: Arc::new(config),
            query: Arc::new(QueryService::new(repository)),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a snapshot read off the async executor. Every call reads the
    /// newest file afresh, so the closure does blocking I/O.
    pub async fn run_query<T, F>(&self, query: F) -> AppResult<T>
    where
        F: FnOnce(&QueryService) -> marquee_core::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = Arc::clone(&self.query);
        tokio::task::spawn_blocking(move || query(&service))
            .await
            .map_err(|err| AppError::internal(format!("snapshot read task failed: {err}")))?
            .map_err(AppError::from)
    }
}
