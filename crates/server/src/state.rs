use std::sync::Arc;
use std::time::Duration;

use opsdesk_core::{Cache, Config, ReportPipeline, SanitizedConfig, TicketRouter};

/// Shared application state
pub struct AppState {
    config: Config,
    router: TicketRouter,
    pipeline: Arc<ReportPipeline>,
    cache: Arc<dyn Cache>,
}

impl AppState {
    pub fn new(
        config: Config,
        router: TicketRouter,
        pipeline: Arc<ReportPipeline>,
        cache: Arc<dyn Cache>,
    ) -> Self {
        Self {
            config,
            router,
            pipeline,
            cache,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn router(&self) -> &TicketRouter {
        &self.router
    }

    pub fn pipeline(&self) -> Arc<ReportPipeline> {
        Arc::clone(&self.pipeline)
    }

    pub fn cache(&self) -> Arc<dyn Cache> {
        Arc::clone(&self.cache)
    }

    pub fn status_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.config.reports.status_cache_ttl_secs)
    }
}
