use std::sync::Arc;

use crate::config::Config;
use crate::observability::Metrics;
use crate::queue::BuildBroker;
use crate::registry::TaskRegistry;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<TaskRegistry>,
    pub broker: Arc<BuildBroker>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(
        config: Config,
        registry: Arc<TaskRegistry>,
        broker: Arc<BuildBroker>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            registry,
            broker,
            metrics: Arc::new(Metrics::new()),
        }
    }
}
