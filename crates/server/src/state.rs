use std::sync::Arc;

use crate::config::Config;
use crate::rate_limit::{FixedWindowLimiter, RateLimiter};
use crate::store::FeedbackStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn FeedbackStore>,
    pub limiter: Arc<dyn RateLimiter>,
    pub config: Arc<Config>,
}

impl AppState {
    /// State with the in-process fixed-window limiter.
    pub fn new(store: Arc<dyn FeedbackStore>, config: Config) -> Self {
        Self::with_limiter(store, Arc::new(FixedWindowLimiter::new()), config)
    }

    pub fn with_limiter(
        store: Arc<dyn FeedbackStore>,
        limiter: Arc<dyn RateLimiter>,
        config: Config,
    ) -> Self {
        Self {
            store,
            limiter,
            config: Arc::new(config),
        }
    }
}
