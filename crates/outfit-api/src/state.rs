//! Application state.
//!
//! Providers are held as trait objects so the HTTP layer never couples to a
//! concrete adapter; tests inject recording mocks through the same slots. A
//! provider slot is `None` when its credentials are not configured, and the
//! corresponding endpoint reports a configuration error.

use outfit_core::Config;
use outfit_providers::ImageProvider;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub openai: Option<Arc<dyn ImageProvider>>,
    pub gemini: Option<Arc<dyn ImageProvider>>,
}

impl AppState {
    pub fn new(
        config: Config,
        openai: Option<Arc<dyn ImageProvider>>,
        gemini: Option<Arc<dyn ImageProvider>>,
    ) -> Self {
        Self {
            config,
            openai,
            gemini,
        }
    }
}
