use std::sync::Arc;

use crate::{
    config::Config,
    upstream::AuthUpstream,
    utils::cookies::{CookieOptions, SameSite},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub upstream: Arc<dyn AuthUpstream>,
}

impl AppState {
    pub fn new(config: Config, upstream: Arc<dyn AuthUpstream>) -> Self {
        Self { config, upstream }
    }

    /// Attribute fallbacks for cookies the backend did not fully describe.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.config.cookie_secure,
            same_site: SameSite::Lax,
        }
    }
}
