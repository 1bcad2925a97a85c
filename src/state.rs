use std::sync::Arc;

use sms_config::{CookieConfig, CorsConfig, JwtConfig};

use crate::service::StudentService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn StudentService>,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub cookie_config: CookieConfig,
}

impl AppState {
    /// Builds state around `service` with configuration read from the
    /// environment.
    pub fn new(service: Arc<dyn StudentService>) -> Self {
        Self {
            service,
            jwt_config: JwtConfig::from_env(),
            cors_config: CorsConfig::from_env(),
            cookie_config: CookieConfig::from_env(),
        }
    }
}
