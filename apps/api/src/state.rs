use std::sync::Arc;

use crate::config::Config;
use crate::delivery::Mailer;

/// Shared application state injected into all route handlers via Axum extractors.
/// Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable mailer. Default: SmtpMailer built from `config.smtp`.
    pub mailer: Arc<dyn Mailer>,
}
