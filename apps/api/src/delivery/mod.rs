//! Delivery — pluggable, trait-based mailer that sends a processed document.
//!
//! Default: `SmtpMailer` (lettre over tokio).
//! `AppState` holds an `Arc<dyn Mailer>`, built at startup from `SmtpConfig`.

pub mod smtp;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::documents::package::Attachment;
use crate::errors::AppError;

pub use smtp::SmtpMailer;

pub const SUBJECT: &str = "Processed Document";
pub const BODY: &str = "Hello,\n\nPlease find the processed document attached.\n";

/// Acknowledgment of an accepted message.
#[derive(Debug, Clone)]
pub struct DeliveryReceipt {
    pub message_id: String,
    pub sent_at: DateTime<Utc>,
}

/// Sends one attachment to one recipient.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, attachment: Attachment) -> Result<DeliveryReceipt, AppError>;
}
