use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment as MailPart, Mailbox, MultiPart, SinglePart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::SmtpConfig;
use crate::delivery::{DeliveryReceipt, Mailer, BODY, SUBJECT};
use crate::documents::package::Attachment;
use crate::errors::AppError;

/// SMTP mailer with a pooled async transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> anyhow::Result<Self> {
        let builder = if config.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?
        } else {
            // Upgrade with STARTTLS when offered, plain otherwise.
            let tls = TlsParameters::new(config.host.clone())?;
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .tls(Tls::Opportunistic(tls))
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .build();

        let from: Mailbox = config
            .from
            .parse()
            .map_err(|e| anyhow::anyhow!("FROM_EMAIL '{}' is not a valid address: {e}", config.from))?;

        Ok(Self { transport, from })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, attachment: Attachment) -> Result<DeliveryReceipt, AppError> {
        let message_id = new_message_id(&self.from);
        let message = build_message(&self.from, to, &message_id, attachment)?;

        self.transport.send(message).await.map_err(|e| {
            warn!("SMTP send to {to} failed: {e}");
            AppError::Delivery(e.to_string())
        })?;

        info!("Delivered {message_id} to {to}");
        Ok(DeliveryReceipt {
            message_id,
            sent_at: chrono::Utc::now(),
        })
    }
}

/// `<uuid@sender-domain>`, unique per message.
fn new_message_id(from: &Mailbox) -> String {
    format!("<{}@{}>", Uuid::new_v4(), from.email.domain())
}

fn build_message(
    from: &Mailbox,
    to: &str,
    message_id: &str,
    attachment: Attachment,
) -> Result<Message, AppError> {
    let to: Mailbox = to
        .trim()
        .parse()
        .map_err(|e| AppError::Validation(format!("Invalid recipient email '{to}': {e}")))?;

    let content_type = ContentType::parse(attachment.content_type)
        .map_err(|e| AppError::Packaging(format!("bad content type: {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(SUBJECT)
        .message_id(Some(message_id.to_string()))
        .multipart(
            MultiPart::mixed()
                .singlepart(SinglePart::plain(BODY.to_string()))
                .singlepart(
                    MailPart::new(attachment.filename).body(attachment.content.to_vec(), content_type),
                ),
        )
        .map_err(|e| AppError::Delivery(format!("failed to build message: {e}")))
}
