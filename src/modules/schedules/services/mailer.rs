use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::MailConfig;
use crate::core::{AppError, Result};
use crate::modules::reports::services::ExportArtifact;

/// One report email: plain-text body plus the artifact as an attachment
#[derive(Debug, Clone)]
pub struct ReportEmail<'a> {
    pub recipients: &'a [String],
    pub subject: String,
    pub body: String,
    pub artifact: &'a ExportArtifact,
}

/// Email delivery collaborator for scheduled reports
#[async_trait]
pub trait ReportMailer: Send + Sync {
    async fn send(&self, email: &ReportEmail<'_>) -> Result<()>;
}

/// SMTP delivery through lettre's async transport
pub struct SmtpReportMailer {
    config: MailConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpReportMailer {
    pub fn new(config: MailConfig) -> Result<Self> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| AppError::Configuration(format!("Failed to create SMTP relay: {}", e)))?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }

    fn build_message(&self, email: &ReportEmail<'_>) -> Result<Message> {
        let from: Mailbox = format!("{} <{}>", self.config.from_name, self.config.from_address)
            .parse()
            .map_err(|e| AppError::delivery(format!("Invalid from address: {}", e)))?;

        let mut builder = Message::builder().from(from).subject(email.subject.clone());
        for recipient in email.recipients {
            let to: Mailbox = recipient
                .trim()
                .parse()
                .map_err(|e| {
                    AppError::delivery(format!("Invalid recipient '{}': {}", recipient, e))
                })?;
            builder = builder.to(to);
        }

        let content_type = ContentType::parse(email.artifact.mime_type)
            .map_err(|e| AppError::delivery(format!("Invalid attachment type: {}", e)))?;
        let attachment = Attachment::new(email.artifact.filename.clone())
            .body(email.artifact.bytes.clone(), content_type);

        builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.body.clone()),
                    )
                    .singlepart(attachment),
            )
            .map_err(|e| AppError::delivery(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl ReportMailer for SmtpReportMailer {
    async fn send(&self, email: &ReportEmail<'_>) -> Result<()> {
        let transport = self
            .transport
            .as_ref()
            .ok_or_else(|| AppError::delivery("SMTP delivery is not enabled"))?;

        let message = self.build_message(email)?;
        transport
            .send(message)
            .await
            .map_err(|e| AppError::delivery(format!("Failed to send email: {}", e)))?;

        info!(
            recipients = email.recipients.len(),
            subject = %email.subject,
            attachment = %email.artifact.filename,
            "Report email sent"
        );

        Ok(())
    }
}
