//! SMTP delivery of job digests.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use job_alerts::notify::Digest;
use job_alerts::{AlertError, JobRecord, Notifier};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::EmailConfig;

/// Sends one multipart (text + HTML) digest per batch over a STARTTLS relay.
pub struct EmailNotifier {
    from: Mailbox,
    to: Mailbox,
    mailer: SmtpTransport,
}

impl EmailNotifier {
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let from: Mailbox = config
            .sender
            .parse()
            .with_context(|| format!("SENDER_EMAIL is not a valid address: {}", config.sender))?;
        let to: Mailbox = config
            .recipient
            .parse()
            .with_context(|| format!("RECIPIENT_EMAIL is not a valid address: {}", config.recipient))?;

        let creds = Credentials::new(config.username.clone(), config.password.clone());
        let mailer = SmtpTransport::starttls_relay(&config.smtp_server)
            .with_context(|| format!("Invalid SMTP server: {}", config.smtp_server))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { from, to, mailer })
    }

    /// Recipient, for log lines.
    pub fn recipient(&self) -> String {
        self.to.to_string()
    }

    /// Send a single fake posting to check the SMTP settings.
    pub async fn send_test(&self) -> job_alerts::Result<()> {
        let job = JobRecord::new(
            "Test Job Posting",
            "Test Company",
            "https://example.com",
            "test",
        )
        .with_location("Remote")
        .with_description(
            "This is a test email to verify your job alert system is working correctly.",
        );
        self.notify(&[job]).await
    }

    fn build_message(&self, jobs: &[JobRecord]) -> job_alerts::Result<Message> {
        let digest = Digest::render(jobs, Utc::now());
        Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(digest.subject)
            .multipart(MultiPart::alternative_plain_html(digest.text, digest.html))
            .map_err(AlertError::notify)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, jobs: &[JobRecord]) -> job_alerts::Result<()> {
        if jobs.is_empty() {
            return Ok(());
        }

        let message = self.build_message(jobs)?;
        let mailer = self.mailer.clone();

        // lettre's SMTP transport is blocking
        tokio::task::spawn_blocking(move || mailer.send(&message))
            .await
            .map_err(AlertError::notify)?
            .map_err(AlertError::notify)?;

        tracing::info!(jobs = jobs.len(), to = %self.to, "Email sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "email"
    }
}
