use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Outbound mail relay boundary.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> AppResult<()>;
}

/// SMTP implementation. A fresh transport is built per send to avoid
/// connection pooling issues with the relay.
pub struct SmtpMailer {
    smtp_server: String,
    smtp_port: u16,
    credentials: Credentials,
    from_email: String,
}

impl SmtpMailer {
    pub fn new(config: &Config) -> Self {
        Self {
            smtp_server: config.smtp_server.clone(),
            smtp_port: config.smtp_port,
            credentials: Credentials::new(config.email_user.clone(), config.email_pass.clone()),
            from_email: config.email_user.clone(),
        }
    }

    fn build_transport(&self) -> AppResult<SmtpTransport> {
        Ok(SmtpTransport::relay(&self.smtp_server)
            .map_err(|e| AppError::Internal(format!("SMTP relay error: {}", e)))?
            .port(self.smtp_port)
            .credentials(self.credentials.clone())
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: String) -> AppResult<()> {
        let email = Message::builder()
            .from(
                self.from_email
                    .parse()
                    .map_err(|e| AppError::Internal(format!("Invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid email address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {}", e)))?;

        let mailer = self.build_transport()?;

        tokio::task::spawn_blocking(move || {
            mailer
                .send(&email)
                .map_err(|e| AppError::Internal(format!("Failed to send email: {}", e)))
        })
        .await
        .map_err(|e| AppError::Internal(format!("Email task failed: {}", e)))?
        .map(|_| ())
    }
}
