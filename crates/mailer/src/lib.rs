//! Transactional email for NexusConnect.
//!
//! Posts JSON to a Resend-compatible HTTP API. Every send is best effort:
//! callers fire these from spawned tasks and the primary request must never
//! fail because an email did not go out. Without an API key the mailer runs
//! disabled and only logs what it would have sent.

use nexus_config::EmailConfig;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("email request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("email provider returned {status}: {body}")]
    Provider { status: u16, body: String },
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: String,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

#[derive(Clone)]
pub struct Mailer {
    http: Option<reqwest::Client>,
    api_key: String,
    base_url: String,
    from_address: String,
    app_url: String,
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> Self {
        let http = if config.api_key.is_some() {
            match reqwest::Client::builder()
                .user_agent("nexusconnect-backend")
                .build()
            {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to build mailer http client, mailer disabled");
                    None
                }
            }
        } else {
            info!("no email api key configured, mailer disabled");
            None
        };

        Self {
            http,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            from_address: config.from_address.clone(),
            app_url: config.app_url.trim_end_matches('/').to_string(),
        }
    }

    /// A mailer that never sends anything. Used by tests and the seeder.
    pub fn disabled() -> Self {
        Self {
            http: None,
            api_key: String::new(),
            base_url: String::new(),
            from_address: String::new(),
            app_url: "http://localhost:9002".to_string(),
        }
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Notify an investor that their collaboration request was accepted.
    pub async fn send_collaboration_accepted(
        &self,
        to: &str,
        investor_name: &str,
        entrepreneur_name: &str,
        entrepreneur_public_id: &str,
    ) -> Result<(), MailerError> {
        let html = self.collaboration_accepted_body(
            investor_name,
            entrepreneur_name,
            entrepreneur_public_id,
        );
        self.send(to, "Your collaboration request was accepted!", &html)
            .await
    }

    fn collaboration_accepted_body(
        &self,
        investor_name: &str,
        entrepreneur_name: &str,
        entrepreneur_public_id: &str,
    ) -> String {
        let chat_link = format!("{}/dashboard/chat/{}", self.app_url, entrepreneur_public_id);
        format!(
            "<p>Hi {investor_name},</p>\
             <p>Good news! <strong>{entrepreneur_name}</strong> has accepted your collaboration request on NexusConnect.</p>\
             <p>You can start a conversation with them here:</p>\
             <a href=\"{chat_link}\">Chat with {entrepreneur_name}</a>\
             <br/><p>Best,</p><p>The NexusConnect Team</p>"
        )
    }

    /// Notify a user that they received a new direct message.
    pub async fn send_new_message(
        &self,
        to: &str,
        receiver_name: &str,
        sender_name: &str,
        sender_public_id: &str,
    ) -> Result<(), MailerError> {
        let subject = format!("You have a new message from {sender_name}");
        let html = self.new_message_body(receiver_name, sender_name, sender_public_id);
        self.send(to, &subject, &html).await
    }

    fn new_message_body(
        &self,
        receiver_name: &str,
        sender_name: &str,
        sender_public_id: &str,
    ) -> String {
        let chat_link = format!("{}/dashboard/chat/{}", self.app_url, sender_public_id);
        format!(
            "<p>Hi {receiver_name},</p>\
             <p>You have a new message from <strong>{sender_name}</strong> on NexusConnect.</p>\
             <p>Click here to view the conversation:</p>\
             <a href=\"{chat_link}\">View Message</a>\
             <br/><p>Best,</p><p>The NexusConnect Team</p>"
        )
    }

    /// Send a password reset link carrying the plaintext token.
    pub async fn send_password_reset(
        &self,
        to: &str,
        name: &str,
        reset_token: &str,
    ) -> Result<(), MailerError> {
        let html = self.password_reset_body(name, reset_token);
        self.send(to, "Reset your NexusConnect password", &html).await
    }

    fn password_reset_body(&self, name: &str, reset_token: &str) -> String {
        let reset_link = format!("{}/reset-password?token={}", self.app_url, reset_token);
        format!(
            "<p>Hi {name},</p>\
             <p>We received a request to reset your NexusConnect password.</p>\
             <p>This link is valid for one hour:</p>\
             <a href=\"{reset_link}\">Reset your password</a>\
             <br/><p>If you did not request this, you can ignore this email.</p>\
             <p>The NexusConnect Team</p>"
        )
    }

    async fn send(&self, to: &str, subject: &str, html: &str) -> Result<(), MailerError> {
        let Some(http) = self.http.as_ref() else {
            debug!(%to, %subject, "mailer disabled, skipping email");
            return Ok(());
        };

        let payload = SendEmailRequest {
            from: format!("NexusConnect <{}>", self.from_address),
            to,
            subject,
            html,
        };

        let response = http
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%to, %subject, status = status.as_u16(), "email provider rejected send");
            return Err(MailerError::Provider {
                status: status.as_u16(),
                body,
            });
        }

        debug!(%to, %subject, "email sent");
        Ok(())
    }
}
