use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::configuration::MissingCredentials;
use crate::domain::ContactForm;
use crate::domain::ContactSubmission;
use crate::message::format_contact_message;
use crate::routes::error_chain_fmt;
use crate::startup::RelayBot;
use crate::telegram_client::BotOutcome;
use crate::telegram_client::UpstreamError;

#[derive(thiserror::Error)]
pub enum RelayError {
    /// Bot secrets are absent; retrying will not help, the caller should offer
    /// another way to get in touch.
    #[error("Server configuration error")]
    MissingConfig(MissingCredentials),
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Validation failed")]
    ValidationError(Vec<String>),
    #[error("Failed to send message")]
    UpstreamError(UpstreamError),
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl Debug for RelayError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingConfig(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamError(_) => StatusCode::BAD_GATEWAY,
            Self::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            Self::MissingConfig(_) => json!({
                "error": self.to_string(),
                "code": "MISSING_CONFIG",
            }),
            Self::PayloadTooLarge => json!({
                "error": self.to_string(),
                "details": format!("Request body exceeds {MAX_BODY_BYTES} bytes"),
            }),
            Self::ValidationError(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            Self::UpstreamError(e) => json!({
                "error": self.to_string(),
                "details": e.description,
            }),
            Self::UnexpectedError(e) => json!({
                "error": "Internal server error",
                "details": format!("{e:#}"),
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

/// Upper bound on a contact form body; the bot API caps messages at 4096
/// characters anyway.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RelaySuccess {
    success: bool,
    message: &'static str,
    message_id: i64,
}

/// `POST /send-message`
///
/// Body: `{name, email, subject, message}` as JSON. Relays the submission to
/// the bot chat; one outbound call at most, no retries.
#[tracing::instrument(
    name = "Relaying contact form",
    skip(payload, bot),
    fields(message_id = tracing::field::Empty)
)]
pub async fn relay_message(
    // a raw stream rather than `web::Bytes`/`web::Json`: the body is only read
    // once the bot is known to be configured, and every failure to read it is
    // reported in our own JSON shape
    payload: web::Payload,
    bot: web::Data<RelayBot>,
) -> Result<HttpResponse, RelayError> {
    let client = bot.0.as_ref().map_err(|missing| {
        tracing::error!(?missing, "bot credentials are not configured");
        RelayError::MissingConfig(*missing)
    })?;

    let body = payload
        .to_bytes_limited(MAX_BODY_BYTES)
        .await
        .map_err(|_| RelayError::PayloadTooLarge)?
        .map_err(|e| anyhow::anyhow!("Failed to read request body: {e}"))?;

    let form: ContactForm =
        serde_json::from_slice(&body).context("Failed to parse request body")?;

    let submission = ContactSubmission::try_from(form).map_err(|errors| {
        tracing::info!(?errors, "rejected contact form");
        RelayError::ValidationError(errors)
    })?;

    let text = format_contact_message(&submission, Utc::now());

    match client.send_message(&text).await {
        BotOutcome::Success(sent) => {
            tracing::Span::current().record("message_id", sent.message_id);
            tracing::info!("contact form relayed");
            Ok(HttpResponse::Ok().json(RelaySuccess {
                success: true,
                message: "Message sent successfully",
                message_id: sent.message_id,
            }))
        }
        BotOutcome::UpstreamError(e) => Err(RelayError::UpstreamError(e)),
        BotOutcome::TransportError(msg) => Err(anyhow::anyhow!(msg).into()),
    }
}
