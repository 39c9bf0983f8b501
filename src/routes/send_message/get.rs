use std::fmt::Debug;

use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;

use crate::configuration::MissingCredentials;
use crate::message::format_test_message;
use crate::routes::error_chain_fmt;
use crate::startup::RelayBot;
use crate::telegram_client::BotInfo;
use crate::telegram_client::BotOutcome;
use crate::telegram_client::UpstreamError;

#[derive(thiserror::Error)]
pub enum DiagnosticError {
    #[error("Missing environment variables")]
    MissingConfig(MissingCredentials),
    #[error("Invalid bot token")]
    InvalidToken(UpstreamError),
    #[error("Failed to send test message")]
    TestMessageRejected(UpstreamError),
    #[error("Network error")]
    NetworkError(String),
}

impl Debug for DiagnosticError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl DiagnosticError {
    /// Remediation hints shown to the operator
    fn instructions(&self) -> Vec<&'static str> {
        match self {
            Self::MissingConfig(_) => vec![
                "1. Check that the configuration files or environment are loaded by the server",
                "2. Verify APP_TELEGRAM__BOT_TOKEN and APP_TELEGRAM__CHAT_ID are set",
                "3. Restart the server",
                "4. Make sure there are no quotes around the values",
            ],
            Self::InvalidToken(_) => vec![
                "1. Verify your bot token is correct",
                "2. Make sure the bot is active",
                "3. Check for any typos in the token",
            ],
            Self::TestMessageRejected(UpstreamError {
                error_code: Some(400),
                ..
            }) => vec![
                "1. Start a conversation with your bot in Telegram",
                "2. Send at least one message to the bot",
                "3. Verify the chat ID is correct",
                "4. Make sure the bot has permission to send messages",
            ],
            Self::TestMessageRejected(_) => vec!["1. Check your chat ID is correct"],
            Self::NetworkError(_) => vec![
                "1. Check your internet connection",
                "2. Verify Telegram API is accessible",
                "3. Try again in a few moments",
            ],
        }
    }
}

impl ResponseError for DiagnosticError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingConfig(_) | Self::NetworkError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidToken(_) | Self::TestMessageRejected(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let instructions = self.instructions();
        let body = match self {
            Self::MissingConfig(missing) => json!({
                "error": self.to_string(),
                "details": {
                    "botToken": missing.bot_token,
                    "chatId": missing.chat_id,
                },
                "instructions": instructions,
            }),
            Self::InvalidToken(e) => json!({
                "error": self.to_string(),
                "details": e.description,
                "instructions": instructions,
            }),
            Self::TestMessageRejected(e) => json!({
                "error": self.to_string(),
                "details": e.description,
                "errorCode": e.error_code,
                "instructions": instructions,
            }),
            Self::NetworkError(msg) => json!({
                "error": self.to_string(),
                "details": msg,
                "instructions": instructions,
            }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TestMessage {
    message_id: i64,
    chat_id: i64,
    date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticReport {
    success: bool,
    message: &'static str,
    bot_info: BotInfo,
    test_message: TestMessage,
}

/// `GET /send-message`
///
/// Checks the configured bot by calling `getMe`, then sending a test message
/// to the configured chat. Intended for the site operator.
#[tracing::instrument(name = "Checking bot configuration", skip(bot))]
pub async fn check_relay(bot: web::Data<RelayBot>) -> Result<HttpResponse, DiagnosticError> {
    let client = bot
        .0
        .as_ref()
        .map_err(|missing| DiagnosticError::MissingConfig(*missing))?;

    let bot_info = match client.get_me().await {
        BotOutcome::Success(info) => info,
        BotOutcome::UpstreamError(e) => return Err(DiagnosticError::InvalidToken(e)),
        BotOutcome::TransportError(msg) => return Err(DiagnosticError::NetworkError(msg)),
    };
    tracing::info!(bot_id = bot_info.id, "bot token valid");

    let text = format_test_message(client.chat_id(), Utc::now());
    let sent = match client.send_message(&text).await {
        BotOutcome::Success(sent) => sent,
        BotOutcome::UpstreamError(e) => return Err(DiagnosticError::TestMessageRejected(e)),
        BotOutcome::TransportError(msg) => return Err(DiagnosticError::NetworkError(msg)),
    };
    tracing::info!(message_id = sent.message_id, "test message sent");

    Ok(HttpResponse::Ok().json(DiagnosticReport {
        success: true,
        message: "Telegram integration is working perfectly!",
        bot_info,
        test_message: TestMessage {
            message_id: sent.message_id,
            chat_id: sent.chat.id,
            date: DateTime::from_timestamp(sent.date, 0),
        },
    }))
}
