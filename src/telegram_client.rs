use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;

/// The two secrets required to talk to the bot API.
#[derive(Clone, Debug)]
pub struct BotCredentials {
    pub token: Secret<String>,
    /// Destination chat (user id, group id or `@channel`)
    pub chat_id: String,
}

/// Thin client for the subset of the Telegram Bot API used by the relay.
///
/// Establishing a HTTP connection is expensive, so a single `Client` is kept
/// for the lifetime of the app (`Client` is an `Arc` internally, cloning is
/// cheap).
#[derive(Clone)]
pub struct TelegramClient {
    http_client: Client,
    base_url: String,
    credentials: BotCredentials,
}

/// Every bot API method replies with this envelope, whatever the HTTP status.
#[derive(Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<u16>,
}

/// Failure explicitly reported by the bot API (`ok: false`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    pub description: String,
    pub error_code: Option<u16>,
}

/// Result of a single bot API call. There are no retries; callers branch on
/// all three cases.
#[derive(Debug)]
pub enum BotOutcome<T> {
    Success(T),
    /// The API answered and refused the call
    UpstreamError(UpstreamError),
    /// No usable answer; the call may or may not have taken effect
    TransportError(String),
}

/// `getMe` result
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotInfo {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// `sendMessage` result; only the fields the relay reports back
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
    /// Unix time
    pub date: i64,
    pub chat: Chat,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

impl TelegramClient {
    pub fn new(
        base_url: String,
        credentials: BotCredentials,
    ) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
            credentials,
        }
    }

    pub fn chat_id(&self) -> &str { &self.credentials.chat_id }

    /// The token is part of the path, so this must never be logged
    fn method_url(
        &self,
        method: &str,
    ) -> String {
        format!(
            "{}/bot{}/{method}",
            self.base_url.trim_end_matches('/'),
            self.credentials.token.expose_secret()
        )
    }

    /// Identity check; used to verify the token.
    #[tracing::instrument(name = "Calling bot API getMe", skip(self))]
    pub async fn get_me(&self) -> BotOutcome<BotInfo> {
        let resp = self.http_client.get(self.method_url("getMe")).send().await;
        read_reply(resp).await
    }

    /// Post `text` (legacy Markdown) to the configured chat.
    #[tracing::instrument(name = "Calling bot API sendMessage", skip(self, text))]
    pub async fn send_message(
        &self,
        text: &str,
    ) -> BotOutcome<SentMessage> {
        let body = SendMessageRequest {
            chat_id: &self.credentials.chat_id,
            text,
            parse_mode: "Markdown",
        };
        let resp = self
            .http_client
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await;
        read_reply(resp).await
    }
}

async fn read_reply<T: DeserializeOwned>(
    resp: Result<reqwest::Response, reqwest::Error>
) -> BotOutcome<T> {
    // `without_url` keeps the token out of the error text
    let resp = match resp {
        Ok(r) => r,
        Err(e) => {
            let e = e.without_url();
            tracing::error!(error.message=%e, "bot API unreachable");
            return BotOutcome::TransportError(e.to_string());
        }
    };

    let status = resp.status();
    let reply = match resp.json::<ApiReply<T>>().await {
        Ok(r) => r,
        Err(e) => {
            let e = e.without_url();
            tracing::error!(error.message=%e, %status, "unreadable bot API reply");
            return BotOutcome::TransportError(format!("Unreadable reply from bot API: {e}"));
        }
    };

    match (reply.ok, reply.result) {
        (true, Some(result)) => BotOutcome::Success(result),
        (true, None) => BotOutcome::TransportError("Bot API reply had no result".to_string()),
        (false, _) => {
            let err = UpstreamError {
                description: reply
                    .description
                    .unwrap_or_else(|| "Unknown error".to_string()),
                error_code: reply.error_code,
            };
            tracing::warn!(
                description = %err.description,
                error_code = ?err.error_code,
                %status,
                "bot API rejected the call"
            );
            BotOutcome::UpstreamError(err)
        }
    }
}
