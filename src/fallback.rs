//! Client side of the contact form: validate locally, try the relay, then the
//! optional direct bot path, and finally hand over a `mailto:` link.
//!
//! Each step is attempted at most once, in order. Nothing is retried and
//! nothing is remembered between submissions.

use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use crate::configuration::ContactSettings;
use crate::domain::ContactForm;
use crate::domain::ContactSubmission;
use crate::message::format_contact_message;
use crate::message::mailto_link;
use crate::telegram_client::BotOutcome;
use crate::telegram_client::TelegramClient;

/// HTTP client for `POST /send-message` on a relay server.
#[derive(Clone)]
pub struct RelayClient {
    http_client: Client,
    base_url: String,
}

/// Why the relay did not deliver a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayFailure {
    /// The relay answered with an error status; `details` is whatever it
    /// explained, if anything
    Rejected { status: u16, details: Option<String> },
    Unreachable(String),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelaySuccessBody {
    message_id: i64,
}

#[derive(Deserialize)]
struct RelayErrorBody {
    details: Option<Value>,
}

impl RelayClient {
    pub fn new(base_url: String) -> Self {
        Self {
            http_client: Client::new(),
            base_url,
        }
    }

    /// On success, returns the bot message id reported by the relay.
    #[tracing::instrument(name = "Submitting contact form to relay", skip(self, form))]
    pub async fn submit(
        &self,
        form: &ContactForm,
    ) -> Result<i64, RelayFailure> {
        let resp = match self
            .http_client
            .post(format!("{}/send-message", self.base_url.trim_end_matches('/')))
            .json(form)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => return Err(RelayFailure::Unreachable(e.to_string())),
        };

        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<RelaySuccessBody>()
                .await
                .map(|body| body.message_id)
                // delivered or not, we cannot tell
                .map_err(|e| RelayFailure::Unreachable(e.to_string()));
        }

        let details = resp
            .json::<RelayErrorBody>()
            .await
            .ok()
            .and_then(|b| b.details)
            .and_then(|d| match d {
                Value::String(s) => Some(s),
                // validation errors come as a list
                Value::Array(items) => Some(
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .collect::<Vec<_>>()
                        .join("; "),
                ),
                _ => None,
            })
            .filter(|d| !d.is_empty());

        Err(RelayFailure::Rejected {
            status: status.as_u16(),
            details,
        })
    }
}

/// Alternative ways to reach the site owner, shown whenever sending fails.
#[derive(Debug, Clone)]
pub struct ContactChannels {
    pub mailbox: String,
    pub telegram_link: String,
}

impl From<ContactSettings> for ContactChannels {
    fn from(settings: ContactSettings) -> Self {
        Self {
            mailbox: settings.mailbox,
            telegram_link: settings.telegram_link,
        }
    }
}

/// Something to show the visitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub is_error: bool,
}

impl Notice {
    fn info(
        title: &str,
        description: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            is_error: false,
        }
    }

    fn error(
        title: &str,
        description: String,
    ) -> Self {
        Self {
            title: title.to_string(),
            description,
            is_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Relay,
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactOutcome {
    /// Rejected locally; no network call was made
    Invalid(Vec<String>),
    /// The form can be reset
    Sent {
        channel: Channel,
        notices: Vec<Notice>,
    },
    /// Every network path failed; the caller should open `link` with the
    /// platform's mail handler
    MailClient { link: String, notices: Vec<Notice> },
}

impl ContactOutcome {
    pub fn notices(&self) -> &[Notice] {
        match self {
            Self::Invalid(_) => &[],
            Self::Sent { notices, .. } | Self::MailClient { notices, .. } => notices,
        }
    }
}

pub struct FallbackSequencer {
    relay: RelayClient,
    direct: Option<TelegramClient>,
    channels: ContactChannels,
}

impl FallbackSequencer {
    pub fn new(
        relay: RelayClient,
        channels: ContactChannels,
    ) -> Self {
        Self {
            relay,
            direct: None,
            channels,
        }
    }

    /// Enable the direct bot path. This puts a bot token in the client's hands;
    /// only use it where the client environment is trusted.
    pub fn with_direct_path(
        mut self,
        client: TelegramClient,
    ) -> Self {
        tracing::warn!("direct bot path enabled; the bot token is exposed to this client");
        self.direct = Some(client);
        self
    }

    fn failure_notice(
        &self,
        failure: &RelayFailure,
    ) -> Notice {
        let alternatives = format!(
            "You can also reach me at {} or on Telegram ({}).",
            self.channels.mailbox, self.channels.telegram_link
        );
        match failure {
            RelayFailure::Rejected {
                details: Some(details),
                ..
            } => Notice::error("Failed to send message", format!("{details} {alternatives}")),
            RelayFailure::Rejected { details: None, .. } => Notice::error(
                "Failed to send message",
                format!("Please try contacting me directly. {alternatives}"),
            ),
            RelayFailure::Unreachable(_) => Notice::error(
                "Network error",
                format!("Please check your connection and try again. {alternatives}"),
            ),
        }
    }

    #[tracing::instrument(name = "Sending contact form", skip(self, form))]
    pub async fn submit(
        &self,
        form: ContactForm,
    ) -> ContactOutcome {
        let submission = match ContactSubmission::try_from(form.clone()) {
            Ok(s) => s,
            Err(errors) => return ContactOutcome::Invalid(errors),
        };

        let sent = Notice::info(
            "Message sent successfully!",
            "Thank you for your message. I'll get back to you soon.",
        );

        let failure = match self.relay.submit(&form).await {
            Ok(message_id) => {
                tracing::info!(message_id, "delivered via relay");
                return ContactOutcome::Sent {
                    channel: Channel::Relay,
                    notices: vec![sent],
                };
            }
            Err(failure) => failure,
        };
        tracing::warn!(?failure, "relay failed");
        let mut notices = vec![self.failure_notice(&failure)];

        if let Some(direct) = &self.direct {
            let text = format_contact_message(&submission, chrono::Utc::now());
            match direct.send_message(&text).await {
                BotOutcome::Success(sent_msg) => {
                    tracing::info!(message_id = sent_msg.message_id, "delivered via direct path");
                    notices.push(sent);
                    return ContactOutcome::Sent {
                        channel: Channel::Direct,
                        notices,
                    };
                }
                BotOutcome::UpstreamError(e) => {
                    tracing::warn!(description = %e.description, "direct path rejected")
                }
                BotOutcome::TransportError(msg) => {
                    tracing::warn!(error.message = %msg, "direct path unreachable")
                }
            }
        }

        notices.push(Notice::info(
            "Opening email client",
            "We're opening your email client so you can send your message directly.",
        ));
        ContactOutcome::MailClient {
            link: mailto_link(&self.channels.mailbox, &submission),
            notices,
        }
    }
}
