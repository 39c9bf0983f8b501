//! Text sent to the bot chat, and the mail-client fallback link.

use chrono::DateTime;
use chrono::SecondsFormat;
use chrono::Utc;

use crate::domain::ContactSubmission;

/// Telegram legacy `Markdown` only knows these four entity characters; any of
/// them in user input would otherwise make the bot API reject the message with
/// "can't parse entities".
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn timestamp(at: DateTime<Utc>) -> String { at.to_rfc3339_opts(SecondsFormat::Secs, true) }

/// Render a validated submission with the fixed notification template.
pub fn format_contact_message(
    sub: &ContactSubmission,
    received_at: DateTime<Utc>,
) -> String {
    format!(
        "🔔 *New Contact Form Message*

*From:* {name}
*Email:* {email}
*Subject:* {subject}

*Message:*
{message}

*Received:* {received}

---
Sent from Portfolio Website",
        name = escape_markdown(sub.name.as_ref()),
        email = escape_markdown(sub.email.as_ref()),
        subject = escape_markdown(sub.subject.as_ref()),
        message = escape_markdown(sub.message.as_ref()),
        received = timestamp(received_at),
    )
}

/// Message sent by the diagnostic endpoint to prove that the chat is reachable.
pub fn format_test_message(
    chat_id: &str,
    sent_at: DateTime<Utc>,
) -> String {
    format!(
        "🧪 *Test Message*

This is a test from your portfolio website!

✅ Bot token: Valid
✅ Chat ID: {chat_id}
✅ API connection: Working

*Timestamp:* {sent}

If you see this message, your Telegram integration is working perfectly! 🎉",
        chat_id = escape_markdown(chat_id),
        sent = timestamp(sent_at),
    )
}

/// Pre-filled `mailto:` link, the last resort when no network path worked.
pub fn mailto_link(
    mailbox: &str,
    sub: &ContactSubmission,
) -> String {
    let body = format!(
        "Name: {}\nEmail: {}\n\n{}",
        sub.name.as_ref(),
        sub.email.as_ref(),
        sub.message.as_ref()
    );
    format!(
        "mailto:{mailbox}?subject={}&body={}",
        urlencoding::encode(sub.subject.as_ref()),
        urlencoding::encode(&body),
    )
}
