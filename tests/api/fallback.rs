use claims::assert_ok_eq;
use contact_relay::configuration::get_configuration;
use contact_relay::domain::ContactForm;
use contact_relay::fallback::Channel;
use contact_relay::fallback::ContactChannels;
use contact_relay::fallback::ContactOutcome;
use contact_relay::fallback::FallbackSequencer;
use contact_relay::fallback::RelayClient;
use contact_relay::fallback::RelayFailure;
use contact_relay::telegram_client::BotCredentials;
use contact_relay::telegram_client::TelegramClient;
use secrecy::Secret;
use wiremock::matchers::any;
use wiremock::matchers::method;
use wiremock::matchers::path;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;

use crate::helpers::rejected_reply;
use crate::helpers::sent_reply;
use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;
use crate::helpers::when_sending_a_message;

const DIRECT_TOKEN: &str = "999:direct";

fn channels() -> ContactChannels {
    ContactChannels {
        mailbox: "me@example.com".to_string(),
        telegram_link: "https://t.me/me".to_string(),
    }
}

fn form() -> ContactForm {
    ContactForm {
        name: "Ann".to_string(),
        email: "a@b.com".to_string(),
        subject: "Hi there".to_string(),
        message: "Hello there".to_string(),
    }
}

fn direct_client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(
        server.uri(),
        BotCredentials {
            token: Secret::new(DIRECT_TOKEN.to_string()),
            chat_id: "1".to_string(),
        },
    )
}

#[tokio::test]
async fn relay_delivers() {
    let app = spawn_app().await;
    when_sending_a_message()
        .respond_with(sent_reply(3))
        .expect(1)
        .mount(&app.bot_server)
        .await;

    let relay = RelayClient::new(app.addr.clone());
    assert_ok_eq!(relay.submit(&form()).await, 3);
}

#[tokio::test]
async fn invalid_form_makes_no_calls() {
    let app = spawn_app().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.bot_server)
        .await;

    let sequencer = FallbackSequencer::new(RelayClient::new(app.addr.clone()), channels());
    let outcome = sequencer
        .submit(ContactForm {
            email: "nope".to_string(),
            ..form()
        })
        .await;

    assert_eq!(
        outcome,
        ContactOutcome::Invalid(vec!["Valid email is required".to_string()])
    );
}

#[tokio::test]
async fn sent_via_relay() {
    let app = spawn_app().await;
    when_sending_a_message()
        .respond_with(sent_reply(3))
        .expect(1)
        .mount(&app.bot_server)
        .await;

    let direct_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&direct_server)
        .await;

    let sequencer = FallbackSequencer::new(RelayClient::new(app.addr.clone()), channels())
        .with_direct_path(direct_client(&direct_server));
    let outcome = sequencer.submit(form()).await;

    match outcome {
        ContactOutcome::Sent { channel, notices } => {
            assert_eq!(channel, Channel::Relay);
            assert_eq!(notices.len(), 1);
            assert_eq!(notices[0].title, "Message sent successfully!");
            assert!(!notices[0].is_error);
        }
        other => panic!("expected relay delivery, got {other:?}"),
    }
}

#[tokio::test]
async fn direct_path_after_relay_failure() {
    // relay without secrets: answers MISSING_CONFIG
    let app = spawn_app_with(None, None).await;

    let direct_server = MockServer::start().await;
    Mock::given(path(format!("/bot{DIRECT_TOKEN}/sendMessage")))
        .and(method("POST"))
        .respond_with(sent_reply(9))
        .expect(1)
        .mount(&direct_server)
        .await;

    let sequencer = FallbackSequencer::new(RelayClient::new(app.addr.clone()), channels())
        .with_direct_path(direct_client(&direct_server));
    let outcome = sequencer.submit(form()).await;

    match outcome {
        ContactOutcome::Sent { channel, notices } => {
            assert_eq!(channel, Channel::Direct);
            // the relay failure is still reported, with the alternatives
            assert!(notices[0].is_error);
            assert!(notices[0].description.contains("me@example.com"));
            assert!(notices[0].description.contains("https://t.me/me"));
            assert_eq!(notices.last().unwrap().title, "Message sent successfully!");
        }
        other => panic!("expected direct delivery, got {other:?}"),
    }
}

#[tokio::test]
async fn mail_client_when_everything_fails() {
    let app = spawn_app().await;
    when_sending_a_message()
        .respond_with(rejected_reply(400, "Bad Request: chat not found"))
        .expect(1)
        .mount(&app.bot_server)
        .await;

    let direct_server = MockServer::start().await;
    Mock::given(any())
        .respond_with(rejected_reply(401, "Unauthorized"))
        .expect(1)
        .mount(&direct_server)
        .await;

    let sequencer = FallbackSequencer::new(RelayClient::new(app.addr.clone()), channels())
        .with_direct_path(direct_client(&direct_server));
    let outcome = sequencer.submit(form()).await;

    match &outcome {
        ContactOutcome::MailClient { link, notices } => {
            assert_eq!(
                link,
                "mailto:me@example.com?subject=Hi%20there&body=Name%3A%20Ann%0AEmail%3A%20a%40b.\
                 com%0A%0AHello%20there"
            );
            // upstream detail is surfaced to the visitor
            assert!(notices[0]
                .description
                .starts_with("Bad Request: chat not found"));
            assert_eq!(notices.last().unwrap().title, "Opening email client");
        }
        other => panic!("expected mail client fallback, got {other:?}"),
    }
    assert_eq!(outcome.notices().len(), 2);
}

#[tokio::test]
async fn relay_unreachable_without_direct_path() {
    // nothing listens on port 1
    let sequencer = FallbackSequencer::new(
        RelayClient::new("http://127.0.0.1:1".to_string()),
        channels(),
    );
    let outcome = sequencer.submit(form()).await;

    match outcome {
        ContactOutcome::MailClient { link, notices } => {
            assert!(link.starts_with("mailto:me@example.com?"));
            assert_eq!(notices[0].title, "Network error");
            assert!(notices[0].is_error);
        }
        other => panic!("expected mail client fallback, got {other:?}"),
    }
}

#[tokio::test]
async fn relay_validation_details_are_joined() {
    // the relay re-validates on its own; simulate a relay with stricter rules
    let relay_server = MockServer::start().await;
    Mock::given(path("/send-message"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "error": "Validation failed",
            "details": ["Name is required", "Subject is required"],
        })))
        .expect(1)
        .mount(&relay_server)
        .await;

    let reply = RelayClient::new(relay_server.uri()).submit(&form()).await;
    assert_eq!(
        reply,
        Err(RelayFailure::Rejected {
            status: 400,
            details: Some("Name is required; Subject is required".to_string()),
        })
    );
}

#[tokio::test]
async fn configured_channels_are_offered() {
    let app = spawn_app_with(None, None).await;
    let contact = get_configuration()
        .expect("Failed to read configuration.")
        .contact;
    let (mailbox, telegram_link) = (contact.mailbox.clone(), contact.telegram_link.clone());

    let sequencer = FallbackSequencer::new(RelayClient::new(app.addr.clone()), contact.into());
    let outcome = sequencer.submit(form()).await;

    match outcome {
        ContactOutcome::MailClient { link, notices } => {
            assert!(link.starts_with(&format!("mailto:{mailbox}?")), "{link}");
            assert!(notices[0].description.contains(&mailbox));
            assert!(notices[0].description.contains(&telegram_link));
        }
        other => panic!("expected mail client fallback, got {other:?}"),
    }
}
