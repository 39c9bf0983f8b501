use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::web;
use actix_web::web::Data;
use actix_web::App;
use actix_web::HttpServer;
use tracing_actix_web::TracingLogger;

use crate::configuration::MissingCredentials;
use crate::configuration::Settings;
use crate::routes::check_relay;
use crate::routes::health_check;
use crate::routes::relay_message;
use crate::telegram_client::TelegramClient;

/// Wrapper for `Server` that also exposes the port it is bound to; this is
/// mostly useful for tests, which bind to a random port.
pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    /// Bind to the configured address and build the server. The server is not
    /// started until `run_until_stopped` is awaited.
    pub async fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(addr)?;
        // port 0 -> random available port, which must be made known to clients
        let port = listener.local_addr()?.port();

        let bot = RelayBot(cfg.telegram.client());
        match &bot.0 {
            Ok(client) => tracing::info!(chat_id = client.chat_id(), "bot relay configured"),
            Err(missing) => tracing::warn!(
                bot_token_set = missing.bot_token,
                chat_id_set = missing.chat_id,
                "bot credentials missing; contact form submissions will be refused"
            ),
        }

        let server = run(listener, bot)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Consumes `self`; the server runs until the process is stopped.
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// Bot client injected into the relay handlers. Missing secrets are a value,
/// not a startup failure: the handlers answer with a configuration error
/// instead.
pub struct RelayBot(pub Result<TelegramClient, MissingCredentials>);

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// API endpoints:
/// - `/health_check` (GET)
/// - `/send-message` (POST: relay a contact form, GET: check bot configuration)
pub fn run(
    listener: TcpListener,
    bot: RelayBot,
) -> Result<Server, anyhow::Error> {
    // `Data` is an `Arc`, so every worker shares the same `reqwest::Client`
    let bot = Data::new(bot);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default()) // wrap the whole app in tracing middleware
            .route("/health_check", web::get().to(health_check))
            .route("/send-message", web::post().to(relay_message))
            .route("/send-message", web::get().to(check_relay))
            .app_data(bot.clone())
    })
    .listen(listener)?
    .run();

    Ok(server) // sync return -- caller uses foo()?.await
}
