use contact_relay::configuration::get_configuration;
use contact_relay::startup::Application;
use contact_relay::telemetry::get_subscriber;
use contact_relay::telemetry::init_subscriber;

#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("contact-relay", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    // secrets are read once, here, and injected into the handlers
    let cfg = get_configuration()?;

    let app = Application::build(cfg).await?;
    tracing::info!(port = app.get_port(), "listening");
    app.run_until_stopped().await?;

    Ok(())
}
