pub mod configuration;
pub mod domain;
pub mod fallback;
pub mod message;
pub mod routes;
pub mod startup;
pub mod telegram_client;
pub mod telemetry;
