use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Liveness probe; says nothing about whether the bot is configured (see
/// `GET /send-message` for that).
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
