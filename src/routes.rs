mod health_check;
mod send_message;

pub use health_check::*;
pub use send_message::*;

/// Print an error followed by its whole chain of sources, so that the cause is
/// not lost when the error is logged with `{:?}`.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
