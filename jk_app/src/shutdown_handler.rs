use tokio_util::sync::CancellationToken;

/// Sets up a Ctrl+C handler that cancels the token on shutdown signal
///
/// In-flight requests observing the token return `ApiError::Cancelled`
/// instead of waiting out their backoff.
pub fn setup(token: CancellationToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        tracing::info!("Shutdown signal received");
        token.cancel();
    })
}
