use crate::error::AppError;
use async_trait::async_trait;

/// Outbound notification collaborator.
///
/// Delivery is fire-and-forget from the flows' point of view: they call
/// [`send_best_effort`] only after the relevant token/state is durably
/// persisted, and a delivery failure never rolls that state back. The user
/// can always request again.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Writes outbound mail to the application log instead of delivering it.
///
/// Default transport for local development and the test suites.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        log::info!("mail to {}: [{}] {}", to, subject, body);
        Ok(())
    }
}

/// Sends, logging failures instead of propagating them.
pub async fn send_best_effort(notifier: &dyn Notifier, to: &str, subject: &str, body: &str) {
    if let Err(e) = notifier.send(to, subject, body).await {
        log::warn!("Failed to deliver '{}' to {}: {}", subject, to, e);
    }
}
