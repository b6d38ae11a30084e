use std::future::Future;

use crate::error::SinkError;

/// Destination for rendered notification text.
///
/// Implementations deliver the whole message or fail; there is no partial
/// delivery and no retry.
pub trait NotificationSink: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Deliver `text`, which may carry lightweight markup (`*bold*`, `_emphasis_`).
    fn send(&self, text: &str) -> impl Future<Output = Result<(), SinkError>> + Send;
}
