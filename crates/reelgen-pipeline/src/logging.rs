//! Structured request logging utilities.
//!
//! Provides consistent, structured logging for render requests with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};

/// Request logger for structured logging with consistent formatting.
///
/// Every line carries the request ID and the operation, so one render can
/// be followed through the log regardless of format.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: String,
    operation: String,
}

impl RequestLogger {
    /// Create a new logger for a request and operation.
    ///
    /// # Arguments
    /// * `request_id` - The unique identifier for the request
    /// * `operation` - The type of operation (e.g., "render", "compose_scene")
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Derive a logger for a nested operation of the same request.
    pub fn child(&self, operation: &str) -> Self {
        Self::new(&self.request_id, operation)
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Progress: {}", message
        );
    }

    /// Log progress of one scene with its position in the timeline.
    pub fn log_scene(&self, index: usize, total: usize, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            scene = index + 1,
            scenes = total,
            "Scene {}/{}: {}", index + 1, total, message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Completed: {}", message
        );
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this request.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "request",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = RequestLogger::new("req-123", "render");

        assert_eq!(logger.request_id(), "req-123");
        assert_eq!(logger.operation(), "render");
    }

    #[test]
    fn test_child_keeps_request_id() {
        let child = RequestLogger::new("req-123", "render").child("compose_scene");

        assert_eq!(child.request_id(), "req-123");
        assert_eq!(child.operation(), "compose_scene");
    }
}
