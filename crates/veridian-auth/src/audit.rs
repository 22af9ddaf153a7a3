//! Security event audit logging.
//!
//! The engine never surfaces the concrete reason a credential check
//! failed; that reason goes to an [`AuditSink`] instead. The sink is
//! fire-and-forget: callers swallow sink failures after logging them,
//! so a broken audit backend can never take down a login path.

use async_trait::async_trait;

use crate::AuthResult;

/// Outcome of an audited operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    /// The operation succeeded.
    Success,
    /// The operation failed.
    Failure,
}

impl AuditOutcome {
    /// Returns the outcome as a string for structured logging.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Sink for security-relevant events.
///
/// Implementations persist events to the platform's audit log. The
/// engine only depends on this narrow contract; persistence details are
/// out of scope.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Records an event.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The affected user, when known
    /// * `action` - Short action name, e.g. `"login"`, `"token.refresh"`
    /// * `outcome` - Whether the operation succeeded
    /// * `reason` - Failure reason, when there is one worth recording
    ///
    /// # Errors
    ///
    /// Returns an error if the sink write fails. Callers must treat the
    /// error as non-fatal.
    async fn record(
        &self,
        user_id: Option<&str>,
        action: &str,
        outcome: AuditOutcome,
        reason: Option<&str>,
    ) -> AuthResult<()>;
}

/// Audit sink that emits events through `tracing`.
///
/// The default sink for deployments that ship audit events via the
/// structured log pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(
        &self,
        user_id: Option<&str>,
        action: &str,
        outcome: AuditOutcome,
        reason: Option<&str>,
    ) -> AuthResult<()> {
        tracing::info!(
            target: "veridian::audit",
            user_id = user_id.unwrap_or("-"),
            action,
            outcome = outcome.as_str(),
            reason = reason.unwrap_or("-"),
            "audit event"
        );
        Ok(())
    }
}

/// Records an event on a sink, swallowing sink failures.
///
/// This is the single place the fire-and-forget policy is implemented:
/// a failed audit write is logged and dropped.
pub async fn record_event(
    sink: &dyn AuditSink,
    user_id: Option<&str>,
    action: &str,
    outcome: AuditOutcome,
    reason: Option<&str>,
) {
    if let Err(err) = sink.record(user_id, action, outcome, reason).await {
        tracing::warn!(action, error = %err, "audit sink write failed; event dropped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;
    use std::sync::Mutex;

    /// Sink that records events into a vec, optionally failing.
    pub(crate) struct RecordingSink {
        pub events: Mutex<Vec<(Option<String>, String, AuditOutcome, Option<String>)>>,
        pub fail: bool,
    }

    impl RecordingSink {
        pub(crate) fn new() -> Self {
            Self {
                events: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl AuditSink for RecordingSink {
        async fn record(
            &self,
            user_id: Option<&str>,
            action: &str,
            outcome: AuditOutcome,
            reason: Option<&str>,
        ) -> AuthResult<()> {
            if self.fail {
                return Err(AuthError::storage("audit backend down"));
            }
            self.events.lock().unwrap().push((
                user_id.map(str::to_string),
                action.to_string(),
                outcome,
                reason.map(str::to_string),
            ));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_record_event_passes_through() {
        let sink = RecordingSink::new();
        record_event(
            &sink,
            Some("user-1"),
            "login",
            AuditOutcome::Failure,
            Some("invalid_password"),
        )
        .await;

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0.as_deref(), Some("user-1"));
        assert_eq!(events[0].1, "login");
        assert_eq!(events[0].2, AuditOutcome::Failure);
        assert_eq!(events[0].3.as_deref(), Some("invalid_password"));
    }

    #[tokio::test]
    async fn test_record_event_swallows_sink_failure() {
        let sink = RecordingSink {
            events: Mutex::new(Vec::new()),
            fail: true,
        };
        // Must not panic or propagate.
        record_event(&sink, None, "login", AuditOutcome::Success, None).await;
        assert!(sink.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_tracing_sink_never_fails() {
        let sink = TracingAuditSink;
        assert!(
            sink.record(Some("u"), "logout", AuditOutcome::Success, None)
                .await
                .is_ok()
        );
    }

    #[test]
    fn test_outcome_as_str() {
        assert_eq!(AuditOutcome::Success.as_str(), "success");
        assert_eq!(AuditOutcome::Failure.as_str(), "failure");
    }
}
