//! Post-commit side effects.
//!
//! Components queue audit records and notifications while they work and only
//! after the write each one describes has succeeded. [`EffectQueue::flush`]
//! runs them one by one; a failing sink is logged and skipped.

use edu_core::entities::{AuditRecord, NotificationRequest};
use edu_core::ports::{AuditSink, NotificationSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Audit(AuditRecord),
    Notify(NotificationRequest),
}

/// Outcome of flushing a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectReport {
    pub performed: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct EffectQueue {
    effects: Vec<Effect>,
}

impl EffectQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn audit(&mut self, record: AuditRecord) {
        self.effects.push(Effect::Audit(record));
    }

    pub fn notify(&mut self, request: NotificationRequest) {
        self.effects.push(Effect::Notify(request));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    #[must_use]
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub async fn flush<A, N>(self, audit: &A, notifications: &N) -> EffectReport
    where
        A: AuditSink,
        N: NotificationSink,
    {
        let mut report = EffectReport::default();
        for effect in self.effects {
            let result = match &effect {
                Effect::Audit(record) => audit.record(record).await,
                Effect::Notify(request) => notifications.notify(request).await,
            };
            match result {
                Ok(()) => report.performed += 1,
                Err(error) => {
                    report.failed += 1;
                    match effect {
                        Effect::Audit(record) => tracing::warn!(
                            %error,
                            action = %record.action,
                            entity_id = %record.entity_id,
                            "audit record dropped"
                        ),
                        Effect::Notify(request) => tracing::warn!(
                            %error,
                            recipient = %request.recipient_id,
                            notification_type = %request.notification_type,
                            "notification dropped"
                        ),
                    }
                }
            }
        }
        report
    }
}
