//! Approval state machine.
//!
//! Every status change goes through [`StateMachine::apply`]: permission check,
//! status plus bookkeeping patch, one `status_changed` audit record, and a
//! notification to the school owner for reviewer outcomes. The superadmin
//! reopen is the only way out of a locked state and is audited separately.

use chrono::Utc;
use edu_core::audit_detail::StatusChangedDetail;
use edu_core::entities::{Actor, AuditRecord, Entry, NaturalKey, NotificationRequest, OrgTarget, School};
use edu_core::enums::{AuditAction, EntityType, EntryStatus, NotificationType};
use edu_core::ids::is_well_formed_actor_id;
use edu_core::ports::{EntryFilter, EntryStore, ReferenceLookup};
use edu_core::updates::{EntryPatch, EntryPatchBuilder};
use serde_json::json;

use crate::effects::EffectQueue;
use crate::error::ApprovalError;
use crate::permissions;

pub struct StateMachine<'a, S, R> {
    store: &'a S,
    reference: &'a R,
}

impl<'a, S, R> StateMachine<'a, S, R>
where
    S: EntryStore,
    R: ReferenceLookup,
{
    pub const fn new(store: &'a S, reference: &'a R) -> Self {
        Self { store, reference }
    }

    /// Load the entry for `key` and the school it belongs to.
    pub async fn load(&self, key: &NaturalKey) -> Result<(Entry, School), ApprovalError> {
        let entry = self
            .store
            .select_entries(&EntryFilter::for_key(key))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApprovalError::not_found("entry", key.to_string()))?;
        let school = self
            .reference
            .get_school(&key.school_id)
            .await?
            .ok_or_else(|| ApprovalError::not_found("school", &key.school_id))?;
        Ok((entry, school))
    }

    /// Transition the entry stored under `key`.
    pub async fn transition(
        &self,
        key: &NaturalKey,
        next: EntryStatus,
        actor: &Actor,
        reason: Option<&str>,
        effects: &mut EffectQueue,
    ) -> Result<Entry, ApprovalError> {
        let (entry, school) = self.load(key).await?;
        self.apply(&entry, &school, next, actor, reason, effects)
            .await
    }

    /// Transition an already loaded entry. Nothing is written when the
    /// request is denied.
    pub async fn apply(
        &self,
        entry: &Entry,
        school: &School,
        next: EntryStatus,
        actor: &Actor,
        reason: Option<&str>,
        effects: &mut EffectQueue,
    ) -> Result<Entry, ApprovalError> {
        let target = OrgTarget::from(school);
        let decision = permissions::can_transition(entry.status, next, actor, &target);
        if !decision.allowed {
            return Err(ApprovalError::denied(decision.reason_str()));
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        let now = Utc::now();
        let mut patch = EntryPatchBuilder::new().status(next).updated_at(now);

        match next {
            EntryStatus::Approved => {
                if !is_well_formed_actor_id(&actor.id) {
                    return Err(ApprovalError::Conflict(format!(
                        "approving requires a well-formed actor id, got '{}'",
                        actor.id
                    )));
                }
                patch = patch.approved(&actor.id, now);
            }
            EntryStatus::Rejected => {
                let Some(reason) = reason else {
                    return Err(ApprovalError::invalid_field(
                        "reason",
                        "A rejection reason is required",
                    ));
                };
                let rejected_by = if is_well_formed_actor_id(&actor.id) {
                    Some(actor.id.clone())
                } else {
                    tracing::warn!(actor_id = %actor.id, "rejecting without a well-formed actor id");
                    None
                };
                patch = patch.rejected(rejected_by, now, reason);
            }
            _ => {}
        }
        if next != EntryStatus::Approved && entry.approved_by.is_some() {
            patch = patch.clear_approval();
        }
        if next != EntryStatus::Rejected && entry.rejected_at.is_some() {
            patch = patch.clear_rejection();
        }

        let updated = self.write(entry, &patch.build()).await?;

        let detail = StatusChangedDetail {
            from: entry.status.as_str().to_string(),
            to: next.as_str().to_string(),
            reason: reason.map(str::to_string),
        };
        effects.audit(AuditRecord {
            actor_id: Some(actor.id.clone()),
            action: AuditAction::StatusChanged,
            entity_type: EntityType::DataEntry,
            entity_id: updated.id.clone(),
            before: Some(json!({ "status": entry.status })),
            after: serde_json::to_value(&detail).ok(),
            created_at: now,
        });

        let outcome = match next {
            EntryStatus::Approved => Some((NotificationType::EntryApproved, "Entry approved", "was approved")),
            EntryStatus::Returned => Some((
                NotificationType::EntryReturned,
                "Entry returned",
                "was returned for correction",
            )),
            EntryStatus::Rejected => Some((NotificationType::EntryRejected, "Entry rejected", "was rejected")),
            _ => None,
        };
        if let Some((notification_type, title, verb)) = outcome {
            notify_owner(effects, school, &updated, notification_type, title, verb, reason);
        }

        tracing::debug!(
            entry_id = %updated.id,
            from = %entry.status,
            to = %next,
            actor_id = %actor.id,
            "entry transitioned"
        );
        Ok(updated)
    }

    /// Superadmin override: move a locked entry back to `pending` and clear
    /// its approval and rejection bookkeeping.
    pub async fn reopen(
        &self,
        key: &NaturalKey,
        actor: &Actor,
        reason: Option<&str>,
        effects: &mut EffectQueue,
    ) -> Result<Entry, ApprovalError> {
        let (entry, school) = self.load(key).await?;
        let decision = permissions::can_override(actor, &OrgTarget::from(&school));
        if !decision.allowed {
            return Err(ApprovalError::denied(decision.reason_str()));
        }
        if !entry.status.is_locked() {
            return Err(ApprovalError::Conflict(format!(
                "only locked entries can be reopened, entry is {}",
                entry.status
            )));
        }

        let reason = reason.map(str::trim).filter(|r| !r.is_empty());
        let now = Utc::now();
        let patch = EntryPatchBuilder::new()
            .status(EntryStatus::Pending)
            .clear_approval()
            .clear_rejection()
            .updated_at(now)
            .build();
        let updated = self.write(&entry, &patch).await?;

        effects.audit(AuditRecord {
            actor_id: Some(actor.id.clone()),
            action: AuditAction::Reopened,
            entity_type: EntityType::DataEntry,
            entity_id: updated.id.clone(),
            before: Some(json!({
                "status": entry.status,
                "approved_by": entry.approved_by,
                "rejected_by": entry.rejected_by,
                "rejection_reason": entry.rejection_reason,
            })),
            after: Some(json!({ "status": EntryStatus::Pending, "reason": reason })),
            created_at: now,
        });
        notify_owner(
            effects,
            &school,
            &updated,
            NotificationType::EntryReopened,
            "Entry reopened",
            "was reopened for review",
            reason,
        );

        tracing::debug!(entry_id = %updated.id, from = %entry.status, "entry reopened");
        Ok(updated)
    }

    /// Write `patch` only if the entry still has the status it was loaded
    /// with.
    async fn write(&self, entry: &Entry, patch: &EntryPatch) -> Result<Entry, ApprovalError> {
        let filter = EntryFilter::for_key(&entry.key()).with_statuses(&[entry.status]);
        self.store
            .update_entries(&filter, patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                ApprovalError::Conflict(format!(
                    "entry {} is no longer {}",
                    entry.key(),
                    entry.status
                ))
            })
    }
}

fn notify_owner(
    effects: &mut EffectQueue,
    school: &School,
    entry: &Entry,
    notification_type: NotificationType,
    title: &str,
    verb: &str,
    reason: Option<&str>,
) {
    let Some(recipient) = school.admin_id.clone() else {
        return;
    };
    let mut message = format!(
        "{} in category {} for {} {verb}",
        entry.column_id, entry.category_id, school.name
    );
    if let Some(reason) = reason {
        message.push_str(": ");
        message.push_str(reason);
    }
    effects.notify(NotificationRequest {
        recipient_id: recipient,
        notification_type,
        title: title.to_string(),
        message,
        related_entity_type: EntityType::DataEntry,
        related_entity_id: entry.id.clone(),
    });
}
