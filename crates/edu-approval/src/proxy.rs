//! Proxy submission engine.
//!
//! A proxy write is a save or submit performed by a higher-level actor on
//! behalf of a school. Every row written carries the proxy actor as author
//! and provenance, and each call leaves one proxy audit record plus a
//! notification for the school owner.

use std::collections::BTreeMap;

use chrono::Utc;
use edu_core::audit_detail::ProxyDetail;
use edu_core::entities::{Actor, AuditRecord, Entry, NotificationRequest, OrgTarget, School};
use edu_core::enums::{AuditAction, EntityType, EntryStatus, NotificationType};
use edu_core::ids::is_well_formed_actor_id;
use edu_core::ports::{EntryStore, ReferenceLookup};
use edu_core::responses::RowFailure;
use edu_core::updates::ProxyProvenance;
use serde::{Deserialize, Serialize};

use crate::effects::EffectQueue;
use crate::error::ApprovalError;
use crate::permissions::{self, SCOPE_MISMATCH};
use crate::state_machine::StateMachine;
use crate::writer::{SaveOptions, SaveOutcome, Writer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyOptions {
    pub category_id: String,
    pub school_id: String,
    pub proxy_actor: Actor,
    /// Entity the data was originally collected for. Defaults to `school_id`.
    #[serde(default)]
    pub original_school_id: Option<String>,
    pub reason: String,
    /// Submit path only: continue from `pending` to `approved` when allowed.
    #[serde(default)]
    pub auto_approve: bool,
}

impl ProxyOptions {
    fn provenance(&self) -> ProxyProvenance {
        ProxyProvenance {
            proxy_created_by: self.proxy_actor.id.clone(),
            proxy_reason: self.reason.trim().to_string(),
            proxy_original_entity: self
                .original_school_id
                .clone()
                .unwrap_or_else(|| self.school_id.clone()),
        }
    }
}

#[derive(Debug, Default)]
pub struct ProxySubmitOutcome {
    pub submitted: Vec<Entry>,
    pub auto_approved: bool,
    pub failures: Vec<RowFailure>,
}

pub struct ProxyEngine<'a, S, R> {
    store: &'a S,
    reference: &'a R,
}

impl<'a, S, R> ProxyEngine<'a, S, R>
where
    S: EntryStore,
    R: ReferenceLookup,
{
    pub const fn new(store: &'a S, reference: &'a R) -> Self {
        Self { store, reference }
    }

    /// Provenance needs a real identity and a reason, and the actor must
    /// cover the school.
    async fn authorize(&self, options: &ProxyOptions) -> Result<School, ApprovalError> {
        let actor = &options.proxy_actor;
        if !is_well_formed_actor_id(&actor.id) {
            return Err(ApprovalError::Conflict(format!(
                "proxy writes require a well-formed actor id, got '{}'",
                actor.id
            )));
        }
        if options.reason.trim().is_empty() {
            return Err(ApprovalError::invalid_field(
                "reason",
                "A proxy reason is required",
            ));
        }
        let school = self
            .reference
            .get_school(&options.school_id)
            .await?
            .ok_or_else(|| ApprovalError::not_found("school", &options.school_id))?;
        if !permissions::can_act(actor, &OrgTarget::from(&school)) {
            return Err(ApprovalError::denied(SCOPE_MISMATCH));
        }
        Ok(school)
    }

    pub async fn save(
        &self,
        values: &BTreeMap<String, String>,
        options: &ProxyOptions,
        effects: &mut EffectQueue,
    ) -> Result<SaveOutcome, ApprovalError> {
        let school = self.authorize(options).await?;
        let provenance = options.provenance();
        let save_options = SaveOptions {
            category_id: options.category_id.clone(),
            school_id: options.school_id.clone(),
            actor: options.proxy_actor.clone(),
            status: None,
        };
        let outcome = Writer::new(self.store, self.reference)
            .save(values, &save_options, Some(&provenance), effects)
            .await?;

        record_proxy_effects(
            effects,
            options,
            &school,
            &provenance,
            AuditAction::ProxyDataEntry,
            outcome.saved.len(),
            false,
        );
        Ok(outcome)
    }

    pub async fn submit(
        &self,
        options: &ProxyOptions,
        effects: &mut EffectQueue,
    ) -> Result<ProxySubmitOutcome, ApprovalError> {
        let school = self.authorize(options).await?;
        let actor = &options.proxy_actor;
        let submitted = Writer::new(self.store, self.reference)
            .submit(&options.category_id, &options.school_id, actor, effects)
            .await?;

        let mut outcome = ProxySubmitOutcome {
            submitted: submitted.submitted,
            auto_approved: false,
            failures: submitted.failures,
        };

        if options.auto_approve {
            let decision = permissions::can_auto_approve(actor, &OrgTarget::from(&school));
            if decision.allowed {
                let machine = StateMachine::new(self.store, self.reference);
                let mut approved = Vec::with_capacity(outcome.submitted.len());
                for entry in std::mem::take(&mut outcome.submitted) {
                    match machine
                        .apply(&entry, &school, EntryStatus::Approved, actor, None, effects)
                        .await
                    {
                        Ok(entry) => approved.push(entry),
                        Err(ApprovalError::Storage(e)) => return Err(e.into()),
                        Err(e) => {
                            outcome.failures.push(RowFailure {
                                column_id: entry.column_id.clone(),
                                reason: e.row_reason(),
                            });
                            approved.push(entry);
                        }
                    }
                }
                outcome.auto_approved =
                    approved.iter().any(|e| e.status == EntryStatus::Approved);
                outcome.submitted = approved;
            } else {
                tracing::debug!(
                    actor_id = %actor.id,
                    reason = decision.reason_str(),
                    "auto-approval not granted, entries stay pending"
                );
            }
        }

        let action = if outcome.auto_approved {
            AuditAction::ProxySubmitAndApprove
        } else {
            AuditAction::ProxySubmit
        };
        record_proxy_effects(
            effects,
            options,
            &school,
            &options.provenance(),
            action,
            outcome.submitted.len(),
            outcome.auto_approved,
        );
        Ok(outcome)
    }
}

fn record_proxy_effects(
    effects: &mut EffectQueue,
    options: &ProxyOptions,
    school: &School,
    provenance: &ProxyProvenance,
    action: AuditAction,
    affected: usize,
    auto_approved: bool,
) {
    let detail = ProxyDetail {
        school_id: school.id.clone(),
        category_id: options.category_id.clone(),
        original_entity: provenance.proxy_original_entity.clone(),
        reason: provenance.proxy_reason.clone(),
        affected_count: u32::try_from(affected).unwrap_or(u32::MAX),
        auto_approved,
    };
    effects.audit(AuditRecord {
        actor_id: Some(options.proxy_actor.id.clone()),
        action,
        entity_type: EntityType::Category,
        entity_id: options.category_id.clone(),
        before: None,
        after: serde_json::to_value(&detail).ok(),
        created_at: Utc::now(),
    });

    let Some(recipient) = school.admin_id.clone() else {
        return;
    };
    let (notification_type, title, verb) = match action {
        AuditAction::ProxySubmitAndApprove => (
            NotificationType::ProxyApproval,
            "Data submitted and approved on your behalf",
            "submitted and approved",
        ),
        AuditAction::ProxySubmit => (
            NotificationType::ProxySubmission,
            "Data submitted on your behalf",
            "submitted",
        ),
        _ => (
            NotificationType::ProxyDataEntry,
            "Data entered on your behalf",
            "entered",
        ),
    };
    let actor = &options.proxy_actor;
    effects.notify(NotificationRequest {
        recipient_id: recipient,
        notification_type,
        title: title.to_string(),
        message: format!(
            "{} ({}) {verb} data for category {} at {}. Reason: {}",
            actor.id, actor.role, options.category_id, school.name, provenance.proxy_reason
        ),
        related_entity_type: EntityType::Category,
        related_entity_id: options.category_id.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::Effect;
    use crate::test_support::{self as ts, MemoryBackend};
    use pretty_assertions::assert_eq;

    fn options(actor: Actor) -> ProxyOptions {
        ProxyOptions {
            category_id: ts::CATEGORY.into(),
            school_id: ts::SCHOOL.into(),
            proxy_actor: actor,
            original_school_id: None,
            reason: "bulk entry".into(),
            auto_approve: false,
        }
    }

    fn sector_admin() -> Actor {
        Actor::sector_admin("usr-00000002", ts::SECTOR)
    }

    fn form() -> BTreeMap<String, String> {
        BTreeMap::from([("teacherCount".to_string(), "25".to_string())])
    }

    fn audit_actions(effects: &EffectQueue) -> Vec<AuditAction> {
        effects
            .effects()
            .iter()
            .filter_map(|e| match e {
                Effect::Audit(r) => Some(r.action),
                Effect::Notify(_) => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn proxy_save_records_provenance() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();

        let outcome = engine
            .save(&form(), &options(sector_admin()), &mut effects)
            .await
            .unwrap();
        let entry = &outcome.saved[0];
        assert_eq!(entry.proxy_created_by.as_deref(), Some("usr-00000002"));
        assert_eq!(entry.created_by.as_deref(), Some("usr-00000002"));
        assert_eq!(entry.proxy_reason.as_deref(), Some("bulk entry"));
        assert_eq!(entry.proxy_original_entity.as_deref(), Some(ts::SCHOOL));

        assert_eq!(audit_actions(&effects), vec![AuditAction::ProxyDataEntry]);
        assert_eq!(effects.len(), 2);
    }

    #[tokio::test]
    async fn malformed_proxy_id_aborts_before_writing() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();

        let err = engine
            .save(&form(), &options(Actor::sector_admin("bob", ts::SECTOR)), &mut effects)
            .await
            .unwrap_err();
        assert!(matches!(err, ApprovalError::Conflict(_)));
        assert!(backend.entries().is_empty());
        assert!(effects.is_empty());
    }

    #[tokio::test]
    async fn proxy_outside_scope_is_denied() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();

        let mut opts = options(sector_admin());
        opts.school_id = ts::FOREIGN.into();
        let err = engine.save(&form(), &opts, &mut effects).await.unwrap_err();
        assert_eq!(err.row_reason(), SCOPE_MISMATCH);
    }

    #[tokio::test]
    async fn auto_approve_without_rights_stays_pending() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();
        engine
            .save(&form(), &options(sector_admin()), &mut effects)
            .await
            .unwrap();

        let mut opts = options(sector_admin());
        opts.auto_approve = true;
        let outcome = engine.submit(&opts, &mut effects).await.unwrap();
        assert!(!outcome.auto_approved);
        assert_eq!(outcome.submitted.len(), 1);
        assert_eq!(outcome.submitted[0].status, EntryStatus::Pending);
        assert_eq!(
            audit_actions(&effects),
            vec![
                AuditAction::ProxyDataEntry,
                AuditAction::StatusChanged,
                AuditAction::ProxySubmit,
            ]
        );
    }

    #[tokio::test]
    async fn auto_approve_with_final_rights_approves() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();
        let actor = sector_admin().with_final_approval(true);
        engine
            .save(&form(), &options(actor.clone()), &mut effects)
            .await
            .unwrap();

        let mut opts = options(actor);
        opts.auto_approve = true;
        let outcome = engine.submit(&opts, &mut effects).await.unwrap();
        assert!(outcome.auto_approved);
        let entry = &outcome.submitted[0];
        assert_eq!(entry.status, EntryStatus::Approved);
        assert_eq!(entry.approved_by.as_deref(), Some("usr-00000002"));
        assert_eq!(
            audit_actions(&effects).last(),
            Some(&AuditAction::ProxySubmitAndApprove)
        );
    }

    #[tokio::test]
    async fn original_entity_overrides_target_school() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();
        let mut opts = options(sector_admin());
        opts.original_school_id = Some(ts::NEIGHBOUR.into());

        let outcome = engine.save(&form(), &opts, &mut effects).await.unwrap();
        assert_eq!(
            outcome.saved[0].proxy_original_entity.as_deref(),
            Some(ts::NEIGHBOUR)
        );
    }

    #[tokio::test]
    async fn blank_reason_is_rejected_before_writing() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();
        let mut opts = options(sector_admin());
        opts.reason = "   ".into();

        let err = engine.save(&form(), &opts, &mut effects).await.unwrap_err();
        match err {
            ApprovalError::Validation { errors } => {
                assert_eq!(errors["reason"], "A proxy reason is required");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
        assert!(backend.entries().is_empty());
        assert!(effects.is_empty());

        let err = engine.submit(&opts, &mut effects).await.unwrap_err();
        assert!(matches!(err, ApprovalError::Validation { .. }));
    }

    #[tokio::test]
    async fn auto_approve_with_nothing_submitted_is_a_plain_submit() {
        let backend = MemoryBackend::seeded();
        let engine = ProxyEngine::new(&backend, &backend);
        let mut effects = EffectQueue::new();

        let mut opts = options(sector_admin().with_final_approval(true));
        opts.auto_approve = true;
        let outcome = engine.submit(&opts, &mut effects).await.unwrap();
        assert!(!outcome.auto_approved);
        assert!(outcome.submitted.is_empty());
        assert_eq!(audit_actions(&effects), vec![AuditAction::ProxySubmit]);
    }
}
