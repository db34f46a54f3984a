//! Caller-facing API.
//!
//! `ApprovalService` owns the four collaborators and hands borrowed views of
//! them to the components. Every method returns a result struct; engine
//! errors are rendered into its `error` string, and queued side effects are
//! flushed once the operation's writes are done.

use std::collections::BTreeMap;

use edu_core::entities::{Actor, Column, NaturalKey, OrgTarget, School};
use edu_core::enums::EntryStatus;
use edu_core::ports::{AuditSink, EntryStore, NotificationSink, ReferenceLookup};
use edu_core::responses::{
    FieldValidation, FormValidation, ProxySubmitResult, SaveResult, SubmitResult,
    TransitionDecision, TransitionResult,
};

use crate::effects::EffectQueue;
use crate::error::ApprovalError;
use crate::permissions;
use crate::proxy::{ProxyEngine, ProxyOptions};
use crate::state_machine::StateMachine;
use crate::validation::Validator;
use crate::writer::{SaveOptions, SaveOutcome, Writer};

pub struct ApprovalService<S, R, A, N> {
    store: S,
    reference: R,
    audit: A,
    notifications: N,
}

impl<S, R, A, N> ApprovalService<S, R, A, N>
where
    S: EntryStore,
    R: ReferenceLookup,
    A: AuditSink,
    N: NotificationSink,
{
    pub const fn new(store: S, reference: R, audit: A, notifications: N) -> Self {
        Self {
            store,
            reference,
            audit,
            notifications,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn reference(&self) -> &R {
        &self.reference
    }

    async fn commit(&self, effects: EffectQueue) {
        let report = effects.flush(&self.audit, &self.notifications).await;
        if report.failed > 0 {
            tracing::warn!(
                performed = report.performed,
                failed = report.failed,
                "side effects partially applied"
            );
        }
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    pub async fn save_form_data(
        &self,
        values: &BTreeMap<String, String>,
        options: &SaveOptions,
    ) -> SaveResult {
        let mut effects = EffectQueue::new();
        let result = Writer::new(&self.store, &self.reference)
            .save(values, options, None, &mut effects)
            .await;
        self.commit(effects).await;
        save_result(result)
    }

    pub async fn submit_for_approval(
        &self,
        category_id: &str,
        school_id: &str,
        actor: &Actor,
    ) -> SubmitResult {
        let mut effects = EffectQueue::new();
        let result = Writer::new(&self.store, &self.reference)
            .submit(category_id, school_id, actor, &mut effects)
            .await;
        self.commit(effects).await;
        match result {
            Ok(outcome) => SubmitResult {
                success: true,
                submitted_count: count(outcome.submitted.len()),
                failures: outcome.failures,
                error: None,
            },
            Err(error) => SubmitResult::failure(report_error("submit_for_approval", &error)),
        }
    }

    pub async fn save_proxy_form_data(
        &self,
        values: &BTreeMap<String, String>,
        options: &ProxyOptions,
    ) -> SaveResult {
        let mut effects = EffectQueue::new();
        let result = ProxyEngine::new(&self.store, &self.reference)
            .save(values, options, &mut effects)
            .await;
        self.commit(effects).await;
        save_result(result)
    }

    pub async fn submit_proxy_data(&self, options: &ProxyOptions) -> ProxySubmitResult {
        let mut effects = EffectQueue::new();
        let result = ProxyEngine::new(&self.store, &self.reference)
            .submit(options, &mut effects)
            .await;
        self.commit(effects).await;
        match result {
            Ok(outcome) => ProxySubmitResult {
                success: true,
                submitted_count: count(outcome.submitted.len()),
                auto_approved: outcome.auto_approved,
                failures: outcome.failures,
                error: None,
            },
            Err(error) => ProxySubmitResult::failure(report_error("submit_proxy_data", &error)),
        }
    }

    /// Reviewer action on a single entry: approve at any stage, return, or
    /// reject.
    pub async fn transition_entry(
        &self,
        key: &NaturalKey,
        next: EntryStatus,
        actor: &Actor,
        reason: Option<&str>,
    ) -> TransitionResult {
        let mut effects = EffectQueue::new();
        let result = StateMachine::new(&self.store, &self.reference)
            .transition(key, next, actor, reason, &mut effects)
            .await;
        self.commit(effects).await;
        match result {
            Ok(entry) => TransitionResult::applied(entry),
            Err(error) => TransitionResult::failure(report_error("transition_entry", &error)),
        }
    }

    pub async fn reopen_entry(
        &self,
        key: &NaturalKey,
        actor: &Actor,
        reason: Option<&str>,
    ) -> TransitionResult {
        let mut effects = EffectQueue::new();
        let result = StateMachine::new(&self.store, &self.reference)
            .reopen(key, actor, reason, &mut effects)
            .await;
        self.commit(effects).await;
        match result {
            Ok(entry) => TransitionResult::applied(entry),
            Err(error) => TransitionResult::failure(report_error("reopen_entry", &error)),
        }
    }

    // -----------------------------------------------------------------------
    // Checks
    // -----------------------------------------------------------------------

    pub async fn validate_field(
        &self,
        column: &Column,
        value: &str,
        school_id: Option<&str>,
    ) -> FieldValidation {
        let school = self.resolve_school(school_id).await;
        Validator::new(&self.store, &self.reference)
            .validate_field(column, value, school.as_ref())
            .await
    }

    pub async fn validate_form(
        &self,
        columns: &[Column],
        values: &BTreeMap<String, String>,
        school_id: Option<&str>,
    ) -> FormValidation {
        let school = self.resolve_school(school_id).await;
        Validator::new(&self.store, &self.reference)
            .validate_form(columns, values, school.as_ref())
            .await
    }

    /// Validate a stored category's form without writing anything.
    pub async fn validate_category_form(
        &self,
        category_id: &str,
        values: &BTreeMap<String, String>,
        school_id: Option<&str>,
    ) -> Result<FormValidation, ApprovalError> {
        let columns = self.reference.category_columns(category_id).await?;
        if columns.is_empty() && self.reference.get_category(category_id).await?.is_none() {
            return Err(ApprovalError::not_found("category", category_id));
        }
        Ok(self.validate_form(&columns, values, school_id).await)
    }

    #[must_use]
    pub fn can_transition(
        &self,
        current: EntryStatus,
        next: EntryStatus,
        actor: &Actor,
        target: &OrgTarget,
    ) -> TransitionDecision {
        permissions::can_transition(current, next, actor, target)
    }

    /// Resolve a school into a transition target.
    pub async fn target_for(&self, school_id: &str) -> Result<OrgTarget, ApprovalError> {
        self.reference
            .get_school(school_id)
            .await?
            .map(|school| OrgTarget::from(&school))
            .ok_or_else(|| ApprovalError::not_found("school", school_id))
    }

    async fn resolve_school(&self, school_id: Option<&str>) -> Option<School> {
        let school_id = school_id?;
        match self.reference.get_school(school_id).await {
            Ok(Some(school)) => Some(school),
            Ok(None) => {
                tracing::warn!(school_id, "unknown school, uniqueness not checked");
                None
            }
            Err(error) => {
                tracing::warn!(school_id, %error, "school lookup failed, uniqueness not checked");
                None
            }
        }
    }
}

fn save_result(result: Result<SaveOutcome, ApprovalError>) -> SaveResult {
    match result {
        Ok(outcome) => SaveResult {
            success: outcome.field_errors.is_empty() && outcome.failures.is_empty(),
            saved_count: count(outcome.saved.len()),
            field_errors: outcome.field_errors,
            failures: outcome.failures,
            error: None,
        },
        Err(error) => SaveResult::failure(report_error("save", &error)),
    }
}

fn report_error(operation: &str, error: &ApprovalError) -> String {
    match error {
        ApprovalError::Storage(_) => tracing::warn!(operation, %error, "operation failed"),
        _ => tracing::debug!(operation, %error, "operation refused"),
    }
    error.to_string()
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
