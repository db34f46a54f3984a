//! Data entry writer shared by direct and proxy saves.
//!
//! `save` upserts validated values keyed on `(school_id, category_id,
//! column_id)`; saving the same values twice only moves `updated_at`.
//! `submit` moves every draft or returned entry of a form to `pending`, one
//! row at a time.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use edu_core::entities::{Actor, Category, Column, Entry, OrgTarget, School};
use edu_core::enums::{CategoryStatus, EntryStatus};
use edu_core::ids::is_well_formed_actor_id;
use edu_core::ports::{EntryFilter, EntryStore, ReferenceLookup};
use edu_core::responses::RowFailure;
use edu_core::updates::{EntryUpsert, ProxyProvenance};
use serde::{Deserialize, Serialize};

use crate::effects::EffectQueue;
use crate::error::ApprovalError;
use crate::permissions::{self, SCOPE_MISMATCH};
use crate::state_machine::StateMachine;
use crate::validation::{MSG_REQUIRED, Validator};

/// Target and author of a form save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveOptions {
    pub category_id: String,
    pub school_id: String,
    pub actor: Actor,
    /// `draft` (default) or `pending`.
    #[serde(default)]
    pub status: Option<EntryStatus>,
}

#[derive(Debug, Default)]
pub struct SaveOutcome {
    pub saved: Vec<Entry>,
    pub field_errors: BTreeMap<String, String>,
    pub failures: Vec<RowFailure>,
}

#[derive(Debug, Default)]
pub struct SubmitOutcome {
    pub submitted: Vec<Entry>,
    pub failures: Vec<RowFailure>,
}

/// A form's school, category, and columns after permission checks.
pub struct FormContext {
    pub school: School,
    pub category: Category,
    pub columns: Vec<Column>,
}

impl FormContext {
    #[must_use]
    pub fn target(&self) -> OrgTarget {
        OrgTarget::from(&self.school)
    }

    fn column(&self, column_id: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == column_id)
    }
}

pub struct Writer<'a, S, R> {
    store: &'a S,
    reference: &'a R,
}

impl<'a, S, R> Writer<'a, S, R>
where
    S: EntryStore,
    R: ReferenceLookup,
{
    pub const fn new(store: &'a S, reference: &'a R) -> Self {
        Self { store, reference }
    }

    fn machine(&self) -> StateMachine<'a, S, R> {
        StateMachine::new(self.store, self.reference)
    }

    fn validator(&self) -> Validator<'a, S, R> {
        Validator::new(self.store, self.reference)
    }

    /// Resolve the school and category of a form and check that `actor` may
    /// write data for it.
    pub async fn authorize(
        &self,
        school_id: &str,
        category_id: &str,
        actor: &Actor,
    ) -> Result<FormContext, ApprovalError> {
        let school = self
            .reference
            .get_school(school_id)
            .await?
            .ok_or_else(|| ApprovalError::not_found("school", school_id))?;
        if !permissions::can_act(actor, &OrgTarget::from(&school)) {
            return Err(ApprovalError::denied(SCOPE_MISMATCH));
        }

        let category = self
            .reference
            .get_category(category_id)
            .await?
            .ok_or_else(|| ApprovalError::not_found("category", category_id))?;
        if category.status == CategoryStatus::Inactive {
            return Err(ApprovalError::Conflict(format!(
                "category {} is inactive",
                category.id
            )));
        }
        let minimum = category.assignment.minimum_role();
        if actor.role < minimum {
            return Err(ApprovalError::denied(format!(
                "category {} accepts data from {minimum} and above",
                category.id
            )));
        }

        let columns = self.reference.category_columns(category_id).await?;
        Ok(FormContext {
            school,
            category,
            columns,
        })
    }

    /// Validate and upsert `values`. `proxy` tags every written row with
    /// proxy provenance.
    pub async fn save(
        &self,
        values: &BTreeMap<String, String>,
        options: &SaveOptions,
        proxy: Option<&ProxyProvenance>,
        effects: &mut EffectQueue,
    ) -> Result<SaveOutcome, ApprovalError> {
        let requested = options.status.unwrap_or(EntryStatus::Draft);
        if !matches!(requested, EntryStatus::Draft | EntryStatus::Pending) {
            return Err(ApprovalError::Conflict(format!(
                "a save may only request draft or pending, not {requested}"
            )));
        }

        let actor = &options.actor;
        let form = self
            .authorize(&options.school_id, &options.category_id, actor)
            .await?;
        let created_by = author_id(actor, proxy);

        let existing: HashMap<String, Entry> = self
            .store
            .select_entries(&EntryFilter::for_form(&form.school.id, &form.category.id))
            .await?
            .into_iter()
            .map(|e| (e.column_id.clone(), e))
            .collect();

        let validator = self.validator();
        let machine = self.machine();
        let mut outcome = SaveOutcome::default();
        let mut rows = Vec::new();
        let now = Utc::now();

        for (column_id, raw) in values {
            let value = raw.trim();
            if value.is_empty() {
                continue;
            }
            let Some(column) = form.column(column_id) else {
                outcome
                    .field_errors
                    .insert(column_id.clone(), "Unknown column".to_string());
                continue;
            };
            let check = validator
                .validate_field(column, value, Some(&form.school))
                .await;
            if !check.valid {
                let message = check.message.unwrap_or_default();
                outcome.field_errors.insert(column_id.clone(), message);
                continue;
            }

            let status = match existing.get(column_id) {
                None => EntryStatus::Draft,
                Some(entry) if entry.status.is_editable() => entry.status,
                Some(entry) if entry.status == EntryStatus::Returned => {
                    let decision = permissions::can_transition(
                        EntryStatus::Returned,
                        EntryStatus::Draft,
                        actor,
                        &form.target(),
                    );
                    if !decision.allowed {
                        let denied = ApprovalError::denied(decision.reason_str());
                        outcome.failures.push(failure(column_id, &denied));
                        continue;
                    }
                    entry.status
                }
                Some(entry) => {
                    outcome.failures.push(RowFailure {
                        column_id: column_id.clone(),
                        reason: format!("entry is {} and locked for edits", entry.status),
                    });
                    continue;
                }
            };

            rows.push(EntryUpsert {
                school_id: form.school.id.clone(),
                category_id: form.category.id.clone(),
                column_id: column_id.clone(),
                value: value.to_string(),
                status,
                created_by: created_by.clone(),
                proxy: proxy.cloned(),
                updated_at: now,
            });
        }

        if !rows.is_empty() {
            let stored = self.store.upsert_entries(&rows).await?;
            for row in &rows {
                if !stored.iter().any(|e| e.column_id == row.column_id) {
                    let stale = ApprovalError::Conflict(format!(
                        "entry {} is no longer {}",
                        row.key(),
                        row.status
                    ));
                    outcome.failures.push(failure(&row.column_id, &stale));
                }
            }
            // Returned rows keep their status through the upsert and are
            // reopened only once the new value is stored.
            for entry in stored {
                if entry.status != EntryStatus::Returned {
                    outcome.saved.push(entry);
                    continue;
                }
                match machine
                    .apply(&entry, &form.school, EntryStatus::Draft, actor, None, effects)
                    .await
                {
                    Ok(reopened) => outcome.saved.push(reopened),
                    Err(ApprovalError::Storage(e)) => return Err(e.into()),
                    Err(e) => {
                        outcome.failures.push(failure(&entry.column_id, &e));
                        outcome.saved.push(entry);
                    }
                }
            }
        }

        if requested == EntryStatus::Pending {
            let mut promoted = Vec::with_capacity(outcome.saved.len());
            for entry in std::mem::take(&mut outcome.saved) {
                if entry.status != EntryStatus::Draft {
                    promoted.push(entry);
                    continue;
                }
                match machine
                    .apply(&entry, &form.school, EntryStatus::Pending, actor, None, effects)
                    .await
                {
                    Ok(pending) => promoted.push(pending),
                    Err(ApprovalError::Storage(e)) => return Err(e.into()),
                    Err(e) => {
                        outcome.failures.push(failure(&entry.column_id, &e));
                        promoted.push(entry);
                    }
                }
            }
            outcome.saved = promoted;
        }

        tracing::debug!(
            school_id = %form.school.id,
            category_id = %form.category.id,
            saved = outcome.saved.len(),
            field_errors = outcome.field_errors.len(),
            failures = outcome.failures.len(),
            "form saved"
        );
        Ok(outcome)
    }

    /// Move every draft or returned entry of the form to `pending`. Rows that
    /// fail validation or permission stay where they are and are reported.
    pub async fn submit(
        &self,
        category_id: &str,
        school_id: &str,
        actor: &Actor,
        effects: &mut EffectQueue,
    ) -> Result<SubmitOutcome, ApprovalError> {
        let form = self.authorize(school_id, category_id, actor).await?;
        let entries = self
            .store
            .select_entries(&EntryFilter::for_form(school_id, category_id))
            .await?;

        let mut outcome = SubmitOutcome::default();
        for column in form.columns.iter().filter(|c| c.is_required) {
            let present = entries
                .iter()
                .any(|e| e.column_id == column.id && !e.value.trim().is_empty());
            if !present {
                outcome.failures.push(RowFailure {
                    column_id: column.id.clone(),
                    reason: MSG_REQUIRED.to_string(),
                });
            }
        }

        let validator = self.validator();
        let machine = self.machine();
        for entry in entries
            .iter()
            .filter(|e| matches!(e.status, EntryStatus::Draft | EntryStatus::Returned))
        {
            let Some(column) = form.column(&entry.column_id) else {
                outcome.failures.push(RowFailure {
                    column_id: entry.column_id.clone(),
                    reason: "Unknown column".to_string(),
                });
                continue;
            };
            let check = validator
                .validate_field(column, &entry.value, Some(&form.school))
                .await;
            if !check.valid {
                outcome.failures.push(RowFailure {
                    column_id: entry.column_id.clone(),
                    reason: check.message.unwrap_or_default(),
                });
                continue;
            }
            match machine
                .apply(entry, &form.school, EntryStatus::Pending, actor, None, effects)
                .await
            {
                Ok(pending) => outcome.submitted.push(pending),
                Err(ApprovalError::Storage(e)) => return Err(e.into()),
                Err(e) => outcome.failures.push(failure(&entry.column_id, &e)),
            }
        }

        tracing::debug!(
            school_id,
            category_id,
            submitted = outcome.submitted.len(),
            failures = outcome.failures.len(),
            "form submitted"
        );
        Ok(outcome)
    }
}

/// `created_by` for written rows: the proxy actor for proxy writes, else the
/// acting actor when its id is well formed.
fn author_id(actor: &Actor, proxy: Option<&ProxyProvenance>) -> Option<String> {
    if let Some(proxy) = proxy {
        return Some(proxy.proxy_created_by.clone());
    }
    if is_well_formed_actor_id(&actor.id) {
        Some(actor.id.clone())
    } else {
        tracing::warn!(actor_id = %actor.id, "malformed actor id, writing entries anonymously");
        None
    }
}

fn failure(column_id: &str, error: &ApprovalError) -> RowFailure {
    RowFailure {
        column_id: column_id.to_string(),
        reason: error.row_reason(),
    }
}
