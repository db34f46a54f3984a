//! In-memory collaborators for unit tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;
use edu_core::entities::{
    AuditRecord, Category, Column, Entry, NaturalKey, NotificationRequest, School,
    ValidationRules,
};
use edu_core::enums::{CategoryAssignment, CategoryStatus, ColumnType, EntryStatus};
use edu_core::errors::{SinkError, StorageError};
use edu_core::ports::{AuditSink, EntryFilter, EntryStore, NotificationSink, ReferenceLookup};
use edu_core::updates::{EntryPatch, EntryUpsert};

pub const SCHOOL: &str = "sch-1";
pub const NEIGHBOUR: &str = "sch-2";
pub const FOREIGN: &str = "sch-3";
pub const SECTOR: &str = "sec-1";
pub const REGION: &str = "reg-1";
pub const SCHOOL_OWNER: &str = "usr-0000000a";
pub const CATEGORY: &str = "cat-1";
pub const SECTOR_CATEGORY: &str = "cat-sector";
pub const INACTIVE_CATEGORY: &str = "cat-off";

#[derive(Default)]
struct State {
    schools: BTreeMap<String, School>,
    categories: BTreeMap<String, Category>,
    columns: Vec<Column>,
    entries: Vec<Entry>,
    audits: Vec<AuditRecord>,
    notifications: Vec<NotificationRequest>,
    next_id: u32,
    fail_audit: bool,
    fail_notify: bool,
    fail_writes: bool,
}

type UpsertHook = Box<dyn FnOnce(&MemoryBackend) + Send>;

#[derive(Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    upsert_hook: Mutex<Option<UpsertHook>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// One region, two sectors, three schools, and three categories.
    pub fn seeded() -> Self {
        let backend = Self::new();
        backend.add_school(school(SCHOOL, SECTOR, Some(SCHOOL_OWNER)));
        backend.add_school(school(NEIGHBOUR, SECTOR, None));
        backend.add_school(school(FOREIGN, "sec-2", None));

        backend.add_category(
            category(CATEGORY, CategoryAssignment::All, CategoryStatus::Active),
            vec![
                column("teacherCount", ColumnType::Number, true, |rules| {
                    rules.min = Some(0.0);
                    rules.max = Some(500.0);
                }),
                column("email", ColumnType::Email, false, |_| {}),
                column("level", ColumnType::Select, false, |_| {}),
                column("code", ColumnType::Text, false, |rules| {
                    rules.pattern = Some("^[A-Z]{3}-\\d{3}$".into());
                    rules.unique = true;
                }),
            ],
        );
        backend.add_category(
            category(SECTOR_CATEGORY, CategoryAssignment::Sectors, CategoryStatus::Active),
            vec![column_in(SECTOR_CATEGORY, "budget", ColumnType::Number, false)],
        );
        backend.add_category(
            category(INACTIVE_CATEGORY, CategoryAssignment::All, CategoryStatus::Inactive),
            vec![column_in(INACTIVE_CATEGORY, "old", ColumnType::Text, false)],
        );
        backend
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("memory backend poisoned")
    }

    pub fn add_school(&self, school: School) {
        self.lock().schools.insert(school.id.clone(), school);
    }

    pub fn add_category(&self, category: Category, columns: Vec<Column>) {
        let mut state = self.lock();
        state.categories.insert(category.id.clone(), category);
        state.columns.extend(columns);
    }

    /// Insert or replace an entry with the given status, bypassing the engine.
    pub fn put_entry(&self, key: &NaturalKey, value: &str, status: EntryStatus) -> Entry {
        let mut state = self.lock();
        state.entries.retain(|e| e.key() != *key);
        state.next_id += 1;
        let now = Utc::now();
        let entry = Entry {
            id: format!("ent-{:08x}", state.next_id),
            school_id: key.school_id.clone(),
            category_id: key.category_id.clone(),
            column_id: key.column_id.clone(),
            value: value.into(),
            status,
            created_by: None,
            approved_by: (status == EntryStatus::Approved).then(|| "usr-00000004".to_string()),
            approved_at: (status == EntryStatus::Approved).then_some(now),
            rejected_by: None,
            rejected_at: (status == EntryStatus::Rejected).then_some(now),
            rejection_reason: (status == EntryStatus::Rejected).then(|| "wrong".to_string()),
            proxy_created_by: None,
            proxy_reason: None,
            proxy_original_entity: None,
            created_at: now,
            updated_at: now,
        };
        state.entries.push(entry.clone());
        entry
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.lock().entries.clone()
    }

    pub fn entry(&self, key: &NaturalKey) -> Option<Entry> {
        self.lock().entries.iter().find(|e| e.key() == *key).cloned()
    }

    pub fn audits(&self) -> Vec<AuditRecord> {
        self.lock().audits.clone()
    }

    pub fn notifications(&self) -> Vec<NotificationRequest> {
        self.lock().notifications.clone()
    }

    pub fn fail_audit(&self, fail: bool) {
        self.lock().fail_audit = fail;
    }

    pub fn fail_notify(&self, fail: bool) {
        self.lock().fail_notify = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Move an entry to `status` behind the engine's back, as a concurrent
    /// reviewer would.
    pub fn force_status(&self, key: &NaturalKey, status: EntryStatus) {
        if let Some(entry) = self.lock().entries.iter_mut().find(|e| e.key() == *key) {
            entry.status = status;
            if status == EntryStatus::Approved {
                entry.approved_by = Some("usr-00000004".into());
                entry.approved_at = Some(Utc::now());
            }
        }
    }

    /// Run `hook` once, on the next upsert, before any row is written.
    pub fn before_next_upsert(&self, hook: impl FnOnce(&Self) + Send + 'static) {
        *self.upsert_hook.lock().expect("memory backend poisoned") = Some(Box::new(hook));
    }
}

pub fn key(column_id: &str) -> NaturalKey {
    NaturalKey::new(SCHOOL, CATEGORY, column_id)
}

pub fn school(id: &str, sector_id: &str, admin_id: Option<&str>) -> School {
    School {
        id: id.into(),
        sector_id: sector_id.into(),
        region_id: REGION.into(),
        name: format!("School {id}"),
        admin_id: admin_id.map(str::to_string),
    }
}

pub fn category(id: &str, assignment: CategoryAssignment, status: CategoryStatus) -> Category {
    Category {
        id: id.into(),
        name: format!("Category {id}"),
        assignment,
        status,
    }
}

pub fn column(
    id: &str,
    column_type: ColumnType,
    is_required: bool,
    rules: impl FnOnce(&mut ValidationRules),
) -> Column {
    let mut validation = ValidationRules::default();
    rules(&mut validation);
    let options = if column_type == ColumnType::Select {
        vec!["primary".into(), "secondary".into()]
    } else {
        Vec::new()
    };
    Column {
        id: id.into(),
        category_id: CATEGORY.into(),
        name: id.into(),
        column_type,
        is_required,
        validation,
        options,
        order_index: 0,
    }
}

fn column_in(category_id: &str, id: &str, column_type: ColumnType, is_required: bool) -> Column {
    Column {
        category_id: category_id.into(),
        ..column(id, column_type, is_required, |_| {})
    }
}

impl EntryStore for MemoryBackend {
    async fn upsert_entries(&self, rows: &[EntryUpsert]) -> Result<Vec<Entry>, StorageError> {
        let hook = self.upsert_hook.lock().expect("memory backend poisoned").take();
        if let Some(hook) = hook {
            hook(self);
        }
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut written = Vec::with_capacity(rows.len());
        for row in rows {
            let key = row.key();
            if let Some(existing) = state.entries.iter_mut().find(|e| e.key() == key) {
                if existing.status != row.status {
                    continue;
                }
                existing.value.clone_from(&row.value);
                existing.updated_at = row.updated_at;
                if existing.created_by.is_none() {
                    existing.created_by.clone_from(&row.created_by);
                }
                if let Some(proxy) = &row.proxy {
                    existing.proxy_created_by = Some(proxy.proxy_created_by.clone());
                    existing.proxy_reason = Some(proxy.proxy_reason.clone());
                    existing.proxy_original_entity = Some(proxy.proxy_original_entity.clone());
                }
                written.push(existing.clone());
                continue;
            }
            state.next_id += 1;
            let entry = Entry {
                id: format!("ent-{:08x}", state.next_id),
                school_id: row.school_id.clone(),
                category_id: row.category_id.clone(),
                column_id: row.column_id.clone(),
                value: row.value.clone(),
                status: row.status,
                created_by: row.created_by.clone(),
                approved_by: None,
                approved_at: None,
                rejected_by: None,
                rejected_at: None,
                rejection_reason: None,
                proxy_created_by: row.proxy.as_ref().map(|p| p.proxy_created_by.clone()),
                proxy_reason: row.proxy.as_ref().map(|p| p.proxy_reason.clone()),
                proxy_original_entity: row.proxy.as_ref().map(|p| p.proxy_original_entity.clone()),
                created_at: row.updated_at,
                updated_at: row.updated_at,
            };
            state.entries.push(entry.clone());
            written.push(entry);
        }
        Ok(written)
    }

    async fn update_entries(
        &self,
        filter: &EntryFilter,
        patch: &EntryPatch,
    ) -> Result<Vec<Entry>, StorageError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::Unavailable("writes disabled".into()));
        }
        let mut updated = Vec::new();
        for entry in state.entries.iter_mut().filter(|e| filter.matches(e)) {
            patch.apply(entry);
            updated.push(entry.clone());
        }
        Ok(updated)
    }

    async fn select_entries(&self, filter: &EntryFilter) -> Result<Vec<Entry>, StorageError> {
        Ok(self
            .lock()
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect())
    }
}

impl ReferenceLookup for MemoryBackend {
    async fn get_school(&self, school_id: &str) -> Result<Option<School>, StorageError> {
        Ok(self.lock().schools.get(school_id).cloned())
    }

    async fn schools_in_sector(&self, sector_id: &str) -> Result<Vec<School>, StorageError> {
        Ok(self
            .lock()
            .schools
            .values()
            .filter(|s| s.sector_id == sector_id)
            .cloned()
            .collect())
    }

    async fn get_category(&self, category_id: &str) -> Result<Option<Category>, StorageError> {
        Ok(self.lock().categories.get(category_id).cloned())
    }

    async fn category_columns(&self, category_id: &str) -> Result<Vec<Column>, StorageError> {
        let mut columns: Vec<Column> = self
            .lock()
            .columns
            .iter()
            .filter(|c| c.category_id == category_id)
            .cloned()
            .collect();
        columns.sort_by_key(|c| c.order_index);
        Ok(columns)
    }
}

impl AuditSink for MemoryBackend {
    async fn record(&self, record: &AuditRecord) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.fail_audit {
            return Err(SinkError::audit("audit sink offline"));
        }
        state.audits.push(record.clone());
        Ok(())
    }
}

impl NotificationSink for MemoryBackend {
    async fn notify(&self, request: &NotificationRequest) -> Result<(), SinkError> {
        let mut state = self.lock();
        if state.fail_notify {
            return Err(SinkError::notification("notification sink offline"));
        }
        state.notifications.push(request.clone());
        Ok(())
    }
}
