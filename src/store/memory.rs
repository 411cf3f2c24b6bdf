// src/store/memory.rs
//
// In-memory repository fakes for service-level tests. Reads mirror the SQL
// ordering of the Postgres implementations; writes keep call counters so
// tests can assert which store was touched.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::models::{
    CaseSummary, DateCount, DocumentTypeStat, PersonBrief, RegularAppointment, StatusCount,
    TaskSummary, VisitorAppointment, ROLE_LAWYER,
};
use crate::store::{
    CaseRepo, DocumentRepo, RegularAppointmentPatch, RegularAppointmentRepo, StoreError, TaskRepo,
    UserRepo, VisitorAppointmentPatch, VisitorAppointmentRepo,
};

fn write_failure() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

pub struct MemRegularAppointments {
    items: Mutex<Vec<RegularAppointment>>,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl MemRegularAppointments {
    pub fn new(items: Vec<RegularAppointment>) -> Self {
        Self {
            items: Mutex::new(items),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn sorted(&self) -> Vec<RegularAppointment> {
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        items
    }
}

#[async_trait]
impl RegularAppointmentRepo for MemRegularAppointments {
    async fn find_all(&self) -> Result<Vec<RegularAppointment>, StoreError> {
        Ok(self.sorted())
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<RegularAppointment>, StoreError> {
        Ok(self.sorted().into_iter().take(limit as usize).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<RegularAppointment>, StoreError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.appointment_id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: RegularAppointmentPatch,
    ) -> Result<Option<RegularAppointment>, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }

        let mut items = self.items.lock().unwrap();
        let Some(a) = items.iter_mut().find(|a| a.appointment_id == id) else {
            return Ok(None);
        };
        if let Some(date) = patch.date {
            a.date = date;
        }
        if let Some(location) = patch.location {
            a.location = location;
        }
        if let Some(notes) = patch.notes {
            a.notes = notes;
        }
        if let Some(lawyer_id) = patch.lawyer_id {
            a.lawyer.id = lawyer_id;
        }
        Ok(Some(a.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|a| a.appointment_id != id);
        Ok(items.len() < before)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.items.lock().unwrap().len() as i64)
    }

    async fn count_by_date_for_year(&self, year: i32) -> Result<Vec<DateCount>, StoreError> {
        let mut by_day: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
        for a in self.items.lock().unwrap().iter() {
            if a.date.year() == year {
                *by_day.entry(a.date.date_naive()).or_insert(0) += 1;
            }
        }
        Ok(by_day
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect())
    }

    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let mut by_lawyer: BTreeMap<Uuid, i64> = BTreeMap::new();
        for a in self.items.lock().unwrap().iter() {
            *by_lawyer.entry(a.lawyer.id).or_insert(0) += 1;
        }
        Ok(by_lawyer.into_iter().collect())
    }
}

pub struct MemVisitorAppointments {
    items: Mutex<Vec<VisitorAppointment>>,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
}

impl MemVisitorAppointments {
    pub fn new(items: Vec<VisitorAppointment>) -> Self {
        Self {
            items: Mutex::new(items),
            update_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    fn sorted(&self) -> Vec<VisitorAppointment> {
        let mut items = self.items.lock().unwrap().clone();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }
}

#[async_trait]
impl VisitorAppointmentRepo for MemVisitorAppointments {
    async fn find_all(&self) -> Result<Vec<VisitorAppointment>, StoreError> {
        Ok(self.sorted())
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<VisitorAppointment>, StoreError> {
        Ok(self.sorted().into_iter().take(limit as usize).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<VisitorAppointment>, StoreError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.appointment_id == id)
            .cloned())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: VisitorAppointmentPatch,
    ) -> Result<Option<VisitorAppointment>, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }

        let mut items = self.items.lock().unwrap();
        let Some(a) = items.iter_mut().find(|a| a.appointment_id == id) else {
            return Ok(None);
        };
        if let Some(status) = patch.status {
            a.status = status;
        }
        if let Some(preferred_date) = patch.preferred_date {
            a.preferred_date = preferred_date;
        }
        if let Some(confirmed_date) = patch.confirmed_date {
            a.confirmed_date = confirmed_date;
        }
        if let Some(alternative_date) = patch.alternative_date {
            a.alternative_date = alternative_date;
        }
        if let Some(assigned_lawyer_id) = patch.assigned_lawyer_id {
            a.assigned_lawyer = assigned_lawyer_id.map(|id| PersonBrief {
                id,
                display: String::new(),
                email: None,
            });
        }
        if let Some(full_name) = patch.full_name {
            a.full_name = full_name;
        }
        if let Some(email) = patch.email {
            a.email = email;
        }
        if let Some(phone) = patch.phone {
            a.phone = phone;
        }
        if let Some(age) = patch.age {
            a.age = age;
        }
        if let Some(consultation_reason) = patch.consultation_reason {
            a.consultation_reason = consultation_reason;
        }
        if let Some(consultation_type) = patch.consultation_type {
            a.consultation_type = consultation_type;
        }
        Ok(Some(a.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(write_failure());
        }
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|a| a.appointment_id != id);
        Ok(items.len() < before)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.items.lock().unwrap().len() as i64)
    }
}

pub struct MemUsers {
    users: Vec<(PersonBrief, i16)>,
}

impl MemUsers {
    pub fn new(users: Vec<(PersonBrief, i16)>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UserRepo for MemUsers {
    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.users.len() as i64)
    }

    async fn count_by_role(&self, role: i16) -> Result<i64, StoreError> {
        Ok(self.users.iter().filter(|(_, r)| *r == role).count() as i64)
    }

    async fn find_lawyers(&self) -> Result<Vec<PersonBrief>, StoreError> {
        Ok(self
            .users
            .iter()
            .filter(|(_, r)| *r == ROLE_LAWYER)
            .map(|(b, _)| b.clone())
            .collect())
    }
}

pub struct MemCases {
    cases: Vec<CaseSummary>,
}

impl MemCases {
    pub fn new(cases: Vec<CaseSummary>) -> Self {
        Self { cases }
    }
}

#[async_trait]
impl CaseRepo for MemCases {
    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.cases.len() as i64)
    }

    async fn find_recent(&self, limit: i64) -> Result<Vec<CaseSummary>, StoreError> {
        let mut cases = self.cases.clone();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases.into_iter().take(limit as usize).collect())
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError> {
        Ok(group_by_status(self.cases.iter().map(|c| c.status.as_str())))
    }

    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let mut by_lawyer: BTreeMap<Uuid, i64> = BTreeMap::new();
        for c in &self.cases {
            *by_lawyer.entry(c.lawyer.id).or_insert(0) += 1;
        }
        Ok(by_lawyer.into_iter().collect())
    }
}

pub struct MemTasks {
    tasks: Vec<TaskSummary>,
}

impl MemTasks {
    pub fn new(tasks: Vec<TaskSummary>) -> Self {
        Self { tasks }
    }
}

#[async_trait]
impl TaskRepo for MemTasks {
    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.tasks.len() as i64)
    }

    async fn find_overdue(&self, now: DateTime<Utc>) -> Result<Vec<TaskSummary>, StoreError> {
        let mut overdue: Vec<TaskSummary> = self
            .tasks
            .iter()
            .filter(|t| {
                t.status != crate::store::tasks::TASK_STATUS_COMPLETED
                    && t.due_at.is_some_and(|due| due < now)
            })
            .cloned()
            .collect();
        overdue.sort_by_key(|t| t.due_at);
        Ok(overdue)
    }

    async fn count_by_status(&self) -> Result<Vec<StatusCount>, StoreError> {
        Ok(group_by_status(self.tasks.iter().map(|t| t.status.as_str())))
    }

    async fn count_by_lawyer(&self) -> Result<Vec<(Uuid, i64)>, StoreError> {
        let mut by_lawyer: BTreeMap<Uuid, i64> = BTreeMap::new();
        for t in &self.tasks {
            if let Some(l) = &t.assigned_lawyer {
                *by_lawyer.entry(l.id).or_insert(0) += 1;
            }
        }
        Ok(by_lawyer.into_iter().collect())
    }
}

pub struct MemDocuments {
    docs: Vec<(String, i64)>,
}

impl MemDocuments {
    /// Each entry is (mime_type, size_bytes).
    pub fn new(docs: Vec<(String, i64)>) -> Self {
        Self { docs }
    }
}

#[async_trait]
impl DocumentRepo for MemDocuments {
    async fn count_all(&self) -> Result<i64, StoreError> {
        Ok(self.docs.len() as i64)
    }

    async fn stats_by_mime_type(&self) -> Result<Vec<DocumentTypeStat>, StoreError> {
        let mut by_mime: BTreeMap<String, (i64, i64)> = BTreeMap::new();
        for (mime, size) in &self.docs {
            let entry = by_mime.entry(mime.clone()).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += size;
        }
        Ok(by_mime
            .into_iter()
            .map(|(mime_type, (count, total_size_bytes))| DocumentTypeStat {
                mime_type,
                count,
                total_size_bytes,
            })
            .collect())
    }
}

fn group_by_status<'a>(statuses: impl Iterator<Item = &'a str>) -> Vec<StatusCount> {
    let mut by_status: BTreeMap<&str, i64> = BTreeMap::new();
    for s in statuses {
        *by_status.entry(s).or_insert(0) += 1;
    }
    by_status
        .into_iter()
        .map(|(status, count)| StatusCount {
            status: status.to_string(),
            count,
        })
        .collect()
}
