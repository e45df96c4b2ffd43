use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, normalize_notes};
use crate::model::employee::{Employee, EmployeeStatus};
use crate::model::schedule::EmployeeSchedule;
use crate::utils::time_utils::round2;

/// In-memory record store standing in for the persistence collaborator.
/// All writes go through one lock, which is what makes the clock-in
/// check-then-insert safe against concurrent requests for the same
/// employee.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    employees: BTreeMap<u64, Employee>,
    schedules: BTreeMap<u64, EmployeeSchedule>,
    attendance: BTreeMap<u64, AttendanceRecord>,
    next_employee_id: u64,
    next_record_id: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }

    // ---- employees ----

    pub fn insert_employee(
        &self,
        employee_code: String,
        first_name: String,
        last_name: String,
        email: String,
        hire_date: NaiveDate,
    ) -> Result<Employee, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if tables.employees.values().any(|e| e.employee_code == employee_code) {
            return Err(AppError::Conflict(format!(
                "employee code '{}' is already taken",
                employee_code
            )));
        }
        tables.next_employee_id += 1;
        let employee = Employee {
            id: tables.next_employee_id,
            employee_code,
            first_name,
            last_name,
            email,
            hire_date,
            status: EmployeeStatus::Active,
        };
        tables.employees.insert(employee.id, employee.clone());
        info!(employee_id = employee.id, "employee registered");
        Ok(employee)
    }

    pub fn get_employee(&self, id: u64) -> Result<Employee, AppError> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables
            .employees
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("employee {}", id)))
    }

    pub fn list_employees(&self, status: Option<EmployeeStatus>) -> Vec<Employee> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables
            .employees
            .values()
            .filter(|e| status.map_or(true, |s| e.status == s))
            .cloned()
            .collect()
    }

    pub fn list_active_employees(&self) -> Vec<Employee> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables
            .employees
            .values()
            .filter(|e| e.is_active())
            .cloned()
            .collect()
    }

    // ---- schedules ----

    /// Create-if-absent, update-in-place if present. One row per employee.
    pub fn upsert_schedule(&self, schedule: EmployeeSchedule) -> Result<EmployeeSchedule, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if !tables.employees.contains_key(&schedule.employee_id) {
            return Err(AppError::NotFound(format!("employee {}", schedule.employee_id)));
        }
        tables.schedules.insert(schedule.employee_id, schedule.clone());
        Ok(schedule)
    }

    /// Absence is a normal state; the resolver falls back to defaults.
    pub fn get_schedule(&self, employee_id: u64) -> Option<EmployeeSchedule> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables.schedules.get(&employee_id).cloned()
    }

    // ---- attendance lifecycle ----

    /// Clock-in path. Enforces the one-open-record invariant: the check
    /// and the insert happen under the same write lock, and a second
    /// clock-in while a record is open is a conflict.
    pub fn clock_in(
        &self,
        employee_id: u64,
        now: NaiveDateTime,
        notes: Option<String>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if !tables.employees.contains_key(&employee_id) {
            return Err(AppError::NotFound(format!("employee {}", employee_id)));
        }
        if let Some(open) = tables
            .attendance
            .values()
            .find(|r| r.employee_id == employee_id && r.clock_out.is_none())
        {
            warn!(employee_id, record_id = open.id, "clock-in rejected, record still open");
            return Err(AppError::Conflict(format!(
                "employee {} is already clocked in",
                employee_id
            )));
        }

        tables.next_record_id += 1;
        let record = AttendanceRecord {
            id: tables.next_record_id,
            employee_id,
            clock_in: now,
            clock_out: None,
            hours_worked: None,
            notes: normalize_notes(notes),
        };
        tables.attendance.insert(record.id, record.clone());
        info!(employee_id, record_id = record.id, "clocked in");
        Ok(record)
    }

    /// Clock-out path: closes the open record and derives `hours_worked`
    /// as elapsed wall-clock hours, 2-decimal.
    pub fn clock_out(&self, employee_id: u64, now: NaiveDateTime) -> Result<AttendanceRecord, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if !tables.employees.contains_key(&employee_id) {
            return Err(AppError::NotFound(format!("employee {}", employee_id)));
        }
        let record = tables
            .attendance
            .values_mut()
            .find(|r| r.employee_id == employee_id && r.clock_out.is_none())
            .ok_or_else(|| {
                AppError::Validation(format!("no active clock-in record for employee {}", employee_id))
            })?;

        if now < record.clock_in {
            return Err(AppError::Computation(format!(
                "clock-out {} precedes clock-in {}",
                now, record.clock_in
            )));
        }
        record.clock_out = Some(now);
        record.hours_worked = Some(round2((now - record.clock_in).num_seconds() as f64 / 3600.0));
        info!(employee_id, record_id = record.id, "clocked out");
        Ok(record.clone())
    }

    /// Manual correction path: an administrator may create a record with
    /// arbitrary timestamps. This bypasses the one-open-record check, but
    /// an inverted interval is still rejected.
    pub fn insert_record(
        &self,
        employee_id: u64,
        clock_in: NaiveDateTime,
        clock_out: Option<NaiveDateTime>,
        notes: Option<String>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        if !tables.employees.contains_key(&employee_id) {
            return Err(AppError::NotFound(format!("employee {}", employee_id)));
        }
        let hours_worked = match clock_out {
            Some(out) if out < clock_in => {
                return Err(AppError::Computation(format!(
                    "clock-out {} precedes clock-in {}",
                    out, clock_in
                )));
            }
            Some(out) => Some(round2((out - clock_in).num_seconds() as f64 / 3600.0)),
            None => None,
        };

        tables.next_record_id += 1;
        let record = AttendanceRecord {
            id: tables.next_record_id,
            employee_id,
            clock_in,
            clock_out,
            hours_worked,
            notes: normalize_notes(notes),
        };
        tables.attendance.insert(record.id, record.clone());
        Ok(record)
    }

    /// Manual edit of an existing record; `hours_worked` is recomputed
    /// from whatever timestamps remain after the patch.
    pub fn update_record(
        &self,
        id: u64,
        clock_in: Option<NaiveDateTime>,
        clock_out: Option<NaiveDateTime>,
        notes: Option<String>,
    ) -> Result<AttendanceRecord, AppError> {
        let mut tables = self.tables.write().expect("store lock poisoned");
        let record = tables
            .attendance
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("attendance record {}", id)))?;

        let new_in = clock_in.unwrap_or(record.clock_in);
        let new_out = clock_out.or(record.clock_out);
        if let Some(out) = new_out {
            if out < new_in {
                return Err(AppError::Computation(format!(
                    "clock-out {} precedes clock-in {}",
                    out, new_in
                )));
            }
        }

        record.clock_in = new_in;
        record.clock_out = new_out;
        record.hours_worked =
            new_out.map(|out| round2((out - new_in).num_seconds() as f64 / 3600.0));
        if notes.is_some() {
            record.notes = normalize_notes(notes);
        }
        Ok(record.clone())
    }

    pub fn get_record(&self, id: u64) -> Result<AttendanceRecord, AppError> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables
            .attendance
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("attendance record {}", id)))
    }

    /// Attendance rows, optionally narrowed to one employee and/or an
    /// inclusive date range (judged on the clock-in date).
    pub fn list_attendance(
        &self,
        employee_id: Option<u64>,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Vec<AttendanceRecord> {
        let tables = self.tables.read().expect("store lock poisoned");
        tables
            .attendance
            .values()
            .filter(|r| employee_id.map_or(true, |id| r.employee_id == id))
            .filter(|r| range.map_or(true, |(start, end)| r.date() >= start && r.date() <= end))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    fn store_with_employee() -> (MemoryStore, u64) {
        let store = MemoryStore::new();
        let employee = store
            .insert_employee(
                "EMP-001".into(),
                "Anna".into(),
                "Doe".into(),
                "anna@example.com".into(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
            .unwrap();
        (store, employee.id)
    }

    #[test]
    fn double_clock_in_is_a_conflict() {
        let (store, id) = store_with_employee();
        store.clock_in(id, dt(2025, 12, 1, 9, 0), None).unwrap();
        let err = store.clock_in(id, dt(2025, 12, 1, 9, 5), None).unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn clock_out_closes_and_computes_hours() {
        let (store, id) = store_with_employee();
        store.clock_in(id, dt(2025, 12, 1, 9, 0), None).unwrap();
        let record = store.clock_out(id, dt(2025, 12, 1, 17, 30)).unwrap();
        assert_eq!(record.hours_worked, Some(8.5));
        assert!(record.is_complete());

        // A new clock-in is allowed once the record is closed.
        store.clock_in(id, dt(2025, 12, 2, 9, 0), None).unwrap();
    }

    #[test]
    fn clock_out_without_open_record_fails() {
        let (store, id) = store_with_employee();
        let err = store.clock_out(id, dt(2025, 12, 1, 17, 0)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn clock_out_before_clock_in_fails() {
        let (store, id) = store_with_employee();
        store.clock_in(id, dt(2025, 12, 1, 9, 0), None).unwrap();
        let err = store.clock_out(id, dt(2025, 12, 1, 8, 0)).unwrap_err();
        assert!(matches!(err, AppError::Computation(_)));
    }

    #[test]
    fn unknown_employee_is_not_found() {
        let store = MemoryStore::new();
        let err = store.clock_in(99, dt(2025, 12, 1, 9, 0), None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn manual_insert_bypasses_open_record_invariant() {
        let (store, id) = store_with_employee();
        store.clock_in(id, dt(2025, 12, 1, 9, 0), None).unwrap();
        // Backfilling an older open record while one is already open is
        // allowed on the correction path.
        let record = store
            .insert_record(id, dt(2025, 11, 28, 9, 0), None, Some("forgot to clock out".into()))
            .unwrap();
        assert!(record.clock_out.is_none());
        assert_eq!(record.notes.as_deref(), Some("forgot to clock out"));
    }

    #[test]
    fn manual_insert_computes_hours_for_complete_records() {
        let (store, id) = store_with_employee();
        let record = store
            .insert_record(id, dt(2025, 11, 28, 9, 0), Some(dt(2025, 11, 28, 17, 15)), None)
            .unwrap();
        assert_eq!(record.hours_worked, Some(8.25));
    }

    #[test]
    fn manual_insert_rejects_inverted_interval() {
        let (store, id) = store_with_employee();
        let err = store
            .insert_record(id, dt(2025, 11, 28, 17, 0), Some(dt(2025, 11, 28, 9, 0)), None)
            .unwrap_err();
        assert!(matches!(err, AppError::Computation(_)));
    }

    #[test]
    fn update_recomputes_hours() {
        let (store, id) = store_with_employee();
        let record = store
            .insert_record(id, dt(2025, 12, 1, 9, 0), Some(dt(2025, 12, 1, 17, 0)), None)
            .unwrap();
        let updated = store
            .update_record(record.id, None, Some(dt(2025, 12, 1, 18, 0)), None)
            .unwrap();
        assert_eq!(updated.hours_worked, Some(9.0));
    }

    #[test]
    fn duplicate_employee_code_is_a_conflict() {
        let (store, _) = store_with_employee();
        let err = store
            .insert_employee(
                "EMP-001".into(),
                "Ben".into(),
                "Roe".into(),
                "ben@example.com".into(),
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            )
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[test]
    fn list_attendance_filters_by_employee_and_range() {
        let (store, id) = store_with_employee();
        store
            .insert_record(id, dt(2025, 12, 1, 9, 0), Some(dt(2025, 12, 1, 17, 0)), None)
            .unwrap();
        store
            .insert_record(id, dt(2025, 12, 8, 9, 0), Some(dt(2025, 12, 8, 17, 0)), None)
            .unwrap();

        let week = store.list_attendance(
            Some(id),
            Some((
                NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 7).unwrap(),
            )),
        );
        assert_eq!(week.len(), 1);
        assert_eq!(store.list_attendance(Some(id), None).len(), 2);
        assert!(store.list_attendance(Some(id + 1), None).is_empty());
    }
}
