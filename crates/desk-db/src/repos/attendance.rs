//! Attendance repository.

use chrono::NaiveDate;
use desk_core::entities::Attendance;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_ATTENDANCE;
use desk_core::inputs::NewAttendance;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, get_opt_string, now_utc, parse_date, parse_datetime, parse_enum,
    parse_optional_datetime,
};
use crate::repos::audit::record_audit;
use crate::repos::employee::fetch_employee;
use crate::service::{DeskService, finish};

const SELECT_COLS: &str =
    "id, employee_id, date, check_in, check_out, status, note, location, created_at";

fn row_to_attendance(row: &libsql::Row) -> Result<Attendance, DatabaseError> {
    Ok(Attendance {
        id: row.get::<String>(0)?,
        employee_id: row.get::<String>(1)?,
        date: parse_date(&row.get::<String>(2)?)?,
        check_in: parse_optional_datetime(get_opt_string(row, 3)?.as_deref())?,
        check_out: parse_optional_datetime(get_opt_string(row, 4)?.as_deref())?,
        status: parse_enum(&row.get::<String>(5)?)?,
        note: get_opt_string(row, 6)?,
        location: get_opt_string(row, 7)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
    })
}

impl DeskService {
    /// Record an attendance entry. The date defaults to today (UTC).
    ///
    /// # Errors
    ///
    /// Returns `Validation`, or `NotFound` if the employee does not exist.
    pub async fn log_attendance(
        &self,
        actor: Option<&str>,
        input: &NewAttendance,
    ) -> Result<Attendance, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_employee(&tx, &input.employee_id).await?;
            let now = now_utc();
            let record = Attendance {
                id: generate_id(&tx, PREFIX_ATTENDANCE).await?,
                employee_id: input.employee_id.clone(),
                date: input.date.unwrap_or_else(|| now.date_naive()),
                check_in: input.check_in,
                check_out: input.check_out,
                status: input.status,
                note: input.note.clone(),
                location: input.location.clone(),
                created_at: now,
            };
            tx.execute(
                "INSERT INTO attendance (id, employee_id, date, check_in, check_out, status,
                     note, location, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                libsql::params![
                    record.id.as_str(),
                    record.employee_id.as_str(),
                    record.date.to_string(),
                    record.check_in.as_ref().map(fmt_datetime),
                    record.check_out.as_ref().map(fmt_datetime),
                    record.status.as_str(),
                    record.note.as_deref(),
                    record.location.as_deref(),
                    fmt_datetime(&now)
                ],
            )
            .await?;
            record_audit(
                &tx,
                actor,
                EntityType::Attendance,
                &record.id,
                AuditAction::Created,
                None,
            )
            .await?;
            Ok(record)
        }
        .await;
        finish(tx, result).await
    }

    /// One employee's attendance, most recent day first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn attendance_for_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Attendance>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM attendance WHERE employee_id = ?1
                     ORDER BY date DESC, created_at DESC, rowid DESC"
                ),
                [employee_id],
            )
            .await?;
        collect(rows).await
    }

    /// Everyone's attendance for one calendar day.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn attendance_on_date(&self, date: NaiveDate) -> Result<Vec<Attendance>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM attendance WHERE date = ?1
                     ORDER BY created_at, rowid"
                ),
                [date.to_string()],
            )
            .await?;
        collect(rows).await
    }
}

async fn collect(mut rows: libsql::Rows) -> Result<Vec<Attendance>, DatabaseError> {
    let mut out = Vec::new();
    while let Some(row) = rows.next().await? {
        out.push(row_to_attendance(&row)?);
    }
    Ok(out)
}
