//! Employee repository.

use desk_core::entities::{Employee, Salary};
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_EMPLOYEE;
use desk_core::inputs::NewEmployee;
use tracing::info;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    encode_string_list, fmt_datetime, get_opt_string, now_utc, parse_date, parse_datetime,
    parse_enum, parse_optional_date, parse_string_list,
};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::employee::EmployeeUpdate;

const SELECT_COLS: &str = "id, employee_code, user_id, first_name, last_name, email, phone, \
     designation, department, date_of_joining, date_of_birth, address, status, salary, \
     documents, created_at, updated_at";

const UNIQUE_FIELDS: &str = "employee code, email, or user account already belongs to another employee";

fn row_to_employee(row: &libsql::Row) -> Result<Employee, DatabaseError> {
    let salary = match get_opt_string(row, 13)? {
        Some(json) => Some(serde_json::from_str::<Salary>(&json).map_err(|e| {
            DatabaseError::Query(format!("Invalid salary in column: {e}"))
        })?),
        None => None,
    };
    Ok(Employee {
        id: row.get::<String>(0)?,
        employee_code: row.get::<String>(1)?,
        user_id: get_opt_string(row, 2)?,
        first_name: row.get::<String>(3)?,
        last_name: row.get::<String>(4)?,
        email: row.get::<String>(5)?,
        phone: row.get::<String>(6)?,
        designation: row.get::<String>(7)?,
        department: row.get::<String>(8)?,
        date_of_joining: parse_date(&row.get::<String>(9)?)?,
        date_of_birth: parse_optional_date(get_opt_string(row, 10)?.as_deref())?,
        address: get_opt_string(row, 11)?,
        status: parse_enum(&row.get::<String>(12)?)?,
        salary,
        documents: parse_string_list(&row.get::<String>(14)?)?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

pub(crate) async fn fetch_employee(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Employee, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM employees WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("employee", id))?;
    row_to_employee(&row)
}

/// Linking an employee to a login requires the user to exist.
async fn ensure_user_exists(conn: &libsql::Connection, user_id: &str) -> Result<(), DatabaseError> {
    let mut rows = conn
        .query("SELECT 1 FROM users WHERE id = ?1", [user_id])
        .await?;
    if rows.next().await?.is_none() {
        return Err(DatabaseError::not_found("user", user_id));
    }
    Ok(())
}

fn encode_salary(salary: Option<&Salary>) -> Result<Option<String>, DatabaseError> {
    Ok(salary.map(serde_json::to_string).transpose()?)
}

impl DeskService {
    /// # Errors
    ///
    /// Returns `Validation`, `NotFound` for an unknown `user_id`, or
    /// `Conflict` when the code, email or user link is taken.
    pub async fn create_employee(
        &self,
        actor: Option<&str>,
        input: &NewEmployee,
    ) -> Result<Employee, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            if let Some(ref user_id) = input.user_id {
                ensure_user_exists(&tx, user_id).await?;
            }
            let now = now_utc();
            let employee = Employee {
                id: generate_id(&tx, PREFIX_EMPLOYEE).await?,
                employee_code: input.employee_code.trim().to_string(),
                user_id: input.user_id.clone(),
                first_name: input.first_name.trim().to_string(),
                last_name: input.last_name.trim().to_string(),
                email: input.email.trim().to_string(),
                phone: input.phone.trim().to_string(),
                designation: input.designation.trim().to_string(),
                department: input.department.trim().to_string(),
                date_of_joining: input.date_of_joining,
                date_of_birth: input.date_of_birth,
                address: input.address.clone(),
                status: input.status,
                salary: input.salary.clone(),
                documents: input.documents.clone(),
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO employees (id, employee_code, user_id, first_name, last_name, email,
                     phone, designation, department, date_of_joining, date_of_birth, address,
                     status, salary, documents, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                libsql::params![
                    employee.id.as_str(),
                    employee.employee_code.as_str(),
                    employee.user_id.as_deref(),
                    employee.first_name.as_str(),
                    employee.last_name.as_str(),
                    employee.email.as_str(),
                    employee.phone.as_str(),
                    employee.designation.as_str(),
                    employee.department.as_str(),
                    employee.date_of_joining.to_string(),
                    employee.date_of_birth.map(|d| d.to_string()),
                    employee.address.as_deref(),
                    employee.status.as_str(),
                    encode_salary(employee.salary.as_ref())?,
                    encode_string_list(&employee.documents)?,
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from_write(e, || UNIQUE_FIELDS.to_string()))?;

            record_audit(
                &tx,
                actor,
                EntityType::Employee,
                &employee.id,
                AuditAction::Created,
                None,
            )
            .await?;
            Ok(employee)
        }
        .await;
        let employee = finish(tx, result).await?;
        info!(id = %employee.id, code = %employee.employee_code, "employee created");
        Ok(employee)
    }

    /// Employees ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_employees(&self) -> Result<Vec<Employee>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM employees
                     ORDER BY first_name COLLATE NOCASE, last_name COLLATE NOCASE"
                ),
                (),
            )
            .await?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next().await? {
            employees.push(row_to_employee(&row)?);
        }
        Ok(employees)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no employee has this id.
    pub async fn get_employee(&self, id: &str) -> Result<Employee, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_employee(conn, id).await
    }

    /// # Errors
    ///
    /// Returns `NotFound`, `Validation`, or `Conflict`.
    pub async fn update_employee(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &EmployeeUpdate,
    ) -> Result<Employee, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_employee(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref code) = update.employee_code {
                set.push("employee_code", code.trim());
            }
            if let Some(ref user_id) = update.user_id {
                if let Some(user_id) = user_id {
                    ensure_user_exists(&tx, user_id).await?;
                }
                set.push_opt("user_id", user_id.as_deref());
            }
            for (column, value) in [
                ("first_name", &update.first_name),
                ("last_name", &update.last_name),
                ("email", &update.email),
                ("phone", &update.phone),
                ("designation", &update.designation),
                ("department", &update.department),
            ] {
                if let Some(value) = value {
                    set.push(column, value.trim());
                }
            }
            if let Some(date) = update.date_of_joining {
                set.push("date_of_joining", date.to_string());
            }
            if let Some(date) = update.date_of_birth {
                set.push_opt("date_of_birth", date.map(|d| d.to_string()).as_deref());
            }
            if let Some(ref address) = update.address {
                set.push_opt("address", address.as_deref());
            }
            if let Some(status) = update.status {
                set.push("status", status.as_str());
            }
            if let Some(ref salary) = update.salary {
                set.push_opt("salary", encode_salary(salary.as_ref())?.as_deref());
            }
            if let Some(ref documents) = update.documents {
                set.push("documents", encode_string_list(documents)?);
            }
            if set.is_empty() {
                return fetch_employee(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("employees", id);
            tx.execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| DatabaseError::from_write(e, || UNIQUE_FIELDS.to_string()))?;
            record_audit(
                &tx,
                actor,
                EntityType::Employee,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_employee(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Delete an employee together with their attendance history.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no employee has this id.
    pub async fn delete_employee(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx
                .execute("DELETE FROM employees WHERE id = ?1", [id])
                .await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("employee", id));
            }
            record_audit(&tx, actor, EntityType::Employee, id, AuditAction::Deleted, None)
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}
