//! # Staff Commands
//!
//! Staff records and attendance. Dates default to today and months to the
//! current one, in local time.

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;

use khatha_client::api::staff::{AttendanceSummary, MarkAttendance};
use khatha_core::{Attendance, AttendanceStatus, Staff};

use crate::cli::StaffCommand;
use crate::commands::{confirm_or_cancel, retailer_api, Reply};
use crate::error::{CommandError, CommandResult};
use crate::prompt::Prompt;
use crate::state::AppState;
use crate::view;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthView {
    staff_id: i64,
    month: u32,
    year: i32,
    records: Vec<Attendance>,
    summary: AttendanceSummary,
}

pub async fn run(state: &AppState, cmd: StaffCommand, prompt: &mut dyn Prompt) -> CommandResult<Reply> {
    let (api, _) = retailer_api(state).await?;

    match cmd {
        StaffCommand::List => {
            let staff = api.staff().list().await?;
            Reply::new(render_staff(&staff), &staff)
        }
        StaffCommand::Add {
            name,
            phone,
            role,
            salary,
        } => {
            let added = api
                .staff()
                .add(&Staff {
                    id: None,
                    name: name.trim().to_string(),
                    phone,
                    role,
                    salary,
                })
                .await?;
            let id = added.id.map(|id| format!(" (id {})", id)).unwrap_or_default();
            Reply::new(format!("{} added{}", added.name, id), &added)
        }
        StaffCommand::Delete { id, yes } => {
            confirm_or_cancel(prompt, yes, &format!("Remove staff member {}?", id))?;
            api.staff().delete(id).await?;
            Ok(Reply::message(format!("Staff member {} removed", id)))
        }
        StaffCommand::Today => {
            let records = api.staff().today_attendance().await?;
            Reply::new(render_attendance(&records), &records)
        }
        StaffCommand::Mark { id, status, date } => {
            let mark = MarkAttendance {
                staff_id: id,
                date: date.unwrap_or_else(today),
                status,
            };
            api.staff().mark_attendance(&mark).await?;
            Reply::new(
                format!("Staff {} marked {} on {}", id, status_label(status), mark.date),
                &mark,
            )
        }
        StaffCommand::History { id } => {
            let records = api.staff().attendance(id).await?;
            Reply::new(render_attendance(&records), &records)
        }
        StaffCommand::Monthly { id, month, year } => {
            let now = today();
            let month = month.unwrap_or_else(|| now.month());
            if !(1..=12).contains(&month) {
                return Err(CommandError::validation(format!("Month must be 1-12, got {}", month)));
            }
            let year = year.unwrap_or_else(|| now.year());

            let records = api.staff().monthly_attendance(id, month, year).await?;
            let data = MonthView {
                staff_id: id,
                month,
                year,
                summary: AttendanceSummary::from_records(&records),
                records,
            };
            Reply::new(render_month(&data), &data)
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn status_label(status: AttendanceStatus) -> &'static str {
    match status {
        AttendanceStatus::Present => "PRESENT",
        AttendanceStatus::Absent => "ABSENT",
        AttendanceStatus::HalfDay => "HALF_DAY",
        AttendanceStatus::Leave => "LEAVE",
    }
}

fn render_staff(staff: &[Staff]) -> String {
    let rows: Vec<Vec<String>> = staff
        .iter()
        .map(|s| {
            vec![
                s.id.map(|id| id.to_string()).unwrap_or_default(),
                s.name.clone(),
                view::opt(&s.phone),
                view::opt(&s.role),
                s.salary.map(|m| m.to_string()).unwrap_or_else(|| "-".into()),
            ]
        })
        .collect();
    view::table_or_empty(&["Id", "Name", "Phone", "Role", "Salary"], &rows, "No staff yet")
}

fn render_attendance(records: &[Attendance]) -> String {
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|a| vec![a.date.to_string(), a.staff_id.to_string(), status_label(a.status).to_string()])
        .collect();
    view::table_or_empty(&["Date", "Staff", "Status"], &rows, "No attendance marked")
}

fn render_month(month: &MonthView) -> String {
    let s = &month.summary;
    let worked = s.worked_tenths();
    format!(
        "Staff {} in {}-{:02}\n\n{}\n\nPresent {}  Half day {}  Absent {}  Leave {}  Worked {}.{} day(s)",
        month.staff_id,
        month.year,
        month.month,
        render_attendance(&month.records),
        s.present,
        s.half_day,
        s.absent,
        s.leave,
        worked / 10,
        worked % 10
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, status: AttendanceStatus) -> Attendance {
        Attendance {
            id: None,
            staff_id: 4,
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
            status,
        }
    }

    #[test]
    fn test_month_totals_line() {
        let records = vec![
            record(1, AttendanceStatus::Present),
            record(2, AttendanceStatus::HalfDay),
            record(3, AttendanceStatus::Absent),
        ];
        let view = MonthView {
            staff_id: 4,
            month: 6,
            year: 2024,
            summary: AttendanceSummary::from_records(&records),
            records,
        };
        let text = render_month(&view);
        assert!(text.starts_with("Staff 4 in 2024-06"));
        assert!(text.contains("2024-06-02  4      HALF_DAY"));
        assert!(text.ends_with("Present 1  Half day 1  Absent 1  Leave 0  Worked 1.5 day(s)"));
    }

    #[test]
    fn test_staff_without_salary() {
        let staff = vec![Staff {
            id: Some(4),
            name: "Suresh".into(),
            phone: None,
            role: Some("Helper".into()),
            salary: None,
        }];
        assert!(render_staff(&staff).lines().nth(2).unwrap().ends_with("Helper  -"));
    }
}
