//! # Staff API
//!
//! Staff records and daily attendance. These endpoints take the retailer
//! as a `retailerId` query parameter rather than the header.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use khatha_core::validation::validate_name;
use khatha_core::{Attendance, AttendanceStatus, Staff};

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Body of `POST /staff/attendance`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendance {
    pub staff_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Days per status over a set of attendance records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    pub present: u32,
    pub absent: u32,
    pub half_day: u32,
    pub leave: u32,
}

impl AttendanceSummary {
    pub fn from_records(records: &[Attendance]) -> Self {
        let mut summary = AttendanceSummary::default();
        for record in records {
            match record.status {
                AttendanceStatus::Present => summary.present += 1,
                AttendanceStatus::Absent => summary.absent += 1,
                AttendanceStatus::HalfDay => summary.half_day += 1,
                AttendanceStatus::Leave => summary.leave += 1,
            }
        }
        summary
    }

    /// Present days with half days counted as half, in tenths of a day.
    pub fn worked_tenths(&self) -> u32 {
        self.present * 10 + self.half_day * 5
    }
}

pub struct StaffApi<'a> {
    http: &'a HttpClient,
}

impl<'a> StaffApi<'a> {
    pub(crate) fn new(http: &'a HttpClient) -> Self {
        StaffApi { http }
    }

    fn scope(&self) -> ClientResult<Vec<(&'static str, String)>> {
        Ok(vec![("retailerId", self.http.require_retailer()?.to_string())])
    }

    /// `GET /staff?retailerId=`.
    pub async fn list(&self) -> ClientResult<Vec<Staff>> {
        self.http.get("/staff", &self.scope()?).await
    }

    /// `POST /staff?retailerId=`.
    pub async fn add(&self, staff: &Staff) -> ClientResult<Staff> {
        validate_name("name", &staff.name)?;
        let created: Staff = self.http.post("/staff", &self.scope()?, staff).await?;
        info!(staff_id = ?created.id, name = %created.name, "Staff added");
        Ok(created)
    }

    /// `DELETE /staff/{id}?retailerId=`.
    pub async fn delete(&self, staff_id: i64) -> ClientResult<()> {
        self.http
            .delete(&format!("/staff/{}", staff_id), &self.scope()?)
            .await
    }

    /// `GET /staff/attendance/today?retailerId=`.
    pub async fn today_attendance(&self) -> ClientResult<Vec<Attendance>> {
        self.http.get("/staff/attendance/today", &self.scope()?).await
    }

    /// `POST /staff/attendance?retailerId=`.
    pub async fn mark_attendance(&self, mark: &MarkAttendance) -> ClientResult<()> {
        let builder = self
            .http
            .request(reqwest::Method::POST, "/staff/attendance")?
            .query(&self.scope()?)
            .json(mark);
        self.http.send_text(builder).await?;
        info!(staff_id = mark.staff_id, date = %mark.date, status = ?mark.status, "Attendance marked");
        Ok(())
    }

    /// `GET /staff/{id}/attendance?retailerId=`.
    pub async fn attendance(&self, staff_id: i64) -> ClientResult<Vec<Attendance>> {
        self.http
            .get(&format!("/staff/{}/attendance", staff_id), &self.scope()?)
            .await
    }

    /// `GET /staff/{id}/attendance/monthly?month=&year=&retailerId=`.
    pub async fn monthly_attendance(&self, staff_id: i64, month: u32, year: i32) -> ClientResult<Vec<Attendance>> {
        let mut query = vec![("month", month.to_string()), ("year", year.to_string())];
        query.extend(self.scope()?);
        self.http
            .get(&format!("/staff/{}/attendance/monthly", staff_id), &query)
            .await
    }
}
