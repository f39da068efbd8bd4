use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::{EnrollmentWithCourseRow, Student, StudentProgress};

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct EnrollmentSummary {
    pub id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub enrolled_at: chrono::DateTime<chrono::Utc>,
}

impl From<EnrollmentWithCourseRow> for EnrollmentSummary {
    fn from(row: EnrollmentWithCourseRow) -> Self {
        Self {
            id: row.id,
            course_id: row.course_id,
            course_title: row.course_title,
            start_date: row.start_date,
            end_date: row.end_date,
            enrolled_at: row.enrolled_at,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CourseProgress {
    pub course_id: Uuid,
    pub completed_lessons: i64,
    pub total_lessons: i64,
    /// 0..=100, rounded down; 100 for a course with no lessons
    pub percent: i64,
}

impl From<&StudentProgress> for CourseProgress {
    fn from(p: &StudentProgress) -> Self {
        let percent = if p.total_lessons() > 0 {
            p.completed_lessons() * 100 / p.total_lessons()
        } else {
            100
        };
        Self {
            course_id: p.course_id(),
            completed_lessons: p.completed_lessons(),
            total_lessons: p.total_lessons(),
            percent,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardResponse {
    pub student: Student,
    pub enrollments: Vec<EnrollmentSummary>,
    pub progress: Vec<CourseProgress>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StudentDetailResponse {
    pub student: Student,
    pub enrollments: Vec<EnrollmentSummary>,
}
