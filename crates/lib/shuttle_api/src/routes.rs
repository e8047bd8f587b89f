//! Route paths.

pub const GET_API_HEALTH: &str = "/api/health";
pub const SCHOOL_STUDENTS: &str = "/api/school/students";
pub const SCHOOL_STUDENTS_ID: &str = "/api/school/students/{id}";
