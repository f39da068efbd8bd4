pub mod auth;
pub mod courses;
pub mod registrations;
pub mod students;
