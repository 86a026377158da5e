pub mod courses;
pub mod ratings;
pub mod users;
