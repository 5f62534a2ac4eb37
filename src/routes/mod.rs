// src/routes/mod.rs
pub mod categories;
pub mod content;
pub mod enrollments;
pub mod frontend;
pub mod health;
pub mod progress;
pub mod reviews;
pub mod search;
pub mod users;
