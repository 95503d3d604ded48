pub mod decide;
pub mod hpa;
pub mod schedule;
