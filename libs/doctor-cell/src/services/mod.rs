pub mod application;
pub mod doctor;
