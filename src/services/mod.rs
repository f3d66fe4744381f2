pub mod auth;
pub mod dashboard;
pub mod gate;
pub mod validation;
