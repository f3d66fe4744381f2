pub mod auth;
pub mod bookings;
pub mod dashboard;
pub mod feedback;
pub mod health;
pub mod inquiries;
pub mod offers;
pub mod packages;
