pub mod admin;
pub mod booking;
pub mod feedback;
pub mod inquiry;
pub mod metrics;
pub mod offer;
pub mod package;

pub use admin::{AdminUser, Role};
pub use booking::{Booking, BookingStatus, NewBooking, PaymentStatus};
pub use feedback::{Feedback, NewFeedback};
pub use inquiry::{Inquiry, InquiryStatus, NewInquiry};
pub use metrics::MetricSample;
pub use offer::{NewOffer, Offer, OfferStatus};
pub use package::{NewPackage, Package, PackageStatus};
