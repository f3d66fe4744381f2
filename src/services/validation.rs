use serde::Deserialize;

use crate::errors::FieldError;
use crate::models::{
    Booking, BookingStatus, NewBooking, NewFeedback, NewInquiry, NewOffer, NewPackage,
    OfferStatus, Package, PackageStatus, PaymentStatus,
};

/// Numeric fields arrive from web forms as either JSON numbers or strings.
/// Both are accepted; anything else is a validation error, never a silent
/// zero.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumInput {
    Num(f64),
    Text(String),
}

pub fn parse_i64(v: &NumInput) -> Option<i64> {
    match v {
        NumInput::Num(f) if f.fract() == 0.0 => Some(*f as i64),
        NumInput::Num(_) => None,
        NumInput::Text(s) => s.trim().parse::<i64>().ok(),
    }
}

/// Non-finite values are rejected: `"NaN"`/`"inf"` parse as f64 but have no
/// meaning as an amount or metric sample, and serde_json serializes them as
/// null.
pub fn parse_f64(v: &NumInput) -> Option<f64> {
    let parsed = match v {
        NumInput::Num(f) => Some(*f),
        NumInput::Text(s) => s.trim().parse::<f64>().ok(),
    };
    parsed.filter(|f| f.is_finite())
}

/// Naive tag stripping: drops everything between `<` and `>`. This keeps
/// display text tidy but is NOT a security sanitizer; rendering contexts must
/// escape output themselves.
pub fn strip_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

pub fn sanitize_text(s: &str) -> String {
    strip_html(s).trim().to_string()
}

pub fn is_valid_phone(s: &str) -> bool {
    s.len() == 10 && s.chars().all(|c| c.is_ascii_digit())
}

pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || s.contains(char::is_whitespace) {
        return false;
    }
    if s.matches('@').count() != 1 {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Empty strings from forms are treated as absent.
fn optional_trimmed(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

// ── Inquiry ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InquiryInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

pub fn validate_inquiry(input: &InquiryInput) -> Result<NewInquiry, Vec<FieldError>> {
    let mut errors = vec![];

    let name = sanitize_text(input.name.as_deref().unwrap_or(""));
    if name.chars().count() < 2 {
        errors.push(FieldError::new("name", "Name must be at least 2 characters"));
    }

    let phone = input.phone.as_deref().unwrap_or("").trim().to_string();
    if !is_valid_phone(&phone) {
        errors.push(FieldError::new(
            "phone",
            "Phone number must be exactly 10 digits",
        ));
    }

    let email = optional_trimmed(&input.email);
    if let Some(ref e) = email {
        if !is_valid_email(e) {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
    }

    let message = sanitize_text(input.message.as_deref().unwrap_or(""));
    if message.chars().count() < 10 {
        errors.push(FieldError::new(
            "message",
            "Message must be at least 10 characters",
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewInquiry {
        name,
        phone,
        email,
        message,
    })
}

// ── Booking ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingInput {
    pub id: Option<NumInput>,
    pub name: Option<String>,
    pub contact: Option<String>,
    pub email: Option<String>,
    pub service: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub status: Option<String>,
    pub payment: Option<String>,
    pub amount: Option<NumInput>,
    pub package_id: Option<NumInput>,
}

pub fn validate_booking(input: &BookingInput, base_price: f64) -> Result<NewBooking, Vec<FieldError>> {
    let mut errors = vec![];

    // Booking identity is caller-supplied by contract.
    let id = match input.id.as_ref().and_then(parse_i64) {
        Some(v) => v,
        None => {
            errors.push(FieldError::new("id", "Invalid booking id"));
            0
        }
    };

    let name = sanitize_text(input.name.as_deref().unwrap_or(""));
    if name.chars().count() < 2 {
        errors.push(FieldError::new("name", "Name must be at least 2 characters"));
    }

    let contact = input.contact.as_deref().unwrap_or("").trim().to_string();
    if !is_valid_phone(&contact) {
        errors.push(FieldError::new(
            "contact",
            "Phone number must be exactly 10 digits",
        ));
    }

    let email = input.email.as_deref().unwrap_or("").trim().to_string();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !is_valid_email(&email) {
        errors.push(FieldError::new("email", "Invalid email address"));
    }

    let service = sanitize_text(input.service.as_deref().unwrap_or(""));
    if service.is_empty() {
        errors.push(FieldError::new("service", "Service is required"));
    }

    let date = input.date.as_deref().unwrap_or("").trim().to_string();
    if date.is_empty() {
        errors.push(FieldError::new("date", "Date is required"));
    }

    let time = input.time.as_deref().unwrap_or("").trim().to_string();
    if time.is_empty() {
        errors.push(FieldError::new("time", "Time is required"));
    }

    let amount = match input.amount.as_ref() {
        None => base_price,
        Some(v) => match parse_f64(v) {
            Some(a) if a >= 0.0 => a,
            _ => {
                errors.push(FieldError::new("amount", "Invalid amount"));
                0.0
            }
        },
    };

    let package_id = match input.package_id.as_ref() {
        None => None,
        Some(v) => match parse_i64(v) {
            Some(p) => Some(p),
            None => {
                errors.push(FieldError::new("packageId", "Invalid package id"));
                None
            }
        },
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewBooking {
        id,
        name,
        contact,
        email,
        service,
        date,
        time,
        status: BookingStatus::parse(input.status.as_deref().unwrap_or("")),
        payment: PaymentStatus::parse(input.payment.as_deref().unwrap_or("")),
        amount,
        package_id,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingUpdateInput {
    pub status: Option<String>,
    pub payment: Option<String>,
    pub amount: Option<NumInput>,
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Applies an admin edit to an existing booking, enforcing the lifecycle
/// state machine. Completed and Cancelled are terminal; payment never leaves
/// Paid or Cash.
pub fn apply_booking_update(
    booking: &Booking,
    input: &BookingUpdateInput,
) -> Result<Booking, Vec<FieldError>> {
    let mut errors = vec![];
    let mut updated = booking.clone();

    if let Some(ref s) = input.status {
        let next = BookingStatus::parse(s);
        if booking.status.can_transition_to(next) {
            updated.status = next;
        } else {
            errors.push(FieldError::new(
                "status",
                format!(
                    "Cannot change status from {} to {}",
                    booking.status.as_str(),
                    next.as_str()
                ),
            ));
        }
    }

    if let Some(ref p) = input.payment {
        let next = PaymentStatus::parse(p);
        if booking.payment.can_transition_to(next) {
            updated.payment = next;
        } else {
            errors.push(FieldError::new(
                "payment",
                format!(
                    "Cannot change payment from {} to {}",
                    booking.payment.as_str(),
                    next.as_str()
                ),
            ));
        }
    }

    if let Some(ref v) = input.amount {
        match parse_f64(v) {
            Some(a) if a >= 0.0 => updated.amount = a,
            _ => errors.push(FieldError::new("amount", "Invalid amount")),
        }
    }

    if let Some(date) = optional_trimmed(&input.date) {
        updated.date = date;
    }
    if let Some(time) = optional_trimmed(&input.time) {
        updated.time = time;
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(updated)
}

// ── Feedback ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub booking_id: Option<NumInput>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rating: Option<NumInput>,
    pub comment: Option<String>,
}

pub fn validate_feedback(input: &FeedbackInput) -> Result<NewFeedback, Vec<FieldError>> {
    let mut errors = vec![];

    let booking_id = match input.booking_id.as_ref() {
        None => None,
        Some(v) => match parse_i64(v) {
            Some(b) => Some(b),
            None => {
                errors.push(FieldError::new("bookingId", "Invalid booking id"));
                None
            }
        },
    };

    let email = optional_trimmed(&input.email);
    if let Some(ref e) = email {
        if !is_valid_email(e) {
            errors.push(FieldError::new("email", "Invalid email address"));
        }
    }

    let phone = optional_trimmed(&input.phone);
    if let Some(ref p) = phone {
        if !is_valid_phone(p) {
            errors.push(FieldError::new(
                "phone",
                "Phone number must be exactly 10 digits",
            ));
        }
    }

    let rating = match input.rating.as_ref().and_then(parse_i64) {
        Some(r) if (1..=5).contains(&r) => r,
        _ => {
            errors.push(FieldError::new("rating", "Rating must be between 1 and 5"));
            0
        }
    };

    let comment = sanitize_text(input.comment.as_deref().unwrap_or(""));
    if comment.is_empty() {
        errors.push(FieldError::new("comment", "Comment is required"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewFeedback {
        booking_id,
        email,
        phone,
        rating,
        comment,
    })
}

// ── Package ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInput {
    pub package_type: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub discount_percentage: Option<NumInput>,
    pub original_price: Option<NumInput>,
    pub discounted_price: Option<NumInput>,
    pub sessions: Option<NumInput>,
    pub validity_days: Option<NumInput>,
    pub features: Option<Vec<String>>,
    pub status: Option<String>,
}

pub fn validate_package(input: &PackageInput) -> Result<NewPackage, Vec<FieldError>> {
    let mut errors = vec![];

    let package_type = {
        let t = sanitize_text(input.package_type.as_deref().unwrap_or(""));
        if t.is_empty() {
            "massage".to_string()
        } else {
            t
        }
    };

    let title = sanitize_text(input.title.as_deref().unwrap_or(""));
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    }

    let description = sanitize_text(input.description.as_deref().unwrap_or(""));

    let discount_percentage = match input.discount_percentage.as_ref() {
        None => 0,
        Some(v) => match parse_i64(v) {
            Some(d) if (0..=100).contains(&d) => d,
            _ => {
                errors.push(FieldError::new(
                    "discountPercentage",
                    "Discount percentage must be between 0 and 100",
                ));
                0
            }
        },
    };

    let original_price = match input.original_price.as_ref().and_then(parse_i64) {
        Some(p) if p >= 0 => p,
        _ => {
            errors.push(FieldError::new("originalPrice", "Invalid original price"));
            0
        }
    };

    let discounted_price = match input.discounted_price.as_ref().and_then(parse_i64) {
        Some(p) if p >= 0 => p,
        _ => {
            errors.push(FieldError::new(
                "discountedPrice",
                "Invalid discounted price",
            ));
            0
        }
    };

    // Not enforced by the schema, so it has to hold here.
    if errors.is_empty() && discounted_price > original_price {
        errors.push(FieldError::new(
            "discountedPrice",
            "Discounted price cannot exceed original price",
        ));
    }

    let sessions = match input.sessions.as_ref() {
        None => 1,
        Some(v) => match parse_i64(v) {
            Some(s) if s >= 1 => s,
            _ => {
                errors.push(FieldError::new("sessions", "Invalid sessions count"));
                0
            }
        },
    };

    let validity_days = match input.validity_days.as_ref() {
        None => 30,
        Some(v) => match parse_i64(v) {
            Some(d) if d >= 1 => d,
            _ => {
                errors.push(FieldError::new("validityDays", "Invalid validity period"));
                0
            }
        },
    };

    let features: Vec<String> = input
        .features
        .as_deref()
        .unwrap_or(&[])
        .iter()
        .map(|f| sanitize_text(f))
        .filter(|f| !f.is_empty())
        .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewPackage {
        package_type,
        title,
        description,
        discount_percentage,
        original_price,
        discounted_price,
        sessions,
        validity_days,
        features,
        status: PackageStatus::parse(input.status.as_deref().unwrap_or("")),
    })
}

pub fn apply_package_update(
    existing: &Package,
    input: &PackageInput,
) -> Result<Package, Vec<FieldError>> {
    // Merge the partial input over the stored record, then re-validate the
    // whole thing so the price invariant holds across edits.
    let merged = PackageInput {
        package_type: input
            .package_type
            .clone()
            .or_else(|| Some(existing.package_type.clone())),
        title: input.title.clone().or_else(|| Some(existing.title.clone())),
        description: input
            .description
            .clone()
            .or_else(|| Some(existing.description.clone())),
        discount_percentage: input
            .discount_percentage
            .clone()
            .or(Some(NumInput::Num(existing.discount_percentage as f64))),
        original_price: input
            .original_price
            .clone()
            .or(Some(NumInput::Num(existing.original_price as f64))),
        discounted_price: input
            .discounted_price
            .clone()
            .or(Some(NumInput::Num(existing.discounted_price as f64))),
        sessions: input
            .sessions
            .clone()
            .or(Some(NumInput::Num(existing.sessions as f64))),
        validity_days: input
            .validity_days
            .clone()
            .or(Some(NumInput::Num(existing.validity_days as f64))),
        features: input
            .features
            .clone()
            .or_else(|| Some(existing.features.clone())),
        status: input
            .status
            .clone()
            .or_else(|| Some(existing.status.as_str().to_string())),
    };

    let new = validate_package(&merged)?;

    Ok(Package {
        id: existing.id,
        package_type: new.package_type,
        title: new.title,
        description: new.description,
        discount_percentage: new.discount_percentage,
        original_price: new.original_price,
        discounted_price: new.discounted_price,
        sessions: new.sessions,
        validity_days: new.validity_days,
        features: new.features,
        status: new.status,
        created_at: existing.created_at,
        updated_at: existing.updated_at,
    })
}

// ── Offer ──

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferInput {
    pub title: Option<String>,
    pub discount: Option<String>,
    pub code: Option<String>,
    pub valid_until: Option<String>,
    pub status: Option<String>,
}

/// Promo codes are uppercase alphanumeric; anything else is dropped before
/// validation.
pub fn sanitize_offer_code(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Discount descriptors are limited to digits, percent, and currency marks.
pub fn sanitize_discount(s: &str) -> String {
    s.trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '%' | '$' | '₹'))
        .collect()
}

/// Sanitization runs before validation, so the length rules apply to the
/// cleaned values.
pub fn validate_offer(input: &OfferInput) -> Result<NewOffer, Vec<FieldError>> {
    let mut errors = vec![];

    let title = sanitize_text(input.title.as_deref().unwrap_or(""));
    if title.is_empty() {
        errors.push(FieldError::new("title", "Title is required"));
    } else if title.chars().count() > 100 {
        errors.push(FieldError::new(
            "title",
            "Title must be at most 100 characters",
        ));
    }

    let discount = sanitize_discount(input.discount.as_deref().unwrap_or(""));
    if discount.is_empty() {
        errors.push(FieldError::new("discount", "Discount is required"));
    } else if discount.chars().count() > 10 {
        errors.push(FieldError::new(
            "discount",
            "Discount must be at most 10 characters",
        ));
    }

    let code = sanitize_offer_code(input.code.as_deref().unwrap_or(""));
    if code.chars().count() < 3 {
        errors.push(FieldError::new(
            "code",
            "Code must be at least 3 characters",
        ));
    } else if code.chars().count() > 20 {
        errors.push(FieldError::new("code", "Code must be at most 20 characters"));
    }

    let valid_until = input.valid_until.as_deref().unwrap_or("").trim().to_string();
    if valid_until.is_empty() {
        errors.push(FieldError::new("validUntil", "Validity date is required"));
    } else if chrono::NaiveDate::parse_from_str(&valid_until, "%Y-%m-%d").is_err() {
        errors.push(FieldError::new("validUntil", "Invalid validity date"));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewOffer {
        title,
        discount,
        code,
        valid_until,
        status: OfferStatus::parse(input.status.as_deref().unwrap_or("")),
    })
}
