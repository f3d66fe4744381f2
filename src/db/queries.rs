use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::errors::AppError;
use crate::models::{
    AdminUser, Booking, BookingStatus, Feedback, Inquiry, InquiryStatus, MetricSample, NewBooking,
    NewFeedback, NewInquiry, NewOffer, NewPackage, Offer, OfferStatus, Package, PackageStatus,
    PaymentStatus, Role,
};

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn now_str() -> String {
    Utc::now().naive_utc().format(TS_FORMAT).to_string()
}

fn parse_ts(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TS_FORMAT).unwrap_or_else(|_| Utc::now().naive_utc())
}

/// Maps a unique-constraint violation to Conflict; everything else stays a
/// store error.
fn map_write_err(e: rusqlite::Error, conflict_msg: &str) -> AppError {
    if let rusqlite::Error::SqliteFailure(f, _) = &e {
        if f.code == rusqlite::ErrorCode::ConstraintViolation {
            return AppError::Conflict(conflict_msg.to_string());
        }
    }
    AppError::Store(e)
}

// ── Bookings ──

fn booking_from_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let status: String = row.get(7)?;
    let payment: String = row.get(8)?;
    let created_at: String = row.get(11)?;
    Ok(Booking {
        id: row.get(0)?,
        name: row.get(1)?,
        contact: row.get(2)?,
        email: row.get(3)?,
        service: row.get(4)?,
        date: row.get(5)?,
        time: row.get(6)?,
        status: BookingStatus::parse(&status),
        payment: PaymentStatus::parse(&payment),
        amount: row.get(9)?,
        package_id: row.get(10)?,
        created_at: parse_ts(&created_at),
    })
}

const BOOKING_COLS: &str =
    "id, name, contact, email, service, date, time, status, payment, amount, package_id, created_at";

pub fn create_booking(conn: &Connection, new: &NewBooking) -> Result<Booking, AppError> {
    let created_at = now_str();
    conn.execute(
        "INSERT INTO bookings (id, name, contact, email, service, date, time, status, payment, amount, package_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            new.id,
            new.name,
            new.contact,
            new.email,
            new.service,
            new.date,
            new.time,
            new.status.as_str(),
            new.payment.as_str(),
            new.amount,
            new.package_id,
            created_at,
        ],
    )
    .map_err(|e| map_write_err(e, "A booking with this id already exists"))?;

    Ok(Booking {
        id: new.id,
        name: new.name.clone(),
        contact: new.contact.clone(),
        email: new.email.clone(),
        service: new.service.clone(),
        date: new.date.clone(),
        time: new.time.clone(),
        status: new.status,
        payment: new.payment,
        amount: new.amount,
        package_id: new.package_id,
        created_at: parse_ts(&created_at),
    })
}

pub fn list_bookings(conn: &Connection) -> Result<Vec<Booking>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLS} FROM bookings ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], booking_from_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn get_booking(conn: &Connection, id: i64) -> Result<Option<Booking>, AppError> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLS} FROM bookings WHERE id = ?1"),
        params![id],
        booking_from_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_booking(conn: &Connection, booking: &Booking) -> Result<(), AppError> {
    conn.execute(
        "UPDATE bookings SET name = ?1, contact = ?2, email = ?3, service = ?4, date = ?5,
         time = ?6, status = ?7, payment = ?8, amount = ?9, package_id = ?10 WHERE id = ?11",
        params![
            booking.name,
            booking.contact,
            booking.email,
            booking.service,
            booking.date,
            booking.time,
            booking.status.as_str(),
            booking.payment.as_str(),
            booking.amount,
            booking.package_id,
            booking.id,
        ],
    )?;
    Ok(())
}

pub fn delete_booking(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let count = conn.execute("DELETE FROM bookings WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn recent_bookings(conn: &Connection, limit: i64) -> Result<Vec<Booking>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLS} FROM bookings ORDER BY created_at DESC, id DESC LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], booking_from_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

pub fn count_bookings(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?)
}

// ── Inquiries ──

fn inquiry_from_row(row: &rusqlite::Row) -> rusqlite::Result<Inquiry> {
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Inquiry {
        id: row.get(0)?,
        name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
        message: row.get(4)?,
        status: InquiryStatus::parse(&status),
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

pub fn create_inquiry(conn: &Connection, new: &NewInquiry) -> Result<Inquiry, AppError> {
    let now = now_str();
    conn.execute(
        "INSERT INTO inquiries (name, phone, email, message, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            new.name,
            new.phone,
            new.email,
            new.message,
            InquiryStatus::New.as_str(),
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    Ok(Inquiry {
        id,
        name: new.name.clone(),
        phone: new.phone.clone(),
        email: new.email.clone(),
        message: new.message.clone(),
        status: InquiryStatus::New,
        created_at: parse_ts(&now),
        updated_at: parse_ts(&now),
    })
}

pub fn list_inquiries(conn: &Connection) -> Result<Vec<Inquiry>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, phone, email, message, status, created_at, updated_at
         FROM inquiries ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], inquiry_from_row)?;

    let mut inquiries = vec![];
    for row in rows {
        inquiries.push(row?);
    }
    Ok(inquiries)
}

pub fn get_inquiry(conn: &Connection, id: i64) -> Result<Option<Inquiry>, AppError> {
    let result = conn.query_row(
        "SELECT id, name, phone, email, message, status, created_at, updated_at
         FROM inquiries WHERE id = ?1",
        params![id],
        inquiry_from_row,
    );

    match result {
        Ok(inquiry) => Ok(Some(inquiry)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_inquiry_status(
    conn: &Connection,
    id: i64,
    status: InquiryStatus,
) -> Result<bool, AppError> {
    let count = conn.execute(
        "UPDATE inquiries SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now_str(), id],
    )?;
    Ok(count > 0)
}

pub fn count_inquiries(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM inquiries", [], |row| row.get(0))?)
}

// ── Feedback ──

fn feedback_from_row(row: &rusqlite::Row) -> rusqlite::Result<Feedback> {
    let created_at: String = row.get(6)?;
    Ok(Feedback {
        id: row.get(0)?,
        booking_id: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        rating: row.get(4)?,
        comment: row.get(5)?,
        created_at: parse_ts(&created_at),
    })
}

pub fn create_feedback(conn: &Connection, new: &NewFeedback) -> Result<Feedback, AppError> {
    let now = now_str();
    conn.execute(
        "INSERT INTO feedback (booking_id, email, phone, rating, comment, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![new.booking_id, new.email, new.phone, new.rating, new.comment, now],
    )?;
    let id = conn.last_insert_rowid();

    Ok(Feedback {
        id,
        booking_id: new.booking_id,
        email: new.email.clone(),
        phone: new.phone.clone(),
        rating: new.rating,
        comment: new.comment.clone(),
        created_at: parse_ts(&now),
    })
}

pub fn list_feedback(conn: &Connection) -> Result<Vec<Feedback>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, email, phone, rating, comment, created_at
         FROM feedback ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], feedback_from_row)?;

    let mut entries = vec![];
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

pub fn delete_feedback(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let count = conn.execute("DELETE FROM feedback WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn count_feedback(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))?)
}

pub fn average_rating(conn: &Connection) -> Result<f64, AppError> {
    Ok(conn.query_row(
        "SELECT COALESCE(AVG(rating), 0.0) FROM feedback",
        [],
        |row| row.get(0),
    )?)
}

// ── Packages ──

fn package_from_row(row: &rusqlite::Row) -> rusqlite::Result<Package> {
    let features_json: String = row.get(9)?;
    let status: String = row.get(10)?;
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(Package {
        id: row.get(0)?,
        package_type: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        discount_percentage: row.get(4)?,
        original_price: row.get(5)?,
        discounted_price: row.get(6)?,
        sessions: row.get(7)?,
        validity_days: row.get(8)?,
        features: serde_json::from_str(&features_json).unwrap_or_default(),
        status: PackageStatus::parse(&status),
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

const PACKAGE_COLS: &str = "id, package_type, title, description, discount_percentage, \
    original_price, discounted_price, sessions, validity_days, features, status, created_at, updated_at";

pub fn create_package(conn: &Connection, new: &NewPackage) -> Result<Package, AppError> {
    let now = now_str();
    let features_json =
        serde_json::to_string(&new.features).map_err(|e| AppError::Internal(e.to_string()))?;
    conn.execute(
        "INSERT INTO packages (package_type, title, description, discount_percentage, original_price,
         discounted_price, sessions, validity_days, features, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
        params![
            new.package_type,
            new.title,
            new.description,
            new.discount_percentage,
            new.original_price,
            new.discounted_price,
            new.sessions,
            new.validity_days,
            features_json,
            new.status.as_str(),
            now,
        ],
    )?;
    let id = conn.last_insert_rowid();

    Ok(Package {
        id,
        package_type: new.package_type.clone(),
        title: new.title.clone(),
        description: new.description.clone(),
        discount_percentage: new.discount_percentage,
        original_price: new.original_price,
        discounted_price: new.discounted_price,
        sessions: new.sessions,
        validity_days: new.validity_days,
        features: new.features.clone(),
        status: new.status,
        created_at: parse_ts(&now),
        updated_at: parse_ts(&now),
    })
}

pub fn list_packages(
    conn: &Connection,
    active_only: bool,
) -> Result<Vec<Package>, AppError> {
    let sql = if active_only {
        format!(
            "SELECT {PACKAGE_COLS} FROM packages WHERE status = 'active' \
             ORDER BY created_at DESC, id DESC"
        )
    } else {
        format!("SELECT {PACKAGE_COLS} FROM packages ORDER BY created_at DESC, id DESC")
    };
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], package_from_row)?;

    let mut packages = vec![];
    for row in rows {
        packages.push(row?);
    }
    Ok(packages)
}

pub fn get_package(conn: &Connection, id: i64) -> Result<Option<Package>, AppError> {
    let result = conn.query_row(
        &format!("SELECT {PACKAGE_COLS} FROM packages WHERE id = ?1"),
        params![id],
        package_from_row,
    );

    match result {
        Ok(package) => Ok(Some(package)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_package(conn: &Connection, package: &Package) -> Result<(), AppError> {
    let features_json =
        serde_json::to_string(&package.features).map_err(|e| AppError::Internal(e.to_string()))?;
    conn.execute(
        "UPDATE packages SET package_type = ?1, title = ?2, description = ?3,
         discount_percentage = ?4, original_price = ?5, discounted_price = ?6, sessions = ?7,
         validity_days = ?8, features = ?9, status = ?10, updated_at = ?11 WHERE id = ?12",
        params![
            package.package_type,
            package.title,
            package.description,
            package.discount_percentage,
            package.original_price,
            package.discounted_price,
            package.sessions,
            package.validity_days,
            features_json,
            package.status.as_str(),
            now_str(),
            package.id,
        ],
    )?;
    Ok(())
}

pub fn delete_package(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let count = conn.execute("DELETE FROM packages WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Offers ──

fn offer_from_row(row: &rusqlite::Row) -> rusqlite::Result<Offer> {
    let status: String = row.get(5)?;
    let created_at: String = row.get(6)?;
    let updated_at: String = row.get(7)?;
    Ok(Offer {
        id: row.get(0)?,
        title: row.get(1)?,
        discount: row.get(2)?,
        code: row.get(3)?,
        valid_until: row.get(4)?,
        status: OfferStatus::parse(&status),
        created_at: parse_ts(&created_at),
        updated_at: parse_ts(&updated_at),
    })
}

pub fn create_offer(conn: &Connection, new: &NewOffer) -> Result<Offer, AppError> {
    let now = now_str();
    conn.execute(
        "INSERT INTO offers (title, discount, code, valid_until, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            new.title,
            new.discount,
            new.code,
            new.valid_until,
            new.status.as_str(),
            now,
        ],
    )
    .map_err(|e| map_write_err(e, "An offer with this code already exists"))?;
    let id = conn.last_insert_rowid();

    Ok(Offer {
        id,
        title: new.title.clone(),
        discount: new.discount.clone(),
        code: new.code.clone(),
        valid_until: new.valid_until.clone(),
        status: new.status,
        created_at: parse_ts(&now),
        updated_at: parse_ts(&now),
    })
}

pub fn list_offers(conn: &Connection) -> Result<Vec<Offer>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, title, discount, code, valid_until, status, created_at, updated_at
         FROM offers ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map([], offer_from_row)?;

    let mut offers = vec![];
    for row in rows {
        offers.push(row?);
    }
    Ok(offers)
}

pub fn get_offer(conn: &Connection, id: i64) -> Result<Option<Offer>, AppError> {
    let result = conn.query_row(
        "SELECT id, title, discount, code, valid_until, status, created_at, updated_at
         FROM offers WHERE id = ?1",
        params![id],
        offer_from_row,
    );

    match result {
        Ok(offer) => Ok(Some(offer)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn update_offer(conn: &Connection, offer: &Offer) -> Result<(), AppError> {
    conn.execute(
        "UPDATE offers SET title = ?1, discount = ?2, code = ?3, valid_until = ?4,
         status = ?5, updated_at = ?6 WHERE id = ?7",
        params![
            offer.title,
            offer.discount,
            offer.code,
            offer.valid_until,
            offer.status.as_str(),
            now_str(),
            offer.id,
        ],
    )
    .map_err(|e| map_write_err(e, "An offer with this code already exists"))?;
    Ok(())
}

pub fn delete_offer(conn: &Connection, id: i64) -> Result<bool, AppError> {
    let count = conn.execute("DELETE FROM offers WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

// ── Admins ──

fn admin_from_row(row: &rusqlite::Row) -> rusqlite::Result<AdminUser> {
    let role: String = row.get(5)?;
    let last_login: Option<String> = row.get(7)?;
    let created_at: String = row.get(8)?;
    Ok(AdminUser {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        full_name: row.get(4)?,
        role: Role::try_parse(&role).unwrap_or(Role::Admin),
        is_active: row.get::<_, i64>(6)? != 0,
        last_login: last_login.map(|s| parse_ts(&s)),
        created_at: parse_ts(&created_at),
    })
}

const ADMIN_COLS: &str =
    "id, username, password_hash, email, full_name, role, is_active, last_login, created_at";

pub fn insert_admin(conn: &Connection, admin: &AdminUser) -> Result<(), AppError> {
    conn.execute(
        "INSERT INTO admins (id, username, password_hash, email, full_name, role, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            admin.id,
            admin.username,
            admin.password_hash,
            admin.email,
            admin.full_name,
            admin.role.as_str(),
            admin.is_active as i64,
            admin.created_at.format(TS_FORMAT).to_string(),
        ],
    )
    .map_err(|e| map_write_err(e, "Username or email already exists"))?;
    Ok(())
}

pub fn get_admin_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<AdminUser>, AppError> {
    let result = conn.query_row(
        &format!("SELECT {ADMIN_COLS} FROM admins WHERE username = ?1 AND is_active = 1"),
        params![username],
        admin_from_row,
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_admin_by_id(conn: &Connection, id: &str) -> Result<Option<AdminUser>, AppError> {
    let result = conn.query_row(
        &format!("SELECT {ADMIN_COLS} FROM admins WHERE id = ?1"),
        params![id],
        admin_from_row,
    );

    match result {
        Ok(admin) => Ok(Some(admin)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_admins(conn: &Connection) -> Result<Vec<AdminUser>, AppError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {ADMIN_COLS} FROM admins ORDER BY created_at ASC"))?;
    let rows = stmt.query_map([], admin_from_row)?;

    let mut admins = vec![];
    for row in rows {
        admins.push(row?);
    }
    Ok(admins)
}

pub fn count_admins(conn: &Connection) -> Result<i64, AppError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM admins", [], |row| row.get(0))?)
}

pub fn update_last_login(conn: &Connection, id: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE admins SET last_login = ?1 WHERE id = ?2",
        params![now_str(), id],
    )?;
    Ok(())
}

pub fn update_admin_profile(conn: &Connection, admin: &AdminUser) -> Result<(), AppError> {
    conn.execute(
        "UPDATE admins SET email = ?1, full_name = ?2, password_hash = ?3 WHERE id = ?4",
        params![admin.email, admin.full_name, admin.password_hash, admin.id],
    )
    .map_err(|e| map_write_err(e, "Email already exists"))?;
    Ok(())
}

// ── Metrics ──

pub fn append_metric(conn: &Connection, name: &str, value: f64) -> Result<MetricSample, AppError> {
    let now = now_str();
    conn.execute(
        "INSERT INTO metrics (name, value, recorded_at) VALUES (?1, ?2, ?3)",
        params![name, value, now],
    )?;

    Ok(MetricSample {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        value,
        recorded_at: parse_ts(&now),
    })
}

/// The most recent `limit` samples for a metric, returned in insertion order
/// (oldest of the window first).
pub fn recent_metric_samples(
    conn: &Connection,
    name: &str,
    limit: i64,
) -> Result<Vec<MetricSample>, AppError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, value, recorded_at FROM metrics
         WHERE name = ?1 ORDER BY id DESC LIMIT ?2",
    )?;
    let rows = stmt.query_map(params![name, limit], |row| {
        let recorded_at: String = row.get(3)?;
        Ok(MetricSample {
            id: row.get(0)?,
            name: row.get(1)?,
            value: row.get(2)?,
            recorded_at: parse_ts(&recorded_at),
        })
    })?;

    let mut samples = vec![];
    for row in rows {
        samples.push(row?);
    }
    samples.reverse();
    Ok(samples)
}
