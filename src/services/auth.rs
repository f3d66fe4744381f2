use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AdminUser, Role};

type HmacSha256 = Hmac<Sha256>;

/// Tokens are valid for 24 hours from issuance; there is no revocation list,
/// so a leaked token stays valid until expiry or secret rotation.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Decoded bearer-token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Owns credential creation, verification, and token issue/verify. The
/// signing secret is injected at construction so tests can use distinct
/// secrets per case.
pub struct AuthService {
    secret: String,
}

impl AuthService {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    // ── Password hashing ──

    /// New credentials always get an Argon2id PHC hash.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Accepts both the current Argon2id format and the legacy unsalted
    /// `sha256$<hex>` digests carried over from the old deployment. The
    /// legacy branch exists only so pre-migration accounts can still log in;
    /// their hashes are upgraded the next time the password changes.
    pub fn verify_password(password: &str, stored: &str) -> bool {
        if let Some(hex) = stored.strip_prefix("sha256$") {
            return legacy_sha256_hex(password) == hex;
        }
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    // ── Tokens ──

    pub fn sign_claims(&self, claims: &Claims) -> Result<String, AppError> {
        let json = serde_json::to_vec(claims)
            .map_err(|e| AppError::Internal(format!("claims encoding failed: {e}")))?;
        let payload = URL_SAFE_NO_PAD.encode(json);
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| AppError::Internal("invalid signing key".to_string()))?;
        mac.update(payload.as_bytes());
        let sig = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        Ok(format!("{payload}.{sig}"))
    }

    pub fn issue_token(&self, user: &AdminUser) -> Result<(String, Claims), AppError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            role: user.role,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };
        let token = self.sign_claims(&claims)?;
        Ok((token, claims))
    }

    /// Signature, expiry, and role are all checked; any failure is a uniform
    /// Unauthorized. A token is expired exactly at its `exp` timestamp.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AppError> {
        let (payload, sig) = token.split_once('.').ok_or(AppError::Unauthorized)?;

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|_| AppError::Unauthorized)?;
        mac.update(payload.as_bytes());
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig)
            .map_err(|_| AppError::Unauthorized)?;
        mac.verify_slice(&sig_bytes)
            .map_err(|_| AppError::Unauthorized)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::Unauthorized)?;
        let claims: Claims =
            serde_json::from_slice(&json).map_err(|_| AppError::Unauthorized)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(AppError::Unauthorized);
        }

        Ok(claims)
    }

    // ── Account management ──

    pub fn create_admin(
        &self,
        conn: &Connection,
        username: &str,
        password: &str,
        email: &str,
        full_name: &str,
        role: Role,
    ) -> Result<AdminUser, AppError> {
        let admin = AdminUser {
            id: uuid::Uuid::new_v4().to_string(),
            username: username.to_string(),
            password_hash: self.hash_password(password)?,
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
            is_active: true,
            last_login: None,
            created_at: Utc::now().naive_utc(),
        };
        queries::insert_admin(conn, &admin)?;
        Ok(admin)
    }

    /// Unknown username and wrong password are indistinguishable to the
    /// caller; both come back as Unauthorized.
    pub fn authenticate(
        &self,
        conn: &Connection,
        username: &str,
        password: &str,
    ) -> Result<(String, Claims), AppError> {
        let user = match queries::get_admin_by_username(conn, username)? {
            Some(u) if Self::verify_password(password, &u.password_hash) => u,
            _ => return Err(AppError::Unauthorized),
        };

        queries::update_last_login(conn, &user.id)?;

        self.issue_token(&user)
    }
}

/// The old deployment stored single-round unsalted SHA-256 hex digests.
/// Exposed so migration tooling can recognize the format.
pub fn legacy_sha256_hex(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
