//! # Authentication Module
//!
//! Password hashing for admins, developers and employees, plus the signed
//! session token every protected handler checks.
//!
//! Sessions are HS256 JWTs carrying `{sub, role, tid?, iat, exp}`. They are
//! issued as the HttpOnly `roster_session` cookie and are also accepted as
//! `Authorization: Bearer <token>`.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::{Duration, Utc};
use eyre::{Result, eyre};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rosterdesk_core::models::{roster::EmployeeStatus, tenant::Tenant};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ApiState;
use crate::middleware::error_handling::AppError;

pub const SESSION_COOKIE: &str = "roster_session";

/// Hashes a password using the Argon2 algorithm
///
/// Returns the PHC string (algorithm, parameters, salt and hash).
pub fn hash_password(password: &str) -> Result<String> {
    // Generate a fresh, random salt
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| eyre!("Error hashing password: {}", e))?
        .to_string();

    Ok(password_hash)
}

/// Checks `password` against a stored PHC hash. A malformed hash never matches.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            debug!("Stored password hash is invalid: {}", e);
            false
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Employee,
    Developer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tid: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

/// Signing material and lifetime for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    secure_cookie: bool,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl", &self.ttl)
            .field("secure_cookie", &self.secure_cookie)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_hours: i64, secure_cookie: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
            secure_cookie,
        }
    }

    pub fn issue(&self, sub: &str, role: Role, tid: Option<&str>) -> Result<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: sub.to_string(),
            role,
            tid: tid.map(str::to_string),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| eyre!("Failed to sign session: {}", e))
    }

    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        let validation = Validation::new(Algorithm::HS256);
        match jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!("Rejected session token: {}", e);
                None
            }
        }
    }

    /// `Set-Cookie` value carrying a fresh session.
    pub fn cookie(&self, token: &str) -> Result<HeaderValue> {
        let mut cookie = format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
            SESSION_COOKIE,
            token,
            self.ttl.num_seconds()
        );
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        HeaderValue::from_str(&cookie).map_err(|e| eyre!("Invalid cookie value: {}", e))
    }

    /// `Set-Cookie` value that expires the session cookie.
    pub fn clear_cookie(&self) -> HeaderValue {
        HeaderValue::from_static("roster_session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}

fn extract_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

/// Session token from the bearer header, or else from the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    extract_bearer(headers).or_else(|| extract_cookie(headers))
}

/// Any valid session, whatever its role.
pub fn require_session(state: &ApiState, headers: &HeaderMap) -> Result<SessionClaims, AppError> {
    let token = extract_token(headers).ok_or_else(|| AppError::unauthorized("Not signed in"))?;
    state
        .sessions
        .verify(token)
        .ok_or_else(|| AppError::unauthorized("Session is invalid or expired"))
}

fn require_role(claims: &SessionClaims, role: Role) -> Result<(), AppError> {
    if claims.role == role {
        Ok(())
    } else {
        Err(AppError::forbidden(format!(
            "This action requires a {:?} session",
            role
        )))
    }
}

/// The session's tenant, which must exist and be active.
async fn session_tenant(state: &ApiState, claims: &SessionClaims) -> Result<Tenant, AppError> {
    let tenant_id = claims
        .tid
        .as_deref()
        .ok_or_else(|| AppError::forbidden("Session is not bound to a tenant"))?;
    let tenant = state
        .registry
        .get(tenant_id)
        .await
        .ok_or_else(|| AppError::forbidden("Tenant no longer exists"))?;
    if !tenant.is_active {
        return Err(AppError::forbidden("Tenant is inactive"));
    }
    Ok(tenant)
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub username: String,
    pub tenant: Tenant,
}

#[derive(Debug, Clone)]
pub struct EmployeeSession {
    pub employee_id: String,
    pub tenant: Tenant,
}

#[derive(Debug, Clone)]
pub struct DeveloperSession {
    pub username: String,
}

pub async fn require_admin(state: &ApiState, headers: &HeaderMap) -> Result<AdminSession, AppError> {
    let claims = require_session(state, headers)?;
    require_role(&claims, Role::Admin)?;
    let tenant = session_tenant(state, &claims).await?;
    Ok(AdminSession {
        username: claims.sub,
        tenant,
    })
}

pub async fn require_employee(
    state: &ApiState,
    headers: &HeaderMap,
) -> Result<EmployeeSession, AppError> {
    let claims = require_session(state, headers)?;
    require_role(&claims, Role::Employee)?;
    let tenant = session_tenant(state, &claims).await?;

    // Deactivation or an ID change ends existing sessions.
    let status = {
        let docs = state.store.lock_tenant(&tenant.id).await?;
        docs.credentials().find(&claims.sub).map(|c| c.status)
    };
    match status {
        Some(EmployeeStatus::Active) => {}
        Some(EmployeeStatus::Inactive) => {
            return Err(AppError::forbidden("This employee account is deactivated"));
        }
        None => return Err(AppError::forbidden("Employee account no longer exists")),
    }

    Ok(EmployeeSession {
        employee_id: claims.sub,
        tenant,
    })
}

pub fn require_developer(state: &ApiState, headers: &HeaderMap) -> Result<DeveloperSession, AppError> {
    let claims = require_session(state, headers)?;
    require_role(&claims, Role::Developer)?;
    Ok(DeveloperSession {
        username: claims.sub,
    })
}
