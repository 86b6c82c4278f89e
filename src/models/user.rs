//! Caller identity: roles, JWT claims and the per-request caller context

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Caller role carried in the bearer credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Borrower,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Borrower => "borrower",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "borrower" => Ok(Role::Borrower),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// JWT claims for authenticated callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Build claims valid for `hours` from now
    pub fn new(user_id: i32, role: Role, hours: u64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.to_string(),
            user_id,
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(hours as i64)).timestamp(),
        }
    }

    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn caller(&self) -> CallerContext {
        CallerContext::new(self.user_id, self.role)
    }
}

/// Resolved identity of the current request.
///
/// Threaded explicitly through every workflow call; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerContext {
    pub caller_id: i32,
    pub role: Role,
}

impl CallerContext {
    pub fn new(caller_id: i32, role: Role) -> Self {
        Self { caller_id, role }
    }

    pub fn admin(caller_id: i32) -> Self {
        Self::new(caller_id, Role::Admin)
    }

    pub fn borrower(caller_id: i32) -> Self {
        Self::new(caller_id, Role::Borrower)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Borrower filter applied to loan lookups.
    ///
    /// `None` for admins (every loan is visible), the caller's own id otherwise.
    pub fn loan_owner_filter(&self) -> Option<i32> {
        if self.is_admin() {
            None
        } else {
            Some(self.caller_id)
        }
    }
}
