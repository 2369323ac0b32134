//! User model, roles and authentication claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::lifecycle::{policy::Action, Rejection};

/// Hospital roles. Every permission rule is expressed in terms of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Clinical staff reporting faults
    HealthStaff,
    Technician,
    Manager,
    /// Quality department (transfer approval, annual reports, audit)
    Quality,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::HealthStaff => "health_staff",
            Role::Technician => "technician",
            Role::Manager => "manager",
            Role::Quality => "quality",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "health_staff" => Ok(Role::HealthStaff),
            "technician" => Ok(Role::Technician),
            "manager" => Ok(Role::Manager),
            "quality" => Ok(Role::Quality),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_enum!(Role);

/// Full user model from the store
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    /// Repairs confirmed by the reporter
    pub successful_repairs: i32,
    pub failed_repairs: i32,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Identity of this user when acting on the system
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    /// Defaults to `health_staff`
    pub role: Option<Role>,
}

/// The authenticated identity performing an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Principal {
    /// Check the role policy for `action`
    pub fn require(&self, action: Action) -> Result<(), Rejection> {
        action.authorize(self)
    }
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
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

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.user_id,
            name: self.name.clone(),
            role: self.role,
        }
    }
}
