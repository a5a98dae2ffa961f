use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use uuid::Uuid;

use crate::principal::errors::EmailError;
use crate::principal::errors::RoleError;
use crate::principal::errors::SecretError;

/// Stored credential identity of a club or a user.
///
/// `role` keeps the stored string representation; it is parsed into a
/// [`Role`] only where authorization decisions are made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub identifier: EmailAddress,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Principal unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Generate a new random principal ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type, the natural key of a principal within its kind.
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext secret accepted for registration.
///
/// Never printed: both `Debug` and `Display` are redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 1024;

    /// Create a new validated secret.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 6 characters
    /// * `TooLong` - More than 1024 characters
    pub fn new(secret: String) -> Result<Self, SecretError> {
        let length = secret.chars().count();
        if length < Self::MIN_LENGTH {
            Err(SecretError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(SecretError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(secret))
        }
    }

    /// Expose the plaintext, for hashing only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// The two disjoint principal namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrincipalKind {
    Club,
    User,
}

impl PrincipalKind {
    /// Tag used in logs and as the token key id.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrincipalKind::Club => "club",
            PrincipalKind::User => "user",
        }
    }

    /// Check that a role may be held by principals of this kind.
    ///
    /// # Errors
    /// * `NotAllowed` - Clubs only hold `CLUB`, users never do
    pub fn admit(&self, role: Role) -> Result<Role, RoleError> {
        let allowed = match self {
            PrincipalKind::Club => role == Role::Club,
            PrincipalKind::User => role != Role::Club,
        };

        if allowed {
            Ok(role)
        } else {
            Err(RoleError::NotAllowed {
                role: role.to_string(),
                kind: self.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for PrincipalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of roles a caller may act as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    User,
    Club,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Club => "CLUB",
        }
    }

    pub fn authority(&self) -> Authority {
        Authority::of(*self)
    }
}

impl FromStr for Role {
    type Err = RoleError;

    /// Parse a role tag. Only the exact upper-case tag is accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Role::Admin, Role::User, Role::Club]
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| RoleError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authority tag presented to authorization checks (`ROLE_<TAG>`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Authority(String);

impl Authority {
    pub const PREFIX: &'static str = "ROLE_";

    pub fn of(role: Role) -> Self {
        Self(format!("{}{}", Self::PREFIX, role.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Command to register a new principal with domain types
#[derive(Debug)]
pub struct RegisterCommand {
    pub identifier: EmailAddress,
    pub secret: Secret,
    pub role: Role,
}

impl RegisterCommand {
    pub fn new(identifier: EmailAddress, secret: Secret, role: Role) -> Self {
        Self {
            identifier,
            secret,
            role,
        }
    }
}

/// Token handed out by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Caller that passed an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizedPrincipal {
    pub subject: String,
    pub role: Role,
}
