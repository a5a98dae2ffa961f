use thiserror::Error;

/// Error for EmailAddress validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EmailError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for Secret validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Password too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Error for Role parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoleError {
    #[error("Unknown role: {0}")]
    Unknown(String),

    #[error("Role {role} is not available for {kind} principals")]
    NotAllowed { role: String, kind: String },
}

/// Error reported by a credential store adapter
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Identifier already registered: {0}")]
    AlreadyExists(String),

    #[error("Stored principal is corrupted: {0}")]
    Corrupted(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a failed login, token verification or authorization.
///
/// Every credential-correctness failure is reported as
/// `InvalidCredentials`; only infrastructure failures stay distinguishable.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AuthError::Unavailable(msg),
            StoreError::AlreadyExists(_) | StoreError::Corrupted(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

/// Error for principal registration
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error("Invalid password: {0}")]
    InvalidSecret(#[from] SecretError),

    #[error("Invalid role: {0}")]
    InvalidRole(#[from] RoleError),

    #[error("Email already registered: {0}")]
    AlreadyExists(String),

    #[error("Credential store unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for RegistrationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(identifier) => RegistrationError::AlreadyExists(identifier),
            StoreError::Unavailable(msg) => RegistrationError::Unavailable(msg),
            StoreError::Corrupted(msg) => RegistrationError::Internal(msg),
        }
    }
}
