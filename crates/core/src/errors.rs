use thiserror::Error;

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Customer with this email already exists";

/// Placeholder until `into_interface` stamps the request's correlation id.
const UNASSIGNED: &str = "unassigned";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("customer email `{email}` is already taken")]
    DuplicateEmail { email: String },
    #[error("customer `{0}` was not found")]
    CustomerNotFound(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("conflict: {message}")]
    Conflict { message: String, correlation_id: String },
    #[error("not found: {message}")]
    NotFound { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Conflict { .. } => DUPLICATE_EMAIL_MESSAGE,
            Self::NotFound { .. } => "The requested resource was not found.",
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::Conflict { correlation_id, .. }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::Conflict { correlation_id: id, .. }
            | InterfaceError::NotFound { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error @ DomainError::DuplicateEmail { .. }) => {
                Self::Conflict { message: error.to_string(), correlation_id: UNASSIGNED.to_owned() }
            }
            ApplicationError::Domain(error @ DomainError::CustomerNotFound(_)) => {
                Self::NotFound { message: error.to_string(), correlation_id: UNASSIGNED.to_owned() }
            }
            ApplicationError::Persistence(message) => {
                Self::Internal { message, correlation_id: UNASSIGNED.to_owned() }
            }
        }
    }
}
