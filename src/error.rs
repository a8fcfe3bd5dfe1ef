use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{http::Status, response::Responder};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Version conflict: {0}")]
    VersionConflict(String),
    #[error("Malformed request: {0}")]
    MalformedRequest(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DbError),
}

impl Error {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Shorthand for a `MalformedRequest` error.
    pub fn malformed(what: impl Into<String>) -> Self {
        Self::MalformedRequest(what.into())
    }

    /// A safe, non-committal message to show the person who triggered the
    /// request. Never leaks internal details.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "This poll no longer exists.",
            Self::MalformedRequest(_) => "Sorry, that action could not be understood.",
            Self::AlreadyExists(_) => "That poll already exists.",
            Self::VersionConflict(_) | Self::StoreUnavailable(_) => {
                "Your vote could not be recorded right now. Please try again."
            }
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::NotFound(_) => Status::NotFound,
            Self::MalformedRequest(_) => Status::BadRequest,
            Self::AlreadyExists(_) | Self::VersionConflict(_) => Status::Conflict,
            Self::StoreUnavailable(_) => Status::ServiceUnavailable,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, _: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        if status.code >= 500 {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        Err(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_hide_details() {
        let err = Error::not_found("poll with callback ID 'secret-internal-id'");
        assert!(!err.user_message().contains("secret-internal-id"));
        assert_eq!(err.status(), Status::NotFound);

        let err = Error::VersionConflict("poll 'abc' after 5 attempts".to_string());
        assert_eq!(
            err.user_message(),
            "Your vote could not be recorded right now. Please try again."
        );
        assert_eq!(err.status(), Status::Conflict);
    }
}
