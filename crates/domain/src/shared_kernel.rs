// Shared kernel: types and errors shared across the registry aggregates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Gender classification carried by a person record.
///
/// Stored as its numeric discriminant; `from_value` is the single place that
/// decides whether an incoming number is a declared member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male = 1,
    Female = 2,
}

impl Gender {
    /// Maps a raw numeric value to a declared member, if any.
    pub fn from_value(value: i16) -> Option<Self> {
        match value {
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn as_value(self) -> i16 {
        self as i16
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

/// Errors raised by the registry core.
///
/// Each variant is a distinct, caller-distinguishable kind so the HTTP
/// boundary can map it to a specific status code.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("validation failed: {}", errors.join("; "))]
    Validation { errors: Vec<String> },

    #[error("{entity} with id {id} was not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("relation between person {person_id} and person {related_person_id} of type {relation_type_id} was not found")]
    RelationNotFound {
        person_id: i32,
        related_person_id: i32,
        relation_type_id: i32,
    },

    #[error("{entity} '{value}' already exists")]
    AlreadyExists { entity: &'static str, value: String },

    #[error("infrastructure error: {message}")]
    Infrastructure { message: String },
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        DomainError::NotFound { entity, id }
    }

    pub fn already_exists(entity: &'static str, value: impl Into<String>) -> Self {
        DomainError::AlreadyExists {
            entity,
            value: value.into(),
        }
    }

    pub fn infrastructure(message: impl fmt::Display) -> Self {
        DomainError::Infrastructure {
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DomainError>;
