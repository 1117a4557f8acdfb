use std::fmt;
use thiserror::Error;

/// Why a target type could not be instantiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructionKind {
    /// The type description carries no zero-argument constructor.
    NotFound,
    /// The constructor ran and reported a failure.
    Failed,
    /// The constructor exists but is not reachable from mapping code.
    Inaccessible,
}

impl fmt::Display for ConstructionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "no zero-argument constructor"),
            Self::Failed => write!(f, "constructor failed"),
            Self::Inaccessible => write!(f, "constructor is not accessible"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Read,
    Write,
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Write => write!(f, "write"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Cannot instantiate '{type_name}': {kind}{}", detail_suffix(.detail))]
    Construction {
        type_name: String,
        kind: ConstructionKind,
        detail: Option<String>,
    },

    #[error("Nested binding '{path}' of '{type_name}' refers back to an enclosing type")]
    Cycle { type_name: String, path: String },

    #[error("Failed to {kind} field '{field}' of '{type_name}': {reason}")]
    FieldAccess {
        type_name: String,
        field: String,
        kind: AccessKind,
        reason: String,
    },

    #[error("Conversion error at column {ordinal}: {message}")]
    Conversion { ordinal: usize, message: String },

    #[error("Column ordinal {ordinal} out of range (row has {count} columns)")]
    ColumnOutOfRange { ordinal: usize, count: usize },

    #[error("Lock error: {0}")]
    Lock(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(" ({})", detail),
        None => String::new(),
    }
}

impl MapError {
    pub fn construction(type_name: impl Into<String>, kind: ConstructionKind) -> Self {
        Self::Construction {
            type_name: type_name.into(),
            kind,
            detail: None,
        }
    }

    pub fn read_failed(type_name: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::FieldAccess {
            type_name: type_name.to_string(),
            field: field.to_string(),
            kind: AccessKind::Read,
            reason: reason.into(),
        }
    }

    pub fn write_failed(type_name: &str, field: &str, reason: impl Into<String>) -> Self {
        Self::FieldAccess {
            type_name: type_name.to_string(),
            field: field.to_string(),
            kind: AccessKind::Write,
            reason: reason.into(),
        }
    }

    pub fn conversion(ordinal: usize, message: impl Into<String>) -> Self {
        Self::Conversion {
            ordinal,
            message: message.into(),
        }
    }

    /// Kind of a construction failure, if this is one.
    pub fn construction_kind(&self) -> Option<ConstructionKind> {
        match self {
            Self::Construction { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Kind of a field access failure, if this is one.
    pub fn access_kind(&self) -> Option<AccessKind> {
        match self {
            Self::FieldAccess { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

impl<T> From<std::sync::PoisonError<T>> for MapError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}
