use pds_context::{ContextError, EntityCategory};

/// Failure reported by the transport collaborator
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("Registry API returned HTTP {status}: {message}")]
    Http { status: u16, message: String },
    #[error("Registry API request failed: {0}")]
    Request(String),
    #[error("Registry API response could not be decoded: {0}")]
    Decode(String),
}

/// Error type for building and executing queries.
///
/// Name resolution and argument errors are raised while building, before any
/// product request is sent. Transport failures are passed through unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("No {category} matches the name '{name}'")]
    AmbiguousOrUnknownName {
        category: EntityCategory,
        name: String,
    },
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
    #[error(transparent)]
    Backend(#[from] TransportError),
    #[error("`{operation}` is not supported: {reason}")]
    UnsupportedFilter {
        operation: &'static str,
        reason: String,
    },
    #[error("`{operation}` conflicts with the fixed '{scope}' scope")]
    ScopeConflict {
        scope: String,
        operation: &'static str,
    },
    #[error(transparent)]
    Context(#[from] ContextError),
}

impl QueryError {
    /// True for errors raised while building, before any network access
    pub fn is_build_error(&self) -> bool {
        !matches!(self, QueryError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_name_display_names_the_offender() {
        let error = QueryError::AmbiguousOrUnknownName {
            category: EntityCategory::Target,
            name: "Vulcan".to_string(),
        };
        assert_eq!(error.to_string(), "No target matches the name 'Vulcan'");
        assert!(error.is_build_error());
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let transport = TransportError::Http {
            status: 429,
            message: "Too Many Requests".to_string(),
        };
        let error: QueryError = transport.clone().into();
        assert_eq!(error.to_string(), transport.to_string());
        assert_eq!(error, QueryError::Backend(transport));
        assert!(!error.is_build_error());
    }

    #[test]
    fn test_invalid_argument_display() {
        let error = QueryError::InvalidArgument {
            argument: "latitude",
            reason: "min 20 is greater than max 10".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("`latitude`"));
        assert!(msg.contains("min 20"));
    }

    #[test]
    fn test_scope_conflict_display() {
        let error = QueryError::ScopeConflict {
            scope: "OSIRIS-REx".to_string(),
            operation: "has_investigation",
        };
        let msg = error.to_string();
        assert!(msg.contains("has_investigation"));
        assert!(msg.contains("OSIRIS-REx"));
    }
}
