//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Storage errors
//! - 2xx: Search errors
//! - 3xx: Config errors
//! - 4xx: Import errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for `--json` output.
///
/// Each variant maps to a numeric code (e.g., `DatabaseError` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Storage errors (1xx)
    // ========================================
    /// E101: The data store rejected or failed a statement
    DatabaseError,
    /// E102: A schema migration could not be applied
    MigrationFailed,
    /// E103: Stored data could not be (de)serialized
    SerializationError,

    // ========================================
    // Search errors (2xx)
    // ========================================
    /// E201: The full-text engine rejected a generated query
    SearchQueryInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E301: Config file has invalid syntax or values
    ConfigInvalid,
    /// E302: An explicitly named config file does not exist
    ConfigMissingRequired,

    // ========================================
    // Import errors (4xx)
    // ========================================
    /// E401: Import document is malformed or inconsistent
    ImportFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: File operation failed
    IoError,
}

impl ErrorCode {
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::DatabaseError => 101,
            Self::MigrationFailed => 102,
            Self::SerializationError => 103,

            Self::SearchQueryInvalid => 201,

            Self::ConfigInvalid => 301,
            Self::ConfigMissingRequired => 302,

            Self::ImportFailed => 401,

            Self::IoError => 901,
        }
    }

    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::DatabaseError => "Check that the database path is readable and not locked by another process",
            Self::MigrationFailed => "The database schema could not be upgraded. Point --db at a fresh file or restore a backup",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",
            Self::SearchQueryInvalid => "Simplify the search text. Quote exact phrases with \"...\"",
            Self::ConfigInvalid => "Check TOML syntax in curate.toml and the CURATE_* environment variables",
            Self::ConfigMissingRequired => "Check that the --config or CURATE_CONFIG path points at an existing file",
            Self::ImportFailed => "Fix the reported record in the import file and run `curate import` again",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::SearchQueryInvalid
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::ImportFailed
            | Self::IoError => true,

            Self::DatabaseError | Self::MigrationFailed | Self::SerializationError => false,
        }
    }

    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "storage",
            2 => "search",
            3 => "config",
            4 => "import",
            9 => "internal",
            _ => "unknown",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::DatabaseError,
            Self::MigrationFailed,
            Self::SerializationError,
            Self::SearchQueryInvalid,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::ImportFailed,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_numeric() {
        assert_eq!(ErrorCode::DatabaseError.numeric(), 101);
        assert_eq!(ErrorCode::SearchQueryInvalid.numeric(), 201);
        assert_eq!(ErrorCode::ConfigInvalid.numeric(), 301);
        assert_eq!(ErrorCode::ImportFailed.numeric(), 401);
        assert_eq!(ErrorCode::IoError.numeric(), 901);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(format!("{}", ErrorCode::DatabaseError), "E101");
        assert_eq!(format!("{}", ErrorCode::IoError), "E901");
    }

    #[test]
    fn test_every_code_has_category_and_suggestion() {
        for code in ErrorCode::all() {
            assert!(!code.suggestion().is_empty(), "{code:?} has empty suggestion");
            assert_ne!(code.category(), "unknown", "{code:?} has no category");
        }
    }

    #[test]
    fn test_numeric_codes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            assert!(seen.insert(code.numeric()), "duplicate code {}", code.numeric());
        }
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::ImportFailed).unwrap();
        assert_eq!(json, "\"IMPORT_FAILED\"");
        let back: ErrorCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ErrorCode::ImportFailed);
    }

    #[test]
    fn test_recoverable_categorization() {
        assert!(ErrorCode::ConfigInvalid.is_recoverable());
        assert!(ErrorCode::ImportFailed.is_recoverable());
        assert!(!ErrorCode::DatabaseError.is_recoverable());
    }
}
