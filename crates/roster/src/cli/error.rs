//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use roster_db::DbError;
use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
    /// Stable error kind for JSON output
    pub kind: &'static str,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            kind: "Error",
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    pub fn with_kind(mut self, kind: &'static str) -> Self {
        self.kind = kind;
        self
    }

    // === Common error constructors ===

    /// Database file does not exist yet
    pub fn database_missing(path: &Path) -> Self {
        Self::new(format!("Database not found: {}", path.display()))
            .with_kind("NotFound")
            .with_context("Commands other than 'init' and 'mcp' need an existing database")
            .with_suggestions([
                "TRY: Create it: roster init".to_string(),
                "TRY: Create it with sample data: roster init --sample".to_string(),
                "TRY: Point at another file with --db or ROSTER_DB".to_string(),
            ])
    }

    /// Query refused by the read-only guard
    pub fn query_rejected(err: &DbError) -> Self {
        Self::new(err.to_string())
            .with_kind(err.kind())
            .with_context("Only a single SELECT statement is accepted")
            .with_suggestions([
                "TRY: Remove any trailing statements after ';'",
                "TRY: Use 'roster employee' or 'roster department' to change records",
            ])
    }

    /// Translate a record-store error into a user-facing one.
    pub fn from_db(err: DbError) -> Self {
        let kind = err.kind();
        let base = match &err {
            DbError::NotFound(what) => Self::new(format!("Not found: {}", what))
                .with_suggestions([
                    "TRY: List employees: roster employee list",
                    "TRY: List departments: roster department list",
                ]),
            DbError::Validation(msg) => Self::new(format!("Invalid input: {}", msg))
                .with_suggestion("TRY: Hire dates use YYYY-MM-DD, e.g. 2021-03-15"),
            DbError::Constraint(msg) => Self::new(format!("Not allowed: {}", msg))
                .with_suggestion("TRY: Move employees first: roster employee update <ID> --department <OTHER>"),
            DbError::Rejected(_) => return Self::query_rejected(&err),
            DbError::Storage(_) | DbError::Io(_) => Self::new(err.to_string())
                .with_context("The database could not complete the operation"),
        };
        base.with_kind(kind)
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

impl From<DbError> for HelpfulError {
    fn from(err: DbError) -> Self {
        Self::from_db(err)
    }
}

/// Error kind for JSON output: the helpful/record-store kind when known.
pub fn error_kind(err: &anyhow::Error) -> &'static str {
    if let Some(helpful) = err.downcast_ref::<HelpfulError>() {
        helpful.kind
    } else if let Some(db) = err.downcast_ref::<DbError>() {
        db.kind()
    } else {
        "Error"
    }
}

/// Print an error as `{"error": {"kind", "message"}}` on stdout.
pub fn print_json_error(err: &anyhow::Error) {
    let message = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => helpful.message.clone(),
        None => format!("{:#}", err),
    };
    let payload = serde_json::json!({
        "error": {
            "kind": error_kind(err),
            "message": message,
        }
    });
    match serde_json::to_string_pretty(&payload) {
        Ok(text) => println!("{}", text),
        Err(_) => eprintln!("{:?}", err),
    }
}
