//! Errors shared across relframe crates.
//!
//! Errors fall into two broad groups. Analysis errors are produced when a
//! logical plan is bound and compiled (unknown columns, type mismatches,
//! incompatible union inputs). Everything else is raised while rows are being
//! pulled through a partition. Building plans never errors.

#[derive(Debug, thiserror::Error)]
pub enum RelError {
    /// A plan failed analysis. `plan` holds a rendering of the offending node.
    #[error("analysis error: {message} (in {plan})")]
    Analysis { message: String, plan: String },

    #[error("execution error: {0}")]
    Execution(String),

    /// A host function (predicate, generator, udf) returned an error.
    #[error("user function '{function}' failed: {message}")]
    UserFunction { function: String, message: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("internal: {0}")]
    Internal(String),
}

impl RelError {
    pub fn analysis(message: impl Into<String>, plan: impl std::fmt::Display) -> Self {
        RelError::Analysis {
            message: message.into(),
            plan: plan.to_string(),
        }
    }

    pub fn user_function(function: impl Into<String>, message: impl std::fmt::Display) -> Self {
        RelError::UserFunction {
            function: function.into(),
            message: message.to_string(),
        }
    }

    /// If this error was raised while analyzing a plan rather than while
    /// executing it.
    pub const fn is_analysis(&self) -> bool {
        matches!(self, RelError::Analysis { .. })
    }
}

pub type Result<T, E = RelError> = std::result::Result<T, E>;

#[macro_export]
macro_rules! internal {
    ($($arg:tt)*) => {
        $crate::RelError::Internal(std::format!($($arg)*))
    };
}

#[macro_export]
macro_rules! execution {
    ($($arg:tt)*) => {
        $crate::RelError::Execution(std::format!($($arg)*))
    };
}
