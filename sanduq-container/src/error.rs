//! Error types for Sanduq container operations.
//!
//! Every error carries the identifier or parameter it is about, and the
//! multi-line variants add a hint on how to fix the problem.

use std::fmt;

use sanduq_support::rendering::render_chain;

use crate::identifier::Identifier;

/// Boxed error used as the source of wrapped failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Sanduq operations.
#[derive(Debug, thiserror::Error)]
pub enum SanduqError {
    /// The identifier has neither a binding nor a class descriptor.
    #[error("{}", .0)]
    ClassNotExists(ClassNotExistsError),

    /// A factory callable could not be invoked with the bound arguments.
    #[error("function not exists: {callable}(): {source}")]
    InvocationFailed {
        callable: String,
        #[source]
        source: BoxError,
    },

    /// A required parameter had no caller value and no default.
    #[error("method param miss: {parameter} (in {callable})")]
    ParamMissing {
        parameter: &'static str,
        callable: String,
    },

    /// A bound argument did not have the type its parameter expects.
    #[error("argument `{parameter}` is not a {expected}")]
    ArgumentMismatch {
        parameter: &'static str,
        expected: &'static str,
    },

    /// Building a class failed.
    #[error("Failed to construct {identifier}: {source}")]
    ConstructionFailed {
        identifier: Identifier,
        #[source]
        source: BoxError,
    },

    /// An identifier was re-entered while it was being resolved.
    #[error("{}", .0)]
    CircularDependency(CircularDependencyError),

    /// The identifier was already registered and overrides are off.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// Build-time validation found a dependency nothing provides.
    #[error("{}", .0)]
    NotRegistered(NotRegisteredError),

    /// A typed helper found an object of another type.
    #[error("Type mismatch for {identifier}: expected {expected}")]
    TypeMismatch {
        identifier: Identifier,
        expected: &'static str,
    },

    /// `resolve` was called with an empty identifier.
    #[error("Cannot resolve an empty identifier")]
    EmptyIdentifier,
}

impl SanduqError {
    /// Wraps an application error raised while building `identifier`.
    ///
    /// Use this from hand-written [`Injectable::construct`](crate::injectable::Injectable::construct)
    /// implementations.
    pub fn construction_failed(
        identifier: impl Into<Identifier>,
        source: impl Into<BoxError>,
    ) -> Self {
        SanduqError::ConstructionFailed {
            identifier: identifier.into(),
            source: source.into(),
        }
    }

    /// Returns `true` for errors raised when a bound value has the wrong type.
    pub(crate) fn is_argument_mismatch(&self) -> bool {
        matches!(self, SanduqError::ArgumentMismatch { .. })
    }
}

/// Error when an identifier cannot be constructed.
#[derive(Debug)]
pub struct ClassNotExistsError {
    /// The identifier that was requested
    pub identifier: Identifier,
    /// Registered identifiers with similar names
    pub suggestions: Vec<String>,
}

impl fmt::Display for ClassNotExistsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class not exists: {}", self.identifier)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {suggestion}")?;
            }
        }

        write!(
            f,
            "\n  Hint: register it with .register::<{}>() or bind it to a factory",
            self.identifier.short_name()
        )
    }
}

/// Error when resolution loops back onto itself.
///
/// Shows the full chain so you can see WHERE the cycle is.
#[derive(Debug)]
pub struct CircularDependencyError {
    /// The identifiers forming the cycle, e.g. `[A, B, C, A]`.
    pub chain: Vec<Identifier>,
}

impl fmt::Display for CircularDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Circular dependency detected:\n  {}", render_chain(&self.chain))?;
        write!(
            f,
            "\n  Hint: pass one of the dependencies in pre-built, or break the alias loop"
        )
    }
}

/// Error when trying to register an identifier that already exists.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub identifier: Identifier,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier already registered: {}", self.identifier)?;
        write!(
            f,
            "\n  Hint: enable allow_override in the container settings to replace it"
        )
    }
}

/// Error when a declared dependency has no class or binding behind it.
#[derive(Debug)]
pub struct NotRegisteredError {
    /// The dependency that nothing provides
    pub requested: Identifier,
    /// The identifier declaring it
    pub required_by: Identifier,
}

impl fmt::Display for NotRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency not registered: {}", self.requested)?;
        write!(f, "\n  Required by: {}", self.required_by)
    }
}

/// Convenient Result type for Sanduq operations.
pub type Result<T> = std::result::Result<T, SanduqError>;
