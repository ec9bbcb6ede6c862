//! Error types for the activation container.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Boxed error raised by user code (constructors, methods, factories, disposers).
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why a type cannot be instantiated by the object factory.
///
/// Each reason renders a distinct, stable message so callers can match on
/// either the variant or the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unresolvable {
    /// Array types are built by collection coercion, never activated.
    Array,
    /// Enumerations have no constructors.
    Enum,
    /// Abstract classes cannot be instantiated.
    Abstract,
    /// Interfaces (trait objects) cannot be instantiated.
    Interface,
    /// Neither a class nor a value type (e.g. function pointers).
    NonInstantiable,
    /// The type was never described to the catalog.
    Undescribed,
}

impl fmt::Display for Unresolvable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Unresolvable::Array => "array",
            Unresolvable::Enum => "enum type",
            Unresolvable::Abstract => "abstract class",
            Unresolvable::Interface => "interface",
            Unresolvable::NonInstantiable => "non-class or non-value type",
            Unresolvable::Undescribed => "undescribed type",
        };
        f.write_str(text)
    }
}

/// Dependency injection and activation errors
///
/// Registration and lookup errors are reported immediately; failures raised
/// by user code travel through [`DiError::Invocation`] untouched, so the
/// message a caller sees is the one the callee produced.
///
/// # Examples
///
/// ```rust
/// use ferrous_activator::{DiError, Unresolvable};
///
/// let err = DiError::Unresolvable { reason: Unresolvable::Interface, type_name: "dyn app::Logger" };
/// assert_eq!(err.to_string(), "cannot create instance of interface dyn app::Logger");
///
/// let user = DiError::invocation("content defined");
/// assert_eq!(user.to_string(), "content defined");
/// ```
#[derive(Debug, Clone, thiserror::Error)]
pub enum DiError {
    /// Rejected registration (e.g. implementation type missing from the catalog)
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),
    /// Service not registered
    #[error("Service not found: {0}")]
    NotFound(&'static str),
    /// Type can never be activated
    #[error("cannot create instance of {reason} {type_name}")]
    Unresolvable {
        reason: Unresolvable,
        type_name: &'static str,
    },
    /// No constructor scored above zero
    #[error("cannot find any constructor of type {0} that matches given parameters")]
    NoMatchingConstructor(&'static str),
    /// No method with the requested name scored above zero
    #[error("cannot find any method {method} of type {type_name} that matches given parameters")]
    NoMatchingMethod {
        method: String,
        type_name: &'static str,
    },
    /// User code failed; displayed verbatim
    #[error(transparent)]
    Invocation(Arc<dyn StdError + Send + Sync + 'static>),
    /// An extensibility hook supplied a value twice in one firing
    #[error("cannot set value multiple times in {0} hook")]
    DoubleHandledHook(&'static str),
    /// Type downcast failed
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A resolved argument was absent where a value was required
    #[error("argument {index} ({name}) has no value")]
    MissingArgument { index: usize, name: &'static str },
    /// Circular dependency detected (includes path)
    #[error("Circular dependency: {}", .0.join(" -> "))]
    Circular(Vec<&'static str>),
    /// Maximum recursion depth exceeded
    #[error("Max depth {0} exceeded")]
    DepthExceeded(usize),
    /// Invalid lifetime resolution (e.g., scoped from root)
    #[error("Lifetime error: {0}")]
    WrongLifetime(&'static str),
    /// Instance was disposed and cannot be handed out again
    #[error("instance of {0} has been disposed")]
    Disposed(&'static str),
    /// One or more disposers failed; every disposer was still attempted
    #[error("{} disposer(s) failed: {}", .0.len(), join_errors(.0))]
    Disposal(Vec<DiError>),
    /// Container options could not be read
    #[error("configuration error: {0}")]
    Config(String),
}

impl DiError {
    /// Wraps a failure raised by user code.
    ///
    /// The resulting error displays exactly the wrapped error's message.
    pub fn invocation<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        DiError::Invocation(Arc::from(error.into()))
    }

    /// Returns the user error carried by [`DiError::Invocation`], if any.
    pub fn user_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            DiError::Invocation(inner) => Some(inner.as_ref()),
            _ => None,
        }
    }
}

fn join_errors(errors: &[DiError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for DI operations
pub type DiResult<T> = Result<T, DiError>;
