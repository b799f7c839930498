use miette::Diagnostic;
use thiserror::Error;

/// Hard failures raised by scope operations.
///
/// Lookups never fail: an unbound name is an ordinary `None`. These errors
/// mean the driver broke a precondition, and the scope they were raised on
/// should be abandoned. Sibling and ancestor scopes are left untouched.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A removal or release violated LIFO order, or named something the
    /// scope does not own. The scope is unchanged.
    #[error("invalid scope state: {reason}")]
    #[diagnostic(code(lexenv_scope::invalid_state))]
    InvalidState { reason: String },

    /// Mutation attempted on a scope that structurally forbids it.
    #[error("unsupported operation `{operation}` on the terminal scope")]
    #[diagnostic(
        code(lexenv_scope::unsupported),
        help("the terminal scope only ends a chain; declare into a root or nested scope instead")
    )]
    Unsupported { operation: &'static str },

    /// More slots requested in one scope than the slot space allows.
    #[error("scope exceeds the maximum of {limit} slots")]
    #[diagnostic(code(lexenv_scope::slot_overflow))]
    SlotOverflow { limit: usize },
}

impl ScopeError {
    pub fn invalid_state(reason: impl Into<String>) -> Self {
        ScopeError::InvalidState {
            reason: reason.into(),
        }
    }
}

pub type ScopeResult<T> = Result<T, ScopeError>;
