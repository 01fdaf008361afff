//! Errors shared by the request, swap and session state machines.

/// A rejected status change.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// The status does not allow the move (terminal or out of order).
    #[error("{entity} cannot move from {from} to {to}")]
    Invalid {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
    },

    /// The acting user has no right to perform the move.
    #[error("only the {role} may {action} this {entity}")]
    NotAllowed {
        entity: &'static str,
        action: &'static str,
        role: &'static str,
    },
}
