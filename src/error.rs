use thiserror::Error;

/// Recoverable failure modes of the solver core.
///
/// Genuine programmer errors (an unmatched member of a fixed enumeration,
/// an out-of-range local node id) panic instead; they are not values a
/// caller can act on.
#[derive(Debug, Error)]
pub enum SolverError {
    /// A component was wired to an action of the wrong runtime type,
    /// e.g. a cell scheme bound to a face region.
    #[error("setup error: {0}")]
    SetupError(String),

    /// A named region, scheme or physics model does not exist.
    #[error("value not found: {0}")]
    ValueNotFound(String),

    /// A physics/variable combination does not implement the requested
    /// operator. Propagated, never swallowed.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    /// The post-iteration residual norm is NaN or infinite.
    #[error("solution diverged at iteration {iteration}")]
    FailedToConverge { iteration: usize },

    /// Non-positive Jacobian determinant: the element is inverted or
    /// collapsed and the mapping to reference space is invalid.
    #[error("degenerate element: jacobian determinant {det:.6e}")]
    DegenerateElement { det: f64 },

    /// A numerical kernel received a physically inadmissible state.
    #[error("inadmissible state: {0}")]
    NumericalInput(&'static str),
}
