use thiserror::Error;

/// Errors that abort a repertoire load. The previously active tree, if any,
/// stays in place when one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("malformed pgn at byte {offset}: {detail}")]
    MalformedPgn { offset: usize, detail: String },

    #[error("illegal move {san:?} at byte {offset}")]
    IllegalMove { san: String, offset: usize },

    #[error("unbalanced variation at byte {offset}")]
    UnbalancedVariation { offset: usize },

    #[error("no moves found in repertoire")]
    EmptyRepertoire,
}

/// Per-request lookup errors. Recoverable: the caller falls back to the root.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no node at address {depth}/{variation}")]
    AddressNotFound { depth: u32, variation: u32 },
}
