//! Error types for link-graph construction and rank estimation.

use thiserror::Error;

/// Error type for linkrank operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input graph: duplicate page identifiers, or (in strict
    /// mode) links to pages outside the corpus.
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// A configuration value or call argument is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The graph has no nodes, so no distribution over it exists.
    #[error("graph has no nodes")]
    EmptyGraph,

    /// The iterative solver hit its iteration ceiling.
    ///
    /// `scores` holds the last computed vector so callers can still use a
    /// best-effort answer.
    #[error("did not converge after {iterations} iterations (max change {delta:.3e})")]
    DidNotConverge {
        iterations: usize,
        delta: f64,
        scores: Vec<f64>,
    },

    /// IO error while reading a corpus or config file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error while loading a config file or writing a report.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for linkrank operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_did_not_converge_message() {
        let err = Error::DidNotConverge {
            iterations: 5,
            delta: 0.25,
            scores: vec![0.5, 0.5],
        };
        let msg = err.to_string();
        assert!(msg.contains("5 iterations"));
        assert!(msg.contains("2.500e-1"));
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
