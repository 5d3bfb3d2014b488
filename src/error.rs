// =============================================================================
// Engine errors
// =============================================================================
//
// Insufficient data is not an error: kernels and the facade return an empty
// series for it.  Malformed candles are dropped by `CandleSeries::new`.

use thiserror::Error;

use crate::types::IndicatorType;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Incremental mode was requested for a kind that needs the full window.
    #[error("incremental computation is not supported for {kind}; recompute the full history")]
    UnsupportedOperation { kind: IndicatorType },

    #[error("invalid indicator parameter: {0}")]
    InvalidParameter(String),
}

impl EngineError {
    /// True when the caller should fall back to a full recompute.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_message_names_kind() {
        let err = EngineError::UnsupportedOperation {
            kind: IndicatorType::WilliamsR,
        };
        assert!(err.is_unsupported());
        assert!(err.to_string().contains("Williams %R"));
    }

    #[test]
    fn invalid_parameter_is_not_unsupported() {
        let err = EngineError::InvalidParameter("period".into());
        assert!(!err.is_unsupported());
    }
}
