use std::fmt;

/// Errors at the fallible boundaries: configuration, bounds and snapshot
/// ingestion. Geometry itself never fails; it degrades to `None` or empty
/// results.
#[derive(Debug, Clone, PartialEq)]
pub enum GenError {
    /// JSON could not be parsed into the expected shape.
    Parse(String),
    /// A numeric parameter was NaN or infinite.
    NonFinite { param: String },
    /// A numeric parameter fell outside its accepted range.
    OutOfRange { param: String, min: f64, max: f64, got: f64 },
    /// World bounds were empty, inverted or non-finite.
    InvalidBounds,
    /// An imported collection exceeded an ingestion cap.
    LimitExceeded { what: String, max: usize, got: usize },
}

impl GenError {
    /// Stable machine-readable code, used by the wasm result envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            GenError::Parse(_) => "parse",
            GenError::NonFinite { .. } => "non_finite",
            GenError::OutOfRange { .. } => "out_of_range",
            GenError::InvalidBounds => "invalid_bounds",
            GenError::LimitExceeded { .. } => "limit_exceeded",
        }
    }

    pub(crate) fn non_finite(param: &str) -> Self {
        GenError::NonFinite { param: param.to_string() }
    }

    pub(crate) fn out_of_range(param: &str, min: f64, max: f64, got: f64) -> Self {
        GenError::OutOfRange { param: param.to_string(), min, max, got }
    }

    pub(crate) fn limit(what: &str, max: usize, got: usize) -> Self {
        GenError::LimitExceeded { what: what.to_string(), max, got }
    }
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::Parse(msg) => write!(f, "parse error: {msg}"),
            GenError::NonFinite { param } => write!(f, "parameter '{param}' must be finite"),
            GenError::OutOfRange { param, min, max, got } => {
                write!(f, "parameter '{param}' out of range [{min}, {max}]: {got}")
            }
            GenError::InvalidBounds => write!(f, "world bounds must be finite with positive extent"),
            GenError::LimitExceeded { what, max, got } => {
                write!(f, "too many {what}: {got} exceeds limit {max}")
            }
        }
    }
}

impl std::error::Error for GenError {}

impl From<serde_json::Error> for GenError {
    fn from(e: serde_json::Error) -> Self {
        GenError::Parse(e.to_string())
    }
}
