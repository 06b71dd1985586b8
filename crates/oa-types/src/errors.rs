use thiserror::Error;

/// Main error type for optalgo
#[derive(Error, Debug)]
pub enum OaError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Arguments an optimization routine refuses to run with
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("item list is empty, cannot sample an initial candidate")]
    EmptyItems,

    #[error("max_iterations must be positive")]
    NonPositiveIterations,

    #[error("candidate value {value} is not drawn from the item list")]
    ForeignCandidate { value: f64 },

    #[error("dimension must be positive")]
    NonPositiveDimension,

    #[error("steps must be positive")]
    NonPositiveSteps,

    #[error("objective is defined for {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("initial point has {actual} coordinates, expected {expected}")]
    InitialPointDimension { expected: usize, actual: usize },

    #[error("gradient has {actual} components, expected {expected}")]
    GradientLength { expected: usize, actual: usize },
}

/// Result type alias for optalgo operations
pub type OaResult<T> = Result<T, OaError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::OaError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = InputError::DimensionMismatch {
            expected: 2,
            actual: 3,
        };

        assert!(error.to_string().contains("2 dimensions"));
        assert!(error.to_string().contains("got 3"));
    }

    #[test]
    fn test_error_conversion() {
        let oa_error: OaError = InputError::EmptyItems.into();

        match oa_error {
            OaError::InvalidInput(InputError::EmptyItems) => (),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_config_macro() {
        let config_err = config_error!("Missing required field: {}", "items");
        assert!(matches!(config_err, OaError::Config(_)));
    }
}
