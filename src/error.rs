/// Error type injected custom validators may return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Invalid regexMatch pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid bounds for {name}: minimum {min} is greater than maximum {max}")]
    InvalidBounds {
        name: &'static str,
        min: usize,
        max: usize,
    },
    #[error("Custom validator failed: {0}")]
    CustomValidator(#[source] BoxError),
}
