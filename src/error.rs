use thiserror::Error;

/// Failures at the sample-store boundary. Aggregation never produces these
/// itself; it only passes them through.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Sample not found: {0}")]
    NotFound(u64),

    #[error("Sample store lock poisoned")]
    Poisoned,

    #[error("Invalid sample data: {0}")]
    InvalidData(String),
}
