#[derive(thiserror::Error, Debug)]
pub enum LedgerError {
    /// The requested parameter profile is not part of the enumerated set.
    #[error("UnknownProfile: {0}")]
    UnknownProfile(String),
    /// The scheme rejected a parameter literal or key generation failed.
    #[error("ParameterError: {0}")]
    ParameterError(String),

    #[error("Arguments not as expected, {expected} was required but got {actual}")]
    ArgumentCountError { expected: usize, actual: usize },
    #[error("Unknown method: {0}")]
    UnknownFunction(String),

    #[error("No related subject retrieved: {0}")]
    NotFound(String),
    #[error("A report already exists for subject {0}")]
    DuplicateSubject(String),

    #[error("EncodeError: {0}")]
    EncodeError(String),
    #[error("DecodeError: {0}")]
    DecodeError(String),
    #[error("Profile mismatch: expected {expected}, got {actual}")]
    ProfileMismatch { expected: String, actual: String },

    /// The store observed a different version of the report than the one read.
    #[error("Conflicting write on {subject}: expected version {expected:?}, found {actual:?}")]
    Conflict {
        subject: String,
        expected: Option<u64>,
        actual: Option<u64>,
    },
    #[error("Store failure: {0}")]
    Store(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Data serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}
