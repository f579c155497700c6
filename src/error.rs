use serde::Serialize;

/// Faults raised by the ledger collaborator behind [`crate::ledger::LedgerStub`].
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("ledger backend error: {0}")]
    Backend(String),
    #[error("failed to decode record at {key}: {reason}")]
    Codec { key: String, reason: String },
    #[error("concurrent conflict on key {key}: read version is stale")]
    Conflict { key: String },
    #[error("invalid selector: {0}")]
    Selector(String),
}

impl From<sled::Error> for StorageError {
    fn from(value: sled::Error) -> Self {
        StorageError::Backend(value.to_string())
    }
}

/// Terminal failure of a single invocation.
///
/// Every variant carries the context it was raised with, rendered as the
/// `Data` half of the error payload; the display string becomes `ErrorDetails`.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Invalid Number of arguments provided for transaction")]
    InvalidArgumentCount(usize),
    #[error("Invalid json provided as input: {reason}")]
    InvalidPayload { data: String, reason: String },
    #[error("{what} does not exists for :{data}")]
    NotFound { what: &'static str, data: String },
    #[error("Theatre details already added")]
    AlreadyExists(String),
    #[error("This screen details does not exists for the theatre")]
    InvalidScreen(String),
    #[error("Invalid request to sell tickets. Expected 1 or more ticket count")]
    InvalidQuantity(i64),
    #[error("Enough {resource} not available")]
    CapacityExceeded {
        resource: &'static str,
        data: String,
    },
    #[error("Better luck next time. Cannot exchange soda")]
    NotEligible(String),
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] StorageError),
    #[error("Failed to get query result: {source}")]
    QueryFailed {
        selector: String,
        #[source]
        source: StorageError,
    },
    #[error("Available Functions: {}", crate::dispatcher::OPERATIONS.join(","))]
    UnknownOperation(String),
}

/// Wire shape of a failed invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    #[serde(rename = "Data")]
    pub data: String,
    #[serde(rename = "ErrorDetails")]
    pub error_details: String,
}

impl EngineError {
    /// The context value the error was raised for.
    pub fn data(&self) -> String {
        match self {
            EngineError::InvalidArgumentCount(count) => count.to_string(),
            EngineError::InvalidQuantity(count) => count.to_string(),
            EngineError::InvalidPayload { data, .. }
            | EngineError::NotFound { data, .. }
            | EngineError::CapacityExceeded { data, .. }
            | EngineError::AlreadyExists(data)
            | EngineError::InvalidScreen(data)
            | EngineError::NotEligible(data)
            | EngineError::UnknownOperation(data) => data.clone(),
            EngineError::QueryFailed { selector, .. } => selector.clone(),
            EngineError::StorageFailure(source) => match source {
                StorageError::Codec { key, .. } | StorageError::Conflict { key } => key.clone(),
                StorageError::Backend(_) | StorageError::Selector(_) => String::new(),
            },
        }
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            data: self.data(),
            error_details: self.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.payload()).unwrap_or(serde_json::Value::Null)
    }
}
