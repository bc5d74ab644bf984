use thiserror::Error as ThisError;

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a report run.
///
/// Every variant is fatal: there is no per-row or per-group recovery. Lines already written for earlier
/// campaign groups stay on the report stream.
#[derive(ThisError, Debug)]
pub enum Error {
    /// The estimation service rejected (or we never had) valid credentials
    #[error("Authorization failed: {message}")]
    Authorization { message: String },

    /// The request never produced a usable HTTP response (connect, timeout, body decode)
    #[error("HTTP Error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-success status whose body was not an API fault
    #[error("HTTP Error: {status} - {body}")]
    HttpStatus { status: u16, body: String },

    /// The service processed the request and reported application-level errors
    #[error("API error: {}", .0.message)]
    Api(ApiFault),

    /// More unique keywords in one campaign group than the service accepts per call
    #[error("Batch of {size} keywords exceeds the per-request limit of {limit}")]
    BatchTooLarge { size: usize, limit: usize },

    /// The service returned a different number of estimates than keywords requested
    #[error("Estimate count mismatch: requested {requested} keywords but received {returned} estimates")]
    ContractViolation { requested: usize, returned: usize },

    /// The input table is missing a required column or holds an unusable value
    #[error("Invalid input: {message}")]
    Input { message: String },

    /// Settings that cannot work (checked before any input is read)
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Application-level fault body returned by the estimation service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiFault {
    pub message: String,
    pub errors: Vec<ApiErrorEntry>,
}

/// One entry of an [`ApiFault`], as the ordered field/value pairs the service sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApiErrorEntry {
    pub fields: Vec<(String, String)>,
}

/// Where to point users whose credentials were rejected.
pub const AUTHORIZATION_HELP: &str = "Authorization credentials are not valid. Set api.access_token, \
api.developer_token and api.client_customer_id in the config file (or the KWTRAFFIC_API__* environment \
variables) to a valid OAuth2 access token and AdWords account.";

impl Error {
    /// Human-readable text printed on the primary output when a run aborts.
    pub fn user_message(&self) -> String {
        match self {
            Error::Authorization { message } => {
                format!("{AUTHORIZATION_HELP}\nReason: {message}")
            }
            Error::Transport(e) => format!("HTTP Error: {e}"),
            Error::HttpStatus { status, body } => format!("HTTP Error: {status} {body}"),
            Error::Api(fault) => {
                let mut out = format!("Message: {}\nErrors:", fault.message);
                for (index, entry) in fault.errors.iter().enumerate() {
                    out.push_str(&format!("\n\tError [{}]:", index + 1));
                    for (field, value) in &entry.fields {
                        out.push_str(&format!("\n\t\t{field}: {value}"));
                    }
                }
                out
            }
            Error::ContractViolation { requested, returned } => format!(
                "FATAL: estimation service broke the request/response contract: {requested} keywords were \
                 submitted but {returned} estimates came back. No estimates were matched for this group."
            ),
            Error::Input { message } => format!("Invalid input: {message}"),
            Error::Other(e) => format!("Error: {e:#}"),
            other => other.to_string(),
        }
    }

    /// Log the error at a level matching its severity.
    pub fn log(&self) {
        match self {
            Error::ContractViolation { .. } | Error::Other(_) | Error::Io(_) => {
                tracing::error!("Internal error: {:#}", self);
            }
            Error::Authorization { .. } => {
                tracing::warn!("Authorization error: {}", self);
            }
            Error::Transport(_) | Error::HttpStatus { .. } => {
                tracing::warn!("Estimation service error: {}", self);
            }
            Error::Api(fault) => {
                tracing::warn!(error_count = fault.errors.len(), "API error: {}", fault.message);
            }
            Error::BatchTooLarge { .. } | Error::Input { .. } | Error::Config { .. } | Error::Csv(_) => {
                tracing::info!("Input error: {}", self);
            }
        }
    }
}
