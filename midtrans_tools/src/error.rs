use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidtransApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach Midtrans (timed out: {timed_out}). {message}")]
    Transport { timed_out: bool, message: String },
    #[error("Midtrans reported an internal error. Status {status}. {message}")]
    ServerError { status: u16, message: String },
    #[error("Midtrans rejected the request. Status {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("The charge response for {0} did not contain a virtual account number")]
    MissingVirtualAccount(String),
}

impl MidtransApiError {
    /// True when the failure happened before Midtrans could act on the request, so the same call may be retried.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::ServerError { .. })
    }
}
