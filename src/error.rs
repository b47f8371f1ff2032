/// Errors surfaced by the epic backend client.
///
/// All of these are recoverable from the admission controller's point of
/// view: a round that hits one ends early and reports the message; nothing
/// propagates past the controller boundary.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned HTTP {status}")]
    Status { status: reqwest::StatusCode },

    #[error("invalid response body: {0}")]
    Decode(String),
}
