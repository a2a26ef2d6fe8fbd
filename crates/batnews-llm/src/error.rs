use thiserror::Error;

/// Errors from calls to the generative model.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model endpoint returned HTTP {status}")]
    Status { status: u16 },

    /// The response carried no candidate text.
    #[error("model returned an empty response")]
    EmptyResponse,

    /// The model text contained no JSON object.
    #[error("no JSON object in model output for {context}")]
    MissingJson { context: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
