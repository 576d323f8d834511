use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookError {
    /// A structured reply did not match the schema it was requested with.
    #[error("{agent} returned a reply that does not match `{schema}`: {source}")]
    MalformedResponse {
        agent: String,
        schema: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0} environment variable not set")]
    MissingCredential(&'static str),

    #[error("generation service answered {status}: {body}")]
    Api { status: u16, body: String },

    #[error("{agent} received a reply with no text")]
    EmptyReply { agent: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{tool} failed: {detail}")]
    Rendering { tool: String, detail: String },

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("cover template `{0}` does not exist")]
    UnknownTemplate(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BookError>;
