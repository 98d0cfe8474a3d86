use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("unexpected content type \"{content_type}\" from {url}")]
    UnexpectedContentType { content_type: String, url: String },

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("malformed feed document: {0}")]
    Malformed(String),

    #[error("feed document has no <rss><channel> element")]
    MissingChannel,

    #[error("unrecognized publish date \"{value}\": {source}")]
    TimeParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("feed item \"{title}\" has no link")]
    MissingLink { title: String },
}
