use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiagramError {
    #[error("cannot annotate {subject}: {source}")]
    Annotation {
        subject: String,
        #[source]
        source: serde_json::Error,
    },
}
