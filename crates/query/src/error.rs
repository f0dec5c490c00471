use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Empty query")]
    EmptyQuery,

    #[error("Retrieval engine error: {0}")]
    Retrieval(String),

    #[error("Retrieval engine produced no routes for this query")]
    NoRoutes,
}
