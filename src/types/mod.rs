use thiserror::Error;

mod domain_types;
mod ids;

pub use domain_types::*;
pub use ids::*;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid post ID: {0}")]
    InvalidPostId(String),

    #[error("Invalid blog name: {name} - {reason}")]
    InvalidBlogName { name: String, reason: String },

    #[error("Invalid API key format: {reason}")]
    InvalidApiKey { reason: String },

    #[error("Empty required field: {0}")]
    EmptyField(&'static str),

    #[error("Value out of range for {field}: {value}")]
    OutOfRange { field: &'static str, value: String },
}
