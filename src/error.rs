use thiserror::Error;

pub type SidecutResult<T> = Result<T, SidecutError>;

#[derive(Error, Debug)]
pub enum SidecutError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("code generation error: {0}")]
    Codegen(String),

    #[error("unreadable side annotation on `{declaration}` in {file}")]
    Metadata { file: String, declaration: String },

    #[error("configuration error: {0}")]
    Config(String),
}
