use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid literal name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("invalid CNF shape: `{node}` cannot appear inside a clause")]
    InvalidCnfShape { node: String },
}

pub type Result<T> = std::result::Result<T, Error>;
