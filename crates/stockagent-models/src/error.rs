use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is missing. Please set it in the environment.")]
    MissingCredential(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
