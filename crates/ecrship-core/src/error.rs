use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("command not found: {0}")]
    ProgramNotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, CoreError>;
