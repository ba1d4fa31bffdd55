use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("container engine not found: {0}")]
    EngineNotFound(String),

    #[error("Dockerfile not found: {0}")]
    DockerfileNotFound(PathBuf),

    #[error("Build context directory not found: {0}")]
    ContextNotFound(PathBuf),

    #[error("{command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("no local image matches {0}")]
    ImageNotFound(String),

    #[error(transparent)]
    Process(ecrship_core::CoreError),
}

impl From<ecrship_core::CoreError> for BuildError {
    fn from(err: ecrship_core::CoreError) -> Self {
        match err {
            ecrship_core::CoreError::ProgramNotFound(program) => BuildError::EngineNotFound(program),
            other => BuildError::Process(other),
        }
    }
}

impl BuildError {
    /// よくある原因へのヒント付きエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::EngineNotFound(program) => {
                format!(
                    "{} was not found on PATH.\n\
                     \n\
                     Install Docker (https://docs.docker.com/get-docker/) or point\n\
                     --docker-bin at a compatible CLI such as podman.",
                    program
                )
            }
            BuildError::DockerfileNotFound(path) => {
                format!(
                    "Dockerfile not found: {}\n\
                     \n\
                     Check the path, or set it explicitly:\n\
                     ecrship --dockerfile path/to/Dockerfile",
                    path.display()
                )
            }
            BuildError::ContextNotFound(path) => {
                format!(
                    "Build context not found: {}\n\
                     \n\
                     Run ecrship from the project root or pass --context.",
                    path.display()
                )
            }
            BuildError::CommandFailed { message, .. }
                if message.contains("Cannot connect to the Docker daemon")
                    || message.contains("permission denied") =>
            {
                format!(
                    "{}\n\
                     \n\
                     Is the Docker daemon running? If it needs root, retry with --sudo.",
                    self
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type BuildResult<T> = std::result::Result<T, BuildError>;
