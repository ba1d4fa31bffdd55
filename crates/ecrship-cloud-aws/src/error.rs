//! AWS CLI のエラー型

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("aws CLI not found. Please install: https://aws.amazon.com/cli/")]
    CliNotFound,

    #[error("aws {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("unexpected output from aws {command}: {source}")]
    InvalidOutput {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("caller identity returned an invalid account id: '{0}'")]
    InvalidAccount(String),

    #[error("ECR returned an empty login password")]
    EmptyPassword,

    #[error(transparent)]
    Process(ecrship_core::CoreError),
}

impl From<ecrship_core::CoreError> for AwsError {
    fn from(err: ecrship_core::CoreError) -> Self {
        match err {
            ecrship_core::CoreError::ProgramNotFound(_) => AwsError::CliNotFound,
            other => AwsError::Process(other),
        }
    }
}

impl AwsError {
    /// よくある原因へのヒント付きエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            AwsError::CommandFailed { message, .. }
                if message.contains("Unable to locate credentials")
                    || message.contains("ExpiredToken") =>
            {
                format!(
                    "{}\n\n\
                     AWS credentials are missing or expired.\n\
                     Run `aws configure` or `aws sso login`, or export AWS_PROFILE.",
                    self
                )
            }
            AwsError::CommandFailed { message, .. } if message.contains("AccessDenied") => {
                format!(
                    "{}\n\n\
                     The caller lacks the ECR permissions this step needs\n\
                     (ecr:GetAuthorizationToken, ecr:CreateRepository, ecr:*Upload*).",
                    self
                )
            }
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
