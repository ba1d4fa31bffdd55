//! aws CLI ラッパー
//!
//! ECRへのpublishに必要な `aws` コマンドをラップする。

use crate::error::{AwsError, Result};
use crate::registry::EcrRegistry;
use ecrship_core::{CommandOutput, CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const ALREADY_EXISTS: &str = "RepositoryAlreadyExistsException";

/// リージョンに紐づいた aws CLI ラッパー
pub struct Aws {
    runner: Arc<dyn CommandRunner>,
    region: String,
    binary: String,
}

impl Aws {
    pub fn new(runner: Arc<dyn CommandRunner>, region: impl Into<String>) -> Self {
        Self {
            runner,
            region: region.into(),
            binary: "aws".to_string(),
        }
    }

    pub fn caller_identity_command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary).args([
            "sts",
            "get-caller-identity",
            "--output",
            "json",
            "--region",
            self.region.as_str(),
        ])
    }

    pub fn login_password_command(&self) -> CommandSpec {
        CommandSpec::new(&self.binary).args([
            "ecr",
            "get-login-password",
            "--region",
            self.region.as_str(),
        ])
    }

    pub fn create_repository_command(&self, registry_id: &str, name: &str) -> CommandSpec {
        CommandSpec::new(&self.binary).args([
            "ecr",
            "create-repository",
            "--registry-id",
            registry_id,
            "--repository-name",
            name,
            "--region",
            self.region.as_str(),
            "--output",
            "json",
        ])
    }

    /// 現在の認証情報のアイデンティティ
    pub async fn caller_identity(&self) -> Result<CallerIdentity> {
        let output = self
            .run_checked("sts get-caller-identity", &self.caller_identity_command())
            .await?;

        let mut identity: CallerIdentity =
            serde_json::from_str(&output.stdout).map_err(|source| AwsError::InvalidOutput {
                command: "sts get-caller-identity".to_string(),
                source,
            })?;
        identity.account = identity.account.trim().to_string();

        if identity.account.is_empty() || !identity.account.chars().all(|c| c.is_ascii_digit()) {
            return Err(AwsError::InvalidAccount(identity.account));
        }

        tracing::debug!("Caller identity: {} ({})", identity.arn, identity.account);
        Ok(identity)
    }

    /// 呼び出し元アカウントのこのリージョンのレジストリ
    pub async fn own_registry(&self) -> Result<EcrRegistry> {
        let identity = self.caller_identity().await?;
        Ok(EcrRegistry::new(identity.account, &self.region))
    }

    /// `docker login --username AWS` 用の短期ECRパスワード
    pub async fn login_password(&self) -> Result<String> {
        let output = self
            .run_checked("ecr get-login-password", &self.login_password_command())
            .await?;

        let password = output.stdout_trimmed();
        if password.is_empty() {
            return Err(AwsError::EmptyPassword);
        }
        Ok(password.to_string())
    }

    /// リポジトリを作成。既に存在する場合もエラーにしない
    pub async fn create_repository(
        &self,
        registry_id: &str,
        name: &str,
    ) -> Result<RepositoryOutcome> {
        let spec = self.create_repository_command(registry_id, name);
        let output = self.runner.run(&spec).await?;

        if output.success {
            // 終了コード0ならリポジトリは作成済み。レスポンスの形は問わない
            let uri = match serde_json::from_str::<CreateRepositoryResponse>(&output.stdout) {
                Ok(created) => Some(created.repository.repository_uri),
                Err(e) => {
                    tracing::debug!("Unexpected create-repository output: {}", e);
                    None
                }
            };
            tracing::debug!("Created repository {}", name);
            return Ok(RepositoryOutcome::Created { uri });
        }

        if output.stderr.contains(ALREADY_EXISTS) {
            tracing::debug!("Repository {} already exists", name);
            return Ok(RepositoryOutcome::AlreadyExists);
        }

        Err(AwsError::CommandFailed {
            command: "ecr create-repository".to_string(),
            message: output.failure_message(),
        })
    }

    async fn run_checked(&self, command: &str, spec: &CommandSpec) -> Result<CommandOutput> {
        let output = self.runner.run(spec).await?;
        if !output.success {
            return Err(AwsError::CommandFailed {
                command: command.to_string(),
                message: output.failure_message(),
            });
        }
        Ok(output)
    }
}

/// `aws sts get-caller-identity` の出力
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    #[serde(rename = "UserId")]
    pub user_id: String,

    #[serde(rename = "Account")]
    pub account: String,

    #[serde(rename = "Arn")]
    pub arn: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryOutcome {
    Created { uri: Option<String> },
    AlreadyExists,
}

#[derive(Debug, Deserialize)]
struct CreateRepositoryResponse {
    repository: RepositoryInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryInfo {
    repository_uri: String,
}
