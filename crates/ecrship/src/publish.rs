//! publish 手順
//!
//! 8つのステップを固定の順序で実行: アカウント解決、prune、ビルド、ログイン、
//! イメージID解決、タグ付け、リポジトリ作成、プッシュ。
//! [`FailurePolicy::Halt`] では最初に失敗したステップで [`PublishError`] を返して終了し、
//! [`FailurePolicy::Continue`] では失敗を記録して残りのステップも実行する。
//! 失敗したステップの値 (アカウント、パスワード、イメージID) は
//! 空文字列になる。

use ecrship_build::{BuildError, DockerCli};
use ecrship_cloud_aws::{Aws, AwsError, EcrRegistry, RepositoryOutcome};
use ecrship_config::{FailurePolicy, PublishConfig};
use ecrship_core::{CommandRunner, CommandSpec};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

pub const ACCOUNT_PLACEHOLDER: &str = "<account-id>";
pub const IMAGE_ID_PLACEHOLDER: &str = "<image-id>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ResolveAccount,
    Prune,
    Build,
    Login,
    ResolveImageId,
    Tag,
    CreateRepository,
    Push,
}

impl Step {
    pub const ALL: [Step; 8] = [
        Step::ResolveAccount,
        Step::Prune,
        Step::Build,
        Step::Login,
        Step::ResolveImageId,
        Step::Tag,
        Step::CreateRepository,
        Step::Push,
    ];

    /// 手順内の位置 (1始まり)
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|s| *s == self)
            .map_or(0, |i| i + 1)
    }

    pub fn description(self) -> &'static str {
        match self {
            Step::ResolveAccount => "Resolve AWS account",
            Step::Prune => "Prune local images and build cache",
            Step::Build => "Build image",
            Step::Login => "Log in to registry",
            Step::ResolveImageId => "Resolve image id",
            Step::Tag => "Tag image",
            Step::CreateRepository => "Create repository",
            Step::Push => "Push image",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepStatus {
    Done(Option<String>),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    pub status: StepStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// アカウント解決ステップの完了後に確定
    pub image_uri: Option<String>,
    pub steps: Vec<StepOutcome>,
}

impl PublishReport {
    pub fn failed(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps
            .iter()
            .filter(|o| matches!(o.status, StepStatus::Failed(_)))
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// [`FailurePolicy::Halt`] でステップが失敗した
#[derive(Debug, Error)]
#[error("{step} failed: {message}")]
pub struct PublishError {
    pub step: Step,
    pub message: String,
    /// 対処のヒント付きメッセージ
    pub hint: String,
    /// 失敗までに終わったステップ (失敗したステップを含む)
    pub report: PublishReport,
}

struct StepFailure {
    message: String,
    hint: String,
}

impl From<AwsError> for StepFailure {
    fn from(err: AwsError) -> Self {
        Self {
            message: err.to_string(),
            hint: err.user_message(),
        }
    }
}

impl From<BuildError> for StepFailure {
    fn from(err: BuildError) -> Self {
        Self {
            message: err.to_string(),
            hint: err.user_message(),
        }
    }
}

/// 手順の実行中にステップの通知を受け取る
pub trait Progress {
    fn started(&mut self, _step: Step) {}
    fn finished(&mut self, _outcome: &StepOutcome) {}
}

/// 何も表示しない進捗
#[cfg(test)]
#[derive(Debug, Default)]
pub struct Quiet;

#[cfg(test)]
impl Progress for Quiet {}

pub struct Publisher {
    config: PublishConfig,
    aws: Aws,
    docker: DockerCli,
}

impl Publisher {
    pub fn new(config: PublishConfig, runner: Arc<dyn CommandRunner>) -> Self {
        let aws = Aws::new(runner.clone(), config.region.clone());
        let docker = DockerCli::new(runner, config.docker.binary.clone(), config.docker.sudo);
        Self {
            config,
            aws,
            docker,
        }
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    pub fn aws(&self) -> &Aws {
        &self.aws
    }

    pub fn docker(&self) -> &DockerCli {
        &self.docker
    }

    pub fn registry(&self, account: &str) -> EcrRegistry {
        EcrRegistry::new(account, self.config.region.clone())
    }

    pub fn image_uri(&self, account: &str) -> String {
        self.registry(account)
            .image_uri(&self.config.app_name, &self.config.tag)
    }

    /// `run` が実行するコマンドを順に返す (実行はしない)
    ///
    /// 実行時にしか分からない値は [`ACCOUNT_PLACEHOLDER`] (アカウント未指定時)
    /// と [`IMAGE_ID_PLACEHOLDER`] で表す。
    pub fn plan(&self) -> Vec<(Step, CommandSpec)> {
        let config = &self.config;
        let account = config
            .account_id
            .clone()
            .unwrap_or_else(|| ACCOUNT_PLACEHOLDER.to_string());
        let registry = self.registry(&account);
        let image_uri = self.image_uri(&account);
        let local_image = config.local_image();

        let mut plan = Vec::new();
        if config.account_id.is_none() {
            plan.push((Step::ResolveAccount, self.aws.caller_identity_command()));
        }
        if config.prune {
            plan.push((Step::Prune, self.docker.prune_command()));
        }
        plan.push((
            Step::Build,
            self.docker
                .build_command(&local_image, &config.context, config.dockerfile.as_deref()),
        ));
        plan.push((Step::Login, self.aws.login_password_command()));
        plan.push((Step::Login, self.docker.login_command(&registry.host(), "")));
        plan.push((Step::ResolveImageId, self.docker.image_id_command(&local_image)));
        plan.push((
            Step::Tag,
            self.docker.tag_command(IMAGE_ID_PLACEHOLDER, &image_uri),
        ));
        plan.push((
            Step::CreateRepository,
            self.aws.create_repository_command(&account, &config.app_name),
        ));
        plan.push((Step::Push, self.docker.push_command(&image_uri)));
        plan
    }

    pub async fn run(&self, progress: &mut dyn Progress) -> Result<PublishReport, PublishError> {
        let config = &self.config;
        let local_image = config.local_image();
        let mut run = Run::new(config.on_failure, progress);

        let account = match &config.account_id {
            Some(account) => {
                run.skip(Step::ResolveAccount, format!("using account {}", account));
                account.clone()
            }
            None => run
                .step(
                    Step::ResolveAccount,
                    async {
                        self.aws
                            .caller_identity()
                            .await
                            .map(|identity| identity.account)
                            .map_err(StepFailure::from)
                    },
                    |account: &String| Some(format!("account {}", account)),
                )
                .await?
                .unwrap_or_default(),
        };

        let registry = self.registry(&account);
        let image_uri = self.image_uri(&account);
        run.report.image_uri = Some(image_uri.clone());

        if config.prune {
            run.step(
                Step::Prune,
                async { self.docker.prune_all().await.map_err(StepFailure::from) },
                no_detail,
            )
            .await?;
        } else {
            run.skip(Step::Prune, "disabled".to_string());
        }

        run.step(
            Step::Build,
            async {
                self.docker
                    .build(&local_image, &config.context, config.dockerfile.as_deref())
                    .await
                    .map_err(StepFailure::from)
            },
            |_: &()| Some(local_image.clone()),
        )
        .await?;

        let host = registry.host();
        run.step(
            Step::Login,
            self.login(&host, config.on_failure),
            |_: &()| Some(host.clone()),
        )
        .await?;

        let image_id = run
            .step(
                Step::ResolveImageId,
                async {
                    self.docker
                        .image_id(&local_image)
                        .await
                        .map_err(StepFailure::from)
                },
                |id: &String| Some(id.clone()),
            )
            .await?
            .unwrap_or_default();

        run.step(
            Step::Tag,
            async {
                self.docker
                    .tag(&image_id, &image_uri)
                    .await
                    .map_err(StepFailure::from)
            },
            |_: &()| Some(image_uri.clone()),
        )
        .await?;

        run.step(
            Step::CreateRepository,
            async {
                self.aws
                    .create_repository(&account, &config.app_name)
                    .await
                    .map_err(StepFailure::from)
            },
            |outcome: &RepositoryOutcome| {
                Some(match outcome {
                    RepositoryOutcome::Created { uri: Some(uri) } => format!("created {}", uri),
                    RepositoryOutcome::Created { uri: None } => "created".to_string(),
                    RepositoryOutcome::AlreadyExists => "already exists".to_string(),
                })
            },
        )
        .await?;

        run.step(
            Step::Push,
            async {
                self.docker
                    .push(&image_uri)
                    .await
                    .map_err(StepFailure::from)
            },
            |_: &()| Some(image_uri.clone()),
        )
        .await?;

        Ok(run.finish())
    }

    async fn login(&self, host: &str, policy: FailurePolicy) -> Result<(), StepFailure> {
        let password = match self.aws.login_password().await {
            Ok(password) => password,
            Err(err) => {
                if policy == FailurePolicy::Continue {
                    // stdinなしでもエンジンのログインは実行する
                    if let Err(login_err) = self.docker.login(host, "").await {
                        tracing::debug!("login without password failed: {}", login_err);
                    }
                }
                return Err(err.into());
            }
        };

        self.docker
            .login(host, &password)
            .await
            .map_err(StepFailure::from)
    }
}

fn no_detail(_: &()) -> Option<String> {
    None
}

/// 手順1回分の実行状態
struct Run<'a> {
    policy: FailurePolicy,
    progress: &'a mut dyn Progress,
    report: PublishReport,
}

impl<'a> Run<'a> {
    fn new(policy: FailurePolicy, progress: &'a mut dyn Progress) -> Self {
        Self {
            policy,
            progress,
            report: PublishReport::default(),
        }
    }

    /// `Ok(None)` はステップが失敗したが続行するポリシーであることを示す
    async fn step<T, F, D>(
        &mut self,
        step: Step,
        work: F,
        detail: D,
    ) -> Result<Option<T>, PublishError>
    where
        F: Future<Output = Result<T, StepFailure>>,
        D: FnOnce(&T) -> Option<String>,
    {
        self.progress.started(step);

        match work.await {
            Ok(value) => {
                self.record(step, StepStatus::Done(detail(&value)));
                Ok(Some(value))
            }
            Err(failure) => {
                self.record(step, StepStatus::Failed(failure.message.clone()));
                match self.policy {
                    FailurePolicy::Halt => Err(PublishError {
                        step,
                        message: failure.message,
                        hint: failure.hint,
                        report: self.report.clone(),
                    }),
                    FailurePolicy::Continue => {
                        tracing::warn!("{} failed, continuing: {}", step, failure.message);
                        Ok(None)
                    }
                }
            }
        }
    }

    fn skip(&mut self, step: Step, reason: String) {
        self.progress.started(step);
        self.record(step, StepStatus::Skipped(reason));
    }

    fn record(&mut self, step: Step, status: StepStatus) {
        let outcome = StepOutcome { step, status };
        self.progress.finished(&outcome);
        self.report.steps.push(outcome);
    }

    fn finish(self) -> PublishReport {
        self.report
    }
}
