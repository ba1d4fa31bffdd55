//! docker CLI ラッパー
//!
//! すべてのメソッドは設定されたエンジンのバイナリを呼び出す（必要なら `sudo` 経由）。
//! build と push は進捗をそのまま端末に流し、
//! それ以外の出力はキャプチャする。

use crate::error::{BuildError, BuildResult};
use ecrship_core::{CommandOutput, CommandRunner, CommandSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// ECRのパスワードログインで使うユーザー名
pub const ECR_USERNAME: &str = "AWS";

pub struct DockerCli {
    runner: Arc<dyn CommandRunner>,
    binary: String,
    sudo: bool,
}

impl DockerCli {
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<String>, sudo: bool) -> Self {
        Self {
            runner,
            binary: binary.into(),
            sudo,
        }
    }

    fn command<I, S>(&self, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = CommandSpec::new(&self.binary).args(args);
        if self.sudo { spec.with_sudo() } else { spec }
    }

    pub fn prune_command(&self) -> CommandSpec {
        self.command(["system", "prune", "--all", "--force"])
    }

    pub fn build_command(
        &self,
        image: &str,
        context: &Path,
        dockerfile: Option<&Path>,
    ) -> CommandSpec {
        let mut args = vec!["build".to_string(), "-t".to_string(), image.to_string()];
        if let Some(dockerfile) = dockerfile {
            args.push("-f".to_string());
            args.push(dockerfile.display().to_string());
        }
        args.push(context.display().to_string());

        self.command(args).inherit_output()
    }

    pub fn login_command(&self, host: &str, password: &str) -> CommandSpec {
        self.command(["login", "--username", ECR_USERNAME, "--password-stdin", host])
            .stdin(password)
    }

    pub fn image_id_command(&self, image: &str) -> CommandSpec {
        self.command(["images", "-q", image])
    }

    pub fn tag_command(&self, source: &str, target: &str) -> CommandSpec {
        self.command(["tag", source, target])
    }

    pub fn push_command(&self, image: &str) -> CommandSpec {
        self.command(["push", image]).inherit_output()
    }

    pub fn run_command(&self, image: &str, port: u16) -> CommandSpec {
        let publish = format!("{}:{}", port, port);
        self.command(["run", "-d", "-p", publish.as_str(), image])
    }

    /// 未使用のイメージとビルドキャッシュをすべて削除
    ///
    /// 特定のアプリケーションに限定されない。
    pub async fn prune_all(&self) -> BuildResult<()> {
        self.run_checked(&self.prune_command()).await?;
        Ok(())
    }

    /// `context` から `image` をビルド
    ///
    /// コンテキストやDockerfileの検証はエンジンに任せる。失敗した場合のみ
    /// パスを調べて分かりやすいエラーに置き換える。
    pub async fn build(
        &self,
        image: &str,
        context: &Path,
        dockerfile: Option<&Path>,
    ) -> BuildResult<()> {
        tracing::info!("Building image: {}", image);
        match self
            .run_checked(&self.build_command(image, context, dockerfile))
            .await
        {
            Ok(_) => {
                tracing::info!("Successfully built: {}", image);
                Ok(())
            }
            Err(BuildError::CommandFailed { command, message }) => {
                Err(explain_build_failure(context, dockerfile)
                    .unwrap_or(BuildError::CommandFailed { command, message }))
            }
            Err(other) => Err(other),
        }
    }

    /// `login --password-stdin`。パスワードはstdinでのみ渡す
    pub async fn login(&self, host: &str, password: &str) -> BuildResult<()> {
        self.run_checked(&self.login_command(host, password)).await?;
        Ok(())
    }

    /// ローカルイメージ `image` のID（trim済み）
    ///
    /// 複数のIDが一致した場合は先頭（最新）を使う。
    pub async fn image_id(&self, image: &str) -> BuildResult<String> {
        let output = self.run_checked(&self.image_id_command(image)).await?;
        parse_image_id(&output.stdout).ok_or_else(|| BuildError::ImageNotFound(image.to_string()))
    }

    pub async fn tag(&self, source: &str, target: &str) -> BuildResult<()> {
        self.run_checked(&self.tag_command(source, target)).await?;
        Ok(())
    }

    pub async fn push(&self, image: &str) -> BuildResult<()> {
        tracing::info!("Pushing image: {}", image);
        self.run_checked(&self.push_command(image)).await?;
        Ok(())
    }

    /// `image` をバックグラウンドで起動し `port:port` を公開。コンテナIDを返す
    pub async fn run_detached(&self, image: &str, port: u16) -> BuildResult<String> {
        let output = self.run_checked(&self.run_command(image, port)).await?;
        Ok(output.stdout_trimmed().to_string())
    }

    async fn run_checked(&self, spec: &CommandSpec) -> BuildResult<CommandOutput> {
        let output = self.runner.run(spec).await?;
        if !output.success {
            return Err(BuildError::CommandFailed {
                command: self.describe(spec),
                message: output.failure_message(),
            });
        }
        Ok(output)
    }

    /// エラーメッセージ用の `docker build` 形式のラベル
    fn describe(&self, spec: &CommandSpec) -> String {
        let args = if self.sudo {
            spec.args.get(1..).unwrap_or_default()
        } else {
            &spec.args[..]
        };
        match args.first() {
            Some(sub) => format!("{} {}", self.binary, sub),
            None => self.binary.clone(),
        }
    }
}

/// イメージID一覧の最初の空でない行
pub fn parse_image_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

/// ビルドコンテキストのデフォルトDockerfile
pub fn default_dockerfile(context: &Path) -> PathBuf {
    context.join("Dockerfile")
}

/// ビルド失敗時、パスの欠落が原因ならそれを示すエラーを返す
fn explain_build_failure(context: &Path, dockerfile: Option<&Path>) -> Option<BuildError> {
    if !context.is_dir() {
        return Some(BuildError::ContextNotFound(context.to_path_buf()));
    }
    match dockerfile {
        Some(path) if !path.is_file() => Some(BuildError::DockerfileNotFound(path.to_path_buf())),
        Some(_) => None,
        // エンジンは小文字の dockerfile も受け付ける
        None if !default_dockerfile(context).is_file() && !context.join("dockerfile").is_file() => {
            Some(BuildError::DockerfileNotFound(default_dockerfile(context)))
        }
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecrship_core::{OutputMode, RecordingRunner};
    use std::fs;

    fn docker_with(runner: RecordingRunner, sudo: bool) -> (DockerCli, Arc<RecordingRunner>) {
        let runner = Arc::new(runner);
        (DockerCli::new(runner.clone(), "docker", sudo), runner)
    }

    #[test]
    fn test_commands_without_sudo() {
        let (docker, _) = docker_with(RecordingRunner::new(), false);

        assert_eq!(
            docker.prune_command().command_line(),
            "docker system prune --all --force"
        );
        assert_eq!(
            docker
                .build_command("next-bedrock-app:latest", Path::new("."), None)
                .command_line(),
            "docker build -t next-bedrock-app:latest ."
        );
        assert_eq!(
            docker
                .build_command(
                    "web:v1",
                    Path::new("app"),
                    Some(Path::new("app/Dockerfile.prod"))
                )
                .command_line(),
            "docker build -t web:v1 -f app/Dockerfile.prod app"
        );
        assert_eq!(
            docker.image_id_command("next-bedrock-app:latest").command_line(),
            "docker images -q next-bedrock-app:latest"
        );
        assert_eq!(
            docker.run_command("next-bedrock-app:latest", 3000).command_line(),
            "docker run -d -p 3000:3000 next-bedrock-app:latest"
        );
    }

    #[test]
    fn test_commands_with_sudo() {
        let (docker, _) = docker_with(RecordingRunner::new(), true);

        let push = docker.push_command("repo/app:latest");
        assert_eq!(push.command_line(), "sudo docker push repo/app:latest");
        assert_eq!(push.output, OutputMode::Inherit);

        let login = docker.login_command("host.example", "pw");
        assert_eq!(
            login.command_line(),
            "sudo docker login --username AWS --password-stdin host.example"
        );
        assert_eq!(login.stdin.as_deref(), Some("pw"));
    }

    #[test]
    fn test_parse_image_id() {
        assert_eq!(parse_image_id("3f2a9c1b7d4e\n"), Some("3f2a9c1b7d4e".to_string()));
        assert_eq!(
            parse_image_id("\n  3f2a9c1b7d4e  \nab12cd34ef56\n"),
            Some("3f2a9c1b7d4e".to_string())
        );
        assert_eq!(parse_image_id(""), None);
        assert_eq!(parse_image_id("  \n"), None);
    }

    #[tokio::test]
    async fn test_image_id_trims_output() {
        let (docker, _) = docker_with(
            RecordingRunner::new().respond("images -q", CommandOutput::success("3f2a9c1b7d4e\n")),
            false,
        );
        assert_eq!(
            docker.image_id("next-bedrock-app:latest").await.unwrap(),
            "3f2a9c1b7d4e"
        );
    }

    #[tokio::test]
    async fn test_image_id_missing_image() {
        let (docker, _) = docker_with(RecordingRunner::new(), false);
        assert!(matches!(
            docker.image_id("next-bedrock-app:latest").await,
            Err(BuildError::ImageNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_login_sends_password_on_stdin() {
        let (docker, runner) = docker_with(RecordingRunner::new(), false);
        docker
            .login("123456789012.dkr.ecr.ap-southeast-1.amazonaws.com", "token")
            .await
            .unwrap();

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].stdin.as_deref(), Some("token"));
        assert!(!calls[0].command_line().contains("token"));
    }

    /// パスの検証より先にエンジンが呼ばれることを確認
    #[tokio::test]
    async fn test_build_runs_engine_for_missing_context() {
        let (docker, runner) = docker_with(
            RecordingRunner::new().respond("build", CommandOutput::failure(1, "")),
            false,
        );
        let result = docker
            .build("app:latest", Path::new("/nonexistent/context"), None)
            .await;
        assert!(matches!(result, Err(BuildError::ContextNotFound(_))));
        assert_eq!(
            runner.command_lines(),
            vec!["docker build -t app:latest /nonexistent/context"]
        );
    }

    #[tokio::test]
    async fn test_build_missing_dockerfile_hint_after_failure() {
        let temp_dir = tempfile::tempdir().unwrap();
        let (docker, runner) = docker_with(
            RecordingRunner::new().respond("build", CommandOutput::failure(1, "")),
            false,
        );

        let result = docker.build("app:latest", temp_dir.path(), None).await;
        assert!(matches!(result, Err(BuildError::DockerfileNotFound(p)) if p == default_dockerfile(temp_dir.path())));
        assert_eq!(runner.calls().len(), 1);
    }

    /// 小文字の dockerfile しかないコンテキストでもビルドできる
    #[tokio::test]
    async fn test_build_accepts_lowercase_dockerfile() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("dockerfile"), "FROM alpine\n").unwrap();
        let (docker, runner) = docker_with(RecordingRunner::new(), false);

        docker
            .build("app:latest", temp_dir.path(), None)
            .await
            .unwrap();
        assert_eq!(runner.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_build_failure_reports_command() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("Dockerfile"), "FROM alpine\n").unwrap();
        let (docker, _) = docker_with(
            RecordingRunner::new().respond("build", CommandOutput::failure(1, "")),
            true,
        );

        let err = docker
            .build("app:latest", temp_dir.path(), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "docker build failed: exited with status 1");
    }

    #[tokio::test]
    async fn test_daemon_hint() {
        let (docker, _) = docker_with(
            RecordingRunner::new().respond(
                "system prune",
                CommandOutput::failure(
                    1,
                    "Cannot connect to the Docker daemon at unix:///var/run/docker.sock.",
                ),
            ),
            false,
        );

        let err = docker.prune_all().await.unwrap_err();
        assert!(err.user_message().contains("--sudo"));
    }
}
