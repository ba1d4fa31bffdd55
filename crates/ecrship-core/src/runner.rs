//! コマンドランナー

use crate::command::{CommandOutput, CommandSpec, OutputMode};
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// 外部コマンドを実行する
///
/// この層では非ゼロの終了ステータスはエラーにしない。呼び出し側が
/// [`CommandOutput::success`] を確認する。エラーはプロセスを起動できなかった場合のみ。
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// 子プロセスとしてコマンドを実行
#[derive(Debug, Default, Clone)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        tracing::debug!("Running: {}", spec);

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });
        match spec.output {
            OutputMode::Capture => {
                cmd.stdout(Stdio::piped());
                cmd.stderr(Stdio::piped());
            }
            OutputMode::Inherit => {
                cmd.stdout(Stdio::inherit());
                cmd.stderr(Stdio::inherit());
            }
        }

        let mut child = cmd.spawn().map_err(|e| spawn_error(&spec.program, e))?;

        if let Some(input) = &spec.stdin
            && let Some(mut stdin) = child.stdin.take()
        {
            match stdin.write_all(input.as_bytes()).await {
                Ok(()) => {}
                // stdinを読まずに終了した。結果は終了ステータスで判断する
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::debug!("{} closed stdin early", spec.program);
                }
                Err(e) => return Err(spawn_error(&spec.program, e)),
            }
            // EOFを伝えるために閉じる
            drop(stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| spawn_error(&spec.program, e))?;

        let result = CommandOutput {
            code: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        if !result.success {
            tracing::debug!("{} failed: {}", spec.program, result.failure_message());
        }

        Ok(result)
    }
}

fn spawn_error(program: &str, source: std::io::Error) -> CoreError {
    if source.kind() == std::io::ErrorKind::NotFound {
        CoreError::ProgramNotFound(program.to_string())
    } else {
        CoreError::Spawn {
            program: program.to_string(),
            source,
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(&CommandSpec::new("echo").arg("hello"))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.code, Some(0));
        assert_eq!(output.stdout, "hello\n");
        assert_eq!(output.stdout_trimmed(), "hello");
    }

    #[tokio::test]
    async fn test_writes_stdin() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(&CommandSpec::new("cat").stdin("from stdin"))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout, "from stdin");
    }

    /// stdinを読まずに終了したプロセスでも本来のstderrと終了コードを返す
    #[tokio::test]
    async fn test_child_exiting_before_reading_stdin() {
        let runner = ProcessRunner::new();
        let input = "x".repeat(1024 * 1024);
        let output = runner
            .run(
                &CommandSpec::new("sh")
                    .args(["-c", "echo login refused >&2; exit 3"])
                    .stdin(input),
            )
            .await
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stderr.trim(), "login refused");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let runner = ProcessRunner::new();
        let output = runner.run(&CommandSpec::new("false")).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(1));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let runner = ProcessRunner::new();
        let result = runner
            .run(&CommandSpec::new("ecrship-definitely-not-installed"))
            .await;
        assert!(matches!(result, Err(CoreError::ProgramNotFound(p)) if p == "ecrship-definitely-not-installed"));
    }
}
