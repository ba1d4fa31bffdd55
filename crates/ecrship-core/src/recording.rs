//! 記録用ランナー
//!
//! 実行を依頼されたコマンドをすべて記録し、用意した出力を返す。
//! 一致する応答がないコマンドは空の出力で成功する。

use crate::command::{CommandOutput, CommandSpec};
use crate::error::Result;
use crate::runner::CommandRunner;
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Default)]
pub struct RecordingRunner {
    responses: Mutex<Vec<(String, CommandOutput)>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// コマンドラインに `pattern` を含むコマンドに `output` を返す
    ///
    /// 先に登録されたパターンが優先される。
    pub fn respond(self, pattern: impl Into<String>, output: CommandOutput) -> Self {
        self.push_response(pattern, output);
        self
    }

    fn push_response(&self, pattern: impl Into<String>, output: CommandOutput) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push((pattern.into(), output));
        }
    }

    /// 記録した呼び出し (呼び出し順)
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// 記録したコマンドライン (呼び出し順)
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }

    fn lookup(&self, spec: &CommandSpec) -> CommandOutput {
        let line = spec.command_line();
        self.responses
            .lock()
            .ok()
            .and_then(|responses| {
                responses
                    .iter()
                    .find(|(pattern, _)| line.contains(pattern.as_str()))
                    .map(|(_, output)| output.clone())
            })
            .unwrap_or_else(|| CommandOutput::success(""))
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }
        Ok(self.lookup(spec))
    }
}
