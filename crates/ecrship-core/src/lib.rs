//! ecrship コア
//!
//! ecrship の外部への作用はすべて外部CLI (`aws`, `docker`) を通る。
//! このクレートはその境界を持つ: [`CommandSpec`] が1回の呼び出しを記述し、
//! [`CommandRunner`] がそれを実行する。
//!
//! - [`ProcessRunner`] は `tokio::process` で実際のプロセスを実行
//! - [`RecordingRunner`] は呼び出しを記録して用意した出力を返す。
//!   ラッパークレートと publish 手順のテストで使用

pub mod command;
pub mod error;
pub mod recording;
pub mod runner;

pub use command::{CommandOutput, CommandSpec, OutputMode};
pub use error::{CoreError, Result};
pub use recording::RecordingRunner;
pub use runner::{CommandRunner, ProcessRunner};
