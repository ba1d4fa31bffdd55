//! ecrship の AWS 連携
//!
//! ECRへのpublishに必要な次の3つを `aws` CLI で扱う:
//!
//! - 呼び出し元のアカウントID (`sts get-caller-identity`)
//! - レジストリのログインパスワード (`ecr get-login-password`)
//! - 対象リポジトリ (`ecr create-repository`、既存のリポジトリは
//!   成功として扱う)
//!
//! # 必要なもの
//!
//! - PATH 上の `aws` CLI v2
//! - CLI が解決できる認証情報 (プロファイル、SSO、環境変数、インスタンスロール)

pub mod aws;
pub mod error;
pub mod registry;

pub use aws::{Aws, CallerIdentity, RepositoryOutcome};
pub use error::{AwsError, Result};
pub use registry::EcrRegistry;
