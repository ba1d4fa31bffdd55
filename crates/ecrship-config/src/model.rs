//! publish 設定モデル

use crate::error::Result;
use crate::validate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "ap-southeast-1";
pub const DEFAULT_APP_NAME: &str = "next-bedrock-app";
pub const DEFAULT_TAG: &str = "latest";
pub const DEFAULT_LOCAL_PORT: u16 = 3000;

/// publish 手順に必要なすべての設定
///
/// 一度だけ読み込まれ (デフォルト、設定ファイル、CLI/環境変数の順)、
/// 手順の開始後は変更されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// レジストリのあるAWSリージョン
    pub region: String,
    /// ローカルイメージ名とECRリポジトリ名
    pub app_name: String,
    pub tag: String,
    /// ビルドコンテキストのディレクトリ
    pub context: PathBuf,
    /// Dockerfile のパス。未指定ならエンジンのデフォルト (`{context}/Dockerfile`)
    pub dockerfile: Option<PathBuf>,
    /// 指定時は caller identity の問い合わせを省略してこのアカウントを使う
    pub account_id: Option<String>,
    pub docker: DockerSettings,
    /// ビルド前に未使用のイメージとビルドキャッシュをすべて削除
    pub prune: bool,
    pub on_failure: FailurePolicy,
    /// `ecrship run` で公開するポート
    pub local_port: u16,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            tag: DEFAULT_TAG.to_string(),
            context: PathBuf::from("."),
            dockerfile: None,
            account_id: None,
            docker: DockerSettings::default(),
            prune: true,
            on_failure: FailurePolicy::default(),
            local_port: DEFAULT_LOCAL_PORT,
        }
    }
}

/// コンテナエンジンCLIの設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockerSettings {
    /// エンジンのバイナリ (`docker`, `podman`, ...)
    pub binary: String,
    /// `sudo` 経由でエンジンを実行
    pub sudo: bool,
}

impl Default for DockerSettings {
    fn default() -> Self {
        Self {
            binary: "docker".to_string(),
            sudo: false,
        }
    }
}

/// ステップ失敗時の挙動
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// 最初に失敗したステップで停止
    #[default]
    Halt,
    /// 失敗を記録して残りのステップも実行
    Continue,
}

/// コマンドラインまたは環境変数で指定された値
///
/// `None`/`false` は読み込んだ値をそのまま残す。
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub region: Option<String>,
    pub app_name: Option<String>,
    pub tag: Option<String>,
    pub context: Option<PathBuf>,
    pub dockerfile: Option<PathBuf>,
    pub account_id: Option<String>,
    pub docker_binary: Option<String>,
    pub sudo: bool,
    pub no_prune: bool,
    pub keep_going: bool,
    pub local_port: Option<u16>,
}

impl PublishConfig {
    pub fn apply(&mut self, overrides: ConfigOverrides) {
        if let Some(region) = overrides.region {
            self.region = region;
        }
        if let Some(app_name) = overrides.app_name {
            self.app_name = app_name;
        }
        if let Some(tag) = overrides.tag {
            self.tag = tag;
        }
        if let Some(context) = overrides.context {
            self.context = context;
        }
        if let Some(dockerfile) = overrides.dockerfile {
            self.dockerfile = Some(dockerfile);
        }
        if let Some(account_id) = overrides.account_id {
            self.account_id = Some(account_id.trim().to_string());
        }
        if let Some(binary) = overrides.docker_binary {
            self.docker.binary = binary;
        }
        if overrides.sudo {
            self.docker.sudo = true;
        }
        if overrides.no_prune {
            self.prune = false;
        }
        if overrides.keep_going {
            self.on_failure = FailurePolicy::Continue;
        }
        if let Some(port) = overrides.local_port {
            self.local_port = port;
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate::validate_region(&self.region)?;
        validate::validate_app_name(&self.app_name)?;
        validate::validate_tag(&self.tag)?;
        if let Some(account_id) = &self.account_id {
            validate::validate_account_id(account_id)?;
        }
        Ok(())
    }

    /// ローカルイメージの参照 `{app}:{tag}`
    pub fn local_image(&self) -> String {
        format!("{}:{}", self.app_name, self.tag)
    }
}
