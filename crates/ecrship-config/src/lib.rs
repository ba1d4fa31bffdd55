pub mod error;
pub mod model;
pub mod validate;

pub use error::*;
pub use model::{
    ConfigOverrides, DEFAULT_APP_NAME, DEFAULT_LOCAL_PORT, DEFAULT_REGION, DEFAULT_TAG,
    DockerSettings, FailurePolicy, PublishConfig,
};

use std::path::{Path, PathBuf};

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_ENV: &str = "ECRSHIP_CONFIG";

const CANDIDATES: [&str; 3] = ["ecrship.local.yaml", "ecrship.yaml", ".ecrship.yaml"];

/// ecrship の設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ECRSHIP_CONFIG (指定時は存在必須)
/// 2. カレントディレクトリ: ecrship.local.yaml, ecrship.yaml, .ecrship.yaml
/// 3. ./.ecrship/ ディレクトリ内: 同様の順序
/// 4. ~/.config/ecrship/ecrship.yaml (グローバル設定)
///
/// 設定ファイルは任意。`Ok(None)` は組み込みのデフォルトを使うことを示す。
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::ConfigFileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let project_dir = current_dir.join(".ecrship");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(Some(path));
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let global_config = config_dir.join("ecrship").join("ecrship.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}

/// 設定ファイルを1つ読み込んでパース
pub fn load_config_file(path: &Path) -> Result<PublishConfig> {
    if !path.exists() {
        return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(PublishConfig::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// 有効な設定を解決する
///
/// デフォルト < 設定ファイル (明示指定または検索結果) < オーバーライド。
/// 設定と読み込んだファイルのパスを返す。
pub fn load_config(
    explicit: Option<&Path>,
    overrides: ConfigOverrides,
) -> Result<(PublishConfig, Option<PathBuf>)> {
    let source = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => find_config_file()?,
    };

    let mut config = match &source {
        Some(path) => {
            tracing::debug!("Loading config from {}", path.display());
            load_config_file(path)?
        }
        None => {
            tracing::debug!("No config file found, using defaults");
            PublishConfig::default()
        }
    };

    config.apply(overrides);
    config.validate()?;

    Ok((config, source))
}
