//! ecrship コンテナエンジン連携
//!
//! コンテナエンジンのCLI（`docker` や `podman` などの互換バイナリ）をラップし、
//! publish の build / login / tag / push ステップを提供する。

pub mod docker;
pub mod error;

pub use docker::{DockerCli, ECR_USERNAME, default_dockerfile, parse_image_id};
pub use error::{BuildError, BuildResult};
