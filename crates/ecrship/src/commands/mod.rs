pub mod plan;
pub mod publish;
pub mod run;
pub mod uri;

use colored::Colorize;
use ecrship_config::{FailurePolicy, PublishConfig};
use std::path::Path;

/// 設定の読み込み元と主な値を表示
pub fn print_config_summary(config: &PublishConfig, source: Option<&Path>) {
    match source {
        Some(path) => println!("📄 Config: {}", path.display().to_string().cyan()),
        None => println!("📄 Config: {}", "(built-in defaults)".dimmed()),
    }
    println!("Region: {}", config.region.cyan());
    println!("Image: {}", config.local_image().cyan());
    println!("Context: {}", config.context.display().to_string().cyan());
    if config.docker.sudo {
        println!("Engine: {} {}", "sudo".yellow(), config.docker.binary);
    } else if config.docker.binary != "docker" {
        println!("Engine: {}", config.docker.binary);
    }
    if config.on_failure == FailurePolicy::Continue {
        println!("{}", "Failures will not stop the run (--keep-going)".yellow());
    }
}
