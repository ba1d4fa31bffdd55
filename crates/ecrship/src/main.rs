mod commands;
mod publish;

use clap::{Args, Parser, Subcommand};
use ecrship_config::ConfigOverrides;
use ecrship_core::{CommandRunner, ProcessRunner};
use publish::Publisher;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ecrship")]
#[command(about = "Build a container image and publish it to Amazon ECR", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct GlobalOptions {
    /// 設定ファイル (デフォルト: カレントディレクトリから ecrship.yaml を検索)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// レジストリのあるAWSリージョン
    #[arg(short, long, env = "ECRSHIP_REGION", global = true)]
    region: Option<String>,
    /// アプリケーション名 (イメージ名とリポジトリ名に使用)
    #[arg(short, long, env = "ECRSHIP_APP", global = true)]
    app: Option<String>,
    /// イメージタグ
    #[arg(short, long, env = "ECRSHIP_TAG", global = true)]
    tag: Option<String>,
    /// ビルドコンテキストのディレクトリ
    #[arg(long, global = true)]
    context: Option<PathBuf>,
    /// Dockerfile のパス
    #[arg(short = 'f', long, global = true)]
    dockerfile: Option<PathBuf>,
    /// AWSアカウントID (caller identity の問い合わせを省略)
    #[arg(long, env = "ECRSHIP_ACCOUNT_ID", global = true)]
    account_id: Option<String>,
    /// コンテナエンジンのバイナリ
    #[arg(long, global = true)]
    docker_bin: Option<String>,
    /// sudo 経由でコンテナエンジンを実行
    #[arg(long, global = true)]
    sudo: bool,
    /// ローカルのイメージとビルドキャッシュを残す (prune ステップを省略)
    #[arg(long, global = true)]
    no_prune: bool,
    /// 失敗しても残りのステップを実行
    #[arg(long, global = true)]
    keep_going: bool,
    /// デバッグログを出力
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// ビルド、ログイン、タグ付け、リポジトリ作成、プッシュ (デフォルト)
    Publish {
        /// prune ステップを承認 (未使用のローカルイメージをすべて削除)
        #[arg(short, long)]
        yes: bool,
    },
    /// publish が実行するコマンドを表示 (実行はしない)
    Plan,
    /// レジストリのイメージURIを表示
    Uri,
    /// ローカルでビルドしたイメージをバックグラウンドで起動
    Run {
        /// ホストとコンテナで公開するポート
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// バージョン情報を表示
    Version,
}

impl GlobalOptions {
    fn overrides(&self, local_port: Option<u16>) -> ConfigOverrides {
        ConfigOverrides {
            region: self.region.clone(),
            app_name: self.app.clone(),
            tag: self.tag.clone(),
            context: self.context.clone(),
            dockerfile: self.dockerfile.clone(),
            account_id: self.account_id.clone(),
            docker_binary: self.docker_bin.clone(),
            sudo: self.sudo,
            no_prune: self.no_prune,
            keep_going: self.keep_going,
            local_port,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.options.verbose);

    let command = cli.command.unwrap_or(Commands::Publish { yes: false });

    // versionコマンドは設定ファイル不要
    if matches!(command, Commands::Version) {
        println!("ecrship {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let local_port = match command {
        Commands::Run { port } => port,
        _ => None,
    };
    let (config, source) = ecrship_config::load_config(
        cli.options.config.as_deref(),
        cli.options.overrides(local_port),
    )?;

    let runner: Arc<dyn CommandRunner> = Arc::new(ProcessRunner::new());
    let publisher = Publisher::new(config, runner);

    match command {
        Commands::Publish { yes } => {
            commands::publish::handle(&publisher, source.as_deref(), yes).await
        }
        Commands::Plan => {
            commands::plan::handle(&publisher, source.as_deref());
            Ok(())
        }
        Commands::Uri => commands::uri::handle(&publisher).await,
        Commands::Run { .. } => commands::run::handle(&publisher).await,
        Commands::Version => Ok(()),
    }
}
