use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};

use release_mirror::buildid::GoBuildIdExtractor;
use release_mirror::config::{DEFAULT_API_URL, MirrorConfig, read_token};
use release_mirror::logging::{self, LogSettings};
use release_mirror::mirror;
use release_mirror::remote::github::GitHubSource;

#[derive(Parser, Debug)]
#[command(name = "release-mirror")]
#[command(version, about = "Mirror a GitHub repository's releases and assets to local disk")]
struct Cli {
    /// File containing the GitHub access token
    #[arg(short = 'T', long)]
    token_file: PathBuf,

    /// Owner of the GitHub repository
    #[arg(short = 'O', long)]
    github_owner: String,

    /// Name of the GitHub repository
    #[arg(short = 'R', long)]
    github_repo: String,

    /// Directory receiving the index and release assets
    #[arg(short = 'd', long)]
    output_dir: PathBuf,

    /// Base URL of the GitHub REST API
    #[arg(long, default_value = DEFAULT_API_URL)]
    api_url: String,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let settings = LogSettings::from_env().context("Invalid logging configuration")?;
    let _guard = logging::init(&settings)?;

    let result = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli));
    Ok(ExitCode::from(exit_status(result)))
}

/// Log a failed run once and map it to the process exit status.
fn exit_status(result: anyhow::Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("Mirror run failed: {:#}", e);
            1
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let token = read_token(&cli.token_file)?;
    let config = MirrorConfig {
        api_url: cli.api_url,
        owner: cli.github_owner,
        repo: cli.github_repo,
        output_dir: cli.output_dir,
        token,
    };
    info!(
        owner = %config.owner,
        repo = %config.repo,
        output_dir = %config.output_dir.display(),
        "Starting mirror run"
    );

    let github = GitHubSource::from_config(&config)?;
    let extractor = GoBuildIdExtractor::default();
    let summary = mirror::run(&config, &github, &github, &extractor).await?;

    info!(
        releases = summary.releases,
        downloaded = summary.downloaded,
        build_ids = summary.build_ids,
        "Mirror run complete"
    );
    Ok(())
}
