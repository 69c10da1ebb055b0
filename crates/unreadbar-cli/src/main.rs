use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use unreadbar_api::SlackClient;
use unreadbar_core::{mark, Config, IconVariant, MarkRequest, Notifier, Renderer};

#[derive(Parser)]
#[command(name = "unreadbar")]
#[command(version, about = "Unread Slack conversations across workspaces, for the menu bar", long_about = None)]
struct Cli {
    /// Mark conversations as read instead of printing the report
    #[arg(long)]
    mark: bool,

    /// Token of the workspace to mark in (mark mode only)
    #[arg(long)]
    token: Option<String>,

    /// Verbose diagnostics on stderr
    #[arg(long)]
    debug: bool,

    /// Config file (defaults to <config dir>/unreadbar/config.toml)
    #[arg(long, env = "UNREADBAR_CONFIG")]
    config: Option<PathBuf>,

    /// `<kind>=<id1,id2,...>` targets for --mark, kind is im, groups or channels
    targets: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout belongs to the menu bar host, so logs go to stderr
    let default_filter = if cli.debug { "unreadbar=debug" } else { "unreadbar=warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        // Mark actions only need the API settings; a broken file shouldn't strand them
        Err(e) if cli.mark => {
            tracing::warn!("{:#}; marking with default settings", e);
            Config::default()
        }
        Err(e) => return Err(e),
    };

    let client = SlackClient::build(
        config.api.base_url.clone(),
        config.api.timeout(),
        &config.api.user_agent,
    )
    .context("Failed to set up the Slack client")?;

    if cli.mark {
        return mark_as_read(client, &cli).await;
    }

    let tokens = config.active_tokens();
    tracing::info!("Checking {} workspaces", tokens.len());

    let notifier = Notifier::from_config(Arc::new(client), &config.aggregation);
    let report = notifier.run(&tokens).await;

    let dark_mode = dark_mode_from_env().unwrap_or(config.display.dark_mode);
    let icon = IconVariant::select(report.unread_total, dark_mode);
    let script = config.display.script_path.clone().unwrap_or_else(self_path);

    print!("{}", Renderer::new(script, config.display).render(&report, icon));
    Ok(())
}

async fn mark_as_read(client: SlackClient, cli: &Cli) -> anyhow::Result<()> {
    println!("Mark as read");

    // No token means nothing to do, and nothing gets sent
    let request = MarkRequest::from_args(cli.token.as_deref(), &cli.targets)?;

    for (kind, id) in request.pairs() {
        println!("/{} ({})", kind.mark_method(), id);
    }

    let outcome = mark::mark_read(&client, &request, chrono::Utc::now().timestamp()).await;
    for failure in &outcome.failed {
        eprintln!("Failed: {}", failure);
    }
    tracing::info!("Marked {} conversations as read", outcome.marked.len());
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("Failed to load config")
}

/// `BitBarDarkMode` is set by the host when the menu bar is dark
fn dark_mode_from_env() -> Option<bool> {
    std::env::var("BitBarDarkMode")
        .ok()
        .map(|v| !matches!(v.trim(), "" | "0" | "false"))
}

/// Path the host should run to get back here
fn self_path() -> String {
    std::env::current_exe()
        .map(|p| p.display().to_string())
        .or_else(|_| std::env::args().next().ok_or(()))
        .unwrap_or_else(|_| "unreadbar".to_string())
}
