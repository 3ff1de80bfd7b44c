use activity_feed::render::{render_json, render_text};
use activity_feed::{AggregationStrategy, FeedConfig, FetchConfig, RepositorySelector, RestClient, Session};
use anyhow::{bail, Context};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Show recent activity of selected repositories as one feed.
#[derive(Parser, Debug)]
#[command(name = "activity-feed", version)]
struct Args {
    /// Personal access token used for every request
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Repository to include, in the form owner/name; repeat for more
    #[arg(short, long = "repo", value_name = "OWNER/NAME")]
    repos: Vec<RepositorySelector>,

    /// Include every repository of the authenticated user
    #[arg(long, conflicts_with = "repos")]
    all: bool,

    /// List the repositories of the authenticated user and exit
    #[arg(long)]
    list: bool,

    /// Print the feed as JSON
    #[arg(long)]
    json: bool,

    /// Keep going when a repository cannot be fetched
    #[arg(long)]
    partial: bool,

    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com/")]
    api_url: String,

    #[arg(long, default_value = "https://github.com/")]
    web_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let fetch_config = FetchConfig {
        api_base_url: args.api_url.clone(),
        ..FetchConfig::default()
    };
    let feed_config = FeedConfig {
        web_base_url: args.web_url.clone(),
        strategy: if args.partial {
            AggregationStrategy::Partial
        } else {
            AggregationStrategy::FailFast
        },
    };

    let client = RestClient::new(fetch_config, args.token.clone()).context("Failed to create API client")?;
    let mut session = Session::new(Arc::new(client), feed_config);

    if args.list || args.all {
        session
            .load_repositories()
            .await
            .context("Failed to list repositories; check the access token")?;
    }

    if args.list {
        for repo in session.selection().available() {
            println!("{}", repo.full_name);
        }
        return Ok(());
    }

    let selection = if args.all {
        session.selection().select_all()
    } else {
        session.selection().with_selected(args.repos.clone())
    };
    if selection.selected().is_empty() {
        bail!("No repositories selected; pass --repo OWNER/NAME or --all");
    }
    session.set_selection(selection);

    info!("Loading activity for {} repositories", session.selection().selected().len());
    let feed = session.refresh_feed().await.context("Failed to load activity")?;

    if args.json {
        println!("{}", render_json(&feed)?);
    } else {
        print!("{}", render_text(&feed));
    }

    Ok(())
}
