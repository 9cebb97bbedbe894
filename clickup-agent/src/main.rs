use anyhow::Context;
use clap::Parser;
use clickup::{ClickUpClient, ClickUpUrl};
use tracing_subscriber::EnvFilter;

use clickup_agent::cli::{Cli, Commands, SearchArgs, TaskArgs};
use clickup_agent::config::{config_directory, read_config, Settings};
use clickup_agent::domain::content::{ContentBlock, HttpImageFetcher, ImageBudget};
use clickup_agent::domain::search::{
    format_results, ClickUpRecordSource, SearchService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::from_filename(".env.local").ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,clickup_agent=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Commands::ConfigPath = cli.command {
        println!("{}", config_directory()?.display());
        return Ok(());
    }

    let settings = read_config().context("Failed to read configuration")?;
    let service = build_service(&settings)?;

    match cli.command {
        Commands::Search(args) => run_search(&service, &args).await,
        Commands::Task(args) => run_task(&service, &settings, &args).await,
        Commands::ConfigPath => Ok(()),
    }
}

fn build_service(settings: &Settings) -> anyhow::Result<SearchService<ClickUpRecordSource>> {
    if settings.clickup.api_token.is_empty() || settings.clickup.team_id.is_empty() {
        anyhow::bail!(
            "clickup.api_token and clickup.team_id must be set (CLICKUP_AGENT_CLICKUP__API_TOKEN, CLICKUP_AGENT_CLICKUP__TEAM_ID)"
        );
    }

    let client = ClickUpClient::with_base_url(
        ClickUpUrl::new(&settings.clickup.api_url),
        &settings.clickup.api_token,
        &settings.clickup.team_id,
    )
    .context("Failed to create ClickUp client")?;

    Ok(SearchService::new(
        ClickUpRecordSource::new(client),
        settings.search.to_search_config(),
    ))
}

async fn run_search(
    service: &SearchService<ClickUpRecordSource>,
    args: &SearchArgs,
) -> anyhow::Result<()> {
    let request = args.to_request();
    let results = service.search(&request).await.context("Search failed")?;
    println!("{}", format_results(&request, &results));
    Ok(())
}

async fn run_task(
    service: &SearchService<ClickUpRecordSource>,
    settings: &Settings,
    args: &TaskArgs,
) -> anyhow::Result<()> {
    let defaults = settings.images.budget();
    let budget = match args.max_size_mb {
        Some(mb) => ImageBudget::from_megabytes(args.max_images.unwrap_or(defaults.max_count), mb),
        None => ImageBudget::new(
            args.max_images.unwrap_or(defaults.max_count),
            defaults.max_total_bytes,
        ),
    };

    let fetcher = HttpImageFetcher::new(settings.images.request_timeout())
        .context("Failed to create image fetcher")?;
    let blocks = service
        .task_content(&args.id, &budget, &fetcher)
        .await
        .with_context(|| format!("Failed to load task {}", args.id))?;

    for block in &blocks {
        match block {
            ContentBlock::Text { text } => println!("{text}\n"),
            ContentBlock::Image { data, mime_type } => {
                println!("[{mime_type} image, {} base64 characters]\n", data.len())
            }
            ContentBlock::ImageRef(reference) => println!("[unresolved image: {}]\n", reference.alt),
        }
    }
    Ok(())
}
