use std::path::PathBuf;
use std::sync::Arc;

use capture::FilePicker;
use clap::Parser;
use ideas::{Analyzer, HttpIdeaSource, Language};
use musecam::App;
use upload::ObjectStore;

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Photo to analyze (stands in for the camera / file picker)
    #[arg(long)]
    image: PathBuf,
    /// Output language for generated ideas (en, zh, fr, ja)
    #[arg(long, default_value = "en")]
    language: String,
    /// Identity-provider user id
    #[arg(long, env = "MUSECAM_USER", default_value = "local-user")]
    user_id: String,
    /// Idea-generation endpoint
    #[arg(long, env = "MUSECAM_ANALYZE_URL")]
    endpoint: String,
    /// Re-run analysis once against the cached image URL if the first pass fails
    #[arg(long)]
    retry: bool,
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = ObjectStore::from_env()?;
    let analyzer = Analyzer::new(Arc::new(HttpIdeaSource::new(&cli.endpoint)));
    let mut app = App::new(store, analyzer, cli.user_id, Language::parse(&cli.language));

    let mut ui = app.bus().subscribe();
    tokio::spawn(async move {
        while let Ok(event) = ui.recv().await {
            tracing::debug!(?event, "ui");
        }
    });

    let picker = FilePicker::new(&cli.image);
    if let Err(err) = app.run_once(&picker).await {
        if cli.retry && app.can_retry() {
            tracing::warn!(%err, "first pass failed, retrying");
            app.retry().await?;
        } else {
            return Err(err);
        }
    }
    Ok(())
}
