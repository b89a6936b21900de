mod fetch;
mod output;
mod parser;

use std::panic;
use std::time::{Duration, Instant};

use anyhow::anyhow;
use clap::Parser;
use tracing::info;

use fetch::FetchConfig;
use output::OutputFormat;
use parser::SongPage;

#[derive(Parser)]
#[command(
    name = "karnatik_scraper",
    about = "Extract title, raga, tala, composer and lyrics from a karnatik.com song page"
)]
struct Cli {
    /// Song page URL, or a path to a saved HTML page
    source: String,

    /// User-Agent header sent with the request
    #[arg(long, default_value = "Mozilla/5.0")]
    user_agent: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Category written into backup output
    #[arg(long, default_value = "Carnatic")]
    category: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so json/backup output on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let config = FetchConfig {
        user_agent: cli.user_agent,
        timeout: Duration::from_secs(cli.timeout),
    };
    let html = fetch::load_source(&config, &cli.source).await?;
    let fetched_at = chrono::Utc::now();

    let page = extract_guarded(&html)?;

    match cli.format {
        OutputFormat::Text => print!("{}", output::render_text(&page)),
        OutputFormat::Json => println!("{}", output::render_json(&page, &cli.source, fetched_at)?),
        OutputFormat::Backup => println!("{}", output::render_backup(&page, &cli.category)?),
    }

    info!("Done in {:.2}s", t0.elapsed().as_secs_f64());
    Ok(())
}

/// Run extraction, turning a panic anywhere in the traversal into an error.
fn extract_guarded(html: &str) -> anyhow::Result<SongPage> {
    match panic::catch_unwind(|| parser::extract_song_from_str(html)) {
        Ok(result) => Ok(result?),
        Err(_) => Err(anyhow!("extraction aborted unexpectedly")),
    }
}
