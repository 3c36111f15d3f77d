use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use konspekt_core::{
    Config, GeminiSummarizer, Pipeline, SummarizeOptions, SummaryOutcome, SummaryStore,
    TranscriptCache, YouTubeTranscriptSource, load_environment,
};

#[derive(Parser)]
#[command(name = "konspekt")]
#[command(about = "Fetch a YouTube video's transcript and summarize it with Gemini")]
struct Cli {
    /// YouTube video URL
    url: Option<String>,

    /// Summary language override (e.g. "en", "ru"). Defaults to the video's
    /// detected language.
    #[arg(short, long, env = "LANGUAGE")]
    language: Option<String>,

    /// Maximum number of tokens for the summary
    #[arg(long, env = "MAX_TOKENS")]
    max_tokens: Option<i64>,

    /// Directory to save summaries
    #[arg(long, env = "OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Do not save the summary to a file
    #[arg(long)]
    no_save: bool,

    /// Additional metadata as a JSON object string, e.g. '{"channel": "..."}'
    #[arg(long)]
    metadata: Option<String>,

    /// List available Gemini models and exit
    #[arg(long)]
    list_models: bool,

    /// List available transcript languages for the video and exit
    #[arg(long)]
    list_languages: bool,

    /// Remove saved summaries older than the given number of days and exit
    #[arg(long, value_name = "DAYS")]
    cleanup: Option<u64>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn parse_metadata(raw: Option<&str>) -> Result<BTreeMap<String, String>> {
    match raw {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("Invalid metadata JSON: {e}")),
        None => Ok(BTreeMap::new()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    load_environment();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            std::process::exit(1);
        }
    };

    if let Err(e) = run(cli, config).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let cache = TranscriptCache::new(config.transcript_cache_dir.clone());
    let source = YouTubeTranscriptSource::new(Some(config.youtube_api_key.clone()), cache)?;
    let summarizer = GeminiSummarizer::new(config.gemini_api_key.clone(), &config.gemini_model)?;
    let output_dir = cli.output_dir.clone().unwrap_or(config.output_dir.clone());
    let pipeline = Pipeline::new(source, summarizer, SummaryStore::new(output_dir));

    if cli.list_models {
        let models = pipeline.list_models().await?;
        println!("Available Gemini models:");
        for model in models {
            println!("- {model}");
        }
        return Ok(());
    }

    if let Some(days) = cli.cleanup {
        let removed = pipeline.store().cleanup_old(days)?;
        println!(
            "{} Removed {} old summary file(s)",
            style("✓").green().bold(),
            removed
        );
        return Ok(());
    }

    let Some(url) = cli.url.as_deref() else {
        anyhow::bail!("URL is required");
    };

    if cli.list_languages {
        let languages = pipeline.available_languages(url).await?;
        println!("Available transcript languages:");
        for language in languages {
            println!("- {language}");
        }
        return Ok(());
    }

    let metadata = parse_metadata(cli.metadata.as_deref())?;

    println!(
        "\n{}  {}\n",
        style("konspekt").cyan().bold(),
        style("YouTube Summarizer").dim()
    );

    let options = SummarizeOptions {
        language: cli.language.clone().or(config.language.clone()),
        max_tokens: cli.max_tokens.or(config.max_tokens),
        save_to_file: !cli.no_save,
        metadata,
        ..Default::default()
    };

    let spinner = create_spinner("Summarizing video...");
    let outcome = pipeline.summarize_video(url, &options).await;
    match outcome {
        Ok(SummaryOutcome::Text(summary)) => {
            spinner.finish_with_message(format!("{} Summary ready", style("✓").green().bold()));
            println!("{}", style("─".repeat(60)).dim());
            println!("{summary}");
            Ok(())
        }
        Ok(SummaryOutcome::Bundle(bundle)) => {
            // only reachable with include_transcript, which the CLI does not set
            spinner.finish_with_message(format!("{} Summary ready", style("✓").green().bold()));
            println!("{}", serde_json::to_string_pretty(&bundle)?);
            Ok(())
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}
