use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{mpsc, watch};
use tracing::info;

use seomatic::config::{ArticleConfig, Audience, Intent, Language, Length, Tone};
use seomatic::pipeline::{self, Snapshot};
use seomatic::session::{self, Session};
use seomatic::{analysis, gemini, images};

#[derive(Parser)]
#[command(name = "seomatic", about = "Streaming SEO article writer (Gemini)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an article from a keyword, streaming live
    Generate {
        /// Main keyword / topic
        keyword: String,
        /// Comma-separated secondary (LSI) keywords
        #[arg(long, default_value = "")]
        secondary_keywords: String,
        #[arg(long, value_enum, default_value = "informational")]
        intent: Intent,
        #[arg(long, value_enum, default_value = "beginners")]
        audience: Audience,
        #[arg(long, value_enum, default_value = "standard")]
        length: Length,
        #[arg(long, value_enum, default_value = "english")]
        language: Language,
        #[arg(long, value_enum, default_value = "professional")]
        tone: Tone,
        /// Ask for a clickbait / high-CTR title instead of a plain SEO one
        #[arg(long)]
        clickbait: bool,
        /// Skip image-placeholder markers in the prompt
        #[arg(long)]
        no_images: bool,
        /// Skip the closing FAQ section
        #[arg(long)]
        no_faq: bool,
        /// Resolve image placeholders before export (extra API calls)
        #[arg(long)]
        fetch_images: bool,
        /// Output file (default: article-<timestamp>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Normalize a raw model dump and report document stats
    Process {
        /// Input file with raw (possibly markdown-leaking) model output
        input: PathBuf,
        /// Write the normalized HTML here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Outline, metadata and keyword stats for an existing HTML file
    Analyze {
        input: PathBuf,
        #[arg(short, long, default_value = "")]
        keyword: String,
        /// Emit the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            keyword,
            secondary_keywords,
            intent,
            audience,
            length,
            language,
            tone,
            clickbait,
            no_images,
            no_faq,
            fetch_images,
            output,
        } => {
            let config = ArticleConfig {
                keyword,
                secondary_keywords,
                intent,
                audience,
                length,
                language,
                tone,
                clickbait,
                include_images: !no_images,
                include_faq: !no_faq,
            };
            generate(config, fetch_images, output).await
        }
        Commands::Process { input, output } => process(&input, output.as_deref()),
        Commands::Analyze { input, keyword, json } => analyze(&input, &keyword, json),
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

async fn generate(config: ArticleConfig, fetch_images: bool, output: Option<PathBuf>) -> Result<()> {
    let mut session = Session::new();
    if !session.start(&config.keyword) {
        anyhow::bail!("Keyword must not be empty");
    }

    let client = reqwest::Client::new();
    let (tx, rx) = mpsc::channel(32);
    let (snap_tx, mut snap_rx) = watch::channel(Snapshot::default());

    let producer = tokio::spawn(gemini::stream_article(client.clone(), config.clone(), tx));

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb.set_message("waiting for first chunk...");
    let spinner = {
        let pb = pb.clone();
        tokio::spawn(async move {
            while snap_rx.changed().await.is_ok() {
                let words = snap_rx.borrow().stats.word_count;
                pb.set_message(format!("{} words", words));
            }
        })
    };

    let outcome = session::drive(&mut session, rx, snap_tx).await;
    let _ = spinner.await;
    let _ = producer.await;
    pb.finish_and_clear();

    if let Err(e) = outcome {
        eprintln!("Generation failed: {}. Keeping partial article.", e);
    }

    let mut store = images::ImageStore::new();
    if fetch_images {
        images::fetch_all(&client, &mut store, &session.snapshot().segments).await;
    }
    let html = images::render_html(session.export(), &store);

    let path = output.unwrap_or_else(|| {
        PathBuf::from(format!(
            "article-{}.html",
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        ))
    });
    std::fs::write(&path, &html)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {} bytes to {}", html.len(), path.display());

    print_report(session.snapshot(), &config.keyword);
    println!("\nSaved to {}", path.display());
    Ok(())
}

fn process(input: &PathBuf, output: Option<&std::path::Path>) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let snap = pipeline::run(&raw);

    print_report(&snap, "");
    if let Some(path) = output {
        std::fs::write(path, &snap.html)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("\nNormalized HTML written to {}", path.display());
    }
    Ok(())
}

fn analyze(input: &PathBuf, keyword: &str, json: bool) -> Result<()> {
    let html = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let snap = pipeline::run(&html);

    if json {
        let density = analysis::keyword_density(&snap.html, keyword, snap.stats.word_count);
        let report = serde_json::json!({
            "title": snap.stats.title,
            "description": snap.stats.description,
            "word_count": snap.stats.word_count,
            "reading_time_min": analysis::reading_time(snap.stats.word_count),
            "keyword_density": density,
            "health": analysis::ContentHealth::score(&snap.stats, density),
            "outline": snap.stats.outline,
            "segments": snap.segments,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&snap, keyword);
    }
    Ok(())
}

fn print_report(snap: &Snapshot, keyword: &str) {
    let stats = &snap.stats;

    println!("\n--- Article ---");
    if !stats.title.is_empty() {
        println!("Title:       {}", stats.title);
    }
    if !stats.description.is_empty() {
        println!("Description: {}", stats.description);
    }
    println!("Words:       {}", stats.word_count);
    println!("Read time:   {} min", analysis::reading_time(stats.word_count));

    if !keyword.is_empty() {
        let density = analysis::keyword_density(&snap.html, keyword, stats.word_count);
        let health = analysis::ContentHealth::score(stats, density);
        println!("Density:     {:.2}% (target 1.5-2.5%)", density);
        println!(
            "Health:      readability {} | structure {} | keywords {} | length {}",
            health.readability, health.structure, health.keywords, health.length
        );
    }

    let placeholders = snap
        .segments
        .iter()
        .filter(|s| matches!(s, pipeline::segments::Segment::Image { .. }))
        .count();
    if placeholders > 0 {
        println!("Images:      {} placeholder(s)", placeholders);
    }

    if !stats.outline.is_empty() {
        println!("\n--- Outline ---");
        for entry in &stats.outline {
            let indent = if entry.level == 3 { "    " } else { "  " };
            println!("{}{}", indent, entry.text);
        }
    }
}
