use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};

use ytbrief::AppError;
use ytbrief::app::App;
use ytbrief::cache::{DEFAULT_CAPACITY, TranscriptCache};
use ytbrief::export::{ArtifactKind, ExportCapability, Exporter};
use ytbrief::session::Session;
use ytbrief::summarize::{API_KEY_ENV, GeminiClient, TextGenerator};
use ytbrief::transcript::TranscriptRetriever;
use ytbrief::youtube::{CaptionSource, YouTubeCaptions};

mod cli;
mod repl;

use cli::Cli;
use repl::Command;

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytbrief.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytbrief")
        .join("logs")
}

fn build_after_help() -> String {
    let key_line = if std::env::var(API_KEY_ENV).is_ok_and(|k| !k.trim().is_empty()) {
        format!("  \x1b[32m✅\x1b[0m {API_KEY_ENV}")
    } else {
        format!("  \x1b[31m❌\x1b[0m {API_KEY_ENV}  (not set, required for summarization)")
    };

    let docx_line = match ExportCapability::detect() {
        ExportCapability::PlainTextAndDocument => "  \x1b[32m✅\x1b[0m Word export".to_string(),
        ExportCapability::PlainTextOnly => "  \x1b[31m❌\x1b[0m Word export  (built without the 'docx' feature)".to_string(),
    };

    let log_path = log_dir().join("ytbrief.log");

    format!(
        "\nREQUIREMENTS:\n{key_line}\n{docx_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytbrief::config::config_path().display(),
        log_path.display()
    )
}

fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Show a failure the way users see it; the detail goes to the log only
fn render_error(err: &AppError) {
    error!("{err}");
    eprintln!("\x1b[31m{}\x1b[0m", err.headline());
    eprintln!("Please try the following:");
    for (i, step) in err.remedies().iter().enumerate() {
        eprintln!("  {}. {step}", i + 1);
    }
}

fn print_summary(session: &Session, downloads: &[ArtifactKind]) {
    let Some(summary) = session.current_summary.as_deref() else {
        println!("No summary yet. Paste a YouTube link to get started.");
        return;
    };

    println!("\n# Blog Content:\n");
    if let Some(video_id) = &session.current_video_id {
        println!("Thumbnail: {}\n", ytbrief::thumbnail_url(video_id));
    }
    println!("{summary}\n");

    let formats = downloads.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
    println!("Downloads available: {formats} (use 'save')");
}

async fn get_content<S: CaptionSource, G: TextGenerator>(
    app: &mut App<S, G>,
    session: &mut Session,
    link: &str,
) -> Result<(), AppError> {
    let spinner = create_spinner();
    let result = app
        .get_content(session, link, |stage| spinner.set_message(stage.to_string()))
        .await;
    spinner.finish_and_clear();
    result
}

fn save<S: CaptionSource, G: TextGenerator>(
    app: &App<S, G>,
    session: &Session,
    kind: Option<ArtifactKind>,
    output_dir: &Path,
) -> Result<()> {
    let results = match kind {
        Some(kind) => app.download(session, kind).into_iter().collect::<Vec<_>>(),
        None => app.downloads(session),
    };

    if results.is_empty() {
        println!("Nothing to save yet. Summarize a video first.");
        return Ok(());
    }

    // a format that fails to render is reported, the rest are still written
    let mut artifacts = Vec::new();
    for result in results {
        match result {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => render_error(&e),
        }
    }

    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("creating output directory {}", output_dir.display()))?;

    for artifact in artifacts {
        let path = output_dir.join(artifact.filename);
        std::fs::write(&path, &artifact.bytes).wrap_err_with(|| format!("writing {}", path.display()))?;
        info!("Wrote {} ({}, {} bytes)", path.display(), artifact.mime, artifact.bytes.len());
        println!("Saved {}", path.display());
    }
    Ok(())
}

async fn run_repl<S: CaptionSource, G: TextGenerator>(
    app: &mut App<S, G>,
    session: &mut Session,
    output_dir: &Path,
    verbose: bool,
) -> Result<()> {
    println!("YouTube Content Summarizer. Paste a link, or type 'help'.");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let Some(command) = Command::parse(&line?) else {
            continue;
        };

        match command {
            Command::Get(link) => match get_content(app, session, &link).await {
                Ok(()) => {
                    print_summary(session, app.exporter().available());
                    if verbose {
                        eprintln!("Cached transcripts: {}", app.cached_transcripts());
                    }
                }
                Err(e) => render_error(&e),
            },
            Command::Show => print_summary(session, app.exporter().available()),
            Command::Save(kind) => {
                if let Err(e) = save(app, session, kind, output_dir) {
                    error!("Save failed: {e:#}");
                    eprintln!("Error saving download: {e:#}");
                }
            }
            Command::Clear => {
                app.clear_cache(session);
                println!("Cache cleared!");
            }
            Command::Help => println!("{}", repl::HELP),
            Command::Quit => break,
            Command::Unknown(input) => eprintln!("Unrecognized command: {input} (type 'help')"),
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    let after_help = build_after_help();
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // Load config file (non-fatal if missing/invalid)
    let config = ytbrief::config::Config::load().unwrap_or_default();

    if cli.verbose {
        let config_path = ytbrief::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
    }

    // CLI flags take priority over config values
    let model = cli.model.clone().unwrap_or_else(|| config.model().to_string());
    let mut policy = config.retry_policy();
    if let Some(max_retries) = cli.max_retries {
        policy.max_retries = max_retries;
    }
    let cache_size = cli.cache_size.or(config.cache_size).unwrap_or(DEFAULT_CAPACITY);
    let output_dir = cli
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let capability = if cli.no_docx {
        ExportCapability::PlainTextOnly
    } else {
        ExportCapability::detect()
    };

    let client = reqwest::Client::new();
    let generator = GeminiClient::from_env(client.clone(), model)?;
    info!(
        "Starting with model={} max_retries={} cache_size={cache_size} capability={capability:?}",
        generator.model(),
        policy.max_retries
    );

    let retriever = TranscriptRetriever::new(YouTubeCaptions::new(client), TranscriptCache::new(cache_size), policy);
    let mut app = App::new(retriever, generator, Exporter::new(capability));
    let mut session = Session::new();

    if let Some(notice) = app.exporter_mut().take_notice() {
        eprintln!("\x1b[33mwarning:\x1b[0m {notice}");
    }

    match cli.url {
        Some(ref url) => {
            if let Err(e) = get_content(&mut app, &mut session, url).await {
                render_error(&e);
                return Err(eyre::eyre!(e.headline()));
            }
            print_summary(&session, app.exporter().available());
            save(&app, &session, None, &output_dir)?;
        }
        None => run_repl(&mut app, &mut session, &output_dir, cli.verbose).await?,
    }

    Ok(())
}
