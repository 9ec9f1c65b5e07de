use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytbrief",
    about = "Summarize a YouTube video into a blog-style write-up",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    /// YouTube video URL or video ID (starts an interactive session if omitted)
    pub url: Option<String>,

    /// Directory downloads are written to
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Gemini model used for summarization
    #[arg(long)]
    pub model: Option<String>,

    /// Maximum number of transcripts kept in memory
    #[arg(long)]
    pub cache_size: Option<usize>,

    /// Direct transcript attempts before the caption track fallback
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Offer only the text download
    #[arg(long)]
    pub no_docx: bool,

    /// Show video and cache details
    #[arg(short, long)]
    pub verbose: bool,
}
