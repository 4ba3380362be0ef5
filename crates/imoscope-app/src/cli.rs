use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for imoscope
#[derive(Parser, Debug)]
#[command(name = "imoscope")]
#[command(about = "ImoScope - upload an image and chat about it")]
#[command(version)]
pub struct Cli {
    /// Base URL of the analysis service
    #[arg(
        long,
        value_name = "URL",
        env = "IMOSCOPE_API_URL",
        default_value = "http://localhost:3000"
    )]
    pub api_url: String,

    /// Attach this image on startup (PNG or JPEG)
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Run a single analysis non-interactively and exit (requires --image)
    #[arg(long, value_name = "TEXT")]
    pub prompt: Option<String>,

    /// Export the transcript to PDF before exiting (with --prompt)
    #[arg(long)]
    pub export: bool,

    /// Directory where exported PDFs are written
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub export_dir: PathBuf,
}
