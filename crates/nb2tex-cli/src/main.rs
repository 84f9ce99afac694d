//! nb2tex: CLI tool to convert Jupyter notebooks to LaTeX

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use config::{CONFIG_FILE_NAME, Config};
use nb2tex_batch::{OnError, convert_all, plan_jobs, prepare_image_dir};

#[derive(Parser, Debug)]
#[command(name = "nb2tex")]
#[command(about = "Convert Jupyter notebooks to LaTeX")]
#[command(version)]
#[command(after_help = "Examples:
  nb2tex                            # Convert every notebook in the current directory
  nb2tex nb.ipynb                   # Convert to nb.tex (and nb.bib)
  nb2tex nb.ipynb paper.tex figs/   # Custom output file and image directory
  nb2tex nb.ipynb -i -u             # Inline listings, \\url{} in references")]
struct Cli {
    /// Input notebook; all notebooks in the current directory when omitted
    input: Option<PathBuf>,

    /// Output LaTeX file (defaults to the input with a .tex extension)
    output: Option<PathBuf>,

    /// Directory for extracted images (default: ./pic/)
    image_dir: Option<String>,

    /// Place code listings in the text instead of a closing Listings chapter
    #[arg(short = 'i', long)]
    inline_listings: bool,

    /// Wrap URLs in \url{} in bibliography entries and link text
    #[arg(short = 'u', long)]
    url_command: bool,

    /// BibTeX style (default: IEEEtran)
    #[arg(long)]
    bibstyle: Option<String>,

    /// Configuration file (default: _nb2tex.toml in the current directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Continue with the remaining notebooks when one fails
    #[arg(long)]
    keep_going: bool,

    /// Verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Quiet mode - only show errors
    #[arg(short, long)]
    quiet: bool,

    /// Write a sample _nb2tex.toml to the current directory and exit
    #[arg(long, exclusive = true)]
    init_config: bool,

    /// Print the JSON schema of the configuration file and exit
    #[arg(long, exclusive = true)]
    schema: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.schema {
        println!("{}", Config::json_schema_string()?);
        return Ok(());
    }
    if cli.init_config {
        return init_config(Path::new(CONFIG_FILE_NAME), cli.quiet);
    }

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_from_dir(Path::new("."))?.unwrap_or_default(),
    };

    let mut options = config.convert_options();
    if cli.inline_listings {
        options.inline_listings = true;
    }
    if cli.url_command {
        options.url_command = true;
    }
    if let Some(style) = cli.bibstyle {
        options.bib_style = style;
    }
    let image_dir = cli.image_dir.or(config.images.dir);
    options.image_dir = prepare_image_dir(image_dir.as_deref())
        .context("Failed to create image directory")?;

    let jobs = plan_jobs(cli.input.as_deref(), cli.output.as_deref(), Path::new("."))?;
    if jobs.is_empty() {
        if !cli.quiet {
            eprintln!("No .ipynb files found in the current directory");
        }
        return Ok(());
    }
    tracing::debug!(count = jobs.len(), ?options, "planned jobs");

    let on_error = if cli.keep_going {
        OnError::KeepGoing
    } else {
        OnError::FailFast
    };
    let report = convert_all(&jobs, &options, on_error)?;

    if !cli.quiet {
        for output in &report.converted {
            println!("{}", output.tex.display());
            if let Some(bib) = &output.bibliography {
                println!("{}", bib.display());
            }
        }
    }

    for (file, e) in &report.failed {
        eprintln!("Error converting {}: {}", file.display(), e);
    }
    if !report.failed.is_empty() {
        if !cli.quiet {
            eprintln!(
                "Converted {} files, {} failed",
                report.converted.len(),
                report.failed.len()
            );
        }
        anyhow::bail!("{} files failed to convert", report.failed.len());
    }

    Ok(())
}

/// Install the tracing subscriber; `RUST_LOG` takes precedence over `-v`
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

fn init_config(path: &Path, quiet: bool) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Config file already exists: {}", path.display());
    }

    let content = Config::sample().to_toml()?;
    fs::write(path, content).with_context(|| format!("Failed to write: {}", path.display()))?;

    if !quiet {
        println!("{}", path.display());
    }
    Ok(())
}
