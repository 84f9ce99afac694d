//! nb2tex-batch: File-level operations for notebook to LaTeX conversion
//!
//! This crate provides:
//! - Job planning for a single notebook or every notebook in a directory
//! - Image directory preparation
//! - Conversion of jobs to `.tex` (and `.bib`) files on disk
//!
//! Notebooks are converted one after another; each gets its own document
//! context, so citations never leak between files.

use nb2tex_core::{ConvertError, ConvertOptions, DirectorySink, DocumentNames, convert_notebook};
use std::fs;
use std::path::{Path, PathBuf};

/// Image directory used when none is given
pub const DEFAULT_IMAGE_DIR: &str = "./pic/";

const NOTEBOOK_EXTENSION: &str = "ipynb";

/// Errors that can occur during batch operations
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid notebook filename {0}")]
    NotANotebook(PathBuf),

    #[error("Parse error in {file}: {source}")]
    Parse {
        file: PathBuf,
        #[source]
        source: nb_parser::ParseError,
    },

    #[error("Conversion error in {file}: {source}")]
    Convert {
        file: PathBuf,
        #[source]
        source: ConvertError,
    },
}

/// Result type for batch operations
pub type Result<T> = std::result::Result<T, BatchError>;

/// One notebook to convert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub input: PathBuf,
    /// LaTeX output; the bibliography is written next to it
    pub output: PathBuf,
}

impl Job {
    pub fn bib_path(&self) -> PathBuf {
        self.output.with_extension("bib")
    }
}

/// Files produced by one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobOutput {
    pub tex: PathBuf,
    pub bibliography: Option<PathBuf>,
    /// Number of images extracted
    pub images: usize,
}

/// What to do when a notebook fails to convert
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OnError {
    /// Stop at the first failure
    #[default]
    FailFast,
    /// Record the failure and continue with the next notebook
    KeepGoing,
}

/// Outcome of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub converted: Vec<JobOutput>,
    /// Notebooks that failed, with their errors (only with [`OnError::KeepGoing`])
    pub failed: Vec<(PathBuf, BatchError)>,
}

/// Normalize the image directory and make sure it exists
///
/// The returned path always ends with a separator, so image names can be
/// appended to it directly in `\includegraphics` paths.
pub fn prepare_image_dir(dir: Option<&str>) -> Result<String> {
    let mut dir = dir.unwrap_or(DEFAULT_IMAGE_DIR).to_string();
    if !dir.ends_with('/') && !dir.ends_with('\\') {
        dir.push('/');
    }
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Decide which notebooks to convert and where to write them
///
/// With an explicit input the output defaults to the input with a `.tex`
/// extension. Without one, every notebook directly inside `search_dir` is
/// converted (not recursive), in name order, and `output` is ignored.
pub fn plan_jobs(input: Option<&Path>, output: Option<&Path>, search_dir: &Path) -> Result<Vec<Job>> {
    match input {
        Some(input) => {
            if !is_notebook(input) {
                return Err(BatchError::NotANotebook(input.to_path_buf()));
            }
            let output = output
                .map(Path::to_path_buf)
                .unwrap_or_else(|| input.with_extension("tex"));
            Ok(vec![Job {
                input: input.to_path_buf(),
                output,
            }])
        }
        None => {
            let mut inputs = collect_notebooks(search_dir)?;
            inputs.sort();
            Ok(inputs
                .into_iter()
                .map(|input| Job {
                    output: input.with_extension("tex"),
                    input,
                })
                .collect())
        }
    }
}

fn is_notebook(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == NOTEBOOK_EXTENSION)
}

fn collect_notebooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_notebook(&path) {
            files.push(path);
        }
    }

    Ok(files)
}

/// Convert one notebook and write its output files
pub fn convert_job(job: &Job, options: &ConvertOptions) -> Result<JobOutput> {
    let text = fs::read_to_string(&job.input)?;
    let notebook = nb_parser::parse(&text).map_err(|source| BatchError::Parse {
        file: job.input.clone(),
        source,
    })?;

    let names = DocumentNames::from_paths(&job.input, &job.output);
    let mut sink = DirectorySink::new(&options.image_dir);
    let doc = convert_notebook(&notebook, &names, options, &mut sink).map_err(|source| {
        BatchError::Convert {
            file: job.input.clone(),
            source,
        }
    })?;

    fs::write(&job.output, &doc.tex)?;
    let bibliography = match &doc.bibliography {
        Some(bib) => {
            let path = job.bib_path();
            fs::write(&path, bib)?;
            Some(path)
        }
        None => None,
    };

    tracing::info!(
        input = %job.input.display(),
        output = %job.output.display(),
        images = sink.written(),
        "wrote LaTeX"
    );
    Ok(JobOutput {
        tex: job.output.clone(),
        bibliography,
        images: sink.written(),
    })
}

/// Convert jobs in order
pub fn convert_all(jobs: &[Job], options: &ConvertOptions, on_error: OnError) -> Result<BatchReport> {
    let mut report = BatchReport::default();

    for job in jobs {
        match convert_job(job, options) {
            Ok(output) => report.converted.push(output),
            Err(err) if on_error == OnError::KeepGoing => {
                tracing::warn!(input = %job.input.display(), error = %err, "conversion failed");
                report.failed.push((job.input.clone(), err));
            }
            Err(err) => return Err(err),
        }
    }

    Ok(report)
}
