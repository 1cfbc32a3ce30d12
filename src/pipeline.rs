//! Batch driver: front-matter → gate → template → render → write.
//!
//! Articles are processed one at a time, in the order given. Each article
//! ends in exactly one [`Outcome`]:
//!
//! | Outcome | When |
//! |---|---|
//! | `Written` | PNG rendered and written |
//! | `Planned` | `check` mode: everything up to rendering succeeded |
//! | `Skipped` | gate enabled and the article did not opt in |
//! | `Failed` | any front-matter, template, render, or write error |
//!
//! A failure only ends the current article; the batch always continues. The
//! template is loaded once per run, and its error (if any) is reported on each
//! article that gets past the gate. The browser is started lazily, on the
//! first article that actually needs rendering, so a run in which every
//! article is skipped or fails early never launches one.
//!
//! Rendered bytes must pass [`check_png`] before anything is written, so a
//! failed or garbage capture never produces an output file.

use crate::config::Config;
use crate::frontmatter::{self, FrontmatterError};
use crate::paths;
use crate::render::{Clip, RenderBackend, RenderError, check_png};
use crate::template::{Template, TemplateError};
use crate::writer::{self, WriteError};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read input directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Everything that can go wrong with a single article.
#[derive(Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

/// Why an article was not rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The opt-in key is present and false.
    OptedOut { key: String },
    /// The opt-in key is absent.
    NotOptedIn { key: String },
}

#[derive(Debug)]
pub enum Outcome {
    Written { title: String, output: PathBuf },
    Planned { title: String, output: PathBuf },
    Skipped(SkipReason),
    Failed(FileError),
}

impl Outcome {
    /// Destination of a written or planned image.
    pub fn output(&self) -> Option<&Path> {
        match self {
            Outcome::Written { output, .. } | Outcome::Planned { output, .. } => {
                Some(output.as_path())
            }
            Outcome::Skipped(_) | Outcome::Failed(_) => None,
        }
    }
}

/// Result for one input article.
#[derive(Debug)]
pub struct FileReport {
    /// 1-based position in the input list.
    pub index: usize,
    pub input: PathBuf,
    pub outcome: Outcome,
}

/// Results for a whole run, in input order.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub reports: Vec<FileReport>,
}

impl RunSummary {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.reports.iter().filter(|r| pred(&r.outcome)).count()
    }

    pub fn written(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Written { .. }))
    }

    pub fn planned(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Planned { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    /// Destinations claimed by more than one article, in first-seen order.
    /// The last article to reach such a path owns the file on disk.
    pub fn repeated_outputs(&self) -> Vec<&Path> {
        let mut seen: Vec<&Path> = Vec::new();
        let mut repeated: Vec<&Path> = Vec::new();
        for output in self.reports.iter().filter_map(|r| r.outcome.output()) {
            if !seen.contains(&output) {
                seen.push(output);
            } else if !repeated.contains(&output) {
                repeated.push(output);
            }
        }
        repeated
    }

    fn push(&mut self, report: FileReport) {
        if let Some(output) = report.outcome.output() {
            let earlier = self
                .reports
                .iter()
                .find(|r| r.outcome.output() == Some(output));
            if let Some(earlier) = earlier {
                warn!(
                    output = %output.display(),
                    earlier = %earlier.input.display(),
                    input = %report.input.display(),
                    "output path already used in this run, the later article replaces it"
                );
            }
        }
        self.reports.push(report);
    }
}

/// Expand the command-line inputs into article paths.
///
/// Files are taken as given, missing paths included (they fail per article).
/// Directories are walked for `.md`/`.markdown` files in file-name order,
/// skipping hidden entries.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, PipelineError> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.is_dir() {
            inputs.push(path.clone());
            continue;
        }
        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && is_markdown(entry.path()) {
                inputs.push(entry.into_path());
            }
        }
    }
    Ok(inputs)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md") || e.eq_ignore_ascii_case("markdown"))
}

/// Render and write an image for every article in `inputs`.
///
/// `launch` starts the rendering backend; it is called at most once, with the
/// capture rectangle of this run. `progress` is called after each article.
pub fn run<B, L>(
    inputs: &[PathBuf],
    config: &Config,
    launch: L,
    mut progress: impl FnMut(&FileReport),
) -> RunSummary
where
    B: RenderBackend,
    L: FnOnce(Clip) -> Result<B, RenderError>,
{
    let template = load_template(config);
    let cwd = working_dir();
    let mut backend = LazyBackend::new(launch);
    let mut summary = RunSummary::default();

    for (i, input) in inputs.iter().enumerate() {
        let outcome = render_article(input, config, &cwd, &template, &mut backend)
            .unwrap_or_else(Outcome::Failed);
        let report = record(i + 1, input, outcome);
        progress(&report);
        summary.push(report);
    }
    summary
}

/// Dry run: everything [`run`] does short of rendering and writing.
pub fn check(
    inputs: &[PathBuf],
    config: &Config,
    mut progress: impl FnMut(&FileReport),
) -> RunSummary {
    let template = load_template(config);
    let cwd = working_dir();
    let mut summary = RunSummary::default();

    for (i, input) in inputs.iter().enumerate() {
        let outcome = match prepare(input, config, &cwd, &template) {
            Ok(Step::Ready(article)) => Outcome::Planned {
                title: article.title,
                output: article.output,
            },
            Ok(Step::Skip(reason)) => Outcome::Skipped(reason),
            Err(e) => Outcome::Failed(e),
        };
        let report = record(i + 1, input, outcome);
        progress(&report);
        summary.push(report);
    }
    summary
}

/// Directory relative inputs are resolved against by the directory layout.
fn working_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|e| {
        warn!(error = %e, "cannot read the working directory");
        PathBuf::new()
    })
}

/// The loaded template and the capture rectangle derived from it.
type LoadedTemplate = Result<(Template, Clip), TemplateError>;

fn load_template(config: &Config) -> LoadedTemplate {
    let template = Template::load(&config.template, &config.placeholder)?;
    let (width, height) = if config.image.size_from_template {
        template.size()?
    } else {
        (config.image.width, config.image.height)
    };
    debug!(
        template = %config.template.display(),
        bytes = template.bytes().len(),
        width,
        height,
        "loaded template"
    );
    Ok((template, Clip::for_size(width, height, config.image.inset)))
}

/// An article that passed the gate, with its filled SVG.
struct ReadyArticle {
    title: String,
    svg: Vec<u8>,
    clip: Clip,
    output: PathBuf,
}

enum Step {
    Skip(SkipReason),
    Ready(ReadyArticle),
}

fn prepare(
    input: &Path,
    config: &Config,
    cwd: &Path,
    template: &LoadedTemplate,
) -> Result<Step, FileError> {
    let meta = frontmatter::read_article(input, &config.gate.key)?;

    if config.gate.enabled {
        let key = config.gate.key.clone();
        match meta.opt_in {
            Some(true) => {}
            Some(false) => return Ok(Step::Skip(SkipReason::OptedOut { key })),
            None => return Ok(Step::Skip(SkipReason::NotOptedIn { key })),
        }
    }

    let (template, clip) = template.as_ref().map_err(|e| e.clone())?;
    Ok(Step::Ready(ReadyArticle {
        svg: template.fill(&meta.title),
        title: meta.title,
        clip: *clip,
        output: paths::output_path(input, &config.output, cwd),
    }))
}

fn render_article<B, L>(
    input: &Path,
    config: &Config,
    cwd: &Path,
    template: &LoadedTemplate,
    backend: &mut LazyBackend<B, L>,
) -> Result<Outcome, FileError>
where
    B: RenderBackend,
    L: FnOnce(Clip) -> Result<B, RenderError>,
{
    let article = match prepare(input, config, cwd, template)? {
        Step::Skip(reason) => return Ok(Outcome::Skipped(reason)),
        Step::Ready(article) => article,
    };

    let png = backend.get(article.clip)?.render(&article.svg, article.clip)?;
    check_png(&png, article.clip)?;
    writer::write_png(&article.output, &png)?;

    Ok(Outcome::Written {
        title: article.title,
        output: article.output,
    })
}

fn record(index: usize, input: &Path, outcome: Outcome) -> FileReport {
    match &outcome {
        Outcome::Failed(e) => warn!(input = %input.display(), error = %e, "skipping article"),
        Outcome::Skipped(reason) => debug!(input = %input.display(), ?reason, "not opted in"),
        Outcome::Written { output, .. } | Outcome::Planned { output, .. } => {
            debug!(input = %input.display(), output = %output.display(), "done")
        }
    }
    FileReport {
        index,
        input: input.to_path_buf(),
        outcome,
    }
}

/// Starts the backend on first use and remembers the result, error included.
struct LazyBackend<B, L> {
    launch: Option<L>,
    backend: Option<Result<B, RenderError>>,
}

impl<B, L> LazyBackend<B, L>
where
    B: RenderBackend,
    L: FnOnce(Clip) -> Result<B, RenderError>,
{
    fn new(launch: L) -> Self {
        Self {
            launch: Some(launch),
            backend: None,
        }
    }

    fn get(&mut self, clip: Clip) -> Result<&B, RenderError> {
        if let Some(launch) = self.launch.take() {
            self.backend = Some(launch(clip));
        }
        match &self.backend {
            Some(Ok(backend)) => Ok(backend),
            Some(Err(e)) => Err(e.clone()),
            None => Err(RenderError::Launch("backend was never started".into())),
        }
    }
}
