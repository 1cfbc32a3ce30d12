use clap::{Parser, Subcommand};
use ogp_img::config::{self, Config, OutputLayout};
use ogp_img::render::ChromeBackend;
use ogp_img::{logging, output, pipeline};
use std::path::{Path, PathBuf};

/// Flags shared by the default command and `check`.
#[derive(clap::Args, Clone, Debug)]
struct RunArgs {
    /// Markdown articles, or directories to search for them
    #[arg(value_name = "MARKDOWN_FILE")]
    files: Vec<PathBuf>,

    /// Config file [default: ogp-img.toml, if present]
    #[arg(long)]
    config: Option<PathBuf>,

    /// SVG template (overrides `template` in the config)
    #[arg(long)]
    template: Option<PathBuf>,

    /// Output path convention
    #[arg(long, value_enum)]
    layout: Option<OutputLayout>,

    /// Output root for the directory layout
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Render every article, whether or not it opted in
    #[arg(long)]
    no_gate: bool,

    /// Exit with status 1 if any article failed
    #[arg(long)]
    strict: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl RunArgs {
    /// Apply command-line overrides on top of the loaded config.
    fn apply(&self, config: &mut Config) {
        if let Some(template) = &self.template {
            config.template = template.clone();
        }
        if let Some(layout) = self.layout {
            config.output.layout = layout;
        }
        if let Some(dir) = &self.out_dir {
            config.output.dir = dir.clone();
        }
        if self.no_gate {
            config.gate.enabled = false;
        }
    }
}

#[derive(Parser)]
#[command(name = "ogp-img")]
#[command(version)]
#[command(about = "Generate Open Graph images for Markdown articles")]
#[command(long_about = "\
Generate Open Graph images for Markdown articles

For each article, the title is read from the front-matter, HTML-escaped,
substituted into an SVG template, rendered in headless Chrome, and saved
as a PNG.

  ---
  title: \"Hello, world\"
  autoGenOgpImg: true      # opt-in, required unless --no-gate
  ---

Output paths (--layout):
  ogp-png    content/posts/hello/index.md → content/posts/hello/ogp.png
  sibling    content/posts/hello.md       → content/posts/hello.png
  directory  content/posts/hello.md       → static/images/ogp/posts/hello.png

Errors are reported per article; the remaining articles are still processed.

Run 'ogp-img gen-config' to generate a documented ogp-img.toml.")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Command {
    /// Read front-matter and fill the template without rendering
    Check(RunArgs),
    /// Print a stock ogp-img.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        None => {
            let (config, inputs) = prepare(&cli.run)?;
            let summary = pipeline::run(
                &inputs,
                &config,
                |clip| ChromeBackend::launch(&config.browser, clip),
                output::print_report,
            );
            output::print_summary(&summary);
            exit_on_failure(&cli.run, summary.has_failures());
        }
        Some(Command::Check(args)) => {
            let (config, inputs) = prepare(&args)?;
            let summary = pipeline::check(&inputs, &config, output::print_report);
            output::print_check_summary(&summary);
            exit_on_failure(&args, summary.has_failures());
        }
        Some(Command::GenConfig) => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Validate arguments, load config, start logging, expand inputs.
fn prepare(args: &RunArgs) -> Result<(Config, Vec<PathBuf>), Box<dyn std::error::Error>> {
    if args.files.is_empty() {
        println!("No markdown file path is specified.");
        println!("Usage: ogp-img [OPTIONS] <MARKDOWN_FILE>...");
        std::process::exit(1);
    }

    let mut config = match &args.config {
        Some(path) => config::load_required_config(path)?,
        None => config::load_config(Path::new(config::CONFIG_FILE_NAME))?,
    };
    args.apply(&mut config);
    config.validate()?;

    logging::init_logging(&config.logging, args.verbose);

    let inputs = pipeline::collect_inputs(&args.files)?;
    Ok((config, inputs))
}

fn exit_on_failure(args: &RunArgs, failed: bool) {
    if args.strict && failed {
        std::process::exit(1);
    }
}
