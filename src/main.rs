use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dtree::config::{self, Config};
use dtree::export::json::read_forest;
use dtree::export::{self, ExportData, ExportFormat};
use dtree::git::GitClient;
use dtree::graph::ModuleGraph;
use dtree::parser::parse_mod_graph;
use dtree::source::{GraphSource, TextSource};
use dtree::tree::build_forest;

#[derive(Parser)]
#[command(name = "dtree")]
#[command(author = "Zachary Woods <143150513+zach-fau@users.noreply.github.com>")]
#[command(version)]
#[command(about = "Builds dependency trees from Go module graphs", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check out a Go repository at a tag and build its dependency forest
    Parse {
        /// Repository URL or path such as github.com/owner/repo
        repo: String,

        /// Tag or branch to check out
        tag: String,

        /// Output file (defaults to output.<format> in the current directory)
        #[arg(short, long, env = "DTREE_OUTPUT")]
        output: Option<PathBuf>,

        /// Output format: json, csv, markdown
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,

        /// Directory holding repository checkouts (defaults to ~/.dtree)
        #[arg(long, env = "DTREE_CACHE_DIR")]
        cache_dir: Option<PathBuf>,

        /// Do not run `go mod tidy` before reading the graph
        #[arg(long)]
        skip_tidy: bool,
    },
    /// Build a dependency forest from a saved `go mod graph` edge list
    Build {
        /// Edge list file; reads stdin when omitted or `-`
        file: Option<PathBuf>,

        /// Output file; writes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: json, csv, markdown
        #[arg(short, long, default_value = "json")]
        format: ExportFormat,
    },
    /// Browse a JSON dependency forest in the terminal
    Explore {
        /// JSON file written by `parse` or `build`
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    config::run_on_worker(move || run(cli)).context("Failed to start the worker thread")?
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Parse {
            repo,
            tag,
            output,
            format,
            cache_dir,
            skip_tidy,
        } => {
            let config = Config {
                cache_dir,
                output,
                format,
                tidy: !skip_tidy,
                verbose: cli.verbose,
            };
            init_tracing(&config);
            parse(&config, &repo, &tag)
        }
        Commands::Build {
            file,
            output,
            format,
        } => {
            let config = Config {
                output,
                format,
                verbose: cli.verbose,
                ..Config::default()
            };
            init_tracing(&config);
            build(&config, file.as_deref())
        }
        Commands::Explore { file } => {
            let config = Config {
                verbose: cli.verbose,
                ..Config::default()
            };
            init_tracing(&config);
            explore(&file)
        }
    }
}

/// Logs go to stderr so `build` can stream its document on stdout.
fn init_tracing(config: &Config) {
    let filter = if config.verbose {
        EnvFilter::new(config.log_directive())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_directive()))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn parse(config: &Config, repo: &str, tag: &str) -> Result<()> {
    let client = config
        .git_client()
        .context("Failed to prepare the checkout cache")?;
    let checkout = client
        .clone_at(repo, tag)
        .with_context(|| format!("Failed to check out {} at {}", repo, tag))?;

    let text = config
        .graph_source(&checkout)
        .mod_graph()
        .with_context(|| format!("Failed to read the module graph of {}", checkout.display()))?;
    let data = forest_from_text(&text)?;

    let output = config.output_path();
    export::export_to_file(config.format, &data, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        path = %output.display(),
        roots = data.root_count(),
        modules = data.module_count,
        "dependency forest written"
    );
    Ok(())
}

fn build(config: &Config, file: Option<&Path>) -> Result<()> {
    let text = TextSource::from_arg(file)
        .mod_graph()
        .context("Failed to read the edge list")?;
    let data = forest_from_text(&text)?;

    match &config.output {
        Some(path) => {
            export::export_to_file(config.format, &data, path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), roots = data.root_count(), "dependency forest written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            export::export(config.format, &data, &mut stdout)
                .context("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn explore(file: &Path) -> Result<()> {
    let json = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let forest = read_forest(&json)
        .with_context(|| format!("{} is not a dependency forest document", file.display()))?;

    dtree::ui::explore(&forest).context("Terminal explorer failed")
}

fn forest_from_text(text: &str) -> Result<ExportData> {
    let graph = parse_mod_graph(text);
    let forest = build_forest(&graph).context("Cannot build a dependency forest")?;

    let modules = ModuleGraph::from_mod_graph(&graph);
    let has_cycles = modules.has_cycles();
    let data = ExportData::new(forest, &modules);
    if has_cycles {
        info!(
            cycles = data.cycles.len(),
            stubs = data.truncated_count(),
            "circular dependencies truncated"
        );
    }
    Ok(data)
}
