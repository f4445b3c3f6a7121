use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sheetgraph_core::{Config, RendererKind, RunReport, Severity};
use sheetgraph_engine::Pipeline;
use sheetgraph_export::{find_node, DependencyGraph, Export, NeighborView, Node, RecordId};
use sheetgraph_render::{DiagramRenderer, SourceRenderer};

/// SheetGraph - one-hop dependency diagrams for measure sheets
#[derive(Parser)]
#[command(name = "sheetgraph")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sheetgraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a diagram for every connected measure sheet
    Render {
        /// Solution export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory (default: diagrams)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<Format>,

        /// Continue past per-diagram failures
        #[arg(short, long)]
        keep_going: bool,

        /// Also write the run report as JSON
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Print the diagram source for one measure sheet
    Show {
        /// Record id, short label, or full name (numbers match record ids first)
        node: String,

        /// Solution export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// List every measure sheet that gets a diagram
    List {
        /// Solution export (default: data.json)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    /// SVG rendered by d2
    Svg,
    /// Diagram source (.d2)
    Source,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("sheetgraph.toml").exists() {
        Config::from_file(Path::new("sheetgraph.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };
    tracing::debug!(?config, "loaded configuration");

    match cli.command {
        Commands::Render { input, output, format, keep_going, report } => {
            if let Some(input) = input {
                config.input = absolute(input)?;
            }
            if let Some(output) = output {
                config.output_dir = absolute(output)?;
            }
            if let Some(format) = format {
                config.renderer.kind = match format {
                    Format::Svg => RendererKind::D2,
                    Format::Source => RendererKind::Source,
                };
            }
            config.keep_going |= keep_going;

            render_command(&config, report.as_deref(), cli.verbose).await
        }
        Commands::Show { node, input } => {
            if let Some(input) = input {
                config.input = absolute(input)?;
            }
            show_command(&config, &node, cli.verbose)
        }
        Commands::List { input } => {
            if let Some(input) = input {
                config.input = absolute(input)?;
            }
            list_command(&config, cli.verbose)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Command line paths are relative to the working directory, not the config file
fn absolute(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn load_export(pipeline: &Pipeline<'_>, config: &Config, verbose: bool) -> Result<Export> {
    if verbose {
        eprintln!("{} {}", "Loading export from:".cyan(), config.input_path().display());
    }

    pipeline.load().map_err(|e| anyhow::anyhow!("Failed to load export: {}", e))
}

/// Render command - one diagram per node
async fn render_command(config: &Config, report_path: Option<&Path>, verbose: bool) -> Result<()> {
    let renderer = sheetgraph_render::from_config(&config.renderer);
    let pipeline = Pipeline::new(config, renderer.as_ref())?;
    let export = load_export(&pipeline, config, verbose)?;

    if let Err(e) = renderer.check().await {
        return Err(anyhow::anyhow!(
            "{}. Install d2 or run with --format source to write diagram sources instead.",
            e
        ));
    }

    if verbose {
        eprintln!(
            "{} {} ({} files) into {}",
            "Rendering with".cyan(),
            renderer.name(),
            renderer.extension(),
            config.output_path().display()
        );
    }

    let report = pipeline.run(&export).await?;

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    print_run_summary(&report, config);

    if report.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Build the graph the same way the render command does
fn build_graph<'c>(config: &'c Config, renderer: &'c dyn DiagramRenderer, verbose: bool) -> Result<(Pipeline<'c>, DependencyGraph)> {
    let pipeline = Pipeline::new(config, renderer)?;
    let export = load_export(&pipeline, config, verbose)?;
    let mut report = RunReport::new();
    let graph = pipeline.build_graph(&export, &mut report);
    Ok((pipeline, graph))
}

/// Show command - print one node's neighbor view
fn show_command(config: &Config, query: &str, verbose: bool) -> Result<()> {
    let (pipeline, graph) = build_graph(config, &SourceRenderer, verbose)?;

    let node = find_node(&graph, pipeline.labeler(), query).ok_or_else(|| {
        anyhow::anyhow!(
            "'{}' is not in the dependency graph. Only measure sheets with at least one resolved reference get a diagram.",
            query
        )
    })?;

    let view = NeighborView::for_node(&graph, node, pipeline.labeler());

    println!("{} {} ({})", "Node:".bold(), node.name.green(), node.id);
    print_neighbors("Upstream:", &graph.dependencies(node.id), node.id);
    print_neighbors("Downstream:", &graph.dependents(node.id), node.id);
    println!();
    println!("{}", view.to_diagram());

    Ok(())
}

fn print_neighbors(title: &str, neighbors: &[&Node], self_id: RecordId) {
    let others: Vec<&&Node> = neighbors.iter().filter(|n| n.id != self_id).collect();
    println!("{} {}", title.bold(), others.len());
    for neighbor in others {
        println!("  {} ({})", neighbor.name, neighbor.id);
    }
}

/// List command - every node with its neighbor counts
fn list_command(config: &Config, verbose: bool) -> Result<()> {
    let (pipeline, graph) = build_graph(config, &SourceRenderer, verbose)?;

    if graph.is_empty() {
        println!("{}", "No measure sheet has a resolved dependency.".yellow());
        return Ok(());
    }

    for view in pipeline.views(&graph) {
        let name = graph.get(view.node_id).map(|n| n.name.as_str()).unwrap_or_default();
        println!(
            "  {} {:>4} in {:>4} out  {}",
            format!("{:<12}", view.label).bold(),
            view.upstream.len(),
            view.downstream.len(),
            name
        );
    }

    println!();
    println!("{} measure sheets", graph.len());

    Ok(())
}

/// Print run summary to stdout
fn print_run_summary(report: &RunReport, config: &Config) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "SheetGraph Run Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Records read:       {}", report.summary.records_read);
    println!("Eligible sheets:    {}", report.summary.records_eligible);
    println!(
        "Filtered out:       {} folders, {} without references, {} excluded folder, {} other type",
        report.summary.dropped_folders,
        report.summary.dropped_no_references,
        report.summary.dropped_excluded_parent,
        report.summary.dropped_wrong_type
    );
    println!("Connected sheets:   {}", report.summary.nodes_built);
    println!("Isolated (pruned):  {}", report.summary.nodes_pruned);
    println!("Dropped references: {}", report.summary.references_dropped);
    println!();

    println!(
        "{} {} into {}",
        "Diagrams written:".bold(),
        report.summary.diagrams_written.to_string().green(),
        config.output_path().display()
    );

    if report.summary.errors > 0 {
        println!("  Errors:   {}", report.summary.errors.to_string().red().bold());
    }
    if report.summary.warnings > 0 {
        println!("  Warnings: {}", report.summary.warnings.to_string().yellow());
    }

    if !report.diagnostics.is_empty() {
        println!();
        println!("{}", "Diagnostics:".bold());
        for diag in &report.diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);
        }
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn show_help_states_id_precedence() {
        use clap::CommandFactory;
        let cli = Cli::command();
        let show = cli.find_subcommand("show").unwrap();
        let node = show.get_arguments().find(|a| a.get_id() == "node").unwrap();
        assert!(node.get_help().unwrap().to_string().contains("record ids first"));
    }

    #[test]
    fn parses_render_flags() {
        let cli = Cli::try_parse_from([
            "sheetgraph", "render", "-i", "export.json", "--format", "source", "--keep-going",
        ])
        .unwrap();

        match cli.command {
            Commands::Render { input, format, keep_going, .. } => {
                assert_eq!(input, Some(PathBuf::from("export.json")));
                assert!(matches!(format, Some(Format::Source)));
                assert!(keep_going);
            }
            _ => panic!("expected render"),
        }
    }
}
