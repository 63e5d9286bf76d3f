//! ModelPhy compiler CLI
//!
//! Main entry point for the `mphyc` command.

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use modelphy::analysis::Severity;
use modelphy::{ConvertConfig, Converter, SourceFile};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "mphyc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Translate ModelPhy phylogenetic models to CodePhy JSON", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a model and print its structure
    Parse {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Show the parsed AST
        #[arg(long)]
        show_ast: bool,

        /// Show variable dependencies and evaluation order
        #[arg(long)]
        show_deps: bool,
    },

    /// Convert a model to CodePhy JSON
    Convert {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Converter configuration (TOML)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Report syntax errors and model warnings
    Check {
        /// Input file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show information about the compiler
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    match cli.command {
        Commands::Parse {
            input,
            show_ast,
            show_deps,
        } => parse(&input, show_ast, show_deps),

        Commands::Convert {
            input,
            output,
            config,
        } => convert(&input, output.as_deref(), config.as_deref()),

        Commands::Check { input } => check(&input),

        Commands::Info => info(),
    }
}

fn read_source(input: &Path) -> Result<SourceFile> {
    let content = std::fs::read_to_string(input)
        .map_err(|e| miette::miette!("Failed to read input file: {}", e))?;
    Ok(SourceFile::new(input.to_string_lossy(), content))
}

fn parse(input: &Path, show_ast: bool, show_deps: bool) -> Result<()> {
    tracing::info!("Parsing {:?}", input);
    let source = read_source(input)?;

    let program = modelphy::parse(&source.content).map_err(|e| source.report(e))?;
    tracing::debug!("Parsed {} statements", program.statements.len());

    if show_ast {
        println!("=== AST ===");
        let json = serde_json::to_string_pretty(&program)
            .map_err(|e| miette::miette!("Failed to serialize AST: {}", e))?;
        println!("{}", json);
        println!();
    }

    let model = modelphy::builder::build_model(&program).map_err(|e| source.report(e))?;
    print!("{model}");

    if show_deps {
        println!();
        println!("=== Dependencies ===");
        let graph = model.dependency_graph();
        for var in model.variables() {
            let deps = graph.dependencies_of(&var.name);
            if !deps.is_empty() {
                println!("  {} <- {}", var.name, deps.join(", "));
            }
        }
        for reference in graph.unresolved() {
            println!("  {} <- {} (undeclared)", reference.owner, reference.name);
        }
        match graph.evaluation_order() {
            Ok(order) => println!("Evaluation order: {}", order.join(", ")),
            Err(e) => eprintln!("{:?}", miette::Report::new(e)),
        }
    }

    println!();
    if model.is_valid() {
        println!("Model is valid");
    } else {
        println!(
            "Model is incomplete (missing {})",
            model.missing_components().join(", ")
        );
    }
    Ok(())
}

fn convert(input: &Path, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    tracing::info!("Converting {:?}", input);
    let source = read_source(input)?;

    let config = match config {
        Some(path) => ConvertConfig::load(path)?,
        None => ConvertConfig::default(),
    };

    let model = modelphy::build(&source.content).map_err(|e| source.report(e))?;
    if !model.is_valid() {
        tracing::warn!(
            "model is incomplete (missing {})",
            model.missing_components().join(", ")
        );
    }

    let document = Converter::with_config(config).convert(&model);
    let json = document.to_json_pretty()?;

    match output {
        Some(path) => {
            std::fs::write(path, json + "\n").into_diagnostic()?;
            println!("Wrote {} ({})", path.display(), document.model);
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn check(input: &Path) -> Result<()> {
    tracing::info!("Checking {:?}", input);
    let source = read_source(input)?;

    let diagnostics = modelphy::analyze(&source.content);
    let mut errors = 0;
    for d in &diagnostics {
        let label = match d.severity {
            Severity::Error => {
                errors += 1;
                "error"
            }
            Severity::Warning => "warning",
        };
        eprintln!(
            "{}:{}:{}: {}: {}",
            input.display(),
            d.line,
            d.column,
            label,
            d.message
        );
    }

    if errors > 0 {
        return Err(miette::miette!("{} error(s) found", errors));
    }
    println!("All checks passed: {}", input.display());
    Ok(())
}

fn info() -> Result<()> {
    println!("ModelPhy Compiler");
    println!("Version: {}", modelphy::VERSION);
    println!();
    println!("Output format: CodePhy {}", modelphy::config::FORMAT_VERSION);
    println!();
    println!("Distributions:");
    for (_, canonical) in modelphy::convert::tables::CANONICAL_DISTRIBUTIONS {
        println!("  - {canonical}");
    }
    Ok(())
}
