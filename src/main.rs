//! robograph - Mobile robots in dynamic graph simulation
//!
//! A presenter wires the simulation model to either the terminal (ratatui)
//! frontend or a headless runner.

use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use robograph::config::{self, Config};
use robograph::core::generator::GraphType;
use robograph::core::layout::LayoutType;
use robograph::core::robot::CoordinatorKind;
use robograph::core::{Model, SimulationModel};
use robograph::frontend::{HeadlessView, TerminalView};
use robograph::presenter::Presenter;

#[derive(ClapParser)]
#[command(name = "robograph")]
#[command(about = "Mobile robots in dynamic graph simulation", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Custom data directory (default: ~/.robograph)
    /// Can also be set via ROBOGRAPH_DIR environment variable
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Frontend to use
    #[arg(short, long, value_enum, default_value = "tui")]
    frontend: FrontendType,

    /// RNG seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Graph type
    #[arg(long, value_enum)]
    graph: Option<GraphType>,

    /// Number of nodes
    #[arg(short, long)]
    nodes: Option<usize>,

    /// Number of robots
    #[arg(short, long)]
    robots: Option<usize>,

    /// Robot algorithm
    #[arg(short, long, value_enum)]
    algorithm: Option<CoordinatorKind>,

    /// Initial layout
    #[arg(short, long, value_enum)]
    layout: Option<LayoutType>,

    /// Step limit for autoplay and headless runs
    #[arg(long)]
    max_steps: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum FrontendType {
    Tui,
    Headless,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    ValidateConfig {
        /// Config file to validate (default: the data directory's config.toml)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Run the simulation without a UI and write the graph as JSON
    Export {
        /// Steps to simulate before exporting
        #[arg(long, default_value_t = 0)]
        steps: u64,

        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Command-line flags win over config values
    fn apply_overrides(&self, config: &mut Config) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(graph) = self.graph {
            config.graph.graph_type = graph;
        }
        if let Some(nodes) = self.nodes {
            config.graph.node_count = nodes;
        }
        if let Some(robots) = self.robots {
            config.robots.count = robots;
        }
        if let Some(algorithm) = self.algorithm {
            config.robots.algorithm = algorithm;
        }
        if let Some(layout) = self.layout {
            config.layout.layout_type = layout;
        }
        if let Some(max_steps) = self.max_steps {
            config.ui.max_steps = max_steps;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Must happen before anything resolves the data directory
    if let Some(data_dir) = &cli.data_dir {
        std::env::set_var(config::DATA_DIR_ENV, data_dir);
    }

    init_logging()?;
    tracing::info!("robograph {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(data_dir) = &cli.data_dir {
        tracing::info!("Using custom data directory: {:?}", data_dir);
    }

    match &cli.command {
        Some(Commands::ValidateConfig { file }) => {
            validate_config(file.as_deref().or(cli.config.as_deref()))
        }
        Some(Commands::Export { steps, output }) => {
            export(&load_config(&cli)?, *steps, output.as_deref())
        }
        None => match cli.frontend {
            FrontendType::Tui => run_tui(load_config(&cli)?),
            FrontendType::Headless => run_headless(load_config(&cli)?),
        },
    }
}

/// Load the config file, apply command-line overrides and reject invalid settings
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    cli.apply_overrides(&mut config);

    let report = config.validate();
    for warning in &report.warnings {
        tracing::warn!("Config warning: {}", warning);
    }
    if report.has_errors() {
        bail!("Invalid configuration: {}", report.errors.join("; "));
    }
    Ok(config)
}

/// Log to a file in the data directory (TUI apps can't log to stdout).
/// RUST_LOG controls the level, e.g. RUST_LOG=debug
fn init_logging() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .context(format!("Failed to create data directory {:?}", parent))?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context(format!("Failed to open log file {:?}", log_path))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false) // No color codes in log file
        .init();
    Ok(())
}

fn build_model(config: &Config) -> Result<SimulationModel> {
    SimulationModel::new(config.simulation_settings(), config.seed)
        .context("Failed to create simulation")
}

/// Run TUI frontend
fn run_tui(config: Config) -> Result<()> {
    let model = Rc::new(RefCell::new(build_model(&config)?));
    let view = TerminalView::open(&config)?;
    Presenter::new(model, view).run()
}

/// Run without a UI until the simulation finishes or hits max steps
fn run_headless(config: Config) -> Result<()> {
    let model = Rc::new(RefCell::new(build_model(&config)?));
    let view = HeadlessView::new(config.ui.max_steps);
    Presenter::new(model, view).run()
}

fn export(config: &Config, steps: u64, output: Option<&Path>) -> Result<()> {
    let mut model = build_model(config)?;
    for _ in 0..steps {
        if model.is_finished() {
            break;
        }
        model.step();
    }

    let json =
        serde_json::to_string_pretty(&model.export()).context("Failed to serialize graph")?;
    match output {
        Some(path) => {
            std::fs::write(path, json).context(format!("Failed to write {:?}", path))?;
            println!("✓ Exported graph to {:?}", path);
        }
        None => println!("{}", json),
    }
    tracing::info!(steps = model.swarm().step_number, "Exported graph");
    Ok(())
}

fn validate_config(file: Option<&Path>) -> Result<()> {
    let config = match file {
        Some(path) => {
            println!("Validating config file: {:?}", path);
            Config::load_from_path(path)
        }
        None => {
            println!("Validating default config");
            Config::load()
        }
    };

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };
    println!("✓ Config loaded successfully");

    let report = config.validate();
    for error in &report.errors {
        eprintln!("✗ Error: {}", error);
    }
    for warning in &report.warnings {
        println!("⚠ Warning: {}", warning);
    }

    if report.errors.is_empty() && report.warnings.is_empty() {
        println!("✓ Config is valid with no issues");
    } else {
        if !report.errors.is_empty() {
            eprintln!("\n✗ Found {} error(s)", report.errors.len());
        }
        if !report.warnings.is_empty() {
            println!("⚠ Found {} warning(s)", report.warnings.len());
        }
    }

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_uses_tui() {
        let cli = Cli::try_parse_from(["robograph"]).unwrap();
        assert_eq!(cli.frontend, FrontendType::Tui);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "robograph",
            "--frontend",
            "headless",
            "--seed",
            "9",
            "--graph",
            "binary-tree",
            "--nodes",
            "31",
            "--robots",
            "4",
            "--algorithm",
            "exploration",
            "--layout",
            "force-directed",
            "--max-steps",
            "50",
        ])
        .unwrap();
        assert_eq!(cli.frontend, FrontendType::Headless);

        let mut config = Config::defaults().unwrap();
        cli.apply_overrides(&mut config);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.graph.graph_type, GraphType::BinaryTree);
        assert_eq!(config.graph.node_count, 31);
        assert_eq!(config.robots.count, 4);
        assert_eq!(config.robots.algorithm, CoordinatorKind::Exploration);
        assert_eq!(config.layout.layout_type, LayoutType::ForceDirected);
        assert_eq!(config.ui.max_steps, 50);
    }

    #[test]
    fn test_export_subcommand() {
        let cli = Cli::try_parse_from(["robograph", "export", "--steps", "10", "-o", "out.json"])
            .unwrap();
        match cli.command {
            Some(Commands::Export { steps, output }) => {
                assert_eq!(steps, 10);
                assert_eq!(output, Some(PathBuf::from("out.json")));
            }
            _ => panic!("expected export subcommand"),
        }
    }

    #[test]
    fn test_seeded_export_is_reproducible() {
        let mut config = Config::defaults().unwrap();
        config.seed = Some(17);

        let run = |config: &Config| {
            let mut model = build_model(config).unwrap();
            for _ in 0..5 {
                model.step();
            }
            serde_json::to_string(&model.export()).unwrap()
        };
        assert_eq!(run(&config), run(&config));
    }
}
