//! Command line driver: backward runs, single steps and validation

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use life_rewind::{
    config::{CliOverrides, OutputFormat, Settings},
    csp::SolverOptions,
    game_of_life::{create_example_grids, load_grid_from_file, save_grid_to_file, GameOfLifeRules},
    reverse::{find_predecessor, ReverseProblem, SolutionValidator},
    utils::{ColorOutput, SolutionFormatter},
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "life-rewind")]
#[command(about = "Find earlier Game of Life generations by constraint search")]
#[command(version)]
struct Cli {
    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step backwards repeatedly from a target, then forwards again
    Run(RunArgs),

    /// Find one predecessor of a grid
    Previous {
        /// Grid file
        grid: PathBuf,

        /// Side length to read (defaults to the number of lines)
        #[arg(short = 'n', long)]
        size: Option<usize>,

        /// Dead margin added before solving
        #[arg(short, long, default_value_t = 0)]
        padding: usize,

        /// Give up after this many seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Write the predecessor here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evolve a grid forward
    Step {
        /// Grid file
        grid: PathBuf,

        #[arg(short = 'n', long)]
        size: Option<usize>,

        /// Generations to advance
        #[arg(short, long, default_value_t = 1)]
        generations: usize,
    },

    /// Check that a predecessor steps to a target
    Validate {
        #[arg(short, long)]
        predecessor: PathBuf,

        #[arg(short, long)]
        target: PathBuf,

        #[arg(short = 'n', long)]
        size: Option<usize>,
    },

    /// Create example configuration and input files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.yaml")]
    config: PathBuf,

    /// Target state file (overrides config)
    #[arg(short, long)]
    target: Option<PathBuf>,

    /// Side length to read from the target file
    #[arg(short = 'n', long)]
    size: Option<usize>,

    /// Number of backward steps
    #[arg(short, long)]
    steps: Option<usize>,

    /// Generations to step forward afterwards
    #[arg(short, long)]
    forward: Option<usize>,

    /// Dead margin added before each backward step
    #[arg(short, long)]
    padding: Option<usize>,

    /// Per-step timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Split the search on this many variables and solve in parallel
    #[arg(long)]
    split_depth: Option<usize>,

    /// Output directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Save results as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Save every grid of the run
    #[arg(long)]
    save: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Run(args) => run_command(args, cli.verbose),
        Commands::Previous {
            grid,
            size,
            padding,
            timeout,
            output,
        } => previous_command(grid, size, padding, timeout, output),
        Commands::Step {
            grid,
            size,
            generations,
        } => step_command(grid, size, generations),
        Commands::Validate {
            predecessor,
            target,
            size,
        } => validate_command(predecessor, target, size),
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

fn load_settings(config_path: &Path) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Ok(Settings::default())
    }
}

fn run_command(args: RunArgs, verbose: bool) -> Result<()> {
    let mut settings = load_settings(&args.config)?;
    settings.merge_with_cli(&CliOverrides {
        backward_steps: args.steps,
        forward_steps: args.forward,
        padding: args.padding,
        timeout_seconds: args.timeout,
        parallel_split_depth: args.split_depth,
        target_file: args.target,
        grid_size: args.size,
        output_dir: args.output,
        format: args.json.then_some(OutputFormat::Json),
        save: args.save,
    });
    settings
        .validate()
        .context("Configuration validation failed")?;

    let problem = ReverseProblem::new(settings.clone()).context("Failed to create reverse problem")?;
    print!("{}", SolutionFormatter::format_board(problem.target_grid()));

    let run = problem
        .run_with(|_, solution| match solution {
            Some(solution) => {
                println!("Solution found. Score (minimised) = {}", solution.border_score);
                print!("{}", SolutionFormatter::format_board(&solution.predecessor));
            }
            None => println!("{}", ColorOutput::warning("No previous board found.")),
        })
        .context("Backward search failed")?;

    if run.forward.len() > 1 {
        println!(
            "{}",
            ColorOutput::info(&format!(
                "Stepping forward {} generations",
                run.forward.len() - 1
            ))
        );
        for grid in run.forward.iter().skip(1) {
            print!("{}", SolutionFormatter::format_board(grid));
        }
    }

    if verbose {
        println!("{}", SolutionFormatter::format_run_summary(&run));
    }

    if settings.output.save_intermediate {
        SolutionFormatter::save_run(&run, &settings.output.output_directory, settings.output.format)
            .context("Failed to save run")?;
        println!(
            "{}",
            ColorOutput::success(&format!(
                "Run saved to {}",
                settings.output.output_directory.display()
            ))
        );
    }

    Ok(())
}

fn previous_command(
    grid_path: PathBuf,
    size: Option<usize>,
    padding: usize,
    timeout: Option<u64>,
    output: Option<PathBuf>,
) -> Result<()> {
    let target = load_grid_from_file(&grid_path, size)?.pad(padding);

    let mut options = SolverOptions::default();
    if let Some(seconds) = timeout {
        options.cancel = options.cancel.with_timeout(Duration::from_secs(seconds));
    }

    let Some(solution) = find_predecessor(&target, &options).context("Predecessor search failed")?
    else {
        println!("{}", ColorOutput::warning("No previous board found."));
        return Ok(());
    };

    println!("Solution found. Score (minimised) = {}", solution.border_score);
    print!("{}", SolutionFormatter::format_solution(&solution));

    if let Some(path) = output {
        save_grid_to_file(&solution.predecessor, &path)?;
        println!("{}", ColorOutput::success(&format!("Saved to {}", path.display())));
    }

    Ok(())
}

fn step_command(grid_path: PathBuf, size: Option<usize>, generations: usize) -> Result<()> {
    let grid = load_grid_from_file(&grid_path, size)?;
    for (generation, grid) in GameOfLifeRules::trajectory(&grid, generations)
        .iter()
        .enumerate()
    {
        println!("Generation {}:", generation);
        print!("{}", SolutionFormatter::format_board(grid));
    }
    Ok(())
}

fn validate_command(predecessor_path: PathBuf, target_path: PathBuf, size: Option<usize>) -> Result<()> {
    let predecessor = load_grid_from_file(&predecessor_path, size)
        .with_context(|| format!("Failed to load predecessor from {}", predecessor_path.display()))?;
    let target = load_grid_from_file(&target_path, size)
        .with_context(|| format!("Failed to load target from {}", target_path.display()))?;

    let result = SolutionValidator::new().validate(&predecessor, &target);
    println!("{}", result);

    if result.is_valid {
        println!("{}", ColorOutput::success("Predecessor is valid"));
    } else {
        println!("{}", ColorOutput::error("Predecessor is invalid"));
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    let config_dir = directory.join("config");
    let input_dir = directory.join("input/target_states");
    let output_dir = directory.join("output/solutions");

    for dir in [&config_dir, &input_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_grids(&input_dir).context("Failed to create example grids")?;
    println!("Created example target states in: {}", input_dir.display());

    let examples_dir = config_dir.join("examples");

    let mut quick = Settings::default();
    quick.simulation.backward_steps = 1;
    quick.simulation.forward_steps = 1;
    quick.input.target_state_file = PathBuf::from("input/target_states/blinker.txt");
    quick.to_file(examples_dir.join("quick.yaml"))?;

    let mut bounded = Settings::default();
    bounded.solver.timeout_seconds = Some(60);
    bounded.solver.parallel_split_depth = 4;
    bounded.input.target_state_file = PathBuf::from("input/target_states/beacon.txt");
    bounded.to_file(examples_dir.join("bounded.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());
    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("Run: life-rewind run --config config/default.yaml");

    Ok(())
}
