//! Train a Q-table for the warehouse robot, or evaluate a saved one
//!
//! ```text
//! robot train --episodes 5000 --table q_table.bin --stats stats.csv
//! robot eval --episodes 100 --table q_table.bin --render
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use robot_rl::{
    algo::tabular::q_table::{table_shape, Mode, QTableAgent, QTableAgentConfig},
    gym::RobotEnv,
    persist,
    stats::{EpisodeStats, SMOOTHING_WINDOW},
};

#[derive(Parser)]
#[command(name = "robot")]
#[command(version, long_about = None)]
#[command(about = "Q-learning for a robot fetching packages in a one-row warehouse")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Learn a Q-table from scratch and save it
    Train(TrainArgs),

    /// Play greedily with a saved Q-table
    Eval(EvalArgs),
}

#[derive(Args)]
struct CommonArgs {
    /// Number of cells in the warehouse row
    #[arg(long, default_value_t = 15)]
    width: usize,

    /// Seed for target placement and the agent's random choices
    #[arg(long)]
    seed: Option<u64>,

    /// Q-table file
    #[arg(long, default_value = "q_table.bin")]
    table: PathBuf,

    /// Log the warehouse floor after every step
    #[arg(long)]
    render: bool,

    /// Write per-episode steps and rewards to this CSV file
    #[arg(long)]
    stats: Option<PathBuf>,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, default_value_t = 5000)]
    episodes: u32,

    /// Learning rate
    #[arg(long, default_value_t = 0.9)]
    alpha: f32,

    /// Discount factor
    #[arg(long, default_value_t = 0.9)]
    gamma: f32,
}

#[derive(Args)]
struct EvalArgs {
    #[command(flatten)]
    common: CommonArgs,

    #[arg(long, default_value_t = 100)]
    episodes: u32,

    /// Give up on an episode after this many steps
    ///
    /// Defaults to four times the width. States the table never visited tie, and a greedy robot
    /// walks left forever when the target is on its right.
    #[arg(long)]
    max_steps: Option<usize>,
}

impl EvalArgs {
    fn step_limit(&self) -> usize {
        self.max_steps.unwrap_or(4 * self.common.width)
    }
}

#[derive(Serialize)]
struct StatsRecord {
    episode: usize,
    steps: usize,
    reward: f32,
    mean_steps: f64,
    mean_reward: f64,
}

fn write_stats(path: &Path, stats: &EpisodeStats) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create stats file: {}", path.display()))?;
    let mean_steps = stats.smoothed_steps(SMOOTHING_WINDOW);
    let mean_rewards = stats.smoothed_rewards(SMOOTHING_WINDOW);
    for (episode, (&steps, &reward)) in stats.steps().iter().zip(stats.rewards()).enumerate() {
        wtr.serialize(StatsRecord {
            episode,
            steps,
            reward,
            mean_steps: mean_steps[episode],
            mean_reward: mean_rewards[episode],
        })?;
    }
    wtr.flush()?;
    info!("Wrote episode stats to {}", path.display());
    Ok(())
}

fn train(args: TrainArgs) -> Result<()> {
    let TrainArgs {
        common,
        episodes,
        alpha,
        gamma,
    } = args;
    anyhow::ensure!(episodes > 0, "--episodes must be positive");

    let mut env = RobotEnv::new(common.width, common.seed)?.with_render(common.render);
    let config = QTableAgentConfig {
        alpha,
        gamma,
        seed: common.seed,
        ..QTableAgentConfig::for_episodes(episodes)
    };
    let mut agent = QTableAgent::new(&env, config);

    info!("Training for {episodes} episodes on a {}-cell floor", common.width);
    agent.run(&mut env, episodes);

    persist::save(&common.table, agent.table())
        .with_context(|| format!("Failed to save Q-table: {}", common.table.display()))?;
    info!("Saved Q-table to {}", common.table.display());

    if let Some(path) = &common.stats {
        write_stats(path, agent.stats())?;
    }
    Ok(())
}

fn eval(args: EvalArgs) -> Result<()> {
    let max_steps = args.step_limit();
    let EvalArgs { common, episodes, .. } = args;

    let mut env = RobotEnv::new(common.width, common.seed)?.with_render(common.render);
    let table = persist::load(&common.table, table_shape(&env))
        .with_context(|| format!("Failed to load Q-table: {}", common.table.display()))?;
    let config = QTableAgentConfig {
        mode: Mode::Evaluate,
        max_steps: Some(max_steps),
        seed: common.seed,
        ..Default::default()
    };
    let mut agent = QTableAgent::with_table(&env, config, table)?;

    let mut reached = 0;
    for _ in 0..episodes {
        if agent.go(&mut env).terminated {
            reached += 1;
        }
    }
    info!(
        "Reached the target in {reached}/{episodes} episodes, mean steps {:.2}",
        agent.stats().mean_steps(episodes as usize).unwrap_or_default()
    );

    if let Some(path) = &common.stats {
        write_stats(path, agent.stats())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train(args) => train(args),
        Commands::Eval(args) => eval(args),
    }
}
