use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dotenv::dotenv;
use dungeon_duel::infra::{DefaultObserver, path_to_moves};
use dungeon_duel::planners::rl::{GameRunner, Trainer, lock_agent};
use dungeon_duel::{AppConfig, DpSolver, Grid, GridGenerator, PathSearch, QLearningAgent};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("dungeon_duel=debug,info"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn log_grid(grid: &Grid) {
    let analysis = grid.analysis();
    info!("Dungeon {}x{}:\n{}", grid.rows(), grid.cols(), grid);
    info!(
        "- total: {}, average: {:.2}, range: [{}, {}]",
        analysis.total, analysis.average, analysis.min, analysis.max
    );
    info!(
        "- {} positive, {} negative, {} special, {} safe cells",
        analysis.positive_count,
        analysis.negative_count,
        grid.special_cells().len(),
        grid.safe_cells().len()
    );
    info!(
        "- difficulty: {:.2} ({}), variance: {:.2}",
        analysis.difficulty_score,
        grid.difficulty_rating(),
        grid.value_variance()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_logging()?;

    let config = AppConfig::from_env()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_rng(&mut rand::rng()),
    };

    let (min, max) = config.tier.value_range();
    let grid = GridGenerator::generate_balanced(
        &mut rng,
        config.rows,
        config.cols,
        min,
        max,
        config.tier,
    );
    log_grid(&grid);

    let dp = DpSolver::build(&grid);
    let (min_hp, route) = grid.optimal_solution();
    let moves: Vec<&str> = path_to_moves(&route).iter().map(|m| m.as_str()).collect();
    info!("Minimum starting hp: {}", min_hp);
    info!("Optimal route: {}", moves.join(", "));

    let path = PathSearch::find(&grid, grid.start(), grid.goal(), dp.min_hp());
    if path.is_empty() {
        warn!("Path search found no survivable route with {} hp", dp.min_hp());
    } else {
        info!("Path search route: {} cells", path.len());
    }

    let agent = QLearningAgent::shared();
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, stopping training");
                cancel.store(true, Ordering::Relaxed);
            }
        });
    }

    let report = {
        let agent = Arc::clone(&agent);
        let cancel = Arc::clone(&cancel);
        let train_config = config.train.clone();
        let agent_config = config.agent;
        let mut train_rng = StdRng::seed_from_u64(rng.random());
        tokio::task::spawn_blocking(move || {
            Trainer::run(&agent, &train_config, &agent_config, &mut train_rng, &cancel)
        })
        .await??
    };
    info!(
        "Trained {} episodes{}, accuracy {:.1}%",
        report.episodes,
        if report.cancelled { " (cancelled)" } else { "" },
        report.final_accuracy * 100.0
    );

    let mut runner = GameRunner::new();
    let summary = runner.play(
        &agent,
        &grid,
        &dp,
        &config.agent,
        &mut rng,
        &mut DefaultObserver,
    );
    runner.print_summary();
    info!(
        "Agent finished {:?} with hp {} after {} episodes of training",
        summary.outcome,
        summary.hp,
        lock_agent(&agent).episodes()
    );

    Ok(())
}
