use anyhow::Context;
use std::env;
use std::sync::Arc;
use tunegen::config::ConfigManager;
use tunegen::engines::fitness::RhythmFitness;
use tunegen::engines::generation::{EvolutionEngine, LogProgressCallback};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Usage: tunegen [CONFIG.toml] [OUTPUT.json]
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1);
    let output_path = args.get(2);

    let manager = ConfigManager::new();
    manager
        .load_layered(config_path)
        .context("failed to load configuration")?;
    let config = manager.get()?;

    log::info!(
        "Evolving {} tracks of {} bars in {} for up to {} generations",
        config.evolution.population_size,
        config.music.bar_number,
        config.music.key,
        config.evolution.num_generations
    );

    let settings = Arc::new(config.music);
    let generations = config.evolution.num_generations;
    let mut engine = EvolutionEngine::with_random_population(
        config.evolution,
        RhythmFitness::new(config.fitness),
        settings,
    )
    .context("failed to build initial population")?;

    let outcome = engine.run(generations, LogProgressCallback::new("Rhythm"))?;

    println!("{}", outcome.best);
    println!(
        "Final fitness {:.4} after {} generations ({})",
        outcome.best_fitness,
        outcome.generations_run,
        if outcome.converged { "target reached" } else { "target not reached" }
    );

    if let Some(path) = output_path {
        let json = serde_json::to_string_pretty(&outcome.best)?;
        std::fs::write(path, json).with_context(|| format!("failed to write {}", path))?;
        log::info!("Wrote best track to {}", path);
    }

    Ok(())
}
