use crate::config::{EvolutionConfig, MusicSettings};
use crate::config::traits::ConfigSection;
use crate::engines::fitness::FitnessFunction;
use crate::engines::generation::{
    mutation::{MutationKind, MutationOutcome},
    operators::{crossover, select_elite, top_two},
};
use crate::error::{Result, TunegenError};
use crate::music::Track;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Elitist genetic optimizer over whole tracks.
///
/// Each epoch rebuilds every slot from the two current elites: a crossover
/// pass, then a mutation pass, then a full fitness recomputation.
pub struct EvolutionEngine<F: FitnessFunction> {
    config: EvolutionConfig,
    fitness_fn: F,
    population: Vec<Track>,
    fitness: Vec<f64>,
    best_index: usize,
    second_index: usize,
    mutation_kinds: WeightedIndex<f64>,
    rng: StdRng,
}

pub trait ProgressCallback {
    fn on_report(&mut self, generation: usize, info: &str);
    fn on_target_reached(&mut self, generation: usize, best_fitness: f64);
    fn on_budget_exhausted(&mut self, generations: usize, best_fitness: f64);
}

impl<C: ProgressCallback + ?Sized> ProgressCallback for &mut C {
    fn on_report(&mut self, generation: usize, info: &str) {
        (**self).on_report(generation, info)
    }

    fn on_target_reached(&mut self, generation: usize, best_fitness: f64) {
        (**self).on_target_reached(generation, best_fitness)
    }

    fn on_budget_exhausted(&mut self, generations: usize, best_fitness: f64) {
        (**self).on_budget_exhausted(generations, best_fitness)
    }
}

/// Result of [`EvolutionEngine::run`].
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub best: Track,
    pub best_fitness: f64,
    pub generations_run: usize,
    pub converged: bool,
}

impl<F: FitnessFunction> EvolutionEngine<F> {
    /// Take ownership of `population` and score it.
    pub fn new(config: EvolutionConfig, fitness_fn: F, population: Vec<Track>) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::build(config, fitness_fn, population, rng)
    }

    /// Generate `config.population_size` random tracks from the engine's own
    /// random source, so a fixed seed reproduces the whole run.
    pub fn with_random_population(
        config: EvolutionConfig,
        fitness_fn: F,
        settings: Arc<MusicSettings>,
    ) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let population = (0..config.population_size)
            .map(|_| Track::random(Arc::clone(&settings), &mut rng))
            .collect::<Result<Vec<_>>>()?;
        Self::build(config, fitness_fn, population, rng)
    }

    fn build(
        config: EvolutionConfig,
        fitness_fn: F,
        population: Vec<Track>,
        rng: StdRng,
    ) -> Result<Self> {
        config.validate()?;
        if population.is_empty() {
            return Err(TunegenError::Structure("population is empty".to_string()));
        }
        let mutation_kinds = WeightedIndex::new(config.mutation_weights.as_array())
            .map_err(|e| TunegenError::Configuration(format!("Invalid mutation weights: {}", e)))?;

        let mut engine = Self {
            config,
            fitness_fn,
            population,
            fitness: Vec::new(),
            best_index: 0,
            second_index: 0,
            mutation_kinds,
            rng,
        };
        engine.update_fitness()?;
        Ok(engine)
    }

    pub fn population(&self) -> &[Track] {
        &self.population
    }

    pub fn fitness(&self) -> &[f64] {
        &self.fitness
    }

    pub fn best_index(&self) -> usize {
        self.best_index
    }

    pub fn second_index(&self) -> usize {
        self.second_index
    }

    pub fn best(&self) -> &Track {
        &self.population[self.best_index]
    }

    pub fn best_fitness(&self) -> f64 {
        self.fitness[self.best_index]
    }

    /// Rescore every individual and recompute the two elite indices.
    pub fn update_fitness(&mut self) -> Result<()> {
        self.fitness = self
            .population
            .iter()
            .map(|track| self.fitness_fn.evaluate(track))
            .collect::<Result<Vec<_>>>()?;
        (self.best_index, self.second_index) = top_two(&self.fitness);
        Ok(())
    }

    /// One generation: crossover, mutation, rescoring. Both passes breed
    /// from copies of the elites as they stood when the epoch began.
    pub fn epoch(&mut self) -> Result<()> {
        let elites = self.elites();
        self.crossover(&elites);
        self.mutate(&elites)?;
        self.update_fitness()
    }

    pub fn train_info(&self) -> String {
        let mean = self.fitness.iter().sum::<f64>() / self.fitness.len() as f64;
        format!(
            "best fitness {:.4}, second {:.4}, mean {:.4}",
            self.fitness[self.best_index], self.fitness[self.second_index], mean
        )
    }

    /// Evolve for at most `generations` epochs, stopping as soon as the best
    /// fitness exceeds the target. Returns the best individual either way.
    pub fn run<C: ProgressCallback>(
        &mut self,
        generations: usize,
        mut callback: C,
    ) -> Result<RunOutcome> {
        log::info!("Start {} training", self.fitness_fn.name());

        let mut generations_run = 0;
        let mut converged = false;
        for generation in 0..generations {
            if generation % self.config.report_interval == 0 {
                callback.on_report(generation, &self.train_info());
            }

            self.epoch()?;
            generations_run = generation + 1;

            if self.best_fitness() > self.config.target_fitness {
                callback.on_target_reached(generation, self.best_fitness());
                converged = true;
                break;
            }
        }
        if !converged {
            callback.on_budget_exhausted(generations, self.best_fitness());
        }

        log::info!("Final {} fitness: {:.4}", self.fitness_fn.name(), self.best_fitness());
        Ok(RunOutcome {
            best: self.best().clone(),
            best_fitness: self.best_fitness(),
            generations_run,
            converged,
        })
    }

    fn elites(&self) -> [Track; 2] {
        [
            self.population[self.best_index].clone(),
            self.population[self.second_index].clone(),
        ]
    }

    fn crossover(&mut self, elites: &[Track; 2]) {
        for slot in self.population.iter_mut() {
            let parent1 = select_elite(elites, &mut self.rng);
            let parent2 = select_elite(elites, &mut self.rng);
            *slot = crossover(parent1, parent2, &mut self.rng);
        }
    }

    fn mutate(&mut self, elites: &[Track; 2]) -> Result<()> {
        for i in 0..self.population.len() {
            if !self.rng.gen_bool(self.config.mutation_rate) {
                continue;
            }
            let mut track = select_elite(elites, &mut self.rng).clone();
            let kind = MutationKind::ALL[self.mutation_kinds.sample(&mut self.rng)];
            if let MutationOutcome::Aborted(reason) = kind.apply(&mut track, &mut self.rng)? {
                log::debug!("{:?} mutation on slot {} skipped: {}", kind, i, reason);
            }
            self.population[i] = track;
        }
        Ok(())
    }
}
