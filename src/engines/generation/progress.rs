use super::evolution_engine::ProgressCallback;

/// Writes progress through the `log` facade.
pub struct LogProgressCallback {
    label: String,
}

impl LogProgressCallback {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }
}

impl ProgressCallback for LogProgressCallback {
    fn on_report(&mut self, generation: usize, info: &str) {
        log::info!("{} generation {}: {}", self.label, generation, info);
    }

    fn on_target_reached(&mut self, generation: usize, best_fitness: f64) {
        log::info!(
            "{} target reached at generation {} (fitness {:.4})",
            self.label, generation, best_fitness
        );
    }

    fn on_budget_exhausted(&mut self, generations: usize, best_fitness: f64) {
        log::info!(
            "{} target not reached after {} generations (fitness {:.4})",
            self.label, generations, best_fitness
        );
    }
}
