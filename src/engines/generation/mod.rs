pub mod evolution_engine;
pub mod mutation;
pub mod operators;
pub mod progress;

pub use evolution_engine::{EvolutionEngine, ProgressCallback, RunOutcome};
pub use mutation::{MutationKind, MutationOutcome};
pub use progress::LogProgressCallback;
