pub mod traits;
pub mod evolution;
pub mod fitness;
pub mod music;
pub mod manager;

pub use manager::{ConfigManager, AppConfig};
pub use evolution::{EvolutionConfig, MutationWeights};
pub use fitness::FitnessConfig;
pub use music::MusicSettings;
pub use traits::ConfigSection;
