//! Particle transport core: state model, stochastic operators and event ledgers.

pub mod engine;
pub mod factory;
pub mod ledger;
pub mod particle;
pub mod rng;
pub mod species;
pub mod vector;

pub use engine::{SimulationOutcome, TransportEngine};
pub use factory::ParticleFactory;
pub use ledger::{DecayEvent, DecayLedger, DetectionEvent, DetectionLedger};
pub use particle::Particle;
pub use rng::RandomSource;
pub use species::{ParticleSpecies, SpeciesCatalog};
pub use vector::Vector3;
