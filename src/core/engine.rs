use crate::config::{ScatterModel, SimulationConfig};
use crate::core::factory::ParticleFactory;
use crate::core::ledger::{DecayEvent, DecayLedger, DetectionEvent, DetectionLedger};
use crate::core::particle::Particle;
use crate::core::rng::RandomSource;
use crate::error::Result;
use std::f64::consts::TAU;
use tracing::{debug, info, trace};

/// Time-stepped transport of a fixed particle pool through the detector bands.
///
/// Each tick, every live particle is moved, loses energy, is checked against the
/// detector bands and may scatter, in that order. Particles past their lifetime
/// keep their slot but are frozen; their first decayed state goes to the decay ledger.
#[derive(Debug)]
pub struct TransportEngine {
    config: SimulationConfig,
    rng: RandomSource,
    particles: Vec<Particle>,
    tick: u64,
    total_ticks: u64,
    decays: DecayLedger,
    detections: DetectionLedger,
}

/// Everything a finished run hands to the export side.
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub seed: u64,
    pub ticks: u64,
    pub particles: Vec<Particle>,
    pub decays: Vec<DecayEvent>,
    pub detections: Vec<DetectionEvent>,
}

impl TransportEngine {
    /// Validate `config`, seed the random stream and sample `config.num_particles` particles.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = RandomSource::new(config.seed);
        let factory = ParticleFactory::new(config.catalog.clone(), config.source.clone());
        let particles = factory.generate_many(config.num_particles, &mut rng)?;
        Ok(Self::assemble(config, rng, particles))
    }

    /// Run a hand-built particle pool instead of sampling one.
    ///
    /// `config.num_particles` is replaced by the pool size; source and catalog
    /// settings are ignored.
    pub fn with_particles(mut config: SimulationConfig, particles: Vec<Particle>) -> Result<Self> {
        config.num_particles = particles.len();
        config.validate()?;
        let rng = RandomSource::new(config.seed);
        Ok(Self::assemble(config, rng, particles))
    }

    fn assemble(config: SimulationConfig, rng: RandomSource, particles: Vec<Particle>) -> Self {
        let total_ticks = config.tick_count();
        info!(
            seed = rng.seed(),
            particles = particles.len(),
            dt = config.dt,
            ticks = total_ticks,
            "transport engine ready"
        );
        Self {
            config,
            rng,
            particles,
            tick: 0,
            total_ticks,
            decays: DecayLedger::new(),
            detections: DetectionLedger::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Current clock value: `ticks_done * dt`.
    pub fn time(&self) -> f64 {
        self.tick as f64 * self.config.dt
    }

    pub fn ticks_done(&self) -> u64 {
        self.tick
    }

    pub fn total_ticks(&self) -> u64 {
        self.total_ticks
    }

    pub fn is_finished(&self) -> bool {
        self.tick >= self.total_ticks
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn decays(&self) -> &DecayLedger {
        &self.decays
    }

    pub fn detections(&self) -> &DetectionLedger {
        &self.detections
    }

    /// Number of particles still alive at the current clock value.
    pub fn alive_count(&self) -> usize {
        let now = self.time();
        self.particles.iter().filter(|p| p.is_alive(now)).count()
    }

    /// Advance one tick. Returns `false` (and does nothing) once the run is over.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        let now = self.time();
        let Self {
            config,
            rng,
            particles,
            decays,
            detections,
            ..
        } = self;
        let dt = config.dt;
        let (loss_lo, loss_hi) = config.energy_loss_fraction;

        for (index, p) in particles.iter_mut().enumerate() {
            if !p.is_alive(now) {
                let event = DecayEvent {
                    time: now,
                    particle_index: index,
                    snapshot: p.clone(),
                };
                if decays.record_if_new(event) {
                    debug!(index, species = %p.species().name, time = now, "particle decayed");
                }
                continue;
            }

            p.advance(dt);
            let energy = p.energy();
            p.lose_energy(rng.uniform_real(loss_lo * energy, loss_hi * energy));

            let x = p.position().x;
            if let Some(band) = config.detectors.iter().find(|b| b.contains(x)) {
                if rng.bernoulli(band.hit_probability) {
                    trace!(index, detector = %band.id, x, "hit");
                    detections.record(DetectionEvent {
                        detector_id: band.id.clone(),
                        time: now,
                        particle_index: index,
                        snapshot: p.clone(),
                    });
                }
            }

            if rng.bernoulli(config.scatter_probability) {
                let theta = match config.scatter_model {
                    ScatterModel::TwoStage => {
                        let sigma = rng.uniform_real(0.0, TAU);
                        rng.normal(0.0, sigma)
                    }
                    ScatterModel::Fixed { stddev } => rng.normal(0.0, stddev),
                };
                p.rotate_about_z(theta);
            }
        }

        self.tick += 1;
        true
    }

    /// Advance at most `n` ticks; returns how many were executed.
    pub fn run_ticks(&mut self, n: u64) -> u64 {
        let mut done = 0;
        while done < n && self.step() {
            done += 1;
        }
        done
    }

    /// Run every remaining tick.
    pub fn run(&mut self) {
        let remaining = self.total_ticks.saturating_sub(self.tick);
        info!(remaining, "transport run starting");
        self.run_ticks(remaining);
        info!(
            time = self.time(),
            detections = self.detections.len(),
            decays = self.decays.len(),
            alive = self.alive_count(),
            "transport run complete"
        );
    }

    /// Consume the engine into its final state and ledgers.
    pub fn into_outcome(self) -> SimulationOutcome {
        SimulationOutcome {
            seed: self.rng.seed(),
            ticks: self.tick,
            particles: self.particles,
            decays: self.decays.into_events(),
            detections: self.detections.into_events(),
        }
    }
}
