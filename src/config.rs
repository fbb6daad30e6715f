//! Simulation configuration.
//!
//! Everything the transport loop reads is collected in [`SimulationConfig`] and
//! checked once by [`SimulationConfig::validate`] before the loop starts; the
//! loop itself assumes validated inputs.

use crate::core::species::SpeciesCatalog;
use crate::error::{Error, Result};
use crate::export::check_csv_label;
use serde::{Deserialize, Serialize};
use std::path::Path;

const TICK_RATIO_TOLERANCE: f64 = 1e-9;

/// A detector occupying the closed interval `[x_min, x_max]` on the beam axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorBand {
    /// Written to the `Detector` column of the export.
    pub id: String,
    pub x_min: f64,
    pub x_max: f64,
    /// Probability that a particle inside the band is registered on a given tick.
    pub hit_probability: f64,
}

impl DetectorBand {
    pub fn new(id: impl Into<String>, x_min: f64, x_max: f64, hit_probability: f64) -> Self {
        Self {
            id: id.into(),
            x_min,
            x_max,
            hit_probability,
        }
    }

    /// Inclusive at both ends.
    #[inline]
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_min && x <= self.x_max
    }

    /// The reference three-detector layout.
    pub fn standard_layout() -> Vec<Self> {
        vec![
            Self::new("detector 1", 45.0, 50.0, 0.80),
            Self::new("detector 2", 55.0, 60.0, 0.85),
            Self::new("detector 3", 65.0, 70.0, 0.90),
        ]
    }
}

/// How the scattering angle is drawn once a scatter roll succeeds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScatterModel {
    /// `theta ~ Normal(0, sigma)` with `sigma ~ Uniform[0, 2*pi)` drawn fresh each event.
    #[default]
    TwoStage,
    /// `theta ~ Normal(0, stddev)` with a fixed angular spread in radians.
    Fixed { stddev: f64 },
}

/// Where and how new particles are sampled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Range for the initial x coordinate.
    pub x_range: (f64, f64),
    /// Transverse box edge; y and z are sampled in `[0, box_size)`.
    pub box_size: f64,
    /// Range for the initial kinetic energy, joules.
    pub energy_range: (f64, f64),
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            x_range: (40.0, 75.0),
            box_size: 100.0,
            energy_range: (1e-14, 1e-12),
        }
    }
}

/// Full run configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_particles: usize,
    /// Tick length, seconds.
    pub dt: f64,
    /// Total simulated time, seconds.
    pub duration: f64,
    /// RNG seed; `None` draws one from the OS-backed thread RNG.
    pub seed: Option<u64>,
    pub catalog: SpeciesCatalog,
    pub source: SourceConfig,
    pub detectors: Vec<DetectorBand>,
    /// Per-tick energy loss is drawn uniformly in `[lo * E, hi * E]`.
    pub energy_loss_fraction: (f64, f64),
    /// Per-tick probability that a live particle scatters.
    pub scatter_probability: f64,
    pub scatter_model: ScatterModel,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            num_particles: 20,
            dt: 1e-12,
            duration: 1e-7,
            seed: None,
            catalog: SpeciesCatalog::standard(),
            source: SourceConfig::default(),
            detectors: DetectorBand::standard_layout(),
            energy_loss_fraction: (0.01, 0.05),
            scatter_probability: 0.01,
            scatter_model: ScatterModel::TwoStage,
        }
    }
}

impl SimulationConfig {
    /// Load a (possibly partial) JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Number of ticks the run lasts: one per `k * dt < duration`, i.e.
    /// `ceil(duration / dt)`, and never fewer than one.
    ///
    /// The ratio is shrunk by a relative `1e-9` before the ceiling so that an
    /// exact multiple such as `1e-7 / 1e-12` is not bumped up by rounding noise.
    pub fn tick_count(&self) -> u64 {
        let ratio = self.duration / self.dt;
        (ratio - TICK_RATIO_TOLERANCE * ratio.max(1.0)).ceil().max(1.0) as u64
    }

    /// Reject configurations the transport loop cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.num_particles == 0 {
            return Err(Error::InvalidParam("num_particles must be > 0".into()));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidParam("dt must be finite and > 0".into()));
        }
        if !self.duration.is_finite() || self.duration <= 0.0 {
            return Err(Error::InvalidParam("duration must be finite and > 0".into()));
        }
        if !(self.duration / self.dt).is_finite() {
            return Err(Error::InvalidParam("duration / dt must be finite".into()));
        }
        self.catalog.validate()?;

        let src = &self.source;
        check_range("source.x_range", src.x_range)?;
        if !src.box_size.is_finite() || src.box_size <= 0.0 {
            return Err(Error::InvalidParam("source.box_size must be finite and > 0".into()));
        }
        check_range("source.energy_range", src.energy_range)?;
        if src.energy_range.0 < 0.0 {
            return Err(Error::InvalidParam("source.energy_range must be >= 0".into()));
        }

        check_range("energy_loss_fraction", self.energy_loss_fraction)?;
        let (lo, hi) = self.energy_loss_fraction;
        if lo < 0.0 || hi > 1.0 {
            return Err(Error::InvalidParam("energy_loss_fraction must lie in [0, 1]".into()));
        }
        check_probability("scatter_probability", self.scatter_probability)?;
        if let ScatterModel::Fixed { stddev } = self.scatter_model {
            if !stddev.is_finite() || stddev < 0.0 {
                return Err(Error::InvalidParam(
                    "scatter_model.stddev must be finite and >= 0".into(),
                ));
            }
        }

        for band in &self.detectors {
            check_csv_label("detector id", &band.id)?;
            check_range(&format!("detector {}", band.id), (band.x_min, band.x_max))?;
            check_probability(
                &format!("detector {} hit_probability", band.id),
                band.hit_probability,
            )?;
        }
        let mut sorted: Vec<&DetectorBand> = self.detectors.iter().collect();
        sorted.sort_by(|a, b| a.x_min.total_cmp(&b.x_min));
        for pair in sorted.windows(2) {
            if pair[1].x_min <= pair[0].x_max {
                return Err(Error::InvalidParam(format!(
                    "detector bands {} and {} overlap",
                    pair[0].id, pair[1].id
                )));
            }
        }
        Ok(())
    }
}

fn check_range(name: &str, (lo, hi): (f64, f64)) -> Result<()> {
    if !lo.is_finite() || !hi.is_finite() {
        return Err(Error::InvalidParam(format!("{name} bounds must be finite")));
    }
    if lo > hi {
        return Err(Error::InvalidParam(format!("{name} lower bound exceeds upper bound")));
    }
    Ok(())
}

fn check_probability(name: &str, p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidParam(format!("{name} must lie in [0, 1]")));
    }
    Ok(())
}
