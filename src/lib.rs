//! Monte Carlo transport of charged particles through a beamline with three
//! detector bands.
//!
//! The [`core::TransportEngine`] advances a pool of particles tick by tick,
//! applying motion, energy loss, detection and scattering, and collects the
//! resulting detection and decay events. [`export`] writes detections to CSV.

pub mod config;
pub mod core;
pub mod error;
pub mod export;

#[cfg(feature = "python")]
mod python;

pub use crate::config::{DetectorBand, ScatterModel, SimulationConfig, SourceConfig};
pub use crate::core::{SimulationOutcome, TransportEngine};
pub use crate::error::{Error, Result};
