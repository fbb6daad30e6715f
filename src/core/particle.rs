use crate::core::species::ParticleSpecies;
use crate::core::vector::Vector3;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A charged particle travelling down the beamline.
///
/// Fields:
/// - `species`: physical constants (mass, charge, lifetime)
/// - `position`: position in beamline units
/// - `velocity`: velocity in beamline units per second
/// - `energy`: remaining kinetic energy in joules (>= 0)
/// - `creation_time`: clock value at which the particle was created
///
/// State is only mutated by the transport engine; outside the crate a particle
/// is read-only once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    species: ParticleSpecies,
    position: Vector3,
    velocity: Vector3,
    energy: f64,
    creation_time: f64,
}

impl Particle {
    /// Create a particle at `creation_time = 0` after validating invariants.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the species is invalid, any vector component is NaN/inf,
    ///   or `energy` is negative or non-finite.
    pub fn new(
        species: ParticleSpecies,
        position: Vector3,
        velocity: Vector3,
        energy: f64,
    ) -> Result<Self> {
        species.validate()?;
        if !position.is_finite() {
            return Err(Error::InvalidParam("position must be finite".into()));
        }
        if !velocity.is_finite() {
            return Err(Error::InvalidParam("velocity must be finite".into()));
        }
        if !energy.is_finite() || energy < 0.0 {
            return Err(Error::InvalidParam("energy must be finite and >= 0".into()));
        }
        Ok(Self {
            species,
            position,
            velocity,
            energy,
            creation_time: 0.0,
        })
    }

    /// Override the creation time (clock value, seconds).
    pub fn with_creation_time(mut self, creation_time: f64) -> Result<Self> {
        if !creation_time.is_finite() {
            return Err(Error::InvalidParam("creation_time must be finite".into()));
        }
        self.creation_time = creation_time;
        Ok(self)
    }

    #[inline]
    pub fn species(&self) -> &ParticleSpecies {
        &self.species
    }

    #[inline]
    pub fn position(&self) -> Vector3 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vector3 {
        self.velocity
    }

    #[inline]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[inline]
    pub fn creation_time(&self) -> f64 {
        self.creation_time
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.velocity.magnitude()
    }

    /// Whether the particle is still alive at clock value `now`.
    #[inline]
    pub fn is_alive(&self, now: f64) -> bool {
        now - self.creation_time < self.species.mean_lifetime
    }

    /// Explicit Euler step: `position += velocity * dt`.
    #[inline]
    pub(crate) fn advance(&mut self, dt: f64) {
        self.position.add_scaled(&self.velocity, dt);
    }

    /// Subtract `de` from the energy, clamping at zero.
    #[inline]
    pub(crate) fn lose_energy(&mut self, de: f64) {
        self.energy = (self.energy - de).max(0.0);
    }

    /// Rotate the velocity's x/y components by `theta` about the z-axis, keeping the speed.
    pub(crate) fn rotate_about_z(&mut self, theta: f64) {
        let speed = self.speed();
        let (sin, cos) = theta.sin_cos();
        let v = self.velocity;
        let rotated = Vector3::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos, v.z);
        self.velocity = rotated.normalized().scaled(speed);
    }

    /// Key used for decay deduplication: species name plus exact kinematic state.
    pub(crate) fn same_state(&self, other: &Particle) -> bool {
        self.species.name == other.species.name
            && self.position == other.position
            && self.velocity == other.velocity
            && self.energy == other.energy
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} particle at position {} with Energy={} J",
            self.species.name, self.position, self.energy
        )
    }
}
