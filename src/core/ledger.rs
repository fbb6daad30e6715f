use crate::core::particle::Particle;
use ordered_float::NotNan;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// A particle registered by a detector on one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionEvent {
    pub detector_id: String,
    /// Clock value of the tick on which the hit happened.
    pub time: f64,
    /// Slot of the particle in the simulation pool.
    pub particle_index: usize,
    /// Particle state right after the tick's move and energy loss.
    pub snapshot: Particle,
}

/// The first observation of a particle past its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecayEvent {
    pub time: f64,
    pub particle_index: usize,
    pub snapshot: Particle,
}

/// Exact-state key: species name plus the bit-level kinematic state.
///
/// `NotNan` equality and hashing treat `0.0` and `-0.0` as equal, matching `f64 ==`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StateKey {
    species: String,
    state: [NotNan<f64>; 7],
}

impl StateKey {
    /// `None` if any component is NaN; such a state never compares equal to anything.
    fn of(p: &Particle) -> Option<Self> {
        let r = p.position();
        let v = p.velocity();
        let raw = [r.x, r.y, r.z, v.x, v.y, v.z, p.energy()];
        let state: Vec<NotNan<f64>> = raw
            .into_iter()
            .map(|x| NotNan::new(x).ok())
            .collect::<Option<_>>()?;
        let state: [NotNan<f64>; 7] = state.try_into().ok()?;
        Some(Self {
            species: p.species().name.clone(),
            state,
        })
    }
}

/// Append-only record of decays, deduplicated on exact particle state.
#[derive(Debug, Clone, Default)]
pub struct DecayLedger {
    events: Vec<DecayEvent>,
    seen: HashSet<StateKey>,
}

impl DecayLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `event` unless a previous decay has exactly the same
    /// `(species, position, velocity, energy)`. Returns whether it was appended.
    pub fn record_if_new(&mut self, event: DecayEvent) -> bool {
        if let Some(key) = StateKey::of(&event.snapshot) {
            if !self.seen.insert(key) {
                return false;
            }
        }
        self.events.push(event);
        true
    }

    /// Linear check against every recorded decay.
    pub fn contains_state(&self, p: &Particle) -> bool {
        self.events.iter().any(|e| e.snapshot.same_state(p))
    }

    pub fn events(&self) -> &[DecayEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_events(self) -> Vec<DecayEvent> {
        self.events
    }
}

/// Append-only record of detector hits. No deduplication.
#[derive(Debug, Clone, Default)]
pub struct DetectionLedger {
    events: Vec<DetectionEvent>,
}

impl DetectionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: DetectionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[DetectionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Hit count per detector id.
    pub fn counts_by_detector(&self) -> BTreeMap<&str, usize> {
        let mut out = BTreeMap::new();
        for e in &self.events {
            *out.entry(e.detector_id.as_str()).or_insert(0) += 1;
        }
        out
    }

    pub fn into_events(self) -> Vec<DetectionEvent> {
        self.events
    }
}
