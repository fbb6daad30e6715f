use numpy::ndarray::Array2;
use numpy::{IntoPyArray, PyArray2};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::SimulationConfig;
use crate::core::{Particle, TransportEngine, Vector3};
use crate::export::export_detections_csv;

fn py_err<E: ToString>(e: E) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn vectors_to_array(vs: impl ExactSizeIterator<Item = Vector3>) -> Array2<f64> {
    let mut arr = Array2::<f64>::zeros((vs.len(), 3));
    for (i, v) in vs.enumerate() {
        for (k, c) in v.to_array().into_iter().enumerate() {
            arr[[i, k]] = c;
        }
    }
    arr
}

/// Python-facing wrapper around the transport engine.
///
/// API:
/// - __new__(num_particles=20, dt=1e-12, duration=1e-7, seed=None)
/// - run() / step(n)
/// - get_positions() / get_velocities() -> np.ndarray, shape (N, 3)
/// - get_detections() -> (list[str], np.ndarray of shape (M, 9))
/// - get_decays() -> np.ndarray, shape (K, 2)
/// - export_csv(path)
#[pyclass]
pub struct BeamSim {
    engine: TransportEngine,
}

#[pymethods]
impl BeamSim {
    /// Build a beamline run with the reference detector layout and species catalog.
    ///
    /// Errors: raises ValueError on invalid parameters.
    #[new]
    #[pyo3(signature = (num_particles=20, dt=1e-12, duration=1e-7, seed=None))]
    fn new(num_particles: usize, dt: f64, duration: f64, seed: Option<u64>) -> PyResult<Self> {
        let config = SimulationConfig {
            num_particles,
            dt,
            duration,
            seed,
            ..Default::default()
        };
        let engine = TransportEngine::new(config).map_err(py_err)?;
        Ok(Self { engine })
    }

    /// Run all remaining ticks (releases the GIL during computation).
    fn run(&mut self, py: Python<'_>) {
        py.detach(|| self.engine.run());
    }

    /// Advance at most `n` ticks; returns the number executed.
    fn step(&mut self, py: Python<'_>, n: u64) -> u64 {
        py.detach(|| self.engine.run_ticks(n))
    }

    /// Current simulation clock, seconds.
    fn time(&self) -> f64 {
        self.engine.time()
    }

    /// Seed of the random stream, for replaying the run.
    fn seed(&self) -> u64 {
        self.engine.seed()
    }

    fn get_positions<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let ps = self.engine.particles();
        vectors_to_array(ps.iter().map(Particle::position)).into_pyarray(py)
    }

    fn get_velocities<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let ps = self.engine.particles();
        vectors_to_array(ps.iter().map(Particle::velocity)).into_pyarray(py)
    }

    /// Detector ids plus an (M, 9) array of [mass, charge, energy, x, y, z, vx, vy, vz].
    fn get_detections<'py>(&self, py: Python<'py>) -> (Vec<String>, Bound<'py, PyArray2<f64>>) {
        let events = self.engine.detections().events();
        let mut arr = Array2::<f64>::zeros((events.len(), 9));
        let mut ids = Vec::with_capacity(events.len());
        for (i, e) in events.iter().enumerate() {
            let p = &e.snapshot;
            let r = p.position();
            let v = p.velocity();
            let row = [
                p.species().mass,
                f64::from(p.species().charge),
                p.energy(),
                r.x,
                r.y,
                r.z,
                v.x,
                v.y,
                v.z,
            ];
            for (k, c) in row.into_iter().enumerate() {
                arr[[i, k]] = c;
            }
            ids.push(e.detector_id.clone());
        }
        (ids, arr.into_pyarray(py))
    }

    /// (K, 2) array of [decay_time, particle_index].
    fn get_decays<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        let events = self.engine.decays().events();
        let mut arr = Array2::<f64>::zeros((events.len(), 2));
        for (i, e) in events.iter().enumerate() {
            arr[[i, 0]] = e.time;
            arr[[i, 1]] = e.particle_index as f64;
        }
        arr.into_pyarray(py)
    }

    /// Write the detection table to `path` as CSV.
    fn export_csv(&self, path: &str) -> PyResult<()> {
        export_detections_csv(path, self.engine.detections().events()).map_err(py_err)
    }
}

/// The beamsim Python module entry point.
#[pymodule]
fn beamsim(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<BeamSim>()?;
    Ok(())
}
