use crate::config::SourceConfig;
use crate::core::particle::Particle;
use crate::core::rng::RandomSource;
use crate::core::species::SpeciesCatalog;
use crate::core::vector::Vector3;
use crate::error::{Error, Result};

/// Forward bias of the initial direction's x component.
const DIR_X_RANGE: (f64, f64) = (0.5, 1.0);
/// Transverse spread of the initial direction's y and z components.
const DIR_TRANSVERSE_RANGE: (f64, f64) = (-0.1, 0.1);

/// Samples fresh particles at the beam source.
#[derive(Debug, Clone)]
pub struct ParticleFactory {
    catalog: SpeciesCatalog,
    source: SourceConfig,
}

impl ParticleFactory {
    pub fn new(catalog: SpeciesCatalog, source: SourceConfig) -> Self {
        Self { catalog, source }
    }

    pub fn catalog(&self) -> &SpeciesCatalog {
        &self.catalog
    }

    /// Draw one particle: uniform species, position in the source region, a
    /// forward-biased unit direction, and a uniform kinetic energy converted to
    /// speed with `v = sqrt(2E/m)`.
    pub fn generate_random(&self, rng: &mut RandomSource) -> Result<Particle> {
        let last = self.catalog.len() as i64 - 1;
        let index = rng.uniform_int(0, last) as usize;
        let species = self
            .catalog
            .get(index)
            .cloned()
            .ok_or_else(|| Error::InvalidParam("species catalog must not be empty".into()))?;

        let position = self.random_position(rng);
        let direction = random_direction(rng);
        let (e_lo, e_hi) = self.source.energy_range;
        let energy = rng.uniform_real(e_lo, e_hi);

        let speed = (2.0 * energy / species.mass).sqrt();
        Particle::new(species, position, direction.scaled(speed), energy)
    }

    /// Draw `n` particles in sequence from the same stream.
    pub fn generate_many(&self, n: usize, rng: &mut RandomSource) -> Result<Vec<Particle>> {
        (0..n).map(|_| self.generate_random(rng)).collect()
    }

    fn random_position(&self, rng: &mut RandomSource) -> Vector3 {
        let (x_lo, x_hi) = self.source.x_range;
        let x = rng.uniform_real(x_lo, x_hi);
        let y = rng.uniform_real(0.0, self.source.box_size);
        let z = rng.uniform_real(0.0, self.source.box_size);
        Vector3::new(x, y, z)
    }
}

fn random_direction(rng: &mut RandomSource) -> Vector3 {
    let x = rng.uniform_real(DIR_X_RANGE.0, DIR_X_RANGE.1);
    let y = rng.uniform_real(DIR_TRANSVERSE_RANGE.0, DIR_TRANSVERSE_RANGE.1);
    let z = rng.uniform_real(DIR_TRANSVERSE_RANGE.0, DIR_TRANSVERSE_RANGE.1);
    Vector3::new(x, y, z).normalized()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> ParticleFactory {
        ParticleFactory::new(SpeciesCatalog::standard(), SourceConfig::default())
    }

    #[test]
    fn speed_matches_kinetic_energy() -> Result<()> {
        let f = factory();
        let mut rng = RandomSource::from_seed(17);
        for _ in 0..500 {
            let p = f.generate_random(&mut rng)?;
            let expected = (2.0 * p.energy() / p.species().mass).sqrt();
            let rel = (p.speed() - expected).abs() / expected;
            assert!(rel < 1e-12, "speed {} vs {}", p.speed(), expected);
        }
        Ok(())
    }

    #[test]
    fn samples_stay_in_source_region() -> Result<()> {
        let f = factory();
        let mut rng = RandomSource::from_seed(23);
        for _ in 0..500 {
            let p = f.generate_random(&mut rng)?;
            let r = p.position();
            assert!((40.0..75.0).contains(&r.x));
            assert!((0.0..100.0).contains(&r.y));
            assert!((0.0..100.0).contains(&r.z));
            assert!((1e-14..1e-12).contains(&p.energy()));
            assert_eq!(p.creation_time(), 0.0);

            let dir = p.velocity().normalized();
            assert!(dir.x > 0.9, "direction not forward: {dir}");
            assert!(dir.y.abs() < 0.2 && dir.z.abs() < 0.2);
        }
        Ok(())
    }

    #[test]
    fn every_species_is_drawn() -> Result<()> {
        let f = factory();
        let mut rng = RandomSource::from_seed(31);
        let ps = f.generate_many(300, &mut rng)?;
        for s in f.catalog().iter() {
            assert!(ps.iter().any(|p| p.species().name == s.name), "{} never drawn", s.name);
        }
        Ok(())
    }

    #[test]
    fn single_species_catalog() -> Result<()> {
        let catalog = SpeciesCatalog::new(vec![crate::core::ParticleSpecies::muon()])?;
        let f = ParticleFactory::new(catalog, SourceConfig::default());
        let mut rng = RandomSource::from_seed(1);
        let p = f.generate_random(&mut rng)?;
        assert_eq!(p.species().name, "Muon");
        Ok(())
    }
}
