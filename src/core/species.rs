use crate::error::{Error, Result};
use crate::export::check_csv_label;
use serde::{Deserialize, Serialize};

/// Immutable physical constants shared by every particle of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSpecies {
    /// Display name, also written to the `Type` column of the export.
    pub name: String,
    /// Rest mass in kg (> 0).
    pub mass: f64,
    /// Charge in units of e.
    pub charge: i32,
    /// Mean lifetime in seconds (> 0).
    pub mean_lifetime: f64,
}

impl ParticleSpecies {
    /// Create a species after validating mass and lifetime.
    pub fn new(
        name: impl Into<String>,
        mass: f64,
        charge: i32,
        mean_lifetime: f64,
    ) -> Result<Self> {
        let species = Self {
            name: name.into(),
            mass,
            charge,
            mean_lifetime,
        };
        species.validate()?;
        Ok(species)
    }

    pub fn electron() -> Self {
        Self {
            name: "Electron".into(),
            mass: 9.11e-31,
            charge: -1,
            mean_lifetime: 1e10,
        }
    }

    pub fn muon() -> Self {
        Self {
            name: "Muon".into(),
            mass: 1.88e-28,
            charge: -1,
            mean_lifetime: 2.2e-6,
        }
    }

    pub fn pion() -> Self {
        Self {
            name: "Pion".into(),
            mass: 2.49e-28,
            charge: 1,
            mean_lifetime: 2.6e-8,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        check_csv_label("species name", &self.name)?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "species {}: mass must be finite and > 0",
                self.name
            )));
        }
        if self.mean_lifetime.is_nan() || self.mean_lifetime <= 0.0 {
            return Err(Error::InvalidParam(format!(
                "species {}: mean lifetime must be > 0",
                self.name
            )));
        }
        Ok(())
    }
}

/// The table of species new particles are sampled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesCatalog {
    species: Vec<ParticleSpecies>,
}

impl SpeciesCatalog {
    /// Build a catalog, rejecting an empty table or any invalid entry.
    pub fn new(species: Vec<ParticleSpecies>) -> Result<Self> {
        let catalog = Self { species };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The reference three-species table: electron, muon and pion.
    pub fn standard() -> Self {
        Self {
            species: vec![
                ParticleSpecies::electron(),
                ParticleSpecies::muon(),
                ParticleSpecies::pion(),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ParticleSpecies> {
        self.species.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleSpecies> {
        self.species.iter()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.species.is_empty() {
            return Err(Error::InvalidParam("species catalog must not be empty".into()));
        }
        self.species.iter().try_for_each(ParticleSpecies::validate)
    }
}

impl Default for SpeciesCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_has_three_valid_species() -> Result<()> {
        let c = SpeciesCatalog::standard();
        assert_eq!(c.len(), 3);
        c.validate()?;
        let names: Vec<&str> = c.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Electron", "Muon", "Pion"]);
        Ok(())
    }

    #[test]
    fn invalid_mass_rejected() {
        let err = ParticleSpecies::new("Ghost", 0.0, 0, 1.0).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn invalid_lifetime_rejected() {
        let err = ParticleSpecies::new("Flash", 1.0, 0, -1.0).unwrap_err();
        assert!(err.to_string().contains("lifetime"));
    }

    #[test]
    fn name_with_comma_rejected() {
        let err = ParticleSpecies::new("Pion,charged", 2.49e-28, 1, 2.6e-8).unwrap_err();
        assert!(err.to_string().contains("species name"));
    }

    #[test]
    fn empty_catalog_rejected() {
        assert!(SpeciesCatalog::new(Vec::new()).is_err());
    }

    #[test]
    fn catalog_deserializes_from_plain_list() -> Result<()> {
        let json = r#"[{"name":"Kaon","mass":8.8e-28,"charge":1,"mean_lifetime":1.24e-8}]"#;
        let c: SpeciesCatalog = serde_json::from_str(json)?;
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(0).map(|s| s.charge), Some(1));
        Ok(())
    }
}
