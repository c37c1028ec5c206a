//! Planet registry: the set of planets one run compiles, keyed by id.

use hashbrown::HashMap;

use crate::error::TerrainError;
use crate::planet::PlanetDefinition;
use crate::shift::CoordinateShift;

/// Stores planet definitions in registration order with lookup by id.
#[derive(Debug, Clone)]
pub struct PlanetRegistry {
    planets: Vec<PlanetDefinition>,
    id_to_index: HashMap<String, usize>,
}

impl PlanetRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            planets: Vec::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Registers every definition in order, stopping at the first duplicate.
    pub fn from_definitions(
        defs: impl IntoIterator<Item = PlanetDefinition>,
    ) -> Result<Self, TerrainError> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(def)?;
        }
        Ok(registry)
    }

    /// Registers a planet, returning its index.
    ///
    /// # Errors
    ///
    /// Returns [`TerrainError::DuplicatePlanetIdentifier`] if a planet with the
    /// same id exists.
    pub fn register(&mut self, def: PlanetDefinition) -> Result<usize, TerrainError> {
        if self.id_to_index.contains_key(&def.id) {
            return Err(TerrainError::DuplicatePlanetIdentifier(def.id));
        }
        let index = self.planets.len();
        tracing::info!(planet = %def.id, index, "registered planet");
        self.id_to_index.insert(def.id.clone(), index);
        self.planets.push(def);
        Ok(index)
    }

    /// Returns the definition at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    pub fn get(&self, index: usize) -> &PlanetDefinition {
        &self.planets[index]
    }

    pub fn lookup_by_id(&self, id: &str) -> Option<&PlanetDefinition> {
        self.id_to_index.get(id).map(|&i| &self.planets[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlanetDefinition> {
        self.planets.iter()
    }

    /// Pairs of planets whose effective shifts are identical.
    ///
    /// Derived shifts can collide; such planets sample the same terrain.
    pub fn shift_collisions(&self) -> Vec<(&str, &str)> {
        let mut seen: HashMap<(i32, i32), &str> = HashMap::new();
        let mut collisions = Vec::new();
        for def in &self.planets {
            let CoordinateShift { shift_x, shift_z, .. } = def.effective_shift();
            match seen.get(&(shift_x, shift_z)) {
                Some(first) => collisions.push((*first, def.id.as_str())),
                None => {
                    seen.insert((shift_x, shift_z), def.id.as_str());
                }
            }
        }
        collisions
    }

    /// Returns the number of registered planets.
    pub fn len(&self) -> usize {
        self.planets.len()
    }

    /// Returns `true` if no planets are registered.
    pub fn is_empty(&self) -> bool {
        self.planets.is_empty()
    }
}

impl Default for PlanetRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_lookup() {
        let mut registry = PlanetRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.register(PlanetDefinition::new("moon")).unwrap(), 0);
        assert_eq!(registry.register(PlanetDefinition::new("mars")).unwrap(), 1);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.lookup_by_id("mars").unwrap().id, "mars");
        assert_eq!(registry.get(0).id, "moon");
        assert!(registry.lookup_by_id("venus").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut registry = PlanetRegistry::new();
        registry.register(PlanetDefinition::new("moon")).unwrap();
        let err = registry.register(PlanetDefinition::new("moon")).unwrap_err();
        assert_eq!(err, TerrainError::DuplicatePlanetIdentifier("moon".into()));
        assert_eq!(registry.len(), 1, "failed registration must not be stored");
    }

    #[test]
    fn test_from_definitions_keeps_order() {
        let registry = PlanetRegistry::from_definitions(
            ["glacio", "moon", "mars"].map(PlanetDefinition::new),
        )
        .unwrap();
        let ids: Vec<&str> = registry.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["glacio", "moon", "mars"]);
    }

    #[test]
    fn test_shift_collisions() {
        let pinned = CoordinateShift::derive("moon");
        let twin = PlanetDefinition {
            shift: Some(CoordinateShift { salt: 1, ..pinned }),
            ..PlanetDefinition::new("twin")
        };
        let registry = PlanetRegistry::from_definitions([
            PlanetDefinition::new("moon"),
            PlanetDefinition::new("mars"),
            twin,
        ])
        .unwrap();
        assert_eq!(registry.shift_collisions(), [("moon", "twin")]);
    }
}
