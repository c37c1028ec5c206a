//! Noise sources injected into the interpreter.

use std::hash::{Hash, Hasher};

use noise::{NoiseFn, Simplex};
use rustc_hash::{FxHashMap, FxHasher};

use crate::graph::DensityGraph;
use crate::node::{DensityNode, NoiseSource};

/// Resolves noise leaves to values.
///
/// Implementations must be pure: the same source and coordinates always give
/// the same value, from any thread.
pub trait NoiseTable {
    fn sample(&self, source: &NoiseSource, x: f64, y: f64, z: f64) -> f64;
}

impl<F> NoiseTable for F
where
    F: Fn(&NoiseSource, f64, f64, f64) -> f64,
{
    fn sample(&self, source: &NoiseSource, x: f64, y: f64, z: f64) -> f64 {
        self(source, x, y, z)
    }
}

/// A table of simplex fields, one per registered `(id, salt)` pair.
///
/// Each field's permutation seed hashes the world seed, the noise id and the
/// salt, so planets with different salts see unrelated fields. Unregistered
/// sources sample as `0.0`.
pub struct SimplexNoiseTable {
    seed: u64,
    fields: FxHashMap<NoiseSource, Simplex>,
}

impl SimplexNoiseTable {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fields: FxHashMap::default(),
        }
    }

    /// A table with every source used by `graph` registered.
    pub fn for_graph(seed: u64, graph: &DensityGraph) -> Self {
        let mut table = Self::new(seed);
        for (_, node) in graph.iter() {
            table.register_all(node);
        }
        table
    }

    /// A table with every source used by `node` registered.
    pub fn for_node(seed: u64, node: &DensityNode) -> Self {
        let mut table = Self::new(seed);
        table.register_all(node);
        table
    }

    pub fn register(&mut self, source: &NoiseSource) {
        if !self.fields.contains_key(source) {
            let field = Simplex::new(field_seed(self.seed, source));
            self.fields.insert(source.clone(), field);
        }
    }

    pub fn register_all(&mut self, node: &DensityNode) {
        for source in node.noise_sources() {
            self.register(&source);
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl NoiseTable for SimplexNoiseTable {
    fn sample(&self, source: &NoiseSource, x: f64, y: f64, z: f64) -> f64 {
        self.fields
            .get(source)
            .map_or(0.0, |field| field.get([x, y, z]))
    }
}

fn field_seed(world_seed: u64, source: &NoiseSource) -> u32 {
    let mut hasher = FxHasher::default();
    world_seed.hash(&mut hasher);
    source.id.as_str().hash(&mut hasher);
    source.salt.hash(&mut hasher);
    let h = hasher.finish();
    (h ^ (h >> 32)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Identifier;

    fn source(path: &str, salt: i32) -> NoiseSource {
        NoiseSource::new(Identifier::minecraft(path).unwrap(), salt)
    }

    #[test]
    fn test_same_seed_same_values() {
        let mut a = SimplexNoiseTable::new(42);
        let mut b = SimplexNoiseTable::new(42);
        let s = source("continentalness", 0);
        a.register(&s);
        b.register(&s);
        for i in 0..100 {
            let p = f64::from(i) * 0.37;
            assert_eq!(a.sample(&s, p, 0.0, -p), b.sample(&s, p, 0.0, -p));
        }
    }

    #[test]
    fn test_salt_changes_field() {
        let mut table = SimplexNoiseTable::new(42);
        let plain = source("erosion", 0);
        let salted = source("erosion", 1000);
        table.register(&plain);
        table.register(&salted);
        let differs = (0..50).any(|i| {
            let p = f64::from(i) * 1.3 + 0.1;
            table.sample(&plain, p, 0.0, p) != table.sample(&salted, p, 0.0, p)
        });
        assert!(differs, "salted and unsalted fields should not coincide");
    }

    #[test]
    fn test_unregistered_source_is_zero() {
        let table = SimplexNoiseTable::new(1);
        assert_eq!(table.sample(&source("ridge", 0), 1.5, 2.5, 3.5), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut table = SimplexNoiseTable::new(1);
        let s = source("ridge", 7);
        table.register(&s);
        table.register(&s);
        assert_eq!(table.len(), 1);
    }
}
