//! Writes compiled planets as host worldgen JSON documents.
//!
//! Layout under the output root:
//!
//! ```text
//! <root>/<planet>/density_function/<sub-graph>.json
//! <root>/<planet>/noise_settings.json
//! <root>/<planet>/ores.json
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use strata_terrain::CompiledPlanet;

#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// What was written for one planet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenPlanet {
    pub dir: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Serializes `value` to `path`, creating parent directories as needed.
pub fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> Result<(), WriteError> {
    let encoded = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(|source| WriteError::Encode {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| WriteError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, encoded).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every document for `planet` under `root/<planet id>`.
pub fn write_planet(
    root: &Path,
    planet: &CompiledPlanet,
    pretty: bool,
) -> Result<WrittenPlanet, WriteError> {
    let dir = root.join(&planet.id);
    let mut files = Vec::with_capacity(planet.density.len() + 2);

    for (name, node) in planet.density.iter() {
        let path = dir
            .join("density_function")
            .join(format!("{}.json", name.as_str()));
        write_json(&path, &**node, pretty)?;
        files.push(path);
    }

    let settings = dir.join("noise_settings.json");
    write_json(&settings, &planet.noise_settings_document(), pretty)?;
    files.push(settings);

    let ores = dir.join("ores.json");
    write_json(&ores, &planet.ores, pretty)?;
    files.push(ores);

    tracing::debug!(planet = %planet.id, files = files.len(), "Wrote planet documents");
    Ok(WrittenPlanet { dir, files })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_terrain::{OreId, OreSettings, OreVeinSpec, PlanetDefinition, compile_planet};

    fn read_json(path: &Path) -> serde_json::Value {
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
    }

    #[test]
    fn test_write_planet_layout() {
        let dir = tempfile::tempdir().unwrap();
        let planet = compile_planet(&PlanetDefinition::new("moon")).unwrap();
        let written = write_planet(dir.path(), &planet, true).unwrap();

        assert_eq!(written.dir, dir.path().join("moon"));
        assert_eq!(written.files.len(), planet.density.len() + 2);
        for file in &written.files {
            assert!(file.exists(), "{} missing", file.display());
        }
        assert!(
            dir.path()
                .join("moon/density_function/final_density.json")
                .exists()
        );
    }

    #[test]
    fn test_noise_settings_router_points_at_planet() {
        let dir = tempfile::tempdir().unwrap();
        let planet = compile_planet(&PlanetDefinition::new("mars")).unwrap();
        write_planet(dir.path(), &planet, false).unwrap();

        let doc = read_json(&dir.path().join("mars/noise_settings.json"));
        assert_eq!(doc["noise_router"]["final_density"], "mars:final_density");
        assert_eq!(doc["noise_router"]["barrier"], 0.0);
        assert_eq!(doc["surface_rule"]["type"], "minecraft:sequence");
    }

    #[test]
    fn test_ores_document_lists_placements() {
        let dir = tempfile::tempdir().unwrap();
        let def = PlanetDefinition {
            ores: OreSettings {
                veins: vec![OreVeinSpec::new(OreId::Diamond)],
                ..OreSettings::default()
            },
            ..PlanetDefinition::new("glacio")
        };
        let planet = compile_planet(&def).unwrap();
        write_planet(dir.path(), &planet, true).unwrap();

        let ores = read_json(&dir.path().join("glacio/ores.json"));
        let ores = ores.as_array().unwrap();
        assert_eq!(ores.len(), 1);
        assert_eq!(ores[0]["ore"], "diamond");
    }

    #[test]
    fn test_write_into_file_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        let err = write_json(&blocker.join("x.json"), &1, false).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
