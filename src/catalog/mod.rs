use crate::workout::Workout;
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::error::Error;

static CATALOG_DIR: Dir = include_dir!("src/catalog/data");

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "title_case")]
pub enum BodyPart {
    Chest,
    Back,
    Shoulders,
    Arms,
    Legs,
    Core,
    FullBody,
    Cardio,
}

/// One entry in the exercise catalog. `key` is the stable reference stored on
/// session exercises for icon/metadata lookup.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub name: String,
    pub body_part: BodyPart,
    #[serde(default)]
    pub default_rest_secs: Option<u32>,
}

/// Lookup collaborator for the add-exercise flow. The session controller
/// takes this as an injected dependency so tests can supply a fixed list.
pub trait CatalogSource {
    fn search(&self, query: &str, body_part: Option<BodyPart>) -> Vec<CatalogEntry>;
}

/// Catalog backed by the JSON shipped inside the binary.
#[derive(Clone, Debug)]
pub struct EmbeddedCatalog {
    entries: Vec<CatalogEntry>,
}

impl EmbeddedCatalog {
    pub fn new() -> Self {
        Self {
            entries: read_entries().expect("embedded exercise catalog is malformed"),
        }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}

impl Default for EmbeddedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogSource for EmbeddedCatalog {
    fn search(&self, query: &str, body_part: Option<BodyPart>) -> Vec<CatalogEntry> {
        let needle = query.trim().to_lowercase();
        self.entries
            .iter()
            .filter(|e| body_part.map_or(true, |bp| e.body_part == bp))
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

fn read_entries() -> Result<Vec<CatalogEntry>, Box<dyn Error>> {
    let file = CATALOG_DIR
        .get_file("exercises.json")
        .expect("exercise catalog not found");

    let file_as_str = file
        .contents_utf8()
        .expect("Unable to interpret catalog as a string");

    let entries = from_str(file_as_str)?;
    Ok(entries)
}

/// Names of the workouts shipped with the binary.
pub fn builtin_workout_names() -> Vec<String> {
    CATALOG_DIR
        .get_dir("workouts")
        .map(|dir| {
            dir.files()
                .filter_map(|f| f.path().file_stem())
                .map(|s| s.to_string_lossy().into_owned())
                .sorted()
                .collect()
        })
        .unwrap_or_default()
}

/// Load a builtin workout by name (file stem under src/catalog/data/workouts).
pub fn builtin_workout(name: &str) -> Option<Workout> {
    let file = CATALOG_DIR.get_file(format!("workouts/{name}.json"))?;
    let file_as_str = file.contents_utf8()?;
    from_str(file_as_str).ok()
}
