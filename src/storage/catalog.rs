//! Goal catalog storage: mission and title definitions.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::model::{GoalDefinition, GoalKind};

use super::{Result, Storage, StorageError, write_atomic};

const MISSIONS_FILE: &str = "missions.json";
const TITLES_FILE: &str = "titles.json";

/// All goal definitions, grouped the way they are stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub main_missions: Vec<GoalDefinition>,
    pub sub_missions: Vec<GoalDefinition>,
    pub titles: Vec<GoalDefinition>,
}

impl Catalog {
    /// Iterates every definition along with the list it came from.
    pub fn iter(&self) -> impl Iterator<Item = (GoalKind, &GoalDefinition)> {
        let main = self.main_missions.iter().map(|d| (GoalKind::MainMission, d));
        let sub = self.sub_missions.iter().map(|d| (GoalKind::SubMission, d));
        let titles = self.titles.iter().map(|d| (GoalKind::Title, d));
        main.chain(sub).chain(titles)
    }

    pub fn len(&self) -> usize {
        self.main_missions.len() + self.sub_missions.len() + self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends a definition to the list for `kind`.
    pub fn push(&mut self, kind: GoalKind, def: GoalDefinition) {
        match kind {
            GoalKind::MainMission => self.main_missions.push(def),
            GoalKind::SubMission => self.sub_missions.push(def),
            GoalKind::Title => self.titles.push(def),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.iter().any(|(_, d)| d.id == id)
    }
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct MissionsFile {
    main_missions: Vec<GoalDefinition>,
    sub_missions: Vec<GoalDefinition>,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct TitlesFile {
    titles: Vec<GoalDefinition>,
}

impl Storage {
    /// Loads mission and title definitions. Missing files are empty lists.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let missions: MissionsFile = read_or_default(&self.path(MISSIONS_FILE))?;
        let titles: TitlesFile = read_or_default(&self.path(TITLES_FILE))?;
        Ok(Catalog {
            main_missions: missions.main_missions,
            sub_missions: missions.sub_missions,
            titles: titles.titles,
        })
    }

    /// Writes both catalog files, each replaced atomically.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        let missions = MissionsFile {
            main_missions: catalog.main_missions.clone(),
            sub_missions: catalog.sub_missions.clone(),
        };
        let titles = TitlesFile {
            titles: catalog.titles.clone(),
        };
        write_atomic(
            &self.path(MISSIONS_FILE),
            serde_json::to_string_pretty(&missions)?.as_bytes(),
        )?;
        write_atomic(
            &self.path(TITLES_FILE),
            serde_json::to_string_pretty(&titles)?.as_bytes(),
        )?;
        Ok(())
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    match fs::read_to_string(path) {
        Ok(json) => serde_json::from_str(&json).map_err(|e| StorageError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(e.into()),
    }
}
