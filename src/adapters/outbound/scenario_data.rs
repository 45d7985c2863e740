use crate::common::{DomainError, DomainResult};
use crate::domains::mapf::{Scenario, ScenarioSource};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "CBS_PLANNER_DATA_DIR";
const EXTENSION: &str = "toml";

/// Scenario files (`<name>.toml`) in one directory.
pub struct FilesystemScenarioSource {
    base: PathBuf,
}

impl FilesystemScenarioSource {
    /// Precedence: explicit dir -> `CBS_PLANNER_DATA_DIR` ->
    /// `./resources/scenarios` -> `/usr/share/cbs-planner/scenarios`.
    pub fn new(base: Option<PathBuf>) -> Self {
        let base = base.unwrap_or_else(|| {
            if let Ok(v) = env::var(DATA_DIR_ENV) {
                PathBuf::from(v)
            } else {
                let cwd_default = Path::new("resources/scenarios");
                if cwd_default.exists() {
                    cwd_default.to_path_buf()
                } else {
                    PathBuf::from("/usr/share/cbs-planner/scenarios")
                }
            }
        });
        Self { base }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Loads a scenario from an arbitrary file. A missing `name` is taken
    /// from the file stem.
    pub fn load_file(path: &Path) -> DomainResult<Scenario> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DomainError::ScenarioNotFound {
                name: path.display().to_string(),
            },
            _ => DomainError::InfrastructureError(format!("{}: {}", path.display(), e)),
        })?;
        let mut scenario = Scenario::from_toml_str(&content)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Writes `scenario` as `<name>.toml`, creating the directory if needed.
    pub fn save_scenario(&self, scenario: &Scenario) -> DomainResult<PathBuf> {
        if scenario.name.is_empty() {
            return Err(DomainError::invalid("cannot save a scenario without a name"));
        }
        fs::create_dir_all(&self.base)
            .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        let path = self.path_for(&scenario.name);
        fs::write(&path, scenario.to_toml_string()?)
            .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?;
        Ok(path)
    }

    fn path_for(&self, name: &str) -> PathBuf {
        let mut p = self.base.join(name);
        if p.extension().map_or(true, |ext| ext != EXTENSION) {
            p.set_extension(EXTENSION);
        }
        p
    }
}

impl ScenarioSource for FilesystemScenarioSource {
    fn load_scenario(&self, name: &str) -> DomainResult<Scenario> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Err(DomainError::ScenarioNotFound {
                name: name.to_string(),
            });
        }
        Self::load_file(&path)
    }

    fn list_scenarios(&self) -> DomainResult<Vec<String>> {
        let entries = match fs::read_dir(&self.base) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DomainError::InfrastructureError(format!("{}", e))),
        };

        let mut names = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| DomainError::InfrastructureError(format!("{}", e)))?
                .path();
            if path.extension().is_some_and(|ext| ext == EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    names.push(stem.to_string_lossy().into_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
