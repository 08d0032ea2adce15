//! Turning a `plinth.toml` project into build inputs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use plinth_cache::{BuildCache, DirBackend};
use plinth_config::{load_config, ConfigError, ProjectConfig};

use crate::compiled::Bundle;
use crate::dag::{build, BuildOptions};
use crate::error::BuildError;
use crate::toolchain::Toolchain;
use crate::validator::{Purpose, Validator, ValidatorSet};

/// A loaded project: its validator set, build options, and cache.
#[derive(Debug)]
pub struct Project {
    /// Directory holding `plinth.toml`; sources are relative to it.
    pub root: PathBuf,
    /// Validators and modules with their sources read.
    pub set: ValidatorSet,
    /// Build settings.
    pub options: BuildOptions,
    /// Cache, unless disabled.
    pub cache: Option<BuildCache>,
}

impl Project {
    /// Loads `<root>/plinth.toml` and reads every source it names.
    pub fn load(root: &Path) -> Result<Self, BuildError> {
        let config = load_config(root)?;
        Self::from_config(root, &config)
    }

    /// Builds a project from an already loaded configuration.
    pub fn from_config(root: &Path, config: &ProjectConfig) -> Result<Self, BuildError> {
        let mut set = ValidatorSet::new();
        for (name, path) in &config.modules {
            set.insert_module(name.clone(), read_source(root, path)?);
        }
        for (name, decl) in &config.validators {
            let purpose: Purpose = decl.purpose.parse().map_err(|_| BuildError::UnknownPurpose {
                validator: name.clone(),
                purpose: decl.purpose.clone(),
            })?;
            set.insert(Validator {
                name: name.clone(),
                purpose,
                source: read_source(root, &decl.source)?,
                modules: decl.modules.clone(),
                hash_dependencies: decl.hash_dependencies.clone(),
                depends_on_own_hash: decl.depends_on_own_hash,
                redeemer: decl.redeemer.clone(),
                datum: decl.datum.clone(),
            });
        }

        let expected_hashes = config
            .expected_hashes
            .iter()
            .map(|(name, digest)| {
                let bytes = hex::decode(digest).map_err(|e| {
                    ConfigError::ValidationError(format!("expected hash for '{name}': {e}"))
                })?;
                Ok((name.clone(), bytes))
            })
            .collect::<Result<BTreeMap<_, _>, BuildError>>()?;

        let options = BuildOptions {
            is_mainnet: config.build.is_mainnet,
            debug: config.build.debug,
            expected_hashes,
            parameters: BTreeMap::new(),
        };

        let cache = if !config.cache.enabled {
            None
        } else if config.cache.positional {
            Some(BuildCache::positional())
        } else if let Some(dir) = &config.cache.dir {
            Some(BuildCache::new(Box::new(DirBackend::new(&root.join(dir)))))
        } else {
            Some(BuildCache::in_memory())
        };

        Ok(Self {
            root: root.to_path_buf(),
            set,
            options,
            cache,
        })
    }

    /// Builds the project with `toolchain`.
    pub fn build(&mut self, toolchain: &dyn Toolchain) -> Result<Bundle, BuildError> {
        build(toolchain, &self.set, &self.options, self.cache.as_mut())
    }
}

fn read_source(root: &Path, relative: &str) -> Result<String, BuildError> {
    let path = root.join(relative);
    std::fs::read_to_string(&path).map_err(|source| BuildError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use plinth_cache::CacheMode;
    use plinth_config::CONFIG_FILE;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    const CONFIG: &str = r#"
[build]
is_mainnet = true

[expected_hashes]
vault = "00ff"

[modules]
utils = "src/utils.hl"

[validators.vault]
purpose = "spending"
source = "src/vault.hl"
modules = ["utils"]
hash_dependencies = ["mint"]
redeemer = { kind = "primitive", primitive = "int" }
datum = { kind = "primitive", primitive = "data" }

[validators.mint]
purpose = "rewarding"
source = "src/mint.hl"
redeemer = { kind = "primitive", primitive = "int" }
"#;

    fn project_dir(config: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), CONFIG_FILE, config);
        write(dir.path(), "src/utils.hl", "module utils");
        write(dir.path(), "src/vault.hl", "spending vault");
        write(dir.path(), "src/mint.hl", "staking mint");
        dir
    }

    #[test]
    fn loads_sources_and_options() {
        let dir = project_dir(CONFIG);
        let project = Project::load(dir.path()).unwrap();
        let vault = project.set.get("vault").unwrap();
        assert_eq!(vault.source, "spending vault");
        assert_eq!(vault.purpose, Purpose::Spending);
        assert_eq!(project.set.get("mint").unwrap().purpose, Purpose::Staking);
        assert_eq!(project.set.module("utils"), Some("module utils"));
        assert!(project.options.is_mainnet);
        assert_eq!(project.options.expected_hashes["vault"], vec![0x00, 0xff]);
        assert_eq!(project.cache.as_ref().unwrap().mode(), CacheMode::Keyed);
        assert!(project.set.check().is_ok());
    }

    #[test]
    fn unknown_purpose() {
        let dir = project_dir(&CONFIG.replace("rewarding", "voting"));
        let err = Project::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnknownPurpose { validator, purpose } if validator == "mint" && purpose == "voting"
        ));
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = project_dir(CONFIG);
        std::fs::remove_file(dir.path().join("src/mint.hl")).unwrap();
        let err = Project::load(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Io { path, .. } if path.ends_with("src/mint.hl")));
    }

    #[test]
    fn cache_settings() {
        let disabled = project_dir(&format!("{CONFIG}\n[cache]\nenabled = false\n"));
        assert!(Project::load(disabled.path()).unwrap().cache.is_none());

        let positional = project_dir(&format!("{CONFIG}\n[cache]\npositional = true\n"));
        let project = Project::load(positional.path()).unwrap();
        assert_eq!(project.cache.unwrap().mode(), CacheMode::Positional);
    }

    #[test]
    fn config_errors_propagate() {
        let dir = tempfile::tempdir().unwrap();
        let err = Project::load(dir.path()).unwrap_err();
        assert!(matches!(err, BuildError::Config(_)));
    }
}
