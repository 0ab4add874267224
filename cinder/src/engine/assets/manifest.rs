use crate::engine::assets::ResourceId;
use crate::utils::write_atomic;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu, ensure};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MANIFEST_VERSION: u32 = 1;
pub const DEFAULT_MANIFEST_NAME: &str = "BuiltinResources";

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ManifestError {
    #[snafu(display("Failed to read manifest {}: {source}", path.display()))]
    Read { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to write manifest {}: {source}", path.display()))]
    Write { path: PathBuf, source: io::Error },

    #[snafu(display("Manifest {} is malformed: {source}", path.display()))]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Failed to encode manifest {name}: {source}"))]
    Encode {
        name: String,
        source: serde_json::Error,
    },

    #[snafu(display(
        "Manifest {} has version {found}, expected {MANIFEST_VERSION}",
        path.display()
    ))]
    Version { path: PathBuf, found: u32 },
}

#[derive(Serialize, Deserialize)]
struct ManifestFile {
    name: String,
    version: u32,
    entries: BTreeMap<ResourceId, PathBuf>,
}

/// Ledger of every resource id and the artifact it was written to.
///
/// Entries are kept absolute in memory and stored relative to a base directory on disk, so
/// a data folder can be moved as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceManifest {
    name: String,
    entries: BTreeMap<ResourceId, PathBuf>,
}

impl Default for ResourceManifest {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST_NAME)
    }
}

impl ResourceManifest {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers `id` at `path`, replacing any earlier path of the same id.
    pub fn register(&mut self, id: ResourceId, path: impl Into<PathBuf>) {
        self.entries.insert(id, path.into());
    }

    pub fn unregister(&mut self, id: ResourceId) -> Option<PathBuf> {
        self.entries.remove(&id)
    }

    /// Removes every entry pointing at `path` and returns the ids that were dropped.
    pub fn unregister_path(&mut self, path: &Path) -> Vec<ResourceId> {
        let ids: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, p)| p.as_path() == path)
            .map(|(id, _)| *id)
            .collect();
        for id in &ids {
            self.entries.remove(id);
        }
        ids
    }

    pub fn resolve(&self, id: ResourceId) -> Option<&Path> {
        self.entries.get(&id).map(PathBuf::as_path)
    }

    pub fn id_for_path(&self, path: &Path) -> Option<ResourceId> {
        self.entries
            .iter()
            .find(|(_, p)| p.as_path() == path)
            .map(|(id, _)| *id)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, &Path)> {
        self.entries.iter().map(|(id, p)| (*id, p.as_path()))
    }

    /// Loads a manifest, making every stored path absolute against `base`.
    pub fn load(path: &Path, base: &Path) -> Result<Self, ManifestError> {
        let bytes = fs::read(path).context(ReadErr { path })?;
        let file: ManifestFile = serde_json::from_slice(&bytes).context(ParseErr { path })?;
        ensure!(
            file.version == MANIFEST_VERSION,
            VersionErr {
                path,
                found: file.version
            }
        );

        let entries = file
            .entries
            .into_iter()
            .map(|(id, p)| (id, base.join(p)))
            .collect();

        Ok(Self {
            name: file.name,
            entries,
        })
    }

    /// Like [`ResourceManifest::load`], but a missing or unreadable manifest yields a fresh one.
    pub fn load_or_create(path: &Path, base: &Path) -> Self {
        match Self::load(path, base) {
            Ok(manifest) => manifest,
            Err(ManifestError::Read { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                debug!("[Import] No manifest at {}, starting fresh", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("[Import] {e}. Starting with a fresh manifest");
                Self::default()
            }
        }
    }

    /// Writes the manifest atomically with paths relative to `base` where possible.
    pub fn save(&self, path: &Path, base: &Path) -> Result<(), ManifestError> {
        let entries = self
            .entries
            .iter()
            .map(|(id, p)| {
                let relative = p.strip_prefix(base).unwrap_or(p);
                (*id, relative.to_path_buf())
            })
            .collect();

        let file = ManifestFile {
            name: self.name.clone(),
            version: MANIFEST_VERSION,
            entries,
        };
        let bytes = serde_json::to_vec_pretty(&file).context(EncodeErr {
            name: self.name.clone(),
        })?;

        write_atomic(path, &bytes).context(WriteErr { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_overwrites() {
        let mut manifest = ResourceManifest::default();
        let id = ResourceId::new();
        manifest.register(id, "/data/a.asset");
        manifest.register(id, "/data/b.asset");

        assert_eq!(manifest.len(), 1);
        assert_eq!(manifest.resolve(id), Some(Path::new("/data/b.asset")));
    }

    #[test]
    fn unregister_path_drops_all_matching() {
        let mut manifest = ResourceManifest::default();
        let a = ResourceId::new();
        let b = ResourceId::new();
        manifest.register(a, "/data/a.asset");
        manifest.register(b, "/data/b.asset");

        let dropped = manifest.unregister_path(Path::new("/data/a.asset"));

        assert_eq!(dropped, vec![a]);
        assert!(!manifest.contains(a));
        assert_eq!(manifest.id_for_path(Path::new("/data/b.asset")), Some(b));
    }
}
