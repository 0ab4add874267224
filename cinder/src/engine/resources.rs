//! Runtime access to the built resources.
//!
//! [`Resources`] loads artifacts lazily and keeps them around by id, so two lookups of the
//! same resource through different paths share one [`Arc`]. Shader resources can be turned
//! into programs on a [`GpuThread`]; the resulting handles are cached as well.

use crate::engine::assets::{
    ArtifactError, BuiltinCursor, BuiltinMesh, Hotspot, Resource, ResourceId, ResourceKind,
    ResourceManifest, load_artifact,
};
use crate::engine::build::{AssetCategory, BuildConfig, DEFAULT_SPLASH_SCREEN, SPRITE_PREFIX};
use crate::rendering::{GpuThread, GpuThreadError, ProgramHandle};
use cinder_utils::{ARTIFACT_EXTENSION, append_extension};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use log::{debug, trace};
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Application icon under `Icons/`.
pub const ICON_TEXTURE: &str = "CinderIcon.png";

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ResourceError {
    #[snafu(display("Resource {id} is not in the manifest"))]
    NotFound { id: ResourceId },

    #[snafu(display("{source}"))]
    Artifact { source: ArtifactError },

    #[snafu(display("{name} is a {found}, expected a {expected}"))]
    KindMismatch {
        name: String,
        expected: ResourceKind,
        found: ResourceKind,
    },

    #[snafu(display("Failed to queue program {name}: {source}"))]
    Gpu {
        name: String,
        source: GpuThreadError,
    },
}

pub struct Resources {
    data_root: PathBuf,
    splash_screen: String,
    manifest: ResourceManifest,
    loaded: DashMap<ResourceId, Arc<Resource>>,
    paths: DashMap<PathBuf, ResourceId>,
    programs: DashMap<ResourceId, Arc<ProgramHandle>>,
}

impl Resources {
    pub fn new(data_root: impl Into<PathBuf>, manifest: ResourceManifest) -> Self {
        Self {
            data_root: data_root.into(),
            splash_screen: DEFAULT_SPLASH_SCREEN.to_string(),
            manifest,
            loaded: DashMap::new(),
            paths: DashMap::new(),
            programs: DashMap::new(),
        }
    }

    /// Opens the resources a [`BuildDriver`](crate::build::BuildDriver) produced with `config`.
    pub fn open(config: &BuildConfig) -> Self {
        let manifest =
            ResourceManifest::load_or_create(&config.manifest_path(), &config.data_root);
        let mut resources = Self::new(config.data_root.clone(), manifest);
        resources.splash_screen = config.splash_screen.clone();
        resources
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    /// Loads the artifact at `path`. Relative paths are resolved against the data root.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<Arc<Resource>, ResourceError> {
        let path = self.absolute(path.as_ref());

        if let Some(id) = self.paths.get(&path).map(|id| *id)
            && let Some(resource) = self.loaded.get(&id)
        {
            return Ok(resource.clone());
        }

        let resource = load_artifact(&path).context(ArtifactErr)?;
        trace!("[Resources] Loaded {} from {}", resource.name, path.display());

        let resource = self
            .loaded
            .entry(resource.id)
            .or_insert_with(|| Arc::new(resource))
            .clone();
        self.paths.insert(path, resource.id);
        Ok(resource)
    }

    pub fn load_by_id(&self, id: ResourceId) -> Result<Arc<Resource>, ResourceError> {
        if let Some(resource) = self.loaded.get(&id) {
            return Ok(resource.clone());
        }
        let path = self
            .manifest
            .resolve(id)
            .context(NotFoundErr { id })?
            .to_path_buf();
        self.load(path)
    }

    /// `Shaders/<name>.asset`, where `name` includes the stage extension.
    pub fn shader(&self, name: &str) -> Result<Arc<Resource>, ResourceError> {
        let path = self.category_path(AssetCategory::Shaders, name);
        self.load_kind(path, ResourceKind::Shader)
    }

    /// The sprite generated for the skin texture `name`, like `Buttons/Normal.png`.
    pub fn skin_sprite(&self, name: &str) -> Result<Arc<Resource>, ResourceError> {
        let name = Path::new(name);
        let file = format!(
            "{SPRITE_PREFIX}{}",
            name.file_name().unwrap_or_default().to_string_lossy()
        );
        let relative = name.with_file_name(file);
        let path = self.category_path(AssetCategory::Sprites, &relative.to_string_lossy());
        self.load_kind(path, ResourceKind::SpriteTexture)
    }

    pub fn builtin_mesh(&self, mesh: BuiltinMesh) -> Result<Arc<Resource>, ResourceError> {
        let path = self.category_dir(AssetCategory::Meshes).join(mesh.file_name());
        self.load_kind(path, ResourceKind::Mesh)
    }

    pub fn font(&self, file: &str) -> Result<Arc<Resource>, ResourceError> {
        let path = self.category_path(AssetCategory::Fonts, file);
        self.load_kind(path, ResourceKind::Font)
    }

    /// The cursor texture together with the pixel the pointer sits on.
    pub fn cursor(&self, cursor: BuiltinCursor) -> Result<(Arc<Resource>, Hotspot), ResourceError> {
        let path = self.category_path(AssetCategory::Cursors, cursor.texture_name());
        let texture = self.load_kind(path, ResourceKind::Texture)?;
        Ok((texture, cursor.hotspot()))
    }

    pub fn icon(&self) -> Result<Arc<Resource>, ResourceError> {
        let path = self.category_path(AssetCategory::Icons, ICON_TEXTURE);
        self.load_kind(path, ResourceKind::Texture)
    }

    /// The splash screen texture. Its pixels are always kept on the CPU.
    pub fn splash_screen(&self) -> Result<Arc<Resource>, ResourceError> {
        let path = self.category_path(AssetCategory::SplashScreen, &self.splash_screen);
        self.load_kind(path, ResourceKind::Texture)
    }

    /// The program compiled from a shader resource. The first call queues the compilation on
    /// `gpu`, later calls return the same handle.
    pub fn program(
        &self,
        gpu: &GpuThread,
        resource: &Resource,
    ) -> Result<Arc<ProgramHandle>, ResourceError> {
        let shader = resource.as_shader().context(KindMismatchErr {
            name: resource.name.clone(),
            expected: ResourceKind::Shader,
            found: resource.kind(),
        })?;

        let handle = match self.programs.entry(resource.id) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                debug!("[Resources] Compiling program {}", resource.name);
                let handle = gpu
                    .submit(shader.program_desc(&resource.name))
                    .context(GpuErr {
                        name: resource.name.clone(),
                    })?;
                entry.insert(Arc::new(handle)).clone()
            }
        };
        Ok(handle)
    }

    /// Drops the cached resource and its program. Returns whether anything was cached.
    pub fn unload(&self, id: ResourceId) -> bool {
        self.paths.retain(|_, cached| *cached != id);
        self.programs.remove(&id);
        self.loaded.remove(&id).is_some()
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn load_kind(
        &self,
        path: PathBuf,
        expected: ResourceKind,
    ) -> Result<Arc<Resource>, ResourceError> {
        let resource = self.load(path)?;
        ensure!(
            resource.kind() == expected,
            KindMismatchErr {
                name: resource.name.clone(),
                expected,
                found: resource.kind(),
            }
        );
        Ok(resource)
    }

    fn category_dir(&self, category: AssetCategory) -> PathBuf {
        match category.data_folder() {
            Some(folder) => self.data_root.join(folder),
            None => self.data_root.clone(),
        }
    }

    fn category_path(&self, category: AssetCategory, name: &str) -> PathBuf {
        append_extension(&self.category_dir(category).join(name), ARTIFACT_EXTENSION)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_root.join(path)
        }
    }
}
