//! Turning raw source files into [`Resource`]s.
//!
//! Every file format is handled by an [`AssetImporter`]. The [`Importer`] registry picks
//! the importer by file extension and the [`ImportPipeline`] drives whole directory trees
//! through it, writing artifacts and keeping the
//! [`ResourceManifest`](crate::assets::ResourceManifest) up to date.

mod font;
mod pipeline;
mod shader;
mod texture;

pub use font::*;
pub use pipeline::*;
pub use shader::*;
pub use texture::*;

use crate::engine::assets::{ArtifactError, FontRenderMode, Resource};
use log::trace;
use snafu::Snafu;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)), visibility(pub(crate)))]
pub enum ImportError {
    #[snafu(display("No importer can handle {}", path.display()))]
    NoImporter { path: PathBuf },

    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("Failed to decode image {}: {source}", path.display()))]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[snafu(display("{} cannot be imported with {given} options", path.display()))]
    OptionsMismatch { path: PathBuf, given: OptionsKind },

    #[snafu(display("Failed to load font {}: {reason}", path.display()))]
    Font { path: PathBuf, reason: String },

    #[snafu(display("{} includes \"{include}\", which was not imported", path.display()))]
    MissingInclude { path: PathBuf, include: String },

    #[snafu(display("{} includes \"{include}\" recursively", path.display()))]
    IncludeCycle { path: PathBuf, include: String },

    #[snafu(display("{} has no known shader stage extension", path.display()))]
    UnknownStage { path: PathBuf },

    #[snafu(display("{source}"))]
    Artifact { source: ArtifactError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureImportOptions {
    pub srgb: bool,
    /// Keep a CPU copy around after upload.
    pub cpu_readable: bool,
}

impl Default for TextureImportOptions {
    fn default() -> Self {
        Self {
            srgb: true,
            cpu_readable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontImportOptions {
    /// Point sizes to render a bitmap for.
    pub sizes: Vec<u32>,
    pub render_mode: FontRenderMode,
    pub dpi: u32,
    /// Inclusive ranges of code points to render.
    pub char_ranges: Vec<(u32, u32)>,
    /// Width and height of each bitmap page in texels.
    pub page_size: u32,
}

impl Default for FontImportOptions {
    fn default() -> Self {
        Self {
            sizes: vec![10],
            render_mode: FontRenderMode::default(),
            dpi: 96,
            char_ranges: vec![(32, 126)],
            page_size: 512,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOptions {
    Texture(TextureImportOptions),
    Font(FontImportOptions),
    Shader,
    ShaderInclude,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsKind {
    Texture,
    Font,
    Shader,
    ShaderInclude,
}

impl Display for OptionsKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OptionsKind::Texture => "texture",
            OptionsKind::Font => "font",
            OptionsKind::Shader => "shader",
            OptionsKind::ShaderInclude => "shader include",
        };
        f.write_str(name)
    }
}

impl ImportOptions {
    pub fn kind(&self) -> OptionsKind {
        match self {
            ImportOptions::Texture(_) => OptionsKind::Texture,
            ImportOptions::Font(_) => OptionsKind::Font,
            ImportOptions::Shader => OptionsKind::Shader,
            ImportOptions::ShaderInclude => OptionsKind::ShaderInclude,
        }
    }

    pub fn as_font_mut(&mut self) -> Option<&mut FontImportOptions> {
        match self {
            ImportOptions::Font(options) => Some(options),
            _ => None,
        }
    }

    pub fn as_texture_mut(&mut self) -> Option<&mut TextureImportOptions> {
        match self {
            ImportOptions::Texture(options) => Some(options),
            _ => None,
        }
    }
}

/// A resource that is written next to the primary artifact of an import.
#[derive(Debug, Clone)]
pub struct AuxiliaryResource {
    /// Appended to the output name as `<name>_<suffix>.asset`.
    pub suffix: String,
    pub resource: Resource,
}

#[derive(Debug, Clone)]
pub struct ImportOutput {
    pub primary: Resource,
    pub auxiliary: Vec<AuxiliaryResource>,
}

impl ImportOutput {
    pub fn single(primary: Resource) -> Self {
        Self {
            primary,
            auxiliary: Vec::new(),
        }
    }
}

pub trait AssetImporter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Lowercase file extensions without the leading dot.
    fn extensions(&self) -> &[&'static str];

    fn default_options(&self, path: &Path) -> ImportOptions;

    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportOutput, ImportError>;
}

/// Registry of every known [`AssetImporter`], keyed by file extension.
#[derive(Default)]
pub struct Importer {
    importers: Vec<Box<dyn AssetImporter>>,
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture, font, shader and shader include importers. Shaders resolve their includes
    /// from the include artifacts in `include_dir`.
    pub fn with_defaults(include_dir: impl Into<PathBuf>) -> Self {
        let mut importer = Self::new();
        importer.register(TextureImporter);
        importer.register(FontImporter);
        importer.register(ShaderIncludeImporter);
        importer.register(ShaderImporter::new(include_dir));
        importer
    }

    pub fn register<I: AssetImporter + 'static>(&mut self, importer: I) {
        self.importers.push(Box::new(importer));
    }

    pub fn importer_for(&self, path: &Path) -> Option<&dyn AssetImporter> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.importers
            .iter()
            .find(|i| i.extensions().contains(&ext.as_str()))
            .map(Box::as_ref)
    }

    pub fn supports(&self, path: &Path) -> bool {
        self.importer_for(path).is_some()
    }

    /// The options `path` would be imported with by default.
    pub fn create_import_options(&self, path: &Path) -> Option<ImportOptions> {
        self.importer_for(path).map(|i| i.default_options(path))
    }

    pub fn import(
        &self,
        path: &Path,
        options: Option<&ImportOptions>,
    ) -> Result<ImportOutput, ImportError> {
        let importer = self
            .importer_for(path)
            .ok_or_else(|| ImportError::NoImporter {
                path: path.to_path_buf(),
            })?;

        trace!("[Import] {} <- {}", importer.name(), path.display());
        match options {
            Some(options) => importer.import(path, options),
            None => importer.import(path, &importer.default_options(path)),
        }
    }

    /// Imports `path` again on behalf of an already existing resource, keeping its id.
    pub fn reimport(
        &self,
        existing: &Resource,
        path: &Path,
        options: Option<&ImportOptions>,
    ) -> Result<ImportOutput, ImportError> {
        let mut output = self.import(path, options)?;
        output.primary.id = existing.id;
        Ok(output)
    }
}

/// File name used as the resource name, e.g. `White.png`.
pub(crate) fn resource_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn importer_picked_by_extension() {
        let importer = Importer::with_defaults("Includes");

        assert_eq!(
            importer.importer_for(Path::new("Skin/White.PNG")).map(|i| i.name()),
            Some("texture")
        );
        assert_eq!(
            importer.importer_for(Path::new("Shaders/Sprite.vert")).map(|i| i.name()),
            Some("shader")
        );
        assert!(!importer.supports(Path::new("README")));
        assert!(!importer.supports(Path::new("notes.txt")));
    }

    #[test]
    fn options_follow_importer() {
        let importer = Importer::with_defaults("Includes");

        let font = importer.create_import_options(Path::new("arial.ttf"));
        let texture = importer.create_import_options(Path::new("arial.png"));

        assert_eq!(font.map(|o| o.kind()), Some(OptionsKind::Font));
        assert_eq!(texture.map(|o| o.kind()), Some(OptionsKind::Texture));
    }

    #[test]
    fn unknown_file_fails() {
        let importer = Importer::new();
        let err = importer.import(Path::new("x.bin"), None).unwrap_err();
        assert!(matches!(err, ImportError::NoImporter { .. }));
    }
}
