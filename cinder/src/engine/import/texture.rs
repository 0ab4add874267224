use crate::engine::assets::{Resource, ResourceData, Texture};
use crate::engine::import::{
    AssetImporter, ImageErr, ImportError, ImportOptions, ImportOutput, OptionsMismatchErr,
    TextureImportOptions, resource_name,
};
use snafu::ResultExt;
use std::path::Path;

/// Decodes common image formats into RGBA8 textures.
pub struct TextureImporter;

impl AssetImporter for TextureImporter {
    fn name(&self) -> &'static str {
        "texture"
    }

    fn extensions(&self) -> &[&'static str] {
        &["png", "jpg", "jpeg", "bmp", "tga", "gif", "tif", "tiff", "webp", "ico"]
    }

    fn default_options(&self, _path: &Path) -> ImportOptions {
        ImportOptions::Texture(TextureImportOptions::default())
    }

    fn import(&self, path: &Path, options: &ImportOptions) -> Result<ImportOutput, ImportError> {
        let ImportOptions::Texture(options) = options else {
            return OptionsMismatchErr {
                path,
                given: options.kind(),
            }
            .fail();
        };

        let texture =
            Texture::load_image(path, options.srgb, options.cpu_readable).context(ImageErr { path })?;

        Ok(ImportOutput::single(Resource::new(
            resource_name(path),
            ResourceData::Texture(texture),
        )))
    }
}
