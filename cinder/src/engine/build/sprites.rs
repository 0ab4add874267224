use crate::engine::assets::{Resource, ResourceData, ResourceManifest, SpriteTexture, load_artifact};
use crate::engine::import::{ImportReport, collect_garbage, preserved_id, save_registered};
use cinder_utils::is_artifact;
use log::{debug, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const SPRITE_PREFIX: &str = "sprite_";

/// Where the sprite for the skin artifact `skin_artifact` lives.
pub fn sprite_path(skin_dir: &Path, sprites_dir: &Path, skin_artifact: &Path) -> Option<PathBuf> {
    let relative = skin_artifact.strip_prefix(skin_dir).ok()?;
    let file_name = relative.file_name()?.to_string_lossy();
    Some(
        sprites_dir
            .join(relative)
            .with_file_name(format!("{SPRITE_PREFIX}{file_name}")),
    )
}

/// Creates a sprite covering the whole texture for every texture artifact under `skin_dir`
/// and removes sprites whose texture is gone.
pub fn generate_sprite_textures(
    skin_dir: &Path,
    sprites_dir: &Path,
    manifest: &mut ResourceManifest,
) -> ImportReport {
    let mut report = ImportReport::default();
    let mut current = HashSet::new();

    let skin_artifacts = WalkDir::new(skin_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && is_artifact(e.path()));

    for entry in skin_artifacts {
        let path = entry.path();
        let Some(out) = sprite_path(skin_dir, sprites_dir, path) else {
            continue;
        };

        let texture = match load_artifact(path) {
            Ok(texture) if texture.as_texture().is_some() => texture,
            Ok(other) => {
                debug!("[Build] {} is a {}, no sprite for it", path.display(), other.kind());
                continue;
            }
            Err(e) => {
                warn!("[Build] Cannot create sprite: {e}");
                report.failed.push(path.to_path_buf());
                continue;
            }
        };

        let mut sprite = Resource::new(
            texture.name.clone(),
            ResourceData::SpriteTexture(SpriteTexture::full(texture.id)),
        );
        let fresh = match preserved_id(&out, manifest) {
            Some(id) => {
                sprite.id = id;
                false
            }
            None => true,
        };

        if let Err(e) = save_registered(&sprite, &out, manifest) {
            warn!("[Build] Failed to save sprite for {}: {e}", path.display());
            report.failed.push(path.to_path_buf());
            continue;
        }

        current.insert(out.clone());
        if fresh {
            report.imported.push(out);
        } else {
            report.reimported.push(out);
        }
    }

    collect_garbage(sprites_dir, &current, manifest, &mut report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sprite_paths_mirror_skin() {
        let p = sprite_path(
            Path::new("/data/Skin"),
            Path::new("/data/Sprites"),
            Path::new("/data/Skin/Buttons/Normal.png.asset"),
        );
        assert_eq!(
            p,
            Some(PathBuf::from("/data/Sprites/Buttons/sprite_Normal.png.asset"))
        );
    }
}
