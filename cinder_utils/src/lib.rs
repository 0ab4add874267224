use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Extension every processed artifact carries on top of its source file name.
pub const ARTIFACT_EXTENSION: &str = "asset";

/// Appends `.ext` to the file name of `path` without replacing an existing extension.
///
/// `Shaders/Sprite.vert` becomes `Shaders/Sprite.vert.asset`.
pub fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(ToOwned::to_owned)
        .unwrap_or_default();
    name.push(".");
    name.push(ext);
    path.with_file_name(name)
}

/// Maps a file under `source_root` to its artifact path under `dest_root`.
///
/// Returns `None` if `file` does not live under `source_root`.
pub fn artifact_path(source_root: &Path, dest_root: &Path, file: &Path) -> Option<PathBuf> {
    let relative = file.strip_prefix(source_root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    Some(append_extension(&dest_root.join(relative), ARTIFACT_EXTENSION))
}

/// True if the path ends in the artifact extension.
pub fn is_artifact(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == ARTIFACT_EXTENSION)
}

/// The file name of `path` with the artifact extension removed, if it has one.
pub fn artifact_stem(path: &Path) -> Option<String> {
    if !is_artifact(path) {
        return None;
    }
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_keeps_existing_extension() {
        let p = append_extension(Path::new("Shaders/Sprite.vert"), "asset");
        assert_eq!(p, PathBuf::from("Shaders/Sprite.vert.asset"));
    }

    #[test]
    fn artifact_path_mirrors_tree() {
        let p = artifact_path(
            Path::new("/raw/Skin"),
            Path::new("/data/Skin"),
            Path::new("/raw/Skin/Buttons/Normal.png"),
        );
        assert_eq!(p, Some(PathBuf::from("/data/Skin/Buttons/Normal.png.asset")));
    }

    #[test]
    fn artifact_path_rejects_foreign_files() {
        let p = artifact_path(
            Path::new("/raw/Skin"),
            Path::new("/data/Skin"),
            Path::new("/raw/Icons/Logo.png"),
        );
        assert_eq!(p, None);
    }

    #[test]
    fn artifact_stem_strips_only_asset() {
        assert_eq!(
            artifact_stem(Path::new("Skin/White.png.asset")).as_deref(),
            Some("White.png")
        );
        assert_eq!(artifact_stem(Path::new("Skin/White.png")), None);
    }
}
