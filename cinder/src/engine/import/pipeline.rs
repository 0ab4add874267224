use crate::engine::assets::{
    FontRenderMode, Resource, ResourceId, ResourceManifest, load_artifact, save_artifact,
};
use crate::engine::import::{
    ArtifactErr, AuxiliaryResource, ImportError, ImportOutput, Importer, resource_name,
};
use cinder_utils::{
    ARTIFACT_EXTENSION, append_extension, artifact_path, artifact_stem, is_artifact,
};
use log::{debug, info, trace, warn};
use serde::Deserialize;
use snafu::ResultExt;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// What happens to the previous artifact of a source file that fails to reimport.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep the last artifact that imported fine, together with its manifest entry.
    #[default]
    KeepLastGood,
    /// Treat the asset as gone. Its stale artifact is garbage-collected.
    Discard,
}

/// Outcome of one pass over a directory. Artifact paths unless noted otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: Vec<PathBuf>,
    pub reimported: Vec<PathBuf>,
    /// Source files whose import failed.
    pub failed: Vec<PathBuf>,
    /// Source files no importer handles.
    pub skipped: Vec<PathBuf>,
    /// Previous artifacts of failed imports, kept under [`FailurePolicy::KeepLastGood`].
    pub retained: Vec<PathBuf>,
    pub removed: Vec<PathBuf>,
}

impl ImportReport {
    pub fn is_empty(&self) -> bool {
        self.imported.is_empty()
            && self.reimported.is_empty()
            && self.failed.is_empty()
            && self.skipped.is_empty()
            && self.retained.is_empty()
            && self.removed.is_empty()
    }

    pub fn merge(&mut self, other: ImportReport) {
        self.imported.extend(other.imported);
        self.reimported.extend(other.reimported);
        self.failed.extend(other.failed);
        self.skipped.extend(other.skipped);
        self.retained.extend(other.retained);
        self.removed.extend(other.removed);
    }
}

enum ImportKind {
    Fresh,
    Reimport,
}

/// Drives source directories through an [`Importer`] into artifact directories.
pub struct ImportPipeline {
    importer: Importer,
    policy: FailurePolicy,
}

impl ImportPipeline {
    pub fn new(importer: Importer, policy: FailurePolicy) -> Self {
        Self { importer, policy }
    }

    pub fn importer(&self) -> &Importer {
        &self.importer
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Imports every file under `source_dir` into the mirrored tree under `dest_dir`, then
    /// deletes every artifact in `dest_dir` that was not produced by this pass.
    ///
    /// Failing files are logged and counted, they never abort the pass.
    pub fn import_assets(
        &self,
        source_dir: &Path,
        dest_dir: &Path,
        manifest: &mut ResourceManifest,
    ) -> ImportReport {
        let mut report = ImportReport::default();

        if !source_dir.exists() {
            debug!(
                "[Import] {} does not exist, nothing to import",
                source_dir.display()
            );
            return report;
        }

        let mut current = HashSet::new();

        for entry in WalkDir::new(source_dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("[Import] Failed to walk {}: {e}", source_dir.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let file = entry.path();
            let Some(dest) = artifact_path(source_dir, dest_dir, file) else {
                continue;
            };

            if !self.importer.supports(file) {
                debug!("[Import] No importer for {}, skipping", file.display());
                report.skipped.push(file.to_path_buf());
                continue;
            }

            match self.import_file(file, &dest, manifest) {
                Ok((kind, written)) => {
                    match kind {
                        ImportKind::Fresh => report.imported.push(dest.clone()),
                        ImportKind::Reimport => report.reimported.push(dest.clone()),
                    }
                    current.extend(written);
                }
                Err(e) => {
                    warn!("[Import] Failed to import {}: {e}", file.display());
                    report.failed.push(file.to_path_buf());

                    if self.policy == FailurePolicy::KeepLastGood && dest.exists() {
                        let kept = retained_artifacts(&dest, manifest);
                        report.retained.push(dest);
                        current.extend(kept);
                    }
                }
            }
        }

        collect_garbage(dest_dir, &current, manifest, &mut report);

        info!(
            "[Import] {}: {} imported, {} reimported, {} failed, {} removed",
            source_dir.display(),
            report.imported.len(),
            report.reimported.len(),
            report.failed.len(),
            report.removed.len()
        );

        report
    }

    fn import_file(
        &self,
        file: &Path,
        dest: &Path,
        manifest: &mut ResourceManifest,
    ) -> Result<(ImportKind, Vec<PathBuf>), ImportError> {
        let existing = existing_artifact(dest);

        let (kind, output) = match &existing {
            Some(resource) => (
                ImportKind::Reimport,
                self.importer.reimport(resource, file, None)?,
            ),
            None => (ImportKind::Fresh, self.importer.import(file, None)?),
        };

        let written = persist(output, dest, manifest)?;
        Ok((kind, written))
    }

    /// Imports a single font into `output_dir/<output_name>.asset`, with its bitmap pages
    /// next to it as `<output_name>_<size>_texpage_<page>.asset`.
    ///
    /// Returns `Ok(None)` without touching anything if `input` is missing or is not
    /// something the font importer handles.
    pub fn import_font(
        &self,
        input: &Path,
        output_name: &str,
        output_dir: &Path,
        sizes: &[u32],
        antialiasing: bool,
        manifest: &mut ResourceManifest,
    ) -> Result<Option<ResourceId>, ImportError> {
        if !input.is_file() {
            debug!("[Import] Font {} does not exist, skipping", input.display());
            return Ok(None);
        }

        let Some(mut options) = self.importer.create_import_options(input) else {
            debug!("[Import] No importer for font {}, skipping", input.display());
            return Ok(None);
        };
        let kind = options.kind();
        let Some(font_options) = options.as_font_mut() else {
            debug!(
                "[Import] {} is imported as {kind}, not as a font. Skipping",
                input.display()
            );
            return Ok(None);
        };

        font_options.sizes = sizes.to_vec();
        font_options.render_mode = if antialiasing {
            FontRenderMode::Smooth
        } else {
            FontRenderMode::Raster
        };

        let dest = append_extension(&output_dir.join(output_name), ARTIFACT_EXTENSION);
        let output = match existing_artifact(&dest) {
            Some(resource) => self.importer.reimport(&resource, input, Some(&options))?,
            None => self.importer.import(input, Some(&options))?,
        };
        let id = output.primary.id;

        let written: HashSet<PathBuf> = persist(output, &dest, manifest)?.into_iter().collect();
        remove_stale_pages(output_dir, output_name, &written, manifest);

        debug!("[Import] Font {} -> {}", input.display(), dest.display());
        Ok(Some(id))
    }

    /// Imports a single image into `output_dir/<file name>.asset` with a CPU copy of its
    /// pixels kept around, the way the splash screen is shown before any GPU exists.
    ///
    /// Returns `Ok(None)` without touching anything if `input` is missing or is not a texture.
    pub fn import_cpu_texture(
        &self,
        input: &Path,
        output_dir: &Path,
        manifest: &mut ResourceManifest,
    ) -> Result<Option<ResourceId>, ImportError> {
        if !input.is_file() {
            debug!("[Import] {} does not exist, skipping", input.display());
            return Ok(None);
        }

        let Some(mut options) = self.importer.create_import_options(input) else {
            debug!("[Import] No importer for {}, skipping", input.display());
            return Ok(None);
        };
        let Some(texture_options) = options.as_texture_mut() else {
            debug!("[Import] {} is not a texture, skipping", input.display());
            return Ok(None);
        };
        texture_options.cpu_readable = true;

        let dest = append_extension(&output_dir.join(resource_name(input)), ARTIFACT_EXTENSION);
        let output = match existing_artifact(&dest) {
            Some(resource) => self.importer.reimport(&resource, input, Some(&options))?,
            None => self.importer.import(input, Some(&options))?,
        };
        let id = output.primary.id;
        persist(output, &dest, manifest)?;

        debug!("[Import] {} -> {}", input.display(), dest.display());
        Ok(Some(id))
    }
}

/// The id an artifact at `path` already has, from the manifest or the artifact itself.
pub(crate) fn preserved_id(path: &Path, manifest: &ResourceManifest) -> Option<ResourceId> {
    manifest
        .id_for_path(path)
        .or_else(|| existing_artifact(path).map(|r| r.id))
}

/// Saves `resource` to `path` and makes it the only manifest entry for that path.
pub(crate) fn save_registered(
    resource: &Resource,
    path: &Path,
    manifest: &mut ResourceManifest,
) -> Result<(), ImportError> {
    save_artifact(resource, path).context(ArtifactErr)?;
    manifest.unregister_path(path);
    manifest.register(resource.id, path);
    Ok(())
}

/// Deletes every artifact under `dest_dir` that is not in `current` and drops its manifest
/// entries.
pub(crate) fn collect_garbage(
    dest_dir: &Path,
    current: &HashSet<PathBuf>,
    manifest: &mut ResourceManifest,
    report: &mut ImportReport,
) {
    if !dest_dir.exists() {
        return;
    }

    let obsolete: Vec<PathBuf> = WalkDir::new(dest_dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_artifact(p) && !current.contains(p))
        .collect();

    for path in obsolete {
        if let Err(e) = fs::remove_file(&path) {
            warn!("[Import] Failed to remove obsolete {}: {e}", path.display());
            continue;
        }
        manifest.unregister_path(&path);
        trace!("[Import] Removed obsolete {}", path.display());
        report.removed.push(path);
    }
}

fn existing_artifact(path: &Path) -> Option<Resource> {
    if !path.exists() {
        return None;
    }
    match load_artifact(path) {
        Ok(resource) => Some(resource),
        Err(e) => {
            debug!("[Import] Ignoring existing artifact: {e}");
            None
        }
    }
}

/// Writes the primary artifact to `dest` and every auxiliary one next to it, keeping the ids
/// earlier passes gave them.
fn persist(
    output: ImportOutput,
    dest: &Path,
    manifest: &mut ResourceManifest,
) -> Result<Vec<PathBuf>, ImportError> {
    let ImportOutput {
        mut primary,
        auxiliary,
    } = output;
    let stem = artifact_stem(dest).unwrap_or_else(|| primary.name.clone());
    let mut written = Vec::with_capacity(auxiliary.len() + 1);

    for AuxiliaryResource {
        suffix,
        mut resource,
    } in auxiliary
    {
        let path = dest.with_file_name(format!("{stem}_{suffix}.{ARTIFACT_EXTENSION}"));
        if let Some(old) = preserved_id(&path, manifest)
            && old != resource.id
        {
            primary.data.remap_reference(resource.id, old);
            resource.id = old;
        }

        save_registered(&resource, &path, manifest)?;
        written.push(path);
    }

    save_registered(&primary, dest, manifest)?;
    written.push(dest.to_path_buf());
    Ok(written)
}

/// The artifact at `dest` plus everything it references, as far as the manifest knows it.
fn retained_artifacts(dest: &Path, manifest: &ResourceManifest) -> Vec<PathBuf> {
    let mut kept = vec![dest.to_path_buf()];
    if let Some(old) = existing_artifact(dest) {
        kept.extend(
            old.data
                .references()
                .into_iter()
                .filter_map(|id| manifest.resolve(id))
                .map(Path::to_path_buf),
        );
    }
    kept
}

/// True if `stem` is exactly `<output_name>_<size>_texpage_<page>`.
pub(crate) fn is_font_page(stem: &str, output_name: &str) -> bool {
    let Some(rest) = stem
        .strip_prefix(output_name)
        .and_then(|rest| rest.strip_prefix('_'))
    else {
        return false;
    };
    let Some((size, page)) = rest.split_once("_texpage_") else {
        return false;
    };
    let is_number = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    is_number(size) && is_number(page)
}

fn remove_stale_pages(
    output_dir: &Path,
    output_name: &str,
    written: &HashSet<PathBuf>,
    manifest: &mut ResourceManifest,
) {
    let Ok(entries) = fs::read_dir(output_dir) else {
        return;
    };
    for path in entries.filter_map(Result::ok).map(|e| e.path()) {
        let is_page = artifact_stem(&path).is_some_and(|stem| is_font_page(&stem, output_name));
        if !is_page || written.contains(&path) {
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                manifest.unregister_path(&path);
                debug!("[Import] Removed stale font page {}", path.display());
            }
            Err(e) => warn!("[Import] Failed to remove {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn font_pages_match_their_font_only() {
        assert!(is_font_page("Roboto_11_texpage_0", "Roboto"));
        assert!(is_font_page("arial.ttf_14_texpage_12", "arial.ttf"));
        assert!(!is_font_page("Roboto_Bold_11_texpage_0", "Roboto"));
        assert!(!is_font_page("Roboto_Bold", "Roboto"));
        assert!(!is_font_page("Roboto_11_texpage_", "Roboto"));
        assert!(!is_font_page("Roboto11_texpage_0", "Roboto"));
    }
}
