//! Building the builtin resources from their raw sources.
//!
//! The [`BuildDriver`] compares the raw root against the last build's timestamp. When
//! anything changed it runs one pass per [`AssetCategory`], in dependency order, then stores
//! a new timestamp and saves the manifest.
//!
//! ```text
//! Raw/                       Data/
//!   Cursors/  ───────────▶     Cursors/
//!   Icons/    ───────────▶     Icons/
//!   Includes/ ───────────▶     Includes/ ──┐ (#include)
//!   Shaders/  ───────────▶     Shaders/  ◀─┘
//!   Skin/     ───────────▶     Skin/     ──┐
//!                              Sprites/  ◀─┘
//!   arial.ttf ───────────▶     arial.ttf.asset, arial.ttf_11_texpage_0.asset
//!   SplashScreen.png ────▶     SplashScreen.png.asset
//!                              Meshes/
//!                              ResourceManifest.asset
//!                              Timestamp.asset
//! ```

mod category;
mod config;
mod meshes;
mod sprites;
mod timestamp;

pub use category::*;
pub use config::*;
pub use meshes::*;
pub use sprites::*;
pub use timestamp::*;

use crate::engine::assets::{ManifestError, ResourceKind, ResourceManifest, load_artifact};
use crate::engine::import::{ImportPipeline, ImportReport, Importer};
use crate::rendering::program::ProgramReport;
use crate::rendering::{GpuThread, GpuThreadError};
use cinder_utils::{ARTIFACT_EXTENSION, append_extension, artifact_stem, is_artifact};
use itertools::Itertools;
use log::{debug, info, trace, warn};
use snafu::{ResultExt, Snafu};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum BuildError {
    #[snafu(display("Asset categories depend on each other in a cycle: {categories}"))]
    DependencyCycle { categories: String },

    #[snafu(display("{source}"))]
    Timestamp { source: TimestampError },

    #[snafu(display("{source}"))]
    Manifest { source: ManifestError },

    #[snafu(display("Shader precompilation failed: {source}"))]
    Gpu { source: GpuThreadError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    UpToDate,
    Rebuilt(Vec<(AssetCategory, ImportReport)>),
}

impl BuildOutcome {
    pub fn rebuilt(&self) -> bool {
        matches!(self, BuildOutcome::Rebuilt(_))
    }

    pub fn report(&self, category: AssetCategory) -> Option<&ImportReport> {
        match self {
            BuildOutcome::UpToDate => None,
            BuildOutcome::Rebuilt(reports) => reports
                .iter()
                .find(|(c, _)| *c == category)
                .map(|(_, r)| r),
        }
    }
}

/// Orders `categories` so each one runs after the categories it reads from.
pub fn pass_order(categories: &[AssetCategory]) -> Result<Vec<AssetCategory>, BuildError> {
    topological_sort(categories, |c| c.dependencies().iter().copied()).map_err(|cycle| {
        BuildError::DependencyCycle {
            categories: cycle.iter().join(", "),
        }
    })
}

pub struct BuildDriver {
    config: BuildConfig,
    pipeline: ImportPipeline,
    manifest: ResourceManifest,
}

impl BuildDriver {
    /// Loads the manifest of an earlier build, or starts a fresh one.
    pub fn new(config: BuildConfig) -> Self {
        let manifest =
            ResourceManifest::load_or_create(&config.manifest_path(), &config.data_root);
        let importer = Importer::with_defaults(config.data_dir(AssetCategory::ShaderIncludes));
        let pipeline = ImportPipeline::new(importer, config.failure_policy);

        Self {
            config,
            pipeline,
            manifest,
        }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn manifest(&self) -> &ResourceManifest {
        &self.manifest
    }

    pub fn into_manifest(self) -> ResourceManifest {
        self.manifest
    }

    pub fn is_stale(&self) -> Result<bool, BuildError> {
        check_for_modifications(&self.config.raw_root, &self.config.timestamp_path())
            .context(TimestampErr)
    }

    /// Rebuilds if anything under the raw root changed since the last build.
    pub fn ensure_built(&mut self) -> Result<BuildOutcome, BuildError> {
        if !self.is_stale()? {
            debug!("[Build] Builtin resources are up to date");
            return Ok(BuildOutcome::UpToDate);
        }
        self.rebuild()
    }

    /// Runs every pass, then writes the timestamp and the manifest.
    pub fn rebuild(&mut self) -> Result<BuildOutcome, BuildError> {
        info!(
            "[Build] Building builtin resources from {}",
            self.config.raw_root.display()
        );

        let mut reports = Vec::with_capacity(AssetCategory::ALL.len());
        for category in pass_order(&AssetCategory::ALL)? {
            let report = self.run_pass(category);
            reports.push((category, report));
        }

        write_timestamp(&self.config.timestamp_path()).context(TimestampErr)?;
        self.manifest
            .save(&self.config.manifest_path(), &self.config.data_root)
            .context(ManifestErr)?;

        info!(
            "[Build] Done, {} resources in the manifest",
            self.manifest.len()
        );
        Ok(BuildOutcome::Rebuilt(reports))
    }

    /// Runs the pass of a single category. Does not touch the timestamp or save the manifest.
    pub fn run_pass(&mut self, category: AssetCategory) -> ImportReport {
        debug!("[Build] {category} pass");
        let data_dir = self.config.data_dir(category);

        match category {
            AssetCategory::Sprites => generate_sprite_textures(
                &self.config.data_dir(AssetCategory::Skin),
                &data_dir,
                &mut self.manifest,
            ),
            AssetCategory::Meshes if self.config.builtin_meshes => {
                generate_builtin_meshes(&data_dir, &mut self.manifest)
            }
            AssetCategory::Meshes => ImportReport::default(),
            AssetCategory::Fonts => self.import_fonts(),
            AssetCategory::SplashScreen => self.import_splash_screen(),
            _ => match self.config.raw_dir(category) {
                Some(raw_dir) => {
                    self.pipeline
                        .import_assets(&raw_dir, &data_dir, &mut self.manifest)
                }
                None => ImportReport::default(),
            },
        }
    }

    fn import_fonts(&mut self) -> ImportReport {
        let mut report = ImportReport::default();
        let data_root = self.config.data_dir(AssetCategory::Fonts);

        for font in &self.config.fonts {
            let input = self.config.raw_root.join(&font.file);
            let dest = append_extension(&data_root.join(&font.file), ARTIFACT_EXTENSION);
            let existed = dest.exists();

            match self.pipeline.import_font(
                &input,
                &font.file,
                &data_root,
                &font.sizes,
                font.antialiasing,
                &mut self.manifest,
            ) {
                Ok(Some(_)) if existed => report.reimported.push(dest),
                Ok(Some(_)) => report.imported.push(dest),
                Ok(None) => report.skipped.push(input),
                Err(e) => {
                    warn!("[Build] Failed to import font {}: {e}", input.display());
                    report.failed.push(input);
                }
            }
        }

        self.remove_unlisted_fonts(&data_root, &mut report);
        report
    }

    /// Deletes font artifacts and bitmap pages at the data root whose font is no longer
    /// listed in the build config.
    fn remove_unlisted_fonts(&mut self, data_root: &Path, report: &mut ImportReport) {
        let Ok(entries) = fs::read_dir(data_root) else {
            return;
        };
        let listed: Vec<&str> = self.config.fonts.iter().map(|f| f.file.as_str()).collect();

        let unlisted: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_unlisted_font(p, &listed))
            .sorted()
            .collect();

        for path in unlisted {
            if let Err(e) = fs::remove_file(&path) {
                warn!("[Build] Failed to remove unlisted font {}: {e}", path.display());
                continue;
            }
            self.manifest.unregister_path(&path);
            trace!("[Build] Removed unlisted font artifact {}", path.display());
            report.removed.push(path);
        }
    }

    fn import_splash_screen(&mut self) -> ImportReport {
        let mut report = ImportReport::default();
        let input = self.config.raw_root.join(&self.config.splash_screen);
        let data_root = self.config.data_dir(AssetCategory::SplashScreen);
        let dest = append_extension(&data_root.join(&self.config.splash_screen), ARTIFACT_EXTENSION);
        let existed = dest.exists();

        match self
            .pipeline
            .import_cpu_texture(&input, &data_root, &mut self.manifest)
        {
            Ok(Some(_)) if existed => report.reimported.push(dest),
            Ok(Some(_)) => report.imported.push(dest),
            Ok(None) => report.skipped.push(input),
            Err(e) => {
                warn!("[Build] Failed to import splash screen {}: {e}", input.display());
                report.failed.push(input);
            }
        }

        report
    }

    /// Compiles every shader artifact on `gpu` and waits for all of them.
    ///
    /// Failed programs are logged with their diagnostics. The programs are released again
    /// once their reports were collected.
    pub fn precompile_shaders(&self, gpu: &GpuThread) -> Result<Vec<ProgramReport>, BuildError> {
        let shader_dir = self.config.data_dir(AssetCategory::Shaders);
        let mut handles = Vec::new();

        let artifacts = WalkDir::new(&shader_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && is_artifact(e.path()));

        for entry in artifacts {
            let resource = match load_artifact(entry.path()) {
                Ok(resource) => resource,
                Err(e) => {
                    warn!("[Build] Skipping shader: {e}");
                    continue;
                }
            };
            let Some(shader) = resource.as_shader() else {
                continue;
            };
            handles.push(
                gpu.submit(shader.program_desc(&resource.name))
                    .context(GpuErr)?,
            );
        }

        gpu.wait_idle().context(GpuErr)?;

        let mut reports = Vec::with_capacity(handles.len());
        for handle in &handles {
            let report = handle.wait().context(GpuErr)?;
            if !report.is_compiled() {
                warn!(
                    "[Build] Shader {} failed to compile:\n{}",
                    report.name,
                    report.error.as_deref().unwrap_or_default()
                );
            }
            reports.push(report.clone());
        }

        info!(
            "[Build] Precompiled {} shaders, {} failed",
            reports.len(),
            reports.iter().filter(|r| !r.is_compiled()).count()
        );
        Ok(reports)
    }
}

/// A font artifact or bitmap page (`<font>_<size>_texpage_<page>`) whose font is not in
/// `listed`. Anything at the data root that is not a font artifact is left alone.
fn is_unlisted_font(path: &Path, listed: &[&str]) -> bool {
    let Some(stem) = artifact_stem(path) else {
        return false;
    };

    if let Some(at) = stem.find("_texpage_") {
        return stem[..at]
            .rsplit_once('_')
            .is_some_and(|(font, _)| !listed.contains(&font));
    }

    if listed.contains(&stem.as_str()) {
        return false;
    }
    load_artifact(path).is_ok_and(|r| r.kind() == ResourceKind::Font)
}
