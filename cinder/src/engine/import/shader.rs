use crate::engine::assets::{Resource, ResourceData, ShaderInclude, ShaderSource, load_artifact};
use crate::engine::import::{
    AssetImporter, ImportError, ImportOptions, ImportOutput, IoErr, resource_name,
};
use crate::rendering::program::StageKind;
use cinder_utils::append_extension;
use log::trace;
use snafu::ResultExt;
use std::fs;
use std::path::{Path, PathBuf};

const INCLUDE_DIRECTIVE: &str = "#include";

/// Imports shared shader source that other shaders pull in through `#include "name"`.
pub struct ShaderIncludeImporter;

impl AssetImporter for ShaderIncludeImporter {
    fn name(&self) -> &'static str {
        "shader include"
    }

    fn extensions(&self) -> &[&'static str] {
        &["glsl", "inc"]
    }

    fn default_options(&self, _path: &Path) -> ImportOptions {
        ImportOptions::ShaderInclude
    }

    fn import(&self, path: &Path, _options: &ImportOptions) -> Result<ImportOutput, ImportError> {
        let source = fs::read_to_string(path).context(IoErr { path })?;
        Ok(ImportOutput::single(Resource::new(
            resource_name(path),
            ResourceData::ShaderInclude(ShaderInclude { source }),
        )))
    }
}

/// Imports a single shader stage. The stage comes from the file extension and every
/// `#include "name"` is replaced by the source of the include artifact
/// `<include_dir>/<name>.asset`, recursively.
pub struct ShaderImporter {
    include_dir: PathBuf,
}

impl ShaderImporter {
    pub fn new(include_dir: impl Into<PathBuf>) -> Self {
        Self {
            include_dir: include_dir.into(),
        }
    }

    pub fn include_dir(&self) -> &Path {
        &self.include_dir
    }

    fn load_include(&self, path: &Path, name: &str) -> Result<String, ImportError> {
        let artifact = append_extension(&self.include_dir.join(name), cinder_utils::ARTIFACT_EXTENSION);
        let missing = || ImportError::MissingInclude {
            path: path.to_path_buf(),
            include: name.to_string(),
        };

        let resource = load_artifact(&artifact).map_err(|_| missing())?;
        resource
            .as_shader_include()
            .map(|include| include.source.clone())
            .ok_or_else(missing)
    }

    fn expand(
        &self,
        path: &Path,
        source: &str,
        stack: &mut Vec<String>,
        seen: &mut Vec<String>,
    ) -> Result<String, ImportError> {
        let mut out = Vec::new();

        for line in source.lines() {
            let Some(name) = include_target(line) else {
                out.push(line.to_string());
                continue;
            };

            if stack.iter().any(|s| s == name) {
                return Err(ImportError::IncludeCycle {
                    path: path.to_path_buf(),
                    include: name.to_string(),
                });
            }

            let included = self.load_include(path, name)?;
            if !seen.iter().any(|s| s == name) {
                seen.push(name.to_string());
            }

            stack.push(name.to_string());
            let expanded = self.expand(path, &included, stack, seen)?;
            stack.pop();

            out.push(expanded);
        }

        let mut text = out.join("\n");
        if source.ends_with('\n') {
            text.push('\n');
        }
        Ok(text)
    }
}

impl AssetImporter for ShaderImporter {
    fn name(&self) -> &'static str {
        "shader"
    }

    fn extensions(&self) -> &[&'static str] {
        &["vert", "frag", "geom", "tesc", "tese", "comp"]
    }

    fn default_options(&self, _path: &Path) -> ImportOptions {
        ImportOptions::Shader
    }

    fn import(&self, path: &Path, _options: &ImportOptions) -> Result<ImportOutput, ImportError> {
        let stage = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(StageKind::from_extension)
            .ok_or_else(|| ImportError::UnknownStage {
                path: path.to_path_buf(),
            })?;

        let raw = fs::read_to_string(path).context(IoErr { path })?;
        let mut includes = Vec::new();
        let source = self.expand(path, &raw, &mut Vec::new(), &mut includes)?;

        trace!(
            "[Import] {stage} shader {} pulled in {} includes",
            path.display(),
            includes.len()
        );

        Ok(ImportOutput::single(Resource::new(
            resource_name(path),
            ResourceData::Shader(ShaderSource {
                stage,
                source,
                includes,
            }),
        )))
    }
}

/// The quoted or bracketed name of an `#include` line.
fn include_target(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix(INCLUDE_DIRECTIVE)?.trim();
    let (open, close) = match rest.chars().next()? {
        '"' => ('"', '"'),
        '<' => ('<', '>'),
        _ => return None,
    };
    let inner = rest.strip_prefix(open)?;
    let end = inner.find(close)?;
    let name = inner[..end].trim();
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::save_artifact;

    fn scratch() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("cinder-shader-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_include(dir: &Path, name: &str, source: &str) {
        let res = Resource::new(
            name,
            ResourceData::ShaderInclude(ShaderInclude {
                source: source.to_string(),
            }),
        );
        save_artifact(&res, &dir.join(format!("{name}.asset"))).unwrap();
    }

    #[test]
    fn include_targets() {
        assert_eq!(include_target("#include \"Common.glsl\""), Some("Common.glsl"));
        assert_eq!(include_target("  #include <Light.glsl>  "), Some("Light.glsl"));
        assert_eq!(include_target("#include Common.glsl"), None);
        assert_eq!(include_target("// #include \"Common.glsl\""), None);
        assert_eq!(include_target("#include \"\""), None);
    }

    #[test]
    fn nested_includes_expand() {
        let dir = scratch();
        let includes = dir.join("Includes");
        write_include(&includes, "A.glsl", "#include \"B.glsl\"\nfloat a() { return b(); }");
        write_include(&includes, "B.glsl", "float b() { return 1.0; }");
        let shader = dir.join("Fill.frag");
        fs::write(&shader, "#include \"A.glsl\"\nvoid main() {}\n").unwrap();

        let output = ShaderImporter::new(&includes)
            .import(&shader, &ImportOptions::Shader)
            .unwrap();
        let source = output.primary.as_shader().unwrap();

        assert_eq!(source.stage, StageKind::Fragment);
        assert_eq!(
            source.source,
            "float b() { return 1.0; }\nfloat a() { return b(); }\nvoid main() {}\n"
        );
        assert_eq!(source.includes, vec!["A.glsl", "B.glsl"]);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn include_cycle_is_reported() {
        let dir = scratch();
        let includes = dir.join("Includes");
        write_include(&includes, "A.glsl", "#include \"B.glsl\"");
        write_include(&includes, "B.glsl", "#include \"A.glsl\"");
        let shader = dir.join("Loop.vert");
        fs::write(&shader, "#include \"A.glsl\"\n").unwrap();

        let err = ShaderImporter::new(&includes)
            .import(&shader, &ImportOptions::Shader)
            .unwrap_err();

        assert!(matches!(err, ImportError::IncludeCycle { ref include, .. } if include == "A.glsl"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn missing_include_fails() {
        let dir = scratch();
        let shader = dir.join("Lonely.vert");
        fs::write(&shader, "#include \"Nowhere.glsl\"\nvoid main() {}\n").unwrap();

        let err = ShaderImporter::new(dir.join("Includes"))
            .import(&shader, &ImportOptions::Shader)
            .unwrap_err();

        assert!(matches!(err, ImportError::MissingInclude { .. }));
        fs::remove_dir_all(dir).unwrap();
    }
}
