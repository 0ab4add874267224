use serde::Deserialize;

pub const DEFAULT_VERSION_LINE: &str = "#version 450";
pub const DEFAULT_DEFINES: [&str; 1] = ["OPENGL"];

const VERSION_DIRECTIVE: &str = "#version ";

/// Text the compiler adds in front of every program source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Prepended when a source has no `#version` line of its own.
    pub version_line: String,
    /// Emitted as `#define <entry>` right after the version line.
    pub defines: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            version_line: DEFAULT_VERSION_LINE.to_string(),
            defines: DEFAULT_DEFINES.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Ensures the source starts its version section with a `#version` line followed by the
/// configured defines. An existing version line is kept where it is. Only a line starting
/// with `#version ` at column 0 counts as one.
pub fn preprocess(source: &str, config: &CompilerConfig) -> String {
    let mut lines: Vec<&str> = source.lines().collect();

    let version_at = match lines
        .iter()
        .position(|line| line.starts_with(VERSION_DIRECTIVE))
    {
        Some(at) => at,
        None => {
            lines.insert(0, &config.version_line);
            0
        }
    };

    let defines: Vec<String> = config
        .defines
        .iter()
        .map(|define| format!("#define {define}"))
        .collect();
    for (i, define) in defines.iter().enumerate() {
        lines.insert(version_at + 1 + i, define);
    }

    let mut out = lines.join("\n");
    if source.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injects_default_version() {
        let out = preprocess("void main() {}\n", &CompilerConfig::default());
        assert_eq!(out, "#version 450\n#define OPENGL\nvoid main() {}\n");
    }

    #[test]
    fn keeps_existing_version() {
        let src = "// header\n#version 460 core\nvoid main() {}";
        let out = preprocess(src, &CompilerConfig::default());
        assert_eq!(
            out,
            "// header\n#version 460 core\n#define OPENGL\nvoid main() {}"
        );
    }

    #[test]
    fn indented_version_is_not_a_version_line() {
        let src = "  #version 460\nvoid main() {}";
        let out = preprocess(src, &CompilerConfig::default());
        assert_eq!(
            out,
            "#version 450\n#define OPENGL\n  #version 460\nvoid main() {}"
        );
    }

    #[test]
    fn version_needs_trailing_space() {
        let out = preprocess("#versionfoo\n", &CompilerConfig::default());
        assert!(out.starts_with("#version 450\n#define OPENGL\n#versionfoo"));
    }

    #[test]
    fn multiple_defines_keep_order() {
        let config = CompilerConfig {
            version_line: "#version 440".to_string(),
            defines: vec!["OPENGL".to_string(), "MAX_LIGHTS 4".to_string()],
        };
        let out = preprocess("void main() {}", &config);
        assert_eq!(
            out,
            "#version 440\n#define OPENGL\n#define MAX_LIGHTS 4\nvoid main() {}"
        );
    }

    #[test]
    fn crlf_sources_are_normalized() {
        let out = preprocess("#version 450\r\nvoid main() {}\r\n", &CompilerConfig::default());
        assert_eq!(out, "#version 450\n#define OPENGL\nvoid main() {}\n");
    }
}
