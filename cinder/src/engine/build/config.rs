use crate::build::AssetCategory;
use crate::import::FailurePolicy;
use crate::rendering::program::CompilerConfig;
use bon::Builder;
use serde::Deserialize;
use snafu::{ResultExt, Snafu};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_MANIFEST_FILE: &str = "ResourceManifest.asset";
pub const DEFAULT_TIMESTAMP_FILE: &str = "Timestamp.asset";
pub const DEFAULT_FONT_FILE: &str = "arial.ttf";
pub const DEFAULT_FONT_SIZE: u32 = 11;
pub const DEFAULT_SPLASH_SCREEN: &str = "SplashScreen.png";

#[derive(Debug, Snafu)]
#[snafu(context(suffix(Err)))]
pub enum ConfigError {
    #[snafu(display("Failed to read build config {}: {source}", path.display()))]
    Read { path: PathBuf, source: io::Error },

    #[snafu(display("Invalid build config: {source}"))]
    Parse { source: toml::de::Error },
}

/// A font imported from the raw root into the data root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Builder)]
pub struct FontConfig {
    /// File name under the raw root. Also used as the artifact name.
    #[builder(into)]
    pub file: String,
    pub sizes: Vec<u32>,
    #[serde(default)]
    #[builder(default)]
    pub antialiasing: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            file: DEFAULT_FONT_FILE.to_string(),
            sizes: vec![DEFAULT_FONT_SIZE],
            antialiasing: false,
        }
    }
}

/// Where the builtin resources come from and where they go.
///
/// ```toml
/// raw_root = "Raw"
/// data_root = "Data"
/// failure_policy = "discard"
///
/// [[fonts]]
/// file = "arial.ttf"
/// sizes = [11, 14]
///
/// [compiler]
/// version_line = "#version 460"
/// defines = ["OPENGL"]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
pub struct BuildConfig {
    #[builder(into)]
    pub raw_root: PathBuf,
    #[builder(into)]
    pub data_root: PathBuf,
    #[serde(default = "default_manifest_file")]
    #[builder(into, default = default_manifest_file())]
    pub manifest_file: String,
    #[serde(default = "default_timestamp_file")]
    #[builder(into, default = default_timestamp_file())]
    pub timestamp_file: String,
    #[serde(default)]
    #[builder(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_fonts")]
    #[builder(default = default_fonts())]
    pub fonts: Vec<FontConfig>,
    /// Image under the raw root, imported CPU-readable into the data root.
    #[serde(default = "default_splash_screen")]
    #[builder(into, default = default_splash_screen())]
    pub splash_screen: String,
    #[serde(default = "default_true")]
    #[builder(default = true)]
    pub builtin_meshes: bool,
    #[serde(default)]
    #[builder(default)]
    pub compiler: CompilerConfig,
}

fn default_manifest_file() -> String {
    DEFAULT_MANIFEST_FILE.to_string()
}

fn default_timestamp_file() -> String {
    DEFAULT_TIMESTAMP_FILE.to_string()
}

fn default_fonts() -> Vec<FontConfig> {
    vec![FontConfig::default()]
}

fn default_splash_screen() -> String {
    DEFAULT_SPLASH_SCREEN.to_string()
}

fn default_true() -> bool {
    true
}

impl BuildConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).context(ReadErr { path })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).context(ParseErr)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.data_root.join(&self.manifest_file)
    }

    pub fn timestamp_path(&self) -> PathBuf {
        self.data_root.join(&self.timestamp_file)
    }

    pub fn raw_dir(&self, category: AssetCategory) -> Option<PathBuf> {
        category.raw_folder().map(|f| self.raw_root.join(f))
    }

    pub fn data_dir(&self, category: AssetCategory) -> PathBuf {
        match category.data_folder() {
            Some(folder) => self.data_root.join(folder),
            None => self.data_root.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = BuildConfig::from_toml_str("raw_root = \"Raw\"\ndata_root = \"Data\"\n").unwrap();

        assert_eq!(config.manifest_path(), PathBuf::from("Data/ResourceManifest.asset"));
        assert_eq!(config.timestamp_path(), PathBuf::from("Data/Timestamp.asset"));
        assert_eq!(config.failure_policy, FailurePolicy::KeepLastGood);
        assert_eq!(config.fonts, vec![FontConfig::default()]);
        assert_eq!(config.splash_screen, "SplashScreen.png");
        assert!(config.builtin_meshes);
        assert_eq!(config.compiler, CompilerConfig::default());
    }

    #[test]
    fn full_toml() {
        let config = BuildConfig::from_toml_str(
            r##"
            raw_root = "Raw"
            data_root = "Data"
            failure_policy = "discard"
            builtin_meshes = false
            splash_screen = "Splash.jpg"

            [[fonts]]
            file = "mono.ttf"
            sizes = [9, 12]
            antialiasing = true

            [compiler]
            version_line = "#version 460"
            "##,
        )
        .unwrap();

        assert_eq!(config.failure_policy, FailurePolicy::Discard);
        assert_eq!(config.splash_screen, "Splash.jpg");
        assert_eq!(config.fonts[0].sizes, vec![9, 12]);
        assert!(config.fonts[0].antialiasing);
        assert_eq!(config.compiler.version_line, "#version 460");
        assert_eq!(config.compiler.defines, vec!["OPENGL".to_string()]);
    }

    #[test]
    fn missing_roots_fail() {
        assert!(matches!(
            BuildConfig::from_toml_str("data_root = \"Data\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn builder_defaults_match_toml_defaults() {
        let built = BuildConfig::builder().raw_root("Raw").data_root("Data").build();
        let parsed = BuildConfig::from_toml_str("raw_root = \"Raw\"\ndata_root = \"Data\"\n").unwrap();
        assert_eq!(built, parsed);
    }

    #[test]
    fn fonts_live_in_the_data_root() {
        let config = BuildConfig::builder().raw_root("Raw").data_root("Data").build();
        assert_eq!(config.data_dir(AssetCategory::Fonts), PathBuf::from("Data"));
        assert_eq!(config.raw_dir(AssetCategory::Sprites), None);
        assert_eq!(
            config.raw_dir(AssetCategory::ShaderIncludes),
            Some(PathBuf::from("Raw/Includes"))
        );
    }
}
