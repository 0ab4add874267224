use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::hash::Hash;

/// One kind of builtin resource. Each category is built by its own pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetCategory {
    Cursors,
    Icons,
    ShaderIncludes,
    Shaders,
    Skin,
    Sprites,
    Fonts,
    SplashScreen,
    Meshes,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 9] = [
        AssetCategory::Cursors,
        AssetCategory::Icons,
        AssetCategory::ShaderIncludes,
        AssetCategory::Shaders,
        AssetCategory::Skin,
        AssetCategory::Sprites,
        AssetCategory::Fonts,
        AssetCategory::SplashScreen,
        AssetCategory::Meshes,
    ];

    /// Folder under the raw root holding the sources. `None` for generated categories, for
    /// fonts and for the splash screen. Those are single files named in the build config.
    pub const fn raw_folder(self) -> Option<&'static str> {
        match self {
            AssetCategory::Cursors => Some("Cursors"),
            AssetCategory::Icons => Some("Icons"),
            AssetCategory::ShaderIncludes => Some("Includes"),
            AssetCategory::Shaders => Some("Shaders"),
            AssetCategory::Skin => Some("Skin"),
            AssetCategory::Sprites
            | AssetCategory::Fonts
            | AssetCategory::SplashScreen
            | AssetCategory::Meshes => None,
        }
    }

    /// Folder under the data root the artifacts are written to. Fonts and the splash screen go
    /// to the root itself.
    pub const fn data_folder(self) -> Option<&'static str> {
        match self {
            AssetCategory::Cursors => Some("Cursors"),
            AssetCategory::Icons => Some("Icons"),
            AssetCategory::ShaderIncludes => Some("Includes"),
            AssetCategory::Shaders => Some("Shaders"),
            AssetCategory::Skin => Some("Skin"),
            AssetCategory::Sprites => Some("Sprites"),
            AssetCategory::Meshes => Some("Meshes"),
            AssetCategory::Fonts | AssetCategory::SplashScreen => None,
        }
    }

    /// Categories whose artifacts this category reads while it is built.
    pub fn dependencies(self) -> &'static [AssetCategory] {
        match self {
            AssetCategory::Shaders => &[AssetCategory::ShaderIncludes],
            AssetCategory::Sprites => &[AssetCategory::Skin],
            _ => &[],
        }
    }
}

impl Display for AssetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AssetCategory::Cursors => "Cursors",
            AssetCategory::Icons => "Icons",
            AssetCategory::ShaderIncludes => "Shader Includes",
            AssetCategory::Shaders => "Shaders",
            AssetCategory::Skin => "Skin",
            AssetCategory::Sprites => "Sprites",
            AssetCategory::Fonts => "Fonts",
            AssetCategory::SplashScreen => "Splash Screen",
            AssetCategory::Meshes => "Meshes",
        };
        f.write_str(name)
    }
}

/// Orders `nodes` so every node comes after its dependencies. Ties keep the input order.
/// Dependencies that are not part of `nodes` are ignored.
///
/// On a cycle the nodes that could not be ordered are returned as the error.
pub fn topological_sort<T, F, D>(nodes: &[T], mut deps: F) -> Result<Vec<T>, Vec<T>>
where
    T: Copy + Eq + Hash,
    F: FnMut(T) -> D,
    D: IntoIterator<Item = T>,
{
    let present: HashSet<T> = nodes.iter().copied().collect();
    let mut remaining: Vec<(T, Vec<T>)> = nodes
        .iter()
        .map(|&n| {
            let d = deps(n).into_iter().filter(|d| present.contains(d)).collect();
            (n, d)
        })
        .collect();
    let mut done = HashSet::new();
    let mut order = Vec::with_capacity(nodes.len());

    while !remaining.is_empty() {
        let Some(ready) = remaining
            .iter()
            .position(|(_, d)| d.iter().all(|d| done.contains(d)))
        else {
            return Err(remaining.into_iter().map(|(n, _)| n).collect());
        };

        let (node, _) = remaining.remove(ready);
        done.insert(node);
        order.push(node);
    }

    Ok(order)
}
