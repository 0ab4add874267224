use crate::engine::assets::{BuiltinMesh, Resource, ResourceData, ResourceManifest};
use crate::engine::import::{ImportReport, collect_garbage, preserved_id, save_registered};
use log::warn;
use std::collections::HashSet;
use std::path::Path;

/// Generates every [`BuiltinMesh`] into `meshes_dir`.
pub fn generate_builtin_meshes(meshes_dir: &Path, manifest: &mut ResourceManifest) -> ImportReport {
    let mut report = ImportReport::default();
    let mut current = HashSet::new();

    for mesh in BuiltinMesh::ALL {
        let path = meshes_dir.join(mesh.file_name());
        let mut resource = Resource::new(mesh.name(), ResourceData::Mesh(mesh.generate()));
        let previous = preserved_id(&path, manifest);
        if let Some(id) = previous {
            resource.id = id;
        }

        if let Err(e) = save_registered(&resource, &path, manifest) {
            warn!("[Build] Failed to save builtin mesh {}: {e}", mesh.name());
            report.failed.push(path);
            continue;
        }

        current.insert(path.clone());
        match previous {
            Some(_) => report.reimported.push(path),
            None => report.imported.push(path),
        }
    }

    collect_garbage(meshes_dir, &current, manifest, &mut report);
    report
}
