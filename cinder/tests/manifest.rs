use cinder::assets::{ManifestError, ResourceId, ResourceManifest};
use std::fs;
use std::path::PathBuf;

fn scratch() -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = std::env::temp_dir().join(format!("cinder-manifest-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn paths_are_stored_relative() {
    let root = scratch();
    let file = root.join("ResourceManifest.asset");
    let id = ResourceId::new();
    let mut manifest = ResourceManifest::new("BuiltinResources");
    manifest.register(id, root.join("Icons/Logo.png.asset"));

    manifest.save(&file, &root).unwrap();
    let text = fs::read_to_string(&file).unwrap();
    let moved = scratch();
    fs::rename(&file, moved.join("ResourceManifest.asset")).unwrap();
    let loaded = ResourceManifest::load(&moved.join("ResourceManifest.asset"), &moved).unwrap();

    assert!(text.contains("Icons/Logo.png.asset"));
    assert!(!text.contains(root.to_string_lossy().as_ref()));
    assert_eq!(loaded.name(), "BuiltinResources");
    assert_eq!(
        loaded.resolve(id),
        Some(moved.join("Icons/Logo.png.asset").as_path())
    );
    fs::remove_dir_all(root).unwrap();
    fs::remove_dir_all(moved).unwrap();
}

#[test]
fn newer_versions_are_rejected() {
    let root = scratch();
    let file = root.join("ResourceManifest.asset");
    fs::write(
        &file,
        r#"{ "name": "BuiltinResources", "version": 99, "entries": {} }"#,
    )
    .unwrap();

    let err = ResourceManifest::load(&file, &root).unwrap_err();
    let fresh = ResourceManifest::load_or_create(&file, &root);

    assert!(matches!(err, ManifestError::Version { found: 99, .. }));
    assert!(fresh.is_empty());
    fs::remove_dir_all(root).unwrap();
}

#[test]
fn missing_manifest_starts_fresh() {
    let root = scratch();
    let manifest = ResourceManifest::load_or_create(&root.join("nope.asset"), &root);

    assert!(manifest.is_empty());
    assert_eq!(manifest.name(), "BuiltinResources");
    fs::remove_dir_all(root).unwrap();
}
