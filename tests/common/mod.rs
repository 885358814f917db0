use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use fitbot::storage::{KeyValueStore, SledStore};

#[allow(dead_code)]
pub fn create_temp_store() -> (Arc<dyn KeyValueStore>, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SledStore::open(tmp.path().join("store")).expect("failed to open sled store");
    (Arc::new(store), tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Minimal valid PNG so image decoding has something real to chew on
#[allow(dead_code)]
pub fn write_test_image(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    let image = image::RgbImage::from_pixel(32, 24, image::Rgb([200, 120, 40]));
    image.save(&path).expect("failed to write test image");
    path
}
