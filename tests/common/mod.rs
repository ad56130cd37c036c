#![allow(dead_code)]

use pemcrypt::crypto::PrivateKeyHandle;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Shared 1024-bit key, generated once per test binary
pub fn private_key() -> &'static PrivateKeyHandle {
    static KEY: OnceLock<PrivateKeyHandle> = OnceLock::new();
    KEY.get_or_init(|| PrivateKeyHandle::generate(1024).expect("key generation"))
}

/// Write the shared key pair as `public_key.pem` / `private_key.pem` into `dir`
pub fn write_key_pair(dir: &Path) -> (PathBuf, PathBuf) {
    let key = private_key();
    let public_path = dir.join("public_key.pem");
    let private_path = dir.join("private_key.pem");

    fs::write(&public_path, key.public_key().to_pem().unwrap()).unwrap();
    fs::write(&private_path, key.to_pem().unwrap().as_bytes()).unwrap();

    (public_path, private_path)
}

/// All files below `root`, relative and sorted
pub fn list_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                files.push(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    files.sort();
    files
}
