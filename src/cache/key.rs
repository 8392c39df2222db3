//! Cache key computation
//!
//! The key names every artifact in the cache directory. It covers the
//! alias and deps-data flags plus which config files exist, so changing
//! either selects a different set of artifacts.

use crate::cli::Options;
use std::path::PathBuf;
use tracing::debug;

/// Bumped whenever the artifact layout changes
const CACHE_VERSION: &str = "6";

/// Compute the cache key: decimal CRC-32 (IEEE) of the key material.
pub fn cache_key(options: &Options, config_paths: &[PathBuf], dir_key: &str) -> String {
    let material = key_material(options, config_paths, dir_key);
    let key = crc32fast::hash(material.as_bytes()).to_string();
    debug!("Cache key {} from {:?}", key, material);
    key
}

fn key_material(options: &Options, config_paths: &[PathBuf], dir_key: &str) -> String {
    let deps = &options.deps;
    let repl_aliases = options.repl_aliases();
    let parts: [&str; 8] = [
        CACHE_VERSION,
        dir_key,
        &repl_aliases,
        &deps.exec_aliases,
        &deps.main_aliases,
        deps.deps_data.as_deref().unwrap_or_default(),
        &deps.tool_name,
        &deps.tool_aliases,
    ];
    let mut material = parts.join("|");

    for path in config_paths {
        material.push('|');
        if path.exists() {
            material.push_str(&path.to_string_lossy());
        } else {
            material.push_str("NIL");
        }
    }
    material
}
