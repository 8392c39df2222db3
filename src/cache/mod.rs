//! Classpath cache
//!
//! The classpath tool writes its results under a cache directory, one set of
//! files per cache key:
//!
//! | File | Content |
//! |------|---------|
//! | `<key>.cp` | classpath |
//! | `<key>.jvm` | JVM options from aliases |
//! | `<key>.main` | clojure.main options from aliases |
//! | `<key>.basis` | resolved basis |
//! | `<key>.manifest` | extra files whose changes invalidate the entry |
//!
//! The key covers the flags and config files that influence the result, and
//! an entry is recomputed when any of its inputs is newer than the `.cp` file.

pub mod artifacts;
pub mod classpath;
pub mod key;
pub mod stale;

pub use artifacts::{config_paths, ensure_cache_dir, select_cache_dir, CacheArtifacts, CacheLocation};
pub use classpath::{active_classpath, exec_classpath, read_cache_opts};
pub use key::cache_key;
pub use stale::{is_newer, is_stale, PATH_LIST_SEPARATOR};
