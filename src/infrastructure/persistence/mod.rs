//! Persistence - 产物存储与音频缓存实现

mod fs_artifact_store;
mod sled_cache;

pub use fs_artifact_store::FsArtifactStore;
pub use sled_cache::{SledAudioCache, SledCacheConfig};
