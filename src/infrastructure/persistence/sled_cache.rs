//! Sled-based LRU Audio Cache Implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sled::Db;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::application::ports::{AudioCachePort, CacheError, CacheMetadata, CacheStats};

/// Sled 缓存配置
#[derive(Debug, Clone)]
pub struct SledCacheConfig {
    /// 数据库路径
    pub db_path: String,
    /// 最大缓存大小（字节）
    pub max_size_bytes: u64,
}

impl Default for SledCacheConfig {
    fn default() -> Self {
        Self {
            db_path: "data/cache.sled".to_string(),
            max_size_bytes: 10 * 1024 * 1024 * 1024, // 10GB
        }
    }
}

/// 内部缓存条目
///
/// last_accessed 是全局单调访问序号而非时间戳，
/// 保证 LRU 排序在同一秒内的多次访问之间仍然确定。
#[derive(Debug, Clone, Serialize, Deserialize)]
struct InternalCacheEntry {
    audio_data: Vec<u8>,
    size_bytes: u64,
    metadata: CacheMetadata,
    last_accessed: u64,
}

/// Sled 音频缓存
pub struct SledAudioCache {
    db: Db,
    max_size_bytes: u64,
    current_size: AtomicU64,
    access_clock: AtomicU64,
    hit_count: AtomicU64,
    miss_count: AtomicU64,
}

impl SledAudioCache {
    /// 创建新的缓存实例
    pub fn new(config: &SledCacheConfig) -> Result<Self, CacheError> {
        let db =
            sled::open(&config.db_path).map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        // 计算当前缓存大小，并从已有条目恢复访问时钟
        let (current_size, max_accessed) = Self::scan_entries(&db)?;

        tracing::info!(
            db_path = %config.db_path,
            max_size_bytes = config.max_size_bytes,
            current_size = current_size,
            "SledAudioCache initialized"
        );

        Ok(Self {
            db,
            max_size_bytes: config.max_size_bytes,
            current_size: AtomicU64::new(current_size),
            access_clock: AtomicU64::new(max_accessed + 1),
            hit_count: AtomicU64::new(0),
            miss_count: AtomicU64::new(0),
        })
    }

    /// 打开现有缓存
    pub fn open<P: AsRef<Path>>(path: P, max_size_bytes: u64) -> Result<Self, CacheError> {
        let config = SledCacheConfig {
            db_path: path.as_ref().to_string_lossy().to_string(),
            max_size_bytes,
        };
        Self::new(&config)
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 统计所有条目的总大小与最大访问序号
    fn scan_entries(db: &Db) -> Result<(u64, u64), CacheError> {
        let mut total = 0u64;
        let mut max_accessed = 0u64;
        for item in db.scan_prefix("cache:") {
            let (_, value) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            if let Ok(entry) = bincode::deserialize::<InternalCacheEntry>(&value) {
                total += entry.size_bytes;
                max_accessed = max_accessed.max(entry.last_accessed);
            }
        }
        Ok((total, max_accessed))
    }

    /// LRU 淘汰，返回是否有条目被删除
    fn evict_lru(&self) -> Result<bool, CacheError> {
        let mut oldest: Option<(String, InternalCacheEntry)> = None;

        for item in self.db.scan_prefix("cache:") {
            let (key, value) = item.map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            if let Ok(entry) = bincode::deserialize::<InternalCacheEntry>(&value) {
                let is_older = oldest
                    .as_ref()
                    .map(|(_, e)| entry.last_accessed < e.last_accessed)
                    .unwrap_or(true);

                if is_older {
                    let key_str = String::from_utf8(key.to_vec())
                        .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                    oldest = Some((key_str, entry));
                }
            }
        }

        if let Some((key, entry)) = oldest {
            self.db
                .remove(&key)
                .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
            self.current_size
                .fetch_sub(entry.size_bytes, Ordering::Relaxed);
            tracing::debug!(
                key = %key,
                size_bytes = entry.size_bytes,
                "LRU evicted cache entry"
            );
            return Ok(true);
        }

        Ok(false)
    }

    /// 刷新数据库
    pub fn flush(&self) -> Result<(), CacheError> {
        self.db
            .flush()
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl AudioCachePort for SledAudioCache {
    async fn put(
        &self,
        cache_key: &str,
        audio_data: Vec<u8>,
        metadata: CacheMetadata,
    ) -> Result<(), CacheError> {
        let size = audio_data.len() as u64;
        let key = format!("cache:{}", cache_key);

        // 覆盖写入按净增量计算需要腾出的空间
        let old_size = match self
            .db
            .get(&key)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?
        {
            Some(data) => bincode::deserialize::<InternalCacheEntry>(&data)
                .map(|e| e.size_bytes)
                .unwrap_or(0),
            None => 0,
        };

        // 淘汰以腾出空间；单条目超过上限时仍然写入
        while self.current_size.load(Ordering::Relaxed).saturating_sub(old_size) + size
            > self.max_size_bytes
        {
            if !self.evict_lru()? {
                break;
            }
        }

        let entry = InternalCacheEntry {
            audio_data,
            size_bytes: size,
            metadata,
            last_accessed: self.access_clock.fetch_add(1, Ordering::Relaxed),
        };

        let entry_bytes = bincode::serialize(&entry)
            .map_err(|e| CacheError::SerializationError(e.to_string()))?;

        let replaced = self
            .db
            .insert(&key, entry_bytes)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

        // 覆盖写入时扣除旧条目的大小，避免统计虚增
        if let Some(old) = replaced {
            if let Ok(old_entry) = bincode::deserialize::<InternalCacheEntry>(&old) {
                self.current_size
                    .fetch_sub(old_entry.size_bytes, Ordering::Relaxed);
            }
        }
        self.current_size.fetch_add(size, Ordering::Relaxed);

        tracing::debug!(
            cache_key = %cache_key,
            size_bytes = size,
            "Audio cached"
        );

        Ok(())
    }

    async fn get(&self, cache_key: &str) -> Result<Option<(Vec<u8>, CacheMetadata)>, CacheError> {
        let key = format!("cache:{}", cache_key);

        match self.db.get(&key) {
            Ok(Some(data)) => {
                let mut entry: InternalCacheEntry = bincode::deserialize(&data)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;

                // 更新 last_accessed (LRU touch)
                entry.last_accessed = self.access_clock.fetch_add(1, Ordering::Relaxed);
                let entry_bytes = bincode::serialize(&entry)
                    .map_err(|e| CacheError::SerializationError(e.to_string()))?;
                self.db
                    .insert(&key, entry_bytes)
                    .map_err(|e| CacheError::DatabaseError(e.to_string()))?;

                self.hit_count.fetch_add(1, Ordering::Relaxed);
                Ok(Some((entry.audio_data, entry.metadata)))
            }
            Ok(None) => {
                self.miss_count.fetch_add(1, Ordering::Relaxed);
                Ok(None)
            }
            Err(e) => Err(CacheError::DatabaseError(e.to_string())),
        }
    }

    async fn exists(&self, cache_key: &str) -> Result<bool, CacheError> {
        let key = format!("cache:{}", cache_key);
        self.db
            .contains_key(key)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))
    }

    async fn remove(&self, cache_key: &str) -> Result<(), CacheError> {
        let key = format!("cache:{}", cache_key);

        if let Some(data) = self
            .db
            .remove(&key)
            .map_err(|e| CacheError::DatabaseError(e.to_string()))?
        {
            if let Ok(entry) = bincode::deserialize::<InternalCacheEntry>(&data) {
                self.current_size
                    .fetch_sub(entry.size_bytes, Ordering::Relaxed);
            }
        }

        Ok(())
    }

    async fn stats(&self) -> Result<CacheStats, CacheError> {
        let total_entries = self.db.scan_prefix("cache:").count() as u64;

        Ok(CacheStats {
            total_entries,
            total_size_bytes: self.current_size.load(Ordering::Relaxed),
            hit_count: self.hit_count.load(Ordering::Relaxed),
            miss_count: self.miss_count.load(Ordering::Relaxed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn metadata(segment_id: &str) -> CacheMetadata {
        CacheMetadata {
            segment_id: segment_id.to_string(),
            voice: "voice_a".to_string(),
            duration_ms: Some(1000),
            sample_rate: Some(22050),
            created_at: Utc::now().timestamp(),
        }
    }

    #[tokio::test]
    async fn test_cache_put_get() {
        let dir = tempdir().unwrap();
        let config = SledCacheConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
            max_size_bytes: 1024 * 1024,
        };

        let cache = SledAudioCache::new(&config).unwrap();

        let audio_data = vec![1, 2, 3, 4, 5];
        cache
            .put("test_key", audio_data.clone(), metadata("seg_00001"))
            .await
            .unwrap();

        let result = cache.get("test_key").await.unwrap();
        let (data, meta) = result.unwrap();
        assert_eq!(data, audio_data);
        assert_eq!(meta.segment_id, "seg_00001");

        assert!(cache.exists("test_key").await.unwrap());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hit_count, 1);
    }

    #[tokio::test]
    async fn test_cache_miss_counted() {
        let dir = tempdir().unwrap();
        let config = SledCacheConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
            max_size_bytes: 1024 * 1024,
        };

        let cache = SledAudioCache::new(&config).unwrap();
        assert!(cache.get("absent").await.unwrap().is_none());

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.miss_count, 1);
        assert_eq!(stats.hit_count, 0);
    }

    #[tokio::test]
    async fn test_cache_lru_eviction() {
        let dir = tempdir().unwrap();
        let config = SledCacheConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
            // 只够放两条 100 字节的条目
            max_size_bytes: 250,
        };

        let cache = SledAudioCache::new(&config).unwrap();
        cache
            .put("key_a", vec![0u8; 100], metadata("seg_00001"))
            .await
            .unwrap();
        cache
            .put("key_b", vec![0u8; 100], metadata("seg_00002"))
            .await
            .unwrap();
        // 触碰 key_a，key_b 成为最久未访问
        cache.get("key_a").await.unwrap();
        cache
            .put("key_c", vec![0u8; 100], metadata("seg_00003"))
            .await
            .unwrap();

        assert!(cache.exists("key_a").await.unwrap());
        assert!(!cache.exists("key_b").await.unwrap());
        assert!(cache.exists("key_c").await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_overwrite_replaces_accounted_size() {
        let dir = tempdir().unwrap();
        let config = SledCacheConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
            max_size_bytes: 250,
        };

        let cache = SledAudioCache::new(&config).unwrap();
        cache
            .put("key_a", vec![0u8; 100], metadata("seg_00001"))
            .await
            .unwrap();
        // 同一键反复覆盖不应累加占用量
        for _ in 0..5 {
            cache
                .put("key_b", vec![0u8; 100], metadata("seg_00002"))
                .await
                .unwrap();
        }

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 2);
        assert_eq!(stats.total_size_bytes, 200);
        // 未触发多余淘汰
        assert!(cache.exists("key_a").await.unwrap());
        assert!(cache.exists("key_b").await.unwrap());
    }

    #[tokio::test]
    async fn test_cache_remove_updates_size() {
        let dir = tempdir().unwrap();
        let config = SledCacheConfig {
            db_path: dir.path().join("test.sled").to_string_lossy().to_string(),
            max_size_bytes: 1024,
        };

        let cache = SledAudioCache::new(&config).unwrap();
        cache
            .put("key", vec![0u8; 64], metadata("seg_00001"))
            .await
            .unwrap();
        cache.remove("key").await.unwrap();

        let stats = cache.stats().await.unwrap();
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.total_size_bytes, 0);
    }
}
