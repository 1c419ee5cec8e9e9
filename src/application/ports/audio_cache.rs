//! Audio Cache Port - 音频缓存抽象
//!
//! 缓存 TTS 合成结果，避免重复推理。缓存键为
//! `md5(text):voice`，与文本内容和音色绑定。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 缓存错误
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 缓存条目元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// 片段标识
    pub segment_id: String,
    /// 音色名
    pub voice: String,
    /// 音频时长（毫秒）
    pub duration_ms: Option<u64>,
    /// 采样率
    pub sample_rate: Option<u32>,
    /// 写入时间戳（Unix 秒）
    pub created_at: i64,
}

/// 缓存统计信息
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    pub total_entries: u64,
    pub total_size_bytes: u64,
    pub hit_count: u64,
    pub miss_count: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total == 0 {
            return 0.0;
        }
        self.hit_count as f64 / total as f64
    }
}

/// 生成缓存键
///
/// 同一文本 + 同一音色 = 同一键，与片段顺序无关
pub fn generate_cache_key(text: &str, voice: &str) -> String {
    let digest = md5::compute(text.as_bytes());
    format!("{:x}:{}", digest, voice)
}

/// Audio Cache Port
#[async_trait]
pub trait AudioCachePort: Send + Sync {
    /// 写入缓存
    async fn put(
        &self,
        key: &str,
        audio_data: Vec<u8>,
        metadata: CacheMetadata,
    ) -> Result<(), CacheError>;

    /// 读取缓存，未命中返回 None
    async fn get(&self, key: &str) -> Result<Option<(Vec<u8>, CacheMetadata)>, CacheError>;

    /// 键是否存在（不计入命中统计）
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// 删除条目
    async fn remove(&self, key: &str) -> Result<(), CacheError>;

    /// 当前统计信息
    async fn stats(&self) -> Result<CacheStats, CacheError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_stable() {
        let a = generate_cache_key("萧炎走进大厅。", "voice_a");
        let b = generate_cache_key("萧炎走进大厅。", "voice_a");
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_varies_by_voice() {
        let a = generate_cache_key("同一段文本", "voice_a");
        let b = generate_cache_key("同一段文本", "voice_b");
        assert_ne!(a, b);
        assert!(a.ends_with(":voice_a"));
        assert!(b.ends_with(":voice_b"));
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hit_count: 3,
            miss_count: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
