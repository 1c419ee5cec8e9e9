//! Application Ports - 应用层端口定义
//!
//! 依赖倒置: 应用层定义接口，基础设施层提供实现

pub mod artifact_store;
pub mod audio_cache;
pub mod audio_post;
pub mod tts_engine;

pub use artifact_store::{ArtifactError, ArtifactStorePort};
pub use audio_cache::{generate_cache_key, AudioCachePort, CacheError, CacheMetadata, CacheStats};
pub use audio_post::{AudioPostPort, PostError, PostOutcome, PostParams};
pub use tts_engine::{InferRequest, InferResponse, TtsEnginePort, TtsError};
