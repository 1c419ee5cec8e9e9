//! Infrastructure Layer - 基础设施层
//!
//! 端口的具体实现: HTTP TTS 客户端、ffmpeg 后处理、
//! sled 音频缓存、文件系统产物存储

pub mod adapters;
pub mod persistence;
