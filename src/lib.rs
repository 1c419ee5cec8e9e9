//! Novox - 小说转有声书 TTS 流水线
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 章节记录与切分
//! - Character Context: 角色发现、分级与选角
//! - Attribution Context: 对话归属规则级联
//! - Segmentation Context: Segment / Scene 打包
//!
//! 应用层 (application/):
//! - Ports: 端口定义（TtsEngine, AudioCache, AudioPost, ArtifactStore）
//! - Pipeline: 七个可独立重跑的流水线阶段
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: HTTP TTS Client, FFmpeg 后处理
//! - Persistence: 文件系统产物存储 + Sled 音频缓存

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
