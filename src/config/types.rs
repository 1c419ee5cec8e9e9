//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::domain::character::{RoleThresholds, VoicePools};
use crate::domain::segmentation::{DEFAULT_SCENE_WORD_CAP, DEFAULT_TARGET_DURATION_SECS};
use crate::domain::DEFAULT_CHARS_PER_SECOND;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 片段打包配置
    #[serde(default)]
    pub segment: SegmentConfig,

    /// 选角配置
    #[serde(default)]
    pub casting: CastingConfig,

    /// 词表配置
    #[serde(default)]
    pub lexicon: LexiconConfig,

    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 合成配置
    #[serde(default)]
    pub synth: SynthConfig,

    /// 音频后处理配置
    #[serde(default)]
    pub post: PostConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    /// TTS 服务 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 请求超时（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,

    /// 重试次数
    #[serde(default = "default_tts_retries")]
    pub max_retries: u32,

    /// 使用假客户端（测试/干跑）
    #[serde(default)]
    pub fake: bool,
}

fn default_tts_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

fn default_tts_retries() -> u32 {
    2
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            url: default_tts_url(),
            timeout_secs: default_tts_timeout(),
            max_retries: default_tts_retries(),
            fake: false,
        }
    }
}

/// 片段打包配置
#[derive(Debug, Clone, Deserialize)]
pub struct SegmentConfig {
    /// 单片段目标时长（秒）
    #[serde(default = "default_target_duration")]
    pub target_duration_seconds: f64,

    /// 估算语速（CJK: 字/秒）
    #[serde(default = "default_chars_per_second")]
    pub chars_per_second: f64,

    /// Scene 打包字数上限
    #[serde(default = "default_scene_word_cap")]
    pub scene_word_cap: usize,

    /// 计数脚本族: "cjk" 按字符计数，"alphabetic" 按空白分词
    #[serde(default = "default_script_family")]
    pub script_family: String,

    /// 单说话人约束（关闭会破坏合成语义，校验时拒绝）
    #[serde(default = "default_strict_separation")]
    pub strict_speaker_separation: bool,

    /// 情绪强度，透传给 TTS 服务
    #[serde(default = "default_emotion_intensity")]
    pub emotion_intensity: String,
}

fn default_target_duration() -> f64 {
    DEFAULT_TARGET_DURATION_SECS
}

fn default_chars_per_second() -> f64 {
    DEFAULT_CHARS_PER_SECOND
}

fn default_scene_word_cap() -> usize {
    DEFAULT_SCENE_WORD_CAP
}

fn default_script_family() -> String {
    "cjk".to_string()
}

fn default_strict_separation() -> bool {
    true
}

fn default_emotion_intensity() -> String {
    "low".to_string()
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            target_duration_seconds: default_target_duration(),
            chars_per_second: default_chars_per_second(),
            scene_word_cap: default_scene_word_cap(),
            script_family: default_script_family(),
            strict_speaker_separation: default_strict_separation(),
            emotion_intensity: default_emotion_intensity(),
        }
    }
}

/// 选角配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CastingConfig {
    /// 角色分级阈值
    #[serde(default)]
    pub thresholds: RoleThresholds,

    /// 音色池
    #[serde(default)]
    pub pools: VoicePools,
}

/// 词表配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LexiconConfig {
    /// 自定义词表 TOML 路径，未设置时使用内建中文词表
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// 流水线工作目录
    #[serde(default = "default_workspace_dir")]
    pub workspace_dir: PathBuf,

    /// 音频缓存数据库路径
    #[serde(default = "default_cache_path")]
    pub cache_path: String,

    /// 缓存大小上限（字节）
    #[serde(default = "default_cache_max_bytes")]
    pub cache_max_bytes: u64,
}

fn default_workspace_dir() -> PathBuf {
    PathBuf::from("data/workspace")
}

fn default_cache_path() -> String {
    "data/cache.sled".to_string()
}

fn default_cache_max_bytes() -> u64 {
    10 * 1024 * 1024 * 1024 // 10GB
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            workspace_dir: default_workspace_dir(),
            cache_path: default_cache_path(),
            cache_max_bytes: default_cache_max_bytes(),
        }
    }
}

/// 合成配置
#[derive(Debug, Clone, Deserialize)]
pub struct SynthConfig {
    /// 最大并发推理数
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,
}

fn default_max_concurrent() -> usize {
    2
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
        }
    }
}

/// 音频后处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct PostConfig {
    /// ffmpeg 可执行文件路径
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// 片段头部静音（毫秒）
    #[serde(default = "default_silence_start")]
    pub silence_start_ms: u64,

    /// 片段尾部静音（毫秒）
    #[serde(default = "default_silence_end")]
    pub silence_end_ms: u64,

    /// 目标响度（LUFS）
    #[serde(default = "default_target_lufs")]
    pub target_lufs: f64,

    /// 真峰值上限（dBTP）
    #[serde(default = "default_true_peak")]
    pub true_peak_dbtp: f64,

    /// 输出码率
    #[serde(default = "default_bitrate")]
    pub bitrate: String,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_silence_start() -> u64 {
    200
}

fn default_silence_end() -> u64 {
    300
}

fn default_target_lufs() -> f64 {
    -18.0
}

fn default_true_peak() -> f64 {
    -1.0
}

fn default_bitrate() -> String {
    "192k".to_string()
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            silence_start_ms: default_silence_start(),
            silence_end_ms: default_silence_end(),
            target_lufs: default_target_lufs(),
            true_peak_dbtp: default_true_peak(),
            bitrate: default_bitrate(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace / debug / info / warn / error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否输出 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
