//! Audio Post Port - 音频后处理抽象
//!
//! 对合成的原始音频做响度归一、静音填充与格式转换，
//! 并按章节拼接。具体实现基于外部 ffmpeg 进程。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 后处理错误
#[derive(Debug, Error)]
pub enum PostError {
    #[error("ffmpeg not available: {0}")]
    ToolUnavailable(String),

    #[error("ffmpeg failed on {input}: {stderr}")]
    ProcessFailed { input: String, stderr: String },

    #[error("IO error: {0}")]
    Io(String),
}

/// 后处理参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostParams {
    /// 片段头部静音（毫秒）
    pub silence_start_ms: u64,
    /// 片段尾部静音（毫秒）
    pub silence_end_ms: u64,
    /// 目标响度（LUFS）
    pub target_lufs: f64,
    /// 真峰值上限（dBTP）
    pub true_peak_dbtp: f64,
    /// 输出码率，如 "192k"
    pub bitrate: String,
}

impl Default for PostParams {
    fn default() -> Self {
        Self {
            silence_start_ms: 200,
            silence_end_ms: 300,
            target_lufs: -18.0,
            true_peak_dbtp: -1.0,
            bitrate: "192k".to_string(),
        }
    }
}

/// 单段处理结果
#[derive(Debug, Clone)]
pub struct PostOutcome {
    pub output_path: PathBuf,
    pub size_bytes: u64,
}

/// Audio Post Port
#[async_trait]
pub trait AudioPostPort: Send + Sync {
    /// 处理单个片段: 静音填充 + 响度归一 + 编码为 mp3
    async fn process_segment(
        &self,
        input: &Path,
        output: &Path,
        params: &PostParams,
    ) -> Result<PostOutcome, PostError>;

    /// 无损拼接多个已处理片段为单个章节文件
    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<PostOutcome, PostError>;

    /// 工具是否可用
    async fn available(&self) -> bool;
}
