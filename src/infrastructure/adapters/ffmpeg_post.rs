//! FFmpeg Audio Post - 基于外部 ffmpeg 进程的音频后处理
//!
//! 单段处理链: adelay 头部静音 -> apad 尾部静音 -> loudnorm 响度归一
//! -> libmp3lame 单声道编码。章节拼接使用 concat demuxer 免重编码。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::ports::{AudioPostPort, PostError, PostOutcome, PostParams};

/// FFmpeg 后处理器
pub struct FfmpegPost {
    ffmpeg_path: String,
}

impl FfmpegPost {
    pub fn new(ffmpeg_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    fn filter_chain(params: &PostParams) -> String {
        format!(
            "adelay={delay}|{delay},apad=pad_dur={pad}ms,loudnorm=I={lufs}:TP={tp}:LRA=11",
            delay = params.silence_start_ms,
            pad = params.silence_end_ms,
            lufs = params.target_lufs,
            tp = params.true_peak_dbtp,
        )
    }

    async fn run(&self, args: &[&str], input: &Path) -> Result<(), PostError> {
        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .output()
            .await
            .map_err(|e| PostError::ToolUnavailable(format!("{}: {}", self.ffmpeg_path, e)))?;

        if !output.status.success() {
            return Err(PostError::ProcessFailed {
                input: input.display().to_string(),
                stderr: String::from_utf8_lossy(&output.stderr)
                    .lines()
                    .last()
                    .unwrap_or("")
                    .to_string(),
            });
        }
        Ok(())
    }

    async fn file_size(path: &Path) -> Result<u64, PostError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| PostError::Io(format!("{}: {}", path.display(), e)))?;
        Ok(meta.len())
    }
}

#[async_trait]
impl AudioPostPort for FfmpegPost {
    async fn process_segment(
        &self,
        input: &Path,
        output: &Path,
        params: &PostParams,
    ) -> Result<PostOutcome, PostError> {
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PostError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        let input_str = input.display().to_string();
        let output_str = output.display().to_string();
        let filters = Self::filter_chain(params);
        let args = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-i",
            &input_str,
            "-af",
            &filters,
            "-c:a",
            "libmp3lame",
            "-b:a",
            &params.bitrate,
            "-ac",
            "1",
            &output_str,
        ];
        self.run(&args, input).await?;

        let size_bytes = Self::file_size(output).await?;
        tracing::debug!(
            input = %input.display(),
            output = %output.display(),
            size_bytes,
            "Segment post-processed"
        );
        Ok(PostOutcome {
            output_path: output.to_path_buf(),
            size_bytes,
        })
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<PostOutcome, PostError> {
        if inputs.is_empty() {
            return Err(PostError::Io("没有可拼接的输入文件".to_string()));
        }
        if let Some(parent) = output.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PostError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        // concat demuxer 需要文件列表
        let list_path = output.with_extension("txt");
        let mut list = String::new();
        for input in inputs {
            list.push_str(&format!("file '{}'\n", input.display()));
        }
        tokio::fs::write(&list_path, list)
            .await
            .map_err(|e| PostError::Io(format!("{}: {}", list_path.display(), e)))?;

        let list_str = list_path.display().to_string();
        let output_str = output.display().to_string();
        let args = [
            "-y",
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "concat",
            "-safe",
            "0",
            "-i",
            &list_str,
            "-c",
            "copy",
            &output_str,
        ];
        let result = self.run(&args, &list_path).await;
        let _ = tokio::fs::remove_file(&list_path).await;
        result?;

        let size_bytes = Self::file_size(output).await?;
        Ok(PostOutcome {
            output_path: output.to_path_buf(),
            size_bytes,
        })
    }

    async fn available(&self) -> bool {
        Command::new(&self.ffmpeg_path)
            .arg("-version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}
