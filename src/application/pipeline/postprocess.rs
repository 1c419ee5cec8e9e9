//! Postprocess Stage - 音频后处理阶段
//!
//! 对每个合成片段做静音填充、响度归一与 mp3 编码，
//! 再按章节拼接为整章音频，写出处理日志。

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{
    ArtifactStorePort, ChapterAudio, ProcessedSegment, ProcessingLogFile,
};
use crate::application::ports::{AudioPostPort, PostError, PostParams};

/// 执行音频后处理
pub async fn run_postprocess(
    store: &dyn ArtifactStorePort,
    post: &dyn AudioPostPort,
    params: &PostParams,
) -> Result<ProcessingLogFile, ApplicationError> {
    if !post.available().await {
        return Err(PostError::ToolUnavailable("ffmpeg 不可用".to_string()).into());
    }

    let segments_file = store.load_tts_segments().await?;

    let mut processed = Vec::new();
    let mut failed = Vec::new();
    // BTreeMap 保证章节按标识升序；章内顺序跟随片段顺序
    let mut by_chapter: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    for record in &segments_file.segments {
        let input = store.raw_audio_path(&record.segment_id);
        if !input.exists() {
            tracing::warn!(segment = %record.segment_id, "缺少原始音频，跳过");
            failed.push(record.segment_id.clone());
            continue;
        }

        let output = store.post_audio_path(&record.segment_id);
        match post.process_segment(&input, &output, params).await {
            Ok(outcome) => {
                processed.push(ProcessedSegment {
                    segment_id: record.segment_id.clone(),
                    output_file: outcome.output_path.display().to_string(),
                    size_bytes: outcome.size_bytes,
                });
                by_chapter
                    .entry(record.chapter_id.clone())
                    .or_default()
                    .push(outcome.output_path);
            }
            Err(e) => {
                tracing::warn!(segment = %record.segment_id, error = %e, "片段后处理失败");
                failed.push(record.segment_id.clone());
            }
        }
    }

    let mut chapter_files = Vec::new();
    for (chapter_id, inputs) in &by_chapter {
        let output = store.chapter_audio_path(chapter_id);
        let outcome = post.concat(inputs, &output).await?;
        chapter_files.push(ChapterAudio {
            chapter_id: chapter_id.clone(),
            output_file: outcome.output_path.display().to_string(),
            segment_count: inputs.len(),
        });
        tracing::info!(
            chapter = %chapter_id,
            segments = inputs.len(),
            "章节音频拼接完成"
        );
    }

    let log = ProcessingLogFile {
        creation_date: Utc::now(),
        params: params.clone(),
        processed,
        chapter_files,
        failed,
    };
    store.save_processing_log(&log).await?;

    tracing::info!(
        processed = log.processed.len(),
        chapters = log.chapter_files.len(),
        failed = log.failed.len(),
        "音频后处理完成"
    );

    Ok(log)
}
