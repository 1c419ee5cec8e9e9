//! Synthesize Stage - 并发合成阶段
//!
//! 逐片段调用 TTS 引擎合成音频，命中缓存则跳过推理。
//! 并发度由信号量控制，单段失败不中断整批。

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::join_all;
use tokio::sync::Semaphore;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{ArtifactStorePort, TtsSegmentRecord};
use crate::application::ports::{
    generate_cache_key, AudioCachePort, CacheMetadata, InferRequest, TtsEnginePort,
};

/// 合成结果摘要
#[derive(Debug, Clone, Default)]
pub struct SynthOutcome {
    pub synthesized: usize,
    pub cache_hits: usize,
    pub failed: usize,
}

/// 执行批量合成
pub async fn run_synthesize(
    store: Arc<dyn ArtifactStorePort>,
    engine: Arc<dyn TtsEnginePort>,
    cache: Arc<dyn AudioCachePort>,
    max_concurrent: usize,
) -> Result<SynthOutcome, ApplicationError> {
    let file = store.load_tts_segments().await?;

    if !engine.health_check().await {
        tracing::warn!("TTS 服务健康检查未通过，仍尝试合成");
    }

    let semaphore = Arc::new(Semaphore::new(max_concurrent.max(1)));
    let mut handles = Vec::with_capacity(file.segments.len());
    for record in file.segments {
        let semaphore = semaphore.clone();
        let engine = engine.clone();
        let cache = cache.clone();
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ApplicationError::Internal(format!("信号量已关闭: {}", e)))?;
            synthesize_one(&record, engine.as_ref(), cache.as_ref(), store.as_ref()).await
        }));
    }

    let mut outcome = SynthOutcome::default();
    for result in join_all(handles).await {
        match result {
            Ok(Ok(true)) => outcome.cache_hits += 1,
            Ok(Ok(false)) => outcome.synthesized += 1,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "片段合成失败");
                outcome.failed += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "合成任务异常退出");
                outcome.failed += 1;
            }
        }
    }

    if let Ok(stats) = cache.stats().await {
        tracing::info!(
            entries = stats.total_entries,
            hit_rate = %format!("{:.0}%", stats.hit_rate() * 100.0),
            "缓存统计"
        );
    }
    tracing::info!(
        synthesized = outcome.synthesized,
        cache_hits = outcome.cache_hits,
        failed = outcome.failed,
        "批量合成完成"
    );

    Ok(outcome)
}

/// 合成单个片段，返回是否命中缓存
async fn synthesize_one(
    record: &TtsSegmentRecord,
    engine: &dyn TtsEnginePort,
    cache: &dyn AudioCachePort,
    store: &dyn ArtifactStorePort,
) -> Result<bool, ApplicationError> {
    let key = generate_cache_key(&record.text, &record.voice);

    match cache.get(&key).await {
        Ok(Some((audio, _meta))) => {
            store.save_raw_audio(&record.segment_id, &audio).await?;
            tracing::debug!(segment = %record.segment_id, "缓存命中");
            return Ok(true);
        }
        Ok(None) => {}
        Err(e) => tracing::warn!(segment = %record.segment_id, error = %e, "缓存读取失败"),
    }

    let response = engine
        .infer(InferRequest {
            text: record.text.clone(),
            voice: record.voice.clone(),
            emotion: record.emotion.clone(),
            emotion_intensity: record.emotion_intensity.clone(),
            segment_id: record.segment_id.clone(),
        })
        .await?;

    // 缓存写入失败不影响主流程
    let metadata = CacheMetadata {
        segment_id: record.segment_id.clone(),
        voice: record.voice.clone(),
        duration_ms: response.duration_ms,
        sample_rate: response.sample_rate,
        created_at: Utc::now().timestamp(),
    };
    if let Err(e) = cache.put(&key, response.audio_data.clone(), metadata).await {
        tracing::warn!(segment = %record.segment_id, error = %e, "缓存写入失败");
    }

    store
        .save_raw_audio(&record.segment_id, &response.audio_data)
        .await?;
    tracing::debug!(
        segment = %record.segment_id,
        session = %response.session_id,
        bytes = response.audio_data.len(),
        "片段合成完成"
    );

    Ok(false)
}
