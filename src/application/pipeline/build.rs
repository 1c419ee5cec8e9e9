//! Build Stage - TTS 片段构建阶段
//!
//! 把归属完成的章节打包为单说话人、时长封顶的 TTS 片段，
//! 并行产出 Scene 清单与统计清单。

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{
    ArtifactStorePort, ScenesFile, SegmentManifestFile, TtsSegmentRecord, TtsSegmentsFile,
    VoiceMappingFile,
};
use crate::domain::attribution::Speaker;
use crate::domain::segmentation::{build_scenes, build_segments, Segment};
use crate::domain::DurationEstimator;

/// 构建参数
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub target_duration_secs: f64,
    pub scene_word_cap: usize,
    pub emotion_intensity: String,
}

/// 执行片段构建
pub async fn run_build(
    store: &dyn ArtifactStorePort,
    estimator: &dyn DurationEstimator,
    options: &BuildOptions,
) -> Result<SegmentManifestFile, ApplicationError> {
    let attributed = store.load_attributed_chapters().await?;
    if attributed.is_empty() {
        return Err(ApplicationError::NotFound(
            "没有归属产物，请先运行 attribute 阶段".to_string(),
        ));
    }
    let mapping = store.load_voice_mapping().await?;

    let chapters: Vec<_> = attributed.iter().map(|f| f.chapter.clone()).collect();
    let segments = build_segments(&chapters, estimator, options.target_duration_secs);
    let scenes = build_scenes(&chapters, estimator, options.scene_word_cap);

    let records = to_records(&segments, &mapping, &options.emotion_intensity);
    warn_oversized(&records, options.target_duration_secs);

    let total_duration: f64 = records.iter().map(|r| r.estimated_duration_seconds).sum();
    let unresolved: u64 = attributed.iter().map(|f| f.report.unresolved as u64).sum();

    let segments_file = TtsSegmentsFile {
        creation_date: Utc::now(),
        total_segments: records.len(),
        total_duration_seconds: total_duration,
        target_duration_per_segment: options.target_duration_secs,
        words_per_second: estimator.words_per_second(),
        strict_speaker_separation: true,
        segments: records,
    };
    store.save_tts_segments(&segments_file).await?;

    let manifest = build_manifest(&segments_file, attributed.len(), unresolved);
    store.save_manifest(&manifest).await?;

    store
        .save_scenes(&ScenesFile {
            creation_date: Utc::now(),
            total_scenes: scenes.len(),
            scenes,
        })
        .await?;

    tracing::info!(
        segments = manifest.total_segments,
        minutes = %format!("{:.1}", manifest.total_duration_minutes),
        chapters = manifest.chapters_processed,
        "片段构建完成"
    );

    Ok(manifest)
}

/// 把领域 Segment 转换为可持久化的记录
///
/// 音色解析: 角色取选角表，缺失时回退到旁白音色并告警。
fn to_records(
    segments: &[Segment],
    mapping: &VoiceMappingFile,
    emotion_intensity: &str,
) -> Vec<TtsSegmentRecord> {
    // 章内 span 序号，用于回溯片段来源
    let mut span_cursor: HashMap<String, usize> = HashMap::new();

    segments
        .iter()
        .map(|segment| {
            let chapter_id = segment.chapter_id().as_str().to_string();
            let cursor = span_cursor.entry(chapter_id.clone()).or_insert(0);
            let source_span_ids: Vec<String> = (0..segment.spans().len())
                .map(|offset| format!("{}_span_{:04}", chapter_id, *cursor + offset))
                .collect();
            *cursor += segment.spans().len();

            let (speaker_name, voice) = resolve_voice(segment.speaker(), mapping);
            TtsSegmentRecord {
                segment_id: segment.id().as_str().to_string(),
                chapter_id,
                speaker_id: segment.speaker().as_str().to_string(),
                speaker_name,
                voice,
                text: segment.text(),
                word_count: segment.word_count() as i64,
                estimated_duration_seconds: segment.estimated_duration_secs(),
                emotion: segment.emotion().to_string(),
                emotion_intensity: emotion_intensity.to_string(),
                sequence_number: segment.sequence_number() as u64,
                source_span_ids,
            }
        })
        .collect()
}

fn resolve_voice(speaker: &Speaker, mapping: &VoiceMappingFile) -> (String, String) {
    match speaker {
        Speaker::Character(id) => {
            let name = mapping
                .character_names
                .get(id.as_str())
                .cloned()
                .unwrap_or_else(|| id.as_str().to_string());
            match mapping.voice_assignments.get(id.as_str()) {
                Some(voice) => (name, voice.clone()),
                None => {
                    tracing::warn!(
                        character = id.as_str(),
                        "角色没有音色分配，回退到旁白音色"
                    );
                    (name, mapping.narrator_voice.clone())
                }
            }
        }
        other => (other.as_str().to_string(), mapping.narrator_voice.clone()),
    }
}

fn warn_oversized(records: &[TtsSegmentRecord], target: f64) {
    for record in records {
        if record.estimated_duration_seconds > target * 1.5 {
            tracing::warn!(
                segment = %record.segment_id,
                duration = %format!("{:.1}", record.estimated_duration_seconds),
                target,
                "片段时长显著超出目标"
            );
        }
    }
}

fn build_manifest(
    file: &TtsSegmentsFile,
    chapters_processed: usize,
    unresolved: u64,
) -> SegmentManifestFile {
    let mut by_chapter: BTreeMap<String, usize> = BTreeMap::new();
    let mut by_speaker: BTreeMap<String, usize> = BTreeMap::new();
    for record in &file.segments {
        *by_chapter.entry(record.chapter_id.clone()).or_insert(0) += 1;
        *by_speaker.entry(record.speaker_name.clone()).or_insert(0) += 1;
    }

    let average = if file.segments.is_empty() {
        0.0
    } else {
        file.total_duration_seconds / file.segments.len() as f64
    };

    SegmentManifestFile {
        creation_date: Utc::now(),
        total_segments: file.total_segments,
        total_duration_seconds: file.total_duration_seconds,
        total_duration_minutes: file.total_duration_seconds / 60.0,
        average_segment_duration: average,
        chapters_processed,
        segments_by_chapter: by_chapter,
        segments_by_speaker: by_speaker,
        unresolved_attributions: unresolved,
    }
}
