//! Artifact Store Port - 流水线产物存储抽象
//!
//! 各阶段之间通过 JSON 产物文件交接，本端口定义产物的
//! 记录结构与读写接口。具体实现在 infrastructure/persistence 层。

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::ports::audio_post::PostParams;
use crate::domain::attribution::{AttributedChapter, AttributionReport};
use crate::domain::character::RoleTier;
use crate::domain::novel::Chapter;
use crate::domain::segmentation::Scene;

/// 产物存储错误
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Artifact not found: {0}")]
    NotFound(String),
}

/// 章节产物（extract 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChaptersFile {
    pub creation_date: DateTime<Utc>,
    pub source_file: String,
    pub total_chapters: usize,
    pub total_word_count: i64,
    pub chapters: Vec<Chapter>,
}

/// 选角产物（analyze 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceMappingFile {
    pub creation_date: DateTime<Utc>,
    /// char_id -> 音色名
    pub voice_assignments: BTreeMap<String, String>,
    /// char_id -> 角色显示名
    pub character_names: BTreeMap<String, String>,
    /// char_id -> 角色梯队
    pub roles: BTreeMap<String, RoleTier>,
    pub narrator_voice: String,
    /// 音色池不足时的复用告警
    pub shared_voice_warnings: Vec<String>,
}

/// 单章归属产物（attribute 阶段输出，每章一个文件）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedChapterFile {
    pub creation_date: DateTime<Utc>,
    pub report: AttributionReport,
    #[serde(flatten)]
    pub chapter: AttributedChapter,
}

/// 单个 TTS 片段记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSegmentRecord {
    pub segment_id: String,
    pub chapter_id: String,
    pub speaker_id: String,
    pub speaker_name: String,
    pub voice: String,
    pub text: String,
    pub word_count: i64,
    pub estimated_duration_seconds: f64,
    pub emotion: String,
    pub emotion_intensity: String,
    pub sequence_number: u64,
    /// 来源 span 标识（章内序号）
    pub source_span_ids: Vec<String>,
}

/// TTS 片段清单（build 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsSegmentsFile {
    pub creation_date: DateTime<Utc>,
    pub total_segments: usize,
    pub total_duration_seconds: f64,
    pub target_duration_per_segment: f64,
    pub words_per_second: f64,
    pub strict_speaker_separation: bool,
    pub segments: Vec<TtsSegmentRecord>,
}

/// 片段统计清单（build 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentManifestFile {
    pub creation_date: DateTime<Utc>,
    pub total_segments: usize,
    pub total_duration_seconds: f64,
    pub total_duration_minutes: f64,
    pub average_segment_duration: f64,
    pub chapters_processed: usize,
    pub segments_by_chapter: BTreeMap<String, usize>,
    pub segments_by_speaker: BTreeMap<String, usize>,
    pub unresolved_attributions: u64,
}

/// 场景清单（build 阶段输出，字幕/审校用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenesFile {
    pub creation_date: DateTime<Utc>,
    pub total_scenes: usize,
    pub scenes: Vec<Scene>,
}

/// 已处理片段记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedSegment {
    pub segment_id: String,
    pub output_file: String,
    pub size_bytes: u64,
}

/// 章节音频记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterAudio {
    pub chapter_id: String,
    pub output_file: String,
    pub segment_count: usize,
}

/// 后处理日志（postprocess 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingLogFile {
    pub creation_date: DateTime<Utc>,
    pub params: PostParams,
    pub processed: Vec<ProcessedSegment>,
    pub chapter_files: Vec<ChapterAudio>,
    pub failed: Vec<String>,
}

/// 发布元数据（package 阶段输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseMeta {
    pub project: ReleaseProject,
    pub source: ReleaseSource,
    pub audio: ReleaseAudio,
    pub voices: ReleaseVoices,
    pub chapters: Vec<ReleaseChapter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseProject {
    pub name: String,
    pub version: String,
    pub generation_date: DateTime<Utc>,
    pub pipeline_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseSource {
    pub total_chapters: usize,
    pub total_word_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseAudio {
    pub total_duration_seconds: f64,
    pub total_duration_formatted: String,
    pub total_segments: usize,
    pub average_segment_duration: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseVoices {
    pub narrator_voice: String,
    pub cast_size: usize,
    pub shared_voice_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseChapter {
    pub chapter_id: String,
    pub title: String,
    pub audio_file: String,
    pub size_bytes: u64,
}

/// Artifact Store Port
///
/// 按阶段编号组织工作目录:
/// 01_extracted / 02_analyzed / 03_attributed / 04_segments / 05_audio / release
#[async_trait]
pub trait ArtifactStorePort: Send + Sync {
    async fn save_chapters(&self, file: &ChaptersFile) -> Result<(), ArtifactError>;
    async fn load_chapters(&self) -> Result<ChaptersFile, ArtifactError>;

    async fn save_voice_mapping(&self, file: &VoiceMappingFile) -> Result<(), ArtifactError>;
    async fn load_voice_mapping(&self) -> Result<VoiceMappingFile, ArtifactError>;

    async fn save_attributed_chapter(
        &self,
        file: &AttributedChapterFile,
    ) -> Result<(), ArtifactError>;
    /// 按 chapter_id 升序返回所有已归属章节
    async fn load_attributed_chapters(&self) -> Result<Vec<AttributedChapterFile>, ArtifactError>;

    async fn save_tts_segments(&self, file: &TtsSegmentsFile) -> Result<(), ArtifactError>;
    async fn load_tts_segments(&self) -> Result<TtsSegmentsFile, ArtifactError>;

    async fn save_manifest(&self, file: &SegmentManifestFile) -> Result<(), ArtifactError>;
    async fn load_manifest(&self) -> Result<SegmentManifestFile, ArtifactError>;

    async fn save_scenes(&self, file: &ScenesFile) -> Result<(), ArtifactError>;

    async fn save_processing_log(&self, file: &ProcessingLogFile) -> Result<(), ArtifactError>;
    async fn load_processing_log(&self) -> Result<ProcessingLogFile, ArtifactError>;

    /// 写入合成的原始音频，返回落盘路径
    async fn save_raw_audio(
        &self,
        segment_id: &str,
        data: &[u8],
    ) -> Result<PathBuf, ArtifactError>;
    /// 原始音频路径（可能不存在）
    fn raw_audio_path(&self, segment_id: &str) -> PathBuf;
    /// 后处理输出路径
    fn post_audio_path(&self, segment_id: &str) -> PathBuf;
    /// 章节音频输出路径
    fn chapter_audio_path(&self, chapter_id: &str) -> PathBuf;

    /// 发布目录
    fn release_dir(&self) -> PathBuf;
    async fn save_release_meta(&self, meta: &ReleaseMeta) -> Result<(), ArtifactError>;
    async fn save_release_readme(&self, content: &str) -> Result<(), ArtifactError>;
    /// 将章节音频复制进发布目录，返回复制后的文件大小
    async fn publish_chapter_audio(&self, chapter_id: &str) -> Result<u64, ArtifactError>;
}
