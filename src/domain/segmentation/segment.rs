//! Segmentation Context - Segment 与 Scene

use serde::{Deserialize, Serialize};

use crate::domain::attribution::{Emotion, Span, Speaker};
use crate::domain::novel::ChapterId;

/// Segment 唯一标识
///
/// 格式: `seg_00001`，全书单调递增，跨章不重置
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SegmentId(String);

impl SegmentId {
    pub fn from_sequence(sequence: usize) -> Self {
        Self(format!("seg_{:05}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SegmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scene 唯一标识，格式: `scene_00001`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SceneId(String);

impl SceneId {
    pub fn from_sequence(sequence: usize) -> Self {
        Self(format!("scene_{:05}", sequence))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SceneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment - 交付给语音合成的最小单位
///
/// 不变量:
/// - 所有内含 Span 的说话人一致
/// - word_count == 内含 Span 字数之和
/// - 时长不超过上限，除非单个超长 Span 无法切分（记录告警，不截断）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Segment {
    id: SegmentId,
    chapter_id: ChapterId,
    speaker: Speaker,
    spans: Vec<Span>,
    word_count: usize,
    estimated_duration_secs: f64,
    emotion: Emotion,
    sequence_number: usize,
}

impl Segment {
    pub(crate) fn new(
        sequence: usize,
        chapter_id: ChapterId,
        speaker: Speaker,
        spans: Vec<Span>,
        word_count: usize,
        estimated_duration_secs: f64,
    ) -> Self {
        // 首个非中性对话情绪作为整段情绪
        let emotion = spans
            .iter()
            .filter_map(Span::emotion)
            .find(|e| *e != Emotion::Neutral)
            .unwrap_or(Emotion::Neutral);

        Self {
            id: SegmentId::from_sequence(sequence),
            chapter_id,
            speaker,
            spans,
            word_count,
            estimated_duration_secs,
            emotion,
            sequence_number: sequence,
        }
    }

    pub fn id(&self) -> &SegmentId {
        &self.id
    }

    pub fn chapter_id(&self) -> &ChapterId {
        &self.chapter_id
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn estimated_duration_secs(&self) -> f64 {
        self.estimated_duration_secs
    }

    pub fn emotion(&self) -> Emotion {
        self.emotion
    }

    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    /// 内含 Span 文本顺序合并
    pub fn text(&self) -> String {
        self.spans.iter().map(Span::text).collect()
    }
}

/// Scene - 叙事结构分组
///
/// 与 Segment 同构，但无单一说话人约束，上限更大。
/// Scene 与 Segment 相互独立，不存在派生关系。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    id: SceneId,
    chapter_id: ChapterId,
    spans: Vec<Span>,
    word_count: usize,
    estimated_duration_secs: f64,
}

impl Scene {
    pub(crate) fn new(
        sequence: usize,
        chapter_id: ChapterId,
        spans: Vec<Span>,
        word_count: usize,
        estimated_duration_secs: f64,
    ) -> Self {
        Self {
            id: SceneId::from_sequence(sequence),
            chapter_id,
            spans,
            word_count,
            estimated_duration_secs,
        }
    }

    pub fn id(&self) -> &SceneId {
        &self.id
    }

    pub fn chapter_id(&self) -> &ChapterId {
        &self.chapter_id
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn estimated_duration_secs(&self) -> f64 {
        self.estimated_duration_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_id_format() {
        assert_eq!(SegmentId::from_sequence(1).as_str(), "seg_00001");
        assert_eq!(SegmentId::from_sequence(123).as_str(), "seg_00123");
    }

    #[test]
    fn test_scene_id_format() {
        assert_eq!(SceneId::from_sequence(7).as_str(), "scene_00007");
    }
}
