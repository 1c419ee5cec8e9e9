//! Segmentation Context - 贪心打包
//!
//! 单趟贪心：说话人变化或字数超上限即封组。Span 从不被截断，
//! 单个超长 Span 独占一组并可超上限（记录告警）。
//!
//! 编号在第二趟按章节顺序统一分配，与处理顺序无关，保证并行
//! 处理章节时编号仍然确定。

use crate::domain::attribution::{AttributedChapter, Span, Speaker};
use crate::domain::estimator::DurationEstimator;
use crate::domain::novel::ChapterId;

use super::{Scene, Segment};

/// 默认目标时长（秒）
pub const DEFAULT_TARGET_DURATION_SECS: f64 = 75.0;
/// 默认 Scene 字数上限（约 4 分钟）
pub const DEFAULT_SCENE_WORD_CAP: usize = 600;

/// 由目标时长与语速推导 Segment 字数上限
///
/// 非正结果一律回落为 1，不崩溃
pub fn segment_word_cap(estimator: &dyn DurationEstimator, target_duration_secs: f64) -> usize {
    let cap = (target_duration_secs * estimator.words_per_second()) as i64;
    cap.max(1) as usize
}

/// 打包中间组
struct PackedGroup {
    speaker: Speaker,
    spans: Vec<Span>,
    word_count: usize,
}

/// 单趟贪心分组
///
/// `split_on_speaker` 为 false 时仅按字数封组（Scene 模式）
fn pack_groups(spans: &[Span], cap: usize, split_on_speaker: bool) -> Vec<PackedGroup> {
    let cap = cap.max(1);
    let mut groups: Vec<PackedGroup> = Vec::new();
    let mut current: Option<PackedGroup> = None;

    for span in spans {
        let fits = current.as_ref().is_some_and(|group| {
            let same_speaker = !split_on_speaker || group.speaker == *span.speaker();
            same_speaker && group.word_count + span.word_count() <= cap
        });

        match current.as_mut() {
            Some(group) if fits => {
                group.word_count += span.word_count();
                group.spans.push(span.clone());
            }
            _ => {
                if let Some(done) = current.take() {
                    groups.push(done);
                }
                current = Some(PackedGroup {
                    speaker: span.speaker().clone(),
                    spans: vec![span.clone()],
                    word_count: span.word_count(),
                });
            }
        }
    }

    if let Some(done) = current.take() {
        groups.push(done);
    }

    groups
}

/// 把归属完成的章节序列打包为 Segment
///
/// 入参按章节顺序给出；编号跨章单调递增，不重置。
pub fn build_segments(
    chapters: &[AttributedChapter],
    estimator: &dyn DurationEstimator,
    target_duration_secs: f64,
) -> Vec<Segment> {
    let cap = segment_word_cap(estimator, target_duration_secs);

    // 第一趟: 各章独立分组
    let grouped: Vec<(ChapterId, Vec<PackedGroup>)> = chapters
        .iter()
        .map(|c| (c.chapter_id.clone(), pack_groups(&c.spans, cap, true)))
        .collect();

    // 第二趟: 按章节顺序统一编号
    let mut segments = Vec::new();
    let mut sequence = 0;
    for (chapter_id, groups) in grouped {
        for group in groups {
            sequence += 1;
            if group.word_count > cap {
                tracing::warn!(
                    sequence,
                    chapter = %chapter_id,
                    word_count = group.word_count,
                    cap,
                    "单个超长 Span 超出时长上限，保留不截断"
                );
            }
            let duration = estimator.estimate_secs(group.word_count);
            segments.push(Segment::new(
                sequence,
                chapter_id.clone(),
                group.speaker,
                group.spans,
                group.word_count,
                duration,
            ));
        }
    }

    segments
}

/// 把同一批章节打包为 Scene（无说话人约束，独立于 Segment）
pub fn build_scenes(
    chapters: &[AttributedChapter],
    estimator: &dyn DurationEstimator,
    scene_word_cap: usize,
) -> Vec<Scene> {
    let cap = scene_word_cap.max(1);

    let mut scenes = Vec::new();
    let mut sequence = 0;
    for chapter in chapters {
        for group in pack_groups(&chapter.spans, cap, false) {
            sequence += 1;
            let duration = estimator.estimate_secs(group.word_count);
            scenes.push(Scene::new(
                sequence,
                chapter.chapter_id.clone(),
                group.spans,
                group.word_count,
                duration,
            ));
        }
    }

    scenes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribution::Emotion;
    use crate::domain::character::CharacterId;
    use crate::domain::estimator::CharCountEstimator;

    fn dialogue(name: &str, words: usize) -> Span {
        Span::dialogue(
            CharacterId::from_name(name),
            name,
            "字".repeat(words),
            words,
            Emotion::Neutral,
        )
    }

    fn narration(words: usize) -> Span {
        Span::narration("文".repeat(words), words)
    }

    fn attributed(number: usize, spans: Vec<Span>) -> AttributedChapter {
        AttributedChapter {
            chapter_id: crate::domain::novel::ChapterId::from_number(number),
            spans,
        }
    }

    /// 上限恰为 120 字的估算器组合: 48 秒 × 2.5 字/秒
    fn estimator() -> CharCountEstimator {
        CharCountEstimator::new(2.5)
    }

    #[test]
    fn test_cap_derivation() {
        // 75 秒 × 2.5 字/秒 = 187 字
        let est = CharCountEstimator::new(2.5);
        assert_eq!(segment_word_cap(&est, 75.0), 187);
        // 非正时长回落为 1
        assert_eq!(segment_word_cap(&est, 0.0), 1);
        assert_eq!(segment_word_cap(&est, -5.0), 1);
    }

    #[test]
    fn test_greedy_packing_example() {
        // [50, 50, 50] 同一说话人、上限 120 → [50,50] 与 [50]
        let chapters = vec![attributed(
            1,
            vec![dialogue("萧炎", 50), dialogue("萧炎", 50), dialogue("萧炎", 50)],
        )];
        let segments = build_segments(&chapters, &estimator(), 48.0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].word_count(), 100);
        assert_eq!(segments[1].word_count(), 50);
    }

    #[test]
    fn test_speaker_change_forces_new_segment() {
        // 说话人变化立即封组，即使余量充足
        let chapters = vec![attributed(
            1,
            vec![dialogue("萧炎", 50), dialogue("药老", 10), dialogue("药老", 10)],
        )];
        let segments = build_segments(&chapters, &estimator(), 48.0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].speaker().as_str(), "char_萧炎");
        assert_eq!(segments[1].speaker().as_str(), "char_药老");
        assert_eq!(segments[1].word_count(), 20);
    }

    #[test]
    fn test_single_speaker_invariant() {
        let chapters = vec![attributed(
            1,
            vec![
                narration(30),
                dialogue("萧炎", 20),
                narration(30),
                dialogue("药老", 20),
            ],
        )];
        let segments = build_segments(&chapters, &estimator(), 48.0);

        for segment in &segments {
            assert!(segment
                .spans()
                .iter()
                .all(|s| s.speaker() == segment.speaker()));
            let sum: usize = segment.spans().iter().map(Span::word_count).sum();
            assert_eq!(sum, segment.word_count());
        }
    }

    #[test]
    fn test_oversized_span_kept_whole() {
        // 单个 200 字 Span，上限 120：独占一组且不截断
        let chapters = vec![attributed(1, vec![dialogue("萧炎", 200), dialogue("萧炎", 10)])];
        let segments = build_segments(&chapters, &estimator(), 48.0);

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].word_count(), 200);
        assert_eq!(segments[0].spans().len(), 1);
    }

    #[test]
    fn test_ids_monotonic_across_chapters() {
        let chapters = vec![
            attributed(1, vec![dialogue("萧炎", 50)]),
            attributed(2, vec![dialogue("药老", 50)]),
        ];
        let segments = build_segments(&chapters, &estimator(), 48.0);

        assert_eq!(segments[0].id().as_str(), "seg_00001");
        assert_eq!(segments[1].id().as_str(), "seg_00002");
        assert_eq!(segments[1].chapter_id().as_str(), "ch_002");
    }

    #[test]
    fn test_scene_ignores_speaker() {
        let chapters = vec![attributed(
            1,
            vec![narration(100), dialogue("萧炎", 100), dialogue("药老", 100)],
        )];
        let scenes = build_scenes(&chapters, &estimator(), 600);

        assert_eq!(scenes.len(), 1);
        assert_eq!(scenes[0].word_count(), 300);
    }

    #[test]
    fn test_scene_cap_still_applies() {
        let chapters = vec![attributed(
            1,
            vec![narration(400), narration(400), narration(400)],
        )];
        let scenes = build_scenes(&chapters, &estimator(), 600);

        // 400+400 > 600 → 每个独占
        assert_eq!(scenes.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let segments = build_segments(&[], &estimator(), 75.0);
        assert!(segments.is_empty());
        let chapters = vec![attributed(1, vec![])];
        let segments = build_segments(&chapters, &estimator(), 75.0);
        assert!(segments.is_empty());
    }

    #[test]
    fn test_segment_emotion_from_first_non_neutral_span() {
        let spans = vec![
            Span::dialogue(CharacterId::from_name("萧炎"), "萧炎", "滚！", 2, Emotion::Angry),
            Span::dialogue(CharacterId::from_name("萧炎"), "萧炎", "出去。", 3, Emotion::Neutral),
        ];
        let chapters = vec![attributed(1, spans)];
        let segments = build_segments(&chapters, &estimator(), 48.0);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].emotion(), Emotion::Angry);
    }
}
