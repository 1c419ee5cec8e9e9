//! Attribution Context - 对话归属
//!
//! 把一个章节的段落切成带类型的 Span 序列（旁白 / 对话），并为
//! 对话 Span 指定说话人。规则是一个显式的有序级联，优先级可单测:
//!
//! 1. 段落无引号 → 整段旁白
//! 2. 带标签引语: 人名 + 说话动词 (+ 后缀) + 冒号 + 引语
//! 3. 裸引语延续: 归属到最近一次成功归属的说话人
//! 4. 兜底: 整段旁白
//!
//! 全章唯一的可变状态是"最近说话人"游标，作为显式参数在段落间
//! 传递，每章开头重置，从不跨章共享。

use serde::{Deserialize, Serialize};

use crate::domain::character::CharacterId;
use crate::domain::estimator::DurationEstimator;
use crate::domain::lexicon::{compile_verbs, starts_with_at, Lexicon};
use crate::domain::novel::{Chapter, ChapterId};

use super::{infer_emotion, Emotion, NameMap, Span};

/// 标签人名最短长度（字符）
const MIN_TAG_NAME_CHARS: usize = 2;
/// 标签人名最长长度（字符）
const MAX_TAG_NAME_CHARS: usize = 5;

/// 归属标签并入旁白时追加的分隔符
pub const TAG_SEPARATOR: char = '。';

/// 延续游标 - 最近一次成功归属的说话人
///
/// 每章开头重置；并行处理时每章各持一份，互不共享
#[derive(Debug, Clone, Default)]
pub struct AttributionState {
    last_speaker: Option<CharacterId>,
}

impl AttributionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_speaker(&self) -> Option<&CharacterId> {
        self.last_speaker.as_ref()
    }
}

/// 归属统计
///
/// unresolved 记录"标签命中但人名不在映射表"的次数，供调用方
/// 审计覆盖率；该情况永不致命，降级为旁白。
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AttributionReport {
    pub paragraphs: usize,
    pub dialogue_spans: usize,
    pub narration_spans: usize,
    pub unresolved: usize,
}

impl AttributionReport {
    pub fn merge(&mut self, other: &AttributionReport) {
        self.paragraphs += other.paragraphs;
        self.dialogue_spans += other.dialogue_spans;
        self.narration_spans += other.narration_spans;
        self.unresolved += other.unresolved;
    }
}

/// 归属完成的章节
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributedChapter {
    pub chapter_id: ChapterId,
    pub spans: Vec<Span>,
}

/// 引号包裹的文本区间（含引号字符本身的下标）
#[derive(Debug, Clone, Copy)]
struct QuoteRun {
    open: usize,
    close: usize,
}

/// 带标签引语的一次命中
#[derive(Debug)]
struct TagMatch {
    /// 标签起点（人名首字符）
    tag_start: usize,
    /// 冒号位置
    colon: usize,
    quote: QuoteRun,
    name: String,
    verb: String,
}

/// 对话归属器
pub struct Attributor<'a> {
    lexicon: &'a Lexicon,
    name_map: &'a NameMap,
    estimator: &'a dyn DurationEstimator,
    verbs: Vec<Vec<char>>,
}

impl<'a> Attributor<'a> {
    pub fn new(
        lexicon: &'a Lexicon,
        name_map: &'a NameMap,
        estimator: &'a dyn DurationEstimator,
    ) -> Self {
        let verbs = compile_verbs(&lexicon.speech_verbs);
        Self {
            lexicon,
            name_map,
            estimator,
            verbs,
        }
    }

    /// 归属整章
    ///
    /// 游标在章节内部创建并贯穿所有段落，章节之间彼此独立。
    pub fn attribute_chapter(&self, chapter: &Chapter) -> (AttributedChapter, AttributionReport) {
        let mut state = AttributionState::new();
        let mut report = AttributionReport::default();
        let mut spans = Vec::new();

        for paragraph in chapter.paragraphs() {
            spans.extend(self.attribute_paragraph(paragraph, &mut state, &mut report));
        }

        tracing::debug!(
            chapter = %chapter.id(),
            spans = spans.len(),
            dialogue = report.dialogue_spans,
            unresolved = report.unresolved,
            "章节归属完成"
        );

        (
            AttributedChapter {
                chapter_id: chapter.id().clone(),
                spans,
            },
            report,
        )
    }

    /// 归属单个段落（规则级联入口）
    pub fn attribute_paragraph(
        &self,
        paragraph: &str,
        state: &mut AttributionState,
        report: &mut AttributionReport,
    ) -> Vec<Span> {
        report.paragraphs += 1;
        let chars: Vec<char> = paragraph.chars().collect();

        // 规则 1: 无引号 → 整段旁白
        if !chars.iter().any(|c| is_quote_char(*c)) {
            let mut spans = Vec::new();
            self.push_narration(&mut spans, paragraph, report);
            return spans;
        }

        let runs = find_quoted_runs(&chars);

        // 规则 2: 带标签引语
        let matches = self.find_tagged_speech(&chars, &runs);
        if !matches.is_empty() {
            return self.emit_tagged(&chars, &matches, state, report);
        }

        // 规则 3: 裸引语延续
        if !runs.is_empty() {
            return self.emit_continuity(&chars, &runs, state, report);
        }

        // 规则 4: 引号字符不成对，兜底整段旁白
        let mut spans = Vec::new();
        self.push_narration(&mut spans, paragraph, report);
        spans
    }

    /// 扫描所有"人名+动词(+后缀)+冒号+引语"命中，从左到右不重叠
    fn find_tagged_speech(&self, chars: &[char], runs: &[QuoteRun]) -> Vec<TagMatch> {
        let mut matches = Vec::new();
        let mut consumed = 0;

        for run in runs {
            let Some(colon) = run.open.checked_sub(1) else {
                continue;
            };
            if colon < consumed || !matches!(chars[colon], '：' | ':') {
                continue;
            }

            // 标签从上一个句界（或上次命中末尾）开始
            let mut tag_start = consumed;
            for j in (consumed..colon).rev() {
                if is_tag_boundary(chars[j]) {
                    tag_start = j + 1;
                    break;
                }
            }
            let tag = &chars[tag_start..colon];

            if let Some((name, verb)) = self.split_tag(tag) {
                matches.push(TagMatch {
                    tag_start,
                    colon,
                    quote: *run,
                    name,
                    verb,
                });
                consumed = run.close + 1;
            }
        }

        matches
    }

    /// 把标签拆成 人名 + 动词
    ///
    /// 人名候选从短到长尝试（2 → 5 字符），优先选择能在映射表里
    /// 解析成功的候选；全部解析失败时退回最短候选，由调用方按
    /// 未归属处理。动词匹配长词优先。
    fn split_tag(&self, tag: &[char]) -> Option<(String, String)> {
        let mut fallback: Option<(String, String)> = None;

        for name_len in MIN_TAG_NAME_CHARS..=MAX_TAG_NAME_CHARS.min(tag.len().saturating_sub(1)) {
            let Some(verb) = self
                .verbs
                .iter()
                .find(|verb| starts_with_at(tag, name_len, verb))
            else {
                continue;
            };
            let name: String = tag[..name_len].iter().collect();
            let verb: String = verb.iter().collect();

            if self.name_map.resolve(&name).is_some() {
                return Some((name, verb));
            }
            if fallback.is_none() {
                fallback = Some((name, verb));
            }
        }

        fallback
    }

    /// 规则 2 的 Span 发射
    fn emit_tagged(
        &self,
        chars: &[char],
        matches: &[TagMatch],
        state: &mut AttributionState,
        report: &mut AttributionReport,
    ) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut cursor = 0;

        for m in matches {
            // 上次命中末尾到标签起点之间的旁白
            if m.tag_start > cursor {
                self.push_narration(&mut spans, &slice(chars, cursor, m.tag_start), report);
            }

            // 标签本身并入旁白（读作动作描写），仅裸人名时略过
            let tag_text = slice(chars, m.tag_start, m.colon);
            if tag_text != m.name {
                let mut tagged = tag_text;
                tagged.push(TAG_SEPARATOR);
                self.push_narration(&mut spans, &tagged, report);
            }

            let inner = slice(chars, m.quote.open + 1, m.quote.close);
            match self.name_map.resolve(&m.name) {
                Some(id) if !inner.trim().is_empty() => {
                    let emotion = infer_emotion(self.lexicon, &m.verb, &inner);
                    let display = self
                        .name_map
                        .display_name(id)
                        .unwrap_or(&m.name)
                        .to_string();
                    let word_count = self.estimator.word_count(&inner);
                    spans.push(Span::dialogue(id.clone(), display, inner, word_count, emotion));
                    report.dialogue_spans += 1;
                    state.last_speaker = Some(id.clone());
                }
                _ => {
                    // 人名不在映射表（或空引语）：连同引号降级为旁白，
                    // 绝不猜测说话人
                    report.unresolved += 1;
                    self.push_narration(
                        &mut spans,
                        &slice(chars, m.quote.open, m.quote.close + 1),
                        report,
                    );
                }
            }

            cursor = m.quote.close + 1;
        }

        if cursor < chars.len() {
            self.push_narration(&mut spans, &slice(chars, cursor, chars.len()), report);
        }

        spans
    }

    /// 规则 3 的 Span 发射：裸引语按延续游标归属
    fn emit_continuity(
        &self,
        chars: &[char],
        runs: &[QuoteRun],
        state: &mut AttributionState,
        report: &mut AttributionReport,
    ) -> Vec<Span> {
        let mut spans = Vec::new();
        let mut cursor = 0;

        for run in runs {
            if run.open > cursor {
                self.push_narration(&mut spans, &slice(chars, cursor, run.open), report);
            }

            let inner = slice(chars, run.open + 1, run.close);
            match state.last_speaker.clone() {
                Some(id) if !inner.trim().is_empty() => {
                    let display = self
                        .name_map
                        .display_name(&id)
                        .unwrap_or(id.as_str())
                        .to_string();
                    let word_count = self.estimator.word_count(&inner);
                    spans.push(Span::dialogue(id, display, inner, word_count, Emotion::Neutral));
                    report.dialogue_spans += 1;
                }
                _ => {
                    // 游标未设置：连同引号保留为旁白
                    self.push_narration(
                        &mut spans,
                        &slice(chars, run.open, run.close + 1),
                        report,
                    );
                }
            }

            cursor = run.close + 1;
        }

        if cursor < chars.len() {
            self.push_narration(&mut spans, &slice(chars, cursor, chars.len()), report);
        }

        spans
    }

    fn push_narration(&self, spans: &mut Vec<Span>, text: &str, report: &mut AttributionReport) {
        if text.trim().is_empty() {
            return;
        }
        let word_count = self.estimator.word_count(text);
        spans.push(Span::narration(text, word_count));
        report.narration_spans += 1;
    }
}

fn slice(chars: &[char], start: usize, end: usize) -> String {
    chars[start..end].iter().collect()
}

fn is_quote_char(ch: char) -> bool {
    matches!(ch, '“' | '”' | '"')
}

/// 标签边界：句界标点与引号
fn is_tag_boundary(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '，' | '。' | '！' | '？' | '；' | '、' | '…' | '—' | '“' | '”'
                | ',' | '.' | '!' | '?' | ';' | '"'
        )
}

/// 找出所有成对引号区间，从左到右不重叠
///
/// 中文引号按 “…” 配对，ASCII 引号按出现次序配对；
/// 不成对的引号字符被忽略（落入兜底旁白规则）
fn find_quoted_runs(chars: &[char]) -> Vec<QuoteRun> {
    let mut runs = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '“' => {
                if let Some(offset) = chars[i + 1..].iter().position(|c| *c == '”') {
                    let close = i + 1 + offset;
                    runs.push(QuoteRun { open: i, close });
                    i = close + 1;
                } else {
                    i += 1;
                }
            }
            '"' => {
                if let Some(offset) = chars[i + 1..].iter().position(|c| *c == '"') {
                    let close = i + 1 + offset;
                    runs.push(QuoteRun { open: i, close });
                    i = close + 1;
                } else {
                    i += 1;
                }
            }
            _ => i += 1,
        }
    }

    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::attribution::SpanKind;
    use crate::domain::estimator::CharCountEstimator;

    fn name_map() -> NameMap {
        let mut map = NameMap::new();
        map.insert("萧炎", CharacterId::from_name("萧炎"));
        map.insert("药老", CharacterId::from_name("药老"));
        map
    }

    fn attribute(map: &NameMap, paragraphs: &[&str]) -> (Vec<Span>, AttributionReport) {
        let lexicon = Lexicon::default();
        let estimator = CharCountEstimator::default();
        let attributor = Attributor::new(&lexicon, map, &estimator);
        let mut state = AttributionState::new();
        let mut report = AttributionReport::default();
        let mut spans = Vec::new();
        for p in paragraphs {
            spans.extend(attributor.attribute_paragraph(p, &mut state, &mut report));
        }
        (spans, report)
    }

    #[test]
    fn test_plain_paragraph_is_single_narration() {
        let map = name_map();
        let (spans, _) = attribute(&map, &["少年面无表情，唇角有着一抹自嘲。"]);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind(), SpanKind::Narration);
        assert_eq!(spans[0].text(), "少年面无表情，唇角有着一抹自嘲。");
    }

    #[test]
    fn test_tagged_speech_attributed() {
        let map = name_map();
        let (spans, report) = attribute(&map, &["萧炎说道：“斗之力，三段。”"]);

        // 标签旁白 + 对话
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].kind(), SpanKind::Narration);
        assert_eq!(spans[0].text(), "萧炎说道。");
        assert_eq!(spans[1].kind(), SpanKind::Dialogue);
        assert_eq!(spans[1].speaker().as_str(), "char_萧炎");
        assert_eq!(spans[1].text(), "斗之力，三段。");
        assert_eq!(spans[1].word_count(), 7);
        assert_eq!(report.dialogue_spans, 1);
        assert_eq!(report.unresolved, 0);
    }

    #[test]
    fn test_narration_around_tag_preserved() {
        let map = name_map();
        let (spans, _) = attribute(
            &map,
            &["沉默片刻，萧炎笑道：“无妨。”说完转身离去。"],
        );

        let texts: Vec<&str> = spans.iter().map(Span::text).collect();
        assert_eq!(
            texts,
            vec!["沉默片刻，", "萧炎笑道。", "无妨。", "说完转身离去。"]
        );
        assert_eq!(spans[2].kind(), SpanKind::Dialogue);
    }

    #[test]
    fn test_continuity_uses_last_speaker() {
        let map = name_map();
        let (spans, _) = attribute(&map, &["萧炎说道：“第一句。”", "“第二句。”"]);

        let last = spans.last().unwrap();
        assert_eq!(last.kind(), SpanKind::Dialogue);
        assert_eq!(last.speaker().as_str(), "char_萧炎");
        assert_eq!(last.text(), "第二句。");
        assert_eq!(last.emotion(), Some(Emotion::Neutral));
    }

    #[test]
    fn test_bare_quote_without_cursor_stays_narration() {
        let map = name_map();
        let (spans, report) = attribute(&map, &["“不知来者何人。”"]);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].kind(), SpanKind::Narration);
        // 引号保留
        assert_eq!(spans[0].text(), "“不知来者何人。”");
        assert_eq!(report.dialogue_spans, 0);
    }

    #[test]
    fn test_unresolved_name_degrades_to_narration() {
        let map = name_map();
        let (spans, report) = attribute(&map, &["云岚宗主说道：“拿下他！”"]);

        assert!(spans.iter().all(|s| s.kind() == SpanKind::Narration));
        // 引语带引号降级为旁白
        assert!(spans.iter().any(|s| s.text() == "“拿下他！”"));
        assert_eq!(report.unresolved, 1);
        assert_eq!(report.dialogue_spans, 0);
    }

    #[test]
    fn test_unresolved_does_not_update_cursor() {
        let map = name_map();
        let (spans, _) = attribute(&map, &["云岚宗主说道：“呵。”", "“接着说。”"]);

        // 游标未被未归属的标签污染
        assert!(spans.iter().all(|s| s.kind() == SpanKind::Narration));
    }

    #[test]
    fn test_multiple_tags_in_one_paragraph() {
        let map = name_map();
        let (spans, report) = attribute(
            &map,
            &["萧炎问道：“可以吗？”药老笑道：“自然可以。”"],
        );

        let dialogues: Vec<&Span> = spans.iter().filter(|s| s.is_dialogue()).collect();
        assert_eq!(dialogues.len(), 2);
        assert_eq!(dialogues[0].speaker().as_str(), "char_萧炎");
        assert_eq!(dialogues[1].speaker().as_str(), "char_药老");
        assert_eq!(report.dialogue_spans, 2);
    }

    #[test]
    fn test_emotion_from_verb_and_text() {
        let map = name_map();
        let (spans, _) = attribute(&map, &["萧炎怒道：“滚！”"]);
        let dialogue = spans.iter().find(|s| s.is_dialogue()).unwrap();
        assert_eq!(dialogue.emotion(), Some(Emotion::Angry));

        let (spans, _) = attribute(&map, &["萧炎喊道：“三段！”"]);
        let dialogue = spans.iter().find(|s| s.is_dialogue()).unwrap();
        assert_eq!(dialogue.emotion(), Some(Emotion::Surprised));
    }

    #[test]
    fn test_idempotent_attribution() {
        let map = name_map();
        let paragraphs = [
            "萧炎说道：“斗之力，三段。”",
            "“果然不出我所料。”",
            "望着测验魔石碑，少年面无表情。",
        ];
        let (a, _) = attribute(&map, &paragraphs);
        let (b, _) = attribute(&map, &paragraphs);
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_coverage_modulo_separators() {
        // 所有 Span 文本顺序拼接，剔除结构分隔符后应还原原文内容
        let map = name_map();
        let paragraph = "萧炎说道：“斗之力，三段。”周围一片哗然。";
        let (spans, _) = attribute(&map, &[paragraph]);

        let strip = |s: &str| {
            s.chars()
                .filter(|c| !matches!(c, '。' | '“' | '”' | '：'))
                .collect::<String>()
        };
        let joined: String = spans.iter().map(Span::text).collect();
        assert_eq!(strip(&joined), strip(paragraph));
    }

    #[test]
    fn test_cursor_reset_between_chapters() {
        let lexicon = Lexicon::default();
        let map = name_map();
        let estimator = CharCountEstimator::default();
        let attributor = Attributor::new(&lexicon, &map, &estimator);

        let ch1 = Chapter::new(1, "一", "萧炎说道：“第一章。”").unwrap();
        let ch2 = Chapter::new(2, "二", "“裸引语。”").unwrap();

        let (_, _) = attributor.attribute_chapter(&ch1);
        let (attributed, report) = attributor.attribute_chapter(&ch2);

        // 第二章游标已重置，裸引语不得继承第一章的说话人
        assert!(attributed.spans.iter().all(|s| !s.is_dialogue()));
        assert_eq!(report.dialogue_spans, 0);
    }

    #[test]
    fn test_degenerate_input_yields_empty_spans() {
        let map = name_map();
        // 无段落
        let (spans, _) = attribute(&map, &[]);
        assert!(spans.is_empty());
        // 纯空白段落不产生 Span，也不报错
        let (spans, report) = attribute(&map, &["   "]);
        assert!(spans.is_empty());
        assert_eq!(report.paragraphs, 1);
    }

    #[test]
    fn test_ascii_quotes_supported() {
        let map = name_map();
        let (spans, _) = attribute(&map, &["萧炎说道:\"好。\""]);
        let dialogue = spans.iter().find(|s| s.is_dialogue());
        assert!(dialogue.is_some());
        assert_eq!(dialogue.unwrap().text(), "好。");
    }
}
