//! Character Context - 角色提取
//!
//! 扫描章节文本中"人名 + 说话引导动词 + 冒号"的模式，统计每个
//! 候选人名的出场次数与出现章节。纯函数：同样的输入永远得到
//! 同样的注册表。

use crate::domain::lexicon::{compile_verbs, starts_with_at, Lexicon};
use crate::domain::novel::Chapter;

use super::CharacterRegistry;

/// 候选人名最短长度（字符）
const MIN_NAME_CHARS: usize = 2;
/// 候选人名最长长度（字符）
const MAX_NAME_CHARS: usize = 4;

/// 角色提取器
pub struct CharacterExtractor<'a> {
    lexicon: &'a Lexicon,
    verbs: Vec<Vec<char>>,
}

impl<'a> CharacterExtractor<'a> {
    pub fn new(lexicon: &'a Lexicon) -> Self {
        let verbs = compile_verbs(&lexicon.intro_verbs);
        Self { lexicon, verbs }
    }

    /// 对整本书提取角色注册表
    pub fn extract(&self, chapters: &[Chapter]) -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();

        for chapter in chapters {
            self.scan_chapter(chapter, &mut registry);
        }

        tracing::debug!(
            characters = registry.len(),
            chapters = chapters.len(),
            "角色提取完成"
        );
        registry
    }

    fn scan_chapter(&self, chapter: &Chapter, registry: &mut CharacterRegistry) {
        let chars: Vec<char> = chapter.text().chars().collect();

        let mut pos = 0;
        while pos < chars.len() {
            let Some(verb_len) = self.match_verb_with_colon(&chars, pos) else {
                pos += 1;
                continue;
            };

            if let Some(name) = self.accept_name(&chars, pos) {
                registry.record(&name, chapter.id());
            }
            // 跳过 动词+冒号，避免"说道"与"道"重叠计数
            pos += verb_len + 1;
        }
    }

    /// chars[pos..] 是否为 动词+冒号，返回动词长度
    fn match_verb_with_colon(&self, chars: &[char], pos: usize) -> Option<usize> {
        for verb in &self.verbs {
            if starts_with_at(chars, pos, verb) {
                let after = pos + verb.len();
                if matches!(chars.get(after), Some('：') | Some(':')) {
                    return Some(verb.len());
                }
            }
        }
        None
    }

    /// 取动词前的候选人名并按序应用接受过滤
    ///
    /// 从长到短尝试（4 → 2 字符），取第一个通过全部过滤的候选。
    /// 过滤顺序: 长度 → 停用词 → 动词后缀 → 填充短语 → 姓氏前缀
    fn accept_name(&self, chars: &[char], verb_pos: usize) -> Option<String> {
        // 动词前连续的非标点字符数
        let mut run = 0;
        while run < MAX_NAME_CHARS {
            let Some(index) = verb_pos.checked_sub(run + 1) else {
                break;
            };
            if is_name_boundary(chars[index]) {
                break;
            }
            run += 1;
        }

        for len in (MIN_NAME_CHARS..=run.min(MAX_NAME_CHARS)).rev() {
            let name: String = chars[verb_pos - len..verb_pos].iter().collect();

            if self.lexicon.stop_words.contains(&name) {
                continue;
            }
            if self.lexicon.ends_with_verb_suffix(&name) {
                continue;
            }
            if self.lexicon.contains_filler(&name) {
                continue;
            }
            if !self.lexicon.starts_with_surname(&name) {
                continue;
            }
            return Some(name);
        }
        None
    }
}

/// 人名边界字符：标点、空白、引号
fn is_name_boundary(ch: char) -> bool {
    ch.is_whitespace()
        || matches!(
            ch,
            '，' | '。' | '！' | '？' | '；' | '：' | '、' | '…' | '—'
                | '“' | '”' | '‘' | '’' | '"' | '\'' | ',' | '.' | '!' | '?' | ';' | ':'
        )
}
