//! Novel Context - 章节记录

use serde::{Deserialize, Serialize};

/// 章节唯一标识
///
/// 格式: `ch_001`，按章节顺序编号，在整本书内唯一
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChapterId(String);

impl ChapterId {
    /// 按章节序号创建标识
    pub fn from_number(number: usize) -> Self {
        Self(format!("ch_{:03}", number))
    }

    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if id.is_empty() {
            return Err("章节标识不能为空");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChapterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 章节记录
///
/// 不变量:
/// - text 不可为空（空章节在切分阶段被丢弃）
/// - number 在整本书内唯一且有序
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    id: ChapterId,
    number: usize,
    title: String,
    text: String,
}

impl Chapter {
    pub fn new(number: usize, title: impl Into<String>, text: impl Into<String>) -> Result<Self, &'static str> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err("章节内容不能为空");
        }
        Ok(Self {
            id: ChapterId::from_number(number),
            number,
            title: title.into(),
            text,
        })
    }

    pub fn id(&self) -> &ChapterId {
        &self.id
    }

    pub fn number(&self) -> usize {
        self.number
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 章节字数（按字符计）
    pub fn word_count(&self) -> usize {
        self.text.chars().filter(|c| !c.is_whitespace()).count()
    }

    /// 按段落迭代章节正文
    ///
    /// 段落即非空行，与原始文本的排版一一对应
    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.text.lines().map(str::trim).filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_id_format() {
        assert_eq!(ChapterId::from_number(1).as_str(), "ch_001");
        assert_eq!(ChapterId::from_number(42).as_str(), "ch_042");
    }

    #[test]
    fn test_empty_chapter_rejected() {
        assert!(Chapter::new(1, "空章", "   ").is_err());
    }

    #[test]
    fn test_paragraphs_skip_blank_lines() {
        let chapter = Chapter::new(1, "测试", "第一段。\n\n第二段。\n").unwrap();
        let paragraphs: Vec<&str> = chapter.paragraphs().collect();
        assert_eq!(paragraphs, vec!["第一段。", "第二段。"]);
    }

    #[test]
    fn test_word_count_ignores_whitespace() {
        let chapter = Chapter::new(1, "测试", "你好 世界").unwrap();
        assert_eq!(chapter.word_count(), 4);
    }
}
