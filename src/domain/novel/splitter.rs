//! 章节切分
//!
//! 按"第N章"形式的标题行把整本书切分为章节记录。
//! 没有任何标题行的文本整体作为单章处理。

use super::Chapter;

/// 标题行最大长度（字符），超过视为正文
const MAX_HEADING_CHARS: usize = 30;

/// 判断是否为章节标题行
///
/// 规则: 以"第"开头、包含"章"或"回"或"节"、且足够短
fn is_chapter_heading(line: &str) -> bool {
    let line = line.trim();
    if !line.starts_with('第') {
        return false;
    }
    if line.chars().count() > MAX_HEADING_CHARS {
        return false;
    }
    line.contains('章') || line.contains('回') || line.contains('节')
}

/// 把原始文本切分为章节
///
/// - 标题行之前的内容（序言等）并入第一章
/// - 空章节被丢弃
pub fn split_chapters(text: &str) -> Vec<Chapter> {
    let mut blocks: Vec<(String, Vec<&str>)> = Vec::new();
    let mut preamble: Vec<&str> = Vec::new();

    for line in text.lines() {
        if is_chapter_heading(line) {
            blocks.push((line.trim().to_string(), Vec::new()));
        } else if let Some((_, body)) = blocks.last_mut() {
            body.push(line);
        } else {
            preamble.push(line);
        }
    }

    if blocks.is_empty() {
        // 整本无标题：单章处理
        return Chapter::new(1, "全文", text).into_iter().collect();
    }

    let mut chapters = Vec::with_capacity(blocks.len());
    for (index, (title, body)) in blocks.into_iter().enumerate() {
        let mut body_text = String::new();
        if index == 0 && !preamble.iter().all(|l| l.trim().is_empty()) {
            body_text.push_str(&preamble.join("\n"));
            body_text.push('\n');
        }
        body_text.push_str(&body.join("\n"));

        let number = chapters.len() + 1;
        if let Ok(chapter) = Chapter::new(number, title, body_text) {
            chapters.push(chapter);
        }
    }

    chapters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_detection() {
        assert!(is_chapter_heading("第001章 陨落的天才"));
        assert!(is_chapter_heading("第十二回 风起云涌"));
        assert!(!is_chapter_heading("第二天早上，他出门了。"));
        assert!(!is_chapter_heading("普通的一行正文。"));
    }

    #[test]
    fn test_split_two_chapters() {
        let text = "第001章 开端\n正文第一章内容。\n\n第002章 再起\n正文第二章内容。";
        let chapters = split_chapters(text);
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].id().as_str(), "ch_001");
        assert_eq!(chapters[0].title(), "第001章 开端");
        assert!(chapters[0].text().contains("正文第一章内容"));
        assert_eq!(chapters[1].number(), 2);
    }

    #[test]
    fn test_preamble_merged_into_first_chapter() {
        let text = "书名与简介\n\n第001章 开端\n正文。";
        let chapters = split_chapters(text);
        assert_eq!(chapters.len(), 1);
        assert!(chapters[0].text().contains("书名与简介"));
    }

    #[test]
    fn test_no_heading_single_chapter() {
        let chapters = split_chapters("没有任何章节标记的一段长文。");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title(), "全文");
    }

    #[test]
    fn test_empty_chapter_dropped() {
        let text = "第001章 空章\n\n第002章 有内容\n正文。";
        let chapters = split_chapters(text);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].title(), "第002章 有内容");
    }
}
