//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 章节记录与章节标识
//! - 从原始文本切分章节

mod chapter;
mod splitter;

pub use chapter::{Chapter, ChapterId};
pub use splitter::split_chapters;
