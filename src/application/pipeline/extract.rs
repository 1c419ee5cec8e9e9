//! Extract Stage - 章节抽取阶段
//!
//! 读入原始小说文本，切分章节并写出章节产物。

use std::path::Path;

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{ArtifactStorePort, ChaptersFile};
use crate::domain::novel::split_chapters;

/// 抽取结果摘要
#[derive(Debug, Clone)]
pub struct ExtractOutcome {
    pub total_chapters: usize,
    pub total_word_count: i64,
}

/// 执行章节抽取
pub async fn run_extract(
    store: &dyn ArtifactStorePort,
    source_path: &Path,
) -> Result<ExtractOutcome, ApplicationError> {
    let text = tokio::fs::read_to_string(source_path)
        .await
        .map_err(|e| ApplicationError::Storage(format!("读取 {} 失败: {}", source_path.display(), e)))?;

    let chapters = split_chapters(&text);
    if chapters.is_empty() {
        return Err(ApplicationError::Validation(
            "源文本切分后没有任何章节".to_string(),
        ));
    }

    let total_word_count: i64 = chapters.iter().map(|c| c.word_count() as i64).sum();
    let file = ChaptersFile {
        creation_date: Utc::now(),
        source_file: source_path.display().to_string(),
        total_chapters: chapters.len(),
        total_word_count,
        chapters,
    };
    store.save_chapters(&file).await?;

    tracing::info!(
        chapters = file.total_chapters,
        words = total_word_count,
        "章节抽取完成"
    );

    Ok(ExtractOutcome {
        total_chapters: file.total_chapters,
        total_word_count,
    })
}
