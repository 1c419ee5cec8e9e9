//! Attribute Stage - 对话归属阶段
//!
//! 以选角产物中的角色名为映射表，逐章运行归属规则级联，
//! 每章写出一个归属产物文件。

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{ArtifactStorePort, AttributedChapterFile};
use crate::domain::attribution::{AttributionReport, Attributor, NameMap};
use crate::domain::character::CharacterId;
use crate::domain::{DurationEstimator, Lexicon};

/// 执行对话归属，返回全书合并统计
pub async fn run_attribute(
    store: &dyn ArtifactStorePort,
    lexicon: &Lexicon,
    estimator: &dyn DurationEstimator,
) -> Result<AttributionReport, ApplicationError> {
    let chapters_file = store.load_chapters().await?;
    let mapping = store.load_voice_mapping().await?;

    let mut name_map = NameMap::new();
    for (id, name) in &mapping.character_names {
        let character_id = CharacterId::new(id.clone())
            .map_err(|e| ApplicationError::Internal(format!("选角产物含非法角色标识 {}: {}", id, e)))?;
        name_map.insert(name.clone(), character_id);
    }

    let attributor = Attributor::new(lexicon, &name_map, estimator);
    let mut merged = AttributionReport::default();
    for chapter in &chapters_file.chapters {
        let (attributed, report) = attributor.attribute_chapter(chapter);
        merged.merge(&report);
        store
            .save_attributed_chapter(&AttributedChapterFile {
                creation_date: Utc::now(),
                report,
                chapter: attributed,
            })
            .await?;
        tracing::debug!(
            chapter = chapter.id().as_str(),
            dialogue = report.dialogue_spans,
            narration = report.narration_spans,
            unresolved = report.unresolved,
            "章节归属完成"
        );
    }

    tracing::info!(
        paragraphs = merged.paragraphs,
        dialogue = merged.dialogue_spans,
        narration = merged.narration_spans,
        unresolved = merged.unresolved,
        "对话归属完成"
    );
    if merged.unresolved > 0 {
        tracing::warn!(
            unresolved = merged.unresolved,
            "部分对话标签无法解析到已知角色，已降级为旁白"
        );
    }

    Ok(merged)
}
