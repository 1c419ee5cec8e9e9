//! Analyze Stage - 角色分析与选角阶段
//!
//! 从章节产物统计角色出场，分级后按音色池分配音色，
//! 写出选角产物。

use std::collections::BTreeMap;

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::artifact_store::{ArtifactStorePort, VoiceMappingFile};
use crate::domain::character::{
    assign_voices, classify_roles, CharacterExtractor, RoleThresholds, RoleTier, VoicePools,
};
use crate::domain::Lexicon;

/// 分析结果摘要
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    pub total_characters: usize,
    pub protagonists: usize,
    pub supporting: usize,
    pub minor: usize,
    pub shared_voice_warnings: usize,
}

/// 执行角色分析与选角
pub async fn run_analyze(
    store: &dyn ArtifactStorePort,
    lexicon: &Lexicon,
    thresholds: &RoleThresholds,
    pools: &VoicePools,
) -> Result<AnalyzeOutcome, ApplicationError> {
    let chapters_file = store.load_chapters().await?;

    let extractor = CharacterExtractor::new(lexicon);
    let mut registry = extractor.extract(&chapters_file.chapters);
    classify_roles(&mut registry, thresholds);
    let plan = assign_voices(&registry, pools);

    let mut voice_assignments = BTreeMap::new();
    let mut character_names = BTreeMap::new();
    let mut roles = BTreeMap::new();
    for assignment in &plan.assignments {
        let id = assignment.character_id.as_str().to_string();
        voice_assignments.insert(id.clone(), assignment.voice.clone());
        character_names.insert(id.clone(), assignment.name.clone());
        roles.insert(id, assignment.role);
    }

    let outcome = AnalyzeOutcome {
        total_characters: registry.len(),
        protagonists: count_tier(&roles, RoleTier::Protagonist),
        supporting: count_tier(&roles, RoleTier::Supporting),
        minor: count_tier(&roles, RoleTier::Minor),
        shared_voice_warnings: plan.shared_voice_warnings.len(),
    };

    let file = VoiceMappingFile {
        creation_date: Utc::now(),
        voice_assignments,
        character_names,
        roles,
        narrator_voice: plan.narrator_voice,
        shared_voice_warnings: plan.shared_voice_warnings,
    };
    store.save_voice_mapping(&file).await?;

    tracing::info!(
        characters = outcome.total_characters,
        protagonists = outcome.protagonists,
        supporting = outcome.supporting,
        minor = outcome.minor,
        "角色分析完成"
    );
    for warning in &file.shared_voice_warnings {
        tracing::warn!("{}", warning);
    }

    Ok(outcome)
}

fn count_tier(roles: &BTreeMap<String, RoleTier>, tier: RoleTier) -> usize {
    roles.values().filter(|r| **r == tier).count()
}
