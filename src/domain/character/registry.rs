//! Character Context - 角色实体与注册表

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::novel::ChapterId;

/// 角色唯一标识
///
/// 格式: `char_` + 角色名，在一次流水线运行（一本书）内稳定
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(String);

impl CharacterId {
    pub fn from_name(name: &str) -> Self {
        Self(format!("char_{}", name))
    }

    pub fn new(id: impl Into<String>) -> Result<Self, &'static str> {
        let id = id.into();
        if id.is_empty() {
            return Err("角色标识不能为空");
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 角色层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleTier {
    /// 主角
    Protagonist,
    /// 配角
    Supporting,
    /// 龙套
    Minor,
}

impl std::fmt::Display for RoleTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Protagonist => "protagonist",
            Self::Supporting => "supporting",
            Self::Minor => "minor",
        };
        write!(f, "{}", s)
    }
}

/// 角色
///
/// 不变量:
/// - 由 Extractor 创建，Classifier 填充 role 后不再变更
/// - occurrences >= 1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    id: CharacterId,
    name: String,
    occurrences: usize,
    chapters: BTreeSet<ChapterId>,
    /// 章节覆盖率，Classifier 计算后填充
    coverage: Option<f64>,
    role: Option<RoleTier>,
}

impl Character {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: CharacterId::from_name(&name),
            name,
            occurrences: 0,
            chapters: BTreeSet::new(),
            coverage: None,
            role: None,
        }
    }

    /// 记录一次出场
    pub(crate) fn record_occurrence(&mut self, chapter: &ChapterId) {
        self.occurrences += 1;
        self.chapters.insert(chapter.clone());
    }

    /// 由 Classifier 定稿层级与覆盖率
    pub(crate) fn finalize_role(&mut self, role: RoleTier, coverage: f64) {
        self.role = Some(role);
        self.coverage = Some(coverage);
    }

    pub fn id(&self) -> &CharacterId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn occurrences(&self) -> usize {
        self.occurrences
    }

    pub fn chapters(&self) -> &BTreeSet<ChapterId> {
        &self.chapters
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn coverage(&self) -> Option<f64> {
        self.coverage
    }

    pub fn role(&self) -> Option<RoleTier> {
        self.role
    }
}

/// 角色注册表
///
/// 保持首次出现顺序（顺序无语义，仅保证同输入同输出）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterRegistry {
    characters: Vec<Character>,
}

impl CharacterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录角色在某章节出现一次，首次出现时创建角色
    pub fn record(&mut self, name: &str, chapter: &ChapterId) {
        if let Some(character) = self.characters.iter_mut().find(|c| c.name == name) {
            character.record_occurrence(chapter);
        } else {
            let mut character = Character::new(name);
            character.record_occurrence(chapter);
            self.characters.push(character);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.name == name)
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub(crate) fn characters_mut(&mut self) -> &mut [Character] {
        &mut self.characters
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// 所有角色中最大的章节出场数，空表返回 1（避免除零）
    pub fn max_chapter_count(&self) -> usize {
        self.characters
            .iter()
            .map(Character::chapter_count)
            .max()
            .unwrap_or(1)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_id_format() {
        assert_eq!(CharacterId::from_name("萧炎").as_str(), "char_萧炎");
    }

    #[test]
    fn test_registry_counts_and_order() {
        let mut registry = CharacterRegistry::new();
        let ch1 = ChapterId::from_number(1);
        let ch2 = ChapterId::from_number(2);

        registry.record("萧炎", &ch1);
        registry.record("药老", &ch1);
        registry.record("萧炎", &ch2);
        registry.record("萧炎", &ch2);

        assert_eq!(registry.len(), 2);
        // 首次出现顺序
        assert_eq!(registry.characters()[0].name(), "萧炎");
        let xiao = registry.get("萧炎").unwrap();
        assert_eq!(xiao.occurrences(), 3);
        assert_eq!(xiao.chapter_count(), 2);
    }

    #[test]
    fn test_max_chapter_count_empty_is_one() {
        let registry = CharacterRegistry::new();
        assert_eq!(registry.max_chapter_count(), 1);
    }
}
