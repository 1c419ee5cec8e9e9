//! Character Context - 角色层级划分
//!
//! 固定阈值分类器，不是训练模型。阈值属于契约的一部分，
//! 由配置提供而非隐藏在代码里。

use serde::{Deserialize, Serialize};

use super::{CharacterRegistry, RoleTier};

/// 层级阈值
///
/// 判定规则（按序）:
/// - 出场次数 > protagonist_occurrences 或覆盖率 > protagonist_coverage → 主角
/// - 出场次数 > supporting_occurrences 或覆盖率 > supporting_coverage → 配角
/// - 否则 → 龙套
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleThresholds {
    pub protagonist_occurrences: usize,
    pub protagonist_coverage: f64,
    pub supporting_occurrences: usize,
    pub supporting_coverage: f64,
}

impl Default for RoleThresholds {
    fn default() -> Self {
        Self {
            protagonist_occurrences: 50,
            protagonist_coverage: 0.5,
            supporting_occurrences: 20,
            supporting_coverage: 0.3,
        }
    }
}

/// 对注册表内所有角色划分层级
///
/// 覆盖率 = 角色出现章节数 / 全表最大出现章节数（空表按 1 计，避免除零）
pub fn classify_roles(registry: &mut CharacterRegistry, thresholds: &RoleThresholds) {
    let max_chapter_count = registry.max_chapter_count() as f64;

    for character in registry.characters_mut() {
        let coverage = character.chapter_count() as f64 / max_chapter_count;
        let occurrences = character.occurrences();

        let role = if occurrences > thresholds.protagonist_occurrences
            || coverage > thresholds.protagonist_coverage
        {
            RoleTier::Protagonist
        } else if occurrences > thresholds.supporting_occurrences
            || coverage > thresholds.supporting_coverage
        {
            RoleTier::Supporting
        } else {
            RoleTier::Minor
        };

        character.finalize_role(role, coverage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::novel::ChapterId;

    /// 构造一个指定出场次数与章节数的注册表
    fn registry_with(name: &str, occurrences: usize, chapter_count: usize, max_chapters: usize) -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();
        // 撑大分母的参照角色
        for n in 1..=max_chapters {
            registry.record("萧战", &ChapterId::from_number(n));
        }
        let mut left = occurrences;
        for n in 1..=chapter_count {
            registry.record(name, &ChapterId::from_number(n));
            left = left.saturating_sub(1);
        }
        for _ in 0..left {
            registry.record(name, &ChapterId::from_number(1));
        }
        registry
    }

    #[test]
    fn test_occurrence_threshold_makes_protagonist() {
        // 51 次出场、覆盖率 0.1 → 主角
        let mut registry = registry_with("萧炎", 51, 1, 10);
        classify_roles(&mut registry, &RoleThresholds::default());
        let c = registry.get("萧炎").unwrap();
        assert_eq!(c.role(), Some(RoleTier::Protagonist));
        assert!(c.coverage().unwrap() <= 0.1 + f64::EPSILON);
    }

    #[test]
    fn test_low_counts_make_minor() {
        // 10 次出场、覆盖率 0.2 → 龙套
        let mut registry = registry_with("云韵", 10, 2, 10);
        classify_roles(&mut registry, &RoleThresholds::default());
        assert_eq!(registry.get("云韵").unwrap().role(), Some(RoleTier::Minor));
    }

    #[test]
    fn test_coverage_threshold_makes_supporting() {
        // 覆盖率 0.4、出场 4 次 → 配角
        let mut registry = registry_with("药老", 4, 4, 10);
        classify_roles(&mut registry, &RoleThresholds::default());
        assert_eq!(registry.get("药老").unwrap().role(), Some(RoleTier::Supporting));
    }

    #[test]
    fn test_helper_tolerates_fewer_occurrences_than_chapters() {
        // occurrences < chapter_count 时按每章一次计，不下溢
        let mut registry = registry_with("云岚", 2, 5, 10);
        classify_roles(&mut registry, &RoleThresholds::default());
        let c = registry.get("云岚").unwrap();
        assert_eq!(c.occurrences(), 5);
        assert!(c.role().is_some());
    }

    #[test]
    fn test_empty_registry_no_panic() {
        let mut registry = CharacterRegistry::new();
        classify_roles(&mut registry, &RoleThresholds::default());
        assert!(registry.is_empty());
    }
}
