//! Character Context - 音色分配
//!
//! 按角色层级从各自的音色池里顺序取音色。池耗尽时回绕复用，
//! 并把复用情况记入告警列表，保证复用对调用方可见。

use serde::{Deserialize, Serialize};

use super::{CharacterId, CharacterRegistry, RoleTier};

/// 各层级音色池
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoicePools {
    pub protagonist: Vec<String>,
    pub supporting: Vec<String>,
    pub minor: Vec<String>,
    /// 旁白音色
    pub narrator: String,
}

impl Default for VoicePools {
    fn default() -> Self {
        Self {
            protagonist: vec!["voice_proto_m01".into(), "voice_proto_f01".into()],
            supporting: vec![
                "voice_supp_m01".into(),
                "voice_supp_f01".into(),
                "voice_supp_m02".into(),
                "voice_supp_f02".into(),
            ],
            minor: vec!["voice_minor_m01".into(), "voice_minor_f01".into()],
            narrator: "voice_narrator".into(),
        }
    }
}

impl VoicePools {
    fn pool(&self, role: RoleTier) -> &[String] {
        match role {
            RoleTier::Protagonist => &self.protagonist,
            RoleTier::Supporting => &self.supporting,
            RoleTier::Minor => &self.minor,
        }
    }
}

/// 单个角色的音色分配
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoiceAssignment {
    pub character_id: CharacterId,
    pub name: String,
    pub role: RoleTier,
    pub voice: String,
}

/// 全书音色分配方案
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastingPlan {
    pub assignments: Vec<VoiceAssignment>,
    pub narrator_voice: String,
    /// 池耗尽导致的音色复用告警
    pub shared_voice_warnings: Vec<String>,
}

impl CastingPlan {
    pub fn voice_for(&self, id: &CharacterId) -> Option<&str> {
        self.assignments
            .iter()
            .find(|a| &a.character_id == id)
            .map(|a| a.voice.as_str())
    }
}

/// 为注册表内所有已分级角色分配音色
///
/// 未分级角色（Classifier 未运行）按龙套处理。
pub fn assign_voices(registry: &CharacterRegistry, pools: &VoicePools) -> CastingPlan {
    let mut assignments = Vec::with_capacity(registry.len());
    let mut warnings = Vec::new();
    let mut cursors = [0usize; 3];

    for character in registry.characters() {
        let role = character.role().unwrap_or(RoleTier::Minor);
        let pool = pools.pool(role);

        let voice = if pool.is_empty() {
            // 层级池未配置，退到旁白音色并告警
            warnings.push(format!(
                "角色 {} ({}) 的 {} 音色池为空，使用旁白音色",
                character.name(),
                character.id(),
                role
            ));
            pools.narrator.clone()
        } else {
            let cursor_index = match role {
                RoleTier::Protagonist => 0,
                RoleTier::Supporting => 1,
                RoleTier::Minor => 2,
            };
            let cursor = cursors[cursor_index];
            cursors[cursor_index] += 1;

            let voice = pool[cursor % pool.len()].clone();
            if cursor >= pool.len() {
                // 池耗尽后回绕复用：不沉默，向调用方报告
                let earlier = assignments
                    .iter()
                    .filter(|a: &&VoiceAssignment| a.voice == voice)
                    .map(|a| a.name.clone())
                    .collect::<Vec<_>>()
                    .join("、");
                warnings.push(format!(
                    "{} 音色池耗尽，角色 {} 与 {} 共用音色 {}",
                    role,
                    character.name(),
                    earlier,
                    voice
                ));
            }
            voice
        };

        assignments.push(VoiceAssignment {
            character_id: character.id().clone(),
            name: character.name().to_string(),
            role,
            voice,
        });
    }

    for warning in &warnings {
        tracing::warn!("{}", warning);
    }

    CastingPlan {
        assignments,
        narrator_voice: pools.narrator.clone(),
        shared_voice_warnings: warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::character::{classify_roles, RoleThresholds};
    use crate::domain::novel::ChapterId;

    /// 主角"萧战"撑大覆盖率分母，names 均为单次出场的龙套
    fn classified_registry(names: &[&str]) -> CharacterRegistry {
        let mut registry = CharacterRegistry::new();
        for n in 1..=10 {
            registry.record("萧战", &ChapterId::from_number(n));
        }
        let ch = ChapterId::from_number(1);
        for name in names {
            registry.record(name, &ch);
        }
        classify_roles(&mut registry, &RoleThresholds::default());
        registry
    }

    #[test]
    fn test_assignment_is_deterministic() {
        let registry = classified_registry(&["萧炎", "药老"]);
        let pools = VoicePools::default();
        let a = assign_voices(&registry, &pools);
        let b = assign_voices(&registry, &pools);
        assert_eq!(a.assignments[0].voice, b.assignments[0].voice);
        assert_eq!(a.assignments[1].voice, b.assignments[1].voice);
    }

    #[test]
    fn test_pool_exhaustion_reports_warning() {
        // 3 个龙套角色，池里只有 1 个音色
        let registry = classified_registry(&["萧媚", "萧宁", "萧玉"]);
        let pools = VoicePools {
            minor: vec!["only_voice".into()],
            ..VoicePools::default()
        };

        let plan = assign_voices(&registry, &pools);
        let minors: Vec<_> = plan
            .assignments
            .iter()
            .filter(|a| a.role == RoleTier::Minor)
            .collect();
        assert_eq!(minors.len(), 3);
        assert!(minors.iter().all(|a| a.voice == "only_voice"));
        // 第 2、3 个龙套触发复用告警
        assert_eq!(plan.shared_voice_warnings.len(), 2);
    }

    #[test]
    fn test_voice_lookup_by_id() {
        let registry = classified_registry(&["萧炎"]);
        let plan = assign_voices(&registry, &VoicePools::default());
        let id = CharacterId::from_name("萧炎");
        assert!(plan.voice_for(&id).is_some());
    }
}
