//! Character Context - 角色限界上下文
//!
//! 职责:
//! - 从章节文本统计发现角色（Extractor）
//! - 按出场频次与章节覆盖率划分角色层级（Classifier）
//! - 按层级分配音色（Casting）

mod casting;
mod classifier;
mod extractor;
mod registry;

pub use casting::{assign_voices, CastingPlan, VoiceAssignment, VoicePools};
pub use classifier::{classify_roles, RoleThresholds};
pub use extractor::CharacterExtractor;
pub use registry::{Character, CharacterId, CharacterRegistry, RoleTier};
