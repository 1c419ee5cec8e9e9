//! Segmentation Context - 打包限界上下文
//!
//! 职责:
//! - Segment: 单一说话人、时长封顶的合成单位
//! - Scene: 更粗的叙事分组，无说话人约束

mod packer;
mod segment;

pub use packer::{
    build_scenes, build_segments, segment_word_cap, DEFAULT_SCENE_WORD_CAP,
    DEFAULT_TARGET_DURATION_SECS,
};
pub use segment::{Scene, SceneId, Segment, SegmentId};
