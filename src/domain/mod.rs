//! Domain Layer - 领域层
//!
//! 四个限界上下文:
//! - Novel Context: 章节记录与切分
//! - Character Context: 角色发现、分级与选角
//! - Attribution Context: 对话归属
//! - Segmentation Context: Segment / Scene 打包

pub mod attribution;
pub mod character;
pub mod novel;
pub mod segmentation;

// 共享的词表与时长估算能力
mod estimator;
mod lexicon;

pub use estimator::{
    CharCountEstimator, DurationEstimator, SpaceDelimitedEstimator, DEFAULT_CHARS_PER_SECOND,
    DEFAULT_WORDS_PER_SECOND,
};
pub use lexicon::Lexicon;
