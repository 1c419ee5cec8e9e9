//! Attribution Context - 对话归属限界上下文
//!
//! 职责:
//! - Span 模型（旁白 / 对话 / 说话人 / 情绪）
//! - 段落级规则级联与延续游标
//! - 情绪推断决策表

mod attributor;
mod emotion;
mod name_map;
mod span;

pub use attributor::{
    AttributedChapter, AttributionReport, AttributionState, Attributor, TAG_SEPARATOR,
};
pub use emotion::infer_emotion;
pub use name_map::NameMap;
pub use span::{Emotion, Span, SpanKind, Speaker};
