//! Attribution Context - Span 与说话人

use serde::{Deserialize, Serialize};

use crate::domain::character::CharacterId;

/// Span 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanKind {
    Narration,
    Dialogue,
}

/// 说话人身份
///
/// 序列化为纯字符串: `narrator` / `unknown` / 角色标识
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Speaker {
    Narrator,
    Character(CharacterId),
    /// 未能归属的对话（规则级联会降级为旁白，此值仅为外部数据保留）
    Unknown,
}

impl Speaker {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Narrator => "narrator",
            Self::Unknown => "unknown",
            Self::Character(id) => id.as_str(),
        }
    }

    pub fn character_id(&self) -> Option<&CharacterId> {
        match self {
            Self::Character(id) => Some(id),
            _ => None,
        }
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Speaker {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "narrator" => Ok(Self::Narrator),
            "unknown" => Ok(Self::Unknown),
            other => CharacterId::new(other).map(Self::Character),
        }
    }
}

impl Serialize for Speaker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Speaker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// 情绪标签
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Neutral,
    Angry,
    Sad,
    Surprised,
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Neutral => "neutral",
            Self::Angry => "angry",
            Self::Sad => "sad",
            Self::Surprised => "surprised",
        };
        write!(f, "{}", s)
    }
}

/// Span - 最小归属单位
///
/// 不变量:
/// - 创建后不可变
/// - word_count 与 text 在估算器计数规则下一致
/// - narration Span 的说话人恒为 narrator，无情绪
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    kind: SpanKind,
    #[serde(rename = "speaker_id")]
    speaker: Speaker,
    #[serde(skip_serializing_if = "Option::is_none")]
    speaker_name: Option<String>,
    text: String,
    word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    emotion: Option<Emotion>,
}

impl Span {
    pub fn narration(text: impl Into<String>, word_count: usize) -> Self {
        Self {
            kind: SpanKind::Narration,
            speaker: Speaker::Narrator,
            speaker_name: None,
            text: text.into(),
            word_count,
            emotion: None,
        }
    }

    pub fn dialogue(
        speaker: CharacterId,
        speaker_name: impl Into<String>,
        text: impl Into<String>,
        word_count: usize,
        emotion: Emotion,
    ) -> Self {
        Self {
            kind: SpanKind::Dialogue,
            speaker: Speaker::Character(speaker),
            speaker_name: Some(speaker_name.into()),
            text: text.into(),
            word_count,
            emotion: Some(emotion),
        }
    }

    pub fn kind(&self) -> SpanKind {
        self.kind
    }

    pub fn speaker(&self) -> &Speaker {
        &self.speaker
    }

    pub fn speaker_name(&self) -> Option<&str> {
        self.speaker_name.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn emotion(&self) -> Option<Emotion> {
        self.emotion
    }

    pub fn is_dialogue(&self) -> bool {
        self.kind == SpanKind::Dialogue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_roundtrip_as_string() {
        let speaker = Speaker::Character(CharacterId::from_name("萧炎"));
        let json = serde_json::to_string(&speaker).unwrap();
        assert_eq!(json, "\"char_萧炎\"");
        let back: Speaker = serde_json::from_str(&json).unwrap();
        assert_eq!(back, speaker);

        let narrator: Speaker = serde_json::from_str("\"narrator\"").unwrap();
        assert_eq!(narrator, Speaker::Narrator);
    }

    #[test]
    fn test_span_serialization_shape() {
        let span = Span::dialogue(
            CharacterId::from_name("萧炎"),
            "萧炎",
            "斗之力，三段！",
            7,
            Emotion::Surprised,
        );
        let value = serde_json::to_value(&span).unwrap();
        assert_eq!(value["kind"], "dialogue");
        assert_eq!(value["speaker_id"], "char_萧炎");
        assert_eq!(value["word_count"], 7);
        assert_eq!(value["emotion"], "surprised");
    }

    #[test]
    fn test_narration_has_no_emotion() {
        let span = Span::narration("少年面无表情。", 7);
        assert_eq!(span.kind(), SpanKind::Narration);
        assert_eq!(span.speaker(), &Speaker::Narrator);
        assert!(span.emotion().is_none());
        let value = serde_json::to_value(&span).unwrap();
        assert!(value.get("emotion").is_none());
    }
}
