//! Attribution Context - 情绪推断
//!
//! 固定优先级的小决策表，不是分类器。所有词集来自词表，
//! 外部可扩展。

use crate::domain::lexicon::Lexicon;

use super::Emotion;

/// 由匹配动词与对话文本推断情绪
///
/// 优先级:
/// 1. 动词属愤怒集 → angry
/// 2. 动词属悲伤集 → sad
/// 3. 文本以 ！/？ 结尾或含疑问标记:
///    动词属喊叫集 → surprised；动词属愤怒集 → angry
/// 4. 默认 → neutral
pub fn infer_emotion(lexicon: &Lexicon, verb: &str, text: &str) -> Emotion {
    if lexicon.anger_verbs.contains(verb) {
        return Emotion::Angry;
    }
    if lexicon.sadness_verbs.contains(verb) {
        return Emotion::Sad;
    }

    let excited = ends_with_exclamation(text) || lexicon.has_interrogative(text);
    if excited {
        if lexicon.shout_verbs.contains(verb) {
            return Emotion::Surprised;
        }
        if lexicon.anger_verbs.contains(verb) {
            return Emotion::Angry;
        }
    }

    Emotion::Neutral
}

fn ends_with_exclamation(text: &str) -> bool {
    matches!(
        text.trim_end().chars().last(),
        Some('！') | Some('？') | Some('!') | Some('?')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anger_verb_wins() {
        let lex = Lexicon::default();
        assert_eq!(infer_emotion(&lex, "怒道", "你找死！"), Emotion::Angry);
        // 愤怒动词优先于文本形态
        assert_eq!(infer_emotion(&lex, "喝道", "住手。"), Emotion::Angry);
    }

    #[test]
    fn test_sadness_verb() {
        let lex = Lexicon::default();
        assert_eq!(infer_emotion(&lex, "叹道", "罢了。"), Emotion::Sad);
    }

    #[test]
    fn test_shout_with_exclamation_is_surprised() {
        let lex = Lexicon::default();
        assert_eq!(infer_emotion(&lex, "喊道", "三段！"), Emotion::Surprised);
        assert_eq!(infer_emotion(&lex, "叫道", "这是什么"), Emotion::Surprised);
    }

    #[test]
    fn test_plain_speech_is_neutral() {
        let lex = Lexicon::default();
        assert_eq!(infer_emotion(&lex, "说道", "我们走吧。"), Emotion::Neutral);
        // 喊叫动词但无疑问/感叹形态
        assert_eq!(infer_emotion(&lex, "喊道", "回来。"), Emotion::Neutral);
    }
}
