//! 时长估算 - 可插拔的"合成时长估算器"能力
//!
//! 核心算法只依赖该能力，不依赖具体的计数规则。表意文字
//! （中文）按字符计数，拼音文字按空白分词计数，换实现即可。

/// 合成时长估算器
pub trait DurationEstimator: Send + Sync {
    /// 文本的"字数"（计数规则由实现决定）
    fn word_count(&self, text: &str) -> usize;

    /// 语速：每秒字数
    fn words_per_second(&self) -> f64;

    /// 按字数估算时长（秒）
    fn estimate_secs(&self, word_count: usize) -> f64 {
        word_count as f64 / self.words_per_second()
    }
}

/// 中文默认语速：每秒约 2.5 字
pub const DEFAULT_CHARS_PER_SECOND: f64 = 2.5;

/// 按字符计数的估算器（表意文字）
///
/// 字数 == 字符数，时长 = 字数 / 每秒字数
#[derive(Debug, Clone)]
pub struct CharCountEstimator {
    chars_per_second: f64,
}

impl CharCountEstimator {
    /// 创建估算器，非正语速回落默认值（不崩溃）
    pub fn new(chars_per_second: f64) -> Self {
        let chars_per_second = if chars_per_second > 0.0 {
            chars_per_second
        } else {
            DEFAULT_CHARS_PER_SECOND
        };
        Self { chars_per_second }
    }
}

impl Default for CharCountEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CHARS_PER_SECOND)
    }
}

impl DurationEstimator for CharCountEstimator {
    fn word_count(&self, text: &str) -> usize {
        text.chars().count()
    }

    fn words_per_second(&self) -> f64 {
        self.chars_per_second
    }
}

/// 按空白分词计数的估算器（拼音文字）
#[derive(Debug, Clone)]
pub struct SpaceDelimitedEstimator {
    words_per_second: f64,
}

impl SpaceDelimitedEstimator {
    pub fn new(words_per_second: f64) -> Self {
        let words_per_second = if words_per_second > 0.0 {
            words_per_second
        } else {
            DEFAULT_WORDS_PER_SECOND
        };
        Self { words_per_second }
    }
}

/// 英文默认语速：每秒约 2.8 词
pub const DEFAULT_WORDS_PER_SECOND: f64 = 2.8;

impl Default for SpaceDelimitedEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_WORDS_PER_SECOND)
    }
}

impl DurationEstimator for SpaceDelimitedEstimator {
    fn word_count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn words_per_second(&self) -> f64 {
        self.words_per_second
    }
}
