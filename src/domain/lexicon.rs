//! 词表 - 人名提取与对话归属使用的词汇数据
//!
//! 所有词表都是外部可配置的数据，算法本身不内嵌任何词面量。
//! 换一套词表（例如拼音文字的姓氏表与动词表）即可让同一套算法
//! 服务于不同文字体系。内置默认值面向中文网络小说。

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// 词表
///
/// 各字段的用途:
/// - `intro_verbs`: 人名提取阶段识别"人名+动词+冒号"模式的短动词集
/// - `speech_verbs`: 对话归属阶段识别说话/动作标签的动词集（含复合动词）
/// - `stop_words`: 代词/副词/时间词，候选人名与其相等则拒绝
/// - `verb_suffixes`: 动词/体貌后缀，候选人名以其结尾则拒绝
/// - `filler_phrases`: 填充短语，候选人名包含则拒绝
/// - `surnames`: 姓氏表，候选人名必须以其中之一开头
/// - `anger_verbs` / `sadness_verbs` / `shout_verbs`: 情绪推断决策表
/// - `interrogatives`: 疑问标记，用于情绪推断
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub intro_verbs: Vec<String>,
    pub speech_verbs: Vec<String>,
    pub stop_words: BTreeSet<String>,
    pub verb_suffixes: Vec<String>,
    pub filler_phrases: Vec<String>,
    pub surnames: Vec<String>,
    pub anger_verbs: BTreeSet<String>,
    pub sadness_verbs: BTreeSet<String>,
    pub shout_verbs: BTreeSet<String>,
    pub interrogatives: Vec<String>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            intro_verbs: to_strings(&[
                "说道", "答道", "问道", "喊道", "笑道", "叫道", "说", "道", "问", "喊", "答",
            ]),
            speech_verbs: to_strings(&[
                "低声道", "沉声道", "淡淡道", "冷冷道", "轻声道", "厉声道", "黯然道",
                "苦涩道", "惊呼道", "插口道", "插嘴道", "解释道", "继续道", "接着道",
                "开口道", "苦笑道", "冷笑道", "叹息道", "说道", "笑道", "问道", "答道",
                "喊道", "叫道", "怒道", "喝道", "吼道", "骂道", "叹道", "哭道", "怒喝",
                "大喊", "大叫", "惊呼", "咆哮", "叹息", "说", "道", "问", "喊", "叫",
                "叹", "答",
            ]),
            stop_words: to_set(&[
                "这时", "那时", "此时", "此刻", "于是", "然后", "接着", "所以", "因为",
                "但是", "可是", "不过", "如果", "虽然", "他们", "她们", "我们", "你们",
                "自己", "大家", "众人", "人们", "忽然", "突然", "顿时", "终于", "果然",
                "居然", "竟然", "似乎", "仿佛", "立刻", "马上", "现在", "今天", "明天",
                "昨天", "刚才", "随后", "只见", "只是", "还是", "就是", "那么", "这么",
                "什么", "怎么",
            ]),
            verb_suffixes: to_strings(&["了", "着", "过", "地", "得", "的"]),
            filler_phrases: to_strings(&["一声", "一下", "起来", "出来", "一句", "着头"]),
            surnames: to_strings(&[
                "欧阳", "慕容", "纳兰", "上官", "司马", "东方", "独孤", "南宫", "西门",
                "令狐", "李", "王", "张", "刘", "陈", "杨", "黄", "赵", "周", "吴", "徐",
                "孙", "马", "朱", "胡", "郭", "何", "林", "罗", "高", "郑", "梁", "谢",
                "宋", "唐", "许", "韩", "冯", "邓", "曹", "彭", "曾", "萧", "田", "董",
                "袁", "潘", "蒋", "蔡", "余", "杜", "叶", "程", "苏", "魏", "吕", "丁",
                "任", "沈", "姚", "卢", "姜", "崔", "钟", "谭", "陆", "汪", "范", "金",
                "石", "廖", "贾", "夏", "韦", "方", "白", "邹", "孟", "熊", "秦", "邱",
                "江", "尹", "薛", "段", "雷", "侯", "龙", "史", "陶", "黎", "贺", "顾",
                "毛", "郝", "龚", "邵", "万", "钱", "严", "武", "戴", "莫", "孔", "向",
                "汤", "药", "云", "海",
            ]),
            anger_verbs: to_set(&[
                "怒道", "喝道", "吼道", "怒喝", "骂道", "怒骂", "咆哮", "厉声道", "怒吼",
            ]),
            sadness_verbs: to_set(&[
                "叹道", "叹息", "叹息道", "苦笑道", "哭道", "呜咽", "哽咽", "黯然道",
                "苦涩道",
            ]),
            shout_verbs: to_set(&[
                "喊道", "叫道", "大喊", "大叫", "惊呼", "惊呼道", "高喊", "喊", "叫",
            ]),
            interrogatives: to_strings(&["吗", "呢", "难道", "怎么", "什么", "为何", "为什么", "如何"]),
        }
    }
}

impl Lexicon {
    /// 从 TOML 文本加载词表
    ///
    /// 缺省字段回落到内置默认值
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// 候选人名是否以某个姓氏开头
    pub fn starts_with_surname(&self, name: &str) -> bool {
        self.surnames.iter().any(|s| name.starts_with(s.as_str()))
    }

    /// 候选人名是否以动词/体貌后缀结尾
    pub fn ends_with_verb_suffix(&self, name: &str) -> bool {
        self.verb_suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    /// 候选人名是否包含填充短语
    pub fn contains_filler(&self, name: &str) -> bool {
        self.filler_phrases.iter().any(|s| name.contains(s.as_str()))
    }

    /// 文本是否含疑问标记
    pub fn has_interrogative(&self, text: &str) -> bool {
        self.interrogatives.iter().any(|s| text.contains(s.as_str()))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// 把词集编译为按字符长度降序排列的匹配表
///
/// 匹配时长词优先，避免"说道"被短词"说"截断
pub(crate) fn compile_verbs(verbs: &[String]) -> Vec<Vec<char>> {
    let mut compiled: Vec<Vec<char>> = verbs.iter().map(|v| v.chars().collect()).collect();
    compiled.sort_by(|a, b| b.len().cmp(&a.len()));
    compiled
}

/// chars[pos..] 是否以 word 开头
pub(crate) fn starts_with_at(chars: &[char], pos: usize, word: &[char]) -> bool {
    chars.len() >= pos + word.len() && chars[pos..pos + word.len()] == *word
}
