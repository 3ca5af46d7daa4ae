//! 文本启发式策略
//!
//! 两个判断都是针对特定语言的字符类检查，阈值没有硬性依据，因此做成可配置：
//! - 噪声过滤：含有噪声标点且去空白后字符数不超过阈值的字符串不写入映射文件
//! - 有效文本：原文含有字母数字、CJK 汉字、日文假名或韩文音节时才写入翻译词典

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::Result;

/// 默认噪声标点集合
pub const DEFAULT_NOISE_PATTERN: &str = r"[@{}\[\]()#!*`,'^|<]";

/// 默认噪声过滤长度阈值（字符数）
pub const DEFAULT_MAX_NOISE_CHARS: usize = 3;

/// 默认有效文本字符类
pub const DEFAULT_MEANINGFUL_PATTERN: &str =
    r"[A-Za-z0-9\x{4e00}-\x{9fff}\x{3040}-\x{30ff}\x{ac00}-\x{d7af}]";

/// 策略配置（可序列化，用于配置文件）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub noise_pattern: String,
    pub max_noise_chars: usize,
    pub meaningful_pattern: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            noise_pattern: DEFAULT_NOISE_PATTERN.to_string(),
            max_noise_chars: DEFAULT_MAX_NOISE_CHARS,
            meaningful_pattern: DEFAULT_MEANINGFUL_PATTERN.to_string(),
        }
    }
}

/// 编译后的文本策略
#[derive(Debug, Clone)]
pub struct TextPolicy {
    noise: Regex,
    max_noise_chars: usize,
    meaningful: Regex,
}

impl TextPolicy {
    /// 从配置编译策略，正则无效时返回错误
    pub fn from_config(config: &PolicyConfig) -> Result<Self> {
        Ok(Self {
            noise: Regex::new(&config.noise_pattern)?,
            max_noise_chars: config.max_noise_chars,
            meaningful: Regex::new(&config.meaningful_pattern)?,
        })
    }

    /// 是否应从映射文件中排除
    ///
    /// 两个条件必须同时满足：含噪声标点，且去除首尾空白后不超过阈值字符数。
    pub fn is_noise(&self, text: &str) -> bool {
        self.noise.is_match(text) && text.trim().chars().count() <= self.max_noise_chars
    }

    /// 原文是否为值得写入词典的有效文本
    pub fn is_meaningful(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        self.meaningful.is_match(text)
    }
}

impl Default for TextPolicy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default()).expect("default policy patterns are valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_filter() {
        let policy = TextPolicy::default();

        assert!(policy.is_noise("@!"));
        assert!(policy.is_noise(" (a) "));
        assert!(policy.is_noise("|<"));

        // 足够长的字符串即使含噪声标点也保留
        assert!(!policy.is_noise("(abc)"));
        assert!(!policy.is_noise("Hello, world"));
        // 短但没有噪声标点
        assert!(!policy.is_noise("OK"));
        assert!(!policy.is_noise("是"));
    }

    #[test]
    fn test_noise_threshold_counts_characters() {
        let policy = TextPolicy::default();
        // 三个 CJK 字符（9 字节）仍算三个字符
        assert!(policy.is_noise("中文!"));
        assert!(!policy.is_noise("中文中!"));
    }

    #[test]
    fn test_meaningful_text() {
        let policy = TextPolicy::default();

        assert!(policy.is_meaningful("Start"));
        assert!(policy.is_meaningful("42"));
        assert!(policy.is_meaningful("設定"));
        assert!(policy.is_meaningful("ひらがな"));
        assert!(policy.is_meaningful("カタカナ"));
        assert!(policy.is_meaningful("한국어"));

        assert!(!policy.is_meaningful("   "));
        assert!(!policy.is_meaningful("*** ..."));
        assert!(!policy.is_meaningful("-->"));
    }

    #[test]
    fn test_custom_policy() {
        let config = PolicyConfig {
            noise_pattern: r"[%]".to_string(),
            max_noise_chars: 5,
            meaningful_pattern: r"[A-Z]".to_string(),
        };
        let policy = TextPolicy::from_config(&config).unwrap();

        assert!(policy.is_noise("%d%d"));
        assert!(!policy.is_noise("@!"));
        assert!(policy.is_meaningful("OK"));
        assert!(!policy.is_meaningful("ok"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = PolicyConfig {
            noise_pattern: "[".to_string(),
            ..PolicyConfig::default()
        };
        assert!(TextPolicy::from_config(&config).is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: PolicyConfig = serde_json::from_str(r#"{"max_noise_chars": 2}"#).unwrap();
        assert_eq!(config.max_noise_chars, 2);
        assert_eq!(config.noise_pattern, DEFAULT_NOISE_PATTERN);
    }
}
