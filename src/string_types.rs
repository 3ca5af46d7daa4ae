use serde::{Serialize, Deserialize};

/// 扫描得到的字符串记录
///
/// - `offset`：字符串在二进制文件中的起始字节位置
/// - `text`：解码后的文本（无法解码的字节已被丢弃）
///
/// 每次扫描都会重新生成，不会被修改，只会被新的扫描结果取代。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringRecord {
    /// 起始偏移
    pub offset: usize,
    /// 文本内容
    pub text: String,
}

impl StringRecord {
    /// 创建新的字符串记录
    pub fn new(offset: usize, text: String) -> Self {
        StringRecord { offset, text }
    }

    /// 生成 `offset:text` 格式的映射行（不含换行符）
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.offset, self.text)
    }
}

impl std::fmt::Display for StringRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let preview = if self.text.chars().count() > 50 {
            format!("{}...", self.text.chars().take(50).collect::<String>())
        } else {
            self.text.clone()
        };
        write!(f, "[{:#010X}] \"{}\"", self.offset, preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_line_keeps_colons_in_text() {
        let record = StringRecord::new(3, "設定: 音量".to_string());
        assert_eq!(record.to_line(), "3:設定: 音量");
    }

    #[test]
    fn test_display_truncates_long_text() {
        let record = StringRecord::new(0x10, "x".repeat(60));
        let shown = record.to_string();
        assert!(shown.starts_with("[0x00000010]"));
        assert!(shown.ends_with("...\""));
    }
}
