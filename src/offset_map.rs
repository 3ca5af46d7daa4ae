/// 偏移映射文件模块
///
/// 每个二进制文件对应一个可人工编辑的文本文件，每行一条 `偏移:文本`。
/// 只按第一个冒号分割，文本中的冒号不做转义。
/// 被用户删除的行视为"不翻译"，不会被写回二进制。

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::dictionary::TranslationMemory;
use crate::policy::TextPolicy;
use crate::scanner::ScanResult;
use crate::string_types::StringRecord;
use crate::utils::{LocalizeError, Result};

/// 偏移 -> 当前文本 的有序映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetMap {
    entries: BTreeMap<usize, String>,
}

/// 保存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    /// 写入的行数
    pub written: usize,
    /// 被噪声过滤排除的条目数
    pub excluded: usize,
}

impl OffsetMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从扫描结果创建映射
    pub fn from_scan(scan: &ScanResult) -> Self {
        scan.iter().map(|record| (record.offset, record.text)).collect()
    }

    /// 用翻译词典预填充：文本与词典键完全一致时替换为译文
    ///
    /// 返回被替换的条目数。
    pub fn apply_memory(&mut self, memory: &TranslationMemory) -> usize {
        if memory.is_empty() {
            return 0;
        }

        let mut replaced = 0;
        for text in self.entries.values_mut() {
            if let Some(translated) = memory.lookup(text) {
                *text = translated.to_string();
                replaced += 1;
            }
        }
        replaced
    }

    pub fn insert(&mut self, offset: usize, text: String) -> Option<String> {
        self.entries.insert(offset, text)
    }

    pub fn remove(&mut self, offset: usize) -> Option<String> {
        self.entries.remove(&offset)
    }

    pub fn get(&self, offset: usize) -> Option<&str> {
        self.entries.get(&offset).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.entries.iter().map(|(&offset, text)| (offset, text.as_str()))
    }

    /// 序列化为文本，跳过噪声条目
    pub fn to_text(&self, policy: &TextPolicy) -> (String, SaveStats) {
        let mut out = String::new();
        let mut stats = SaveStats::default();

        for (offset, text) in &self.entries {
            if policy.is_noise(text) {
                stats.excluded += 1;
                continue;
            }
            out.push_str(&StringRecord::new(*offset, text.clone()).to_line());
            out.push('\n');
            stats.written += 1;
        }

        (out, stats)
    }

    /// 从文本解析映射
    ///
    /// - 没有冒号的行静默跳过
    /// - 偏移不是十进制整数的行跳过并警告
    pub fn parse(content: &str) -> Self {
        let mut entries = BTreeMap::new();

        for (line_no, line) in content.lines().enumerate() {
            let Some((offset, text)) = line.split_once(':') else {
                continue;
            };

            match offset.trim().parse::<usize>() {
                Ok(offset) => {
                    entries.insert(offset, text.to_string());
                }
                Err(_) => {
                    tracing::warn!("映射文件第 {} 行偏移无效，已跳过: {:?}", line_no + 1, offset);
                }
            }
        }

        Self { entries }
    }

    /// 保存到文件（自动创建父目录）
    pub fn save(&self, path: &Path, policy: &TextPolicy) -> Result<SaveStats> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let (content, stats) = self.to_text(policy);
        let mut file = std::fs::File::create(path)?;
        file.write_all(content.as_bytes())?;

        tracing::debug!(
            "映射文件已写入 {:?}：{} 行，排除 {} 条",
            path,
            stats.written,
            stats.excluded
        );

        Ok(stats)
    }

    /// 从文件加载，文件不存在时返回 `MissingOffsetMap`
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(LocalizeError::MissingOffsetMap(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }
}

impl FromIterator<(usize, String)> for OffsetMap {
    fn from_iter<I: IntoIterator<Item = (usize, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
