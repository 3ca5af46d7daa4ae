/// 变更检测模块
///
/// 将用户编辑后的偏移映射与原始扫描结果逐条比较，决定：
/// - 哪些偏移需要写回二进制（[`PatchSet`]）
/// - 哪些 原文 -> 译文 值得写入翻译词典（promotions）

use std::collections::BTreeMap;

use crate::offset_map::OffsetMap;
use crate::policy::TextPolicy;
use crate::scanner::ScanResult;

/// 单个偏移的补丁
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchEntry {
    /// 原文；已知时用其 UTF-8 长度作为可写区间
    pub original: Option<String>,
    /// 要写入的新文本
    pub replacement: String,
}

impl PatchEntry {
    pub fn new(original: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            original: Some(original.into()),
            replacement: replacement.into(),
        }
    }

    /// 原文未知的补丁，写入时按零终止符确定区间
    pub fn without_original(replacement: impl Into<String>) -> Self {
        Self {
            original: None,
            replacement: replacement.into(),
        }
    }
}

impl std::fmt::Display for PatchEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let clip = |s: &str| {
            if s.chars().count() > 30 {
                format!("{}...", s.chars().take(30).collect::<String>())
            } else {
                s.to_string()
            }
        };
        match &self.original {
            Some(original) => write!(f, "\"{}\" -> \"{}\"", clip(original), clip(&self.replacement)),
            None => write!(f, "? -> \"{}\"", clip(&self.replacement)),
        }
    }
}

/// 按原始偏移排序的补丁集合
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchSet {
    entries: BTreeMap<usize, PatchEntry>,
}

impl PatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, offset: usize, entry: PatchEntry) -> Option<PatchEntry> {
        self.entries.insert(offset, entry)
    }

    pub fn get(&self, offset: usize) -> Option<&PatchEntry> {
        self.entries.get(&offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按偏移升序迭代
    pub fn iter(&self) -> impl Iterator<Item = (usize, &PatchEntry)> + '_ {
        self.entries.iter().map(|(&offset, entry)| (offset, entry))
    }
}

impl FromIterator<(usize, PatchEntry)> for PatchSet {
    fn from_iter<I: IntoIterator<Item = (usize, PatchEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 变更检测结果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// 需要写回的补丁
    pub patches: PatchSet,
    /// 建议写入词典的 原文 -> 译文
    pub promotions: BTreeMap<String, String>,
    /// 文本未改动的偏移数
    pub unchanged: usize,
    /// 被用户删除（不翻译）的偏移数
    pub declined: usize,
}

impl ChangeSet {
    pub fn has_changes(&self) -> bool {
        !self.patches.is_empty()
    }

    /// 生成变更摘要
    pub fn summary(&self) -> String {
        format!(
            "修改: {}, 未改动: {}, 不翻译: {}, 入词典: {}",
            self.patches.len(),
            self.unchanged,
            self.declined,
            self.promotions.len()
        )
    }
}

/// 变更检测器
pub struct ChangeDetector<'a> {
    policy: &'a TextPolicy,
}

impl<'a> ChangeDetector<'a> {
    pub fn new(policy: &'a TextPolicy) -> Self {
        Self { policy }
    }

    /// 比较原始扫描与编辑后的映射
    pub fn detect(&self, scan: &ScanResult, edited: &OffsetMap) -> ChangeSet {
        let mut changes = ChangeSet::default();

        for (&offset, original) in &scan.records {
            let Some(current) = edited.get(offset) else {
                // 用户删掉这一行 -> 不修改
                changes.declined += 1;
                continue;
            };

            if current == original.as_str() {
                changes.unchanged += 1;
                continue;
            }

            if self.policy.is_meaningful(original) {
                changes
                    .promotions
                    .insert(original.clone(), current.to_string());
            }
            changes
                .patches
                .insert(offset, PatchEntry::new(original.as_str(), current));
        }

        let unknown = edited.iter().filter(|(offset, _)| scan.get(*offset).is_none()).count();
        if unknown > 0 {
            tracing::debug!("映射文件中有 {} 个偏移不在扫描结果中，已忽略", unknown);
        }

        changes
    }
}
