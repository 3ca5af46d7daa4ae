/// 翻译词典（翻译记忆）模块
///
/// 原文 -> 译文 的持久化映射，跨次运行累积。
/// 唯一的修改途径是 [`TranslationMemory::save`] 的合并写入：
/// 新键追加，冲突键覆盖，其余键保留，从不整体清空，也没有删除接口。

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::Result;

/// 原文 -> 译文，只做完全匹配
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMemory {
    entries: BTreeMap<String, String>,
}

impl TranslationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载词典，文件不存在时返回空词典（不是错误）
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 合并新条目并写回
    ///
    /// 先加载已有词典，再用 `new_pairs` 做增量更新，最后整体写回。
    /// 返回合并后的词典。
    pub fn save<I>(path: &Path, new_pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut memory = Self::load(path)?;
        let before = memory.len();
        memory.merge(new_pairs);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, memory.to_json()?)?;

        tracing::debug!(
            "词典 {:?} 已更新：{} -> {} 条",
            path,
            before,
            memory.len()
        );

        Ok(memory)
    }

    /// 内存中的增量更新
    pub fn merge<I>(&mut self, new_pairs: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.entries.extend(new_pairs);
    }

    pub fn insert(&mut self, original: String, translated: String) -> Option<String> {
        self.entries.insert(original, translated)
    }

    /// 完全匹配查找
    pub fn lookup(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 两空格缩进的 JSON，非 ASCII 字符原样输出
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.entries)?)
    }
}
