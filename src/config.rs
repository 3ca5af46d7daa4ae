//! 运行配置
//!
//! 所有字段都有默认值，JSON 配置文件只需写出要覆盖的字段。

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::editor::OverflowPolicy;
use crate::policy::PolicyConfig;
use crate::utils::Result;

/// 默认映射文件目录
pub const DEFAULT_TRANSLATION_DIR: &str = "./translation";

/// 默认词典目录
pub const DEFAULT_DICT_DIR: &str = "./dict";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalizerConfig {
    /// 偏移映射文件目录（`<base>.txt`）
    pub translation_dir: PathBuf,
    /// 翻译词典目录（`<base>.json`）
    pub dict_dir: PathBuf,
    /// 新文本超长时的处理方式
    pub overflow: OverflowPolicy,
    /// 覆盖前是否创建时间戳备份
    pub backup: bool,
    /// 是否把变更写入翻译词典
    pub promote: bool,
    pub policy: PolicyConfig,
}

impl Default for LocalizerConfig {
    fn default() -> Self {
        Self {
            translation_dir: PathBuf::from(DEFAULT_TRANSLATION_DIR),
            dict_dir: PathBuf::from(DEFAULT_DICT_DIR),
            overflow: OverflowPolicy::Truncate,
            backup: false,
            promote: true,
            policy: PolicyConfig::default(),
        }
    }
}

impl LocalizerConfig {
    /// 从 JSON 文件加载
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// 某个二进制对应的映射文件路径
    pub fn offset_map_path(&self, base: &str) -> PathBuf {
        self.translation_dir.join(format!("{}.txt", base))
    }

    /// 原始快照元数据路径
    pub fn snapshot_path(&self, base: &str) -> PathBuf {
        self.translation_dir.join(format!("{}.snapshot.json", base))
    }

    /// 原始二进制副本路径
    pub fn source_copy_path(&self, base: &str) -> PathBuf {
        self.translation_dir.join(format!("{}.orig", base))
    }

    /// 某个二进制对应的词典路径
    pub fn dictionary_path(&self, base: &str) -> PathBuf {
        self.dict_dir.join(format!("{}.json", base))
    }
}
