//! 原始快照
//!
//! 第一次 extract 时把未修改的二进制另存一份，并记录它的摘要。之后的 extract / apply
//! 都基于这份原始数据扫描和打补丁，所以对已经写回过的文件再次 apply 时，
//! 偏移、可写区间和入词典的原文仍然来自最初的扫描。
//!
//! 元数据记录两个摘要：原始数据，以及最近一次写回的结果。磁盘上的二进制
//! 与两者都不一致时，说明文件在外部被替换过。

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::utils::{sha256_hex, Result};

/// 磁盘上的二进制与快照的关系
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// 与原始数据一致
    Original,
    /// 是最近一次写回的结果
    Patched,
    /// 与两者都不一致
    Changed,
}

/// 快照元数据（`<base>.snapshot.json`）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSnapshot {
    pub source_len: usize,
    pub source_sha256: String,
    /// 最近一次写回结果的摘要，从未写回时为空
    #[serde(default)]
    pub output_sha256: Option<String>,
}

impl SourceSnapshot {
    pub fn of(source: &[u8]) -> Self {
        Self {
            source_len: source.len(),
            source_sha256: sha256_hex(source),
            output_sha256: None,
        }
    }

    pub fn classify(&self, current: &[u8]) -> SourceState {
        let digest = sha256_hex(current);
        if digest == self.source_sha256 {
            SourceState::Original
        } else if self.output_sha256.as_deref() == Some(digest.as_str()) {
            SourceState::Patched
        } else {
            SourceState::Changed
        }
    }

    /// 副本是否仍是原始数据
    pub fn matches_source(&self, copy: &[u8]) -> bool {
        copy.len() == self.source_len && sha256_hex(copy) == self.source_sha256
    }

    pub fn record_output(&mut self, output: &[u8]) {
        self.output_sha256 = Some(sha256_hex(output));
    }

    /// 加载元数据，文件不存在时返回 `None`
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
