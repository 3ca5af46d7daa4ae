/// 二进制补丁模块
///
/// 按原始偏移升序把补丁写入内存中的缓冲区。写入区间由原文的 UTF-8 长度决定，
/// 只有原文未知时才退回到查找零终止符。
///
/// - 新文本较短：末尾补零到原区间长度，文件大小不变
/// - 长度相同：直接覆盖
/// - 新文本较长：按 [`OverflowPolicy`] 截断或推移

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::delta::{PatchEntry, PatchSet};
use crate::utils::{LocalizeError, Result};

/// 新文本超出原区间时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// 截断到原区间长度，文件大小不变
    #[default]
    Truncate,
    /// 在原区间之后插入零字节并完整写入，文件变大，后续偏移随之推移
    Shift,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "truncate" => Ok(OverflowPolicy::Truncate),
            "shift" => Ok(OverflowPolicy::Shift),
            other => Err(format!("未知的溢出策略: {} (可选 truncate / shift)", other)),
        }
    }
}

impl std::fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverflowPolicy::Truncate => write!(f, "truncate"),
            OverflowPolicy::Shift => write!(f, "shift"),
        }
    }
}

/// 补丁应用统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatchReport {
    /// 写入的补丁总数
    pub applied: usize,
    /// 补零的条目
    pub padded: usize,
    /// 被截断的条目
    pub truncated: usize,
    /// 推移写入的条目
    pub shifted: usize,
    /// 累计增长的字节数
    pub growth: usize,
    /// 最终缓冲区长度
    pub final_len: usize,
}

/// 二进制补丁器
#[derive(Debug, Clone, Copy, Default)]
pub struct Patcher {
    policy: OverflowPolicy,
}

impl Patcher {
    pub fn new(policy: OverflowPolicy) -> Self {
        Self { policy }
    }

    /// 应用补丁集合
    ///
    /// 越界时返回 `OutOfBounds`；此时缓冲区可能已写入前面的条目，调用方不应再写回文件。
    pub fn apply(&self, data: &mut Vec<u8>, patches: &PatchSet) -> Result<PatchReport> {
        let mut report = PatchReport::default();
        let mut shift = 0usize;

        for (offset, entry) in patches.iter() {
            let position = offset + shift;
            let span = Self::span_of(data, offset, position, entry)?;

            tracing::debug!("offset {} (写入位置 {}, 区间 {}): {}", offset, position, span, entry);
            let mut new_bytes = entry.replacement.as_bytes().to_vec();

            if new_bytes.len() > span {
                tracing::warn!(
                    "长度超过原文（原:{} / 新:{}），offset {}，策略 {}",
                    span,
                    new_bytes.len(),
                    position,
                    self.policy
                );

                match self.policy {
                    OverflowPolicy::Truncate => {
                        new_bytes.truncate(span);
                        report.truncated += 1;
                    }
                    OverflowPolicy::Shift => {
                        let diff = new_bytes.len() - span;
                        let end = position + span;
                        data.splice(end..end, std::iter::repeat(0u8).take(diff));
                        shift += diff;
                        report.shifted += 1;
                        report.growth += diff;
                    }
                }
            } else if new_bytes.len() < span {
                new_bytes.resize(span, 0);
                report.padded += 1;
            }

            data[position..position + new_bytes.len()].copy_from_slice(&new_bytes);
            report.applied += 1;
        }

        report.final_len = data.len();
        Ok(report)
    }

    /// 计算原文占用的字节区间长度
    fn span_of(data: &[u8], offset: usize, position: usize, entry: &PatchEntry) -> Result<usize> {
        let out_of_bounds = |span| LocalizeError::OutOfBounds {
            offset,
            position,
            span,
            len: data.len(),
        };

        let span = match &entry.original {
            Some(original) => original.len(),
            None => {
                if position >= data.len() {
                    return Err(out_of_bounds(1));
                }
                // 原文未知：从下一个字节起找零终止符，至少 1 字节
                match memchr::memchr(0, &data[position + 1..]) {
                    Some(index) => index + 1,
                    None => data.len() - position,
                }
            }
        };

        if position + span > data.len() {
            return Err(out_of_bounds(span));
        }
        Ok(span)
    }
}
