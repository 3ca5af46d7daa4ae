/// 可打印字符串扫描模块
///
/// 在没有符号表的二进制中定位文本：每个"单元"是一个可打印 ASCII 字节
/// (0x20-0x7E)，或一个 0xC2-0xF4 前导字节加上一个或多个 0x80-0xBF 后续字节。
/// 连续两个及以上单元构成一个字符串。
///
/// 这是一个宁多勿漏的启发式：短字符串会被漏掉，偶然像文本的字节序列也会被匹配，
/// 由下游的人工编辑和翻译词典过滤。
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::string_types::StringRecord;

static PRINTABLE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)(?:[\x20-\x7E]|[\xC2-\xF4][\x80-\xBF]+){2,}")
        .expect("printable run pattern is valid")
});

/// 扫描结果
///
/// `skipped_spans` 记录解码时丢弃的非法字节片段数量，
/// `empty_runs` 记录解码后为空、因而未输出的匹配数量。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    pub records: BTreeMap<usize, String>,
    pub skipped_spans: usize,
    pub empty_runs: usize,
}

impl ScanResult {
    /// 字符串数量
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 按偏移获取原文
    pub fn get(&self, offset: usize) -> Option<&str> {
        self.records.get(&offset).map(String::as_str)
    }

    /// 按偏移升序迭代记录
    pub fn iter(&self) -> impl Iterator<Item = StringRecord> + '_ {
        self.records
            .iter()
            .map(|(&offset, text)| StringRecord::new(offset, text.clone()))
    }
}

/// 扫描缓冲区中的所有可打印字符串
pub fn scan(data: &[u8]) -> ScanResult {
    let mut result = ScanResult::default();

    for m in PRINTABLE_RUN.find_iter(data) {
        let (text, skipped) = decode_lossy(m.as_bytes());
        result.skipped_spans += skipped;

        if text.is_empty() {
            result.empty_runs += 1;
            continue;
        }
        result.records.insert(m.start(), text);
    }

    tracing::debug!(
        "扫描 {} 字节：{} 个字符串，丢弃 {} 个非法片段，{} 个空匹配",
        data.len(),
        result.records.len(),
        result.skipped_spans,
        result.empty_runs
    );

    result
}

/// 尽力解码：保留合法的 UTF-8 片段，丢弃非法字节
///
/// 返回解码文本和被丢弃的非法片段数量。
fn decode_lossy(bytes: &[u8]) -> (String, usize) {
    let mut text = String::with_capacity(bytes.len());
    let mut skipped = 0;
    let mut in_invalid = false;

    // 相邻的非法字节合并为一个片段计数
    for chunk in bytes.utf8_chunks() {
        if !chunk.valid().is_empty() {
            text.push_str(chunk.valid());
            in_invalid = false;
        }
        if !chunk.invalid().is_empty() {
            if !in_invalid {
                skipped += 1;
            }
            in_invalid = true;
        }
    }

    (text, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_example_buffer() {
        let data = b"AB\x00CDEF\x00\x00\x00\x00\x00\x00\x00\x00\x00";
        let result = scan(data);

        assert_eq!(result.len(), 2);
        assert_eq!(result.get(0), Some("AB"));
        assert_eq!(result.get(3), Some("CDEF"));
        assert_eq!(result.skipped_spans, 0);
    }

    #[test]
    fn test_single_byte_runs_are_ignored() {
        let data = b"A\x00B\x00\x01C\x00";
        assert!(scan(data).is_empty());
    }

    #[test]
    fn test_utf8_runs() {
        let mut data = vec![0u8, 0];
        data.extend_from_slice("設定".as_bytes());
        data.push(0);
        data.extend_from_slice("Mix 中文".as_bytes());
        data.push(0);

        let result = scan(&data);
        assert_eq!(result.get(2), Some("設定"));
        assert_eq!(result.get(2 + 6 + 1), Some("Mix 中文"));
    }

    #[test]
    fn test_single_multibyte_char_is_one_unit() {
        // 一个 CJK 字符只算一个单元，不足两个单元
        let mut data = vec![0u8];
        data.extend_from_slice("中".as_bytes());
        data.push(0);
        assert!(scan(&data).is_empty());
    }

    #[test]
    fn test_invalid_sequences_are_dropped_and_counted() {
        // 0xC2 后接三个后续字节：第一对合法，后两个字节非法
        let data = b"\x00AB\xC2\xA9\x80\x80CD\x00";
        let result = scan(data);

        assert_eq!(result.len(), 1);
        assert_eq!(result.get(1), Some("AB\u{a9}CD"));
        assert_eq!(result.skipped_spans, 1);
    }

    #[test]
    fn test_runs_that_decode_to_nothing_are_not_emitted() {
        // 0xF4 0x90 是越界的四字节前导，整段都无法解码
        let data = b"\x00\xF4\x90\xF4\x90\x00";
        let result = scan(data);

        assert!(result.is_empty());
        assert_eq!(result.empty_runs, 1);
        assert_eq!(result.skipped_spans, 1);
    }

    #[test]
    fn test_iter_is_ordered_by_offset() {
        let data = b"zz\x00yy\x00xx";
        let offsets: Vec<usize> = scan(data).iter().map(|r| r.offset).collect();
        assert_eq!(offsets, vec![0, 3, 6]);
    }
}
