/// IO 抽象层 - trait 定义

use std::path::Path;

use crate::utils::Result;

/// 二进制文件的原始数据
///
/// 补丁期间由单个操作独占，读入后在内存中修改，再整体写回。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBinary {
    /// 文件的原始字节数据
    pub bytes: Vec<u8>,
}

impl RawBinary {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 二进制文件读取 trait
///
/// 只负责 IO，不负责扫描。
pub trait BinaryReader {
    /// 完整读入文件
    fn read(&self, path: &Path) -> Result<RawBinary>;
}

/// 二进制文件写入 trait
///
/// 只负责 IO，整体覆盖目标文件。
pub trait BinaryWriter {
    fn write(&self, data: &RawBinary, path: &Path) -> Result<()>;
}
