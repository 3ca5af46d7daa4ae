/// 二进制文件的文件系统读写
///
/// NRO/OVL 文件一次性整体读入内存，补丁完成后整体覆盖写回。
/// 原始副本也通过这里写到映射文件目录中。
use std::path::Path;

use super::traits::{BinaryReader, BinaryWriter, RawBinary};
use crate::utils::Result;

/// 整体读入目标二进制
#[derive(Debug, Clone, Default)]
pub struct DefaultBinaryReader;

impl BinaryReader for DefaultBinaryReader {
    fn read(&self, path: &Path) -> Result<RawBinary> {
        Ok(RawBinary::new(std::fs::read(path)?))
    }
}

/// 整体覆盖写回，目标目录不存在时先创建
#[derive(Debug, Clone, Default)]
pub struct DefaultBinaryWriter;

impl BinaryWriter for DefaultBinaryWriter {
    fn write(&self, data: &RawBinary, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &data.bytes)?;

        tracing::debug!("已写入 {:?}（{} 字节）", path, data.len());
        Ok(())
    }
}
