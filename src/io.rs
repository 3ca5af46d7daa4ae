/// IO 抽象层模块
///
/// 二进制文件的读写接口，补丁流程通过它整体读入和整体写回缓冲区，
/// 便于在测试中替换为内存实现。
///
/// - **traits**: 定义 BinaryReader / BinaryWriter trait 接口
/// - **binary_io**: 基于文件系统的默认实现
pub mod traits;
pub mod binary_io;

// === 导出 trait 定义 ===
pub use traits::{BinaryReader, BinaryWriter, RawBinary};

// === 导出默认实现 ===
pub use binary_io::{DefaultBinaryReader, DefaultBinaryWriter};
