/// 编辑器层模块
///
/// 遵循"修改-保存分离"原则：变更检测和补丁都只作用于内存，
/// 写回文件由调用方通过 [`crate::io::BinaryWriter`] 显式完成。
///
/// # 架构设计
///
/// - **delta**: 变更检测，产出补丁集合和词典候选
/// - **patcher**: 把补丁集合写入二进制缓冲区
///
/// # 使用示例
///
/// ```rust,ignore
/// use nro_localizer::editor::{ChangeDetector, Patcher, OverflowPolicy};
///
/// let changes = ChangeDetector::new(&policy).detect(&scan, &edited);
/// let report = Patcher::new(OverflowPolicy::Truncate).apply(&mut data, &changes.patches)?;
/// println!("写入了 {} 处", report.applied);
/// ```
pub mod delta;
pub mod patcher;

// === 导出公共接口 ===
pub use delta::{ChangeDetector, ChangeSet, PatchEntry, PatchSet};
pub use patcher::{OverflowPolicy, PatchReport, Patcher};
