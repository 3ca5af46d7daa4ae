/// 本地化流程模块
///
/// 对单个二进制文件执行一次性批处理：
/// 1. **extract**：扫描字符串，用翻译词典预填充，写出偏移映射文件
/// 2. **apply**：读取（可能被人工编辑过的）映射文件，检测变更，打补丁，整体写回，
///    最后把有效变更合并进翻译词典
///
/// 两个阶段都基于原始快照（见 [`crate::snapshot`]）扫描，而不是磁盘上可能已经
/// 写回过的文件。映射文件、快照和词典路径由二进制的文件名（不含扩展名）和配置中的
/// 两个目录推导。词典只在二进制成功写回之后才更新。

use std::path::{Path, PathBuf};

use crate::config::LocalizerConfig;
use crate::dictionary::TranslationMemory;
use crate::editor::{ChangeDetector, PatchReport, Patcher};
use crate::io::{BinaryReader, BinaryWriter, DefaultBinaryReader, DefaultBinaryWriter, RawBinary};
use crate::offset_map::OffsetMap;
use crate::policy::TextPolicy;
use crate::scanner;
use crate::snapshot::{SourceSnapshot, SourceState};
use crate::utils::{self, LocalizeError, Result};

/// extract 阶段结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOutcome {
    pub offset_map_path: PathBuf,
    /// 扫描到的字符串数
    pub scanned: usize,
    /// 写入映射文件的行数
    pub written: usize,
    /// 被噪声过滤排除的条目数
    pub excluded: usize,
    /// 由词典预填充的条目数
    pub from_memory: usize,
    /// 解码时丢弃的非法字节片段数
    pub skipped_spans: usize,
}

/// apply 阶段结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub patched: usize,
    pub unchanged: usize,
    pub declined: usize,
    pub report: PatchReport,
    /// 本次写入词典的条目数
    pub promoted: usize,
    /// 备份文件路径（启用备份且有写回时）
    pub backup_path: Option<PathBuf>,
    /// 是否写回了二进制（结果与磁盘内容相同时跳过）
    pub written: bool,
}

/// 一次完整运行的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub extract: ExtractOutcome,
    pub apply: ApplyOutcome,
}

/// 本地化器
pub struct Localizer<R = DefaultBinaryReader, W = DefaultBinaryWriter> {
    config: LocalizerConfig,
    policy: TextPolicy,
    reader: R,
    writer: W,
}

impl Localizer {
    /// 使用文件系统 IO 创建本地化器
    pub fn new(config: LocalizerConfig) -> Result<Self> {
        Self::with_io(config, DefaultBinaryReader, DefaultBinaryWriter)
    }
}

impl<R: BinaryReader, W: BinaryWriter> Localizer<R, W> {
    /// 使用自定义 IO 创建本地化器，策略正则在此编译
    pub fn with_io(config: LocalizerConfig, reader: R, writer: W) -> Result<Self> {
        let policy = TextPolicy::from_config(&config.policy)?;
        Ok(Self {
            config,
            policy,
            reader,
            writer,
        })
    }

    /// 映射文件和词典路径
    pub fn paths_for(&self, binary: &Path) -> Result<(PathBuf, PathBuf)> {
        let base = utils::base_name(binary)?;
        Ok((
            self.config.offset_map_path(&base),
            self.config.dictionary_path(&base),
        ))
    }

    /// 扫描并写出偏移映射文件
    pub fn extract(&self, binary: &Path) -> Result<ExtractOutcome> {
        utils::validate_input(binary)?;
        let base = utils::base_name(binary)?;
        let (map_path, dict_path) = self.paths_for(binary)?;

        let current = self.reader.read(binary)?;
        let (source, _) = self.resolve_source(binary, &base, current, true)?;
        let scan = scanner::scan(&source.bytes);

        let memory = TranslationMemory::load(&dict_path)?;
        let mut map = OffsetMap::from_scan(&scan);
        let from_memory = map.apply_memory(&memory);

        let stats = map.save(&map_path, &self.policy)?;

        tracing::info!(
            "已提取 {:?}：{} 个字符串，写入 {} 行，词典替换 {} 条 -> {:?}",
            binary,
            scan.len(),
            stats.written,
            from_memory,
            map_path
        );

        Ok(ExtractOutcome {
            offset_map_path: map_path,
            scanned: scan.len(),
            written: stats.written,
            excluded: stats.excluded,
            from_memory,
            skipped_spans: scan.skipped_spans,
        })
    }

    /// 读取映射文件，基于原始快照打补丁并写回，再更新词典
    pub fn apply(&self, binary: &Path) -> Result<ApplyOutcome> {
        utils::validate_input(binary)?;
        let base = utils::base_name(binary)?;
        let (map_path, dict_path) = self.paths_for(binary)?;

        let edited = OffsetMap::load(&map_path)?;

        let current = self.reader.read(binary)?;
        let (mut output, mut snapshot) = self.resolve_source(binary, &base, current.clone(), false)?;
        let scan = scanner::scan(&output.bytes);
        let changes = ChangeDetector::new(&self.policy).detect(&scan, &edited);

        tracing::debug!("{:?}: {}", binary, changes.summary());

        let mut outcome = ApplyOutcome {
            patched: changes.patches.len(),
            unchanged: changes.unchanged,
            declined: changes.declined,
            report: PatchReport {
                final_len: output.len(),
                ..PatchReport::default()
            },
            promoted: 0,
            backup_path: None,
            written: false,
        };

        if changes.has_changes() {
            let patcher = Patcher::new(self.config.overflow);
            outcome.report = patcher.apply(&mut output.bytes, &changes.patches)?;
        }

        if output == current {
            tracing::info!("{:?} 内容没有变化，跳过写回", binary);
        } else {
            if self.config.backup {
                let backup_path = utils::create_backup(binary)?;
                tracing::info!("已创建备份文件: {:?}", backup_path);
                outcome.backup_path = Some(backup_path);
            }

            self.writer.write(&output, binary)?;
            outcome.written = true;

            snapshot.record_output(&output.bytes);
            snapshot.save(&self.config.snapshot_path(&base))?;

            tracing::info!(
                "已写回 {:?}：{} 处修改（补零 {}，截断 {}，推移 {}）",
                binary,
                outcome.report.applied,
                outcome.report.padded,
                outcome.report.truncated,
                outcome.report.shifted
            );
        }

        if self.config.promote && !changes.promotions.is_empty() {
            outcome.promoted = changes.promotions.len();
            let merged = TranslationMemory::save(&dict_path, changes.promotions)?;
            tracing::info!(
                "已更新词典 {:?}（新增/修改 {} 笔，共 {} 笔）",
                dict_path,
                outcome.promoted,
                merged.len()
            );
        }

        Ok(outcome)
    }

    /// 确定扫描和打补丁所基于的原始数据
    ///
    /// - 磁盘文件就是原始数据：直接使用
    /// - 磁盘文件是上次写回的结果：读取原始副本
    /// - 没有快照，或（`refresh` 时）文件已被外部替换：以当前文件建立新快照
    /// - 不允许 `refresh` 时文件已被替换：返回 `SourceChanged`
    fn resolve_source(
        &self,
        binary: &Path,
        base: &str,
        current: RawBinary,
        refresh: bool,
    ) -> Result<(RawBinary, SourceSnapshot)> {
        let snapshot_path = self.config.snapshot_path(base);
        let copy_path = self.config.source_copy_path(base);

        if let Some(snapshot) = SourceSnapshot::load(&snapshot_path)? {
            match snapshot.classify(&current.bytes) {
                SourceState::Original => return Ok((current, snapshot)),
                SourceState::Patched => {
                    let source = self.reader.read(&copy_path).map_err(|e| {
                        if e.is_not_found() {
                            LocalizeError::CorruptSnapshot(copy_path.clone())
                        } else {
                            e
                        }
                    })?;
                    if !snapshot.matches_source(&source.bytes) {
                        return Err(LocalizeError::CorruptSnapshot(copy_path));
                    }
                    tracing::debug!("{:?} 已被写回过，使用原始副本 {:?}", binary, copy_path);
                    return Ok((source, snapshot));
                }
                SourceState::Changed if !refresh => {
                    return Err(LocalizeError::SourceChanged(binary.to_path_buf()));
                }
                SourceState::Changed => {
                    tracing::info!("{:?} 与上次提取时不同，重新建立原始快照", binary);
                }
            }
        }

        let snapshot = SourceSnapshot::of(&current.bytes);
        self.writer.write(&current, &copy_path)?;
        snapshot.save(&snapshot_path)?;
        Ok((current, snapshot))
    }

    /// extract 之后立即 apply
    pub fn run(&self, binary: &Path) -> Result<RunOutcome> {
        let extract = self.extract(binary)?;
        let apply = self.apply(binary)?;
        Ok(RunOutcome { extract, apply })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::RawBinary;
    use crate::utils::LocalizeError;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// 内存中的二进制 IO，用于验证写回次数和内容
    #[derive(Default)]
    struct MemoryIo {
        files: RefCell<HashMap<PathBuf, Vec<u8>>>,
        writes: RefCell<Vec<PathBuf>>,
    }

    impl MemoryIo {
        fn writes_to(&self, path: &Path) -> usize {
            self.writes.borrow().iter().filter(|p| p.as_path() == path).count()
        }
    }

    impl BinaryReader for &MemoryIo {
        fn read(&self, path: &Path) -> Result<RawBinary> {
            self.files
                .borrow()
                .get(path)
                .cloned()
                .map(RawBinary::new)
                .ok_or_else(|| LocalizeError::FileNotFound(path.to_path_buf()))
        }
    }

    impl BinaryWriter for &MemoryIo {
        fn write(&self, data: &RawBinary, path: &Path) -> Result<()> {
            self.writes.borrow_mut().push(path.to_path_buf());
            self.files
                .borrow_mut()
                .insert(path.to_path_buf(), data.bytes.clone());
            Ok(())
        }
    }

    fn config_in(dir: &Path) -> LocalizerConfig {
        LocalizerConfig {
            translation_dir: dir.join("translation"),
            dict_dir: dir.join("dict"),
            ..LocalizerConfig::default()
        }
    }

    /// validate_input 需要真实文件存在，内容放在 MemoryIo 中
    fn setup(dir: &Path, bytes: &[u8]) -> (PathBuf, MemoryIo) {
        let binary = dir.join("menu.nro");
        std::fs::write(&binary, bytes).unwrap();
        let io = MemoryIo::default();
        io.files.borrow_mut().insert(binary.clone(), bytes.to_vec());
        (binary, io)
    }

    #[test]
    fn test_unedited_run_does_not_write() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let localizer = Localizer::with_io(config_in(temp_dir.path()), &io, &io).unwrap();

        let outcome = localizer.run(&binary).unwrap();

        assert_eq!(outcome.extract.scanned, 2);
        assert_eq!(outcome.apply.patched, 0);
        assert_eq!(outcome.apply.unchanged, 2);
        assert!(!outcome.apply.written);
        assert_eq!(io.writes_to(&binary), 0);
    }

    #[test]
    fn test_apply_writes_through_writer() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let localizer = Localizer::with_io(config_in(temp_dir.path()), &io, &io).unwrap();

        let extract = localizer.extract(&binary).unwrap();
        std::fs::write(&extract.offset_map_path, "0:Go\n6:Exit\n").unwrap();

        let outcome = localizer.apply(&binary).unwrap();

        assert_eq!(outcome.patched, 1);
        assert_eq!(outcome.promoted, 1);
        assert_eq!(io.writes_to(&binary), 1);
        assert_eq!(
            io.files.borrow().get(&binary).unwrap().as_slice(),
            b"Go\x00\x00\x00\x00Exit\x00"
        );
    }

    #[test]
    fn test_apply_without_offset_map_fails() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00");
        let localizer = Localizer::with_io(config_in(temp_dir.path()), &io, &io).unwrap();

        let result = localizer.apply(&binary);
        assert!(matches!(result, Err(LocalizeError::MissingOffsetMap(_))));
        assert!(io.writes.borrow().is_empty());
    }

    #[test]
    fn test_extract_keeps_source_copy() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let config = config_in(temp_dir.path());
        let localizer = Localizer::with_io(config.clone(), &io, &io).unwrap();

        localizer.extract(&binary).unwrap();

        let copy_path = config.source_copy_path("menu");
        assert_eq!(io.writes_to(&copy_path), 1);
        assert_eq!(
            io.files.borrow().get(&copy_path).unwrap().as_slice(),
            b"Start\x00Exit\x00"
        );
        assert!(config.snapshot_path("menu").exists());
    }

    #[test]
    fn test_reapply_patches_from_source_copy() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let localizer = Localizer::with_io(config_in(temp_dir.path()), &io, &io).unwrap();

        let extract = localizer.extract(&binary).unwrap();
        std::fs::write(&extract.offset_map_path, "0:Go\n").unwrap();
        localizer.apply(&binary).unwrap();

        // 第二次 apply 的区间仍是 "Start" 的 5 字节
        std::fs::write(&extract.offset_map_path, "0:Play\n").unwrap();
        let outcome = localizer.apply(&binary).unwrap();

        assert_eq!(outcome.report.truncated, 0);
        assert_eq!(io.writes_to(&binary), 2);
        assert_eq!(
            io.files.borrow().get(&binary).unwrap().as_slice(),
            b"Play\x00\x00Exit\x00"
        );
    }

    #[test]
    fn test_apply_rejects_externally_changed_binary() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let localizer = Localizer::with_io(config_in(temp_dir.path()), &io, &io).unwrap();

        let extract = localizer.extract(&binary).unwrap();
        std::fs::write(&extract.offset_map_path, "0:Go\n").unwrap();
        io.files
            .borrow_mut()
            .insert(binary.clone(), b"Begin\x00Quit\x00".to_vec());

        let result = localizer.apply(&binary);
        assert!(matches!(result, Err(LocalizeError::SourceChanged(_))));
        assert_eq!(io.writes_to(&binary), 0);

        // 重新 extract 后以新文件为原始数据
        localizer.extract(&binary).unwrap();
        std::fs::write(&extract.offset_map_path, "0:Go\n").unwrap();
        localizer.apply(&binary).unwrap();
        assert_eq!(
            io.files.borrow().get(&binary).unwrap().as_slice(),
            b"Go\x00\x00\x00\x00Quit\x00"
        );
    }

    #[test]
    fn test_missing_source_copy_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let (binary, io) = setup(temp_dir.path(), b"Start\x00Exit\x00");
        let config = config_in(temp_dir.path());
        let localizer = Localizer::with_io(config.clone(), &io, &io).unwrap();

        let extract = localizer.extract(&binary).unwrap();
        std::fs::write(&extract.offset_map_path, "0:Go\n").unwrap();
        localizer.apply(&binary).unwrap();

        io.files.borrow_mut().remove(&config.source_copy_path("menu"));
        let result = localizer.apply(&binary);
        assert!(matches!(result, Err(LocalizeError::CorruptSnapshot(_))));
    }

    #[test]
    fn test_invalid_policy_is_rejected_at_construction() {
        let mut config = LocalizerConfig::default();
        config.policy.meaningful_pattern = "(".to_string();
        assert!(matches!(
            Localizer::new(config),
            Err(LocalizeError::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_paths_follow_base_name() {
        let temp_dir = TempDir::new().unwrap();
        let localizer = Localizer::new(config_in(temp_dir.path())).unwrap();

        let (map_path, dict_path) = localizer.paths_for(Path::new("/games/sys/ovlmenu.ovl")).unwrap();
        assert_eq!(map_path, temp_dir.path().join("translation").join("ovlmenu.txt"));
        assert_eq!(dict_path, temp_dir.path().join("dict").join("ovlmenu.json"));
    }
}
