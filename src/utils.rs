use sha2::{Digest, Sha256};
use thiserror::Error;
use std::path::{Path, PathBuf};

use crate::SUPPORTED_EXTENSIONS;

/// 自定义错误类型
#[derive(Error, Debug)]
pub enum LocalizeError {
    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported file extension: {0} (expected one of nro, ovl)")]
    UnsupportedExtension(String),

    #[error("Offset map not found: {0}")]
    MissingOffsetMap(PathBuf),

    #[error("Binary changed since it was extracted: {0} (run extract again)")]
    SourceChanged(PathBuf),

    #[error("Source snapshot is missing or damaged: {0}")]
    CorruptSnapshot(PathBuf),

    #[error("Patch at offset {offset} (position {position}, span {span}) exceeds buffer of {len} bytes")]
    OutOfBounds {
        offset: usize,
        position: usize,
        span: usize,
        len: usize,
    },

    #[error("Invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LocalizeError>;

impl LocalizeError {
    /// 是否为"文件不存在"类错误
    pub fn is_not_found(&self) -> bool {
        match self {
            LocalizeError::FileNotFound(_) | LocalizeError::MissingOffsetMap(_) => true,
            LocalizeError::IoError(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// 检查扩展名是否在允许列表中（不做任何 IO）
pub fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    if SUPPORTED_EXTENSIONS.iter().any(|&ext| Some(ext) == extension.as_deref()) {
        Ok(())
    } else {
        Err(LocalizeError::UnsupportedExtension(
            extension.unwrap_or_default(),
        ))
    }
}

/// 验证输入文件：先查扩展名，再查文件是否存在
pub fn validate_input(path: &Path) -> Result<()> {
    check_extension(path)?;

    if !path.is_file() {
        return Err(LocalizeError::FileNotFound(path.to_path_buf()));
    }

    Ok(())
}

/// 获取不含扩展名的文件名，用于推导映射文件和词典文件路径
pub fn base_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| LocalizeError::FileNotFound(path.to_path_buf()))
}

/// 计算 SHA-256 摘要（小写十六进制）
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// 创建文件备份
pub fn create_backup(file_path: &Path) -> Result<PathBuf> {
    if !file_path.exists() {
        return Err(LocalizeError::FileNotFound(file_path.to_path_buf()));
    }

    let timestamp = chrono::Local::now().format("%Y-%m-%d-%H-%M-%S");
    let extension = file_path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");
    let backup_path = file_path.with_extension(format!("{}.{}.bak", extension, timestamp));

    std::fs::copy(file_path, &backup_path)?;

    Ok(backup_path)
}
