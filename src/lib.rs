pub mod config;
pub mod dictionary;
pub mod editor;
pub mod io;
pub mod localizer;
pub mod offset_map;
pub mod policy;
pub mod scanner;
pub mod snapshot;
pub mod string_types;
pub mod utils;

// 重新导出主要结构
pub use config::LocalizerConfig;
pub use dictionary::TranslationMemory;
pub use editor::{ChangeDetector, ChangeSet, OverflowPolicy, PatchEntry, PatchReport, PatchSet, Patcher};
pub use localizer::{ApplyOutcome, ExtractOutcome, Localizer, RunOutcome};
pub use offset_map::OffsetMap;
pub use policy::{PolicyConfig, TextPolicy};
pub use scanner::{scan, ScanResult};
pub use snapshot::{SourceSnapshot, SourceState};
pub use string_types::StringRecord;
pub use utils::{LocalizeError, Result};

// 常量定义
pub const SUPPORTED_EXTENSIONS: &[&str] = &["nro", "ovl"];
