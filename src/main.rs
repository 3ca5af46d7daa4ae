use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use nro_localizer::{
    ApplyOutcome, ExtractOutcome, Localizer, LocalizerConfig, OverflowPolicy,
};

#[derive(Parser)]
#[command(name = "nro_localizer")]
#[command(about = "提取并回写 NRO/OVL 二进制中的可打印字符串")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON 配置文件
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// 偏移映射文件目录
    #[arg(long, global = true)]
    translation_dir: Option<PathBuf>,

    /// 翻译词典目录
    #[arg(long, global = true)]
    dict_dir: Option<PathBuf>,

    /// 新文本超长时的处理方式 (truncate / shift)
    #[arg(long, global = true)]
    overflow: Option<OverflowPolicy>,

    /// 覆盖前创建时间戳备份
    #[arg(long, global = true)]
    backup: bool,

    /// 不把修改写入翻译词典
    #[arg(long, global = true)]
    no_promote: bool,

    /// 静默模式(仅输出警告和错误)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// 提取字符串并立即应用映射文件（一次性流程）
    Run { input: PathBuf },
    /// 只提取字符串，写出映射文件供人工编辑
    Extract { input: PathBuf },
    /// 读取映射文件，打补丁并更新词典
    Apply { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_directive = if cli.quiet { "nro_localizer=warn" } else { "nro_localizer=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default_directive.parse()?))
        .init();

    let config = build_config(&cli)?;
    let localizer = Localizer::new(config).context("配置无效")?;

    match &cli.command {
        Command::Run { input } => {
            let outcome = localizer
                .run(input)
                .with_context(|| format!("处理失败: {:?}", input))?;
            if !cli.quiet {
                print_extract_summary(input, &outcome.extract);
                print_apply_summary(input, &outcome.apply);
            }
        }
        Command::Extract { input } => {
            let outcome = localizer
                .extract(input)
                .with_context(|| format!("提取失败: {:?}", input))?;
            if !cli.quiet {
                print_extract_summary(input, &outcome);
            }
        }
        Command::Apply { input } => {
            let outcome = localizer
                .apply(input)
                .with_context(|| format!("应用翻译失败: {:?}", input))?;
            if !cli.quiet {
                print_apply_summary(input, &outcome);
            }
        }
    }

    Ok(())
}

/// 合并配置文件与命令行参数（命令行优先）
fn build_config(cli: &Cli) -> Result<LocalizerConfig> {
    let mut config = match &cli.config {
        Some(path) => LocalizerConfig::load(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?,
        None => LocalizerConfig::default(),
    };

    if let Some(dir) = &cli.translation_dir {
        config.translation_dir = dir.clone();
    }
    if let Some(dir) = &cli.dict_dir {
        config.dict_dir = dir.clone();
    }
    if let Some(overflow) = cli.overflow {
        config.overflow = overflow;
    }
    if cli.backup {
        config.backup = true;
    }
    if cli.no_promote {
        config.promote = false;
    }

    Ok(config)
}

/// 打印提取摘要信息
fn print_extract_summary(input: &Path, outcome: &ExtractOutcome) {
    println!("扫描 {:?}: {} 个字符串", input, outcome.scanned);
    println!(
        "映射文件: {:?}（写入 {} 行，过滤 {} 条，词典替换 {} 条）",
        outcome.offset_map_path, outcome.written, outcome.excluded, outcome.from_memory
    );
    if outcome.skipped_spans > 0 {
        println!("解码时丢弃了 {} 个非法字节片段", outcome.skipped_spans);
    }
}

/// 打印应用摘要信息
fn print_apply_summary(input: &Path, outcome: &ApplyOutcome) {
    if !outcome.written {
        println!("{:?} 没有修改", input);
        return;
    }
    if outcome.patched == 0 {
        println!("已将 {:?} 恢复为原始内容", input);
        return;
    }

    println!(
        "已写回 {:?}: {} 处修改，{} 处未改动，{} 处不翻译",
        input, outcome.patched, outcome.unchanged, outcome.declined
    );
    if outcome.report.truncated > 0 {
        println!("⚠ {} 处译文超长被截断", outcome.report.truncated);
    }
    if outcome.report.shifted > 0 {
        println!(
            "⚠ {} 处译文超长已推移写入，文件增长 {} 字节",
            outcome.report.shifted, outcome.report.growth
        );
    }
    if let Some(backup) = &outcome.backup_path {
        println!("备份文件: {:?}", backup);
    }
    if outcome.promoted > 0 {
        println!("词典新增/修改 {} 笔", outcome.promoted);
    }
}
