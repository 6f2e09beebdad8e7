//! 命令行参数
//!
//! 配置文件提供基础配置，命令行选项优先级更高。

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, bail};
use cachesim_core::{CacheConfig, MappingKind};
use clap::{Arg, ArgAction, ArgMatches, Command};

/// 报告输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("unsupported report format: {other} (expected text or json)"),
        }
    }
}

/// 解析后的运行选项
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub config: CacheConfig,
    /// 轨迹文件，`None` 表示从标准输入读取
    pub trace: Option<PathBuf>,
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn command() -> Command {
    Command::new("cachesim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simulate a direct-mapped, set-associative or fully-associative cache over an address trace")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Cache configuration file (TOML, or JSON with a .json extension)"),
        )
        .arg(
            Arg::new("memory-size")
                .long("memory-size")
                .value_name("SIZE")
                .help("Main memory size in bytes (e.g. 65536, 64K, 1M)"),
        )
        .arg(
            Arg::new("cache-size")
                .long("cache-size")
                .value_name("SIZE")
                .help("Cache size in bytes"),
        )
        .arg(
            Arg::new("block-size")
                .long("block-size")
                .value_name("SIZE")
                .help("Block size in bytes"),
        )
        .arg(
            Arg::new("mapping")
                .short('m')
                .long("mapping")
                .value_name("KIND")
                .help("Mapping technique: direct (1), set (2) or full (3)"),
        )
        .arg(
            Arg::new("associativity")
                .short('a')
                .long("associativity")
                .value_name("WAYS")
                .help("Ways per set for set-associative mapping"),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("SEED")
                .help("Seed for random replacement"),
        )
        .arg(
            Arg::new("trace")
                .short('t')
                .long("trace")
                .value_name("FILE")
                .help("Hexadecimal address trace; reads stdin when absent or '-'"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .default_value("text")
                .help("Report format (text, json)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .help("Omit per-access lines from the text report"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

impl CliOptions {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let mut config = match matches.get_one::<String>("config") {
            Some(path) => load_config(Path::new(path))?,
            None => CacheConfig::default(),
        };

        if let Some(v) = matches.get_one::<String>("memory-size") {
            config.main_memory_size = parse_size(v).context("invalid --memory-size")?;
        }
        if let Some(v) = matches.get_one::<String>("cache-size") {
            config.cache_size = parse_size(v).context("invalid --cache-size")?;
        }
        if let Some(v) = matches.get_one::<String>("block-size") {
            config.block_size = parse_size(v).context("invalid --block-size")?;
        }
        if let Some(v) = matches.get_one::<String>("mapping") {
            config.mapping = v.parse::<MappingKind>()?;
        }
        if let Some(v) = matches.get_one::<String>("associativity") {
            config.associativity = Some(v.parse::<u32>().context("invalid --associativity")?);
        }
        if let Some(v) = matches.get_one::<String>("seed") {
            config.seed = Some(v.parse::<u64>().context("invalid --seed")?);
        }

        let trace = matches
            .get_one::<String>("trace")
            .filter(|p| p.as_str() != "-")
            .map(PathBuf::from);

        let format = matches
            .get_one::<String>("format")
            .map(|f| f.parse::<OutputFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            config,
            trace,
            format,
            quiet: matches.get_flag("quiet"),
            verbose: matches.get_flag("verbose"),
        })
    }
}

/// 从文件加载配置，扩展名为 `.json` 时按 JSON 解析
pub fn load_config(path: &Path) -> anyhow::Result<CacheConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config = if is_json {
        CacheConfig::from_json(&content)
    } else {
        CacheConfig::from_toml(&content)
    };

    config.with_context(|| format!("Failed to load {}", path.display()))
}

/// 解析字节数，支持 K/M/G（KB/MB/GB）后缀与 `0x` 前缀
pub fn parse_size(s: &str) -> anyhow::Result<u64> {
    let s = s.trim().to_uppercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix("GB").or(s.strip_suffix('G')) {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB").or(s.strip_suffix('M')) {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB").or(s.strip_suffix('K')) {
        (n, 1024)
    } else {
        (s.as_str(), 1)
    };

    let value = match num_str.strip_prefix("0X") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => num_str.parse::<u64>(),
    }
    .with_context(|| format!("`{s}` is not a size"))?;

    value
        .checked_mul(multiplier)
        .with_context(|| format!("`{s}` overflows a 64-bit size"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> anyhow::Result<CliOptions> {
        let argv = std::iter::once("cachesim").chain(args.iter().copied());
        let matches = command().try_get_matches_from(argv)?;
        CliOptions::from_matches(&matches)
    }

    #[test]
    fn test_defaults() {
        let opts = options(&[]).unwrap();
        assert_eq!(opts.config, CacheConfig::default());
        assert_eq!(opts.format, OutputFormat::Text);
        assert!(opts.trace.is_none());
        assert!(!opts.quiet && !opts.verbose);
    }

    #[test]
    fn test_overrides() {
        let opts = options(&[
            "--memory-size",
            "1M",
            "--cache-size",
            "4K",
            "--block-size",
            "32",
            "-m",
            "2",
            "-a",
            "4",
            "-s",
            "9",
            "-t",
            "trace.txt",
            "-f",
            "json",
            "-q",
        ])
        .unwrap();
        assert_eq!(opts.config.main_memory_size, 1 << 20);
        assert_eq!(opts.config.cache_size, 4096);
        assert_eq!(opts.config.block_size, 32);
        assert_eq!(opts.config.mapping, MappingKind::SetAssociative);
        assert_eq!(opts.config.associativity, Some(4));
        assert_eq!(opts.config.seed, Some(9));
        assert_eq!(opts.trace, Some(PathBuf::from("trace.txt")));
        assert_eq!(opts.format, OutputFormat::Json);
        assert!(opts.quiet);
    }

    #[test]
    fn test_stdin_trace_marker() {
        assert!(options(&["--trace", "-"]).unwrap().trace.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(options(&["--mapping", "lru"]).is_err());
        assert!(options(&["--format", "xml"]).is_err());
        assert!(options(&["--cache-size", "big"]).is_err());
    }

    #[test]
    fn test_config_file_then_override() {
        let dir = std::env::temp_dir().join(format!("cachesim-args-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("cache.toml");
        fs::write(
            &path,
            "main_memory_size = 65536\ncache_size = 256\nblock_size = 64\nmapping = \"full\"\n",
        )
        .unwrap();

        let opts = options(&["-c", path.to_str().unwrap(), "--seed", "5"]).unwrap();
        assert_eq!(opts.config.mapping, MappingKind::FullyAssociative);
        assert_eq!(opts.config.cache_size, 256);
        assert_eq!(opts.config.seed, Some(5));

        let json = dir.join("cache.json");
        fs::write(
            &json,
            r#"{"main_memory_size": 4096, "cache_size": 512, "block_size": 16}"#,
        )
        .unwrap();
        assert_eq!(load_config(&json).unwrap().cache_size, 512);

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("65536").unwrap(), 65536);
        assert_eq!(parse_size("64k").unwrap(), 64 * 1024);
        assert_eq!(parse_size("2MB").unwrap(), 2 * 1024 * 1024);
        assert_eq!(parse_size("1G").unwrap(), 1 << 30);
        assert_eq!(parse_size("0x400").unwrap(), 1024);
        assert!(parse_size("").is_err());
        assert!(parse_size("12Q").is_err());
    }
}
