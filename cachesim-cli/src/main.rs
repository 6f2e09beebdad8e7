//! cachesim: 高速缓存模拟器命令行
//!
//! 读取缓存配置与十六进制地址轨迹，输出命中 / 未命中 / 替换统计以及
//! 最终的缓存内容。

mod args;
mod report;
mod trace;

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::process;

use anyhow::Context;
use log::{error, info};

use args::{CliOptions, OutputFormat};
use report::SimulationReport;

fn main() {
    let matches = args::command().get_matches();
    let options = CliOptions::from_matches(&matches);

    let default_level = if options.as_ref().is_ok_and(|o| o.verbose) {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("RUST_LOG", default_level))
        .init();

    if let Err(e) = options.and_then(|options| run(&options)) {
        error!("{:#}", e);
        process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    let mut model = options
        .config
        .build_model()
        .context("Invalid cache configuration")?;

    let addresses = match &options.trace {
        Some(path) => {
            info!("Reading trace from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Failed to open trace {}", path.display()))?;
            trace::parse_trace(BufReader::new(file))
        }
        None => {
            info!("Reading trace from stdin");
            trace::parse_trace(io::stdin().lock())
        }
    }
    .context("Failed to parse address trace")?;

    let report = SimulationReport::run(&mut model, &addresses, options.config.seed);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match options.format {
        OutputFormat::Text => write!(out, "{}", report.text(options.quiet))?,
        OutputFormat::Json => writeln!(out, "{}", report.to_json()?)?,
    }
    out.flush()?;

    Ok(())
}
