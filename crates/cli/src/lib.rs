use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use stylemap_core::ProcessorConfig;
use stylemap_css::StylesheetProcessor;
use stylemap_transform::{transform_module, TransformOptions, TransformResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Inline CSS module class names into JS/TS sources
#[derive(Debug, Parser)]
#[command(name = "stylemap", version, about)]
pub struct Cli {
    /// Processor config (JSON). Defaults to a single css-modules stage
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write transformed files into this directory instead of stdout
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// Write a `.map` file next to each output (requires --out-dir)
    #[arg(long, requires = "out_dir")]
    pub source_map: bool,

    /// Log debug output; RUST_LOG takes precedence when set
    #[arg(short, long)]
    pub verbose: bool,

    /// Source files to transform
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// 初始化日志输出到 stderr，stdout 留给转换结果
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn load_config(path: Option<&Path>) -> Result<ProcessorConfig> {
    let Some(path) = path else {
        return Ok(ProcessorConfig::default());
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    ProcessorConfig::from_json(&raw)
        .with_context(|| format!("invalid config {}", path.display()))
}

/// 依次转换所有输入文件，返回写出的文件路径
///
/// 所有文件共用一个处理器，即同一次构建。
pub fn run(cli: &Cli) -> Result<Vec<PathBuf>> {
    let config = load_config(cli.config.as_deref())?;
    let processor = StylesheetProcessor::new(&config);
    let options = TransformOptions {
        source_map: cli.source_map,
    };

    let mut written = Vec::new();
    for file in &cli.files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("failed to read {}", file.display()))?;
        let result = transform_module(&source, &file.to_string_lossy(), &processor, options.clone())
            .with_context(|| format!("failed to transform {}", file.display()))?;

        info!(
            file = %file.display(),
            stylesheets = result.stylesheets.len(),
            "transformed"
        );

        match &cli.out_dir {
            Some(dir) => written.push(write_output(dir, file, &result)?),
            None => print!("{}", result.code),
        }
    }

    Ok(written)
}

fn write_output(dir: &Path, file: &Path, result: &TransformResult) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let name = file
        .file_name()
        .with_context(|| format!("{} has no file name", file.display()))?;
    let out = dir.join(name);

    let mut code = result.code.clone();
    if let Some(map) = &result.source_map {
        let map_name = format!("{}.map", name.to_string_lossy());
        fs::write(dir.join(&map_name), map)
            .with_context(|| format!("failed to write {}", map_name))?;
        code.push_str(&format!("\n//# sourceMappingURL={}\n", map_name));
    }

    fs::write(&out, code).with_context(|| format!("failed to write {}", out.display()))?;
    Ok(out)
}
