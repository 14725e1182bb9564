use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser};

use text_humanizer::config::{
    find_default_config, init_default_config, load_config, AppConfig, CONFIG_ENV_VAR,
};
use text_humanizer::error::RunError;
use text_humanizer::export::{
    build_report, default_report_filename, write_json_report, write_text_report,
};
use text_humanizer::models::HttpRewriteClient;
use text_humanizer::pipeline::{spawn_run, RunState};
use text_humanizer::progress::ConsoleProgress;
use text_humanizer::settings::{Settings, Strength, NUM_VERSIONS};
use text_humanizer::textutil::count_marker_leaks;
use text_humanizer::tokenizer::{ApproxTokenCounter, HfTokenCounter, TokenCounter};

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8763";

#[derive(Parser, Debug)]
#[command(name = "text-humanizer")]
#[command(about = "Multi-pass paraphrase pipeline that rewrites AI-sounding text", long_about = None)]
struct Args {
    /// Generate a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Input text file
    #[arg(value_name = "TXT")]
    input: Option<PathBuf>,

    /// Output file for the selected version (default: stdout)
    #[arg(short, long, value_name = "TXT")]
    output: Option<PathBuf>,

    /// Config file path (default: search for text-humanizer.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Rewrite backend base URL (overrides config)
    #[arg(long)]
    endpoint: Option<String>,

    /// HuggingFace tokenizer.json used for chunk budgeting (overrides config)
    #[arg(long, value_name = "JSON")]
    tokenizer: Option<PathBuf>,

    /// Humanization strength: standard, high, or maximum
    #[arg(long)]
    strength: Option<String>,

    /// Fixed number of rephrasing passes (overrides the strength default)
    #[arg(long, value_name = "N")]
    passes: Option<usize>,

    /// Keep em/en dashes instead of replacing them with commas
    #[arg(long)]
    keep_dashes: bool,

    /// Do not record intermediate paraphrases
    #[arg(long)]
    no_intermediate: bool,

    /// Which of the 4 assembled versions to write (1-4)
    #[arg(long, value_name = "N", default_value_t = 1)]
    version_index: usize,

    /// Write a full run report (settings + intermediate + final versions);
    /// a .txt extension selects the flat text form, anything else JSON.
    /// Passing a directory writes humanizer_run_<timestamp>.json inside it
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Suppress progress output on stderr
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let progress = ConsoleProgress::new(!args.quiet);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let input = match args.input {
        Some(ref p) => p.clone(),
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  text-humanizer <input.txt>\n\nTIPS:\n  - Any input length works; the text is split into model-sized chunks.\n  - Default config search: text-humanizer.toml (upwards), or set {CONFIG_ENV_VAR}.\n"
            );
            return Ok(());
        }
    };

    if args.version_index == 0 || args.version_index > NUM_VERSIONS {
        anyhow::bail!("--version-index must be 1-{NUM_VERSIONS}");
    }

    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("read input: {}", input.display()))?;

    let workdir = input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."));
    let cfg_file = args
        .config
        .clone()
        .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
        .or_else(|| find_default_config(&workdir));
    let file_cfg = match cfg_file.as_ref() {
        Some(p) if p.exists() => {
            progress.info(format!("Config: {}", p.display()));
            load_config(p)?
        }
        _ => AppConfig::default(),
    };

    let settings = resolve_settings(&file_cfg, &args)?;
    progress.info(format!(
        "Settings: strength={} passes={} remove_dashes={} save_intermediate={}",
        settings.strength.name(),
        settings.effective_passes(),
        settings.remove_dashes,
        settings.save_intermediate
    ));

    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| file_cfg.model.endpoint.clone())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
    let client = HttpRewriteClient::new(&endpoint);
    client
        .check_ready()
        .map_err(|e| RunError::ModelUnavailable(e.to_string()))?;
    progress.info(format!("Backend ready: {endpoint}"));

    let tokenizer_path = args
        .tokenizer
        .clone()
        .or_else(|| cfg_file.as_deref().and_then(|p| file_cfg.tokenizer_path(p)));
    let counter: Box<dyn TokenCounter + Send> = match tokenizer_path {
        Some(p) => {
            progress.info(format!("Tokenizer: {}", p.display()));
            Box::new(HfTokenCounter::from_file(&p)?)
        }
        None => {
            progress.info("Tokenizer: whitespace approximation");
            Box::new(ApproxTokenCounter)
        }
    };

    let handle = spawn_run(text, settings.clone(), Box::new(client), counter)?;
    for ev in handle.events.iter() {
        progress.event(&ev);
    }

    let state = match handle.join() {
        Ok(state) => state,
        Err(failure) => {
            progress.info(format!("Processing failed: {}", failure.error));
            if let Some(path) = args.export.as_deref() {
                let written = export_report(path, &failure.state, &settings)?;
                progress.info(format!(
                    "Partial report written: {} ({} chunk(s) recorded)",
                    written.display(),
                    failure.state.intermediate.len()
                ));
            }
            return Err(failure.error.into());
        }
    };

    let versions = state
        .final_versions
        .as_ref()
        .context("run finished without final versions")?;
    let selected = &versions[args.version_index - 1];

    let leaks = count_marker_leaks(selected);
    if leaks > 0 {
        progress.info(format!(
            "Found {leaks} 'paraphraser' word(s) that need manual fixing"
        ));
    }

    match args.output.as_deref() {
        Some(path) => {
            std::fs::write(path, selected)
                .with_context(|| format!("write output: {}", path.display()))?;
            progress.info(format!(
                "Wrote version {}: {}",
                args.version_index,
                path.display()
            ));
        }
        None => println!("{selected}"),
    }

    if let Some(path) = args.export.as_deref() {
        let written = export_report(path, &state, &settings)?;
        progress.info(format!("Report written: {}", written.display()));
    }

    Ok(())
}

fn resolve_settings(file_cfg: &AppConfig, args: &Args) -> anyhow::Result<Settings> {
    let mut settings = file_cfg.settings()?;
    if let Some(s) = args.strength.as_deref() {
        settings.strength = Strength::parse(s)?;
    }
    if let Some(n) = args.passes {
        if n == 0 {
            anyhow::bail!("--passes must be a positive number");
        }
        settings.use_custom_passes = true;
        settings.custom_passes = n;
    }
    if args.keep_dashes {
        settings.remove_dashes = false;
    }
    if args.no_intermediate {
        settings.save_intermediate = false;
    }
    Ok(settings)
}

fn export_report(path: &Path, state: &RunState, settings: &Settings) -> anyhow::Result<PathBuf> {
    let report = build_report(state, settings);
    let target;
    let as_text;
    if path.is_dir() {
        target = path.join(default_report_filename(&report.timestamp, true));
        as_text = false;
    } else {
        target = path.to_path_buf();
        as_text = target
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("txt"))
            .unwrap_or(false);
    }
    let result = if as_text {
        write_text_report(&target, &report)
    } else {
        write_json_report(&target, &report)
    };
    result.map_err(|e| RunError::Export(e.to_string()))?;
    Ok(target)
}
