// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use lingolens::app_config::{self, Config};
use lingolens::app_controller::Controller;
use lingolens::language_utils::get_language_name;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for lingolens
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// LingoLens - read the text in an image and translate it
#[derive(Parser, Debug)]
#[command(name = "lingolens")]
#[command(version)]
#[command(about = "Image text extraction and translation tool")]
#[command(long_about = "LingoLens detects the script of an image, extracts its text and translates it through a translation bridge.

EXAMPLES:
    lingolens menu.png                          # Auto-detect and translate to the configured target
    lingolens -s jpn -t en sign.jpg             # Read Japanese text and translate to English
    lingolens -t fr --bridge-url http://host:3001 note.png
    lingolens completions bash > lingolens.bash # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically. The bridge credential is
    read from LINGO_API_KEY when not set in the file.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Image file to translate
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Source recognition language (e.g. 'eng', 'jpn', 'chi_sim') or 'auto'
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g. 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Translation bridge credential
    #[arg(long, env = "LINGO_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Translation bridge base URL
    #[arg(long, env = "LINGOLENS_BRIDGE_URL")]
    bridge_url: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::color_for_level(level), now, Self::get_emoji_for_level(level), record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Trace is the ceiling; the effective level is set after config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "lingolens", &mut std::io::stdout());
        return Ok(());
    }

    let image_path = cli.image_path.clone()
        .ok_or_else(|| anyhow!("IMAGE is required when no subcommand is specified"))?;

    if let Some(level) = &cli.log_level {
        let config_level: app_config::LogLevel = level.clone().into();
        log::set_max_level(config_level.to_level_filter());
    }

    let config = load_config(&cli)?;
    log::set_max_level(config.log_level.to_level_filter());

    run_translate(config, &image_path).await
}

/// Load the config file and apply command line overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(source) = &cli.source_language {
        config.source_language = source.clone();
    }
    if let Some(target) = &cli.target_language {
        config.target_language = target.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.bridge.api_key = api_key.clone();
    }
    if let Some(bridge_url) = &cli.bridge_url {
        config.bridge.endpoint = bridge_url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone().into();
    }

    // Fail before any run starts
    config.validate()?;
    Ok(config)
}

async fn run_translate(config: Config, image_path: &Path) -> Result<()> {
    if !image_path.is_file() {
        return Err(anyhow!("Image file does not exist: {}", image_path.display()));
    }

    let target_name = get_language_name(&config.target_language)
        .unwrap_or_else(|_| config.target_language.clone());
    info!("Translating {} into {}", image_path.display(), target_name);

    let mut controller = Controller::with_config(config)?;
    let context = controller.run(image_path).await?;

    // Extracted text survives a failed translation
    if let Some(text) = &context.extracted_text {
        println!("── Original Text ──");
        println!("{}", text.trim_end());
        println!();
    }

    match context.into_result() {
        Ok(translation) => {
            println!("── Translated Result ──");
            println!("{}", translation);
            Ok(())
        }
        Err(e) => {
            error!("{}", e);
            Err(e.into())
        }
    }
}
