//! The `photofind search` and `photofind copy` commands.

use clap::{Args, ValueEnum};
use photofind_core::{
    parse_min_sizes, with_reversed_sizes, ColorMode, Config, FindRequest, LedgerReport, PhotoFinder,
    PhotoFormat, PixelSize, RequirementError, Requirements, ResultLedger, RunMode,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Requirement and output options shared by every command.
#[derive(Args, Debug, Default, Clone)]
pub struct FindArgs {
    /// Directory where to search photos (config value or current directory by default)
    #[arg(short = 'd', long, global = true, value_name = "DIR")]
    pub find_dir: Option<String>,

    /// Search in inner directories recursively
    #[arg(short, long, global = true)]
    pub recursive: bool,

    /// Accept only these color modes: MODE or MODE_1,MODE_2,...
    #[arg(
        short,
        long,
        global = true,
        value_delimiter = ',',
        value_parser = parse_mode,
        value_name = "MODES"
    )]
    pub modes: Option<Vec<ColorMode>>,

    /// Accept only these formats: FORMAT or FORMAT_1,FORMAT_2,...
    #[arg(
        short,
        long,
        global = true,
        value_delimiter = ',',
        value_parser = parse_format,
        value_name = "FORMATS"
    )]
    pub formats: Option<Vec<PhotoFormat>>,

    /// Minimum sizes: width:height or width:height,width:height,... (maximum 10, each 0 to 999999)
    #[arg(short = 's', long, global = true, value_parser = parse_sizes, value_name = "W:H,...")]
    pub min_sizes: Option<SizeList>,

    /// Also accept every minimum size with width and height swapped
    #[arg(short, long, global = true)]
    pub add_reverse_sizes: bool,

    /// Show extended result (every found, copied and not copied file)
    #[arg(short, long = "extended-result", global = true)]
    pub extended_result: bool,

    /// Result output format (config value or text by default)
    #[arg(long, global = true, value_enum)]
    pub output_format: Option<OutputFormat>,
}

/// Result output formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary framed by start/end lines
    Text,
    /// The full ledger as a JSON object
    Json,
}

/// A parsed `--min-sizes` value.
///
/// Wrapped so clap treats the whole list as one value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SizeList(pub Vec<PixelSize>);

fn parse_mode(value: &str) -> Result<ColorMode, String> {
    value.parse().map_err(|e: RequirementError| e.to_string())
}

fn parse_format(value: &str) -> Result<PhotoFormat, String> {
    value.parse().map_err(|e: RequirementError| e.to_string())
}

fn parse_sizes(value: &str) -> Result<SizeList, String> {
    parse_min_sizes(value)
        .map(SizeList)
        .map_err(|e| e.to_string())
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

impl FindArgs {
    /// The directory to search: CLI flag, then config, then the current directory.
    pub fn find_dir(&self, config: &Config) -> PathBuf {
        self.find_dir
            .as_deref()
            .map(expand)
            .or_else(|| config.find_dir())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Merge CLI requirement options over the `[search]` config section.
    ///
    /// A flag given on the command line replaces the config value as a whole.
    pub fn requirements(&self, config: &Config) -> Result<Requirements, RequirementError> {
        let mut sizes = match &self.min_sizes {
            Some(SizeList(sizes)) => sizes.clone(),
            None => config.min_sizes()?,
        };
        if self.add_reverse_sizes || config.search.add_reverse_sizes {
            sizes = with_reversed_sizes(&sizes);
        }

        let requirements = Requirements::any().with_min_sizes(sizes);
        let requirements = match &self.modes {
            Some(modes) => requirements.with_modes(modes.iter().map(ColorMode::as_str))?,
            None => requirements.with_modes(&config.search.modes)?,
        };
        match &self.formats {
            Some(formats) => requirements.with_formats(formats.iter().map(PhotoFormat::as_str)),
            None => requirements.with_formats(&config.search.formats),
        }
    }

    pub fn recursive(&self, config: &Config) -> bool {
        self.recursive || config.search.recursive
    }

    pub fn extended(&self, config: &Config) -> bool {
        self.extended_result || config.output.extended
    }

    pub fn output_format(&self, config: &Config) -> OutputFormat {
        self.output_format.unwrap_or_else(|| {
            if config.output.format.eq_ignore_ascii_case("json") {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            }
        })
    }
}

/// Run one search (no `copy_dir`) or copy, print the result and return it.
pub async fn execute(
    args: &FindArgs,
    copy_dir: Option<String>,
    config: &Config,
) -> anyhow::Result<LedgerReport> {
    let mode = if copy_dir.is_some() {
        RunMode::Copy
    } else {
        RunMode::Search
    };
    let label = match mode {
        RunMode::Search => "search",
        RunMode::Copy => "copy",
    };
    let format = args.output_format(config);

    if format == OutputFormat::Text {
        println!("\nStart {label}");
    }

    let ledger = Arc::new(ResultLedger::new());
    match args.requirements(config) {
        Ok(requirements) => {
            let request = FindRequest {
                find_dir: args.find_dir(config),
                copy_dir: copy_dir.as_deref().map(expand),
                recursive: args.recursive(config),
            };
            tracing::debug!("Running {} with {:?}", label, request);

            PhotoFinder::new()
                .with_requirements(Some(requirements))
                .run(&request, Some(Arc::clone(&ledger)))
                .await;
        }
        Err(e) => {
            tracing::error!("{}", e);
            ledger.record_error(e.to_string());
        }
    }

    let report = ledger.snapshot();
    match format {
        OutputFormat::Text => {
            let summary = if args.extended(config) {
                report.detailed_summary(mode)
            } else {
                report.short_summary(mode)
            };
            println!("End {label}\n{summary}\n");
        }
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(report)
}
