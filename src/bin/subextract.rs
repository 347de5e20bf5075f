use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use subextract::{
    AssemblyOptions, CueAssembler, DecoderFeed, FfmpegFeed, FfmpegLogLevel, LanguageSelector,
    RawCue, StreamSelector, SubtitleError, SubtitleFormat, WriterOptions, output_path_for,
    save_cues,
};

const CLI_AFTER_HELP: &str = "Examples:\n  subextract extract movie.mkv\n  subextract extract movie.mkv --language de --format vtt --out movie.de.vtt\n  subextract streams movie.mkv --json\n  subextract completions zsh > _subextract";

#[derive(Debug, Parser)]
#[command(
    name = "subextract",
    version,
    about = "Extract text subtitle tracks from media files as clean SubRip",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Allow overwriting existing output files.
    #[arg(long, global = true)]
    overwrite: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract a subtitle track to a file.
    #[command(
        about = "Extract subtitles",
        after_help = "Examples:\n  subextract extract movie.mkv\n  subextract extract movie.mkv --stream 3 --no-merge --out raw.srt"
    )]
    Extract {
        /// Input media path.
        input: PathBuf,
        /// Output file path (defaults to the input with the format's extension).
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format: srt | vtt | raw.
        #[arg(long, default_value = "srt")]
        format: String,
        /// Decode streams in this language (defaults to $LANG).
        #[arg(long)]
        language: Option<String>,
        /// Decode only this stream index. Takes precedence over --language.
        #[arg(long)]
        stream: Option<usize>,
        /// Keep neighbouring cues separate.
        #[arg(long)]
        no_merge: bool,
        /// Merge cues closer than this many milliseconds.
        #[arg(long)]
        merge_tolerance: Option<i64>,
        /// Do not prefix the output with a UTF-8 byte order mark.
        #[arg(long)]
        no_bom: bool,
        /// Print a machine-readable summary instead of the status line.
        #[arg(long)]
        json: bool,
    },

    /// List subtitle streams in a media file (alias: list).
    #[command(
        about = "List subtitle streams",
        visible_alias = "list",
        after_help = "Examples:\n  subextract streams movie.mkv\n  subextract streams movie.mkv --json"
    )]
    Streams {
        /// Input media path.
        input: PathBuf,

        /// Output the stream list as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_subtitle_format(value: &str) -> Option<SubtitleFormat> {
    match value.to_ascii_lowercase().as_str() {
        "srt" => Some(SubtitleFormat::Srt),
        "vtt" | "webvtt" => Some(SubtitleFormat::WebVtt),
        "raw" | "txt" => Some(SubtitleFormat::Raw),
        _ => None,
    }
}

fn stream_selector(stream: Option<usize>, language: Option<&str>) -> StreamSelector {
    match (stream, language) {
        (Some(index), _) => StreamSelector::Index(index),
        (None, Some(language)) => StreamSelector::Language(LanguageSelector::new(language)),
        (None, None) => StreamSelector::default(),
    }
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), SubtitleError> {
    let default_filter = if global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let level = match &global.log_level {
        Some(name) => FfmpegLogLevel::from_name(name)
            .ok_or_else(|| SubtitleError::InvalidOption(format!("--log-level {name}")))?,
        None => FfmpegLogLevel::default(),
    };
    subextract::set_ffmpeg_log_level(level);

    Ok(())
}

/// Ticks a spinner for every event pulled through it.
struct SpinnerFeed<'a> {
    feed: &'a mut FfmpegFeed,
    spinner: ProgressBar,
    events: u64,
}

impl DecoderFeed for SpinnerFeed<'_> {
    fn next_event(&mut self) -> Result<Option<RawCue>, SubtitleError> {
        let event = self.feed.next_event()?;
        if let Some(raw) = &event {
            self.events += 1;
            self.spinner
                .set_message(format!("{} events (stream {})", self.events, raw.stream_id));
        }
        Ok(event)
    }

    fn flush(&mut self) -> Result<Vec<RawCue>, SubtitleError> {
        self.feed.flush()
    }
}

fn decoding_spinner() -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.green} {elapsed} {msg}")?);
    spinner.set_message("decoding");
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            out,
            format,
            language,
            stream,
            no_merge,
            merge_tolerance,
            no_bom,
            json,
        } => {
            let format = parse_subtitle_format(&format)
                .ok_or_else(|| SubtitleError::InvalidOption(format!("--format {format}")))?;
            let out = out.unwrap_or_else(|| output_path_for(&input, format));
            ensure_writable_path(&out, cli.global.overwrite)?;

            let mut feed = FfmpegFeed::open(&input)?;
            let selected = feed.select(&stream_selector(stream, language.as_deref()))?;

            let mut options = AssemblyOptions::new().with_merge_adjacent(!no_merge);
            if let Some(tolerance) = merge_tolerance {
                options = options.with_merge_tolerance_ms(tolerance);
            }

            let spinner = decoding_spinner()?;
            let mut assembler = CueAssembler::new(options);
            let consumed = assembler.consume(SpinnerFeed {
                feed: &mut feed,
                spinner: spinner.clone(),
                events: 0,
            });
            spinner.finish_and_clear();
            consumed?;

            let events = assembler.events_seen();
            let cues = assembler.finish();
            if cues.is_empty() {
                return Err(SubtitleError::NoCues.into());
            }

            let writer_options = WriterOptions::new().with_bom(!no_bom);
            save_cues(&out, &cues, format, writer_options)?;

            if json {
                let payload = json!({
                    "input": input.display().to_string(),
                    "output": out.display().to_string(),
                    "format": format.to_string(),
                    "streams": selected,
                    "events": events,
                    "cues": cues.len(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!(
                    "{} {} cues from stream(s) {:?} -> {}",
                    "extracted".green().bold(),
                    cues.len(),
                    selected,
                    out.display()
                );
            }
        }
        Commands::Streams { input, json } => {
            let feed = FfmpegFeed::open(&input)?;
            let streams = feed.subtitle_streams();
            if json {
                let payload: Vec<_> = streams
                    .iter()
                    .map(|stream| {
                        json!({
                            "index": stream.index,
                            "codec": stream.codec,
                            "language": stream.language,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if streams.is_empty() {
                println!("{}", "no subtitle streams".yellow());
            } else {
                for stream in streams {
                    println!(
                        "{} {} [{}]",
                        format!("#{}", stream.index).cyan().bold(),
                        stream.language.as_deref().unwrap_or("und"),
                        stream.codec
                    );
                }
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "subextract", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
