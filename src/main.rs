use boothframe::imaging::{
    Compositor, LogoSize, MergeOverrides, OptionError, OutputFormat, create_compositor,
};
use boothframe::upload::UploadFile;
use boothframe::{batch, config, output};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Encoding flags shared by the processing commands.
#[derive(clap::Args, Clone)]
struct EncodeArgs {
    /// JPEG and WebP quality (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Output format: jpeg, png or webp (unknown names encode as jpeg)
    #[arg(long = "format", value_name = "FORMAT")]
    output_format: Option<String>,
}

impl EncodeArgs {
    /// Collect the command's flags into overrides, range-checked like the config file.
    fn overrides(
        &self,
        logo_size: Option<LogoSize>,
        border_width: Option<u32>,
    ) -> Result<MergeOverrides, OptionError> {
        let overrides = MergeOverrides {
            logo_size,
            border_width,
            quality: self.quality,
            output_format: self.output_format.as_deref().map(OutputFormat::parse_lenient),
        };
        overrides.validate()?;
        Ok(overrides)
    }
}

#[derive(Parser)]
#[command(name = "boothframe")]
#[command(about = "Photo-booth image compositor")]
#[command(long_about = "\
Photo-booth image compositor

Every photo is brought onto a fixed canvas: 1248x832 for landscape (and
square) photos, 832x1248 for portrait ones. Photos are stretched to fill the
canvas, never cropped.

  merge    stamp a logo into the bottom-right corner (no border)
  border   surround the canvas with a white border
  batch    run border or merge over a directory in parallel

Defaults come from boothframe.toml (see 'boothframe gen-config'); command-line
flags override the file.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = "boothframe.toml", global = true)]
    config: PathBuf,

    /// Print result metadata as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fit a photo onto the canvas and stamp a logo on it
    Merge {
        /// Main photo
        main: PathBuf,
        /// Logo or badge image
        logo: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// Bounding box for the logo, as WIDTHxHEIGHT
        #[arg(long, value_name = "WxH")]
        logo_size: Option<LogoSize>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Fit a photo onto the canvas and add a white border
    Border {
        /// Main photo
        main: PathBuf,
        /// Output file
        #[arg(short, long)]
        output: PathBuf,
        /// White border width in pixels
        #[arg(long)]
        border_width: Option<u32>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Print dimensions and codec metadata without decoding pixels
    Identify {
        file: PathBuf,
    },
    /// Process every supported image in a directory
    Batch {
        /// Directory of photos
        source: PathBuf,
        /// Output directory (mirrors the source layout)
        #[arg(short, long)]
        output: PathBuf,
        /// Merge with this logo instead of adding a border
        #[arg(long)]
        logo: Option<PathBuf>,
        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,
        /// Bounding box for the logo, as WIDTHxHEIGHT (with --logo)
        #[arg(long, value_name = "WxH")]
        logo_size: Option<LogoSize>,
        /// White border width in pixels (without --logo)
        #[arg(long)]
        border_width: Option<u32>,
        #[command(flatten)]
        encode: EncodeArgs,
    },
    /// Print a stock boothframe.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Merge {
            main,
            logo,
            output,
            logo_size,
            encode,
        } => {
            let overrides = encode.overrides(logo_size, None)?;
            let compositor = load_compositor(&cli.config)?;
            let main_file = UploadFile::from_path(&main)?;
            let logo_file = UploadFile::from_path(&logo)?;
            let result = compositor.merge_images(&main_file, &logo_file, Some(&overrides))?;
            std::fs::write(&output, &result.data)?;
            report(cli.json, "merge", &result, &main, &output)?;
        }
        Command::Border {
            main,
            output,
            border_width,
            encode,
        } => {
            let overrides = encode.overrides(None, border_width)?;
            let compositor = load_compositor(&cli.config)?;
            let main_file = UploadFile::from_path(&main)?;
            let result = compositor.add_white_border(&main_file, Some(&overrides))?;
            std::fs::write(&output, &result.data)?;
            report(cli.json, "border", &result, &main, &output)?;
        }
        Command::Identify { file } => {
            let upload = UploadFile::from_path(&file)?;
            let meta = create_compositor().get_image_metadata(&upload)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&meta)?);
            } else {
                output::print_lines(&output::format_metadata(&file, &meta));
            }
        }
        Command::Batch {
            source,
            output: out_dir,
            logo,
            recursive,
            logo_size,
            border_width,
            encode,
        } => {
            let overrides = encode.overrides(logo_size, border_width)?;
            let site_config = config::load_config(&cli.config)?;
            init_thread_pool(&site_config.processing);
            let compositor = Compositor::with_defaults(site_config.merge.to_options());

            let logo_file = logo.as_deref().map(UploadFile::from_path).transpose()?;
            let mode = match &logo_file {
                Some(logo) => batch::BatchMode::Merge { logo },
                None => batch::BatchMode::Border,
            };

            let sources = batch::discover_images(&source, recursive)?;
            tracing::info!(count = sources.len(), source = %source.display(), "batch started");
            let result = batch::run_batch(
                &compositor,
                &sources,
                &source,
                &out_dir,
                mode,
                Some(&overrides),
            )?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                output::print_lines(&output::format_batch_report(&result, &source));
            }

            if result.failed() > 0 {
                let total = result.items.len();
                return Err(format!("{} of {total} images failed", result.failed()).into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a compositor whose defaults come from the config file.
fn load_compositor(config_path: &Path) -> Result<Compositor, config::ConfigError> {
    let site_config = config::load_config(config_path)?;
    Ok(Compositor::with_defaults(site_config.merge.to_options()))
}

fn report(
    json: bool,
    operation: &str,
    result: &boothframe::upload::ImageMergeResult,
    source: &Path,
    output: &Path,
) -> Result<(), serde_json::Error> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        output::print_lines(&output::format_result(operation, result, source, output));
    }
    Ok(())
}

/// Send logs to stderr so stdout stays clean for results and JSON.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("boothframe").chain(args.iter().copied()))
    }

    fn overrides_for(args: &[&str]) -> Result<MergeOverrides, OptionError> {
        match parse(args).unwrap().command {
            Command::Merge {
                logo_size, encode, ..
            } => encode.overrides(logo_size, None),
            Command::Border {
                border_width,
                encode,
                ..
            } => encode.overrides(None, border_width),
            Command::Batch {
                logo_size,
                border_width,
                encode,
                ..
            } => encode.overrides(logo_size, border_width),
            _ => panic!("not a processing command"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn each_command_takes_only_its_own_geometry_flags() {
        assert!(parse(&["merge", "a.jpg", "b.png", "-o", "c.jpg", "--logo-size", "90x90"]).is_ok());
        assert!(parse(&["merge", "a.jpg", "b.png", "-o", "c.jpg", "--border-width", "3"]).is_err());
        assert!(parse(&["border", "a.jpg", "-o", "c.jpg", "--border-width", "3"]).is_ok());
        assert!(parse(&["border", "a.jpg", "-o", "c.jpg", "--logo-size", "90x90"]).is_err());
    }

    #[test]
    fn flags_become_overrides() {
        let args = [
            "border", "a.jpg", "-o", "b.jpg", "--border-width", "10", "--quality", "85",
        ];
        let overrides = overrides_for(&args).unwrap();
        assert_eq!(overrides.border_width, Some(10));
        assert_eq!(overrides.quality, Some(85));
        assert_eq!(overrides.logo_size, None);

        let args = ["merge", "a.jpg", "l.png", "-o", "b", "--format", "heic"];
        let overrides = overrides_for(&args).unwrap();
        assert_eq!(overrides.output_format, Some(OutputFormat::Jpeg));
    }

    #[test]
    fn out_of_range_flags_are_rejected_like_config_values() {
        assert_eq!(
            overrides_for(&["border", "a.jpg", "-o", "b.jpg", "--quality", "0"]),
            Err(OptionError::Quality(0))
        );
        assert_eq!(
            overrides_for(&["border", "a.jpg", "-o", "b.jpg", "--border-width", "100000"]),
            Err(OptionError::BorderWidth(100_000))
        );
        assert!(matches!(
            overrides_for(&["merge", "a.jpg", "l.png", "-o", "b.jpg", "--logo-size", "0x0"]),
            Err(OptionError::LogoSize(_))
        ));
        assert!(matches!(
            overrides_for(&["batch", "shoot", "-o", "out", "--border-width", "513"]),
            Err(OptionError::BorderWidth(513))
        ));
    }
}
