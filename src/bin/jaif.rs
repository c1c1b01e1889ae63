//! jaif CLI - convert images to and from the JAIF format.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::{self, Command};

use clap::{Args, Parser, Subcommand};
use log::{error, info, Level};

use jaif::{DecodeOptions, Decoder, Encoder, RasterImage, RowPolicy};

/// Name of the file `show` writes its decoded image to, inside the system temp directory.
const SHOW_FILE_NAME: &str = "temp.png";

/// Convert images to and from JAIF, a hex-encoded raster format.
#[derive(Parser, Debug)]
#[command(name = "jaif")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
EXAMPLES:
    jaif convert photo.png                  Write photo.jaif to the current directory
    jaif export photo.jaif roundtrip.png    Decode a JAIF file back to PNG
    jaif show photo.jaif                    Decode and open in the default viewer")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    #[command(flatten)]
    decode: DecodeArgs,

    /// Log more (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Convert an image (PNG) to JAIF
    Convert {
        /// Image to convert
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output path, defaults to the input file name with a .jaif extension
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },
    /// Decode a JAIF file and write it as PNG
    Export {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },
    /// Decode a JAIF file and open it in the default image viewer
    Show {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

#[derive(Args, Debug)]
struct DecodeArgs {
    /// Require every row to be exactly width * 6 characters and the row count to match the height
    #[arg(long, global = true)]
    strict_rows: bool,

    /// Refuse to decode images with more pixels than this
    #[arg(
        long,
        global = true,
        value_name = "N",
        default_value_t = DecodeOptions::DEFAULT_MAX_PIXELS
    )]
    max_pixels: u64,
}

impl DecodeArgs {
    fn options(&self) -> DecodeOptions {
        let row_policy = if self.strict_rows {
            RowPolicy::Strict
        } else {
            RowPolicy::Flatten
        };
        DecodeOptions::new()
            .with_row_policy(row_policy)
            .with_max_pixels(Some(self.max_pixels))
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::Error,
        (false, 0) => Level::Warn,
        (false, 1) => Level::Info,
        (false, 2) => Level::Debug,
        (false, _) => Level::Trace,
    };
    if let Err(err) = simple_logger::init_with_level(level) {
        eprintln!("Could not initialize logger: {err}");
    }

    if let Err(err) = run(&cli) {
        error!("{err}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Cmd::Convert { input, output } => {
            let output = match output {
                Some(path) => path.clone(),
                None => default_output_path(input)?,
            };
            convert(input, &output)?;
            info!("Converted {} to {}", input.display(), output.display());
        }
        Cmd::Export { input, output } => {
            let image = read_jaif(input, &cli.decode.options())?;
            image.to_rgba_image().save(output)?;
            info!("Exported {} to {}", input.display(), output.display());
        }
        Cmd::Show { input } => {
            let image = read_jaif(input, &cli.decode.options())?;
            let path = std::env::temp_dir().join(SHOW_FILE_NAME);
            image.to_rgba_image().save(&path)?;
            info!(
                "Decoded {}x{} image to {}",
                image.width(),
                image.height(),
                path.display()
            );
            open_in_default_app(&path)?;
        }
    }
    Ok(())
}

/// The input's file name with its extension swapped for `.jaif`, relative to the current
/// directory.
fn default_output_path(input: &Path) -> Result<PathBuf, Box<dyn Error>> {
    let file_name = input
        .file_name()
        .ok_or_else(|| format!("{} has no file name", input.display()))?;
    Ok(Path::new(file_name).with_extension("jaif"))
}

fn convert(input: &Path, output: &Path) -> Result<(), Box<dyn Error>> {
    let source = image::open(input)?;
    let image = RasterImage::from_dynamic(&source);

    // Clear any previous output rather than writing over it
    match fs::remove_file(output) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => return Err(err.into()),
        _ => {}
    }

    let file = File::create(output)?;
    Encoder::new(BufWriter::new(file)).encode(&image)?;
    Ok(())
}

fn read_jaif(path: &Path, options: &DecodeOptions) -> Result<RasterImage, Box<dyn Error>> {
    let file = BufReader::new(File::open(path)?);
    let (header, body) = Decoder::new_from_reader(file).decode_header()?;
    info!("{}: {}x{}", path.display(), header.width(), header.height());
    Ok(body.decode_image(options)?)
}

fn open_in_default_app(path: &Path) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    command.arg(path).spawn().map(|_| ())
}
