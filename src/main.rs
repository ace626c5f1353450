// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};

use outofphase::audio::{self, AudioFileError, AudioFileReader, NumBits};
use outofphase::config::Settings;
use outofphase::convert::convert;
use outofphase::util::{filename_display, sample_duration_display};
use outofphase::verify::check_files;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "Reads, checks and converts sample files for Out Of Phase."
)]
struct Cli {
    /// Path to a YAML settings file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Prints the format of an audio file.
    Info {
        /// The AIFF, AIFF-C or WAV file to inspect.
        path: PathBuf,
    },
    /// Converts an audio file. The output type is chosen by the output file's extension
    /// (.wav, .aif/.aiff or .aifc).
    Convert {
        /// The file to read.
        input: PathBuf,
        /// The file to write.
        output: PathBuf,
        /// The output bit depth (8, 16 or 24). Defaults to the export settings.
        #[arg(short, long)]
        bits: Option<u16>,
    },
    /// Decodes each file to the end and reports whether it is complete.
    Check {
        /// The files to check.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { path } => {
            let file_type = audio::detect_file_type(&path)?
                .ok_or(AudioFileError::UnrecognizedFileFormat)?;
            let reader = audio::open_audio_file(&path, &settings.reader_options())?;
            let format = reader.format();

            println!("{}:", filename_display(&path));
            println!("  Type:          {}", file_type);
            println!("  Channels:      {}", format.channels);
            println!("  Bits:          {}", format.bits.bits());
            println!("  Sampling rate: {} Hz", format.sampling_rate);
            println!("  Frames:        {}", format.frames);
            println!(
                "  Duration:      {}",
                sample_duration_display(format.duration())
            );
        }
        Commands::Convert {
            input,
            output,
            bits,
        } => {
            let bits = match bits {
                Some(bits) => NumBits::try_from(bits)?,
                None => settings.export().bits(),
            };
            convert(
                &input,
                &output,
                bits,
                settings.export().volume_scaling().to_f64() as f32,
                &settings.reader_options(),
            )?;
        }
        Commands::Check { paths } => {
            let report = check_files(&paths, &settings.reader_options());
            for check in report.checks.iter() {
                match &check.result {
                    Ok(frames) => println!("{}: OK ({} frames)", check.path.display(), frames),
                    Err(e) => println!("{}: {}", check.path.display(), e),
                }
            }

            if !report.is_clean() {
                return Err(format!(
                    "{} of {} files failed",
                    report.failures(),
                    report.checks.len()
                )
                .into());
            }
        }
    }

    Ok(())
}
