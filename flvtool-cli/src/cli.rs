use clap::Parser;
use std::path::PathBuf;

use crate::error::AppError;

/// Define CLI arguments
#[derive(Parser, Debug)]
#[command(
    name = "flvtool",
    version,
    about = "Inspect, crop, join and index FLV files",
    long_about = "Adds keyframe positions and summary properties to the onMetaData tag of FLV files.\n\
                  \n\
                  Display information about a file:\n  \
                    flvtool -i <input file>\n\
                  Index a file, optionally trimming it to start/end times in seconds:\n  \
                    flvtool <input file> <output file> [<start time> <end time>]\n\
                  Join one or more files together:\n  \
                    flvtool -j <input files>... <output file>"
)]
pub struct CliArgs {
    /// Print information about a single input file
    #[arg(short, long, conflicts_with = "join")]
    pub info: bool,

    /// Join every input file into the last one given
    #[arg(short, long)]
    pub join: bool,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Value written to the metadatacreator property
    #[arg(long)]
    pub creator: Option<String>,

    /// Input and output files, then optional start and end times
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<String>,
}

/// What to do, resolved from the positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Info {
        input: PathBuf,
    },
    Index {
        input: PathBuf,
        output: PathBuf,
        /// Start and end in milliseconds
        range: Option<(u32, u32)>,
    },
    Join {
        inputs: Vec<PathBuf>,
        output: PathBuf,
    },
}

impl CliArgs {
    pub fn mode(&self) -> Result<Mode, AppError> {
        let files = &self.files;

        if self.info {
            return match files.as_slice() {
                [input] => Ok(Mode::Info {
                    input: PathBuf::from(input),
                }),
                _ => Err(AppError::InvalidInput(
                    "info mode takes exactly one input file".to_string(),
                )),
            };
        }

        if self.join {
            return match files.split_last() {
                Some((output, inputs)) if !inputs.is_empty() => Ok(Mode::Join {
                    inputs: inputs.iter().map(PathBuf::from).collect(),
                    output: PathBuf::from(output),
                }),
                _ => Err(AppError::InvalidInput(
                    "join mode takes at least one input file and an output file".to_string(),
                )),
            };
        }

        match files.as_slice() {
            [input, output] => Ok(Mode::Index {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
                range: None,
            }),
            [input, output, start, end] => Ok(Mode::Index {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
                range: Some((parse_seconds(start)?, parse_seconds(end)?)),
            }),
            _ => Err(AppError::InvalidInput(
                "expected <input> <output> [<start time> <end time>]".to_string(),
            )),
        }
    }
}

/// Parses a time in (possibly fractional) seconds into milliseconds.
pub fn parse_seconds(value: &str) -> Result<u32, AppError> {
    let seconds: f64 = value
        .trim()
        .parse()
        .map_err(|_| AppError::ParseError(format!("invalid time in seconds: {value}")))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(AppError::ParseError(format!(
            "time must be a non-negative number of seconds: {value}"
        )));
    }

    let ms = (seconds * 1000.0).round();
    if ms > u32::MAX as f64 {
        return Err(AppError::ParseError(format!("time too large: {value}")));
    }
    Ok(ms as u32)
}
