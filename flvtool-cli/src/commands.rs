use std::path::{Path, PathBuf};

use flv_edit::{FlvStream, StreamConfig};
use tracing::info;

use crate::cli::Mode;
use crate::error::AppError;

pub fn run(mode: Mode, config: StreamConfig) -> Result<(), AppError> {
    match mode {
        Mode::Info { input } => print_info(&input, &config),
        Mode::Index {
            input,
            output,
            range,
        } => index(&input, &output, range, config),
        Mode::Join { inputs, output } => join(&inputs, &output, config),
    }
}

fn print_info(input: &Path, config: &StreamConfig) -> Result<(), AppError> {
    let stream = FlvStream::open(input, config)?;

    println!("{}", stream.header());
    println!("{}", stream.stats());
    if let Some(meta) = stream.meta_tag() {
        println!("Metadata\n{meta}");
    }
    Ok(())
}

/// Loads `input` (up to the end of `range`), crops it, then writes it out
/// with metadata and a keyframe index.
fn index(
    input: &Path,
    output: &Path,
    range: Option<(u32, u32)>,
    config: StreamConfig,
) -> Result<(), AppError> {
    let mut stream = match range {
        Some((start_ms, end_ms)) => {
            let config = StreamConfig {
                end_ms: Some(end_ms),
                ..config
            };
            let mut stream = FlvStream::open(input, &config)?;
            stream.crop(start_ms, end_ms)?;
            stream
        }
        None => FlvStream::open(input, &config)?,
    };

    stream.add_metadata();
    stream.add_index();
    stream.save(output)?;

    info!(
        output = %output.display(),
        tags = stream.tag_count(),
        duration_ms = stream.duration_ms(),
        "indexed"
    );
    Ok(())
}

/// Appends every input, in order, into a new stream.
fn join(inputs: &[PathBuf], output: &Path, config: StreamConfig) -> Result<(), AppError> {
    let mut stream = FlvStream::with_config(config);

    for input in inputs {
        let part = FlvStream::open(input, stream.config())?;
        stream.append(part)?;
    }

    stream.add_metadata();
    stream.add_index();
    stream.save(output)?;

    info!(
        output = %output.display(),
        inputs = inputs.len(),
        tags = stream.tag_count(),
        "joined"
    );
    Ok(())
}
