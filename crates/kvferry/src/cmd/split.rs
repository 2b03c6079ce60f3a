//! Split command - partition a dump file into equal-sized chunks
//!
//! Pure line-count partitioning for parallel loading: chunk files are
//! named `<prefix><number>` with the number zero-padded to the width of
//! the chunk count.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;

/// Split command arguments
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Path to the dump file to split
    #[arg(value_name = "DATA_PATH")]
    pub data_path: PathBuf,

    /// Prefix for chunk files; a zero-padded number is appended
    #[arg(value_name = "OUTPUT_PREFIX")]
    pub output_prefix: String,

    /// Number of chunks to write
    #[arg(short = 'n', long, default_value_t = 1)]
    pub chunks: usize,
}

/// Run the split command
pub fn run(args: SplitArgs) -> Result<()> {
    if args.chunks == 0 {
        bail!("--chunks must be strictly positive");
    }

    let total_lines = count_lines(&args.data_path)?;
    if args.chunks > total_lines {
        bail!(
            "more chunks than lines: {} chunks vs {} lines",
            args.chunks,
            total_lines
        );
    }

    // Round the chunk size up when the split is uneven so every line gets
    // written; trailing chunks may come out short.
    let lines_per_chunk = total_lines / args.chunks + total_lines % args.chunks;

    tracing::info!(
        data = %args.data_path.display(),
        total_lines,
        chunks = args.chunks,
        lines_per_chunk,
        "splitting dump"
    );

    let input = File::open(&args.data_path)
        .with_context(|| format!("cannot open {}", args.data_path.display()))?;
    let mut reader = BufReader::new(input);

    let mut lines_written = 0;
    for chunk in 1..=args.chunks {
        let path = format!(
            "{}{}",
            args.output_prefix,
            zero_padded(chunk, args.chunks)
        );
        lines_written += write_chunk(&mut reader, lines_per_chunk, &path)?;
    }

    tracing::info!(lines_written, "finished");
    Ok(())
}

fn count_lines(path: &Path) -> Result<usize> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    Ok(BufReader::new(file).lines().count())
}

/// Copy up to `max_lines` lines into a new chunk file, returning how many
/// were written.
fn write_chunk(
    reader: &mut impl BufRead,
    max_lines: usize,
    path: &str,
) -> Result<usize> {
    let output = File::create(path).with_context(|| format!("cannot create {path}"))?;
    let mut writer = BufWriter::new(output);

    let mut written = 0;
    let mut line = String::new();
    while written < max_lines {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        writer.write_all(line.trim_end_matches(['\r', '\n']).as_bytes())?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Format `number` zero-padded to the decimal width of `reference`.
fn zero_padded(number: usize, reference: usize) -> String {
    let width = reference.to_string().len();
    format!("{number:0width$}")
}
