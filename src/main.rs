// src/main.rs
mod journal;
mod logger;
mod paths;

use clap::{Parser, Subcommand, ValueEnum};
use huffpack::{Codec, CodeTable, FrequencyTable, Header, HuffError, HuffmanTree, Layout, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Parser)]
#[command(name = "huffpack", version = "0.1.0")]
#[command(about = "Huffman file compressor.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Wire layout of compressed files
    #[arg(long, value_enum, global = true, default_value_t = LayoutArg::Counted)]
    layout: LayoutArg,

    /// Log tree and code details
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Append a JSON line per command to this file
    #[arg(long, global = true)]
    journal: Option<PathBuf>,
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
enum LayoutArg {
    #[value(help = "Records the symbol count so decoding stops exactly (Default).")]
    Counted,
    #[value(help = "No end marker; padding bits may decode as extra trailing bytes.")]
    Padded,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file (default output: <name>.pcb next to it)
    Compress {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Extension to record instead of the file's own
        #[arg(long)]
        extension: Option<String>,
    },
    /// Decompress a file (default output: decompressed_<name>.<ext> next to it)
    Decompress {
        file: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the frequency and code table of a file
    Codes { file: PathBuf },
    /// Print the header of a compressed file
    Inspect { file: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    let span = tracing::info_span!("command_execution", command = ?std::env::args().collect::<Vec<_>>());
    let _enter = span.enter();

    let layout = match cli.layout {
        LayoutArg::Counted => Layout::Counted,
        LayoutArg::Padded => Layout::Padded,
    };
    let codec = Codec::with_layout(layout);
    let journal = cli.journal.as_deref();

    match cli.command {
        Commands::Compress {
            file,
            output,
            extension,
        } => compress_file(&codec, &file, output, extension, journal),
        Commands::Decompress { file, output } => decompress_file(&codec, &file, output, journal),
        Commands::Codes { file } => print_codes(&file),
        Commands::Inspect { file } => inspect_file(&codec, &file),
    }
}

fn compress_file(
    codec: &Codec,
    file: &Path,
    output: Option<PathBuf>,
    extension: Option<String>,
    journal: Option<&Path>,
) -> Result<()> {
    let extension = match extension {
        Some(extension) => extension,
        None => paths::extension_of(file)?,
    };
    let out_path = output.unwrap_or_else(|| paths::compressed_path(file));

    let mut input = BufReader::new(File::open(file)?);
    let stats = write_atomically(&out_path, |out| {
        codec.compress_stream(&mut input, &extension, out)
    })?;

    println!(
        "Compressed {} -> {} ({} -> {} bytes)",
        file.display(),
        out_path.display(),
        stats.input_bytes,
        stats.output_bytes()
    );
    log_action(
        journal,
        "compress",
        file,
        &out_path,
        codec.layout(),
        stats.input_bytes,
        stats.output_bytes(),
    );
    Ok(())
}

fn decompress_file(
    codec: &Codec,
    file: &Path,
    output: Option<PathBuf>,
    journal: Option<&Path>,
) -> Result<()> {
    let input_bytes = fs::metadata(file)?.len();
    let mut input = BufReader::new(File::open(file)?);
    let header = read_header(codec, &mut input)?;
    let out_path = output.unwrap_or_else(|| paths::decompressed_path(file, &header.extension));

    let stats = write_atomically(&out_path, |out| {
        codec.decompress_body(&header, &mut input, out)
    })?;

    println!(
        "Decompressed {} -> {} ({} bytes)",
        file.display(),
        out_path.display(),
        stats.output_bytes
    );
    log_action(
        journal,
        "decompress",
        file,
        &out_path,
        codec.layout(),
        input_bytes,
        stats.output_bytes,
    );
    Ok(())
}

fn print_codes(file: &Path) -> Result<()> {
    let data = fs::read(file)?;
    let freqs = FrequencyTable::from_bytes(&data);
    let tree = HuffmanTree::build(&freqs)?;
    let codes = CodeTable::from_tree(&tree);

    println!("{:>6} {:>5} {:>12}  code", "symbol", "char", "count");
    for (symbol, code) in codes.iter() {
        println!(
            "{:>#6x} {:>5} {:>12}  {}",
            symbol,
            printable(symbol),
            freqs.get(symbol),
            code
        );
    }
    let bits = freqs.encoded_bits(&codes);
    println!(
        "{} symbols, {} distinct, {} code bits ({} bytes packed)",
        freqs.total(),
        freqs.len(),
        bits,
        bits.div_ceil(8)
    );
    Ok(())
}

fn inspect_file(codec: &Codec, file: &Path) -> Result<()> {
    let total = fs::metadata(file)?.len();
    let mut input = BufReader::new(File::open(file)?);
    let header = read_header(codec, &mut input)?;
    let header_bytes = header.to_bytes()?.len() as u64;
    let codes = CodeTable::from_tree(&header.tree);

    println!("extension:    {:?}", header.extension);
    println!("layout:       {:?}", header.layout());
    if let Some(count) = header.symbol_count {
        println!("symbols:      {}", count);
    }
    println!("leaves:       {}", header.tree.leaf_count());
    println!("depth:        {}", header.tree.depth());
    println!("header bytes: {}", header_bytes);
    println!("packed bytes: {}", total.saturating_sub(header_bytes));
    for (symbol, code) in codes.iter() {
        println!("  {:>#6x} {:>5}  {}", symbol, printable(symbol), code);
    }
    Ok(())
}

fn read_header(codec: &Codec, input: &mut impl Read) -> Result<Header> {
    codec.read_header(input).inspect_err(|e| {
        if let Some(hint) = layout_hint(e, codec.layout()) {
            warn!(layout = ?codec.layout(), "{}", hint);
        }
    })
}

// A header that fails to parse is often a file written with the other layout.
fn layout_hint(err: &HuffError, layout: Layout) -> Option<String> {
    if !err.is_header_error() {
        return None;
    }
    let other = match layout {
        Layout::Counted => "padded",
        Layout::Padded => "counted",
    };
    Some(format!("header unreadable, the file may need --layout {}", other))
}

fn printable(symbol: u8) -> String {
    if symbol.is_ascii_graphic() {
        format!("'{}'", symbol as char)
    } else {
        String::new()
    }
}

// Writes through a temp file and renames it into place only on success.
fn write_atomically<T>(
    path: &Path,
    write: impl FnOnce(&mut BufWriter<File>) -> Result<T>,
) -> Result<T> {
    let temp_path = paths::temp_path(path);
    let mut out = BufWriter::new(File::create(&temp_path)?);

    let result = write(&mut out).and_then(|value| {
        out.flush()?;
        Ok(value)
    });
    drop(out);

    match result {
        Ok(value) => {
            fs::rename(&temp_path, path)?;
            Ok(value)
        }
        Err(e) => {
            let _ = fs::remove_file(&temp_path);
            Err(e)
        }
    }
}

fn log_action(
    journal: Option<&Path>,
    action: &str,
    input: &Path,
    output: &Path,
    layout: Layout,
    input_bytes: u64,
    output_bytes: u64,
) {
    let Some(path) = journal else {
        return;
    };
    let entry = journal::JournalEntry::new(action, input, output, layout, input_bytes, output_bytes);
    if let Err(e) = journal::record(path, &entry) {
        warn!(journal = %path.display(), error = %e, "failed to append journal entry");
    }
}
