use anyhow::Result;
use clap::Parser;
use std::ffi::OsString;
use std::io::BufWriter;
use std::path::PathBuf;

use hashmem::config::{MemOpt, StrandMode};
use hashmem::io::mummer::MummerWriter;
use hashmem::mem::find_mems;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// MUMmer options spelled with a single dash.
const MUMMER_LONG_FLAGS: [&str; 4] = ["-mum", "-mumcand", "-mumreference", "-maxmatch"];

#[derive(Parser, Debug)]
#[command(
    name = "hashmem",
    author,
    version,
    about = "Find maximal exact matches between a reference and a query (MUMmer-compatible output)",
    arg_required_else_help = true
)]
struct Cli {
    /// Reference FASTA file
    reference: PathBuf,
    /// Query FASTA file
    query: PathBuf,
    /// Minimum match length in bases
    #[arg(short = 'l', long = "min-len", default_value_t = 50)]
    min_len: u64,
    /// Seed length in bases (at most 28; defaults to min(28, min-len))
    #[arg(short = 'k', long = "seed-len")]
    seed_len: Option<u64>,
    /// Split each input into this many chunks to bound memory
    #[arg(short = 'd', long = "split", default_value_t = 1)]
    split: u64,
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,
    /// Treat N as unmatchable instead of substituting random bases
    #[arg(short = 'n', long = "mask-n")]
    mask_n: bool,
    /// Match the reverse complement of the query only
    #[arg(short = 'r', long = "reverse", conflicts_with = "both")]
    reverse: bool,
    /// Match both the query and its reverse complement
    #[arg(short = 'b', long = "both")]
    both: bool,
    /// Report reverse-strand query positions relative to the forward query
    #[arg(short = 'c', long = "rel-query-pos")]
    rel_query_pos: bool,
    /// Always print the reference name column
    #[arg(short = 'F', long = "four-col")]
    four_col: bool,
    /// Print the query length in each header
    #[arg(short = 'L', long = "len-in-header")]
    len_in_header: bool,
    /// Directory under which the temporary work directory is created
    #[arg(short = 'p', long = "work-prefix")]
    work_prefix: Option<PathBuf>,

    // MUMmer compatibility switches, accepted and ignored
    #[arg(long = "mum", hide = true)]
    _mum: bool,
    #[arg(long = "mumcand", hide = true)]
    _mumcand: bool,
    #[arg(long = "mumreference", hide = true)]
    _mumreference: bool,
    #[arg(long = "maxmatch", hide = true)]
    _maxmatch: bool,
    #[arg(short = 's', hide = true)]
    _show_seq: bool,
}

impl Cli {
    fn to_opt(&self) -> MemOpt {
        let strand = if self.both {
            StrandMode::Both
        } else if self.reverse {
            StrandMode::Reverse
        } else {
            StrandMode::Forward
        };
        MemOpt {
            min_len: self.min_len,
            seed_len: self.seed_len,
            split: self.split,
            threads: self.threads,
            mask_n: self.mask_n,
            strand,
            rel_query_pos: self.rel_query_pos,
            four_col: self.four_col,
            len_in_header: self.len_in_header,
            work_prefix: self.work_prefix.clone(),
        }
    }
}

/// Rewrite `-maxmatch` style flags to `--maxmatch` so clap accepts them.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    args.into_iter()
        .map(|a| match a.to_str() {
            Some(s) if MUMMER_LONG_FLAGS.contains(&s) => OsString::from(format!("-{}", s)),
            _ => a,
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    let opt = cli.to_opt();
    let params = opt.resolve()?;
    let report = find_mems(&opt, &cli.reference, &cli.query)?;

    let stdout = std::io::stdout();
    let mut writer = MummerWriter::new(BufWriter::new(stdout.lock()), &params);
    writer.write_report(&report)
}
