//! Keccak Oracle CLI.
//!
//! Every command prints exactly one JSON line on stdout: `{"ok":{...}}` on
//! success or `{"err":{"code":N,"name":"..."}}` with exit status 1.
//! Diagnostics go to stderr, filtered by `RUST_LOG`.

use clap::{Parser, Subcommand};
use keccak_oracle::conformance::{ConformanceError, CorpusRunner, TestResult};
use keccak_oracle::keccak::{permute_with_trace, Digest, State, LANE_BYTES, STATE_WORDS};
use keccak_oracle::{ErrorCode, OracleResult, PaddingRule, Sponge};
use serde_json::{json, Value};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Upper bound for `--chunk-size` (1 MiB).
const MAX_CHUNK_SIZE: u64 = 1 << 20;

/// Upper bound for `--iterations` when `--trace` is set.
const MAX_TRACE_ITERATIONS: u64 = 1024;

#[derive(Parser)]
#[command(name = "keccak-oracle")]
#[command(about = "Keccak-f[1600] sponge hashing (SHA3 and legacy Keccak)", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args)]
struct HashArgs {
    /// Output width in bits (256, 384 or 512)
    #[arg(long, default_value_t = 256)]
    bits: u64,

    /// Padding rule: sha3 or keccak
    #[arg(long, default_value = "sha3")]
    padding: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information
    Version,

    /// Hash a file (or stdin)
    Digest {
        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        #[command(flatten)]
        hash: HashArgs,

        /// Bytes read per absorb call
        #[arg(long, default_value_t = 8192, value_parser = clap::value_parser!(u64).range(1..=MAX_CHUNK_SIZE))]
        chunk_size: u64,
    },

    /// Hash a file (or stdin) and compare against an expected digest
    Verify {
        /// Expected digest as hex
        #[arg(long)]
        expected: String,

        /// Input file; stdin when omitted
        file: Option<PathBuf>,

        #[command(flatten)]
        hash: HashArgs,
    },

    /// Apply Keccak-f[1600] to a state
    Permute {
        /// 200-byte state as 400 hex chars, lanes little-endian; zero when omitted
        #[arg(long)]
        state: Option<String>,

        /// Number of permutations to apply
        #[arg(long, default_value_t = 1)]
        iterations: u64,

        /// Also print the state after every round
        #[arg(long)]
        trace: bool,
    },

    /// Run a conformance corpus
    Corpus {
        /// Path to corpus JSON
        path: PathBuf,

        /// Write a repro report per failing vector into this directory
        #[arg(long)]
        repro_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Some(Commands::Version) | None => Ok((
            json!({
                "name": "keccak-oracle",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            true,
        )),
        Some(Commands::Digest {
            file,
            hash,
            chunk_size,
        }) => run_digest(file.as_deref(), &hash, chunk_size as usize).map(|v| (v, true)),
        Some(Commands::Verify {
            expected,
            file,
            hash,
        }) => run_verify(&expected, file.as_deref(), &hash),
        Some(Commands::Permute {
            state,
            iterations,
            trace,
        }) => run_permute(state.as_deref(), iterations, trace).map(|v| (v, true)),
        Some(Commands::Corpus { path, repro_dir }) => run_corpus(&path, repro_dir.as_deref()),
    };

    match outcome {
        Ok((value, success)) => {
            println!("{}", json!({ "ok": value }));
            if success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "command failed");
            println!("{}", json!({ "err": { "code": e.code(), "name": e.name() } }));
            ExitCode::FAILURE
        }
    }
}

impl HashArgs {
    fn sponge(&self) -> OracleResult<Sponge> {
        let padding: PaddingRule = self.padding.parse()?;
        Sponge::with_bits(self.bits, padding)
    }
}

fn open_input(file: Option<&Path>) -> OracleResult<Box<dyn Read>> {
    Ok(match file {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    })
}

/// Absorb everything `reader` yields, `chunk_size` bytes at a time.
fn absorb_all(sponge: &mut Sponge, mut reader: impl Read, chunk_size: usize) -> OracleResult<u64> {
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        sponge.absorb(&buf[..n]);
        total += n as u64;
    }
}

fn run_digest(file: Option<&Path>, args: &HashArgs, chunk_size: usize) -> OracleResult<Value> {
    let mut sponge = args.sponge()?;
    let (bits, padding) = (sponge.width(), sponge.padding());
    let len = absorb_all(&mut sponge, open_input(file)?, chunk_size)?;
    Ok(json!({
        "digest": sponge.finalize(),
        "bits": bits,
        "padding": padding,
        "input_len": len,
    }))
}

fn run_verify(
    expected: &str,
    file: Option<&Path>,
    args: &HashArgs,
) -> OracleResult<(Value, bool)> {
    let mut sponge = args.sponge()?;
    let expected = Digest::from_hex(expected)?;
    let want = sponge.width().digest_len();
    if expected.len() != want {
        return Err(ErrorCode::E104_WrongLength(
            format!("{} bytes", want),
            expected.len() as u64,
        ));
    }
    absorb_all(&mut sponge, open_input(file)?, 8192)?;
    let actual = sponge.finalize();
    let valid = actual == expected;
    Ok((json!({ "valid": valid, "digest": actual }), valid))
}

fn parse_state(hex_str: &str) -> OracleResult<State> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    let bytes = hex::decode(hex_str).map_err(|_| ErrorCode::E103_InvalidHex)?;
    if bytes.len() != STATE_WORDS * LANE_BYTES {
        return Err(ErrorCode::E104_WrongLength(
            format!("{} bytes", STATE_WORDS * LANE_BYTES),
            bytes.len() as u64,
        ));
    }
    let mut state = [0u64; STATE_WORDS];
    for (lane, chunk) in state.iter_mut().zip(bytes.chunks_exact(LANE_BYTES)) {
        let mut word = [0u8; LANE_BYTES];
        word.copy_from_slice(chunk);
        *lane = u64::from_le_bytes(word);
    }
    Ok(state)
}

fn state_hex(state: &State) -> String {
    let bytes: Vec<u8> = state.iter().flat_map(|lane| lane.to_le_bytes()).collect();
    hex::encode(bytes)
}

fn run_permute(state: Option<&str>, iterations: u64, trace: bool) -> OracleResult<Value> {
    let mut current = match state {
        Some(s) => parse_state(s)?,
        None => [0u64; STATE_WORDS],
    };
    if trace && iterations > MAX_TRACE_ITERATIONS {
        return Err(ErrorCode::E102_InputTooLarge(
            "iterations".to_string(),
            MAX_TRACE_ITERATIONS,
        ));
    }
    let mut rounds = Vec::new();
    for _ in 0..iterations {
        let (next, steps) = permute_with_trace(&current);
        if trace {
            rounds.extend(steps.iter().map(state_hex));
        }
        current = next;
    }

    let mut out = json!({ "state": state_hex(&current), "iterations": iterations });
    if trace {
        out["rounds"] = json!(rounds);
    }
    Ok(out)
}

fn run_corpus(path: &Path, repro_dir: Option<&Path>) -> OracleResult<(Value, bool)> {
    let runner = CorpusRunner::load(path).map_err(|e| match e {
        ConformanceError::CorpusParseError(_) => ErrorCode::E100_InvalidJSON,
        other => ErrorCode::E101_InputUnreadable(other.to_string()),
    })?;
    let results = runner.run_all();

    let mut repro_files = Vec::new();
    if let Some(dir) = repro_dir {
        let bundles = runner.repro_bundles(&results);
        if !bundles.is_empty() {
            fs::create_dir_all(dir)?;
        }
        for bundle in bundles {
            let file = dir.join(bundle.file_name());
            bundle.save(&file)?;
            repro_files.push(file.display().to_string());
        }
    }

    let failures: Vec<&str> = results
        .details
        .iter()
        .filter(|(_, r)| !r.is_pass() && !matches!(r, TestResult::Skip { .. }))
        .map(|(id, _)| id.as_str())
        .collect();

    let all_passed = results.all_passed();
    Ok((
        json!({
            "corpus_version": runner.manifest().version,
            "passed": results.passed,
            "failed": results.failed,
            "skipped": results.skipped,
            "errors": results.errors,
            "total": results.total(),
            "all_passed": all_passed,
            "failures": failures,
            "repro_files": repro_files,
        }),
        all_passed,
    ))
}
