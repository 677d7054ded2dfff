//! Sequence Learning Trace Tool
//!
//! Feeds a fixed random sequence of column sets to a `SequenceMemory`
//! repeatedly and logs, per pass, how well each element was predicted.
//! Optionally supplies the element's position as apical context so the
//! effect of the apical tiebreak on ambiguous sequences can be observed.
//!
//! Usage:
//!   cargo run --release --bin tm_trace -- [OPTIONS]
//!
//! Options:
//!   --length <n>       Number of elements in the sequence (default 10)
//!   --passes <n>       Number of passes over the sequence (default 10)
//!   --columns <n>      Number of minicolumns (default 512)
//!   --cells <n>        Cells per minicolumn (default 16)
//!   --active <n>       Active columns per element (default 20)
//!   --seed <n>         Random seed (default 42)
//!   --apical           Provide the element position as apical input
//!   --no-tiebreak      Disable the apical tiebreak
//!
//! Set `RUST_LOG=debug` (or `trace`) for per-step detail from the memory.

use std::io;
use std::str::FromStr;

use tiebreak_tm::prelude::*;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Apical bits reserved per sequence position.
const APICAL_BITS_PER_POSITION: u32 = 8;

#[derive(Debug, Clone)]
struct TraceOptions {
    length: usize,
    passes: usize,
    columns: u32,
    cells: u32,
    active: usize,
    seed: u64,
    apical: bool,
    tiebreak: bool,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            length: 10,
            passes: 10,
            columns: 512,
            cells: 16,
            active: 20,
            seed: 42,
            apical: false,
            tiebreak: true,
        }
    }
}

fn parse_value<T: FromStr>(args: &[String], i: &mut usize, flag: &str, target: &mut T) {
    *i += 1;
    match args.get(*i).map(|s| s.parse::<T>()) {
        Some(Ok(value)) => *target = value,
        _ => eprintln!("Missing or invalid value for {flag}, keeping default"),
    }
}

fn print_help() {
    println!("Usage: tm_trace [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --length <n>       Number of elements in the sequence (default 10)");
    println!("  --passes <n>       Number of passes over the sequence (default 10)");
    println!("  --columns <n>      Number of minicolumns (default 512)");
    println!("  --cells <n>        Cells per minicolumn (default 16)");
    println!("  --active <n>       Active columns per element (default 20)");
    println!("  --seed <n>         Random seed (default 42)");
    println!("  --apical           Provide the element position as apical input");
    println!("  --no-tiebreak      Disable the apical tiebreak");
    println!("  --help, -h         Show this help message");
}

/// Returns `None` when help was requested.
fn parse_args() -> Option<TraceOptions> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = TraceOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--length" => parse_value(&args, &mut i, "--length", &mut options.length),
            "--passes" => parse_value(&args, &mut i, "--passes", &mut options.passes),
            "--columns" => parse_value(&args, &mut i, "--columns", &mut options.columns),
            "--cells" => parse_value(&args, &mut i, "--cells", &mut options.cells),
            "--active" => parse_value(&args, &mut i, "--active", &mut options.active),
            "--seed" => parse_value(&args, &mut i, "--seed", &mut options.seed),
            "--apical" => options.apical = true,
            "--no-tiebreak" => options.tiebreak = false,
            "--help" | "-h" => {
                print_help();
                return None;
            }
            other => eprintln!("Unknown option: {other}"),
        }
        i += 1;
    }

    Some(options)
}

/// Builds `length` random column sets of `active` columns each.
fn random_sequence(options: &TraceOptions, rng: &mut Random) -> Vec<Vec<ColumnIdx>> {
    (0..options.length)
        .map(|_| {
            let all: Vec<ColumnIdx> = (0..options.columns).collect();
            let mut element = rng.sample(all, options.active);
            element.sort_unstable();
            element
        })
        .collect()
}

fn apical_for_position(position: usize) -> Vec<ElemSparse> {
    let start = position as u32 * APICAL_BITS_PER_POSITION;
    (start..start + APICAL_BITS_PER_POSITION).collect()
}

/// Fraction of active columns that contained a predicted cell.
fn prediction_accuracy(memory: &SequenceMemory, active_columns: &[ColumnIdx]) -> f64 {
    if active_columns.is_empty() {
        return 1.0;
    }
    let mut columns: Vec<ColumnIdx> = memory
        .predicted_active_cells()
        .iter()
        .map(|&cell| memory.cell_column(cell))
        .collect();
    columns.dedup();
    columns.len() as f64 / active_columns.len() as f64
}

fn main() -> Result<()> {
    let Some(options) = parse_args() else {
        return Ok(());
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    info!(?options, "tiebreak-tm v{} sequence trace", tiebreak_tm::VERSION);

    let apical_input_size = if options.apical {
        options.length as u32 * APICAL_BITS_PER_POSITION
    } else {
        0
    };

    let mut memory = SequenceMemory::new(ApicalTiebreakParams {
        column_count: options.columns,
        cells_per_column: options.cells,
        apical_input_size,
        activation_threshold: 8,
        reduced_basal_threshold: 6,
        min_threshold: 6,
        sample_size: options.active as i32,
        initial_permanence: 0.21,
        connected_permanence: 0.5,
        seed: options.seed,
        use_apical_tiebreak: options.tiebreak,
        ..Default::default()
    })?;

    let mut rng = Random::new(options.seed.wrapping_add(1));
    let sequence = random_sequence(&options, &mut rng);

    for pass in 0..options.passes {
        memory.reset();
        let mut total = 0.0;

        for (position, element) in sequence.iter().enumerate() {
            let apical = if options.apical {
                apical_for_position(position)
            } else {
                Vec::new()
            };
            memory.compute(element, &apical, None, true)?;

            // The first element has no context to be predicted from.
            if position > 0 {
                total += prediction_accuracy(&memory, element);
            }
        }

        let scored = sequence.len().saturating_sub(1).max(1) as f64;
        info!(
            pass,
            accuracy = total / scored,
            basal_segments = memory.basal_connections().num_segments(),
            basal_synapses = memory.basal_connections().num_synapses(),
            apical_segments = memory.apical_connections().num_segments(),
            "pass complete"
        );
    }

    Ok(())
}
