//! Map workload benchmark
//!
//! This module provides the `map-bench` subcommand. It times two workloads
//! against each selected map and writes one result file per workload:
//!
//! - `append`: `size` writes of `"test"` under random keys, into one map
//!   that is reused across the repeats
//! - `remove_front`: `size` removals of the first entry from one large
//!   prefilled map, again reused across the repeats
//!
//! Every line of a result file is `<size> <average nanoseconds>`.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use twinmap::collections::{BucketMap, OrderedMap};
use twinmap::error::MapError;
use twinmap::mapping::Mapping;

/// Which maps to benchmark
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MapKind {
    /// BucketMap only
    Bucket,
    /// OrderedMap only
    Ordered,
    /// Both maps, BucketMap first
    Both,
}

/// Arguments for the map-bench subcommand
#[derive(Args, Debug)]
pub struct MapBenchArgs {
    /// Map to benchmark
    #[arg(long, value_enum, default_value_t = MapKind::Both)]
    pub map: MapKind,

    /// Workload sizes run from 0 up to (excluding) this value
    #[arg(long, default_value_t = 100)]
    pub max_size: usize,

    /// Timed repetitions averaged per workload size
    #[arg(long, default_value_t = 100)]
    pub repeats: u32,

    /// Keys of the append workload are drawn from 0..key-range
    #[arg(long, default_value_t = 1000)]
    pub key_range: u32,

    /// Random writes used to fill the map before the remove-front workload
    #[arg(long, default_value_t = 100_000)]
    pub prefill: usize,

    /// Keys of the prefill are drawn from 0..prefill-key-range
    #[arg(long, default_value_t = 100_000)]
    pub prefill_key_range: u32,

    /// Random seed for reproducible workloads
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory the result files are written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,
}

/// Average time of one workload size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Sample {
    size: usize,
    average_nanos: u128,
}

type Value = &'static str;

const WRITTEN_VALUE: Value = "test";

// =============================================================================
// Workloads
// =============================================================================

fn append_workload<M>(args: &MapBenchArgs, rng: &mut StdRng) -> Vec<Sample>
where
    M: Mapping<u32, Value> + Default,
{
    (0..args.max_size)
        .map(|size| {
            let mut map = M::default();
            let mut total_nanos = 0u128;
            for _ in 0..args.repeats {
                let keys: Vec<u32> = (0..size)
                    .map(|_| rng.gen_range(0..args.key_range))
                    .collect();
                let start = Instant::now();
                for key in keys {
                    *map.get_or_insert(key) = WRITTEN_VALUE;
                }
                total_nanos += start.elapsed().as_nanos();
            }
            Sample {
                size,
                average_nanos: total_nanos / u128::from(args.repeats),
            }
        })
        .collect()
}

fn remove_front_workload<M>(label: &str, args: &MapBenchArgs, rng: &mut StdRng) -> Result<Vec<Sample>>
where
    M: Mapping<u32, Value> + Default,
{
    let mut samples = Vec::with_capacity(args.max_size);
    for size in 0..args.max_size {
        let mut map = M::default();
        for _ in 0..args.prefill {
            *map.get_or_insert(rng.gen_range(0..args.prefill_key_range)) = WRITTEN_VALUE;
        }
        if map.len() < size {
            tracing::warn!(map = label, size, entries = map.len(), "prefilled map is smaller than one workload");
        }

        let mut total_nanos = 0u128;
        let mut exhausted = false;
        for _ in 0..args.repeats {
            let start = Instant::now();
            for _ in 0..size {
                match map.remove_at(map.begin()) {
                    Ok(_) => {}
                    Err(MapError::EmptyMap) => {
                        exhausted = true;
                        break;
                    }
                    Err(error) => {
                        return Err(error).with_context(|| format!("{label}: remove_at(begin()) failed"));
                    }
                }
            }
            total_nanos += start.elapsed().as_nanos();
            if exhausted {
                break;
            }
        }

        if exhausted {
            tracing::warn!(map = label, size, "map emptied during remove-front workload, stopping early");
            break;
        }
        samples.push(Sample {
            size,
            average_nanos: total_nanos / u128::from(args.repeats),
        });
    }
    Ok(samples)
}

// =============================================================================
// Output
// =============================================================================

fn write_samples(path: &Path, samples: &[Sample]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for sample in samples {
        writeln!(writer, "{} {}", sample.size, sample.average_nanos)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))
}

fn bench_map<M>(label: &str, args: &MapBenchArgs, rng: &mut StdRng) -> Result<()>
where
    M: Mapping<u32, Value> + Default,
{
    tracing::info!(map = label, "running append workload");
    let append = append_workload::<M>(args, rng);
    let append_path = args.output_dir.join(format!("{label}_append.txt"));
    write_samples(&append_path, &append)?;
    tracing::info!(map = label, path = %append_path.display(), "wrote append results");

    tracing::info!(map = label, prefill = args.prefill, "running remove-front workload");
    let remove_front = remove_front_workload::<M>(label, args, rng)?;
    let remove_front_path = args.output_dir.join(format!("{label}_remove_front.txt"));
    write_samples(&remove_front_path, &remove_front)?;
    tracing::info!(map = label, path = %remove_front_path.display(), "wrote remove-front results");

    Ok(())
}

/// Run the map-bench subcommand
pub fn run(args: MapBenchArgs) -> Result<()> {
    if args.repeats == 0 {
        bail!("--repeats must be at least 1");
    }
    if args.key_range == 0 || args.prefill_key_range == 0 {
        bail!("--key-range and --prefill-key-range must be at least 1");
    }

    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory {}", args.output_dir.display()))?;

    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, max_size = args.max_size, repeats = args.repeats, "starting map benchmark");
    let mut rng = StdRng::seed_from_u64(seed);

    if args.map != MapKind::Ordered {
        bench_map::<BucketMap<u32, Value>>("bucket", &args, &mut rng)?;
    }
    if args.map != MapKind::Bucket {
        bench_map::<OrderedMap<u32, Value>>("ordered", &args, &mut rng)?;
    }

    Ok(())
}
