// ------------------------------------------------------------
// Double pendulum viewer
// ------------------------------------------------------------
// Loads a precomputed trajectory from CSV and animates it.
//
// Input CSV:
//   header must contain x1, y1, x2, y2 (bob positions, pivot at origin)
//   every other column is shown as a per-frame statistic, in header order
//
// Usage:
//   double_pendulum <trajectory.csv> [--save] [--axes] [--quiet] [--no-show]
//                   [--dt=<seconds>] [--trace=<fraction>]
//
// Output (with --save):
//   double_pendulum.html in the working directory
// ------------------------------------------------------------

use anyhow::{Context, Result};
use double_pendulum_viz::{
    visualize_double_pendulum, BobPath, RenderOptions, Statistic, Trajectory,
};
use std::path::{Path, PathBuf};

const USAGE: &str = "usage: double_pendulum <trajectory.csv> [--save] [--axes] [--quiet] \
                     [--no-show] [--dt=<seconds>] [--trace=<fraction>]";

const BOB_COLUMNS: [&str; 4] = ["x1", "y1", "x2", "y2"];

// ------------------------------------------------------------
// CSV reader
// ------------------------------------------------------------
fn read_trajectory(filename: &Path) -> Result<(Trajectory, Vec<Statistic>)> {
    let mut rdr = csv::Reader::from_path(filename)
        .with_context(|| format!("CSV: cannot open {}", filename.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .context("CSV: cannot read header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut bob_idx = [0usize; 4];
    for (slot, name) in bob_idx.iter_mut().zip(BOB_COLUMNS) {
        *slot = headers
            .iter()
            .position(|h| h == name)
            .with_context(|| format!("CSV: missing column `{}`", name))?;
    }

    let stat_idx: Vec<usize> = (0..headers.len())
        .filter(|k| !bob_idx.contains(k))
        .collect();

    let mut cols: Vec<Vec<f64>> = vec![Vec::new(); headers.len()];
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("CSV: bad record {}", row + 1))?;
        for (k, col) in cols.iter_mut().enumerate() {
            let field = record
                .get(k)
                .with_context(|| format!("CSV: record {} is missing `{}`", row + 1, headers[k]))?;
            let value: f64 = field.trim().parse().with_context(|| {
                format!(
                    "CSV: record {} column `{}`: `{}` is not a number",
                    row + 1,
                    headers[k],
                    field
                )
            })?;
            col.push(value);
        }
    }

    let mut take = |k: usize| std::mem::take(&mut cols[k]);
    let bob1 = BobPath::new(take(bob_idx[0]), take(bob_idx[1]));
    let bob2 = BobPath::new(take(bob_idx[2]), take(bob_idx[3]));
    let stats = stat_idx
        .into_iter()
        .map(|k| Statistic::new(headers[k].clone(), take(k)))
        .collect();

    Ok((Trajectory::new(bob1, bob2), stats))
}

// Value of a `--name=value` flag.
fn flag_value(args: &[String], name: &str) -> Result<Option<f64>> {
    let prefix = format!("--{}=", name);
    match args.iter().find_map(|a| a.strip_prefix(&prefix)) {
        Some(v) => Ok(Some(
            v.parse()
                .with_context(|| format!("--{}: `{}` is not a number", name, v))?,
        )),
        None => Ok(None),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let input = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .context(USAGE)?;

    let defaults = RenderOptions::default();
    let options = RenderOptions {
        dt: flag_value(&args, "dt")?.unwrap_or(defaults.dt),
        trace_len: flag_value(&args, "trace")?.unwrap_or(defaults.trace_len),
        save: args.iter().any(|a| a == "--save"),
        verbose: !args.iter().any(|a| a == "--quiet"),
        axes: args.iter().any(|a| a == "--axes"),
        show: !args.iter().any(|a| a == "--no-show"),
    };

    let (trajectory, stats) = read_trajectory(&input)?;
    log::info!(
        "loaded {} frames and {} statistics from {}",
        trajectory.len(),
        stats.len(),
        input.display()
    );

    let stats = if stats.is_empty() { None } else { Some(stats) };
    let animation = visualize_double_pendulum(trajectory, stats, &options)
        .context("Failed to render animation")?;

    if options.verbose {
        println!(
            "Done: {} frames, extent +/-{:.3}",
            animation.frame_count(),
            animation.layout().l_max
        );
    }
    Ok(())
}
