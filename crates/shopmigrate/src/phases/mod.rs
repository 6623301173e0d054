//! Phase migrators, one per entity kind.
//!
//! The pipeline runs them strictly in dependency order: products and users
//! first (they register id mappings), orders last (they resolve against
//! those mappings). Within a phase, records are processed one at a time and
//! an individual failure never aborts the loop.

pub mod order;
pub mod product;
pub mod user;

use indicatif::{ProgressBar, ProgressStyle};

/// Cadence of the running-count diagnostic inside a phase.
const PROGRESS_EVERY: u64 = 10;

fn phase_progress_bar(total: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} {msg:>8} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(label.to_string());
    pb
}
