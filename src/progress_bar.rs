//! Timing and progress helpers for long fork-join runs.
//!
//! Components
//! -----------------
//! * [`fmt_dur`] – Human-readable formatter for [`Duration`] values,
//!   producing strings like `"253µs"`, `"42ms"`, or `"3.14s"` depending
//!   on the scale. Used in the run summaries logged by the engine.
//!
//! * `partition_bar` – A live [`indicatif`] progress bar ticking once per finished
//!   partition. Only compiled with the `progress` feature.
use std::time::Duration;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

#[inline]
pub fn fmt_dur(d: Duration) -> String {
    let us = d.as_micros();
    if us < 1_000 {
        format!("{us}µs")
    } else {
        let ms = d.as_millis();
        if ms < 1_000 {
            format!("{ms}ms")
        } else {
            let s = d.as_secs_f32();
            format!("{s:.2}s")
        }
    }
}

/// Progress bar over `len` partitions, labelled with the running stage.
///
/// Falls back to the default style if the template is rejected.
#[cfg(feature = "progress")]
pub(crate) fn partition_bar(len: usize, label: &'static str) -> ProgressBar {
    let pb = ProgressBar::new((len as u64).max(1));
    if let Ok(style) = ProgressStyle::with_template(
        "{msg} {bar:40.cyan/blue} {pos}/{len} partitions ({percent:>3}%) | ETA {eta_precise}",
    ) {
        pb.set_style(style);
    }
    pb.set_message(label);
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}

#[cfg(test)]
mod progress_bar_test {
    use super::*;

    #[test]
    fn test_fmt_dur() {
        assert_eq!(fmt_dur(Duration::from_micros(253)), "253µs");
        assert_eq!(fmt_dur(Duration::from_millis(42)), "42ms");
        assert_eq!(fmt_dur(Duration::from_millis(3140)), "3.14s");
    }
}
