//! Terminal progress bars for epoch and batch iteration

use std::io::{self, Write};
use std::time::Instant;

const BAR_WIDTH: usize = 30;

/// Format a duration in seconds as a compact human string.
pub fn format_duration(secs: f64) -> String {
    if secs < 60.0 {
        format!("{secs:.0}s")
    } else if secs < 3600.0 {
        let minutes = (secs / 60.0).floor();
        let rem = (secs % 60.0).floor();
        format!("{minutes:.0}m {rem:02.0}s")
    } else {
        let hours = (secs / 3600.0).floor();
        let minutes = ((secs % 3600.0) / 60.0).floor();
        format!("{hours:.0}h {minutes:02.0}m")
    }
}

/// In-place progress bar drawn to stderr.
///
/// Rendering never fails the caller: terminal write errors are dropped the
/// same way logging drops them.
pub struct ProgressBar {
    label: String,
    total: usize,
    current: usize,
    started: Instant,
}

impl ProgressBar {
    pub fn new(label: impl Into<String>, total: usize) -> Self {
        Self {
            label: label.into(),
            total,
            current: 0,
            started: Instant::now(),
        }
    }

    /// Advance by one unit and redraw.
    pub fn advance(&mut self) {
        self.current += 1;
        self.draw();
    }

    #[must_use]
    pub fn current(&self) -> usize {
        self.current
    }

    /// Render the bar line. A zero total renders as complete.
    #[must_use]
    pub fn render(&self) -> String {
        let percent = if self.total == 0 {
            100.0
        } else {
            self.current as f64 / self.total as f64 * 100.0
        };

        let filled = if self.total == 0 {
            BAR_WIDTH
        } else {
            (self.current * BAR_WIDTH / self.total).min(BAR_WIDTH)
        };
        let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

        let eta = if self.current == 0 || self.current >= self.total {
            "--".to_string()
        } else {
            let elapsed = self.started.elapsed().as_secs_f64();
            let remaining = elapsed / self.current as f64 * (self.total - self.current) as f64;
            format_duration(remaining)
        };

        format!("{} [{bar}] {percent:>5.1}% │ ETA: {eta}", self.label)
    }

    fn draw(&self) {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "\r{}", self.render());
        let _ = stderr.flush();
    }

    /// Draw the final state and move to the next line.
    pub fn finish(&self) {
        let mut stderr = io::stderr();
        let _ = writeln!(stderr, "\r{}", self.render());
        let _ = stderr.flush();
    }

    /// Wipe the bar from the current line.
    pub fn clear(&self) {
        let mut stderr = io::stderr();
        let width = self.render().chars().count();
        let _ = write!(stderr, "\r{}\r", " ".repeat(width));
        let _ = stderr.flush();
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_duration_unit_matches_magnitude(secs in 0.0f64..1e6) {
            let rendered = format_duration(secs);
            prop_assert!(!rendered.is_empty());
            if secs < 60.0 {
                prop_assert!(rendered.ends_with('s') && !rendered.contains('m'));
            } else if secs < 3600.0 {
                prop_assert!(rendered.contains('m') && rendered.ends_with('s'));
            } else {
                prop_assert!(rendered.contains('h') && rendered.ends_with('m'));
            }
        }

        #[test]
        fn prop_duration_trailing_field_never_carries(secs in 60.0f64..1e6) {
            let rendered = format_duration(secs);
            let trailing: u64 = rendered
                .rsplit(' ')
                .next()
                .unwrap()
                .trim_end_matches(['s', 'm'])
                .parse()
                .unwrap();
            prop_assert!(trailing < 60, "trailing field out of range in {rendered:?}");
        }
    }
}
