//! Pipeline diagnostics: timing and counts for each stage.
//!
//! Timestamps come from a [`Clock`] so tests can inject a deterministic
//! source. [`SystemClock`] wraps [`std::time::Instant`].
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Monotonic time source.
///
/// `now` returns the time elapsed since an arbitrary fixed origin; only
/// differences between two readings are meaningful.
pub trait Clock {
    /// Current reading.
    fn now(&self) -> Duration;
}

/// [`Clock`] backed by [`Instant`], with its origin at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: graph construction.
    pub build_graph: StageDiagnostics,
    /// Stage 2: degree classification.
    pub classify: StageDiagnostics,
    /// Stage 3: polyline extraction.
    pub extract: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Graph construction metrics.
    BuildGraph {
        /// Segments supplied.
        segments: usize,
        /// Segments dropped as zero-length.
        degenerate: usize,
        /// Distinct points.
        points: usize,
        /// Distinct edge keys.
        edge_keys: usize,
    },
    /// Degree classification metrics.
    Classify {
        /// Threshold used for junctions.
        junction_threshold: usize,
        /// Degree-1 points.
        endpoints: usize,
        /// Junction points.
        junctions: usize,
    },
    /// Extraction metrics.
    Extract {
        /// Polylines produced.
        polylines: usize,
        /// Traced from endpoints.
        from_endpoints: usize,
        /// Traced from junctions.
        from_junctions: usize,
        /// Closed loops from the final sweep.
        loops: usize,
    },
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());
        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Build Graph", &self.build_graph),
            ("Classify", &self.classify),
            ("Extract", &self.extract),
        ];
        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::BuildGraph {
            segments,
            degenerate,
            points,
            edge_keys,
        } => format!("{segments} segs ({degenerate} degenerate) -> {points} pts, {edge_keys} edges"),
        StageMetrics::Classify {
            junction_threshold,
            endpoints,
            junctions,
        } => format!("threshold={junction_threshold} endpoints={endpoints} junctions={junctions}"),
        StageMetrics::Extract {
            polylines,
            from_endpoints,
            from_junctions,
            loops,
        } => format!(
            "{polylines} polylines (endpoints={from_endpoints} junctions={from_junctions} loops={loops})"
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> PipelineDiagnostics {
        PipelineDiagnostics {
            build_graph: StageDiagnostics {
                duration: Duration::from_millis(2),
                metrics: StageMetrics::BuildGraph {
                    segments: 10,
                    degenerate: 1,
                    points: 9,
                    edge_keys: 9,
                },
            },
            classify: StageDiagnostics {
                duration: Duration::from_millis(1),
                metrics: StageMetrics::Classify {
                    junction_threshold: 3,
                    endpoints: 2,
                    junctions: 0,
                },
            },
            extract: StageDiagnostics {
                duration: Duration::from_millis(1),
                metrics: StageMetrics::Extract {
                    polylines: 1,
                    from_endpoints: 1,
                    from_junctions: 0,
                    loops: 0,
                },
            },
            total_duration: Duration::from_millis(4),
        }
    }

    #[test]
    fn report_lists_every_stage() {
        let report = sample().report();
        assert!(report.contains("Total duration: 4.000ms"));
        assert!(report.contains("Build Graph"));
        assert!(report.contains("Classify"));
        assert!(report.contains("Extract"));
        assert!(report.contains("50.0%"));
        assert!(report.contains("10 segs (1 degenerate)"));
    }

    #[test]
    fn zero_total_does_not_divide_by_zero() {
        let mut diag = sample();
        diag.total_duration = Duration::ZERO;
        assert!(diag.report().contains("0.0%"));
    }

    #[test]
    fn durations_serialize_as_seconds() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["total_duration"], serde_json::json!(0.004));
        let back: PipelineDiagnostics = serde_json::from_value(json).unwrap();
        assert_eq!(back.total_duration, Duration::from_millis(4));
        assert_eq!(back.extract.metrics, sample().extract.metrics);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["total_duration"] = serde_json::json!(-1.0);
        assert!(serde_json::from_value::<PipelineDiagnostics>(json).is_err());
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
