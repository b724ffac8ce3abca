use std::time::Duration;
use url::Url;

use crate::config::Config;
use crate::runner::{ LatencySample, Outcome };
use crate::stats::Summary;

const FIELD_WIDTH: usize = 24; //  width of each field for formatting print
const COLUMN_PADDING: usize = 3; // spaces before each table cell

/// Accounting for one run, filled from the result queue after the workers exit.
#[derive(Debug, Default)]
pub struct RunReport {
    pub requests: usize, // tickets dispatched
    pub concurrency: usize, // concurrency level
    pub failed: usize, // transport errors, no sample recorded
    pub timeouts: usize, // subset of failed
    pub non_2xx: usize, // successful cycles with a non 2.x.x status (still sampled)

    pub duration: Duration, // total duration of the run

    pub samples: Vec<LatencySample>, // in arrival order
}

impl RunReport {
    pub fn new(requests: usize, concurrency: usize, duration: Duration) -> Self {
        RunReport {
            requests,
            concurrency,
            duration,
            samples: Vec::with_capacity(requests),
            ..Default::default()
        }
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Sample(sample) => {
                if sample.status / 100 != 2 {
                    self.non_2xx += 1;
                }
                self.samples.push(sample);
            }
            Outcome::Failed { timeout, .. } => {
                self.failed += 1;
                if timeout {
                    self.timeouts += 1;
                }
            }
        }
    }

    pub fn completed(&self) -> usize {
        self.samples.len()
    }

    /// Latencies in microseconds, arrival order
    pub fn latencies_us(&self) -> Vec<f64> {
        self.samples
            .iter()
            .map(LatencySample::micros)
            .collect()
    }
}

/*---------= Everything related to printing =----------*/
/// Printed before the run starts
pub fn print_banner(config: &Config) {
    println!("Starting Benchmark: {}", config.name);
    println!(
        "   URL: {} | Reqs: {} | Concurrency: {}",
        config.url,
        config.requests,
        config.concurrency
    );
    if let Ok(parsed_url) = Url::parse(&config.url) {
        println!(
            "   Host: {} | Port: {}",
            parsed_url.host_str().unwrap_or_default(),
            parsed_url.port_or_known_default().unwrap_or(80)
        );
    }
    println!();
}

/// Completed/failed counts, printed whether or not any request succeeded
pub fn print_details(report: &RunReport) {
    print!("{}", render_details(report));
}

pub fn print_table(summary: &Summary) {
    print!("{}", render_table(summary));
}

pub fn render_details(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str(
        &format!("{:<FIELD_WIDTH$}{}\n", "Completed Requests:", report.completed())
    );
    if report.failed > 0 {
        out.push_str(
            &format!("{:<FIELD_WIDTH$}{} (including timeouts)\n", "Failed Requests:", report.failed)
        );
        out.push_str(&format!("{:<FIELD_WIDTH$}{}\n", "Timeouts:", report.timeouts));
    }
    if report.non_2xx > 0 {
        out.push_str(&format!("{:<FIELD_WIDTH$}{}\n", "Non 2.x.x Responses:", report.non_2xx));
    }
    out.push('\n');
    out
}

/// Right aligned table: metric, value in µs, value in ms
pub fn render_table(summary: &Summary) -> String {
    let mut rows: Vec<[String; 3]> = vec![
        ["Metric".into(), "Value (µs)".into(), "Value (ms)".into()],
        ["Total Time".into(), "-".into(), format!("{:.2}s", summary.total.as_secs_f64())],
        ["Requests/sec".into(), "-".into(), format!("{:.2}", summary.throughput)]
    ];
    for (label, value) in [
        ("Min", summary.min),
        ("Average", summary.mean),
        ("P50 (Median)", summary.p50),
        ("P95", summary.p95),
        ("P99", summary.p99),
        ("Max", summary.max),
    ] {
        rows.push([
            label.to_string(),
            format!("{:.2} µs", value),
            format!("{:.3} ms", value / 1000.0),
        ]);
    }

    // chars, not bytes: µ is two bytes wide
    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count() + COLUMN_PADDING);
        }
    }

    let mut out = String::new();
    for row in &rows {
        for (width, cell) in widths.iter().zip(row) {
            out.push_str(&format!("{:>width$}|", cell, width = *width));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ticket: usize, micros: u64, status: u16) -> Outcome {
        Outcome::Sample(LatencySample {
            ticket,
            latency: Duration::from_micros(micros),
            status,
        })
    }

    #[test]
    fn record_splits_samples_and_failures() {
        let mut report = RunReport::new(5, 2, Duration::from_millis(10));
        report.record(sample(0, 150, 200));
        report.record(sample(1, 90, 503));
        report.record(Outcome::Failed { ticket: 2, timeout: true });
        report.record(Outcome::Failed { ticket: 3, timeout: false });
        report.record(sample(4, 120, 201));

        assert_eq!(report.completed(), 3);
        assert_eq!(report.failed, 2);
        assert_eq!(report.timeouts, 1);
        assert_eq!(report.non_2xx, 1);
        assert_eq!(report.latencies_us(), vec![150.0, 90.0, 120.0]);
    }

    #[test]
    fn details_only_mention_failures_when_present() {
        let mut report = RunReport::new(1, 1, Duration::from_millis(1));
        report.record(sample(0, 10, 200));
        let clean = render_details(&report);
        assert!(clean.contains("Completed Requests:"));
        assert!(!clean.contains("Failed Requests:"));

        report.record(Outcome::Failed { ticket: 1, timeout: false });
        let failed = render_details(&report);
        assert!(failed.contains("Failed Requests:"));
        assert!(failed.contains("1 (including timeouts)"));
        assert!(failed.contains("Timeouts:"));
    }

    #[test]
    fn table_has_every_metric_aligned() {
        let summary = Summary {
            count: 3,
            min: 130.0,
            max: 2500.0,
            mean: 1000.0,
            p50: 370.0,
            p95: 2500.0,
            p99: 2500.0,
            total: Duration::from_millis(1500),
            throughput: 2.0,
        };
        let table = render_table(&summary);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 9);

        let labels = [
            "Metric",
            "Total Time",
            "Requests/sec",
            "Min",
            "Average",
            "P50 (Median)",
            "P95",
            "P99",
            "Max",
        ];
        for (line, label) in lines.iter().zip(labels) {
            assert!(line.contains(label), "{:?} missing {:?}", line, label);
        }

        assert!(table.contains("1.50s"));
        assert!(table.contains("2.00|"));
        assert!(lines[3].contains("130.00 µs|"));
        assert!(lines[3].contains("0.130 ms|"));
        assert!(lines[8].contains("2.500 ms|"));

        let width = lines[0].chars().count();
        assert!(lines.iter().all(|line| line.chars().count() == width));
    }
}
