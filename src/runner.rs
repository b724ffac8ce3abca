use crate::config::Config;
use crate::error::{ RequestError, RunnerError };
use crate::report::RunReport;
use crate::stats::Summary;

use std::sync::Arc;
use async_channel::Receiver;
use isahc::{ HttpClient, Request, config::Configurable, AsyncReadResponseExt };
use tokio::{ sync::mpsc, task::JoinSet, time::{ Duration, Instant } };
use tracing::{ debug, warn };

/// Sequence number of one request to send, `0..requests`
pub type JobTicket = usize;

/// One successful request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySample {
    pub ticket: JobTicket, // ticket that produced this sample
    pub latency: Duration, // request start until the body was drained
    pub status: u16,
}

impl LatencySample {
    pub fn micros(&self) -> f64 {
        self.latency.as_micros() as f64
    }
}

/// What a worker reports back for every ticket it consumed
#[derive(Debug)]
pub enum Outcome {
    Sample(LatencySample),
    Failed {
        ticket: JobTicket,
        timeout: bool,
    },
}

/// A finished run: raw accounting plus the statistics derived from it.
#[derive(Debug)]
pub struct Benchmark {
    pub report: RunReport,
    pub summary: Option<Summary>, // None when no request succeeded
    pub latencies: Vec<f64>, // sorted ascending, microseconds
}

/// Dispatcher owning the run configuration and the shared HTTP client.
#[derive(Debug, Clone)]
pub struct Runner {
    config: Arc<Config>,
    client: HttpClient, // shared by every worker, pools connections
}

impl Runner {
    /*------------------==| Public Functions |==-------------------------*/
    /// Create a new Runner instance
    pub fn new(config: Config) -> Result<Self, RunnerError> {
        let client = HttpClient::builder().timeout(config.timeout).build()?;

        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every ticket and derive the latency statistics
    pub async fn benchmark(&self) -> Benchmark {
        let report = self.run().await;

        let mut latencies = report.latencies_us();
        let summary = Summary::compute(&mut latencies, report.requests, report.duration);

        Benchmark {
            report,
            summary,
            latencies,
        }
    }

    /// Fill the job queue, close it and wait for every worker to drain it.
    ///
    /// The clock covers queue fill through the last worker exiting.
    pub async fn run(&self) -> RunReport {
        let requests = self.config.requests;
        // both queues hold every ticket so neither side blocks on a full channel
        let capacity = requests.max(1);

        let start = Instant::now();

        let (jobs_tx, jobs_rx) = async_channel::bounded::<JobTicket>(capacity);
        let (results_tx, mut results_rx) = mpsc::channel::<Outcome>(capacity);

        let mut workers = JoinSet::new();
        for id in 0..self.config.concurrency {
            let worker = Worker {
                id,
                client: self.client.clone(),
                config: Arc::clone(&self.config),
                jobs: jobs_rx.clone(),
                results: results_tx.clone(),
            };
            workers.spawn(worker.run());
        }
        // workers hold the only remaining endpoints
        drop(jobs_rx);
        drop(results_tx);
        debug!(workers = self.config.concurrency, "worker pool started");

        for ticket in 0..requests {
            if jobs_tx.send(ticket).await.is_err() {
                warn!(ticket, "job queue closed early, no worker left to receive");
                break;
            }
        }
        jobs_tx.close();
        debug!(requests, "job queue closed");

        // completion barrier
        while let Some(joined) = workers.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "worker task did not finish cleanly");
            }
        }
        let duration = start.elapsed();

        let mut report = RunReport::new(requests, self.config.concurrency, duration);
        while let Some(outcome) = results_rx.recv().await {
            report.record(outcome);
        }
        debug!(samples = report.samples.len(), failed = report.failed, "result queue drained");

        report
    }
}

/// Long-lived worker bound to the job queue and the result queue.
struct Worker {
    id: usize,
    client: HttpClient,
    config: Arc<Config>,
    jobs: Receiver<JobTicket>,
    results: mpsc::Sender<Outcome>,
}

impl Worker {
    // exits once the job queue is closed and empty
    async fn run(self) {
        while let Ok(ticket) = self.jobs.recv().await {
            let outcome = self.send_request(ticket).await;
            if self.results.send(outcome).await.is_err() {
                break;
            }
        }
        debug!(worker = self.id, "worker terminated");
    }

    /// Send the request, a failure is logged and never retried
    async fn send_request(&self, ticket: JobTicket) -> Outcome {
        let start = Instant::now();

        match self.post().await {
            Ok(status) =>
                Outcome::Sample(LatencySample {
                    ticket,
                    latency: start.elapsed(),
                    status,
                }),
            Err(err) => {
                warn!(worker = self.id, ticket, error = %err, "request failed");
                Outcome::Failed {
                    ticket,
                    timeout: err.is_timeout(),
                }
            }
        }
    }

    async fn post(&self) -> Result<u16, RequestError> {
        let request = Request::post(self.config.url.as_str())
            .header("content-type", self.config.content_type.as_str())
            .body(self.config.body.clone())?;

        let mut response = self.client.send_async(request).await?;
        // drain so the connection goes back to the pool
        response.consume().await?;

        Ok(response.status().as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}/api/bench", addr)
    }

    fn runner(requests: usize, concurrency: usize) -> Runner {
        Runner::new(Config {
            url: closed_port_url(),
            requests,
            concurrency,
            timeout: Duration::from_secs(2),
            ..Config::default()
        }).unwrap()
    }

    #[tokio::test]
    #[ntest::timeout(5000)]
    async fn zero_requests_drains_immediately() {
        let benchmark = runner(0, 4).benchmark().await;

        assert_eq!(benchmark.report.requests, 0);
        assert_eq!(benchmark.report.concurrency, 4);
        assert!(benchmark.report.samples.is_empty());
        assert_eq!(benchmark.report.failed, 0);
        assert!(benchmark.summary.is_none());
    }

    #[tokio::test]
    #[ntest::timeout(10000)]
    async fn more_workers_than_tickets() {
        let report = runner(3, 16).run().await;

        assert_eq!(report.failed, 3);
        assert!(report.samples.is_empty());
    }

    #[tracing_test::traced_test]
    #[tokio::test]
    async fn failed_request_is_logged_and_not_sampled() {
        let runner = runner(1, 1);
        let (_jobs_tx, jobs_rx) = async_channel::bounded(1);
        let (results_tx, _results_rx) = mpsc::channel(1);
        let worker = Worker {
            id: 0,
            client: runner.client.clone(),
            config: Arc::clone(&runner.config),
            jobs: jobs_rx,
            results: results_tx,
        };

        let outcome = worker.send_request(7).await;

        assert!(matches!(outcome, Outcome::Failed { ticket: 7, timeout: false }));
        assert!(logs_contain("request failed"));
        assert!(logs_contain("ticket=7"));
    }

    #[test]
    fn sample_latency_in_micros() {
        let sample = LatencySample {
            ticket: 0,
            latency: Duration::from_micros(1_250),
            status: 200,
        };
        assert_eq!(sample.micros(), 1250.0);
    }
}
