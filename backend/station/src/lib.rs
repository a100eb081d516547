//! # Inspection Station
//!
//! Command-line counterpart of the dashboard: reads a package's sensor values,
//! optionally attaches a photo, and submits the inspection to the server.
//!
//! ## Sources
//! - `submit`: values typed on the command line
//! - `listen`: sensor device lines, see [`readings::sensor`]
//! - `simulate`: random values from [`simulate::simulate_readings`]
//!
//! ## Credentials
//! `login` prints a token. Later commands take it through `--token` or
//! `STATION_TOKEN` and send it with every request.
//!
//! ## Seal state
//! Always explicit input. There is no image-based seal guess.
use std::path::Path;

use anyhow::Error;
use chrono::Utc;
use indicatif::{ProgressBar, ProgressStyle};
use readings::{InspectionRecord, Readings, SensorError, Status, Submission, parse_line};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub mod capture;
pub mod client;
pub mod simulate;

use capture::{PackageIds, image_data_url, package_id};
use client::ApiClient;
use simulate::simulate_readings;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub passed: usize,
    pub rejected: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, record: &InspectionRecord) {
        match record.status {
            Status::Passed => self.passed += 1,
            Status::Rejected => self.rejected += 1,
        }
    }

    pub fn submitted(&self) -> usize {
        self.passed + self.rejected
    }
}

pub fn load_image(image: Option<&Path>) -> Result<Option<String>, Error> {
    image.map(image_data_url).transpose()
}

pub async fn submit(
    api: &ApiClient,
    readings: Readings,
    package: Option<String>,
    image_data: Option<String>,
) -> Result<InspectionRecord, Error> {
    let package = package.unwrap_or_else(|| package_id(Utc::now()));
    let submission = Submission::new(package, readings, image_data);

    api.submit(&submission).await
}

/// Turns one device line into a submission. Blank lines yield `None`.
pub fn line_to_submission(
    line: &str,
    package: String,
    image_data: Option<String>,
) -> Result<Option<Submission>, SensorError> {
    match parse_line(line) {
        Ok(readings) => Ok(Some(Submission::new(package, readings, image_data))),
        Err(SensorError::Empty) => Ok(None),
        Err(e) => Err(e),
    }
}

pub async fn listen<R>(
    api: &ApiClient,
    reader: R,
    image_data: Option<String>,
) -> Result<Summary, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = Summary::default();
    let mut ids = PackageIds::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let submission = match line_to_submission(&line, ids.issue(Utc::now()), image_data.clone()) {
            Ok(Some(submission)) => submission,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Skipping line {line:?}: {e}");
                summary.skipped += 1;
                continue;
            }
        };

        match api.submit(&submission).await {
            Ok(record) => {
                print_record(&record);
                summary.record(&record);
            }
            Err(e) => {
                eprintln!("Failed to submit {}: {e:#}", submission.package_id);
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

pub async fn simulate(
    api: &ApiClient,
    count: u32,
    image_data: Option<String>,
) -> Result<Summary, Error> {
    let mut summary = Summary::default();
    let mut ids = PackageIds::default();

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    for _ in 0..count {
        let readings = simulate_readings(&mut rand::thread_rng());
        pb.set_message(readings.to_string());

        let package = Some(ids.issue(Utc::now()));
        match submit(api, readings, package, image_data.clone()).await {
            Ok(record) => summary.record(&record),
            Err(e) => {
                pb.println(format!("Submit failed: {e:#}"));
                summary.failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(summary)
}

pub fn print_record(record: &InspectionRecord) {
    println!(
        "{} {} [{}] T:{}°C W:{}g sealed:{} {}: {}",
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        record.id,
        record.package_id,
        record.temperature,
        record.weight,
        record.is_sealed,
        record.status,
        record.reason
    );
}

pub fn print_summary(summary: &Summary) {
    println!("Submitted: {}", summary.submitted());
    println!("Passed: {}", summary.passed);
    println!("Rejected: {}", summary.rejected);

    if summary.skipped > 0 {
        println!("Skipped lines: {}", summary.skipped);
    }
    if summary.failed > 0 {
        println!("Failed submissions: {}", summary.failed);
    }
}
