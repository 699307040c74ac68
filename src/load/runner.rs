//! Spawns the load worker and archives its artifacts.
//!
//! The runner owns the CI contract: behavior is configured through the
//! pipeline's environment variables, the worker's output is always
//! captured to a transcript, a report file always exists afterwards
//! (real or placeholder), and the process exit code never reflects the
//! load outcome - an unstable load run must not hard-fail the pipeline.

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use tokio::fs;
use tokio::process::Command;
use tracing::{info, warn};

use crate::load::report::{synthesize_placeholder, write_transcript};

pub const WORKER_BIN: &str = "bmc-load-worker";

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub users: String,
    pub spawn_rate: String,
    pub run_time: String,
    pub reports_dir: PathBuf,
    pub report_file: PathBuf,
    pub cli_out_file: PathBuf,
}

impl LoadOptions {
    /// Reads the pipeline environment variables, with the historical
    /// names kept for compatibility with existing CI jobs.
    pub fn from_env() -> Self {
        let users = env::var("LOCUST_USERS").unwrap_or_else(|_| "5".to_string());
        let spawn_rate = env::var("LOCUST_SPAWN_RATE").unwrap_or_else(|_| "1".to_string());
        let run_time = env::var("LOCUST_RUN_TIME").unwrap_or_else(|_| "30s".to_string());
        let reports_dir =
            PathBuf::from(env::var("REPORTS_DIR").unwrap_or_else(|_| "reports".to_string()));
        let report_file = reports_dir
            .join(env::var("LOCUST_REPORT").unwrap_or_else(|_| "load_report.html".to_string()));
        let cli_out_file = reports_dir.join(
            env::var("LOCUST_CLI_OUT").unwrap_or_else(|_| "load_cli_output.txt".to_string()),
        );
        Self {
            users,
            spawn_rate,
            run_time,
            reports_dir,
            report_file,
            cli_out_file,
        }
    }
}

fn worker_path() -> Result<PathBuf> {
    let exe = env::current_exe().context("cannot locate the current executable")?;
    let dir = exe
        .parent()
        .context("current executable has no parent directory")?;
    Ok(dir.join(format!("{WORKER_BIN}{}", env::consts::EXE_SUFFIX)))
}

/// Runs the load worker to completion and archives transcript + report.
/// Always returns `Ok` for worker-level failures; only artifact-writing
/// errors propagate.
pub async fn run(opts: &LoadOptions) -> Result<()> {
    fs::create_dir_all(&opts.reports_dir)
        .await
        .with_context(|| format!("failed to create {}", opts.reports_dir.display()))?;

    let worker = worker_path()?;
    info!(
        worker = %worker.display(),
        users = %opts.users,
        spawn_rate = %opts.spawn_rate,
        run_time = %opts.run_time,
        "starting load worker"
    );

    let outcome = Command::new(&worker)
        .arg("--users")
        .arg(&opts.users)
        .arg("--hatch-rate")
        .arg(&opts.spawn_rate)
        .arg("--run-time")
        .arg(&opts.run_time)
        .arg("--report-file")
        .arg(&opts.report_file)
        .output()
        .await;

    match outcome {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout);
            let stderr = String::from_utf8_lossy(&output.stderr);
            write_transcript(&opts.cli_out_file, &stdout, &stderr).await?;

            let report_produced = fs::try_exists(&opts.report_file).await.unwrap_or(false);
            if !output.status.success() || !report_produced {
                warn!(
                    exit = ?output.status.code(),
                    report_produced,
                    "load worker did not finish cleanly, synthesizing placeholder report"
                );
                let transcript = format!("{stdout}\n{stderr}");
                synthesize_placeholder(&opts.report_file, output.status.code(), &transcript)
                    .await?;
            }
            info!(
                exit = ?output.status.code(),
                report = %opts.report_file.display(),
                transcript = %opts.cli_out_file.display(),
                "load run finished"
            );
        }
        Err(err) => {
            warn!(error = %err, worker = %worker.display(), "load worker failed to start");
            write_transcript(&opts.cli_out_file, "", &err.to_string()).await?;
            synthesize_placeholder(&opts.report_file, None, &err.to_string()).await?;
        }
    }
    Ok(())
}
