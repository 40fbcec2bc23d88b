//! Mango counting program runner
//!
//! The counting procedure is an external program that receives the image path as its
//! last argument and prints a single integer count on stdout.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::config::CountingConfig;
use crate::error::{AppError, AppResult};
use crate::external::MangoCounter;

/// Runs the configured counting program as a subprocess
#[derive(Debug, Clone)]
pub struct CommandCounter {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandCounter {
    pub fn new(config: &CountingConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn run(&self, image_path: &Path) -> AppResult<u32> {
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(image_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| AppError::upstream("mango counter", format!("failed to start: {}", e)))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                AppError::upstream(
                    "mango counter",
                    format!("timed out after {}s", self.timeout.as_secs()),
                )
            })?
            .map_err(|e| AppError::upstream("mango counter", e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::upstream(
                "mango counter",
                format!("exited with {}: {}", output.status, stderr.trim()),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_count_output(&stdout).ok_or_else(|| {
            AppError::upstream("mango counter", format!("malformed output: {:?}", stdout.trim()))
        })
    }
}

/// Read the count from the last non-empty line of the program output
pub fn parse_count_output(stdout: &str) -> Option<u32> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()?
        .parse()
        .ok()
}

#[async_trait]
impl MangoCounter for CommandCounter {
    async fn count(&self, image_path: &Path) -> AppResult<u32> {
        self.run(image_path).await
    }
}
