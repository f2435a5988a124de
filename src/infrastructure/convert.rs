use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

pub const CLOUDCONVERT_URL: &str = "https://api.cloudconvert.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum JobError {
    /// The provider reported the job as failed.
    #[error("conversion job failed: {0}")]
    Failed(String),
    /// The job never reached a terminal state within the attempt budget.
    #[error("conversion job did not finish after {attempts} status checks")]
    TimedOut { attempts: u32 },
    #[error("conversion service request failed: {0}")]
    Transport(String),
}

#[derive(Debug, Clone)]
pub struct NewConversionJob {
    pub file_name: String,
    pub target_format: String,
    /// Base64-encoded file payload, passed through to the provider untouched.
    pub file_content: String,
}

#[derive(Debug, Clone)]
pub struct FinishedJob {
    pub download_url: String,
    pub file_name: String,
}

/// Client for a CloudConvert-shaped conversion API: create a job of
/// import/convert/export tasks, then poll its status with a fixed delay and a
/// bounded attempt count. No backoff, no cancellation beyond exhaustion.
#[derive(Clone)]
pub struct ConversionClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ConversionClient {
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Create a job and poll it to completion.
    pub async fn convert(
        &self,
        job: NewConversionJob,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<FinishedJob, JobError> {
        let output_name = output_file_name(&job.file_name, &job.target_format);
        let job_id = self.create_job(&job, &output_name).await?;
        debug!(job_id, "conversion job created");

        let download_url = self.poll(&job_id, interval, max_attempts).await?;
        Ok(FinishedJob {
            download_url,
            file_name: output_name,
        })
    }

    /// Create an import → convert → export job, returning its id.
    pub async fn create_job(
        &self,
        job: &NewConversionJob,
        output_name: &str,
    ) -> Result<String, JobError> {
        let body = json!({
            "tasks": {
                "upload-file": {
                    "operation": "import/base64",
                    "file": job.file_content,
                    "filename": job.file_name,
                },
                "convert-file": {
                    "operation": "convert",
                    "input": "upload-file",
                    "output_format": job.target_format,
                    "filename": output_name,
                },
                "export-file": {
                    "operation": "export/url",
                    "input": "convert-file",
                },
            }
        });

        let response = self
            .client
            .post(format!("{}/v2/jobs", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(unreadable body)".to_string());
            return Err(JobError::Failed(format!(
                "job creation returned status {status}: {body}"
            )));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| JobError::Transport(format!("failed to parse job response: {e}")))?;

        Ok(envelope.data.id)
    }

    /// Poll job status until it finishes or fails, making at most
    /// `max_attempts` status queries `interval` apart.
    pub async fn poll(
        &self,
        job_id: &str,
        interval: Duration,
        max_attempts: u32,
    ) -> Result<String, JobError> {
        let mut attempts = 0;
        while attempts < max_attempts {
            tokio::time::sleep(interval).await;
            attempts += 1;

            let data = self.fetch_status(job_id).await?;
            match data.status.as_str() {
                "finished" => {
                    return export_url(&data).ok_or_else(|| {
                        JobError::Failed("job finished without an export URL".to_string())
                    });
                }
                "error" => {
                    let message = data
                        .tasks
                        .iter()
                        .find_map(|t| t.message.clone())
                        .unwrap_or_else(|| "unknown error".to_string());
                    return Err(JobError::Failed(message));
                }
                status => {
                    debug!(job_id, status, attempt = attempts, "conversion job still running");
                }
            }
        }

        Err(JobError::TimedOut {
            attempts: max_attempts,
        })
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobData, JobError> {
        let response = self
            .client
            .get(format!("{}/v2/jobs/{job_id}", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| JobError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(JobError::Transport(format!(
                "status query returned {status}"
            )));
        }

        let envelope: JobEnvelope = response
            .json()
            .await
            .map_err(|e| JobError::Transport(format!("failed to parse status response: {e}")))?;

        Ok(envelope.data)
    }
}

fn export_url(data: &JobData) -> Option<String> {
    data.tasks
        .iter()
        .find(|t| t.operation.starts_with("export/"))
        .and_then(|t| t.result.as_ref())
        .and_then(|r| r.files.first())
        .map(|f| f.url.clone())
}

fn output_file_name(file_name: &str, target_format: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{stem}.{target_format}")
}

// --- Provider API types ---

#[derive(Debug, Deserialize)]
struct JobEnvelope {
    data: JobData,
}

#[derive(Debug, Deserialize)]
struct JobData {
    id: String,
    status: String,
    #[serde(default)]
    tasks: Vec<TaskData>,
}

#[derive(Debug, Deserialize)]
struct TaskData {
    operation: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    result: Option<TaskResult>,
}

#[derive(Debug, Deserialize)]
struct TaskResult {
    #[serde(default)]
    files: Vec<TaskFile>,
}

#[derive(Debug, Deserialize)]
struct TaskFile {
    url: String,
}
