//! BigQuery v2 REST implementation of [`LoadEngine`].
//!
//! Submission goes through `jobs.insert` with a `configuration.load` body;
//! waiting polls `jobs.get` until the job reports `DONE`. Credentials are a
//! deployment concern: an optional static bearer token is attached when
//! configured, nothing more.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};

use crate::{EngineError, JobError, JobState, JobStatus, LoadEngine, LoadJob, LoadRequest};

const INITIAL_POLL_INTERVAL: Duration = Duration::from_millis(500);
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(10);

pub struct BigQueryEngine {
    client: reqwest::Client,
    base_url: String,
    project: String,
}

impl BigQueryEngine {
    /// Build the shared engine client. Called once at startup; a failure here
    /// is fatal to the process.
    pub fn new(
        project: impl Into<String>,
        endpoint: &str,
        access_token: &str,
    ) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        if !access_token.is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|e| EngineError::Internal(format!("invalid access token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(BigQueryEngine {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            project: project.into(),
        })
    }
}

#[async_trait::async_trait]
impl LoadEngine for BigQueryEngine {
    #[tracing::instrument(skip(self, request), fields(source = %request.source.uri(), destination = %request.destination))]
    async fn submit_load(&self, request: LoadRequest) -> Result<Box<dyn LoadJob>, EngineError> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/jobs",
            self.base_url, self.project
        );
        let body = JobInsertBody::from_request(&request);

        let res = self.client.post(&url).json(&body).send().await?;
        let status = res.status();
        if !status.is_success() {
            let message = res.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %message, "load submission rejected");
            return Err(EngineError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let job: JobResource = res.json().await?;
        let reference = job.job_reference.ok_or(EngineError::MissingJobReference)?;

        tracing::debug!(job_id = %reference.job_id, "load job accepted");

        Ok(Box::new(BigQueryJob {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            project: self.project.clone(),
            reference,
        }))
    }
}

/// Handle to a job accepted by `jobs.insert`.
pub struct BigQueryJob {
    client: reqwest::Client,
    base_url: String,
    project: String,
    reference: JobReference,
}

#[async_trait::async_trait]
impl LoadJob for BigQueryJob {
    async fn wait(self: Box<Self>) -> Result<JobStatus, EngineError> {
        let url = format!(
            "{}/bigquery/v2/projects/{}/jobs/{}",
            self.base_url, self.project, self.reference.job_id
        );

        let mut interval = INITIAL_POLL_INTERVAL;
        loop {
            let mut req = self.client.get(&url);
            if let Some(location) = &self.reference.location {
                req = req.query(&[("location", location.as_str())]);
            }

            let res = req.send().await?;
            let status = res.status();
            if !status.is_success() {
                let message = res.text().await.unwrap_or_default();
                tracing::error!(status = %status, body = %message, "load job poll failed");
                return Err(EngineError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let job: JobResource = res.json().await?;
            if let Some(job_status) = job.status {
                if JobState::from_api_str(&job_status.state) == JobState::Done {
                    return Ok(match job_status.error_result {
                        Some(error) => JobStatus::done_with_error(error.into_job_error()),
                        None => JobStatus::done(),
                    });
                }
            }

            tokio::time::sleep(interval).await;
            interval = (interval * 2).min(MAX_POLL_INTERVAL);
        }
    }
}

impl JobState {
    fn from_api_str(state: &str) -> JobState {
        match state {
            "PENDING" => JobState::Pending,
            "DONE" => JobState::Done,
            // RUNNING, plus anything the API grows later: still in flight.
            _ => JobState::Running,
        }
    }
}

#[derive(Debug, Serialize)]
struct JobInsertBody<'a> {
    configuration: JobConfiguration<'a>,
}

impl<'a> JobInsertBody<'a> {
    fn from_request(request: &'a LoadRequest) -> Self {
        JobInsertBody {
            configuration: JobConfiguration {
                load: JobConfigurationLoad {
                    source_uris: vec![request.source.uri()],
                    source_format: request.source.format().as_api_str(),
                    destination_table: TableReference {
                        project_id: &request.destination.project,
                        dataset_id: &request.destination.dataset,
                        table_id: &request.destination.table,
                    },
                    write_disposition: request.options.write.as_api_str(),
                    schema_update_options: request
                        .options
                        .schema_update
                        .iter()
                        .map(|o| o.as_api_str())
                        .collect(),
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct JobConfiguration<'a> {
    load: JobConfigurationLoad<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobConfigurationLoad<'a> {
    source_uris: Vec<&'a str>,
    source_format: &'static str,
    destination_table: TableReference<'a>,
    write_disposition: &'static str,
    schema_update_options: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TableReference<'a> {
    project_id: &'a str,
    dataset_id: &'a str,
    table_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobResource {
    job_reference: Option<JobReference>,
    status: Option<JobStatusResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobReference {
    job_id: String,
    location: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JobStatusResource {
    state: String,
    error_result: Option<ErrorProto>,
}

#[derive(Debug, Deserialize)]
struct ErrorProto {
    reason: Option<String>,
    message: Option<String>,
}

impl ErrorProto {
    fn into_job_error(self) -> JobError {
        JobError {
            reason: self.reason.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
        }
    }
}
