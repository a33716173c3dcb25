use crate::config::ClientConfig;
use crate::deadline::Deadline;
use crate::error::ClientError;
use crate::http::{self, HttpFailure};
use crate::types::Rate;
use log::info;
use reqwest::{Client, StatusCode};
use std::path::Path;

/// One-shot consumer of the quote service.
pub struct RateClient {
    http: Client,
    cfg: ClientConfig,
}

impl RateClient {
    pub fn new(cfg: ClientConfig) -> Result<Self, ClientError> {
        let client = http::build_client(&cfg.user_agent, cfg.timeout)
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { http: client, cfg })
    }

    pub fn output_path(&self) -> &Path {
        &self.cfg.output_path
    }

    /// Fetch the current rate, then overwrite the output file with it.
    /// Nothing is written unless a complete rate was decoded.
    pub async fn run(&self) -> Result<Rate, ClientError> {
        let rate = self.fetch().await?;
        write_rate(&self.cfg.output_path, &rate)?;
        Ok(rate)
    }

    pub async fn fetch(&self) -> Result<Rate, ClientError> {
        let deadline = Deadline::after(self.cfg.timeout);
        let raw = http::get_with_deadline(&self.http, &self.cfg.service_url, deadline)
            .await
            .map_err(|e| match e {
                HttpFailure::Deadline => ClientError::DeadlineExceeded(self.cfg.timeout),
                HttpFailure::Send(e) => ClientError::Transport(e.to_string()),
                HttpFailure::Body(e) => ClientError::ResponseMalformed(e.to_string()),
            })?;

        if raw.status != StatusCode::OK {
            return Err(ClientError::ServiceError {
                status: raw.status.as_u16(),
            });
        }

        info!("Server response: {}", raw.body_text());
        serde_json::from_slice::<Rate>(&raw.body)
            .map_err(|e| ClientError::ResponseMalformed(e.to_string()))
    }
}

pub fn format_line(rate: &Rate) -> String {
    format!("Dollar: {}", rate.bid)
}

/// Synchronous full overwrite of `path`.
pub fn write_rate(path: &Path, rate: &Rate) -> Result<(), ClientError> {
    std::fs::write(path, format_line(rate)).map_err(|source| ClientError::LocalWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}
