//! Outbound quote fetch against the awesomeapi `last` endpoint.

use crate::config::ServerConfig;
use crate::deadline::Deadline;
use crate::error::{ServiceError, ServiceResult};
use crate::http::{self, HttpFailure};
use crate::types::Rate;
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;

/// Key of the USD-BRL entry in the upstream response.
pub const PAIR_KEY: &str = "USDBRL";

pub struct RateSource {
    client: Client,
    url: String,
    budget: Duration,
}

impl RateSource {
    pub fn new(cfg: &ServerConfig) -> reqwest::Result<Self> {
        let client = http::build_client(&cfg.user_agent, cfg.fetch_timeout)?;
        Ok(Self {
            client,
            url: cfg.upstream_url.clone(),
            budget: cfg.fetch_timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Single attempt, bounded by `parent.child(budget)`.
    pub async fn fetch(&self, parent: Deadline) -> ServiceResult<Rate> {
        let deadline = parent.child(self.budget);
        let raw = http::get_with_deadline(&self.client, &self.url, deadline)
            .await
            .map_err(|e| {
                warn!("Error calling exchange rate API {}: {}", self.url, e);
                match e {
                    HttpFailure::Deadline => ServiceError::UpstreamUnavailable(format!(
                        "no response within {:?}",
                        self.budget
                    )),
                    other => ServiceError::UpstreamUnavailable(other.to_string()),
                }
            })?;

        info!("API response status: {}", raw.status.as_u16());

        let rate = parse_quote(&raw.body).map_err(|e| {
            warn!("Error decoding external API response: {}", e);
            e
        })?;
        info!("Exchange rate obtained: {:?}", rate.bid);
        Ok(rate)
    }
}

mod api {
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, Default)]
    pub struct Quote {
        #[serde(default)]
        pub bid: Option<String>,
    }

    /// A `null` body decodes to no quotes at all.
    pub type Quotes = Option<HashMap<String, Option<Quote>>>;
}

/// Decode an upstream body into a rate.
///
/// Only the first JSON value is read; anything after it is ignored. That value
/// must be `null` or an object of quote objects. A `null` body, a missing or
/// `null` `USDBRL` entry, or a missing or `null` `bid` all yield an empty bid
/// rather than an error.
pub fn parse_quote(body: &[u8]) -> ServiceResult<Rate> {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<api::Quotes>()
        .next();
    let quotes = match first {
        Some(Ok(q)) => q.unwrap_or_default(),
        Some(Err(e)) => return Err(ServiceError::UpstreamMalformed(e.to_string())),
        None => return Err(ServiceError::UpstreamMalformed("empty body".into())),
    };
    let bid = quotes
        .get(PAIR_KEY)
        .and_then(|q| q.as_ref())
        .and_then(|q| q.bid.clone())
        .unwrap_or_default();
    Ok(Rate::new(bid))
}
