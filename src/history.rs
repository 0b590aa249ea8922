use crate::error::WalletError;
use crate::tx_record::TransactionRecord;
use crate::types::Address;
use anyhow::{anyhow, Context};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::fmt;

fn default_page_size() -> usize {
    100
}

fn default_retries() -> u64 {
    3
}

/// Connection settings for the ledger indexer. Handed to the client at
/// construction; nothing here is ever process-global.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HistoryConfig {
    pub endpoint: String,
    pub key: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_retries")]
    pub retries: u64,
}

/// Paginating client over the indexer's address-transactions endpoint.
/// Owns transport, retries, and the end-of-history signal; the
/// reconstruction it feeds requires the concatenated result to be a
/// complete snapshot.
pub struct HistoryClient {
    client: Client,
    config: HistoryConfig,
}

impl HistoryClient {
    pub fn new(config: HistoryConfig) -> Result<Self, WalletError> {
        if config.page_size == 0 {
            return Err(WalletError::Validation(
                "page_size must be positive".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.append(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.append(
            "api_key",
            HeaderValue::from_str(&config.key)
                .map_err(|_| WalletError::Validation("api key is not a valid header".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP Client")
            .map_err(WalletError::SourceUnavailable)?;

        Ok(Self { client, config })
    }

    /// Fetches the whole history of `address`, page by page, until a
    /// page comes back shorter than the page size.
    pub async fn fetch_history(
        &self,
        address: &Address,
    ) -> Result<Vec<TransactionRecord>, WalletError> {
        let mut history = vec![];
        let mut offset = 0usize;
        loop {
            let page = self
                .fetch_page_with_retries(address, self.config.page_size, offset)
                .await?;
            let fetched = page.len();
            history.extend(page);
            if fetched < self.config.page_size {
                break;
            }
            offset += fetched;
        }
        tracing::info!(
            "fetched {} transactions for {}",
            history.len(),
            address
        );
        Ok(history)
    }

    pub async fn fetch_page(
        &self,
        address: &Address,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>, WalletError> {
        let req = self
            .client
            .get(url(
                &self.config.endpoint,
                format!(
                    "api/v1/addresses/{}/transactions?limit={}&offset={}",
                    address, page_size, offset
                ),
            ))
            .send()
            .await
            .context("Failed to get transactions from the indexer endpoint")
            .map_err(WalletError::SourceUnavailable)?;

        match req.status() {
            StatusCode::OK => {
                let records: Vec<TransactionRecord> = req
                    .json()
                    .await
                    .context("Expect the endpoint to return transaction data")
                    .map_err(WalletError::SourceUnavailable)?;
                Ok(records)
            }
            code => Err(WalletError::SourceUnavailable(anyhow!(
                "error: {:?}",
                code
            ))),
        }
    }

    async fn fetch_page_with_retries(
        &self,
        address: &Address,
        page_size: usize,
        offset: usize,
    ) -> Result<Vec<TransactionRecord>, WalletError> {
        let mut retries = self.config.retries;
        loop {
            match self.fetch_page(address, page_size, offset).await {
                Ok(records) => return Ok(records),
                Err(err) => {
                    retries = retries.saturating_sub(1);
                    if retries == 0 {
                        return Err(retries_exhausted(offset, err));
                    }
                    tracing::warn!("history page fetch failed, retrying: {}", err);
                }
            }
        }
    }
}

fn url(endpoint: &String, api: impl fmt::Display) -> String {
    format!("{endpoint}/{api}")
}

// Keeps the failing fetch as the source so callers can still walk the
// transport error chain.
fn retries_exhausted(offset: usize, err: WalletError) -> WalletError {
    WalletError::SourceUnavailable(
        anyhow::Error::new(err).context(format!("retries limit reached at offset {offset}")),
    )
}
