// src/fetch/http.rs
// =============================================================================
// This module downloads pages and reports their links while they stream in.
//
// How a fetch works:
// 1. Default the scheme to http:// if the url has none
// 2. Send a GET (500ms to connect, 2s to get the response head by default)
// 3. Refuse non-2xx responses and anything that is not HTML
// 4. Read the body chunk by chunk (each read gets its own 2s deadline)
// 5. Hand every chunk to a tokenizer running on a blocking thread, and pass
//    the links it finds back to the caller as they come out
//
// Why a separate thread for the tokenizer?
// - html5ever's tokenizer is not Send (its string buffers are not thread safe)
// - our crawl runs inside tokio tasks, which may move between threads at
//   every .await
// - so the tokenizer lives on one blocking thread for the whole page, and we
//   talk to it through channels
//
// Any failure (bad url, timeout, reset connection, 404, ...) ends the fetch
// with a FetchError. The crawler decides what to do with it.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinError;
use tokio::time::timeout;
use url::Url;

use super::{LinkExtractor, LinkSource};
use crate::config::{with_scheme, CrawlSettings};
use crate::error::FetchError;

/// Fetches pages over HTTP with bounded connect and read times.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    read_timeout: Duration,
    user_agent: String,
}

impl HttpFetcher {
    pub fn new(settings: &CrawlSettings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(FetchError::Request)?;

        Ok(Self {
            client,
            read_timeout: settings.read_timeout,
            user_agent: settings.user_agent.clone(),
        })
    }

    async fn open(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        let target = with_scheme(url);
        let parsed = Url::parse(&target).map_err(|_| FetchError::InvalidUrl(target.clone()))?;

        let request = self
            .client
            .get(parsed)
            .header(USER_AGENT, &self.user_agent)
            .send();

        let response = timeout(self.read_timeout, request)
            .await
            .map_err(|_| FetchError::Timeout)?
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        // A missing content-type is given the benefit of the doubt
        if let Some(content_type) = response.headers().get(CONTENT_TYPE) {
            let content_type = content_type.to_str().unwrap_or_default().to_ascii_lowercase();
            if !content_type.contains("html") {
                return Err(FetchError::NotHtml(content_type));
            }
        }

        Ok(response)
    }
}

#[async_trait]
impl LinkSource for HttpFetcher {
    async fn fetch_links(
        &self,
        url: &str,
        on_link: &mut (dyn FnMut(String) + Send),
    ) -> Result<(), FetchError> {
        let mut response = self.open(url).await?;

        let (tx_chunk, rx_chunk) = crossbeam_channel::unbounded::<Vec<u8>>();
        let (tx_link, mut rx_link) = mpsc::unbounded_channel::<String>();

        // Ends when tx_chunk is dropped, including when this future is
        // dropped mid-download
        let parser = tokio::task::spawn_blocking(move || {
            let mut extractor = LinkExtractor::new();
            for chunk in rx_chunk {
                for link in extractor.feed(&chunk) {
                    if tx_link.send(link).is_err() {
                        return;
                    }
                }
            }
            for link in extractor.finish() {
                if tx_link.send(link).is_err() {
                    return;
                }
            }
        });

        loop {
            let chunk = timeout(self.read_timeout, response.chunk())
                .await
                .map_err(|_| FetchError::Timeout)?
                .map_err(FetchError::Body)?;

            match chunk {
                Some(bytes) => {
                    if tx_chunk.send(bytes.to_vec()).is_err() {
                        break;
                    }
                    while let Ok(link) = rx_link.try_recv() {
                        on_link(link);
                    }
                }
                None => break,
            }
        }

        drop(tx_chunk);
        while let Some(link) = rx_link.recv().await {
            on_link(link);
        }

        parse_outcome(parser.await)
    }
}

// A tokenizer thread that died (panicked) counts as a failed page, exactly
// like a network error: the links it already reported stay reported, but the
// url itself is not a result
fn parse_outcome(joined: Result<(), JoinError>) -> Result<(), FetchError> {
    joined.map_err(|e| FetchError::Parse(e.to_string()))
}
