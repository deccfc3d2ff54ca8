use std::time::Duration;

use reqwest::Client;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;

use crate::error::Result;

/// HTTP access for the crawl engine. Page retrievals follow a bounded number
/// of redirects; status probes report the raw status without following.
pub struct Fetcher {
    client: Client,
    probe: Client,
}

pub struct FetchedPage {
    pub status: u16,
    pub body: String,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .redirect(Policy::limited(5))
            .build()?;

        let probe = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .redirect(Policy::none())
            .build()?;

        Ok(Self { client, probe })
    }

    /// HEAD probe. `None` means the request could not complete at all.
    pub async fn status(&self, url: &Url) -> Option<u16> {
        match self.probe.head(url.as_str()).send().await {
            Ok(response) => Some(response.status().as_u16()),
            Err(e) => {
                debug!("HEAD {} failed: {}", url, e);
                None
            }
        }
    }

    /// Full GET. `None` means a transport failure, not a bad status code.
    pub async fn page(&self, url: &Url) -> Option<FetchedPage> {
        match self.client.get(url.as_str()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                match response.text().await {
                    Ok(body) => Some(FetchedPage { status, body }),
                    Err(e) => {
                        debug!("Reading body of {} failed: {}", url, e);
                        None
                    }
                }
            }
            Err(e) => {
                debug!("GET {} failed: {}", url, e);
                None
            }
        }
    }
}
