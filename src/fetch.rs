use std::time::Duration;

use reqwest::Client;

use crate::error::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Anything that can hand back the HTML behind a url.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Plain GETs against the live site.
pub struct Site {
    client: Client,
}

impl Site {
    pub fn new() -> reqwest::Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }
}

impl PageSource for Site {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| Error::fetch(url, e))?;

        response.text().await.map_err(|e| Error::fetch(url, e))
    }
}
