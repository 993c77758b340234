pub mod manifest;
pub mod segment;

use reqwest::Response;
use tracing::error;

use crate::error::Result;
use crate::options::Options;

pub use manifest::fetch_json;
pub use segment::assemble;

#[derive(Debug, Clone)]
pub struct DownloadClient {
    client: reqwest::Client,
}

impl DownloadClient {
    pub fn new(options: &Options) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(options.user_agent.as_str())
            .build()?;

        Ok(Self { client })
    }

    /// Sends a GET and hands back the response with its body still unread.
    pub async fn get(&self, url: &str) -> Result<Response> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) => {
                error!("Error downloading {}: {}", url, err);
                return Err(err.into());
            }
        };

        match response.error_for_status() {
            Ok(response) => Ok(response),
            Err(err) => {
                error!("Error downloading {}: {}", url, err);
                Err(err.into())
            }
        }
    }
}
