use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error};
use url::Url;

use crate::download::DownloadClient;
use crate::error::{Error, Result};

/// Downloads `url` and parses the whole body as JSON once the transfer is done.
pub async fn fetch_json(client: &DownloadClient, url: &str) -> Result<Value> {
    let response = client.get(url).await?;

    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => {
            error!("Error reading response from {}: {}", url, err);
            return Err(err.into());
        }
    };

    debug!("Fetched {} bytes of json from {}", body.len(), url);

    match serde_json::from_str(&body) {
        Ok(value) => Ok(value),
        Err(err) => {
            error!("Error parsing JSON from {}: {}", url, err);
            Err(err.into())
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct Manifest {
    pub clip_id: String,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub video: Vec<Track>,
    #[serde(default)]
    pub audio: Vec<Track>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Track {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub bitrate: u64,
    #[serde(default)]
    pub init_segment: String,
    pub segments: Vec<SegmentDescriptor>,
}

#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SegmentDescriptor {
    pub url: String,
}

impl SegmentDescriptor {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Manifest {
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn best_video(&self) -> Option<&Track> {
        self.video.iter().max_by_key(|track| track.bitrate)
    }

    pub fn best_audio(&self) -> Option<&Track> {
        self.audio.iter().max_by_key(|track| track.bitrate)
    }

    pub fn missing_track(&self, kind: &'static str) -> Error {
        Error::MissingTrack { clip_id: self.clip_id.clone(), kind }
    }

    /// Prefix that every segment url of `track` gets appended to.
    pub fn track_base_url(&self, manifest_url: &str, track: &Track) -> Result<String> {
        let parse_err = |source| Error::Url { url: manifest_url.to_string(), source };

        let manifest_url = Url::parse(manifest_url).map_err(parse_err)?;
        let clip_base = manifest_url.join(&self.base_url).map_err(parse_err)?;
        let track_base = clip_base.join(&track.base_url).map_err(parse_err)?;

        Ok(track_base.to_string())
    }
}
