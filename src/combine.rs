use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::options::Options;

/// Muxes the assembled `<clip_id>.m4v` and `<clip_id>.m4a` into one file with ffmpeg,
/// copying both streams as they are.
#[derive(Debug, Clone)]
pub struct Combiner {
    encoder: PathBuf,
    work_dir: PathBuf,
}

impl Combiner {
    /// Looks up `ffmpeg` on the `PATH`.
    pub fn new(options: &Options) -> Result<Self> {
        let encoder = which::which("ffmpeg").map_err(|err| Error::ExternalProcess {
            encoder: PathBuf::from("ffmpeg"),
            status: None,
            reason: err.to_string(),
        })?;

        Ok(Self::with_encoder(encoder, &options.work_dir))
    }

    pub fn with_encoder(encoder: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            encoder: encoder.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn video_path(&self, clip_id: &str) -> PathBuf {
        self.work_dir.join(format!("{}.m4v", clip_id))
    }

    pub fn audio_path(&self, clip_id: &str) -> PathBuf {
        self.work_dir.join(format!("{}.m4a", clip_id))
    }

    /// Sources are deleted only once the encoder exits successfully; after a
    /// failure they stay where they are.
    pub async fn combine(&self, clip_id: &str, output: &Path) -> Result<()> {
        let video = self.video_path(clip_id);
        let audio = self.audio_path(clip_id);

        for input in [&video, &audio] {
            if let Err(err) = tokio::fs::metadata(input).await {
                error!("Missing input {}: {}", input.display(), err);
                return Err(Error::fs(input, err));
            }
        }

        match tokio::fs::remove_file(output).await {
            Ok(()) => debug!("Removed existing {}", output.display()),
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(Error::fs(output, err)),
        }

        self.run_encoder(&audio, &video, output).await?;

        for input in [&video, &audio] {
            tokio::fs::remove_file(input)
                .await
                .map_err(|err| Error::fs(input, err))?;
        }

        info!("Combined {} into {}", clip_id, output.display());

        Ok(())
    }

    async fn run_encoder(&self, audio: &Path, video: &Path, output: &Path) -> Result<()> {
        info!("Running {} for {}", self.encoder.display(), output.display());

        let result = Command::new(&self.encoder)
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(audio)
            .arg("-i")
            .arg(video)
            .args(["-vcodec", "copy", "-acodec", "copy"])
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .await;

        let out = match result {
            Ok(out) => out,
            Err(err) => {
                error!("Error starting {}: {}", self.encoder.display(), err);
                return Err(Error::ExternalProcess {
                    encoder: self.encoder.clone(),
                    status: None,
                    reason: err.to_string(),
                });
            }
        };

        if out.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        warn!("{} exited with {}: {}", self.encoder.display(), out.status, stderr);

        Err(Error::ExternalProcess {
            encoder: self.encoder.clone(),
            status: Some(out.status),
            reason: if stderr.is_empty() {
                format!("exited with {}", out.status)
            } else {
                stderr
            },
        })
    }
}
