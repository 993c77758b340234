use std::path::Path;

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

use crate::download::manifest::SegmentDescriptor;
use crate::download::DownloadClient;
use crate::error::{Error, Result};

/// Writes the decoded init data to `output` and appends every segment behind it,
/// one request at a time and in the order given.
///
/// A failing segment aborts the run. The file then holds the init data and all
/// segments before the failing one; whatever the failing segment had already
/// appended is cut off again.
pub async fn assemble(
    client: &DownloadClient,
    base_url: &str,
    init_data: &str,
    segments: &[SegmentDescriptor],
    output: &Path,
) -> Result<()> {
    let init = decode_init_data(init_data)?;

    tokio::fs::write(output, &init)
        .await
        .map_err(|err| Error::fs(output, err))?;

    let mut file = OpenOptions::new()
        .append(true)
        .open(output)
        .await
        .map_err(|err| Error::fs(output, err))?;

    info!(
        "Assembling {} segments into {}",
        segments.len(),
        output.display()
    );

    let mut written = init.len() as u64;

    for (index, segment) in segments.iter().enumerate() {
        let url = format!("{}{}", base_url, segment.url);

        match append_segment(client, &url, &mut file, output).await {
            Ok(len) => {
                written += len;
                debug!(
                    "{:width$} / {:width$} segs\t {} ({} bytes)",
                    index + 1,
                    segments.len(),
                    segment.url,
                    len,
                    width = segments.len().to_string().len()
                );
            }
            Err(err) => {
                error!("Error downloading segment {}: {}", url, err);
                if let Err(trunc_err) = truncate(&mut file, written, output).await {
                    warn!(
                        "Could not cut {} back to {} bytes: {}",
                        output.display(),
                        written,
                        trunc_err
                    );
                }
                return Err(err);
            }
        }
    }

    file.flush().await.map_err(|err| Error::fs(output, err))?;

    info!("Finished {} ({} bytes)", output.display(), written);

    Ok(())
}

/// Decodes init data as leniently as browsers and node do: whitespace is skipped,
/// url-safe characters are accepted, padding is optional and ends the data.
pub fn decode_init_data(init_data: &str) -> Result<Vec<u8>> {
    const LENIENT: GeneralPurpose = GeneralPurpose::new(
        &alphabet::STANDARD,
        GeneralPurposeConfig::new()
            .with_decode_padding_mode(DecodePaddingMode::Indifferent)
            .with_decode_allow_trailing_bits(true),
    );

    let normalized: String = init_data
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .take_while(|c| *c != '=')
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();

    Ok(LENIENT.decode(normalized)?)
}

async fn append_segment(
    client: &DownloadClient,
    url: &str,
    file: &mut File,
    output: &Path,
) -> Result<u64> {
    let mut response = client.get(url).await?;
    let mut len = 0;

    while let Some(chunk) = response.chunk().await? {
        file.write_all(&chunk)
            .await
            .map_err(|err| Error::fs(output, err))?;
        len += chunk.len() as u64;
    }

    Ok(len)
}

async fn truncate(file: &mut File, len: u64, output: &Path) -> Result<()> {
    file.flush().await.map_err(|err| Error::fs(output, err))?;
    file.set_len(len)
        .await
        .map_err(|err| Error::fs(output, err))
}
