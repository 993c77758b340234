use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use clip_downloader::download::manifest::{Manifest, Track};
use clip_downloader::download;
use clip_downloader::options::{Options, DEFAULT_USER_AGENT};
use clip_downloader::{logging, Combiner, DownloadClient};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    #[clap(value_parser = url_parser)]
    /// provide the url of the clip's json manifest
    url: String,

    /// provide a output file name
    output: PathBuf,

    #[clap(short, long, default_value = ".")]
    /// directory for the intermediate audio and video files
    work_dir: PathBuf,

    #[clap(short, long, default_value = DEFAULT_USER_AGENT)]
    /// user agent sent with every request
    user_agent: String,
}

fn url_parser(url: &str) -> Result<String, String> {
    if url.starts_with("http") {
        Ok(url.to_string())
    } else {
        Err("URL must start with http or https".to_string())
    }
}

async fn download_track(
    client: &DownloadClient,
    manifest_url: &str,
    manifest: &Manifest,
    track: &Track,
    output: PathBuf,
) -> clip_downloader::Result<()> {
    let base_url = manifest.track_base_url(manifest_url, track)?;

    download::assemble(client, &base_url, &track.init_segment, &track.segments, &output).await
}

async fn run(args: Args) -> clip_downloader::Result<()> {
    let options = Options {
        user_agent: args.user_agent,
        work_dir: args.work_dir,
    };

    info!("Options: {:?}", options);

    let client = DownloadClient::new(&options)?;
    let combiner = Combiner::new(&options)?;

    let manifest = Manifest::from_value(download::fetch_json(&client, &args.url).await?)?;

    let video = manifest.best_video().ok_or_else(|| manifest.missing_track("video"))?;
    let audio = manifest.best_audio().ok_or_else(|| manifest.missing_track("audio"))?;

    info!(
        "Downloading video of clip {} ({} segments)",
        manifest.clip_id,
        video.segments.len()
    );
    let video_path = combiner.video_path(&manifest.clip_id);
    download_track(&client, &args.url, &manifest, video, video_path).await?;

    info!(
        "Downloading audio of clip {} ({} segments)",
        manifest.clip_id,
        audio.segments.len()
    );
    let audio_path = combiner.audio_path(&manifest.clip_id);
    download_track(&client, &args.url, &manifest, audio, audio_path).await?;

    combiner.combine(&manifest.clip_id, &args.output).await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();

    let args = Args::parse();
    let url = args.url.clone();
    let output = args.output.clone();

    if let Err(err) = run(args).await {
        error!("Error downloading {}: {}", url, err);
        return Err(Box::new(err) as Box<dyn std::error::Error>);
    }

    info!("Finished downloading {} from: {}", output.display(), url);

    Ok(())
}
