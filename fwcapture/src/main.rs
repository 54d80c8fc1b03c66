use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::{signal, time};
use tracing_subscriber::EnvFilter;

use firewire_capture::{CaptureSession, ChannelSink, StreamFormat};
use firewire_device::{IsoDevice, ReplayDevice};

mod config;
mod writer;

use config::CaptureConfig;

/// Attempts at format detection while the device has nothing to read yet.
const DETECT_ATTEMPTS: usize = 50;

#[derive(Parser, Debug)]
#[command(name = "fwcapture")]
#[command(about = "Capture DV or MPEG-TS from an isochronous channel into a file")]
struct Args {
    /// Raw isochronous packet source (a recorded dump)
    device: PathBuf,

    /// Output file (defaults to capture.dv or capture.ts)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Isochronous channel to receive (0-63)
    #[arg(long)]
    channel: Option<u8>,

    /// Tag bits to match (0-3)
    #[arg(long)]
    tag: Option<u8>,

    /// Wait for a free destination buffer before dropping a chunk
    #[arg(long)]
    buffer_timeout_ms: Option<u64>,

    /// Number of destination buffers
    #[arg(long)]
    pool_count: Option<usize>,

    /// JSON file with capture settings; flags take precedence
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print capture statistics as JSON when done
    #[arg(long)]
    stats: bool,
}

impl Args {
    fn overrides(&self) -> CaptureConfig {
        CaptureConfig {
            output: self.output.clone(),
            channel: self.channel,
            tag: self.tag,
            buffer_timeout_ms: self.buffer_timeout_ms,
            pool_count: self.pool_count,
            max_read_errors: None,
        }
    }
}

async fn detect_format<D: IsoDevice + 'static>(
    session: &mut CaptureSession<D>,
) -> anyhow::Result<StreamFormat> {
    let mut attempt = 0;
    loop {
        match session.detect_format() {
            Ok(format) => return Ok(format),
            Err(e) if e.is_transient() && attempt + 1 < DETECT_ATTEMPTS => {
                attempt += 1;
                tracing::debug!(attempt, "device not ready for detection");
                time::sleep(Duration::from_millis(20)).await;
            }
            Err(e) => return Err(e).context("format detection failed"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => CaptureConfig::load(path)?,
        None => CaptureConfig::default(),
    }
    .merge(args.overrides());

    let device = ReplayDevice::open(&args.device)
        .with_context(|| format!("failed to open {}", args.device.display()))?;
    let mut session = CaptureSession::new(device, config.options());
    session.configure().context("failed to configure device")?;
    let format = detect_format(&mut session).await?;

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("capture.{}", format.extension())));
    let geometry = session
        .buffer_geometry()
        .context("session has no buffer geometry")?;

    let (sink, units) = ChannelSink::bounded(geometry.count);
    let writer = {
        let output = output.clone();
        tokio::task::spawn_blocking(move || writer::write_units(&output, units))
    };

    session.start(sink)?;
    tracing::info!(
        %format,
        output = %output.display(),
        "capturing, press Ctrl+C to stop"
    );

    let finished = async {
        let mut poll = time::interval(Duration::from_millis(100));
        while !session.is_finished() {
            poll.tick().await;
        }
    };
    tokio::select! {
        res = signal::ctrl_c() => {
            res?;
            tracing::info!("interrupted");
        }
        _ = finished => tracing::info!("end of stream"),
    }

    let stats = session.stop();
    // Dropping the session closes the channel and lets the writer finish
    drop(session);
    let written = writer.await?.context("failed to write output")?;
    tracing::info!(
        bytes = written,
        media = ?Duration::from_micros(stats.media_time_us),
        output = %output.display(),
        "capture written"
    );

    if args.stats {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }
    Ok(())
}
