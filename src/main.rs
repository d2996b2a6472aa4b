mod device;
mod engine;
mod target;

use std::process::ExitCode;

use anyhow::bail;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emutag_shared::{MemoryImage, TagHandler};

use device::hexpipe::HexPipeDevice;
use engine::EmulationSession;
use target::TargetDescriptor;

/// Pick the emulated memory image from the optional CLI argument
fn select_image(arg: Option<&str>) -> anyhow::Result<MemoryImage> {
    match arg {
        None | Some("hello-world") => Ok(MemoryImage::demo_hello_world()),
        Some("ndef-uri") => Ok(MemoryImage::demo_ndef_uri()),
        Some(other) => bail!("unknown image '{other}' (expected 'hello-world' or 'ndef-uri')"),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let arg = std::env::args().nth(1);
    let image = match select_image(arg.as_deref()) {
        Ok(image) => image,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let cc = image.capability_container();
    info!(
        blocks = image.block_count(),
        data_area = cc.data_area_size,
        read_only = cc.is_read_only(),
        "memory image loaded"
    );

    let device = HexPipeDevice::stdio();
    let session = EmulationSession::new(
        Box::new(device),
        TargetDescriptor::type2_demo(),
        TagHandler::new(image),
    );
    info!("NFC device: {} opened", session.device_name());

    // First interrupt aborts the in-flight device operation so the session
    // can wind down; a second one terminates immediately.
    let abort = session.abort_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, aborting emulation");
            abort.abort();
        }
        if tokio::signal::ctrl_c().await.is_ok() {
            error!("second interrupt, terminating now");
            std::process::exit(1);
        }
    });

    info!("emulating NDEF tag now, bring an initiator in range");

    match tokio::task::spawn_blocking(move || session.run()).await {
        Ok(Ok(summary)) => {
            info!(frames = summary.frames_handled, "session ended: {}", summary.end);
            ExitCode::SUCCESS
        }
        Ok(Err(err)) => {
            error!("emulation failed: {err}");
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("emulation task failed: {err}");
            ExitCode::FAILURE
        }
    }
}
