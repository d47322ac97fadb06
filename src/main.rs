// src/main.rs

//! Demo frontend: brings up the KMS context and presents frames until a
//! shutdown signal (or the configured frame limit).

use anyhow::{Context, Result};
use kms_context::config::CONFIG;
use kms_context::display::{ContextDriver, FrameInfo, KmsContext, VideoContext};
use kms_context::platform::frontend::SystemFrontend;
use log::{info, warn};
use std::time::Duration;

#[cfg(feature = "go2")]
fn create_driver() -> Result<Box<dyn ContextDriver>> {
    use kms_context::platform::backends::egl::SystemEgl;
    use kms_context::platform::backends::go2::Go2Backend;

    let driver = KmsContext::init(
        Go2Backend::new(),
        SystemEgl::new(CONFIG.egl.clone()),
        Box::new(SystemFrontend::new(&CONFIG)),
    )?;
    Ok(Box::new(driver))
}

#[cfg(not(feature = "go2"))]
fn create_driver() -> Result<Box<dyn ContextDriver>> {
    use kms_context::platform::{HeadlessBackend, HeadlessEgl};

    info!("Built without the go2 feature; presenting to the headless backend.");
    let driver = KmsContext::init(
        HeadlessBackend::new(),
        HeadlessEgl::new(),
        Box::new(SystemFrontend::new(&CONFIG)),
    )?;
    Ok(Box::new(driver))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting kms-context...");
    let video_config = &CONFIG.video;

    let mut video = VideoContext::new(create_driver().context("Failed to initialize KMS context")?);

    if let Some(input) = video.input_driver_fallback(&CONFIG.input.joypad_driver) {
        info!("Input driver fallback: {}", input.ident());
    }

    if video_config.core_context {
        video.set_flags(kms_context::display::ContextFlags::GL_CORE_CONTEXT);
    }

    if !video.bind_api(
        video_config.api,
        video_config.api_major,
        video_config.api_minor,
    ) {
        video.destroy();
        anyhow::bail!(
            "Could not bind {:?} {}.{}",
            video_config.api,
            video_config.api_major,
            video_config.api_minor
        );
    }

    video.swap_interval(video_config.swap_interval);

    if !video.set_video_mode(
        video_config.width,
        video_config.height,
        video_config.fullscreen,
    ) {
        video.destroy();
        anyhow::bail!("Failed to set video mode");
    }

    if let Some((width, height)) = video.get_video_size() {
        info!(
            "Video mode {}x{} @ {:.2} Hz, flags {:?}",
            width,
            height,
            video.get_refresh_rate(),
            video.get_flags()
        );
    }

    let frame_interval = Duration::from_millis(CONFIG.demo.frame_interval_ms);
    let mut frame = FrameInfo::default();

    info!("Starting render loop...");
    loop {
        let status = video.check_window();
        if status.quit {
            info!("Shutdown signal received. Exiting render loop.");
            break;
        }
        if CONFIG
            .demo
            .max_frames
            .is_some_and(|max| frame.frame_count >= max)
        {
            info!("Frame limit reached after {} frames.", frame.frame_count);
            break;
        }

        video.swap_buffers(&frame);
        frame.frame_count += 1;
        std::thread::sleep(frame_interval);
    }

    if frame.frame_count == 0 {
        warn!("No frames were presented.");
    }

    info!("Shutting down video context...");
    video.destroy();
    info!("kms-context exited successfully.");

    Ok(())
}
