//! `ridetap` binary: capture or replay, printing events as log lines.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use ridetap::{
    CaptureSession,
    DiagnosticSink,
    FileDumpSink,
    FrameSource,
    LiveSource,
    NullSink,
    ReplaySource,
    TapError,
};
use tokio_util::sync::CancellationToken;

fn main() -> ExitCode {
    // Bridges the library's `log` records through the default subscriber.
    tracing_subscriber::fmt::init();

    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e)
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            // Usage problems exit 1, matching the documented contract.
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &cli::Cli) -> Result<(), TapError> {
    let sink: Box<dyn DiagnosticSink> = match &cli.dump_dir {
        Some(dir) => Box::new(
            FileDumpSink::new(dir, cli.max_dumps).map_err(ridetap::capture::SourceError::Io)?,
        ),
        None => Box::new(NullSink),
    };

    let mut session = CaptureSession::with_sink(cli.companion, sink);
    subscribe_printers(&mut session);

    let mut source: Box<dyn FrameSource> = match &cli.file {
        Some(path) => Box::new(ReplaySource::open(path)?),
        None => Box::new(LiveSource::open(&cli.interface)?),
    };

    let stats = session.run(source.as_mut(), &CancellationToken::new())?;
    info!(
        "capture finished: {} frames, {} payloads, {} events, {} dropped, {} lane resets, {} decode errors",
        stats.frames_seen,
        stats.payloads_reassembled,
        stats.events_published,
        stats.frames_dropped,
        stats.lane_resets,
        stats.decode_errors,
    );
    Ok(())
}

fn subscribe_printers(session: &mut CaptureSession) {
    let events = session.events();
    events.on_chat_message(|event| {
        info!(
            "chat from {} {}: {}",
            event.chat.first_name, event.chat.last_name, event.chat.message
        );
    });
    events.on_ride_on_given(|event| {
        info!(
            "ride on from {} {} to rider {}",
            event.ride_on.first_name, event.ride_on.last_name, event.ride_on.to_rider_id
        );
    });
    events.on_player_entered_world(|event| {
        info!(
            "rider {} {} entered the world",
            event.player.first_name, event.player.last_name
        );
    });
    events.on_meetup_update(|event| info!("meetup {} updated", event.meetup.meetup_id));
    events.on_command_sent(|event| info!("companion sent {}", event.command));
    events.on_command_available(|event| {
        info!("companion button available: {} ({})", event.command, event.title);
    });
    events.on_power_up_granted(|event| info!("power-up granted: {}", event.kind));
    events.on_rider_position(|event| {
        info!(
            "rider at {:.5},{:.5} alt {:.1}",
            event.lat, event.lon, event.altitude
        );
    });
    events.on_activity_details(|event| info!("activity: {:?}", event.phase));
    events.on_device_info(|event| {
        info!(
            "companion device: {} ({} {})",
            event.device.device_model, event.device.app_version, event.device.os_version
        );
    });
}
