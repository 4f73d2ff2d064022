//! Application loop: wires the controller, HTTP transport and terminal.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use resumedrop_controller::{
    ControllerConfig, ControllerEvent, HttpTransport, Outcome, RenderOptions, SessionState,
    TransferEvent, UploadController, UserAction,
};
use resumedrop_transfer::{SelectedFile, SpeedCalculator, format_size};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::terminal::{TerminalRenderer, supports_color};

/// Exit code when no file was selected.
const EXIT_NO_FILE: u8 = 2;

/// Bytes handed to the transport and the observed rate.
#[derive(Debug, Clone, Copy)]
struct Throughput {
    sent: u64,
    bytes_per_second: f64,
}

/// Uploads `file` and prints the session until it settles.
///
/// The loop ends after the follow-up hint of a successful upload, or as soon
/// as any other outcome is reached. Ctrl-C cancels a running upload and
/// skips the wait for the hint once it has finished.
pub async fn run(config: Config, file: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let selection = file
        .map(SelectedFile::open)
        .transpose()
        .context("cannot select file")?;

    let transport = Arc::new(HttpTransport::new(config.endpoint.clone())?);
    let mut ctrl = UploadController::new(
        transport,
        ControllerConfig {
            follow_up_delay: config.follow_up_delay(),
        },
    );
    let mut events = ctrl
        .take_events()
        .context("controller event receiver already taken")?;

    let mut renderer = TerminalRenderer::new(
        RenderOptions {
            show_timestamps: config.show_timestamps,
        },
        supports_color(),
    );
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    tracing::info!(endpoint = %config.endpoint, "uploader ready");
    ctrl.dispatch(UserAction::Upload(selection));
    renderer.flush(ctrl.page_mut(), &mut stdout, &mut stderr)?;

    if !ctrl.state().is_in_flight() {
        return Ok(ExitCode::from(EXIT_NO_FILE));
    }

    let (interrupt_tx, mut interrupts) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            if interrupt_tx.send(()).is_err() {
                break;
            }
        }
    });

    let throughput = drive(
        &mut ctrl,
        &mut events,
        &mut interrupts,
        &mut renderer,
        &mut stdout,
        &mut stderr,
    )
    .await?;

    ctrl.dispatch(UserAction::Close);
    renderer.print_metadata(ctrl.page(), &mut stdout)?;

    tracing::info!(
        sent = %format_size(throughput.sent),
        bytes_per_second = throughput.bytes_per_second as u64,
        outcome = ?ctrl.state(),
        "session settled"
    );

    Ok(match ctrl.state() {
        SessionState::Done(Outcome::Succeeded) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}

/// Applies controller events until the session settles.
///
/// An interrupt cancels an in-flight upload. Outside of one it ends the loop
/// at once, so the follow-up wait never swallows Ctrl-C.
async fn drive(
    ctrl: &mut UploadController,
    events: &mut mpsc::UnboundedReceiver<ControllerEvent>,
    interrupts: &mut mpsc::UnboundedReceiver<()>,
    renderer: &mut TerminalRenderer,
    out: &mut impl Write,
    err: &mut impl Write,
) -> std::io::Result<Throughput> {
    let speed = SpeedCalculator::default();
    let mut sent: u64 = 0;

    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else {
                    break;
                };
                if let ControllerEvent::Transfer {
                    event: TransferEvent::Progress(progress),
                    ..
                } = &event
                {
                    speed.add_sample(progress.loaded.saturating_sub(sent));
                    sent = progress.loaded;
                    if let Some(total) = progress.total {
                        let eta = speed.eta(total.saturating_sub(sent));
                        tracing::debug!(sent, total, ?eta, "upload progress");
                    }
                }
                let follow_up = matches!(event, ControllerEvent::FollowUp { .. });

                ctrl.apply(event);
                renderer.flush(ctrl.page_mut(), out, err)?;

                match ctrl.state() {
                    SessionState::Done(Outcome::Succeeded) if !follow_up => {}
                    SessionState::Done(_) => break,
                    _ => {}
                }
            }
            Some(()) = interrupts.recv() => {
                if !ctrl.state().is_in_flight() {
                    tracing::info!("interrupted, not waiting for follow-up");
                    break;
                }
                tracing::info!("SIGINT received, cancelling upload");
                ctrl.dispatch(UserAction::Cancel);
                renderer.flush(ctrl.page_mut(), out, err)?;
            }
        }
    }

    Ok(Throughput {
        sent,
        bytes_per_second: speed.bytes_per_second(),
    })
}
