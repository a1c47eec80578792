// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pressbridge — demonstration host.
//
// Entry point.  Initialises logging, loads the bridge config, starts the host
// runtime on its own thread, and drives a few headless controls from the main
// (UI) thread so every event crosses the queue the way it would in an app.

use std::thread;

use pressbridge_bridge::{HeadlessInput, HeadlessWidget, NativeControl};
use pressbridge_core::config::data_dir;
use pressbridge_core::error::{BridgeError, Result};
use pressbridge_core::BridgeConfig;
use pressbridge_core::types::{EventData, InteractionEvent, PointerEvents};
use pressbridge_dispatch::{HostHandle, HostRuntime, HostStats};
use tracing::{error, info, warn};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Pressbridge starting");

    match run() {
        Ok(stats) => info!(
            delivered = stats.delivered,
            stale = stats.stale,
            gaps = stats.gaps,
            dropped = stats.dropped,
            "session finished"
        ),
        Err(e) => {
            error!(error = %e, "session failed");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<HostStats> {
    let dir = data_dir()?;
    let config = BridgeConfig::load(&dir);
    config.validate()?;
    info!(path = %dir.display(), ?config, "bridge config loaded");

    let (runtime, handle) = HostRuntime::new(&config);
    let host = spawn_host(runtime)?;

    // Stop and join the host even when a scenario fails.
    let played = play_scenarios(&config, &handle);
    if let Err(e) = handle.shutdown() {
        warn!(error = %e, "host already gone at shutdown");
    }
    let stats = host.join().map_err(|_| {
        error!("host runtime thread panicked");
        BridgeError::HostUnavailable
    })?;
    played.map(|()| stats)
}

/// Run the host loop on a dedicated single-threaded tokio runtime.
fn spawn_host(runtime: HostRuntime) -> Result<thread::JoinHandle<HostStats>> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let join = thread::Builder::new()
        .name("host-runtime".into())
        .spawn(move || rt.block_on(runtime.run()))?;
    Ok(join)
}

/// Host-side counterpart: parse the wire payload the way a script engine would.
fn mount_logger(
    handle: &HostHandle,
    control: &NativeControl<HeadlessWidget>,
    name: &'static str,
) -> Result<()> {
    handle.mount(control.id(), move |event: &InteractionEvent| {
        let payload = event
            .to_wire()
            .and_then(|wire| serde_json::to_string(&wire).map_err(BridgeError::from));
        match payload {
            Ok(json) => info!(
                control = name,
                handler = event.kind().handler_name(),
                sequence = event.sequence(),
                payload = %json,
                "host handler invoked"
            ),
            Err(e) => warn!(control = name, error = %e, "payload encoding failed"),
        }
    })
}

fn headless(config: &BridgeConfig) -> (NativeControl<HeadlessWidget>, HeadlessInput) {
    let (widget, input) = HeadlessWidget::new(config);
    (NativeControl::new(widget, config), input)
}

fn play_scenarios(config: &BridgeConfig, handle: &HostHandle) -> Result<()> {
    // Attach, detach, reattach: sequence numbers continue across emitters.
    let (mut submit, submit_input) = headless(config);
    let mut data = EventData::new();
    data.insert("testID", "submit");
    submit.set_event_data(data);
    mount_logger(handle, &submit, "submit")?;

    submit.attach_emitter(handle.emitter());
    for _ in 0..3 {
        submit_input.press();
    }
    submit.detach_emitter();
    for _ in 0..2 {
        submit_input.press();
    }
    submit.attach_emitter(handle.emitter());
    submit_input.move_to(12.0, 8.0);
    submit_input.press();

    // Long press and gating.
    let (mut menu, menu_input) = headless(config);
    mount_logger(handle, &menu, "menu")?;
    menu.attach_emitter(handle.emitter());
    menu_input.hold(config.long_press_delay_ms + 100);
    menu.set_pointer_events(PointerEvents::None);
    menu_input.press();
    menu.set_pointer_events(PointerEvents::Auto);
    menu.set_enabled(false);
    menu_input.press();

    // Teardown: the widget input path goes quiet, the host sees nothing more.
    submit.teardown()?;
    if submit_input.press() {
        warn!("torn-down control still received input");
    }
    handle.unmount(submit.id())?;

    menu.teardown()?;
    handle.unmount(menu.id())?;
    Ok(())
}
