//! Entry point for the particle field.

use anyhow::{Context, Result};
use clap::Parser;
use particle_field::{
    clock::SystemClock,
    field::{FrameBudget, ParticleField},
    host::WindowHost,
    renderer::Renderer,
    Config,
};
use std::sync::Arc;
use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    ).init();

    let config = Config::parse();
    log::debug!("Configuration: {:?}", config);

    // Create the event loop and a transparent window to draw into.
    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Particle Field")
            .with_transparent(true)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
            .build(&event_loop)?,
    );

    // The window is the page's drawable surface; register it under the default id.
    let mut host = WindowHost::new(window.clone(), config.max_pixel_ratio);
    host.register(particle_field::config::DEFAULT_SURFACE_ID, window.clone());

    // Document is ready: mount the field (async GPU setup → sync).
    let mut field = ParticleField::init(
        &mut host,
        &config,
        SystemClock::start(),
        |surface, viewport, cloud, _material| {
            pollster::block_on(Renderer::new(surface, viewport, cloud))
        },
    )
    .context("failed to initialise the particle field")?;

    let budget = FrameBudget::from(config.frames);
    let mut ticks: u64 = 0;
    let mut outcome: Result<()> = Ok(());

    // Run the winit event loop.
    event_loop.run(|event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { window_id, event } if window_id == host.window_id() => {
                // Pointer and resize become field messages; the rest is handled here.
                if !host.forward(&event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                                elwt.exit();
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            if !budget.allows(ticks) {
                                elwt.exit();
                                return;
                            }
                            if let Err(err) = field.tick() {
                                log::error!("Frame loop stopped: {err}");
                                outcome = Err(err.into());
                                elwt.exit();
                            }
                            ticks += 1;
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                // Request a redraw each frame.
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    log::info!(
        "Stopped after {} frames ({} skipped).",
        field.stats().ticks(),
        field.stats().skipped
    );

    outcome
}
