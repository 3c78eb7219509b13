//! The particle field: scene state, input handling and the frame loop.

use crate::{
    camera::Camera,
    clock::Clock,
    config::Config,
    data::{PointCloud, PointMaterial},
    error::{FieldError, RenderError, Result},
    events::{self, EventReceiver, FieldEvent, PointerState},
    host::Host,
    viewport::Viewport,
};
use glam::Mat4;
use std::f64::consts::TAU;

/// Whole-cloud rotation in radians, recomputed from scratch every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CloudRotation {
    pub pitch: f32,
    pub yaw: f32,
}

impl CloudRotation {
    /// `yaw = elapsed * drift + pointer.x * influence`, `pitch = pointer.y * influence`.
    ///
    /// The drift term is reduced modulo a full turn in f64 before narrowing,
    /// so the yaw keeps advancing every frame on long uptimes.
    pub fn compute(elapsed_secs: f64, pointer: PointerState, drift: f32, influence: f32) -> Self {
        let drift_angle = (elapsed_secs * drift as f64).rem_euclid(TAU) as f32;
        Self {
            pitch: pointer.y * influence,
            yaw: drift_angle + pointer.x * influence,
        }
    }

    /// Pitch about X, then yaw about Y (XYZ Euler order).
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_rotation_x(self.pitch) * Mat4::from_rotation_y(self.yaw)
    }
}

/// Everything a renderer needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub camera: &'a Camera,
    pub rotation: CloudRotation,
    pub viewport: &'a Viewport,
    pub material: &'a PointMaterial,
}

/// Seam between the field and whatever puts pixels on the surface.
pub trait FrameRenderer {
    /// Resizes the output to the viewport's render size.
    fn resize(&mut self, viewport: &Viewport);

    fn draw(&mut self, frame: &Frame<'_>) -> std::result::Result<(), RenderError>;
}

/// External stop condition for the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameBudget {
    /// Runs for the lifetime of the host.
    #[default]
    Unbounded,
    /// Stops after this many ticks.
    Frames(u64),
}

impl FrameBudget {
    pub fn allows(&self, ticks: u64) -> bool {
        match self {
            FrameBudget::Unbounded => true,
            FrameBudget::Frames(limit) => ticks < *limit,
        }
    }
}

impl From<Option<u64>> for FrameBudget {
    fn from(frames: Option<u64>) -> Self {
        frames.map_or(FrameBudget::Unbounded, FrameBudget::Frames)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Rendered,
    Skipped(RenderError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub rendered: u64,
    pub skipped: u64,
    window_start_secs: f64,
    window_frames: u64,
}

impl FrameStats {
    pub fn ticks(&self) -> u64 {
        self.rendered + self.skipped
    }

    fn record(&mut self, outcome: TickOutcome, now_secs: f64, interval: u64) {
        match outcome {
            TickOutcome::Rendered => self.rendered += 1,
            TickOutcome::Skipped(_) => self.skipped += 1,
        }
        self.window_frames += 1;

        if interval == 0 || self.window_frames < interval {
            return;
        }

        let span = now_secs - self.window_start_secs;
        let fps = if span > 0.0 {
            self.window_frames as f64 / span
        } else {
            0.0
        };
        log::debug!(
            "frames rendered={} skipped={} | {:.1} fps over last {} frames",
            self.rendered,
            self.skipped,
            fps,
            self.window_frames
        );
        self.window_start_secs = now_secs;
        self.window_frames = 0;
    }
}

/// Tunables lifted from the configuration.
#[derive(Debug, Clone, Copy)]
struct Motion {
    drift_speed: f32,
    pointer_influence: f32,
    max_pixel_ratio: f64,
    stats_interval: u64,
}

/// A rotating point cloud rendered every frame, tilted by the pointer.
pub struct ParticleField<R, C> {
    renderer: R,
    clock: C,
    camera: Camera,
    cloud: PointCloud,
    material: PointMaterial,
    viewport: Viewport,
    pointer: PointerState,
    rotation: CloudRotation,
    events: EventReceiver,
    motion: Motion,
    stats: FrameStats,
}

impl<R: FrameRenderer, C: Clock> ParticleField<R, C> {
    /// Mounts a field on the host's surface named by `config.surface_id`.
    ///
    /// Fails with [`FieldError::SurfaceNotFound`] before anything is built or
    /// any listener is registered when the surface does not exist.
    pub fn init<H, F>(host: &mut H, config: &Config, clock: C, build_renderer: F) -> Result<Self>
    where
        H: Host,
        F: FnOnce(H::Surface, &Viewport, &PointCloud, &PointMaterial) -> anyhow::Result<R>,
    {
        config.validate()?;

        let surface = host
            .find_surface(&config.surface_id)
            .ok_or_else(|| FieldError::SurfaceNotFound(config.surface_id.clone()))?;

        let viewport = host.viewport().with_max_pixel_ratio(config.max_pixel_ratio);
        let camera = Camera::new(viewport.aspect());

        let cloud = PointCloud::generate_seeded(config.particles, config.spread, config.seed);
        let material = PointMaterial::from_config(config);

        let mut renderer = build_renderer(surface, &viewport, &cloud, &material)?;
        renderer.resize(&viewport);

        let (tx, rx) = events::channel();
        host.listen(tx);

        log::info!(
            "Particle field mounted on '#{}': {} points, {:.0}x{:.0} @ {:.2}x",
            config.surface_id,
            cloud.len(),
            viewport.width,
            viewport.height,
            viewport.pixel_ratio()
        );

        Ok(Self {
            renderer,
            clock,
            camera,
            cloud,
            material,
            viewport,
            pointer: PointerState::default(),
            rotation: CloudRotation::default(),
            events: rx,
            motion: Motion {
                drift_speed: config.drift_speed,
                pointer_influence: config.pointer_influence,
                max_pixel_ratio: config.max_pixel_ratio,
                stats_interval: config.stats_interval,
            },
            stats: FrameStats::default(),
        })
    }

    pub fn handle_event(&mut self, event: FieldEvent) {
        match event {
            FieldEvent::PointerMoved { client_x, client_y } => {
                self.pointer_moved(client_x, client_y)
            }
            FieldEvent::Resized(viewport) => self.resize(viewport),
        }
    }

    /// Pure state write; the next tick picks it up.
    pub fn pointer_moved(&mut self, client_x: f64, client_y: f64) {
        self.pointer = PointerState::from_client(client_x, client_y, &self.viewport);
    }

    /// Updates camera aspect and renderer size. Zero-area viewports are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            log::debug!(
                "Ignoring zero-area resize to {}x{}",
                viewport.width,
                viewport.height
            );
            return;
        }

        self.viewport = viewport.with_max_pixel_ratio(self.motion.max_pixel_ratio);
        self.camera.set_aspect(self.viewport.aspect());
        self.renderer.resize(&self.viewport);
    }

    /// Applies every queued host message.
    pub fn pump_events(&mut self) -> usize {
        let pending: Vec<FieldEvent> = self.events.drain().collect();
        let count = pending.len();
        for event in pending {
            self.handle_event(event);
        }
        count
    }

    /// One frame: apply input, recompute rotation, draw.
    ///
    /// Recoverable draw failures skip the frame; running out of GPU memory
    /// is returned as an error.
    pub fn tick(&mut self) -> Result<TickOutcome> {
        self.pump_events();

        let elapsed = self.clock.elapsed_secs();
        self.rotation = CloudRotation::compute(
            elapsed,
            self.pointer,
            self.motion.drift_speed,
            self.motion.pointer_influence,
        );

        let frame = Frame {
            camera: &self.camera,
            rotation: self.rotation,
            viewport: &self.viewport,
            material: &self.material,
        };

        let outcome = match self.renderer.draw(&frame) {
            Ok(()) => TickOutcome::Rendered,
            Err(err) if err.is_fatal() => {
                log::error!("Render error: {err}");
                return Err(FieldError::Render(err));
            }
            Err(err) => {
                if err.needs_reconfigure() {
                    self.renderer.resize(&self.viewport);
                } else {
                    log::warn!("Skipping frame: {err}");
                }
                TickOutcome::Skipped(err)
            }
        };

        self.stats
            .record(outcome, elapsed, self.motion.stats_interval);
        Ok(outcome)
    }

    /// Ticks until `budget` is exhausted. Returns the number of ticks run.
    pub fn run(&mut self, budget: FrameBudget) -> Result<u64> {
        let mut ticks = 0;
        while budget.allows(ticks) {
            self.tick()?;
            ticks += 1;
        }
        Ok(ticks)
    }

    pub fn rotation(&self) -> CloudRotation {
        self.rotation
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    pub fn material(&self) -> &PointMaterial {
        &self.material
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::ManualClock, events::EventSender};
    use std::{cell::RefCell, rc::Rc, time::Duration};
    use winit::dpi::PhysicalSize;

    /// Host with a configurable set of surfaces that records listener registration.
    struct FakeHost {
        surfaces: Vec<&'static str>,
        viewport: Viewport,
        listeners: Vec<EventSender>,
    }

    impl FakeHost {
        fn with_surface(id: &'static str) -> Self {
            Self {
                surfaces: vec![id],
                viewport: Viewport::new(800.0, 600.0, 1.0),
                listeners: Vec::new(),
            }
        }

        fn sender(&self) -> &EventSender {
            &self.listeners[0]
        }
    }

    impl Host for FakeHost {
        type Surface = &'static str;

        fn find_surface(&self, id: &str) -> Option<&'static str> {
            self.surfaces.iter().copied().find(|s| *s == id)
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn listen(&mut self, events: EventSender) {
            self.listeners.push(events);
        }
    }

    #[derive(Debug, Default)]
    struct Log {
        sizes: Vec<PhysicalSize<u32>>,
        draws: Vec<CloudRotation>,
        failures: Vec<RenderError>,
    }

    /// Records resizes and draws; pops scripted failures before succeeding.
    #[derive(Clone, Default)]
    struct RecordingRenderer {
        log: Rc<RefCell<Log>>,
    }

    impl FrameRenderer for RecordingRenderer {
        fn resize(&mut self, viewport: &Viewport) {
            self.log.borrow_mut().sizes.push(viewport.render_size());
        }

        fn draw(&mut self, frame: &Frame<'_>) -> std::result::Result<(), RenderError> {
            let mut log = self.log.borrow_mut();
            if let Some(err) = log.failures.pop() {
                return Err(err);
            }
            log.draws.push(frame.rotation);
            Ok(())
        }
    }

    fn mount(
        host: &mut FakeHost,
        clock: ManualClock,
    ) -> Result<ParticleField<RecordingRenderer, ManualClock>> {
        let config = Config {
            seed: Some(11),
            ..Config::default()
        };
        ParticleField::init(host, &config, clock, |_, _, _, _| Ok(RecordingRenderer::default()))
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn rotation_formula_matches_reference_values() {
        let r = CloudRotation::compute(10.0, PointerState { x: 0.25, y: -0.1 }, 0.05, 0.2);
        assert!(approx(r.yaw, 0.55), "yaw {}", r.yaw);
        assert!(approx(r.pitch, -0.02), "pitch {}", r.pitch);
    }

    #[test]
    fn drift_keeps_advancing_after_long_uptime() {
        let clock = ManualClock::at(Duration::from_secs(1 << 20));
        let frame = Duration::from_micros(16_667);
        let mut last = CloudRotation::compute(clock.elapsed_secs(), PointerState::default(), 0.05, 0.2);

        for i in 0..60 {
            clock.advance(frame);
            let next =
                CloudRotation::compute(clock.elapsed_secs(), PointerState::default(), 0.05, 0.2);
            assert_ne!(next.yaw, last.yaw, "yaw stalled on frame {i}");
            assert!((0.0..std::f32::consts::TAU + 1e-3).contains(&next.yaw));
            last = next;
        }
    }

    #[test]
    fn drift_wraps_at_a_full_turn() {
        let period = std::f64::consts::TAU / 0.05;
        let r = CloudRotation::compute(period + 10.0, PointerState::default(), 0.05, 0.2);
        assert!(approx(r.yaw, 0.5), "yaw {}", r.yaw);
    }

    #[test]
    fn rotation_matrix_keeps_point_distances() {
        let r = CloudRotation { pitch: 0.3, yaw: 1.2 };
        let p = glam::Vec3::new(3.0, -4.0, 12.0);
        let q = r.matrix().transform_point3(p);
        assert!((q.length() - p.length()).abs() < 1e-4);
    }

    #[test]
    fn tick_applies_pointer_and_clock() {
        let mut host = FakeHost::with_surface("bg-3d");
        let clock = ManualClock::at(Duration::from_secs(10));
        let mut field = mount(&mut host, clock.clone()).unwrap();

        // 800x600 viewport: (500, 240) -> (0.125, -0.1)
        host.sender().pointer_moved(500.0, 240.0);
        assert_eq!(field.tick().unwrap(), TickOutcome::Rendered);

        let r = field.rotation();
        assert!(approx(r.yaw, 10.0 * 0.05 + 0.125 * 0.2));
        assert!(approx(r.pitch, -0.02));

        clock.advance(Duration::from_secs(2));
        field.tick().unwrap();
        assert!(approx(field.rotation().yaw, 12.0 * 0.05 + 0.125 * 0.2));
        assert_eq!(field.renderer().log.borrow().draws.len(), 2);
    }

    #[test]
    fn rotation_is_recomputed_not_accumulated() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        field.pointer_moved(800.0, 600.0);
        field.tick().unwrap();
        let first = field.rotation();
        field.tick().unwrap();
        field.tick().unwrap();
        assert_eq!(field.rotation(), first);
    }

    #[test]
    fn missing_surface_fails_before_listening() {
        let mut host = FakeHost::with_surface("other-canvas");
        let mut built = false;
        let result: Result<ParticleField<RecordingRenderer, ManualClock>> = ParticleField::init(
            &mut host,
            &Config::default(),
            ManualClock::default(),
            |_, _, _, _| {
                built = true;
                Ok(RecordingRenderer::default())
            },
        );

        match result {
            Err(FieldError::SurfaceNotFound(id)) => assert_eq!(id, "bg-3d"),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("init succeeded without a surface"),
        }
        assert!(!built);
        assert!(host.listeners.is_empty());
    }

    #[test]
    fn renderer_build_failure_is_reported_as_gpu_error() {
        let mut host = FakeHost::with_surface("bg-3d");
        let result: Result<ParticleField<RecordingRenderer, ManualClock>> = ParticleField::init(
            &mut host,
            &Config::default(),
            ManualClock::default(),
            |_, _, _, _| Err(anyhow::anyhow!("no adapter")),
        );
        assert!(matches!(result, Err(FieldError::Gpu(_))));
        assert!(host.listeners.is_empty());
    }

    #[test]
    fn init_builds_camera_and_cloud() {
        let mut host = FakeHost::with_surface("bg-3d");
        let field = mount(&mut host, ManualClock::default()).unwrap();

        let cam = field.camera();
        assert_eq!(cam.fov_y_deg, 75.0);
        assert_eq!(cam.z_near, 0.1);
        assert_eq!(cam.z_far, 1000.0);
        assert_eq!(cam.position, glam::Vec3::new(0.0, 0.0, 20.0));
        assert!(approx(cam.aspect, 800.0 / 600.0));

        assert_eq!(field.cloud().len(), 1500);
        assert_eq!(host.listeners.len(), 1);
        assert_eq!(
            field.renderer().log.borrow().sizes,
            vec![PhysicalSize::new(800, 600)]
        );
    }

    #[test]
    fn resize_updates_aspect_and_renderer_idempotently() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        field.resize(Viewport::new(800.0, 600.0, 1.0));
        field.resize(Viewport::new(1024.0, 768.0, 1.0));
        let proj = field.camera().proj();

        assert!(approx(field.camera().aspect, 1024.0 / 768.0));
        assert_eq!(
            field.renderer().log.borrow().sizes.last(),
            Some(&PhysicalSize::new(1024, 768))
        );

        field.resize(Viewport::new(1024.0, 768.0, 1.0));
        assert!(approx(field.camera().aspect, 1024.0 / 768.0));
        assert_eq!(field.camera().proj(), proj);
        assert_eq!(
            field.renderer().log.borrow().sizes.last(),
            Some(&PhysicalSize::new(1024, 768))
        );
    }

    #[test]
    fn resize_message_lands_before_next_draw() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        host.sender().resized(Viewport::new(1920.0, 1080.0, 3.0));
        field.tick().unwrap();

        assert!(approx(field.camera().aspect, 1920.0 / 1080.0));
        assert_eq!(field.viewport().pixel_ratio(), 2.0);
        assert_eq!(
            field.renderer().log.borrow().sizes.last(),
            Some(&PhysicalSize::new(3840, 2160))
        );
    }

    #[test]
    fn zero_area_resize_is_ignored() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        field.resize(Viewport::new(0.0, 0.0, 1.0));
        assert!(approx(field.camera().aspect, 800.0 / 600.0));
        assert_eq!(field.renderer().log.borrow().sizes.len(), 1);
    }

    #[test]
    fn pointer_bursts_never_delay_ticks() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        for i in 0..10_000 {
            assert!(host.sender().pointer_moved(i as f64 % 800.0, 300.0));
        }
        assert_eq!(field.run(FrameBudget::Frames(5)).unwrap(), 5);
        assert_eq!(field.renderer().log.borrow().draws.len(), 5);

        // Only the latest position matters.
        assert!(approx(field.pointer().x, (9_999.0 % 800.0) / 800.0 - 0.5));
    }

    #[test]
    fn bounded_budget_stops_the_loop() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();

        assert_eq!(field.run(FrameBudget::Frames(0)).unwrap(), 0);
        assert_eq!(field.run(FrameBudget::from(Some(3))).unwrap(), 3);
        assert_eq!(field.stats().rendered, 3);
        assert!(FrameBudget::Unbounded.allows(u64::MAX - 1));
    }

    #[test]
    fn lost_surface_is_reconfigured_and_frame_skipped() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();
        field.renderer().log.borrow_mut().failures.push(RenderError::Lost);

        assert_eq!(field.tick().unwrap(), TickOutcome::Skipped(RenderError::Lost));
        assert_eq!(field.renderer().log.borrow().sizes.len(), 2);
        assert_eq!(field.tick().unwrap(), TickOutcome::Rendered);
        assert_eq!(field.stats().skipped, 1);
        assert_eq!(field.stats().ticks(), 2);
    }

    #[test]
    fn out_of_memory_ends_the_loop() {
        let mut host = FakeHost::with_surface("bg-3d");
        let mut field = mount(&mut host, ManualClock::default()).unwrap();
        field
            .renderer()
            .log
            .borrow_mut()
            .failures
            .push(RenderError::OutOfMemory);

        let err = field.run(FrameBudget::Frames(10)).unwrap_err();
        assert!(matches!(err, FieldError::Render(RenderError::OutOfMemory)));
    }

    #[test]
    fn events_after_drop_are_discarded() {
        let mut host = FakeHost::with_surface("bg-3d");
        let field = mount(&mut host, ManualClock::default()).unwrap();
        drop(field);
        assert!(!host.sender().pointer_moved(1.0, 1.0));
    }
}
