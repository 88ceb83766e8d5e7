//! The per-frame loop: update interaction state, rebuild transforms, then
//! issue the globe pass followed by one line draw per visible marker.

use foundation::math::{mat4_to_f32, SingularMatrixError, Vec2};
use foundation::{DayIndex, TextureHandle};
use formats::ViewerConfig;
use runtime::{
    step, DragGesture, Event, EventBus, Frame, FrameClock, InteractionState, LongitudeTracker,
    SessionEvent, StateError, StepOutcome, DRAG_SENSITIVITY_DEG_PER_PX,
};
use scene::{visible_markers, Camera, Globe, RowStore, Viewport};

use crate::mesh::{build_segment_mesh, build_sphere_mesh, MARKER_LENGTH};
use crate::renderer::{
    BackendError, GraphicsBackend, RenderFrame, RenderObject, UniformValues,
};
use crate::shading::{
    GlobeUniforms, LightingParams, MarkerUniforms, GLOBE_PROGRAM, MARKER_PROGRAM,
    PLACEHOLDER_TEXEL,
};

/// Startup failures. Nothing is rendered after one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum InitError {
    ContextUnavailable(String),
    NoMarkerRows,
    Backend(BackendError),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::ContextUnavailable(msg) => write!(f, "graphics context unavailable: {msg}"),
            InitError::NoMarkerRows => write!(f, "dataset has no marker rows"),
            InitError::Backend(e) => write!(f, "resource creation failed: {e}"),
        }
    }
}

impl std::error::Error for InitError {}

impl From<BackendError> for InitError {
    fn from(e: BackendError) -> Self {
        InitError::Backend(e)
    }
}

/// A frame that could not be drawn. The loop carries on with the next one.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameError {
    Transform(SingularMatrixError),
    Backend(BackendError),
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Transform(e) => write!(f, "transform error: {e}"),
            FrameError::Backend(e) => write!(f, "submit failed: {e}"),
        }
    }
}

impl std::error::Error for FrameError {}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverSettings {
    pub initial: InteractionState,
    pub drag_sensitivity: f64,
    pub lighting: LightingParams,
    pub camera: Camera,
    pub globe: Globe,
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self {
            initial: InteractionState::default(),
            drag_sensitivity: DRAG_SENSITIVITY_DEG_PER_PX,
            lighting: LightingParams::default(),
            camera: Camera::fixed(),
            globe: Globe::default(),
        }
    }
}

impl DriverSettings {
    pub fn from_config(config: &ViewerConfig) -> Result<Self, StateError> {
        let initial = InteractionState::new(
            config.initial.day,
            config.initial.latitude,
            config.initial.longitude,
            config.initial.animate,
            config.initial.velocity.clone(),
        )?;
        Ok(Self {
            initial,
            drag_sensitivity: config.drag_sensitivity,
            lighting: LightingParams::from(&config.lighting),
            ..Self::default()
        })
    }
}

/// Summary of one driven frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameReport {
    pub frame: Frame,
    pub outcome: StepOutcome,
    pub day: DayIndex,
    pub latitude: f64,
    pub longitude: f64,
    pub draw_calls: usize,
}

impl FrameReport {
    /// Draw calls after the globe pass.
    pub fn markers(&self) -> usize {
        self.draw_calls.saturating_sub(1)
    }
}

pub struct FrameDriver {
    settings: DriverSettings,
    state: InteractionState,
    drag: DragGesture,
    tracker: LongitudeTracker,
    clock: FrameClock,
    bus: EventBus,
    rows: RowStore,
    globe_object: RenderObject,
    marker_object: RenderObject,
    texture: TextureHandle,
}

impl FrameDriver {
    /// Creates the two render objects and the placeholder texture.
    pub fn new(
        settings: DriverSettings,
        rows: RowStore,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<Self, InitError> {
        if rows.is_empty() {
            return Err(InitError::NoMarkerRows);
        }

        let globe = settings.globe;
        let globe_object = RenderObject::create(
            backend,
            &GLOBE_PROGRAM,
            &build_sphere_mesh(globe.radius, globe.longitude_segments, globe.latitude_segments),
        )?;
        let marker_object = RenderObject::create(
            backend,
            &MARKER_PROGRAM,
            &build_segment_mesh(MARKER_LENGTH),
        )?;
        let texture = backend.create_texture(1, 1, &PLACEHOLDER_TEXEL)?;

        let state = settings.initial.clone();
        tracing::info!(
            rows = rows.len(),
            day = %state.day(),
            "frame driver initialized"
        );

        Ok(Self {
            tracker: LongitudeTracker::new(state.longitude()),
            state,
            drag: DragGesture::new(),
            clock: FrameClock::new(),
            bus: EventBus::new(),
            rows,
            globe_object,
            marker_object,
            texture,
            settings,
        })
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Direct access for user-control writes between frames.
    pub fn state_mut(&mut self) -> &mut InteractionState {
        &mut self.state
    }

    pub fn rows(&self) -> &RowStore {
        &self.rows
    }

    pub fn settings(&self) -> &DriverSettings {
        &self.settings
    }

    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    pub fn events(&self) -> &[Event] {
        self.bus.events()
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.bus.drain()
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> bool {
        let started = self.drag.pointer_down(&self.state, Vec2::new(x, y));
        if started {
            self.bus.emit(
                self.clock.frames_emitted(),
                SessionEvent::DragStarted {
                    latitude: self.state.latitude(),
                    longitude: self.state.longitude(),
                },
            );
        }
        started
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<bool, StateError> {
        self.drag
            .pointer_move(&mut self.state, Vec2::new(x, y), self.settings.drag_sensitivity)
    }

    pub fn pointer_up(&mut self) -> bool {
        let ended = self.drag.pointer_up();
        if ended {
            self.bus
                .emit(self.clock.frames_emitted(), SessionEvent::DragEnded);
        }
        ended
    }

    /// Swaps the decoded map image into the globe's texture slot.
    pub fn replace_texture(
        &self,
        backend: &mut dyn GraphicsBackend,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<(), BackendError> {
        backend.replace_texture(self.texture, width, height, rgba)
    }

    /// Drives one frame from an animation-frame timestamp.
    pub fn frame_at(
        &mut self,
        now_ms: f64,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<FrameReport, FrameError> {
        let frame = self.clock.tick_ms(now_ms);
        self.render(frame, backend)
    }

    /// Drives one frame with a fixed time step.
    pub fn advance(
        &mut self,
        dt_s: f64,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<FrameReport, FrameError> {
        let frame = self.clock.tick_fixed(dt_s);
        self.render(frame, backend)
    }

    fn render(
        &mut self,
        frame: Frame,
        backend: &mut dyn GraphicsBackend,
    ) -> Result<FrameReport, FrameError> {
        let outcome = self.update(frame);
        let render_frame = self
            .build_frame(backend.viewport())
            .map_err(FrameError::Transform)?;
        backend.submit(&render_frame).map_err(FrameError::Backend)?;

        Ok(FrameReport {
            frame,
            outcome,
            day: self.state.day(),
            latitude: self.state.latitude(),
            longitude: self.state.longitude(),
            draw_calls: render_frame.calls.len(),
        })
    }

    /// Rotation and day advance for one frame.
    pub fn update(&mut self, frame: Frame) -> StepOutcome {
        let outcome = step(frame, &mut self.state, &mut self.tracker, &mut self.bus);

        if outcome.rejection_reported {
            tracing::warn!(
                velocity = self.state.velocity(),
                "velocity is not an integer; rotation paused"
            );
        }

        if let Some((from, to)) = outcome.day_advanced {
            tracing::debug!(frame = frame.index, %from, %to, "day advanced");
        }
        outcome
    }

    /// Draw calls for the current state: the globe first, then markers in
    /// dataset order.
    pub fn build_frame(&self, viewport: Viewport) -> Result<RenderFrame, SingularMatrixError> {
        let vp = self.settings.camera.view_projection(viewport)?;
        let latitude = self.state.latitude();
        let longitude = self.state.longitude();
        let transforms = self.settings.globe.transforms(&vp, latitude, longitude)?;

        let mut frame = RenderFrame::new(viewport);
        frame.calls.push(self.globe_object.draw(
            UniformValues::Globe(GlobeUniforms::new(&transforms, &self.settings.lighting)),
            Some(self.texture),
        ));

        let day = self.state.day();
        for marker in visible_markers(&self.rows, day, latitude, longitude, &vp) {
            frame.calls.push(self.marker_object.draw(
                UniformValues::Marker(MarkerUniforms {
                    matrix: mat4_to_f32(&marker.matrix),
                    color: marker.tier.rgba(),
                }),
                None,
            ));
        }
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::{DriverSettings, FrameDriver, InitError};
    use crate::renderer::{Primitive, RecordingBackend, UniformValues};
    use crate::shading::PLACEHOLDER_TEXEL;
    use foundation::{DayIndex, DAY_COUNT};
    use formats::ViewerConfig;
    use pretty_assertions::assert_eq;
    use runtime::{InteractionState, SessionEvent};
    use scene::{LocationRow, RowStore, Viewport};

    fn row(lat: f64, lon: f64, values: &[(usize, f64)]) -> LocationRow {
        let mut all = vec![0.0; DAY_COUNT];
        for &(i, v) in values {
            all[i] = v;
        }
        LocationRow::new(lat, lon, &all).unwrap()
    }

    fn backend() -> RecordingBackend {
        RecordingBackend::new(Viewport::new(800.0, 600.0))
    }

    fn driver(rows: Vec<LocationRow>, backend: &mut RecordingBackend) -> FrameDriver {
        FrameDriver::new(DriverSettings::default(), rows.into_iter().collect(), backend).unwrap()
    }

    fn settings_with(state: InteractionState) -> DriverSettings {
        DriverSettings {
            initial: state,
            ..DriverSettings::default()
        }
    }

    #[test]
    fn empty_dataset_is_fatal() {
        let mut backend = backend();
        let err = FrameDriver::new(DriverSettings::default(), RowStore::new(), &mut backend)
            .err()
            .unwrap();
        assert_eq!(err, InitError::NoMarkerRows);
        assert!(backend.programs.is_empty());
    }

    #[test]
    fn initialization_creates_objects_and_placeholder() {
        let mut backend = backend();
        let d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        assert_eq!(backend.programs.len(), 2);
        assert_eq!(backend.meshes[1].positions[1], [0.0, 0.0, 21.0]);
        assert_eq!(backend.textures[d.texture().index() as usize].rgba, PLACEHOLDER_TEXEL.to_vec());
    }

    #[test]
    fn observed_row_draws_a_green_marker() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        let report = d.advance(0.0, &mut backend).unwrap();
        assert_eq!(report.draw_calls, 2);
        assert_eq!(report.markers(), 1);

        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.clear_color, [0.0, 0.0, 0.0, 0.0]);
        assert_eq!(frame.calls[0].primitive, Primitive::Triangles);
        assert_eq!(frame.calls[0].texture, Some(d.texture()));
        assert_eq!(frame.calls[1].primitive, Primitive::Lines);
        assert_eq!(frame.calls[1].count, 2);
        match frame.calls[1].uniforms {
            UniformValues::Marker(m) => assert_eq!(m.color, [0.0, 1.0, 0.0, 1.0]),
            other => panic!("expected marker uniforms, got {other:?}"),
        }
    }

    #[test]
    fn zero_value_row_is_skipped() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(1, 40.0)])], &mut backend);
        let report = d.advance(0.0, &mut backend).unwrap();
        assert_eq!(report.markers(), 0);
        assert_eq!(backend.last_frame().unwrap().calls.len(), 1);
    }

    #[test]
    fn first_timestamp_does_not_rotate() {
        let mut backend = backend();
        let state = InteractionState::new(1, 0.0, 10.0, true, "50").unwrap();
        let mut d = FrameDriver::new(
            settings_with(state),
            [row(0.0, 0.0, &[(0, 1.0)])].into_iter().collect(),
            &mut backend,
        )
        .unwrap();
        let first = d.frame_at(1000.0, &mut backend).unwrap();
        assert_eq!(first.longitude, 10.0);
        let second = d.frame_at(1100.0, &mut backend).unwrap();
        assert!((second.longitude - 5.0).abs() < 1e-9);
    }

    #[test]
    fn spinning_through_meridian_moves_to_next_day() {
        let mut backend = backend();
        let state = InteractionState::new(1, 0.0, 3.0, true, "50").unwrap();
        let mut d = FrameDriver::new(
            settings_with(state),
            [row(0.0, 0.0, &[(1, 50.0)])].into_iter().collect(),
            &mut backend,
        )
        .unwrap();

        assert_eq!(d.advance(0.0, &mut backend).unwrap().markers(), 0);
        let report = d.advance(0.1, &mut backend).unwrap();
        assert_eq!(report.day, DayIndex::new(2).unwrap());
        assert_eq!(report.markers(), 1);
        match backend.last_frame().unwrap().calls[1].uniforms {
            UniformValues::Marker(m) => assert_eq!(m.color, [0.0, 1.0, 1.0, 1.0]),
            other => panic!("expected marker uniforms, got {other:?}"),
        }
        assert!(d
            .events()
            .iter()
            .any(|e| matches!(e.event, SessionEvent::DayAdvanced { .. })));
    }

    #[test]
    fn drag_rotates_and_reports_events() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        assert!(d.pointer_down(100.0, 100.0));
        assert!(!d.pointer_down(0.0, 0.0));
        assert!(d.pointer_move(140.0, 60.0).unwrap());
        assert_eq!(d.state().longitude(), -20.0);
        assert_eq!(d.state().latitude(), -20.0);
        assert!(d.pointer_up());
        assert!(!d.pointer_move(0.0, 0.0).unwrap());

        let events: Vec<_> = d.drain_events().into_iter().map(|e| e.event).collect();
        assert_eq!(
            events,
            vec![
                SessionEvent::DragStarted {
                    latitude: 0.0,
                    longitude: 0.0
                },
                SessionEvent::DragEnded,
            ]
        );
        assert!(d.events().is_empty());
    }

    #[test]
    fn bad_velocity_keeps_rendering() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        d.state_mut().set_animate(true);
        d.state_mut().set_velocity("fast");
        for _ in 0..3 {
            let report = d.advance(0.5, &mut backend).unwrap();
            assert!(report.outcome.velocity_rejected);
            assert_eq!(report.longitude, 0.0);
        }
        assert_eq!(backend.frames.len(), 3);
    }

    #[test]
    fn bad_velocity_is_announced_once_while_draining() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        d.state_mut().set_animate(true);
        d.state_mut().set_velocity("fast");
        let mut announced = 0;
        let mut reported = 0;
        for _ in 0..60 {
            let report = d.advance(1.0 / 60.0, &mut backend).unwrap();
            reported += usize::from(report.outcome.rejection_reported);
            announced += d
                .drain_events()
                .iter()
                .filter(|e| matches!(e.event, SessionEvent::VelocityRejected { .. }))
                .count();
        }
        assert_eq!(announced, 1);
        assert_eq!(reported, 1);
    }

    #[test]
    fn settings_follow_config() {
        let mut config = ViewerConfig::default();
        config.initial.day = 7;
        config.initial.velocity = "15".to_string();
        config.drag_sensitivity = 0.25;
        config.lighting.brightness = 2.0;
        let s = DriverSettings::from_config(&config).unwrap();
        assert_eq!(s.initial.day().get(), 7);
        assert_eq!(s.initial.velocity_deg_per_s(), Some(15));
        assert_eq!(s.drag_sensitivity, 0.25);
        assert_eq!(s.lighting.brightness, 2.0);
    }

    #[test]
    fn texture_replacement_keeps_handle() {
        let mut backend = backend();
        let mut d = driver(vec![row(0.0, 0.0, &[(0, 5.0)])], &mut backend);
        d.replace_texture(&mut backend, 2, 2, &[128; 16]).unwrap();
        d.advance(0.0, &mut backend).unwrap();
        let frame = backend.last_frame().unwrap();
        assert_eq!(frame.calls[0].texture, Some(d.texture()));
        assert_eq!(backend.textures.len(), 1);
        assert_eq!(backend.textures[0].width, 2);
    }
}
