use foundation::time::Time;

/// Per-frame timing metadata.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Seconds since the previous frame.
    pub dt_s: f64,
    /// Host time at the start of the frame.
    pub time: Time,
}

/// Turns host timestamps into [`Frame`]s.
///
/// The first frame reports `dt_s == 0`; later frames report the elapsed time
/// since the previous tick. Timestamps that run backwards clamp to zero.
#[derive(Debug, Default, Clone)]
pub struct FrameClock {
    last: Option<Time>,
    next_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick from an animation-frame timestamp in milliseconds.
    pub fn tick_ms(&mut self, now_ms: f64) -> Frame {
        let now = Time::from_millis(now_ms);
        let dt_s = match self.last {
            Some(prev) if now.0.is_finite() => now.since(prev),
            _ => 0.0,
        };
        self.last = Some(now);
        self.emit(dt_s, now)
    }

    /// Tick by a fixed step, for headless playback.
    pub fn tick_fixed(&mut self, dt_s: f64) -> Frame {
        let dt_s = if dt_s.is_finite() { dt_s.max(0.0) } else { 0.0 };
        let now = Time(self.last.map_or(0.0, |t| t.0) + dt_s);
        self.last = Some(now);
        self.emit(dt_s, now)
    }

    pub fn frames_emitted(&self) -> u64 {
        self.next_index
    }

    fn emit(&mut self, dt_s: f64, time: Time) -> Frame {
        let frame = Frame {
            index: self.next_index,
            dt_s,
            time,
        };
        self.next_index = self.next_index.wrapping_add(1);
        frame
    }
}
