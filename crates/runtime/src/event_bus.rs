use foundation::DayIndex;

/// Something that changed the session state.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Auto-animation turned the globe; `longitude` is the new value.
    Rotated { longitude: f64 },
    DayAdvanced { from: DayIndex, to: DayIndex },
    /// Auto-animation is on but the velocity text has no integer prefix.
    VelocityRejected { text: String },
    DragStarted { latitude: f64, longitude: f64 },
    DragEnded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub frame_index: u64,
    pub event: SessionEvent,
}

/// Ordered log of session events, tagged with the frame they belong to.
#[derive(Debug, Default)]
pub struct EventBus {
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, frame_index: u64, event: SessionEvent) {
        self.events.push(Event { frame_index, event });
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
