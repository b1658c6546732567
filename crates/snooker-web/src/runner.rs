use snooker_engine::core::ball::BALL_COUNT;
use snooker_engine::{
    Intent, JsonStatsStore, NetMessage, ProtocolLayout, SessionConfig, SnookerSession,
};

/// Owns the session and the flat buffer the renderer reads every frame.
///
/// wasm-bindgen cannot export a stateful struct with borrowed buffers
/// cleanly, so `lib.rs` keeps one runner in a `thread_local!` and exposes
/// free functions over it.
pub struct SessionRunner {
    session: SnookerSession<JsonStatsStore>,
    layout: ProtocolLayout,
    buffer: Vec<f32>,
    frame_counter: u64,
}

impl SessionRunner {
    pub fn new(config: SessionConfig, stats: JsonStatsStore) -> Self {
        let layout = ProtocolLayout::new(BALL_COUNT, config.max_sounds, config.max_events);
        let buffer = layout.allocate();
        Self {
            session: SnookerSession::new(config, stats),
            layout,
            buffer,
            frame_counter: 0,
        }
    }

    /// Advance the session and rebuild the frame buffer.
    pub fn tick(&mut self, dt: f32) {
        self.session.tick(dt);
        self.frame_counter += 1;
        self.session
            .write_buffer(&self.layout, &mut self.buffer, self.frame_counter);
    }

    pub fn push_intent(&mut self, intent: Intent) {
        self.session.push_intent(intent);
    }

    pub fn session_mut(&mut self) -> &mut SnookerSession<JsonStatsStore> {
        &mut self.session
    }

    /// Apply one peer message. Returns false (and logs) when it was rejected.
    pub fn receive_message(&mut self, json: &str) -> bool {
        match self.session.receive_message(json) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Peer message rejected: {}", e);
                false
            }
        }
    }

    /// Outgoing peer messages as a JSON array.
    pub fn drain_outbox_json(&mut self) -> String {
        let messages: Vec<NetMessage> = self.session.drain_outbox();
        serde_json::to_string(&messages).unwrap_or_else(|e| {
            log::error!("Could not encode outbox: {}", e);
            "[]".to_string()
        })
    }

    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.session.snapshot()).unwrap_or_else(|e| {
            log::error!("Could not encode snapshot: {}", e);
            "{}".to_string()
        })
    }

    pub fn stats_json(&self) -> String {
        self.session.store().to_json().unwrap_or_else(|e| {
            log::error!("Could not encode stats: {}", e);
            "{}".to_string()
        })
    }

    pub fn status_message(&self) -> String {
        self.session.status_message().unwrap_or_default().to_string()
    }

    // ---- Buffer accessors for SharedArrayBuffer reads ----

    pub fn buffer_ptr(&self) -> *const f32 {
        self.buffer.as_ptr()
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    pub fn max_balls(&self) -> u32 {
        self.layout.max_balls as u32
    }

    pub fn max_sounds(&self) -> u32 {
        self.layout.max_sounds as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }
}
