use std::time::Instant;

/// Wall-clock frame timer.
#[derive(Debug, Clone)]
pub struct Time {
    start_time: Instant,
    last_update_time: Instant,
    pub delta_seconds: f32,
    pub total_seconds: f32,
    pub frame_count: u64,
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update_time: now,
            delta_seconds: 0.0,
            total_seconds: 0.0,
            frame_count: 0,
        }
    }

    /// Advances the clock to now and returns the elapsed seconds since the last update.
    pub fn update(&mut self) -> f32 {
        let now = Instant::now();
        self.delta_seconds = now.duration_since(self.last_update_time).as_secs_f32();
        self.total_seconds = now.duration_since(self.start_time).as_secs_f32();
        self.last_update_time = now;
        self.frame_count += 1;
        self.delta_seconds
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    pub fn total_seconds(&self) -> f32 {
        self.total_seconds
    }

    /// Average frames per second since the clock was created.
    pub fn average_fps(&self) -> f32 {
        if self.total_seconds > 0.0 {
            self.frame_count as f32 / self.total_seconds
        } else {
            0.0
        }
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}
