//! First-order low-pass filter

/// Exponential smoothing with a time constant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirstOrderFilter {
    x: f32,
    k: f32,
}

impl FirstOrderFilter {
    /// Create a filter starting at `x0` with time constant `ts` sampled every `dt` seconds
    pub fn new(x0: f32, ts: f32, dt: f32) -> Self {
        assert!(ts > 0.0 && dt > 0.0, "Time constant and step must be positive");
        let r = dt / ts;
        Self {
            x: x0,
            k: r / (1.0 + r),
        }
    }

    /// Feed one sample and get the filtered value
    pub fn update(&mut self, input: f32) -> f32 {
        self.x = (1.0 - self.k) * self.x + self.k * input;
        self.x
    }

    pub fn value(&self) -> f32 {
        self.x
    }

    pub fn reset(&mut self, x0: f32) {
        self.x = x0;
    }
}
