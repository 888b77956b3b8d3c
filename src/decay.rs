/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f32) -> f32;
}

fn validate(vi: f32, vf: f32, horizon: f32) -> Result<(), String> {
    if horizon.is_nan() || horizon <= 0.0 {
        return Err(String::from("`horizon` must be positive"));
    }
    (vi >= vf)
        .then_some(())
        .ok_or_else(|| String::from("`vi` must not be less than `vf`"))
}

/// v(t) = max(v<sub>i</sub> - (v<sub>i</sub> - v<sub>f</sub>) * t / h, v<sub>f</sub>)
///
/// Falls from `vi` to `vf` in a straight line over `h` units of time and stays at `vf` afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    horizon: f32,
    vi: f32,
    vf: f32,
}

impl Linear {
    pub fn new(horizon: f32, vi: f32, vf: f32) -> Result<Self, String> {
        validate(vi, vf, horizon)?;
        Ok(Self { horizon, vi, vf })
    }

    pub fn horizon(&self) -> f32 {
        self.horizon
    }
}

impl Default for Linear {
    fn default() -> Self {
        Self {
            horizon: 1.0,
            vi: 1.0,
            vf: 0.0,
        }
    }
}

impl Decay for Linear {
    fn evaluate(&self, t: f32) -> f32 {
        let &Self { horizon, vi, vf } = self;
        (vi - (vi - vf) * t / horizon).max(vf)
    }
}
