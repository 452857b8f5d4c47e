//! Temperature-vs-time trajectory of an annealed run.

use crate::StageRecord;

/// Per-stage durations and temperatures, in stage order.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureTrajectory {
    durations: Vec<f64>,
    temps: Vec<f64>,
}

impl TemperatureTrajectory {
    /// Build from accepted stages. `None` if any stage lacks either field
    /// or there are no stages.
    pub fn from_stages(stages: &[StageRecord], time_field: &str, temp_field: &str) -> Option<Self> {
        if stages.is_empty() {
            return None;
        }
        let mut durations = Vec::with_capacity(stages.len());
        let mut temps = Vec::with_capacity(stages.len());
        for stage in stages {
            durations.push(stage.fields.get(time_field)?);
            temps.push(stage.fields.get(temp_field)?);
        }
        Some(Self { durations, temps })
    }

    pub fn len(&self) -> usize {
        self.temps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temps.is_empty()
    }

    pub fn total_time(&self) -> f64 {
        self.durations.iter().sum()
    }

    /// Resample onto `points` evenly spaced times over `[0, total_time]`.
    ///
    /// Each sample takes the temperature of the stage whose cumulative
    /// time window contains it.
    pub fn resample(&self, points: usize) -> Vec<(f64, f64)> {
        if points == 0 || self.is_empty() {
            return Vec::new();
        }
        let total = self.total_time();
        let step = if points > 1 {
            total / (points - 1) as f64
        } else {
            0.0
        };
        let last = self.len() - 1;

        let mut out = Vec::with_capacity(points);
        let mut stage = 0;
        let mut window_end = self.durations[0];
        for i in 0..points {
            let t = if i + 1 == points { total } else { step * i as f64 };
            while t > window_end && stage < last {
                stage += 1;
                window_end += self.durations[stage];
            }
            out.push((t, self.temps[stage]));
        }
        out
    }
}
