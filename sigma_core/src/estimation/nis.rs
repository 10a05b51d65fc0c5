// sigma_core/src/estimation/nis.rs

//! Normalized Innovation Squared bookkeeping for offline noise tuning.
//! Nothing here feeds back into the filter.

use crate::estimation::update::Innovation;
use crate::messages::SensorKind;

/// 95th percentile of the χ² distribution for 1 to 5 degrees of freedom.
const CHI2_95: [f64; 5] = [3.841, 5.991, 7.815, 9.488, 11.070];

/// The 95% χ² bound for `dof` degrees of freedom, if tabulated.
pub fn chi2_95(dof: usize) -> Option<f64> {
    dof.checked_sub(1).and_then(|i| CHI2_95.get(i).copied())
}

/// Running NIS statistics for one sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NisStats {
    pub samples: usize,
    pub sum: f64,
    pub above_bound: usize,
}

impl NisStats {
    fn record(&mut self, nis: f64, bound: f64) {
        self.samples += 1;
        self.sum += nis;
        if nis > bound {
            self.above_bound += 1;
        }
    }

    pub fn mean(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.sum / self.samples as f64)
    }

    /// Share of samples above the 95% bound. A consistent filter sits near 0.05.
    pub fn fraction_above_bound(&self) -> Option<f64> {
        (self.samples > 0).then(|| self.above_bound as f64 / self.samples as f64)
    }
}

/// Per-sensor NIS consistency monitor.
#[derive(Debug, Clone, Default)]
pub struct NisMonitor {
    radar: NisStats,
    laser: NisStats,
}

impl NisMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, innovation: &Innovation) {
        let sensor = innovation.sensor();
        // Every sensor dimension is tabulated.
        let bound = chi2_95(sensor.dim()).unwrap_or(f64::INFINITY);
        let stats = match sensor {
            SensorKind::Radar => &mut self.radar,
            SensorKind::Laser => &mut self.laser,
        };
        stats.record(innovation.nis(), bound);
    }

    pub fn stats(&self, sensor: SensorKind) -> &NisStats {
        match sensor {
            SensorKind::Radar => &self.radar,
            SensorKind::Laser => &self.laser,
        }
    }
}
