//! Static NMEA sample corpus: a small set of syntactically valid GGA/RMC
//! sentences sufficient to exercise cycling and ring-buffer wraparound, not
//! a claim of GPS fidelity.

pub const SAMPLES: &[&str] = &[
    "$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\n",
    "$GPRMC,123519,A,4807.038,N,01131.000,E,022.4,084.4,230394,003.1,W*6A\n",
    "$GPGGA,123520,4807.041,N,01130.998,E,1,08,0.9,545.6,M,46.9,M,,*4E\n",
    "$GPRMC,123520,A,4807.041,N,01130.998,E,022.5,084.6,230394,003.1,W*6D\n",
];

pub struct SampleCycle {
    index: usize,
}

impl SampleCycle {
    pub fn new() -> Self {
        Self { index: 0 }
    }

    pub fn current(&self) -> &'static str {
        SAMPLES[self.index]
    }

    pub fn advance(&mut self) {
        self.index = (self.index + 1) % SAMPLES.len();
    }
}

impl Default for SampleCycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_back_to_first_sample() {
        let mut cycle = SampleCycle::new();
        let first = cycle.current();
        for _ in 0..SAMPLES.len() {
            cycle.advance();
        }
        assert_eq!(cycle.current(), first);
    }

    #[test]
    fn every_sample_ends_with_newline() {
        for sample in SAMPLES {
            assert!(sample.ends_with('\n'));
        }
    }
}
