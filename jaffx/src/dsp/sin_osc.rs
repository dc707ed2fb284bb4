use core::f32::consts::PI;

#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SinOsc {
    sample_rate: f32,
    phase: f32,
    step: f32,
}

impl SinOsc {
    pub fn new(sample_rate: f32, frequency: f32) -> Self {
        Self {
            sample_rate,
            phase: 0.0,
            step: frequency / sample_rate,
        }
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.step = frequency / self.sample_rate;
    }

    pub fn process_sample(&mut self) -> f32 {
        const PI_2: f32 = PI * 2.0;

        let sample = libm::sinf(PI_2 * self.phase);
        self.phase += self.step;
        self.phase -= libm::floorf(self.phase);
        // Tiny negative phases round up to exactly 1.0.
        if self.phase >= 1.0 {
            self.phase = 0.0;
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero_crossing() {
        let mut osc = SinOsc::new(48_000.0, 440.0);
        assert_eq!(osc.process_sample(), 0.0);
        assert!(osc.process_sample() > 0.0);
    }

    #[test]
    fn quarter_period_peaks() {
        let mut osc = SinOsc::new(48_000.0, 1200.0);
        let samples: [f32; 11] = core::array::from_fn(|_| osc.process_sample());
        assert!((samples[10] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn frequency_change_keeps_phase() {
        let mut osc = SinOsc::new(48_000.0, 1200.0);
        for _ in 0..5 {
            osc.process_sample();
        }
        osc.set_frequency(2400.0);
        // Phase is at 1/8 of a period, jumping by 1/20 per sample now.
        let expected = libm::sinf(PI * 2.0 * 0.125);
        assert!((osc.process_sample() - expected).abs() < 1e-5);
    }

    #[test]
    fn phase_stays_in_unit_interval_for_any_frequency() {
        for frequency in [-440.0, -60_000.0, 48_000.0, 72_000.0] {
            let mut osc = SinOsc::new(48_000.0, frequency);
            for _ in 0..1_000_000 {
                let sample = osc.process_sample();
                assert!((-1.0..=1.0).contains(&sample));
            }
            assert!((0.0..1.0).contains(&osc.phase), "{}: {}", frequency, osc.phase);
        }
    }

    #[test]
    fn negative_frequency_runs_backwards() {
        let mut forward = SinOsc::new(48_000.0, 440.0);
        let mut backward = SinOsc::new(48_000.0, -440.0);
        for _ in 0..1000 {
            let f = forward.process_sample();
            let b = backward.process_sample();
            assert!((f + b).abs() < 1e-3);
        }
    }
}
