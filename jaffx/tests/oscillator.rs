//! A generator keeps its phase across block boundaries.

mod common;

use common::StandInHardware;
use jaffx::dsp::SinOsc;
use jaffx::{Instance, Lifecycle, NullMeter, Program};

const FREQUENCY: f32 = 480.0;
// 48 kHz / 480 Hz; deliberately not a divisor of the block size.
const PERIOD: usize = 100;

struct Oscillator {
    osc: SinOsc,
}

impl Program for Oscillator {
    fn process_audio(&mut self, _input: f32) -> f32 {
        self.osc.process_sample()
    }
}

#[test]
fn output_repeats_with_generator_period() {
    let log = common::log();
    let program = Oscillator {
        osc: SinOsc::new(Oscillator::SAMPLE_RATE as f32, FREQUENCY),
    };
    let instance = Box::leak(Box::new(Instance::new(program, NullMeter)));
    let mut streaming =
        Lifecycle::new(instance, StandInHardware::new(log.clone()), common::heap(log)).launch();

    let silence = [0.0; Oscillator::BLOCK_SIZE];
    let mut output = Vec::new();
    for _ in 0..6 {
        let (left, right) = streaming.hardware_mut().run_block(&silence);
        assert_eq!(left, right);
        output.extend(left);
    }

    assert_eq!(output[0], 0.0);
    for i in 0..output.len() - PERIOD {
        assert!(
            (output[i] - output[i + PERIOD]).abs() < 1e-3,
            "sample {} differs from one period later: {} vs {}",
            i,
            output[i],
            output[i + PERIOD]
        );
    }
    let peak = output.iter().fold(0.0f32, |a, b| a.max(b.abs()));
    assert!((peak - 1.0).abs() < 1e-3);
}
