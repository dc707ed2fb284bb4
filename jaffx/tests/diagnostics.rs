//! Load instrumentation with debug enabled.

mod common;

use common::{CountingMeter, Event, Log, StandInHardware};
use jaffx::config::REPORT_INTERVAL_MS;
use jaffx::{Console, Instance, Lifecycle, Program, ACTIVE};

struct Silence {
    log: Log,
}

impl Program for Silence {
    fn init(&mut self, _console: &mut dyn Console) {
        self.log.borrow_mut().push(Event::UserInit {
            registered: ACTIVE.is_registered(),
        });
    }

    fn process_audio(&mut self, _input: f32) -> f32 {
        0.0
    }
}

#[test]
fn meter_wraps_every_block_and_reports_are_throttled() {
    let log = common::log();
    let instance = Box::leak(Box::new(
        Instance::new(
            Silence { log: log.clone() },
            CountingMeter::new(log.clone()),
        )
        .with_debug(true),
    ));
    let hardware = StandInHardware::new(log.clone());
    let mut streaming = Lifecycle::new(instance, hardware, common::heap(log.clone())).launch();

    let events = log.borrow().clone();
    let meter_init = events
        .iter()
        .position(|e| matches!(e, Event::MeterInit { .. }))
        .expect("meter was not initialized");
    let start_audio = events
        .iter()
        .position(|e| matches!(e, Event::StartAudio { .. }))
        .unwrap();
    let start_log = events.iter().position(|e| *e == Event::StartLog).unwrap();
    let user_init = events
        .iter()
        .position(|e| matches!(e, Event::UserInit { .. }))
        .unwrap();
    assert_eq!(events[user_init], Event::UserInit { registered: true });
    assert!(user_init < start_log);
    assert!(start_log < meter_init);
    assert!(meter_init < start_audio);
    assert_eq!(
        events[meter_init],
        Event::MeterInit {
            sample_rate: 48_000.0,
            block_size: 128,
        }
    );
    assert_eq!(streaming.instance().meter().inits.get(), 1);
    assert_eq!(streaming.instance().meter().starts.get(), 0);

    let input = [0.3; 128];
    for block in 1..=5 {
        let (left, right) = streaming.hardware_mut().run_block(&input);
        assert!(left.iter().all(|x| *x == 0.0));
        assert_eq!(left, right);
        assert_eq!(streaming.instance().meter().starts.get(), block);
        assert_eq!(streaming.instance().meter().ends.get(), block);
    }

    streaming.step();
    assert_eq!(
        streaming.hardware().lines,
        [
            "Processing Load:",
            "Max: 50.000%",
            "Avg: 25.000%",
            "Min: 12.500%",
        ]
    );
    assert_eq!(streaming.hardware().delays, [REPORT_INTERVAL_MS]);

    streaming.step();
    assert_eq!(streaming.hardware().lines.len(), 8);
    assert_eq!(streaming.hardware().delays.len(), 2);
    assert_eq!(streaming.instance().meter().inits.get(), 1);
}
