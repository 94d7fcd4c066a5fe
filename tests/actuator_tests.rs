//! Integration tests for the actuator tasks

mod common;
use common::*;

use prop_sequencer::sim::{SimClock, SimDuration, Simulation};
use prop_sequencer::{
    ActuatorKind, ActuatorTask, AudioPlayback, COLOR_OFF, COLOR_RED, Clock, Color, DecayMode,
    Error, LightAnimation, LightConfig, LightPolicy, MotorConfig, MotorRamp, Playlist, Task,
};
use rand::rngs::mock::StepRng;

fn zero_rng() -> StepRng {
    StepRng::new(0, 0)
}

fn red_only() -> LightConfig {
    LightConfig {
        cycles: 0,
        ..LightConfig::default()
    }
}

#[test]
fn light_fade_stops_short_of_target_then_flashes_red_and_goes_dark() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let light = LightAnimation::new(MockLight::new(&clock, history.clone()), &clock, zero_rng(), red_only())
        .unwrap();
    let mut task = ActuatorTask::new("led", &signals, light);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    let colors = values(&history);
    assert_eq!(colors.len(), 22);
    // 255 / 20 rounds down to 12, so twenty steps reach 240.
    assert_eq!(colors[0], Color::new(12, 0, 0));
    assert_eq!(colors[19], Color::new(240, 0, 0));
    assert_eq!(colors[20], COLOR_RED);
    assert_eq!(colors[21], COLOR_OFF);

    let stamps = times(&history);
    assert_eq!(stamps[1] - stamps[0], 25);
    // 20 steps of 25 ms, then the pause before the flash.
    assert_eq!(stamps[20], 1500);
    assert_eq!(stamps[21], 2500);

    assert!(signals.done.is_set());
    assert!(!signals.trigger.is_set());
    assert_eq!(task.completed(), 1);
}

#[test]
fn light_fade_carries_its_color_into_the_next_segment() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let config = LightConfig {
        cycles: 2,
        ..LightConfig::default()
    };
    // Targets (200, 222, 244), then (10, 32, 54).
    let rng = StepRng::new(200, 22);
    let light = LightAnimation::new(MockLight::new(&clock, history.clone()), &clock, rng, config)
        .unwrap();
    let mut task = ActuatorTask::new("led", &signals, light);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    let colors = values(&history);
    assert_eq!(colors.len(), 62);
    assert_eq!(colors[19], Color::new(200, 220, 240));
    // The second segment starts from where the first one stopped.
    assert_eq!(colors[20], Color::new(190, 210, 230));
    // Falling deltas round down: (10 - 200) / 20 is -10, not -9.
    assert_eq!(colors[39], Color::new(0, 20, 40));
    assert_eq!(colors[59], Color::new(240, 0, 0));
    assert_eq!(colors[60], COLOR_RED);
    assert_eq!(colors[61], COLOR_OFF);
}

#[test]
fn light_flicker_ends_on_red_then_off() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let config = LightConfig {
        policy: LightPolicy::Flicker,
        flicker_ticks: 5,
        ..LightConfig::default()
    };
    let light = LightAnimation::new(MockLight::new(&clock, history.clone()), &clock, zero_rng(), config)
        .unwrap();
    let mut task = ActuatorTask::new("led", &signals, light);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    let colors = values(&history);
    assert_eq!(colors.len(), 7);
    assert_eq!(colors[5], COLOR_RED);
    assert_eq!(colors[6], COLOR_OFF);
    assert_eq!(times(&history)[..5], [0, 100, 200, 300, 400]);
    assert_eq!(clock.millis(), 1500);
}

#[test]
fn audio_signals_done_without_waiting_for_the_clip() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let playlist: Playlist = Playlist::from_clips(&["growl.wav", "laugh.wav", "scream.wav"]).unwrap();
    let audio = AudioPlayback::new(MockAudio::new(&clock, history.clone()), zero_rng(), playlist);
    let mut task = ActuatorTask::new("speaker", &signals, audio);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    assert_eq!(clock.millis(), 0);
    assert!(signals.done.is_set());
    assert_eq!(values(&history), ["growl.wav"]);
    assert_eq!(task.actuator().last_clip(), Some("growl.wav"));
    assert_eq!(task.kind(), ActuatorKind::Audio);
}

#[test]
fn motor_ramps_up_holds_and_mirrors_down() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let driver = MockMotor::new(&clock, history.clone());
    let decay_mode = driver.decay_mode();
    let motor = MotorRamp::new(driver, &clock, MotorConfig::gentle()).unwrap();
    let mut task = ActuatorTask::new("motor", &signals, motor);

    assert_eq!(decay_mode.get(), Some(DecayMode::Slow));
    assert_eq!(values(&history), [0.0]);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    let up: Vec<f32> = (16u8..50).step_by(4).map(|duty| f32::from(duty) / 100.0).collect();
    let mut expected = vec![0.0];
    expected.extend(up.iter().copied());
    expected.extend(up.iter().rev().copied());
    expected.push(0.0);
    assert_eq!(values(&history), expected);

    let stamps = times(&history);
    assert_eq!(stamps[1..10], [0, 300, 600, 900, 1200, 1500, 1800, 2100, 2400]);
    // Last upward step, its delay, then the hold.
    assert_eq!(stamps[10], 2400 + 300 + 2000);
    assert_eq!(*stamps.last().unwrap(), 4700 + 9 * 300);
    assert!(signals.done.is_set());
}

#[test]
fn motor_rejects_inverted_range() {
    let clock = SimClock::new();
    let config = MotorConfig {
        low: 60,
        high: 20,
        ..MotorConfig::gentle()
    };

    let result = MotorRamp::new(MockMotor::new(&clock, log()), &clock, config);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn failed_motor_step_stops_motor_and_still_signals_done() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let driver = MockMotor::new(&clock, history.clone()).failing_after(3);
    let motor = MotorRamp::new(driver, &clock, MotorConfig::gentle()).unwrap();
    let mut task = ActuatorTask::new("motor", &signals, motor);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    assert_eq!(values(&history), [0.0, 0.16, 0.2, 0.0]);
    assert!(signals.done.is_set());
    assert_eq!(task.failed(), 1);
    assert_eq!(task.completed(), 0);
}

#[test]
fn failed_light_still_signals_done() {
    let clock = SimClock::new();
    let signals = Signals::new();
    let driver = MockLight::new(&clock, log());
    driver.fault_switch().set(true);
    let light = LightAnimation::new(driver, &clock, zero_rng(), red_only()).unwrap();
    let mut task = ActuatorTask::new("led", &signals, light);

    signals.trigger.set();
    Simulation::new(&clock).block_on(task.run_once()).unwrap();

    assert!(signals.done.is_set());
    assert_eq!(task.failed(), 1);
}

#[test]
fn failed_audio_task_keeps_serving_triggers() {
    let clock = SimClock::new();
    let signals = Signals::new();
    let playlist: Playlist = Playlist::from_clips(&["missing.wav"]).unwrap();
    let audio = AudioPlayback::new(MockAudio::failing(&clock, log()), zero_rng(), playlist);
    let mut task = ActuatorTask::new("speaker", &signals, audio);

    let sim = Simulation::new(&clock);
    let feeder = async {
        for _ in 0..3 {
            signals.trigger.set();
            clock.sleep_millis(100).await;
            signals.done.clear();
        }
    };
    let outcome = sim.run_for(
        embassy_futures::join::join(task.run(), feeder),
        SimDuration(1000),
    );

    assert!(outcome.is_none());
    assert_eq!(task.failed(), 3);
    assert_eq!(task.actuator().last_clip(), None);
}

#[test]
fn triggers_raised_during_an_animation_collapse_into_one_rerun() {
    let clock = SimClock::new();
    let history = log();
    let signals = Signals::new();
    let light = LightAnimation::new(MockLight::new(&clock, history.clone()), &clock, zero_rng(), red_only())
        .unwrap();
    let mut task = ActuatorTask::new("led", &signals, light);

    let sim = Simulation::new(&clock);
    let retrigger = async {
        signals.trigger.set();
        clock.sleep_millis(100).await;
        signals.trigger.set();
        clock.sleep_millis(100).await;
        signals.trigger.set();
    };
    let outcome = sim.run_for(
        embassy_futures::join::join(task.run(), retrigger),
        SimDuration::from_secs(10),
    );

    assert!(outcome.is_none());
    assert_eq!(task.completed(), 2);
    assert_eq!(values(&history).iter().filter(|c| **c == COLOR_OFF).count(), 2);
    // The rerun starts the moment the first animation ends.
    assert_eq!(times(&history)[22], 2500);
}
