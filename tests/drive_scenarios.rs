use approx::assert_relative_eq;
use drivetone::export::{export_to_wav, record_drive, write_trace, DriveScript, ExportConfig};
use drivetone::{
    AudioConfig, FrameClock, InputSnapshot, OfflineBackend, SimConfig, Simulation,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn seeded_config() -> SimConfig {
    SimConfig {
        audio: AudioConfig {
            noise_seed: Some(2024),
            ..AudioConfig::default()
        },
        ..SimConfig::default()
    }
}

fn live_sim() -> Simulation<OfflineBackend> {
    let mut sim = Simulation::new(seeded_config(), OfflineBackend::new());
    sim.user_gesture().unwrap();
    sim
}

fn keys(held: &[&str]) -> InputSnapshot {
    held.iter().copied().collect()
}

#[test]
fn throttle_walks_gears_one_at_a_time_behind_the_rpm_gate() {
    let mut sim = live_sim();
    let mut clock = FrameClock::fixed(60.0);
    let throttle = keys(&["w"]);
    let mut gear_at_120 = None;

    for _ in 0..1_100 {
        let before = sim.vehicle().clone();
        let report = sim.tick(clock.next_frame(), &throttle);

        assert!(report.gear >= 1 && report.gear <= 6);
        assert!(report.gear <= before.gear + 1, "skipped a gear");
        if let Some(shift) = report.shift {
            assert!(shift.is_upshift());
            assert_eq!(shift.to, shift.from + 1);
            assert!(
                before.rpm_per_gear[usize::from(shift.from)] >= 10_000.0,
                "upshift from {} below the RPM ceiling",
                shift.from
            );
        }
        if gear_at_120.is_none() && report.speed >= 120.0 {
            gear_at_120 = Some(report.gear);
        }
    }

    // Candidate gear at 120 is 5, but gear 1 is still short of 10000 RPM
    assert_eq!(gear_at_120, Some(1));
    assert_eq!(sim.vehicle().gear, 6);
    assert_eq!(sim.vehicle().speed, 200.0);
}

#[test]
fn idle_tone_at_rest() {
    let mut sim = live_sim();
    let report = sim.tick(FrameClock::fixed(60.0).next_frame(), &InputSnapshot::new());

    assert!(report.rpm.idle);
    assert_eq!(report.rpm.rpm, 800.0);
    assert_eq!(report.levels.engine_freq, 30.0);
    assert_relative_eq!(report.levels.engine_volume, 0.05);
    assert_eq!(report.hud().to_string(), "0 km/h | Gear: 1");

    let synth = sim.sound().synth().unwrap();
    assert_eq!(synth.engine().frequency(), 30.0);
    assert_relative_eq!(synth.engine().volume(), 0.05);
}

#[test]
fn speed_and_gear_stay_in_range_under_random_input() {
    const COMBOS: [&[&str]; 8] = [
        &[],
        &["w"],
        &["s"],
        &[" "],
        &["w", "a"],
        &["s", "d"],
        &["w", "s"],
        &["w", " "],
    ];
    let mut rng = StdRng::seed_from_u64(7);
    let mut sim = live_sim();
    let mut clock = FrameClock::fixed(60.0);

    let mut input = keys(COMBOS[0]);
    for tick in 0..6_000 {
        if tick % 45 == 0 {
            input = keys(COMBOS[rng.gen_range(0..COMBOS.len())]);
        }
        let before_gear = sim.vehicle().gear;
        let report = sim.tick(clock.next_frame(), &input);

        assert!(report.speed >= -100.0 && report.speed <= 200.0);
        assert!((1..=6).contains(&report.gear));
        assert!(report.gear.abs_diff(before_gear) <= 1);
        assert!(report.levels.brake_volume <= 0.3);
        assert!(report.levels.tire_volume <= 0.2);
    }
}

#[test]
fn coasting_settles_at_exactly_zero() {
    let mut sim = live_sim();
    let mut clock = FrameClock::fixed(60.0);
    for _ in 0..100 {
        sim.tick(clock.next_frame(), &keys(&["w"]));
    }
    assert!(sim.vehicle().speed > 19.0);

    let idle = InputSnapshot::new();
    let mut last = sim.vehicle().speed.abs();
    for _ in 0..400 {
        let report = sim.tick(clock.next_frame(), &idle);
        assert!(report.speed.abs() <= last);
        last = report.speed.abs();
    }
    assert_eq!(sim.vehicle().speed, 0.0);
    assert!(!sim.vehicle().is_moving);

    let report = sim.tick(clock.next_frame(), &idle);
    assert_eq!(report.speed, 0.0);
    assert!(report.rpm.idle);
}

#[test]
fn audio_waits_for_gesture_and_initializes_once() {
    let mut sim = Simulation::new(seeded_config(), OfflineBackend::new());
    let mut clock = FrameClock::fixed(60.0);

    let report = sim.tick(clock.next_frame(), &keys(&["w"]));
    assert!(!report.audible);
    assert!(!sim.sound().is_initialized());
    assert!(sim.backend_mut().render(256).iter().all(|&s| s == 0.0));

    sim.user_gesture().unwrap();
    sim.user_gesture().unwrap();
    assert!(sim.sound().is_initialized());

    let report = sim.tick(clock.next_frame(), &keys(&["w"]));
    assert!(report.audible);
    assert!(sim.backend_mut().render(4_096).iter().any(|&s| s != 0.0));

    sim.shutdown();
    assert!(!sim.sound().is_initialized());
    sim.user_gesture().unwrap();
    assert!(!sim.tick(clock.next_frame(), &keys(&["w"])).audible);
    assert!(sim.backend_mut().render(256).iter().all(|&s| s == 0.0));
}

#[test]
fn brake_and_tire_noise_follow_speed() {
    let mut sim = live_sim();
    let mut clock = FrameClock::fixed(60.0);
    for _ in 0..300 {
        sim.tick(clock.next_frame(), &keys(&["w"]));
    }

    let cornering = sim.tick(clock.next_frame(), &keys(&["w", "a"]));
    assert!(cornering.speed > 50.0);
    assert_relative_eq!(
        cornering.levels.tire_volume,
        cornering.speed / 200.0 * 0.2,
        epsilon = 1e-6
    );
    assert_eq!(cornering.levels.brake_volume, 0.0);

    let braking = sim.tick(clock.next_frame(), &keys(&[" "]));
    assert_relative_eq!(
        braking.levels.brake_volume,
        braking.speed / 200.0 * 0.3,
        epsilon = 1e-6
    );
    assert_eq!(braking.levels.tire_volume, 0.0);
    let synth = sim.sound().synth().unwrap();
    assert_relative_eq!(synth.brake().volume(), braking.levels.brake_volume);
    assert_eq!(synth.tire().volume(), 0.0);

    // Below 10 units the brake falls silent even while held
    let mut report = braking;
    while report.speed > 9.0 {
        report = sim.tick(clock.next_frame(), &keys(&[" "]));
    }
    assert_eq!(report.levels.brake_volume, 0.0);
}

#[test]
fn scripted_drive_exports_wav_and_trace() {
    let dir = tempfile::tempdir().unwrap();
    let wav_path = dir.path().join("drive.wav");
    let csv_path = dir.path().join("drive.csv");

    let script = DriveScript::new().then(&["w"], 1.0).then(&[" "], 0.5);
    let recording = record_drive(seeded_config(), &script, 50.0).unwrap();
    assert_eq!(recording.ticks.len(), 75);

    export_to_wav(&recording, &wav_path, ExportConfig::default()).unwrap();
    write_trace(&csv_path, &recording.ticks).unwrap();

    let reader = hound::WavReader::open(&wav_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 44_100);
    assert_eq!(reader.len() as usize, recording.samples.len());

    let mut trace = csv::Reader::from_path(&csv_path).unwrap();
    assert_eq!(trace.records().count(), 75);
}
