use std::env;

use anyhow::{bail, Context, Result};
use drivetone::export::{export_to_wav, record_drive, write_trace, DriveScript, ExportConfig};
use drivetone::{SimConfig, StepMode};
use tracing_subscriber::EnvFilter;

const DEFAULT_FPS: f64 = 60.0;

#[derive(Debug, Default)]
struct Options {
    config_path: Option<String>,
    dump_config: bool,
    normalized_step: bool,
    render_path: Option<String>,
    trace_path: Option<String>,
    seconds: Option<f64>,
    fps: Option<f64>,
    show_help: bool,
}

fn print_usage() {
    eprintln!(
        "Usage:\n  drivetone [--config <file.json>] [--normalized-step]\n  drivetone --render <out.wav> [--seconds N] [--fps F] [--trace <out.csv>]\n  drivetone --dump-config\n\nFlags:\n  --config <file>      Load tunables from JSON (missing fields use defaults)\n  --dump-config        Print the effective configuration as JSON and exit\n  --normalized-step    Scale per-tick deltas by frame time (reference 60 Hz)\n  --render <file>      Render the scripted demo drive to a 16-bit WAV file\n  --trace <file>       Write per-tick telemetry of the scripted drive as CSV\n  --seconds <N>        Cut or pad the scripted drive to N seconds\n  --fps <F>            Tick rate of the scripted drive (default 60)\n  -h, --help           Show this help\n\nInteractive keys ({}):\n  w/s or up/down throttle/reverse, a/d or left/right steer, space brake,\n  p pause/resume audio, q quit",
        if cfg!(feature = "streaming") {
            "enabled"
        } else {
            "requires --features streaming"
        }
    );
}

fn parse_number(flag: &str, value: Option<String>) -> Result<f64> {
    let value = value.with_context(|| format!("{} requires an argument", flag))?;
    let number: f64 = value
        .parse()
        .with_context(|| format!("{} expects a number, got '{}'", flag, value))?;
    if !(number.is_finite() && number > 0.0) {
        bail!("{} must be positive, got {}", flag, number);
    }
    Ok(number)
}

fn parse_args() -> Result<Options> {
    let mut opts = Options::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => opts.show_help = true,
            "--dump-config" => opts.dump_config = true,
            "--normalized-step" => opts.normalized_step = true,
            "--config" => {
                opts.config_path = Some(args.next().context("--config requires a path")?);
            }
            "--render" => {
                opts.render_path = Some(args.next().context("--render requires a path")?);
            }
            "--trace" => {
                opts.trace_path = Some(args.next().context("--trace requires a path")?);
            }
            "--seconds" => opts.seconds = Some(parse_number("--seconds", args.next())?),
            "--fps" => opts.fps = Some(parse_number("--fps", args.next())?),
            _ => {
                eprintln!("Unknown argument: {}", arg);
                opts.show_help = true;
            }
        }
    }
    Ok(opts)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(opts: &Options) -> Result<SimConfig> {
    let mut config = match &opts.config_path {
        Some(path) => SimConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => SimConfig::default(),
    };
    if opts.normalized_step {
        config.step = StepMode::Normalized { reference_hz: 60.0 };
    }
    Ok(config)
}

fn run_offline(config: SimConfig, opts: &Options) -> Result<()> {
    let mut script = DriveScript::demo();
    if let Some(seconds) = opts.seconds {
        script = script.with_duration(seconds);
    }
    let fps = opts.fps.unwrap_or(DEFAULT_FPS);

    println!("drivetone - Offline Drive Render");
    println!("================================\n");
    println!("Script:      {:.1} s at {:.0} ticks/s", script.duration_s(), fps);
    println!("Sample rate: {} Hz", config.audio.sample_rate);
    println!("Step mode:   {:?}\n", config.step);

    let recording = record_drive(config, &script, fps).context("rendering scripted drive")?;

    if let Some(path) = &opts.render_path {
        export_to_wav(&recording, path, ExportConfig::default())
            .with_context(|| format!("writing {}", path))?;
        println!("Wrote {:.2} s of audio to {}", recording.duration_s(), path);
    }
    if let Some(path) = &opts.trace_path {
        write_trace(path, &recording.ticks).with_context(|| format!("writing {}", path))?;
        println!("Wrote {} ticks of telemetry to {}", recording.ticks.len(), path);
    }

    let shifts = recording.ticks.iter().filter(|t| t.shift.is_some()).count();
    let top_speed = recording
        .ticks
        .iter()
        .fold(0.0f32, |m, t| m.max(t.speed.abs()));
    let top_gear = recording.ticks.iter().map(|t| t.gear).max().unwrap_or(1);

    println!("\n=== Drive Statistics ===");
    println!("Ticks:             {}", recording.ticks.len());
    println!("Top speed:         {:.0} km/h", top_speed);
    println!("Top gear:          {}", top_gear);
    println!("Gear changes:      {}", shifts);
    Ok(())
}

#[cfg(feature = "streaming")]
mod interactive {
    use std::io::{self, Read, Write};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use anyhow::Result;
    use drivetone::{AudioDevice, FrameClock, KeyLatch, SimConfig, Simulation, StreamConfig};
    use parking_lot::Mutex;

    const FRAME_INTERVAL: Duration = Duration::from_millis(16);

    #[cfg(unix)]
    fn set_raw_mode(raw: bool) {
        let (echo, mode) = if raw { ("-echo", "raw") } else { ("echo", "-raw") };
        let _ = std::process::Command::new("stty")
            .arg(echo)
            .arg(mode)
            .status();
    }

    #[cfg(not(unix))]
    fn set_raw_mode(_raw: bool) {}

    pub fn run(config: SimConfig) -> Result<()> {
        println!("drivetone - Interactive Drive");
        println!("=============================\n");

        let stream_config = StreamConfig::from_audio(&config.audio);
        println!("Streaming Configuration:");
        println!("  Sample rate: {} Hz", stream_config.sample_rate);
        println!(
            "  Batch size:  {} samples ({:.1}ms latency)",
            stream_config.batch_size,
            stream_config.latency_ms()
        );
        println!("  Step mode:   {:?}\n", config.step);
        println!("Keys: [w/s, up/down]=throttle/reverse, [a/d, left/right]=steer, [space]=brake");
        println!("      [p]=pause/resume audio, [q]=quit");
        println!("Audio starts with the first key press.\n");

        let mut sim = Simulation::new(config, AudioDevice::new(stream_config));

        let latch = Arc::new(Mutex::new(KeyLatch::default()));
        let running = Arc::new(AtomicBool::new(true));
        let gesture = Arc::new(AtomicBool::new(false));
        let pause_toggle = Arc::new(AtomicBool::new(false));
        let start = Instant::now();

        {
            let latch = Arc::clone(&latch);
            let running = Arc::clone(&running);
            let gesture = Arc::clone(&gesture);
            let pause_toggle = Arc::clone(&pause_toggle);
            std::thread::spawn(move || {
                set_raw_mode(true);
                let mut stdin = io::stdin();
                let mut buf = [0u8; 1];
                while running.load(Ordering::Relaxed) {
                    if stdin.read_exact(&mut buf).is_err() {
                        break;
                    }
                    match buf[0] {
                        b'q' | b'Q' | b'\x03' => {
                            running.store(false, Ordering::Relaxed);
                        }
                        b'p' => {
                            pause_toggle.fetch_xor(true, Ordering::Relaxed);
                        }
                        byte => {
                            gesture.store(true, Ordering::Relaxed);
                            let now_ms = start.elapsed().as_secs_f64() * 1000.0;
                            latch.lock().press_byte(byte, now_ms);
                        }
                    }
                }
                set_raw_mode(false);
            });
        }

        print!("\x1B[?25l");
        let mut clock = FrameClock::realtime();
        let mut audio_note = "audio: waiting for key press".to_string();
        let mut shifts = 0usize;
        let mut top_speed = 0.0f32;
        let mut paused = false;

        while running.load(Ordering::Relaxed) {
            std::thread::sleep(FRAME_INTERVAL);

            if gesture.swap(false, Ordering::Relaxed) && !sim.sound().is_initialized() {
                audio_note = match sim.user_gesture() {
                    Ok(()) => "audio: on".to_string(),
                    Err(e) => format!("audio: unavailable ({})", e),
                };
            }

            if pause_toggle.swap(false, Ordering::Relaxed) && sim.sound().is_initialized() {
                paused = !paused;
                if paused {
                    sim.backend().pause();
                    audio_note = "audio: paused".to_string();
                } else {
                    sim.backend().play();
                    audio_note = "audio: on".to_string();
                }
            }

            let frame = clock.next_frame();
            let now_ms = start.elapsed().as_secs_f64() * 1000.0;
            let input = latch.lock().snapshot(now_ms);
            let report = sim.tick(frame, &input);

            if report.shift.is_some() {
                shifts += 1;
            }
            top_speed = top_speed.max(report.speed.abs());

            let rpm = if report.rpm.idle { "idle".to_string() } else { format!("{:>5.0}", report.rpm.rpm) };
            print!(
                "\x1B[2K\r{:>8} | {} | RPM {:>5} | Engine {:>5.1} Hz | {}",
                report.hud().speed_text(),
                report.hud().gear_text(),
                rpm,
                report.levels.engine_freq,
                audio_note,
            );
            io::stdout().flush().ok();
        }

        set_raw_mode(false);
        println!("\x1B[?25h");
        io::stdout().flush().ok();

        sim.shutdown();

        println!("\r\n=== Drive Statistics ===\r");
        println!("Duration:          {:.2} seconds\r", clock.elapsed_ms() / 1000.0);
        println!("Ticks:             {}\r", sim.ticks());
        println!("Top speed:         {:.0} km/h\r", top_speed);
        println!("Gear changes:      {}\r", shifts);
        Ok(())
    }
}

fn main() -> Result<()> {
    init_logging();

    let opts = parse_args()?;
    if opts.show_help {
        print_usage();
        return Ok(());
    }

    let config = load_config(&opts)?;

    if opts.dump_config {
        println!("{}", config.to_json_pretty()?);
        return Ok(());
    }

    if opts.render_path.is_some() || opts.trace_path.is_some() {
        return run_offline(config, &opts);
    }

    #[cfg(feature = "streaming")]
    {
        interactive::run(config)
    }

    #[cfg(not(feature = "streaming"))]
    {
        eprintln!(
            "Interactive driving requires the \"streaming\" feature. Rebuild with `--features streaming`, or use --render/--trace for offline output.\n"
        );
        print_usage();
        Ok(())
    }
}
