use std::{
    path::PathBuf,
    thread,
    time::{Duration, Instant},
};

use anyhow::Context;
use chip::{
    config::{Config, SoundPolicy},
    definitions::{cpu, timer},
    resources::Rom,
    Emulator, RunStatus,
};
use clap::{Parser, ValueEnum};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

mod display;
mod keyboard;
mod sound;

use display::TermDisplay;
use keyboard::HeldKeys;

const FRAME_INTERVAL: Duration = Duration::from_micros(1_000_000 / timer::HERTZ);

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Policy {
    /// a single tone of the full length as soon as the sound timer is set
    OneShot,
    /// the tone lasts while the sound timer counts down
    Countdown,
}

impl From<Policy> for SoundPolicy {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::OneShot => SoundPolicy::OneShot,
            Policy::Countdown => SoundPolicy::Countdown,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Runs a chip8 program in the terminal")]
struct Args {
    #[arg(value_name = "PATH", help = "The program to run", value_hint = clap::ValueHint::FilePath)]
    rom: PathBuf,
    #[arg(long, default_value_t = cpu::HERTZ, help = "Instructions per second")]
    hertz: u64,
    #[arg(long, value_enum, default_value_t = Policy::OneShot)]
    sound_policy: Policy,
    #[arg(long, help = "Keep running once the program jumps onto itself")]
    no_idle_halt: bool,
    #[arg(long, default_value_t = 6, help = "Frames a key stays down after it was pressed")]
    hold_frames: u8,
}

fn status_line(status: &RunStatus) -> String {
    match status {
        RunStatus::Running => "running, Esc quits".to_string(),
        RunStatus::WaitingForKey => "waiting for a key, Esc quits".to_string(),
        RunStatus::Halted => "halted, Esc quits".to_string(),
        RunStatus::Faulted(err) => format!("fault: {}, Esc quits", err),
    }
}

/// Will present the emulator at 60Hz until Esc is pressed
fn run(emulator: &Emulator, display: &mut TermDisplay, hold_frames: u8) -> anyhow::Result<()> {
    let mut keys = HeldKeys::new(hold_frames);
    loop {
        let start = Instant::now();

        while event::poll(Duration::ZERO).context("poll terminal events")? {
            let Event::Key(key) = event::read().context("read terminal event")? else {
                continue;
            };
            if key.kind == KeyEventKind::Release {
                continue;
            }
            match key.code {
                KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Ok(())
                }
                KeyCode::Char(c) => {
                    if let Some(pad) = keyboard::map_key(c) {
                        keys.press(pad);
                    }
                }
                _ => {}
            }
        }

        emulator.refresh_keys(&keys);
        emulator.present(display);
        display
            .status(&status_line(&emulator.status()))
            .context("draw the status line")?;
        keys.tick();

        thread::sleep(FRAME_INTERVAL.saturating_sub(start.elapsed()));
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let rom = Rom::from_path(&args.rom)
        .with_context(|| format!("load rom from {}", args.rom.display()))?;
    let config = Config::new()
        .cpu_hertz(args.hertz)
        .sound_policy(args.sound_policy.into())
        .halt_on_idle_loop(!args.no_idle_halt);

    let mut display = TermDisplay::new().context("prepare the terminal")?;
    let mut emulator: Emulator = Emulator::new(rom, config, sound::Bell);

    let res = run(&emulator, &mut display, args.hold_frames);
    emulator.stop();
    drop(display);

    if let RunStatus::Faulted(err) = emulator.status() {
        eprintln!("The program stopped with a fault: {}", err);
    }
    res
}
