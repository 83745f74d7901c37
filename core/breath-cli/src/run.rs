//! Real-time session driver.
//!
//! Sleeps until the session's next deadline (or the next lead-in second),
//! then fires everything due at the wall-clock elapsed time. Rendering is a single status line redrawn
//! in place.
//!
//! ```bash
//! justbe run just-center
//! justbe run just-sleep --no-lead-in --yes
//! ```

use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};

use breath_core::{
    default_source, find_exercise, ExerciseSession, Haptics, HistoryStore, SessionEvent,
    SessionOptions, SessionView, SettingsStore, StorageConfig, TimerQueue,
};

const BAR_WIDTH: usize = 24;

pub struct RunArgs {
    pub exercise_id: String,
    pub no_lead_in: bool,
    pub no_haptics: bool,
    pub yes: bool,
}

/// Rings the terminal bell on phase changes.
struct TerminalBell;

impl Haptics for TerminalBell {
    fn trigger(&mut self) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(b"\x07");
        let _ = stdout.flush();
    }
}

pub fn run(storage: &StorageConfig, args: RunArgs) -> Result<(), String> {
    let source = default_source(&storage.exercises_file());
    let exercise = find_exercise(source.as_ref(), &args.exercise_id)?;
    let settings = SettingsStore::load(storage);

    let mut options = SessionOptions {
        haptics_enabled: settings.settings().haptics_enabled && !args.no_haptics,
        ..SessionOptions::default()
    };
    if args.no_lead_in {
        options.lead_in = Duration::ZERO;
    }

    println!("{}  ({})", exercise.title, exercise.mood);
    if !exercise.description.is_empty() {
        println!("{}", exercise.description);
    }
    println!(
        "{} cycles, {}",
        exercise.total_cycles,
        format_duration(exercise.total_duration_secs())
    );
    println!();

    let mut session =
        ExerciseSession::new(exercise, TimerQueue::new(), options, Box::new(TerminalBell))?;
    session.begin()?;

    let origin = Instant::now();
    let mut shown_lead_in = None;
    while !session.is_finished() {
        if let Some(remaining) = session.lead_in_remaining() {
            if shown_lead_in != Some(remaining) {
                redraw(&format!("Get ready... {}", remaining))?;
                shown_lead_in = Some(remaining);
            }
        }

        let Some(deadline) = session.timer().next_deadline() else {
            tracing::warn!("Session stalled with nothing scheduled");
            break;
        };
        let wake = wake_at(deadline, session.lead_in_remaining());
        let elapsed = origin.elapsed();
        if wake > elapsed {
            thread::sleep(wake - elapsed);
        }

        let events = session.run_until(origin.elapsed())?;
        if events.is_empty() {
            continue;
        }
        if events.contains(&SessionEvent::Started) {
            // Clear the lead-in line before the first frame.
            redraw("")?;
        }
        if let Some(view) = session.view() {
            redraw(&status_line(&view))?;
        }
    }

    println!();
    if !session.is_finished() {
        session.abandon();
        return Err("Session ended before finishing".to_string());
    }

    println!("Well done. Session complete.");
    if !args.yes && !confirm("Press Enter to save this session")? {
        session.abandon();
        println!("Not saved.");
        return Ok(());
    }

    let mut history = HistoryStore::load(storage);
    let log = session.dismiss(&mut history)?;
    let summary = history.history();
    println!(
        "Saved {}: {} breaths over {}. Streak: {} day{}.",
        log.exercise_id,
        log.breath_count,
        format_duration(log.duration_seconds),
        summary.streak,
        if summary.streak == 1 { "" } else { "s" }
    );
    Ok(())
}

/// When to next wake the driver. During the lead-in the only pending
/// deadline is its end, so wake at each whole-second change of the countdown.
fn wake_at(deadline: Duration, lead_in_remaining: Option<u64>) -> Duration {
    match lead_in_remaining {
        Some(remaining) if remaining > 1 => {
            deadline.saturating_sub(Duration::from_secs(remaining - 1))
        }
        _ => deadline,
    }
}

fn status_line(view: &SessionView) -> String {
    let filled = ((view.progress * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!(
        "{:<10} {:>2}s  {:<14} [{}{}] {:>3}%",
        view.phase_text,
        view.countdown,
        view.cycle_label,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        (view.progress * 100.0).round() as u32
    )
}

fn redraw(line: &str) -> Result<(), String> {
    let mut stdout = io::stdout();
    write!(stdout, "\r\x1b[2K{}", line)
        .and_then(|_| stdout.flush())
        .map_err(|e| format!("Failed to write to terminal: {}", e))
}

/// Returns false on end of input (e.g. Ctrl-D).
fn confirm(prompt: &str) -> Result<bool, String> {
    print!("{} (Ctrl-D to skip) ", prompt);
    io::stdout()
        .flush()
        .map_err(|e| format!("Failed to write to terminal: {}", e))?;

    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| format!("Failed to read input: {}", e))?;
    Ok(read > 0)
}

pub fn format_duration(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
