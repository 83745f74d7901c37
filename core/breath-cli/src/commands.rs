//! Non-session subcommands: catalog listing, history, settings, reminders.

use std::path::Path;

use breath_core::{
    default_source, dispatch_daily_reminder, find_exercise, next_reminder_at,
    order_by_favorites, BreathError, ExerciseSource, History, HistoryStore, Notifier,
    ReminderOutcome, ReminderPayload, ReminderRecipient, SettingsStore, StorageConfig,
};
use chrono::Utc;

use crate::run::format_duration;

pub fn list(storage: &StorageConfig) -> Result<(), String> {
    let source = default_source(&storage.exercises_file());
    let settings = SettingsStore::load(storage);
    let exercises = order_by_favorites(
        source.get_exercises()?,
        &settings.settings().favorite_exercises,
    );

    for exercise in &exercises {
        let marker = if settings.settings().is_favorite(&exercise.id) {
            '*'
        } else {
            ' '
        };
        println!(
            "{} {:<14} {:<18} {:<18} {:>2} cycles  {:>5}",
            marker,
            exercise.id,
            exercise.title,
            exercise.mood,
            exercise.total_cycles,
            format_duration(exercise.total_duration_secs())
        );
    }
    Ok(())
}

pub fn history(storage: &StorageConfig) -> Result<(), String> {
    let store = HistoryStore::load(storage);
    for line in history_lines(store.history()) {
        println!("{}", line);
    }
    Ok(())
}

fn history_lines(history: &History) -> Vec<String> {
    if history.total_sessions == 0 {
        return vec!["No sessions yet. Try `justbe run just-be`.".to_string()];
    }

    let mut lines = vec![
        format!("Current streak:   {} days", history.streak),
        format!("Longest streak:   {} days", history.longest_streak),
        format!("Sessions:         {}", history.total_sessions),
        format!("Minutes:          {}", history.minutes_breathing),
        format!("Breaths:          {}", history.total_breaths),
    ];
    if let Some(top) = history.top_exercise() {
        lines.push(format!("Most practiced:   {}", top));
    }
    if let Some(last) = &history.last_session {
        lines.push(format!(
            "Last session:     {} at {}",
            last.exercise_id,
            last.completed_at.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    lines
}

pub struct SettingsArgs {
    pub haptics: Option<bool>,
    pub reminders: Option<bool>,
    pub toggle_favorite: Option<String>,
}

pub fn settings(storage: &StorageConfig, args: SettingsArgs) -> Result<(), String> {
    let mut store = SettingsStore::load(storage);

    if let Some(id) = &args.toggle_favorite {
        let source = default_source(&storage.exercises_file());
        find_exercise(source.as_ref(), id)?;
    }

    let changed =
        args.haptics.is_some() || args.reminders.is_some() || args.toggle_favorite.is_some();
    if changed {
        storage.ensure_dirs()?;
        store.update(|settings| {
            if let Some(enabled) = args.haptics {
                settings.haptics_enabled = enabled;
            }
            if let Some(enabled) = args.reminders {
                settings.reminders_enabled = enabled;
            }
            if let Some(id) = &args.toggle_favorite {
                settings.toggle_favorite(id);
            }
        })?;
    }

    let current = store.settings();
    println!("haptics:    {}", on_off(current.haptics_enabled));
    println!("reminders:  {}", on_off(current.reminders_enabled));
    if current.favorite_exercises.is_empty() {
        println!("favorites:  (none)");
    } else {
        println!("favorites:  {}", current.favorite_exercises.join(", "));
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Prints each notification instead of pushing it.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn send(&mut self, tokens: &[String], payload: &ReminderPayload) -> breath_core::Result<()> {
        for token in tokens {
            println!("-> {}: {} | {}", token, payload.title, payload.body);
        }
        Ok(())
    }
}

pub fn remind(recipients_file: &Path) -> Result<(), String> {
    match remind_with(recipients_file, &mut ConsoleNotifier)? {
        ReminderOutcome::NoRecipients => println!("No users with reminders enabled."),
        ReminderOutcome::Sent { count } => println!("Sent {} reminder(s).", count),
        ReminderOutcome::Failed { count } => {
            return Err(format!("Failed to send {} reminder(s)", count));
        }
    }

    println!(
        "Next batch: {}",
        next_reminder_at(Utc::now()).format("%Y-%m-%d %H:%M UTC")
    );
    Ok(())
}

fn remind_with(
    recipients_file: &Path,
    notifier: &mut dyn Notifier,
) -> Result<ReminderOutcome, String> {
    let content = fs_err::read_to_string(recipients_file)
        .map_err(|e| format!("Failed to read recipients: {}", e))?;
    let recipients: Vec<ReminderRecipient> =
        serde_json::from_str(&content).map_err(|source| BreathError::Json {
            context: format!("parsing {}", recipients_file.display()),
            source,
        })?;
    Ok(dispatch_daily_reminder(&recipients, notifier))
}
