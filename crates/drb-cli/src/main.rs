use anyhow::{Context, Result};
use chrono::{Duration, Local, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use drb_core::Tracker;
use drb_storage::FileStore;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "drb")]
#[command(about = "Daily reset board CLI", long_about = None)]
struct Cli {
    /// Directory holding reminders.json and status.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
#[command(rename_all = "kebab-case")]
enum Commands {
    /// List reminders with their current cycle state
    List(ListArgs),
    /// Mark a reminder done for its current cycle
    Done(TargetArgs),
    /// Clear a reminder's done marker
    #[command(alias = "reopen")]
    Undone(TargetArgs),
    /// Add a reminder
    Add(AddArgs),
    /// Edit a reminder's name or reset time
    Edit(EditArgs),
    /// Remove a reminder and its status entry
    #[command(alias = "rm")]
    Remove(TargetArgs),
    /// Clear every done marker, regardless of reset boundaries
    ResetAll,
    /// Print the data directory in use
    Path,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct TargetArgs {
    name: String,
}

#[derive(Args)]
struct AddArgs {
    name: String,
    /// Hour of day (0-23) the reminder resets
    #[arg(long)]
    hour: u32,
    /// Minute (0-59) of the reset time
    #[arg(long, default_value_t = 0)]
    minute: u32,
}

#[derive(Args)]
struct EditArgs {
    name: String,
    /// New name for the reminder
    #[arg(long)]
    rename: Option<String>,
    #[arg(long)]
    hour: Option<u32>,
    #[arg(long)]
    minute: Option<u32>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let store = FileStore::open_default(cli.data_dir.as_deref())
        .context("Failed to resolve data directory")?;

    match cli.command {
        Commands::Path => {
            println!("{}", store.dir().display());
            Ok(())
        }
        command => run(&store, command),
    }
}

fn run(store: &FileStore, command: Commands) -> Result<()> {
    let now = Local::now().naive_local();
    let registry = store.load_registry().context("Failed to load reminders")?;
    let status = store.load_status().context("Failed to load status")?;
    let mut tracker = Tracker::new(registry, status);

    // Every invocation heals stale markers on disk, not just the board's
    // tick loop.
    if tracker.reconcile(now) {
        store
            .save_status(tracker.status())
            .context("Failed to save status")?;
    }

    match command {
        Commands::List(args) => list(&tracker, now, args.json)?,
        Commands::Done(args) => {
            tracker.set_done(&args.name, true, now)?;
            store
                .save_status(tracker.status())
                .context("Failed to save status")?;
            println!("Marked '{}' done until its next reset.", args.name);
        }
        Commands::Undone(args) => {
            tracker.set_done(&args.name, false, now)?;
            store
                .save_status(tracker.status())
                .context("Failed to save status")?;
            println!("Cleared '{}'.", args.name);
        }
        Commands::Add(args) => {
            tracker.add_reminder(&args.name, args.hour, args.minute)?;
            store
                .save_registry(tracker.registry())
                .context("Failed to save reminders")?;
            println!(
                "Added '{}' (resets {:02}:{:02}).",
                args.name, args.hour, args.minute
            );
        }
        Commands::Edit(args) => {
            let def = tracker
                .registry()
                .get(&args.name)
                .ok_or_else(|| drb_core::CoreError::UnknownReminder(args.name.clone()))?
                .clone();
            let new_name = args.rename.as_deref().unwrap_or(&args.name).to_string();
            let hour = args.hour.unwrap_or(def.reset_hour);
            let minute = args.minute.unwrap_or(def.reset_minute);
            tracker.edit_reminder(&args.name, &new_name, hour, minute)?;
            store
                .save_registry(tracker.registry())
                .context("Failed to save reminders")?;
            store
                .save_status(tracker.status())
                .context("Failed to save status")?;
            println!("Updated '{}' (resets {:02}:{:02}).", new_name, hour, minute);
        }
        Commands::Remove(args) => {
            tracker.delete_reminder(&args.name)?;
            store
                .save_registry(tracker.registry())
                .context("Failed to save reminders")?;
            store
                .save_status(tracker.status())
                .context("Failed to save status")?;
            println!("Removed '{}'.", args.name);
        }
        Commands::ResetAll => {
            if tracker.reset_all() {
                store
                    .save_status(tracker.status())
                    .context("Failed to save status")?;
            }
            println!("Cleared all done markers.");
        }
        Commands::Path => {
            println!("{}", store.dir().display());
        }
    }

    Ok(())
}

fn list(tracker: &Tracker, now: NaiveDateTime, json: bool) -> Result<()> {
    let views = tracker.display_state(now);
    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    if views.is_empty() {
        println!("No reminders configured. Add one with `drb add <name> --hour H`.");
        return Ok(());
    }

    for view in &views {
        let mark = if view.done { "x" } else { " " };
        println!(
            "[{}] {:<16} resets {} (in {})",
            mark,
            view.name,
            view.next_reset.format("%H:%M"),
            format_until(view.next_reset - now),
        );
    }

    let done = views.iter().filter(|view| view.done).count();
    println!("{done}/{} done this cycle.", views.len());
    Ok(())
}

fn format_until(remaining: Duration) -> String {
    let minutes = remaining.num_minutes().max(0);
    format!("{}h {:02}m", minutes / 60, minutes % 60)
}
