use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ph_common::{EngineConfig, Span};
use ph_event_eval::{resolve, sort_by_start, EventTuple};
use ph_host::{DocEvent, DocumentHost, MemoryDocument};
use ph_project::{load_snapshot, save_snapshot};
use ph_timeline::TimelineSession;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo { steps, save } => run_demo(steps, save.as_deref()),
        Commands::Resolve { time } => run_resolve(time),
        Commands::Inspect { file } => run_inspect(&file),
    }
}

/// Scrub a demo document end to end: two range controls, a union
/// control driving them, and a group owner hiding its dependent
/// outside `[0, 40]`.
fn run_demo(steps: u32, save: Option<&Path>) -> Result<()> {
    tracing::info!(steps, "building demo document");

    let mut doc = MemoryDocument::new();
    let slow = doc.add_range_control("0-50", Span::new(0.0, 50.0), 0.0);
    let fast = doc.add_range_control("25-100", Span::new(25.0, 100.0), 25.0);
    doc.add_union_control("timeline");
    doc.add_event_source("events");
    let owner = doc.add_group_owner("0-40");
    let subject = doc.add_plain_node();

    let mut session = TimelineSession::new(EngineConfig::default());
    session.bind(&mut doc);
    session.declare_dependents(&mut doc, owner, &[subject]);
    session.set_group_flags(owner, true, true);
    session.connect_time_inputs(&mut doc);
    session.settle(&mut doc);
    session.handle_event(&mut doc, DocEvent::SolveEnd);
    session.settle(&mut doc);

    let range = session.union_range().context("no union control adopted")?;
    let steps = steps.max(1);
    println!("union range {range}, scrubbing in {steps} steps");

    for step in 0..=steps {
        let time = range.min() + range.length() * f64::from(step) / f64::from(steps);
        session.set_union_value(time);
        session.settle(&mut doc);

        let tuples = demo_tuples(time);
        let line = match session.resolve_events(&mut doc, owner, &tuples) {
            Some(res) => format!(
                "event {} {} value {:6.1}",
                res.active_index,
                res.status_text(time),
                res.mapped_value
            ),
            None => "no events".to_string(),
        };
        session.settle(&mut doc);

        println!(
            "t={time:>5.1}  a={:>5.1}  b={:>5.1}  {line}  hidden={} locked={}",
            doc.control_value(slow)?,
            doc.control_value(fast)?,
            doc.is_hidden(subject),
            doc.is_locked(subject),
        );
    }

    if let Some(status) = doc.status_of(owner) {
        println!("owner status: {status}");
    }
    println!("solve requests issued: {}", doc.solve_requests());

    if let Some(path) = save {
        save_snapshot(&session.snapshot(), path)?;
        println!("session saved to {}", path.display());
    }
    Ok(())
}

/// Resolve the built-in three-event sample at one query time and dump
/// every field of the outcome.
fn run_resolve(time: f64) -> Result<()> {
    let mut tuples = demo_tuples(time);
    sort_by_start(&mut tuples);

    match resolve(time, &tuples) {
        Some(res) => {
            println!("active index        {}", res.active_index);
            println!("interval            {}", res.interval);
            println!("value domain        {}", res.value_domain);
            println!("raw progress        {:.4}", res.raw_progress);
            println!("effective progress  {:.4}", res.effective_progress);
            println!("mapped value        {:.4}", res.mapped_value);
            println!("status              {}", res.status_text(time));
        }
        None => println!("no tuples"),
    }
    Ok(())
}

/// Print a saved session snapshot without touching any document.
fn run_inspect(path: &Path) -> Result<()> {
    let snapshot = load_snapshot(path)?;

    println!("version     {}", snapshot.version);
    match snapshot.union_value {
        Some(value) => println!("union value {value}"),
        None => println!("union value (none)"),
    }
    println!("owners      {}", snapshot.owners.len());
    for owner in &snapshot.owners {
        let deps: Vec<String> = owner.bound_node_ids.iter().map(ToString::to_string).collect();
        println!(
            "  {}  hide={} lock={} empty-data={} collapsed={}  dependents [{}]",
            owner.owner_id,
            owner.hide_when_outside,
            owner.lock_when_outside,
            owner.use_empty_data_mode,
            owner.collapsed_ui,
            deps.join(", "),
        );
    }
    Ok(())
}

/// Three sample events covering `[0, 60]`: a forward ramp, a reversed
/// ramp, and a constant. Progress is synthesized from the query time the
/// way an upstream source would report it.
fn demo_tuples(time: f64) -> Vec<EventTuple> {
    let sources = [
        (Span::new(0.0, 20.0), Span::new(0.0, 100.0)),
        (Span::new(20.0, 40.0), Span::new(100.0, 0.0)),
        (Span::new(40.0, 60.0), Span::new(30.0, 30.0)),
    ];
    sources
        .iter()
        .map(|&(interval, domain)| {
            let progress = if interval.is_singleton() {
                0.0
            } else {
                ((time - interval.min()) / interval.length()).clamp(0.0, 1.0)
            };
            EventTuple::new(interval.min(), interval, progress, domain)
        })
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Shared-timeline control engine demo driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Scrub a built-in demo document and print what the engine does.
    Demo {
        /// Number of scrub steps across the union range.
        #[arg(short, long, default_value_t = 10)]
        steps: u32,
        /// Save the session snapshot here afterwards.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Resolve the built-in event sample at a query time.
    Resolve {
        /// Query time on the shared timeline.
        time: f64,
    },
    /// Print the contents of a saved session snapshot.
    Inspect {
        /// Path to a snapshot file.
        file: PathBuf,
    },
}
