use clap::Parser;
use quizflow::{
    Destination, QuizflowError, ViewRestore, Viewport, ViewportSnapshot, open_session,
};
use serde_json::json;
use std::path::PathBuf;

/// Viewer stand-in for a session without a display.
struct Headless;

impl Viewport for Headless {
    fn snapshot(&self, _: &Destination) -> Option<ViewportSnapshot> {
        None
    }

    fn fit_to_background(&mut self, _: &Destination) {}

    fn apply(&mut self, _: &Destination, _: &ViewRestore) {}
}

#[derive(Parser, Debug)]
#[command(version, about = "Open a quiz results file and print its navigation plan")]
struct Args {
    /// Quiz results XML file
    path: PathBuf,

    /// Seed for page-group randomization (ignored once an order is stored)
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the timestamped backup taken before the file is touched
    #[arg(long)]
    no_backup: bool,
}

/// Starts a session on the quiz and prints its navigation plan as JSON.
///
/// This is a real session: the file is saved with normalized pages, a new
/// `Login` element stamped with `LogoutTime` on exit, and on the first run of a
/// randomized quiz its `RandomizedPageGroupIndices`. Pass `--no-backup` only
/// when a copy of the original is kept elsewhere.
fn main() -> Result<(), QuizflowError> {
    env_logger::init();
    let args = Args::parse();

    let mut session = open_session(&args.path, |builder| {
        let builder = builder.backup_on_load(!args.no_backup);
        match args.seed {
            Some(seed) => builder.seed(seed),
            None => builder,
        }
    })?;

    let report = json!({
        "navigation": session.navigation(),
        "groupOrder": session.group_order(),
        "resume": session.resume_point(),
        "progress": session.progress()?,
        "readOnly": session.is_read_only(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    session.exit(&Headless)?;
    Ok(())
}
