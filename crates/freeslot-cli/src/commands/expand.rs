use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::common;

#[derive(Args)]
pub struct ExpandArgs {
    /// JSON file with users, events, and invites
    #[arg(long)]
    pub events: PathBuf,
    /// Id of the event to expand
    #[arg(long)]
    pub event_id: i64,
    /// Window start (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub after: String,
    /// Window end (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub before: String,
}

pub fn run(args: ExpandArgs) -> Result<(), Box<dyn Error>> {
    let after = common::parse_minute("after", &args.after)?;
    let before = common::parse_minute("before", &args.before)?;
    if before <= after {
        return Err("`before` must be greater than `after`".into());
    }

    let source = common::load_source(&args.events)?;
    let event = source
        .events
        .iter()
        .find(|event| event.id == args.event_id)
        .ok_or_else(|| format!("no event with id {}", args.event_id))?;

    let occurrences = event.generate_for_timeperiod(after, before);
    println!("{}", serde_json::to_string_pretty(&occurrences)?);
    Ok(())
}
