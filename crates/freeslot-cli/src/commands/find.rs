use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use freeslot_core::{
    request::validate_user_ids, EventService, FreeSpotRequest, FreeSpotResponse,
};
use uuid::Uuid;

use super::common;

#[derive(Args)]
pub struct FindFreeSpotArgs {
    /// JSON file with users, events, and invites
    #[arg(long)]
    pub events: PathBuf,
    /// Window start (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub after: String,
    /// Window end (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub before: String,
    /// Required slot length in minutes
    #[arg(long)]
    pub duration: u32,
    /// Participant user id (repeatable)
    #[arg(long = "user", required = true)]
    pub users: Vec<Uuid>,
    /// TOML limits file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: FindFreeSpotArgs) -> Result<(), Box<dyn Error>> {
    let limits = common::load_limits(args.config.as_deref())?;
    let request = FreeSpotRequest {
        after: common::parse_minute("after", &args.after)?,
        before: common::parse_minute("before", &args.before)?,
        duration_minutes: args.duration,
        user_ids: args.users.into_iter().collect(),
    };
    request.validate(&limits)?;

    let source = common::load_source(&args.events)?;
    source.enforce_limits(&limits)?;
    validate_user_ids(&source, &request.user_ids, "user_ids")?;

    let timeslot = EventService.find_event_spot(
        &source,
        &request.user_ids,
        request.after,
        request.before,
        request.duration_minutes,
    )?;
    println!(
        "{}",
        serde_json::to_string_pretty(&FreeSpotResponse { timeslot })?
    );
    Ok(())
}
