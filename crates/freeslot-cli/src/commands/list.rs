use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use freeslot_core::{EventService, ListEventsRequest};
use uuid::Uuid;

use super::common;

#[derive(Args)]
pub struct ListEventsArgs {
    /// JSON file with users, events, and invites
    #[arg(long)]
    pub events: PathBuf,
    /// Window start (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub after: String,
    /// Window end (RFC 3339, whole minutes, explicit offset)
    #[arg(long)]
    pub before: String,
    /// User whose events to list
    #[arg(long)]
    pub user: Uuid,
    /// Exclusive lower bound on event id from the previous page
    #[arg(long, default_value_t = 0)]
    pub offset: i64,
    /// Page size (defaults to the configured page limit)
    #[arg(long)]
    pub limit: Option<usize>,
    /// TOML limits file (defaults apply when omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: ListEventsArgs) -> Result<(), Box<dyn Error>> {
    let limits = common::load_limits(args.config.as_deref())?;
    let request = ListEventsRequest {
        after: common::parse_minute("after", &args.after)?,
        before: common::parse_minute("before", &args.before)?,
        offset: args.offset,
        limit: args.limit.unwrap_or(limits.default_page_limit),
    };
    request.validate(&limits)?;

    let source = common::load_source(&args.events)?;
    source.enforce_limits(&limits)?;
    let service = EventService;
    let listed = service.list_events_for_user(
        &source,
        args.user,
        request.after,
        request.before,
        request.offset,
    )?;
    let page = service.paginate(listed, request.limit);

    println!("{}", serde_json::to_string_pretty(&page)?);
    Ok(())
}
