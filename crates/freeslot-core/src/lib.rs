//! # Freeslot Core Library
//!
//! Core free-time search engine for a calendar/event service: given a time
//! window, a required duration, and a set of participants, find the earliest
//! slot of sufficient length during which none of the participants have a
//! conflicting event. Events may be one-off or recurring.
//!
//! ## Architecture
//!
//! - **Recurrence**: timezone-aware expansion of repeating patterns
//!   (daily/weekly/monthly/yearly with interval, count, and until bounds)
//!   into occurrence start instants inside a window
//! - **Timeline**: minute-resolution occupancy bitset with a first-free-run
//!   scan
//! - **Finder/Service**: orchestration of expansion, marking, and scanning
//!   over an abstract event source, plus id-ordered event listing with
//!   keyset pagination
//!
//! The core is pure, synchronous computation with no shared mutable state
//! and no I/O; concurrent callers need no coordination. Persistence and
//! transport live behind the [`EventSource`] seam and are out of scope.
//!
//! ## Key Components
//!
//! - [`Recurrence`]: persisted recurrence pattern and its expansion
//! - [`Event`]: calendar event and per-event occurrence expansion
//! - [`OccupancyTimeline`]: interval union and free-run scan
//! - [`FreeSpotFinder`]: free-spot search over candidate events
//! - [`EventService`]: service-level orchestration and listing

pub mod error;
pub mod event;
pub mod finder;
pub mod limits;
pub mod recurrence;
pub mod request;
pub mod service;
pub mod timeline;

pub use error::{
    CoreError, EventError, LimitsError, RecurrenceError, SourceError, TimelineError,
    ValidationError,
};
pub use event::{Event, EventWithOccurrences};
pub use finder::FreeSpotFinder;
pub use limits::Limits;
pub use recurrence::{MonthlyMode, Recurrence, RecurrenceKind, Weekday};
pub use request::{FreeSpotRequest, FreeSpotResponse, ListEventsRequest};
pub use service::{EventListPage, EventService, EventSource, InMemoryEventSource, Invite};
pub use timeline::OccupancyTimeline;
