//! Parsers for the text event stream of a BGP speaker.
//!
//! Each line of the stream describes one event for one neighbor:
//!
//! ```text
//! neighbor 10.0.0.1 up
//! neighbor 10.0.0.1 announced route 10.1.0.0/24 as-path [ 65001 65002 ]
//! neighbor 10.0.0.1 withdrawn route 10.1.0.0/24
//! ```
//!
//! [parse_line] splits a line into an [Event]. The payload of announce and
//! withdraw events is handed to [parse_route], which turns the attribute
//! sub-language into a [RouteDescriptor](crate::RouteDescriptor).
//! Neither parser keeps any state beyond the line it is given.
mod event;
mod route;

#[cfg(test)]
mod tests;

pub use event::{parse_line, Command, Event, SessionState};
pub use route::{parse_route, AS_PATH_KEY, ROUTE_KEY};
