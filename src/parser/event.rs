use std::fmt;

use crate::types::errors::LineError;

//------------ SessionState --------------------------------------------------

/// The session transitions a producer reports with a bare command token.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Up,
    Connected,
    Down,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Up => "up",
            SessionState::Connected => "connected",
            SessionState::Down => "down",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//------------ Command -------------------------------------------------------

/// The command of an event line, with the unsplit remainder of the line
/// where the command takes one.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command<'a> {
    Session(SessionState),
    /// Free-form session detail, e.g. `update start`.
    Update(&'a str),
    /// A route attribute string, to be parsed by
    /// [parse_route](super::parse_route).
    Announced(&'a str),
    /// A route attribute string, to be parsed by
    /// [parse_route](super::parse_route).
    Withdrawn(&'a str),
}

impl Command<'_> {
    /// Whether this command is an announce or withdraw event, i.e. one that
    /// counts as a route update for its neighbor.
    pub fn is_route_update(&self) -> bool {
        matches!(self, Command::Announced(_) | Command::Withdrawn(_))
    }
}

//------------ Event ---------------------------------------------------------

/// One event line split into its fields. Borrows from the line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Event<'a> {
    /// The leading marker token, `neighbor` for a conformant producer. It
    /// is not interpreted.
    pub marker: &'a str,
    /// The peer address, as written by the producer.
    pub neighbor: &'a str,
    pub command: Command<'a>,
}

/// Split one trimmed, non-empty line into an [Event].
///
/// The line is split on single spaces, at most three times, so everything
/// after the command stays in one field. A line with fewer than three
/// fields is malformed. A command outside the known vocabulary is reported
/// as [LineError::UnrecognizedCommand], the one fatal error kind.
pub fn parse_line(line: &str) -> Result<Event<'_>, LineError> {
    let mut fields = line.splitn(4, ' ');

    let (marker, neighbor, command) =
        match (fields.next(), fields.next(), fields.next()) {
            (Some(marker), Some(neighbor), Some(command)) => {
                (marker, neighbor, command)
            }
            _ => {
                return Err(LineError::TooFewFields {
                    line: line.to_string(),
                })
            }
        };
    let rest = fields.next();

    let command = match command {
        "up" => Command::Session(SessionState::Up),
        "connected" => Command::Session(SessionState::Connected),
        "down" => Command::Session(SessionState::Down),
        "update" => Command::Update(rest.unwrap_or_default()),
        "announced" => Command::Announced(rest.unwrap_or_default()),
        "withdrawn" => Command::Withdrawn(rest.unwrap_or_default()),
        unknown => {
            return Err(LineError::UnrecognizedCommand {
                command: unknown.to_string(),
                line: line.to_string(),
            })
        }
    };

    Ok(Event {
        marker,
        neighbor,
        command,
    })
}
