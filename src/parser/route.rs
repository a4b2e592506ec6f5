use inetnum::asn::Asn;
use log::trace;

use crate::types::errors::RouteParseError;
use crate::types::{PrefixId, RouteDescriptor};

/// The only key whose value may be a list.
pub const AS_PATH_KEY: &str = "as-path";
/// The mandatory key holding the prefix of the route.
pub const ROUTE_KEY: &str = "route";

//------------ ParseState ----------------------------------------------------

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ParseState {
    // Expecting an attribute key.
    Key,
    // Expecting the value for the current key, or `[` to open a list.
    Value,
    // Inside a `[ ... ]` list for the current key.
    List,
    // Inside a `( ... )` group within a list. Its contents are dropped.
    Skip,
}

//------------ parse_route ---------------------------------------------------

/// Parse the attribute string of an announce or withdraw event.
///
/// The payload is a sequence of `key value` pairs, where the value may also
/// be a bracketed list (`as-path [ 65001 65002 ]`). A list may contain a
/// parenthesized group (`( 64512 64513 )`, an AS set or confederation
/// segment) whose members do not become part of the AS-path.
///
/// The payload must end between two pairs. Ending after a key, inside a
/// list or inside a group is an error, as is a missing or unparsable
/// `route` attribute.
pub fn parse_route(payload: &str) -> Result<RouteDescriptor, RouteParseError> {
    let mut options: Vec<(String, String)> = vec![];
    let mut as_path: Vec<Asn> = vec![];
    let mut key = "";
    let mut state = ParseState::Key;

    for token in payload.split(' ').filter(|t| !t.is_empty()) {
        state = match state {
            ParseState::Key => {
                key = token;
                ParseState::Value
            }
            ParseState::Value => {
                if token == "[" {
                    ParseState::List
                } else {
                    if key == AS_PATH_KEY {
                        as_path.push(parse_asn(token)?);
                    }
                    options.push((key.to_string(), token.to_string()));
                    ParseState::Key
                }
            }
            ParseState::List => match token {
                "]" => ParseState::Key,
                _ if key != AS_PATH_KEY => {
                    return Err(RouteParseError::ListNotSupported {
                        key: key.to_string(),
                    })
                }
                "(" => ParseState::Skip,
                asn => {
                    as_path.push(parse_asn(asn)?);
                    ParseState::List
                }
            },
            ParseState::Skip => match token {
                ")" => ParseState::List,
                _ => ParseState::Skip,
            },
        };
    }

    match state {
        ParseState::Key => {}
        ParseState::Value => {
            return Err(RouteParseError::MissingValue {
                key: key.to_string(),
            })
        }
        ParseState::List => return Err(RouteParseError::UnterminatedList),
        ParseState::Skip => return Err(RouteParseError::UnterminatedSkip),
    }

    let prefix = options
        .iter()
        .rev()
        .find(|(k, _)| k == ROUTE_KEY)
        .ok_or(RouteParseError::MissingRoute)?
        .1
        .parse::<PrefixId>()?;

    trace!("parsed route {} as-path {:?}", prefix, as_path);

    Ok(RouteDescriptor::new(options, as_path, prefix))
}

fn parse_asn(token: &str) -> Result<Asn, RouteParseError> {
    token
        .parse::<u32>()
        .map(Asn::from_u32)
        .map_err(|_| RouteParseError::InvalidAsn {
            token: token.to_string(),
        })
}
