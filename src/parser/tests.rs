use std::error::Error;

use inetnum::asn::Asn;

use super::{parse_line, parse_route, Command, SessionState};
use crate::types::errors::{LineError, RouteParseError};

//------------ parse_line ----------------------------------------------------

#[test]
fn test_parse_line_families() -> Result<(), Box<dyn Error>> {
    let ev = parse_line(
        "neighbor 10.0.0.1 announced route 10.1.0.0/24 as-path [ 65001 65002 ]",
    )?;
    assert_eq!(ev.marker, "neighbor");
    assert_eq!(ev.neighbor, "10.0.0.1");
    assert_eq!(
        ev.command,
        Command::Announced("route 10.1.0.0/24 as-path [ 65001 65002 ]")
    );
    assert!(ev.command.is_route_update());

    let ev = parse_line("neighbor 10.0.0.1 withdrawn route 10.1.0.0/24")?;
    assert_eq!(ev.command, Command::Withdrawn("route 10.1.0.0/24"));

    let ev = parse_line("neighbor 10.0.0.1 up")?;
    assert_eq!(ev.command, Command::Session(SessionState::Up));
    assert!(!ev.command.is_route_update());

    let ev = parse_line("neighbor 10.0.0.1 connected")?;
    assert_eq!(ev.command, Command::Session(SessionState::Connected));

    let ev = parse_line("neighbor 10.0.0.1 down")?;
    assert_eq!(ev.command, Command::Session(SessionState::Down));

    let ev = parse_line("neighbor 10.0.0.1 update start")?;
    assert_eq!(ev.command, Command::Update("start"));

    Ok(())
}

#[test]
fn test_parse_line_missing_payload() -> Result<(), Box<dyn Error>> {
    assert_eq!(
        parse_line("neighbor 10.0.0.1 announced")?.command,
        Command::Announced("")
    );
    assert_eq!(
        parse_line("neighbor 10.0.0.1 update")?.command,
        Command::Update("")
    );
    Ok(())
}

#[test]
fn test_parse_line_too_few_fields() {
    for line in ["neighbor", "neighbor 10.0.0.1"] {
        let err = parse_line(line).unwrap_err();
        assert_eq!(
            err,
            LineError::TooFewFields {
                line: line.to_string()
            }
        );
        assert!(!err.is_fatal());
    }
}

#[test]
fn test_parse_line_unrecognized_command() {
    let err = parse_line("neighbor 203.0.113.5 bogus foo").unwrap_err();
    assert_eq!(
        err,
        LineError::UnrecognizedCommand {
            command: "bogus".to_string(),
            line: "neighbor 203.0.113.5 bogus foo".to_string(),
        }
    );
    assert!(err.is_fatal());
}

//------------ parse_route ---------------------------------------------------

#[test]
fn test_parse_route_list() -> Result<(), Box<dyn Error>> {
    let route = parse_route(
        "route 10.1.0.0/24 next-hop 192.0.2.1 as-path [ 65001 65002 ] \
         origin igp",
    )?;
    assert_eq!(route.prefix().to_string(), "10.1.0.0/24");
    assert_eq!(
        route.as_path(),
        &[Asn::from_u32(65001), Asn::from_u32(65002)]
    );
    assert_eq!(route.primary_asn(), Some(Asn::from_u32(65002)));
    assert_eq!(route.option("next-hop"), Some("192.0.2.1"));
    assert_eq!(route.option("origin"), Some("igp"));
    // lists are not recorded as options
    assert_eq!(route.option("as-path"), None);
    assert_eq!(
        route.options().map(|(k, _)| k).collect::<Vec<_>>(),
        vec!["route", "next-hop", "origin"]
    );

    Ok(())
}

#[test]
fn test_parse_route_scalar_as_path() -> Result<(), Box<dyn Error>> {
    let route = parse_route("route 192.0.2.0/24 as-path 64496")?;
    assert_eq!(route.primary_asn(), Some(Asn::from_u32(64496)));
    assert_eq!(route.option("as-path"), Some("64496"));
    Ok(())
}

#[test]
fn test_parse_route_skip_group() -> Result<(), Box<dyn Error>> {
    let route =
        parse_route("route 10.0.0.0/8 as-path [ 65001 ( 64512 64513 ) 65003 ]")?;
    assert_eq!(
        route.as_path(),
        &[Asn::from_u32(65001), Asn::from_u32(65003)]
    );
    assert_eq!(route.primary_asn(), Some(Asn::from_u32(65003)));

    // a trailing group does not count as the origin
    let route = parse_route("route 10.0.0.0/8 as-path [ 65001 ( 64512 ) ]")?;
    assert_eq!(route.primary_asn(), Some(Asn::from_u32(65001)));

    Ok(())
}

#[test]
fn test_parse_route_empty_path() -> Result<(), Box<dyn Error>> {
    let route = parse_route("route 10.0.0.0/8")?;
    assert!(route.as_path().is_empty());
    assert_eq!(route.primary_asn(), None);

    let route = parse_route("route 10.0.0.0/8 as-path [ ]")?;
    assert_eq!(route.primary_asn(), None);

    Ok(())
}

#[test]
fn test_parse_route_repeated_spaces() -> Result<(), Box<dyn Error>> {
    let route = parse_route("route  10.0.0.0/8   as-path [ 1  2 ]")?;
    assert_eq!(route.primary_asn(), Some(Asn::from_u32(2)));
    Ok(())
}

#[test]
fn test_parse_route_unterminated() {
    assert_eq!(
        parse_route("route 10.0.0.0/8 as-path [ 65001 65002"),
        Err(RouteParseError::UnterminatedList)
    );
    assert_eq!(
        parse_route("route 10.0.0.0/8 as-path [ 65001 ( 64512"),
        Err(RouteParseError::UnterminatedSkip)
    );
    assert_eq!(
        parse_route("route 10.0.0.0/8 origin"),
        Err(RouteParseError::MissingValue {
            key: "origin".to_string()
        })
    );
}

#[test]
fn test_parse_route_list_for_other_key() {
    assert_eq!(
        parse_route("route 10.0.0.0/8 community [ 65000:1 ]"),
        Err(RouteParseError::ListNotSupported {
            key: "community".to_string()
        })
    );
    // an empty list is harmless, whatever the key
    assert!(parse_route("route 10.0.0.0/8 community [ ]").is_ok());
}

#[test]
fn test_parse_route_bad_asn() {
    assert_eq!(
        parse_route("route 10.0.0.0/8 as-path [ 65001 AS65002 ]"),
        Err(RouteParseError::InvalidAsn {
            token: "AS65002".to_string()
        })
    );
    assert_eq!(
        parse_route("route 10.0.0.0/8 as-path [ 4294967296 ]"),
        Err(RouteParseError::InvalidAsn {
            token: "4294967296".to_string()
        })
    );
}

#[test]
fn test_parse_route_bad_route() {
    assert_eq!(
        parse_route("as-path [ 65001 ]"),
        Err(RouteParseError::MissingRoute)
    );
    assert_eq!(parse_route(""), Err(RouteParseError::MissingRoute));
    assert_eq!(
        parse_route("route 10.0.0.300/8"),
        Err(RouteParseError::InvalidRoute {
            value: "10.0.0.300/8".to_string()
        })
    );
    assert!(matches!(
        parse_route("route 2001:db8::/32 as-path [ 65001 ]"),
        Err(RouteParseError::NotIpv4 { .. })
    ));
}
