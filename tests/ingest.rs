use std::io::Cursor;
use std::net::Ipv4Addr;
use std::str::FromStr;

use inetnum::addr::Prefix;
use inetnum::asn::Asn;
use origin_index::errors::{IngestError, LineError, RouteParseError};
use origin_index::rib::engine::{IngestEnd, LineOutcome};
use origin_index::rib::prefix_index::InsertOutcome;
use origin_index::{PrefixId, RoutingEngine, StoreConfig};

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

const ANNOUNCE: &str = "neighbor 203.0.113.5 announced route 203.0.113.0/24 \
                        as-path [ 64512 64513 ]";
const WITHDRAW: &str = "neighbor 203.0.113.5 withdrawn route 203.0.113.0/24";

fn engine() -> RoutingEngine {
    RoutingEngine::new(StoreConfig::default())
}

fn lookup(
    engine: &RoutingEngine,
    addr: Ipv4Addr,
) -> Result<Option<Asn>, Box<dyn std::error::Error>> {
    Ok(engine
        .lookup_asn(Some("203.0.113.5"), addr)?
        .get("203.0.113.5")
        .copied()
        .flatten())
}

#[test]
fn test_announce_then_lookup() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    assert_eq!(
        engine.process_line(ANNOUNCE)?,
        LineOutcome::Announced(InsertOutcome::Inserted)
    );
    assert_eq!(
        lookup(&engine, Ipv4Addr::new(203, 0, 113, 42))?,
        Some(Asn::from_u32(64513))
    );
    assert_eq!(
        engine.prefixes_for_asn("203.0.113.5", Asn::from_u32(64513))?,
        vec![Prefix::from_str("203.0.113.0/24")?]
    );
    assert!(engine
        .prefixes_for_asn("203.0.113.5", Asn::from_u32(64512))?
        .is_empty());

    Ok(())
}

#[test]
fn test_announce_then_withdraw() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    engine.process_line(ANNOUNCE)?;
    assert_eq!(
        engine.process_line(WITHDRAW)?,
        LineOutcome::Withdrawn(Asn::from_u32(64513))
    );
    assert_eq!(lookup(&engine, Ipv4Addr::new(203, 0, 113, 42))?, None);

    // The neighbor is still known, it just has no match.
    let res = engine.lookup_asn(None, Ipv4Addr::new(203, 0, 113, 42))?;
    assert_eq!(res.len(), 1);
    assert_eq!(res.get("203.0.113.5"), Some(&None));
    assert!(engine.prefix_asns("203.0.113.5")?.is_empty());

    assert_eq!(
        engine.process_line(WITHDRAW)?,
        LineOutcome::WithdrawMiss(PrefixId::from_str("203.0.113.0/24")?)
    );
    assert_eq!(engine.stats().withdraw_misses, 1);

    Ok(())
}

#[test]
fn test_unrecognized_command_is_fatal() -> Result<(), Box<dyn std::error::Error>>
{
    crate::common::init();
    let engine = engine();

    match engine.process_line("neighbor 203.0.113.5 bogus foo") {
        Err(IngestError::UnrecognizedCommand { command, line }) => {
            assert_eq!(command, "bogus");
            assert_eq!(line, "neighbor 203.0.113.5 bogus foo");
        }
        res => panic!("expected a fatal error, got {:?}", res),
    }

    // A broken payload on a known command is recoverable.
    assert_eq!(
        engine.process_line("neighbor 203.0.113.5 announced route bogus")?,
        LineOutcome::MalformedRoute(RouteParseError::InvalidRoute {
            value: "bogus".to_string()
        })
    );
    assert_eq!(
        engine.process_line("neighbor 203.0.113.5")?,
        LineOutcome::MalformedLine(LineError::TooFewFields {
            line: "neighbor 203.0.113.5".to_string()
        })
    );

    Ok(())
}

#[test]
fn test_update_count() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    let lines = [
        "neighbor 10.0.0.1 up",
        "neighbor 10.0.0.1 announced route 10.1.0.0/16 as-path [ 65001 ]",
        "neighbor 10.0.0.1 announced route 10.2.0.0/16 as-path [ 65001 ( 1 2 ) 65002 ]",
        "neighbor 10.0.0.1 announced route 10.3.0.0/30 as-path [ 65003 ]",
        "neighbor 10.0.0.1 announced route 10.4.0.0/16 as-path [ 65001",
        "neighbor 10.0.0.1 announced as-path [ 65001 ]",
        "neighbor 10.0.0.1 announced",
        "neighbor 10.0.0.1 withdrawn route 10.1.0.0/16",
        "neighbor 10.0.0.1 withdrawn route 10.9.0.0/16",
        "neighbor 10.0.0.1 update end",
        "neighbor 10.0.0.1 down",
    ];
    for line in lines {
        engine.process_line(line)?;
    }

    let listing = engine.list_neighbors()?;
    assert_eq!(listing.len(), 1);
    let row = listing.first().ok_or("no neighbor")?;
    assert_eq!(row.address, "10.0.0.1");
    assert_eq!(row.session_state, "down");
    assert_eq!(row.update_count, 8);
    assert_eq!(row.prefix_count, 1);
    assert_eq!(row.asn_count, 1);

    assert_eq!(
        engine.prefix_asns("10.0.0.1")?,
        vec![(Prefix::from_str("10.2.0.0/16")?, Asn::from_u32(65002))]
    );

    let stats = engine.stats();
    assert_eq!(stats.lines, 11);
    assert_eq!(stats.session_changes, 3);
    assert_eq!(stats.announcements, 6);
    assert_eq!(stats.withdrawals, 2);
    assert_eq!(stats.malformed_routes, 3);
    assert_eq!(stats.filtered_prefixes, 1);
    assert_eq!(stats.withdraw_misses, 1);

    Ok(())
}

#[test]
fn test_ingest_shutdown_token() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    let input = format!("{}\n\n  shutdown  \n{}\n", ANNOUNCE, WITHDRAW);
    assert_eq!(
        engine.ingest(Cursor::new(input.into_bytes()))?,
        IngestEnd::Shutdown
    );

    // The withdrawal after the token was never read.
    assert_eq!(
        lookup(&engine, Ipv4Addr::new(203, 0, 113, 1))?,
        Some(Asn::from_u32(64513))
    );

    Ok(())
}

#[test]
fn test_ingest_end_of_stream() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    // No newline after the last line.
    let input = format!("neighbor 203.0.113.5 up\r\n{}", ANNOUNCE);
    assert_eq!(
        engine.ingest(Cursor::new(input.into_bytes()))?,
        IngestEnd::EndOfStream
    );
    assert_eq!(
        lookup(&engine, Ipv4Addr::new(203, 0, 113, 1))?,
        Some(Asn::from_u32(64513))
    );

    assert_eq!(engine.ingest(Cursor::new(vec![]))?, IngestEnd::EndOfStream);

    Ok(())
}

#[test]
fn test_ingest_stops_on_fatal() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    let input = format!("neighbor 10.0.0.1 explode\n{}\n", ANNOUNCE);
    let res = engine.ingest(Cursor::new(input.into_bytes()));
    assert!(matches!(res, Err(IngestError::UnrecognizedCommand { .. })));
    assert!(engine.list_neighbors()?.is_empty());

    Ok(())
}

#[test]
fn test_ingest_lossy_utf8() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();

    let mut input = b"neighbor 10.0.0.1 update \xff\xfe\n".to_vec();
    input.extend_from_slice(ANNOUNCE.as_bytes());
    assert_eq!(engine.ingest(Cursor::new(input))?, IngestEnd::EndOfStream);

    let states = engine
        .list_neighbors()?
        .into_iter()
        .map(|row| row.session_state)
        .collect::<Vec<_>>();
    assert_eq!(states, vec!["update \u{fffd}\u{fffd}", ""]);

    Ok(())
}

#[test]
fn test_spawned_ingest() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = std::sync::Arc::new(engine());

    let handle = engine.spawn_ingest(Cursor::new(ANNOUNCE.as_bytes().to_vec()))?;
    let res = handle.join().map_err(|_| "ingest thread panicked")?;
    assert_eq!(res?, IngestEnd::EndOfStream);
    assert_eq!(engine.list_neighbors()?.len(), 1);

    Ok(())
}

#[test]
fn test_json_listing() -> Result<(), Box<dyn std::error::Error>> {
    crate::common::init();
    let engine = engine();
    engine.process_line("neighbor 192.0.2.1 up")?;
    engine.process_line(ANNOUNCE)?;

    let json = serde_json::to_value(engine.list_neighbors()?)?;
    assert_eq!(
        json,
        serde_json::json!([
            {
                "address": "192.0.2.1",
                "session_state": "up",
                "update_count": 0,
                "prefix_count": 0,
                "asn_count": 0
            },
            {
                "address": "203.0.113.5",
                "session_state": "",
                "update_count": 1,
                "prefix_count": 1,
                "asn_count": 1
            }
        ])
    );

    Ok(())
}
