//! The routing state engine.
//!
//! A [RoutingEngine] owns the neighbor registry and applies event lines to
//! it, one at a time, from a single ingest thread. Any number of other
//! threads may query it at the same time. Every query copies what it needs
//! out of the neighbor it reads and lets go of all locks before it returns.
use std::collections::BTreeMap;
use std::io::{self, BufRead};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::thread::JoinHandle;

use inetnum::addr::Prefix;
use inetnum::asn::Asn;
use log::{debug, error, info, trace, warn};

use crate::parser::{parse_line, parse_route, Command};
use crate::rib::config::StoreConfig;
use crate::rib::neighbor::Neighbor;
use crate::rib::prefix_index::InsertOutcome;
use crate::rib::registry::NeighborRegistry;
use crate::types::errors::{
    FatalError, FatalResult, IngestError, LineError, PrefixStoreError,
    QueryError, RouteParseError,
};
use crate::types::stats::{Counters, IngestStats, NeighborSummary};
use crate::types::PrefixId;

/// The in-band token that ends ingestion.
pub const SHUTDOWN_TOKEN: &str = "shutdown";

//------------ LineOutcome ---------------------------------------------------

/// What processing a single line did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line was blank.
    Empty,
    /// The line was the shutdown token.
    Shutdown,
    /// The line did not split into an event. Nothing changed.
    MalformedLine(LineError),
    /// A session status was recorded for the neighbor.
    SessionChanged,
    /// An announcement was applied to the index.
    Announced(InsertOutcome),
    /// An announcement without an AS-path. Carries the origin of the
    /// association it removed, if there was one.
    AnnouncedWithoutOrigin(Option<Asn>),
    /// A prefix was withdrawn from the AS that owned it.
    Withdrawn(Asn),
    /// A withdrawal for a prefix that was not in the index.
    WithdrawMiss(PrefixId),
    /// The route payload of an announce or withdraw event did not parse.
    /// The event still counts as an update for its neighbor.
    MalformedRoute(RouteParseError),
}

//------------ IngestEnd -----------------------------------------------------

/// How a clean ingest run ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IngestEnd {
    /// The shutdown token was read.
    Shutdown,
    /// The input ran out.
    EndOfStream,
}

//------------ RoutingEngine -------------------------------------------------

#[derive(Debug)]
pub struct RoutingEngine {
    config: StoreConfig,
    registry: NeighborRegistry,
    counters: Counters,
}

impl RoutingEngine {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            registry: NeighborRegistry::new(config.clone()),
            config,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn registry(&self) -> &NeighborRegistry {
        &self.registry
    }

    // --- Ingest ------------------------------------------------------------

    /// Apply one event line.
    ///
    /// Leading and trailing whitespace is ignored. Every recoverable problem
    /// is logged and reported through the returned [LineOutcome]. The only
    /// errors are an unrecognized command, which is logged with the line it
    /// came in, and a poisoned lock.
    pub fn process_line(&self, line: &str) -> Result<LineOutcome, IngestError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Empty);
        }
        if line == SHUTDOWN_TOKEN {
            return Ok(LineOutcome::Shutdown);
        }
        self.counters.inc_lines();

        let event = match parse_line(line) {
            Ok(event) => event,
            Err(LineError::UnrecognizedCommand { command, line }) => {
                error!(
                    "command not implemented: {} in line [{}]",
                    command, line
                );
                return Err(IngestError::UnrecognizedCommand {
                    command,
                    line,
                });
            }
            Err(err) => {
                warn!("{}", err);
                self.counters.inc_malformed_lines();
                return Ok(LineOutcome::MalformedLine(err));
            }
        };
        trace!("{:?}", event);

        let neighbor = self.registry.get_or_create(event.neighbor)?;

        let outcome = match event.command {
            Command::Session(state) => {
                self.set_session_state(&neighbor, state.to_string())
            }
            Command::Update(detail) => {
                let state = if detail.is_empty() {
                    "update".to_string()
                } else {
                    format!("update {}", detail)
                };
                self.set_session_state(&neighbor, state)
            }
            Command::Announced(payload) => {
                self.counters.inc_announcements();
                self.announce(&neighbor, payload)
            }
            Command::Withdrawn(payload) => {
                self.counters.inc_withdrawals();
                self.withdraw(&neighbor, payload)
            }
        }?;

        Ok(outcome)
    }

    fn set_session_state(
        &self,
        neighbor: &Neighbor,
        state: String,
    ) -> FatalResult<LineOutcome> {
        info!("{}: {}", neighbor.address(), state);
        neighbor.write()?.set_session_state(state);
        self.counters.inc_session_changes();
        Ok(LineOutcome::SessionChanged)
    }

    fn announce(
        &self,
        neighbor: &Neighbor,
        payload: &str,
    ) -> FatalResult<LineOutcome> {
        let route = parse_route(payload);

        let (count, outcome) = {
            let mut state = neighbor.write()?;
            let count = state.record_update();
            let outcome = match &route {
                Ok(route) => match route.primary_asn() {
                    Some(asn) => LineOutcome::Announced(
                        state.index_mut().insert(route.prefix(), asn),
                    ),
                    None => LineOutcome::AnnouncedWithoutOrigin(
                        state.index_mut().withdraw(route.prefix()).ok(),
                    ),
                },
                Err(err) => LineOutcome::MalformedRoute(err.clone()),
            };
            (count, outcome)
        };

        match (&outcome, &route) {
            (LineOutcome::Announced(InsertOutcome::Filtered), Ok(route)) => {
                self.counters.inc_filtered_prefixes();
                debug!(
                    "{}: filtered {} from {:?}",
                    neighbor.address(),
                    route.prefix(),
                    route.primary_asn()
                );
            }
            (LineOutcome::AnnouncedWithoutOrigin(_), Ok(route)) => {
                debug!(
                    "{}: announcement of {} without an AS-path",
                    neighbor.address(),
                    route.prefix()
                );
            }
            (LineOutcome::MalformedRoute(err), _) => {
                self.counters.inc_malformed_routes();
                warn!(
                    "{}: bad announcement [{}]: {}",
                    neighbor.address(),
                    payload,
                    err
                );
            }
            _ => trace!("{}: {:?}", neighbor.address(), outcome),
        }
        self.log_progress(neighbor, count);

        Ok(outcome)
    }

    fn withdraw(
        &self,
        neighbor: &Neighbor,
        payload: &str,
    ) -> FatalResult<LineOutcome> {
        let route = parse_route(payload);

        let (count, result) = {
            let mut state = neighbor.write()?;
            let count = state.record_update();
            let result = route.as_ref().map(|route| {
                let prefix = route.prefix();
                (prefix, state.index_mut().withdraw(prefix))
            });
            (count, result)
        };

        let outcome = match result {
            Ok((_, Ok(asn))) => LineOutcome::Withdrawn(asn),
            Ok((prefix, Err(PrefixStoreError::PrefixNotFound))) => {
                self.counters.inc_withdraw_misses();
                if self.config.accepts_len(prefix.get_len()) {
                    warn!(
                        "{}: withdrawal of unknown prefix {}",
                        neighbor.address(),
                        prefix
                    );
                } else {
                    debug!(
                        "{}: withdrawal of filtered prefix {}",
                        neighbor.address(),
                        prefix
                    );
                }
                LineOutcome::WithdrawMiss(prefix)
            }
            Ok((_, Err(PrefixStoreError::FatalError))) => {
                return Err(FatalError)
            }
            Err(err) => {
                self.counters.inc_malformed_routes();
                warn!(
                    "{}: bad withdrawal [{}]: {}",
                    neighbor.address(),
                    payload,
                    err
                );
                LineOutcome::MalformedRoute(err.clone())
            }
        };
        trace!("{}: {:?}", neighbor.address(), outcome);
        self.log_progress(neighbor, count);

        Ok(outcome)
    }

    fn log_progress(&self, neighbor: &Neighbor, update_count: u64) {
        if self.config.is_progress_point(update_count) {
            info!("{}: {} updates", neighbor.address(), update_count);
        }
    }

    /// Read event lines from `reader` and apply them until the shutdown
    /// token, the end of the input, or a fatal error.
    ///
    /// Lines are split on `\n` only. A last line without a newline is still
    /// processed, and bytes that are not valid UTF-8 are replaced rather
    /// than rejected.
    pub fn ingest<R: BufRead>(
        &self,
        mut reader: R,
    ) -> Result<IngestEnd, IngestError> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => {
                    info!("end of event stream");
                    return Ok(IngestEnd::EndOfStream);
                }
                Ok(_) => {}
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {
                    continue
                }
                Err(err) => {
                    warn!("reading the event stream failed: {}", err);
                    return Err(err.into());
                }
            }

            let line = String::from_utf8_lossy(&buf);
            if self.process_line(&line)? == LineOutcome::Shutdown {
                info!("shutdown requested");
                return Ok(IngestEnd::Shutdown);
            }
        }
    }

    /// Run [ingest](Self::ingest) on a new thread named `ingest`.
    pub fn spawn_ingest<R>(
        self: &Arc<Self>,
        reader: R,
    ) -> io::Result<JoinHandle<Result<IngestEnd, IngestError>>>
    where
        R: BufRead + Send + 'static,
    {
        let engine = Arc::clone(self);
        std::thread::Builder::new()
            .name("ingest".to_string())
            .spawn(move || engine.ingest(reader))
    }

    // --- Queries -----------------------------------------------------------

    /// One row per known neighbor, ordered by address.
    pub fn list_neighbors(&self) -> FatalResult<Vec<NeighborSummary>> {
        self.registry.snapshot()
    }

    /// The prefixes `neighbor` has from `asn`. Empty if either is unknown.
    pub fn prefixes_for_asn(
        &self,
        neighbor: &str,
        asn: Asn,
    ) -> FatalResult<Vec<Prefix>> {
        match self.registry.get(neighbor)? {
            Some(neighbor) => neighbor.prefixes_for_asn(asn),
            None => Ok(vec![]),
        }
    }

    /// Every prefix of `neighbor` with its origin. Empty if the neighbor is
    /// unknown.
    pub fn prefix_asns(
        &self,
        neighbor: &str,
    ) -> FatalResult<Vec<(Prefix, Asn)>> {
        match self.registry.get(neighbor)? {
            Some(neighbor) => neighbor.prefix_asn_pairs(),
            None => Ok(vec![]),
        }
    }

    /// The origin of the most specific prefix covering `addr`, per
    /// neighbor. With a `neighbor` filter only that neighbor is asked, and
    /// the result is empty if it is unknown. A neighbor without a covering
    /// prefix maps to `None`.
    pub fn lookup_asn(
        &self,
        neighbor: Option<&str>,
        addr: Ipv4Addr,
    ) -> FatalResult<BTreeMap<String, Option<Asn>>> {
        let neighbors = match neighbor {
            Some(address) => {
                self.registry.get(address)?.into_iter().collect::<Vec<_>>()
            }
            None => self.registry.neighbors()?,
        };

        let mut res = BTreeMap::new();
        for neighbor in neighbors {
            let found = neighbor.longest_match(addr)?;
            if self.config.trace_lookups {
                debug!(
                    "lookup {} on {}: {:?} {:?}",
                    addr,
                    neighbor.address(),
                    found.prefix,
                    found.asn
                );
            }
            res.insert(neighbor.address().to_string(), found.asn);
        }
        Ok(res)
    }

    /// A copy of the engine-wide ingest counters.
    pub fn stats(&self) -> IngestStats {
        self.counters.snapshot()
    }

    // --- Queries from text -------------------------------------------------
    //
    // For boundary layers that receive their arguments as strings.

    /// Like [prefixes_for_asn](Self::prefixes_for_asn), with the AS number
    /// given as text, with or without an `AS` prefix.
    pub fn prefixes_for_asn_str(
        &self,
        neighbor: &str,
        asn: &str,
    ) -> Result<Vec<Prefix>, QueryError> {
        let asn = parse_query_asn(asn)?;
        Ok(self.prefixes_for_asn(neighbor, asn)?)
    }

    /// Like [lookup_asn](Self::lookup_asn), with the address given as text.
    pub fn lookup_asn_str(
        &self,
        neighbor: Option<&str>,
        addr: &str,
    ) -> Result<BTreeMap<String, Option<Asn>>, QueryError> {
        let addr = Ipv4Addr::from_str(addr.trim()).map_err(|_| {
            QueryError::InvalidAddress {
                value: addr.to_string(),
            }
        })?;
        Ok(self.lookup_asn(neighbor, addr)?)
    }
}

fn parse_query_asn(value: &str) -> Result<Asn, QueryError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("AS")
        .or_else(|| trimmed.strip_prefix("as"))
        .unwrap_or(trimmed);
    digits
        .parse::<u32>()
        .map(Asn::from_u32)
        .map_err(|_| QueryError::InvalidAsn {
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> RoutingEngine {
        RoutingEngine::new(StoreConfig::default())
    }

    #[test]
    fn test_session_states() -> Result<(), Box<dyn std::error::Error>> {
        let engine = engine();
        for (line, state) in [
            ("neighbor 10.0.0.1 up", "up"),
            ("neighbor 10.0.0.1 connected", "connected"),
            ("neighbor 10.0.0.1 update start", "update start"),
            ("neighbor 10.0.0.1 update", "update"),
            ("  neighbor 10.0.0.1 down  ", "down"),
        ] {
            assert_eq!(engine.process_line(line)?, LineOutcome::SessionChanged);
            let neighbor = engine.registry().get("10.0.0.1")?;
            assert_eq!(
                neighbor.map(|n| n.session_state()).transpose()?.as_deref(),
                Some(state)
            );
        }
        assert_eq!(engine.stats().session_changes, 5);

        let listing = engine.list_neighbors()?;
        assert_eq!(listing.len(), 1);
        assert!(listing.iter().all(|row| row.update_count == 0));

        Ok(())
    }

    #[test]
    fn test_blank_and_shutdown() -> Result<(), Box<dyn std::error::Error>> {
        let engine = engine();
        assert_eq!(engine.process_line("   ")?, LineOutcome::Empty);
        assert_eq!(engine.process_line(" shutdown\r")?, LineOutcome::Shutdown);
        assert!(engine.registry().is_empty()?);
        assert_eq!(engine.stats().lines, 0);

        Ok(())
    }

    #[test]
    fn test_announce_without_path() -> Result<(), Box<dyn std::error::Error>>
    {
        let engine = engine();
        engine.process_line(
            "neighbor 10.0.0.1 announced route 10.1.0.0/16 as-path [ 65001 ]",
        )?;
        assert_eq!(
            engine.process_line("neighbor 10.0.0.1 announced route 10.1.0.0/16")?,
            LineOutcome::AnnouncedWithoutOrigin(Some(Asn::from_u32(65001)))
        );
        assert!(engine.prefix_asns("10.0.0.1")?.is_empty());

        let listing = engine.list_neighbors()?;
        assert_eq!(
            listing.iter().map(|row| row.update_count).collect::<Vec<_>>(),
            vec![2]
        );

        Ok(())
    }

    #[test]
    fn test_text_queries() -> Result<(), Box<dyn std::error::Error>> {
        let engine = engine();
        engine.process_line(
            "neighbor 10.0.0.1 announced route 10.1.0.0/16 as-path [ 65001 ]",
        )?;

        assert_eq!(
            engine.prefixes_for_asn_str("10.0.0.1", "AS65001")?,
            vec![Prefix::from_str("10.1.0.0/16")?]
        );
        assert_eq!(
            engine.prefixes_for_asn_str("10.0.0.1", "65001")?.len(),
            1
        );
        assert_eq!(
            engine.prefixes_for_asn_str("10.0.0.1", "x"),
            Err(QueryError::InvalidAsn {
                value: "x".to_string()
            })
        );
        assert_eq!(
            engine.lookup_asn_str(None, "10.1.2.3")?.get("10.0.0.1"),
            Some(&Some(Asn::from_u32(65001)))
        );
        assert!(matches!(
            engine.lookup_asn_str(None, "10.1.2"),
            Err(QueryError::InvalidAddress { .. })
        ));
        assert!(matches!(
            engine.lookup_asn_str(None, "2001:db8::1"),
            Err(QueryError::InvalidAddress { .. })
        ));

        Ok(())
    }
}
