#![cfg(feature = "cli")]

use std::fs::File;
use std::io::BufReader;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;

use ansi_term::Colour;
use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use origin_index::{RoutingEngine, StoreConfig};

const HISTORY_FILE: &str = "/tmp/origin-index-history.txt";

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Event file to ingest in the background while taking queries
    event_file: PathBuf,
}

fn print_help() {
    println!("n                       list neighbors");
    println!("s                       ingest counters");
    println!("ip <address>            origin AS per neighbor");
    println!("<neighbor> ip <address> origin AS and covering prefixes");
    println!("<neighbor> asn <number> prefixes of an AS");
    println!("<neighbor> prefixes     all prefixes with their origin, as JSON");
    println!("q                       quit");
}

fn lookup_all(engine: &RoutingEngine, addr: &str) {
    match engine.lookup_asn_str(None, addr) {
        Ok(res) => {
            for (neighbor, asn) in res {
                match asn {
                    Some(asn) => println!("{}\t{}", neighbor, asn),
                    None => println!(
                        "{}\t{}",
                        neighbor,
                        Colour::Yellow.paint("no match")
                    ),
                }
            }
        }
        Err(err) => println!("{}", Colour::Red.paint(err.to_string())),
    }
}

fn lookup_neighbor(
    engine: &RoutingEngine,
    neighbor: &str,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Ok(addr) = addr.parse::<Ipv4Addr>() else {
        let msg = format!("Error: bad IP address '{}'.", addr);
        println!("{}", Colour::Red.paint(msg));
        return Ok(());
    };
    let Some(neighbor) = engine.registry().get(neighbor)? else {
        println!("{}", Colour::Yellow.paint("unknown neighbor"));
        return Ok(());
    };

    println!("{}", neighbor.longest_match(addr)?);
    for (pfx, asn) in neighbor.covering_prefixes(addr)? {
        println!("  {}\t{}", pfx, asn);
    }
    Ok(())
}

fn dump_prefixes(
    engine: &RoutingEngine,
    neighbor: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let map = engine
        .prefix_asns(neighbor)?
        .into_iter()
        .map(|(pfx, asn)| (pfx.to_string(), asn.into_u32().into()))
        .collect::<serde_json::Map<String, serde_json::Value>>();
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Cli::parse();

    let engine = Arc::new(RoutingEngine::new(StoreConfig::default()));
    let file = File::open(&args.event_file)?;
    let handle = engine.spawn_ingest(BufReader::new(file))?;
    println!("ingesting {} in the background...", args.event_file.display());

    let mut rl = DefaultEditor::new()?;
    if rl.load_history(HISTORY_FILE).is_err() {
        println!("No previous history.");
    }

    loop {
        let line = match rl.readline("(origin-index)> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("CTRL-C");
                break;
            }
            Err(ReadlineError::Eof) => {
                println!("CTRL-D");
                break;
            }
            Err(_err) => {
                println!("Error: Can't parse the command");
                continue;
            }
        };

        let words = line.split_whitespace().collect::<Vec<_>>();
        if words.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line.as_str());

        let res: Result<(), Box<dyn std::error::Error>> = match words
            .as_slice()
        {
            ["q"] => break,
            ["h"] | ["help"] => {
                print_help();
                Ok(())
            }
            ["n"] => engine.list_neighbors().map_err(Into::into).map(|rows| {
                for row in rows {
                    println!("{}", row);
                }
            }),
            ["s"] => {
                print!("{}", engine.stats());
                if handle.is_finished() {
                    println!("{}", Colour::Green.paint("ingest finished"));
                }
                Ok(())
            }
            ["ip", addr] => {
                lookup_all(&engine, addr);
                Ok(())
            }
            [neighbor, "ip", addr] => lookup_neighbor(&engine, neighbor, addr),
            [neighbor, "asn", asn] => engine
                .prefixes_for_asn_str(neighbor, asn)
                .map_err(Into::into)
                .map(|pfxs| {
                    for pfx in pfxs {
                        println!("{}", pfx);
                    }
                }),
            [neighbor, "prefixes"] => dump_prefixes(&engine, neighbor),
            _ => {
                println!("Error: unknown command {:?}", words);
                print_help();
                Ok(())
            }
        };

        if let Err(err) = res {
            println!("{}", Colour::Red.paint(err.to_string()));
        }
    }

    rl.save_history(HISTORY_FILE)?;
    Ok(())
}
