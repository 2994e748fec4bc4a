// src/cli.rs
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use color_eyre::eyre::{eyre, Result};
use tracing::{error, info};

use crate::carrier::{from_barcode, Carrier, FileFetch, Shipment};
use crate::config::TrackOptions;
use crate::error::TrackError;
use crate::model::Parcel;

#[derive(Debug, Default)]
pub struct Params {
    pub payload_dir: Option<PathBuf>,
    pub carrier: Option<Carrier>,
    pub json: bool,
    pub links: bool,
    pub lang: Option<String>,
}

pub fn parse_args<I>(args: I) -> Result<Params>
where
    I: IntoIterator<Item = String>,
{
    let mut params = Params::default();
    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str() {
            "--payload" => {
                let v = args.next().ok_or_else(|| eyre!("Missing value for --payload"))?;
                params.payload_dir = Some(PathBuf::from(v));
            }
            "--carrier" => {
                let v = args.next().ok_or_else(|| eyre!("Missing value for --carrier"))?;
                params.carrier = Some(Carrier::from_identifier(&v).ok_or_else(|| eyre!("Unknown carrier: {}", v))?);
            }
            "--lang" => params.lang = Some(args.next().ok_or_else(|| eyre!("Missing value for --lang"))?),
            "--json" => params.json = true,
            "--links" => params.links = true,
            "-h" | "--help" => {
                eprintln!(include_str!("cli_help.txt"));
                std::process::exit(0);
            }
            _ => return Err(eyre!("Unknown arg: {}", a)),
        }
    }
    Ok(params)
}

pub fn run() -> Result<()> {
    let params = parse_args(env::args().skip(1))?;
    let mut options = TrackOptions::from_env();
    if let Some(lang) = &params.lang {
        options.lang = lang.to_ascii_lowercase();
    }

    let fetcher = params.payload_dir.as_ref().map(FileFetch::new);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;

    for line in io::stdin().lock().lines() {
        let line = line?;
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let Some(fetcher) = &fetcher else {
            detect(&mut out, input, &params)?;
            continue;
        };

        let shipment = match params.carrier {
            Some(carrier) => Shipment::new(carrier, input, fetcher, options.clone()).map(Some),
            None => Ok(Shipment::from_barcode(input, fetcher, options.clone())),
        };
        let shipment = match shipment {
            Ok(Some(s)) => s,
            Ok(None) => {
                error!(input, "no carrier recognizes this barcode");
                failures += 1;
                continue;
            }
            Err(e) => {
                error!(input, error = %e, "rejected");
                failures += 1;
                continue;
            }
        };

        if params.links {
            writeln!(out, "{}", shipment.tracking_link())?;
            continue;
        }

        match shipment.parcel() {
            Ok(parcel) => print_parcel(&mut out, &parcel, params.json)?,
            Err(e) => {
                report(input, &e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        info!(failures, "finished with failures");
    }
    Ok(())
}

fn detect(out: &mut impl Write, input: &str, params: &Params) -> Result<()> {
    let found = match params.carrier {
        Some(carrier) => carrier.courier().parse_number(input).ok().map(|n| (carrier, n)),
        None => from_barcode(input),
    };
    match found {
        Some((carrier, number)) if params.links => writeln!(out, "{}", carrier.courier().tracking_link(&number))?,
        Some((carrier, number)) => writeln!(out, "{}\t{}\t{}", input, carrier.identifier(), number)?,
        None => writeln!(out, "{}\t-", input)?,
    }
    Ok(())
}

fn print_parcel(out: &mut impl Write, parcel: &Parcel, json: bool) -> Result<()> {
    if json {
        writeln!(out, "{}", serde_json::to_string(parcel)?)?;
        return Ok(());
    }
    writeln!(out, "{}", parcel)?;
    if let Some(w) = parcel.weight() {
        writeln!(out, "  weight: {}", w)?;
    }
    for event in parcel.events() {
        writeln!(out, "  {}", event)?;
    }
    Ok(())
}

fn report(input: &str, e: &TrackError) {
    match e {
        TrackError::UnknownParcel { .. } => info!(input, "{}", e),
        _ => error!(input, error = %e, "tracking failed"),
    }
}
