// cldb: look up the DXCC entity for a callsign at a QSO time
// usage: cldb [OPTIONS] <CALLSIGN> [TIME]

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::Parser;
use cldb::db::EntityRecord;
use cldb::{check_callsign, load_cty_file, locate_cty_file, CallsignDb, CheckResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Club Log cty.xml DXCC lookup tool
#[derive(Parser, Debug)]
#[command(name = "cldb", version, about, long_about = None)]
struct Args {
    /// Callsign to look up (uppercased before the check)
    #[arg(required_unless_present_any = ["update", "entity"])]
    callsign: Option<String>,

    /// QSO time: RFC3339, "YYYY-MM-DD HH:MM:SS", or YYYY-MM-DD, all UTC.
    /// Defaults to now.
    time: Option<String>,

    /// Path to cty.xml (default: /usr/local/share/dxcc/cty.xml, then the
    /// executable directory)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log the decomposition trace
    #[arg(short, long)]
    debug: bool,

    /// Show the entity record for a canonical prefix instead of checking a
    /// callsign (time defaults to now)
    #[arg(long, value_name = "PREFIX", conflicts_with = "callsign")]
    entity: Option<String>,

    /// Download a fresh cty.xml with this Club Log API key, then exit
    #[arg(long, value_name = "API_KEY", env = "CLUBLOG_API_KEY")]
    update: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.debug { "cldb=debug" } else { "cldb=info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(api_key) = args.update.as_deref() {
        let dest_dir = args
            .file
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("/usr/local/share/dxcc"));
        return match cldb::cty::download_cty_xml(api_key, &dest_dir).await {
            Ok(path) => {
                log::info!("dataset updated: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                log::error!("update failed: {e}");
                ExitCode::FAILURE
            }
        };
    }

    let qsotime = match args.time.as_deref() {
        Some(text) => match parse_qso_time(text) {
            Some(t) => t,
            None => {
                log::error!("unable to parse time {text:?}");
                return ExitCode::FAILURE;
            }
        },
        None => Utc::now(),
    };

    let path = match locate_cty_file(args.file.as_deref()) {
        Ok(path) => path,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let dataset = match load_cty_file(&path) {
        Ok(dataset) => dataset,
        Err(e) => {
            log::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let db = CallsignDb::from_dataset(dataset);

    if let Some(prefix) = args.entity.as_deref() {
        let prefix = prefix.to_uppercase();
        return match db.entity_for_prefix(&prefix, qsotime) {
            Some(entity) => {
                if args.json {
                    match serde_json::to_string_pretty(entity) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            log::error!("failed to serialize entity: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    print_entity(entity);
                }
                ExitCode::SUCCESS
            }
            None => {
                log::error!("no entity for prefix {prefix} at {}", qsotime.to_rfc3339());
                ExitCode::FAILURE
            }
        };
    }

    // Guaranteed present by clap when --update and --entity are absent.
    let Some(entry) = args.callsign.as_deref() else {
        return ExitCode::FAILURE;
    };
    let call = entry.to_uppercase();

    match check_callsign(&db, &call, qsotime) {
        Ok(result) => {
            if args.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        log::error!("failed to serialize result: {e}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_result(&call, qsotime, &result);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("check failed for {call}: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Accepts RFC3339, a space-separated datetime, or a bare date, all UTC.
fn parse_qso_time(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    None
}

fn print_entity(entity: &EntityRecord) {
    println!("Entity Code: {}", entity.adif);
    println!("Entity Name: {}", entity.name);
    println!("Prefix:      {}", entity.prefix);
    println!("CQ Zone:     {}", entity.cqz);
    println!("Continent:   {}", entity.cont);
    println!("Longitude:   {:.2}", entity.long);
    println!("Latitude:    {:.2}", entity.lat);
    println!("Deleted:     {}", entity.deleted);
    println!("Whitelist:   {}", entity.whitelist);
}

fn print_result(call: &str, qsotime: DateTime<Utc>, result: &CheckResult) {
    println!("Callsign:    {call}");
    println!("QSO Time:    {}", qsotime.to_rfc3339());
    println!("Entity Code: {}", result.adif);
    println!("Entity Name: {}", result.name);
    println!("Prefix:      {}", result.prefix);
    println!("CQ Zone:     {}", result.cqz);
    println!("Continent:   {}", result.cont);
    println!("Longitude:   {:.2}", result.long);
    println!("Latitude:    {:.2}", result.lat);
    println!("Deleted:     {}", result.deleted);
    println!("Blocked:     {} (by whitelist)", result.blocked_by_whitelist);
    println!("Invalid:     {}", result.invalid);
}
