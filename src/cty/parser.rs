// cty.xml parser
//
// The document carries five sections:
//   <entities>           DXCC entities with optional whitelist windows
//   <exceptions>         per-callsign entity overrides
//   <prefixes>           time-windowed prefix assignments
//   <invalid_operations> callsigns that never count as DXCC contacts
//   <zone_exceptions>    per-callsign CQ zone overrides
//
// Timestamps are RFC3339 with an explicit offset, e.g.
// 1991-03-30T23:59:59+00:00. A missing or empty timestamp means the window
// is open on that side and becomes the minimum/maximum sentinel, so the
// core never sees an optional time.

use crate::cty::{CtyDataset, CtyError};
use crate::db::{
    max_time, min_time, EntityRecord, ExceptionRecord, InvalidRecord, PrefixRecord,
    ZoneExceptionRecord,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ClublogXml {
    #[serde(rename = "@date", default)]
    date: String,
    #[serde(default)]
    entities: EntitiesXml,
    #[serde(default)]
    exceptions: ExceptionsXml,
    #[serde(default)]
    prefixes: PrefixesXml,
    #[serde(default)]
    invalid_operations: InvalidOperationsXml,
    #[serde(default)]
    zone_exceptions: ZoneExceptionsXml,
}

#[derive(Debug, Default, Deserialize)]
struct EntitiesXml {
    #[serde(rename = "entity", default)]
    entries: Vec<EntityXml>,
}

#[derive(Debug, Deserialize)]
struct EntityXml {
    #[serde(default)]
    adif: u16,
    #[serde(default)]
    name: String,
    #[serde(default)]
    prefix: String,
    #[serde(default)]
    deleted: Option<String>,
    #[serde(default)]
    cqz: u8,
    #[serde(default)]
    cont: String,
    #[serde(default)]
    long: f64,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    whitelist: Option<String>,
    #[serde(default)]
    whitelist_start: Option<String>,
    #[serde(default)]
    whitelist_end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExceptionsXml {
    #[serde(rename = "exception", default)]
    entries: Vec<ExceptionXml>,
}

#[derive(Debug, Deserialize)]
struct ExceptionXml {
    #[serde(rename = "@record", default)]
    record: u64,
    #[serde(default)]
    call: String,
    #[serde(default)]
    entity: String,
    #[serde(default)]
    adif: u16,
    #[serde(default)]
    cqz: u8,
    #[serde(default)]
    cont: String,
    #[serde(default)]
    long: f64,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct PrefixesXml {
    #[serde(rename = "prefix", default)]
    entries: Vec<PrefixXml>,
}

#[derive(Debug, Deserialize)]
struct PrefixXml {
    #[serde(default)]
    call: String,
    #[serde(default)]
    entity: String,
    #[serde(default)]
    adif: u16,
    #[serde(default)]
    cqz: u8,
    #[serde(default)]
    cont: String,
    #[serde(default)]
    long: f64,
    #[serde(default)]
    lat: f64,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InvalidOperationsXml {
    #[serde(rename = "invalid", default)]
    entries: Vec<InvalidXml>,
}

#[derive(Debug, Deserialize)]
struct InvalidXml {
    #[serde(rename = "@record", default)]
    record: u64,
    #[serde(default)]
    call: String,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ZoneExceptionsXml {
    #[serde(rename = "zone_exception", default)]
    entries: Vec<ZoneExceptionXml>,
}

#[derive(Debug, Deserialize)]
struct ZoneExceptionXml {
    #[serde(rename = "@record", default)]
    record: u64,
    #[serde(default)]
    call: String,
    #[serde(default)]
    zone: u8,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
}

/// The dataset writes booleans as text.
fn flag(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("true") || v == "1"
        })
        .unwrap_or(false)
}

/// Parse one window bound; missing or empty means open-ended.
fn window_bound(value: &Option<String>, open: DateTime<Utc>) -> Result<DateTime<Utc>, CtyError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(open),
        Some(text) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| CtyError::Timestamp {
                value: text.to_string(),
                source,
            }),
    }
}

/// Parse a cty.xml document into record collections, preserving document
/// order within each section.
pub fn parse_cty_xml(xml: &str) -> Result<CtyDataset, CtyError> {
    let raw: ClublogXml = quick_xml::de::from_str(xml)?;
    let mut skipped = 0usize;

    let mut entities = Vec::with_capacity(raw.entities.entries.len());
    for e in &raw.entities.entries {
        entities.push(EntityRecord {
            adif: e.adif,
            name: e.name.clone(),
            prefix: e.prefix.clone(),
            deleted: flag(&e.deleted),
            cqz: e.cqz,
            cont: e.cont.clone(),
            long: e.long,
            lat: e.lat,
            start: window_bound(&e.start, min_time())?,
            end: window_bound(&e.end, max_time())?,
            whitelist: flag(&e.whitelist),
            whitelist_start: window_bound(&e.whitelist_start, min_time())?,
            whitelist_end: window_bound(&e.whitelist_end, max_time())?,
        });
    }

    let mut exceptions = Vec::with_capacity(raw.exceptions.entries.len());
    for e in &raw.exceptions.entries {
        if e.call.is_empty() {
            skipped += 1;
            continue;
        }
        exceptions.push(ExceptionRecord {
            record: e.record,
            call: e.call.clone(),
            entity: e.entity.clone(),
            adif: e.adif,
            cqz: e.cqz,
            cont: e.cont.clone(),
            long: e.long,
            lat: e.lat,
            start: window_bound(&e.start, min_time())?,
            end: window_bound(&e.end, max_time())?,
        });
    }

    let mut prefixes = Vec::with_capacity(raw.prefixes.entries.len());
    for p in &raw.prefixes.entries {
        if p.call.is_empty() {
            skipped += 1;
            continue;
        }
        prefixes.push(PrefixRecord {
            call: p.call.clone(),
            entity: p.entity.clone(),
            adif: p.adif,
            cqz: p.cqz,
            cont: p.cont.clone(),
            long: p.long,
            lat: p.lat,
            start: window_bound(&p.start, min_time())?,
            end: window_bound(&p.end, max_time())?,
        });
    }

    let mut invalid_operations = Vec::with_capacity(raw.invalid_operations.entries.len());
    for i in &raw.invalid_operations.entries {
        if i.call.is_empty() {
            skipped += 1;
            continue;
        }
        invalid_operations.push(InvalidRecord {
            record: i.record,
            call: i.call.clone(),
            start: window_bound(&i.start, min_time())?,
            end: window_bound(&i.end, max_time())?,
        });
    }

    let mut zone_exceptions = Vec::with_capacity(raw.zone_exceptions.entries.len());
    for z in &raw.zone_exceptions.entries {
        if z.call.is_empty() {
            skipped += 1;
            continue;
        }
        zone_exceptions.push(ZoneExceptionRecord {
            record: z.record,
            call: z.call.clone(),
            zone: z.zone,
            start: window_bound(&z.start, min_time())?,
            end: window_bound(&z.end, max_time())?,
        });
    }

    log::info!(
        "parsed cty.xml dated {:?}: {} entities, {} exceptions, {} prefixes, {} invalid operations, {} zone exceptions, {} skipped",
        raw.date,
        entities.len(),
        exceptions.len(),
        prefixes.len(),
        invalid_operations.len(),
        zone_exceptions.len(),
        skipped
    );

    Ok(CtyDataset {
        date: raw.date,
        entities,
        exceptions,
        prefixes,
        invalid_operations,
        zone_exceptions,
    })
}
