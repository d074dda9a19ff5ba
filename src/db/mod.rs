// In-memory lookup database built from the Club Log cty.xml dataset.
//
// Five record collections come out of the dataset loader (entities,
// exceptions, prefixes, invalid operations, zone exceptions); this module
// holds the typed records and the read-only indices the checker resolves
// against. Everything is built once and never mutated afterwards, so a
// shared `&CallsignDb` can serve any number of concurrent lookups.
//
// Record lists under one key keep cty.xml document order and lookups return
// the first record whose window contains the query time. The dataset is
// expected not to ship ambiguously overlapping windows; when it does, the
// first-loaded record wins, and sorting would silently change answers.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::HashMap;

/// Inclusive time-window test used by every index lookup.
pub fn time_in_range(t: DateTime<Utc>, lower: DateTime<Utc>, upper: DateTime<Utc>) -> bool {
    lower <= t && t <= upper
}

/// Open-ended window start used when the dataset omits a timestamp.
pub fn min_time() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// Open-ended window end used when the dataset omits a timestamp.
pub fn max_time() -> DateTime<Utc> {
    DateTime::<Utc>::MAX_UTC
}

/// A DXCC entity as listed in the `entities` section of cty.xml.
#[derive(Debug, Clone, Serialize)]
pub struct EntityRecord {
    pub adif: u16,
    pub name: String,
    /// Canonical prefix for the entity; reported as the matched prefix when
    /// a callsign resolves through an exception record.
    pub prefix: String,
    pub deleted: bool,
    pub cqz: u8,
    pub cont: String,
    pub long: f64,
    pub lat: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub whitelist: bool,
    pub whitelist_start: DateTime<Utc>,
    pub whitelist_end: DateTime<Utc>,
}

/// One entry of the `prefixes` section: a callsign prefix valid for an
/// entity during [start, end].
#[derive(Debug, Clone, Serialize)]
pub struct PrefixRecord {
    pub call: String,
    pub entity: String,
    pub adif: u16,
    pub cqz: u8,
    pub cont: String,
    pub long: f64,
    pub lat: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One entry of the `exceptions` section: a whole callsign whose entity
/// cannot be derived from its prefix.
#[derive(Debug, Clone, Serialize)]
pub struct ExceptionRecord {
    pub record: u64,
    pub call: String,
    pub entity: String,
    pub adif: u16,
    pub cqz: u8,
    pub cont: String,
    pub long: f64,
    pub lat: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One entry of the `invalid_operations` section: the callsign never counts
/// as a valid DXCC contact inside the window.
#[derive(Debug, Clone, Serialize)]
pub struct InvalidRecord {
    pub record: u64,
    pub call: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// One entry of the `zone_exceptions` section: a CQ zone override that does
/// not change the entity.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneExceptionRecord {
    pub record: u64,
    pub call: String,
    pub zone: u8,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Anything carrying a validity window.
pub trait Windowed {
    fn start(&self) -> DateTime<Utc>;
    fn end(&self) -> DateTime<Utc>;

    fn in_window(&self, t: DateTime<Utc>) -> bool {
        time_in_range(t, self.start(), self.end())
    }
}

macro_rules! impl_windowed {
    ($($ty:ty),*) => {
        $(impl Windowed for $ty {
            fn start(&self) -> DateTime<Utc> {
                self.start
            }
            fn end(&self) -> DateTime<Utc> {
                self.end
            }
        })*
    };
}

impl_windowed!(
    EntityRecord,
    PrefixRecord,
    ExceptionRecord,
    InvalidRecord,
    ZoneExceptionRecord
);

/// First time-valid record in load order, or None.
fn first_in_window<R: Windowed>(records: Option<&Vec<R>>, t: DateTime<Utc>) -> Option<&R> {
    records?.iter().find(|r| r.in_window(t))
}

// The dataset has no prefix entry for E5/N (North Cook Islands after the
// ZK prefixes were retired), so one is synthesized at build time with the
// ZK1/N entity payload and a window opening when the E5 block took effect.
const NORTH_COOK_ADIF: u16 = 191;

fn north_cook_prefix_record() -> PrefixRecord {
    PrefixRecord {
        call: "E5/N".to_string(),
        entity: "NORTH COOK ISLANDS".to_string(),
        adif: NORTH_COOK_ADIF,
        cqz: 32,
        cont: "OC".to_string(),
        long: -161.08,
        lat: -10.38,
        start: Utc.with_ymd_and_hms(2006, 1, 1, 0, 0, 0).unwrap(),
        end: max_time(),
    }
}

/// The read-only lookup indices. Built once from the loaded dataset, then
/// shared immutably; `check_callsign` threads a `&CallsignDb` through every
/// stage instead of touching any global state.
pub struct CallsignDb {
    entities_by_adif: HashMap<u16, EntityRecord>,
    entities_by_prefix: HashMap<String, Vec<EntityRecord>>,
    prefixes: HashMap<String, Vec<PrefixRecord>>,
    exceptions: HashMap<String, Vec<ExceptionRecord>>,
    invalids: HashMap<String, Vec<InvalidRecord>>,
    zone_exceptions: HashMap<String, Vec<ZoneExceptionRecord>>,
}

impl CallsignDb {
    /// Build all indices from the loader's record collections.
    pub fn from_dataset(dataset: crate::cty::CtyDataset) -> Self {
        let mut entities_by_adif: HashMap<u16, EntityRecord> =
            HashMap::with_capacity(dataset.entities.len());
        let mut entities_by_prefix: HashMap<String, Vec<EntityRecord>> = HashMap::new();
        for entity in dataset.entities {
            entities_by_prefix
                .entry(entity.prefix.clone())
                .or_default()
                .push(entity.clone());
            if let Some(previous) = entities_by_adif.insert(entity.adif, entity) {
                log::debug!("duplicate entity record for adif {}", previous.adif);
            }
        }

        let mut prefixes: HashMap<String, Vec<PrefixRecord>> = HashMap::new();
        for record in dataset.prefixes {
            prefixes.entry(record.call.clone()).or_default().push(record);
        }
        prefixes
            .entry("E5/N".to_string())
            .or_default()
            .push(north_cook_prefix_record());

        let mut exceptions: HashMap<String, Vec<ExceptionRecord>> = HashMap::new();
        for record in dataset.exceptions {
            exceptions
                .entry(record.call.clone())
                .or_default()
                .push(record);
        }

        let mut invalids: HashMap<String, Vec<InvalidRecord>> = HashMap::new();
        for record in dataset.invalid_operations {
            invalids.entry(record.call.clone()).or_default().push(record);
        }

        let mut zone_exceptions: HashMap<String, Vec<ZoneExceptionRecord>> = HashMap::new();
        for record in dataset.zone_exceptions {
            zone_exceptions
                .entry(record.call.clone())
                .or_default()
                .push(record);
        }

        log::info!(
            "indexed {} entities, {} prefixes, {} exceptions, {} invalid operations, {} zone exceptions",
            entities_by_adif.len(),
            prefixes.len(),
            exceptions.len(),
            invalids.len(),
            zone_exceptions.len()
        );

        CallsignDb {
            entities_by_adif,
            entities_by_prefix,
            prefixes,
            exceptions,
            invalids,
            zone_exceptions,
        }
    }

    /// Entity record by ADIF code.
    pub fn entity(&self, adif: u16) -> Option<&EntityRecord> {
        self.entities_by_adif.get(&adif)
    }

    /// Entity record by canonical prefix, time-qualified. The same nominal
    /// prefix can belong to different entity eras.
    pub fn entity_for_prefix(&self, prefix: &str, t: DateTime<Utc>) -> Option<&EntityRecord> {
        first_in_window(self.entities_by_prefix.get(prefix), t)
    }

    /// Exact-callsign exception lookup.
    pub fn exception(&self, call: &str, t: DateTime<Utc>) -> Option<&ExceptionRecord> {
        first_in_window(self.exceptions.get(call), t)
    }

    /// Exact-callsign invalid-operation lookup.
    pub fn invalid(&self, call: &str, t: DateTime<Utc>) -> Option<&InvalidRecord> {
        first_in_window(self.invalids.get(call), t)
    }

    /// Exact-callsign zone-exception lookup.
    pub fn zone_exception(&self, call: &str, t: DateTime<Utc>) -> Option<&ZoneExceptionRecord> {
        first_in_window(self.zone_exceptions.get(call), t)
    }

    /// Longest-prefix match against the prefix index.
    ///
    /// Every key that is a literal prefix of `candidate` is tried from the
    /// longest down; the first time-valid record wins. Two distinct keys of
    /// equal length cannot both be prefixes of one string, so length is the
    /// only tie-break needed.
    pub fn longest_prefix(
        &self,
        candidate: &str,
        t: DateTime<Utc>,
    ) -> Option<(&str, &PrefixRecord)> {
        let mut matched: Vec<&str> = self
            .prefixes
            .keys()
            .filter(|key| candidate.starts_with(key.as_str()))
            .map(String::as_str)
            .collect();
        matched.sort_unstable_by(|a, b| b.len().cmp(&a.len()));

        for key in matched {
            if let Some(record) = first_in_window(self.prefixes.get(key), t) {
                log::debug!("prefix match {key} for {candidate}");
                return Some((key, record));
            }
        }
        log::debug!("no prefix match for {candidate}");
        None
    }
}
