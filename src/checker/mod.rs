// Callsign checker - resolves a callsign and a QSO time to a DXCC entity.
//
// The entry point is `check_callsign`. A callsign is repeatedly split,
// stripped, and rewritten through a fixed sequence of stages (format guard,
// invalid-operations, literal AM/MM classifications, exception lookups,
// the three-part grammar, distraction-suffix stripping, the call-area
// override, and the general two-part derivation) until a reference prefix
// is resolved against the database or a terminal classification is
// reached. Every lookup is qualified by the QSO time.
//
// Callsigns must be uppercased by the caller; lowercase input fails the
// format guard.

pub mod rules;

use crate::db::{
    time_in_range, CallsignDb, ExceptionRecord, InvalidRecord, ZoneExceptionRecord,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Entity names reported for terminal classifications, matching the Club
/// Log batch-lookup conventions (the spare ADIF codes 997-1000 cover
/// repeater, aeronautical mobile, maritime mobile, and invalid contacts;
/// results here carry entity code 0 instead).
pub const NAME_AERONAUTICAL_MOBILE: &str = "AERONAUTICAL MOBILE";
pub const NAME_MARITIME_MOBILE: &str = "MARITIME MOBILE";
pub const NAME_INVALID: &str = "INVALID";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// The input cannot be a callsign: bad characters, bad length, empty
    /// slash segment, or no segment matching the callsign grammar where
    /// one is required.
    #[error("malformed callsign")]
    MalformedCallsign,
    /// The decomposition reached a state its own rules exclude. Indicates
    /// a logic gap, not bad input.
    #[error("callsign decomposition reached an unreachable state")]
    Unreachable,
}

/// Outcome of a callsign check.
///
/// Terminal classifications (aeronautical/maritime mobile, invalid
/// operation, whitelist block) are successful results with `invalid` set
/// and entity code 0, not errors.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    /// ADIF entity code; 0 when no entity applies.
    pub adif: u16,
    /// Entity name, or a terminal classification marker.
    pub name: String,
    /// The prefix that produced the match.
    pub prefix: String,
    /// CQ zone.
    pub cqz: u8,
    /// Continent.
    pub cont: String,
    pub long: f64,
    pub lat: f64,
    /// The entity is a deleted DXCC entity.
    pub deleted: bool,
    /// Blocked by the entity's whitelist window.
    pub blocked_by_whitelist: bool,
    /// Not a valid DXCC contact.
    pub invalid: bool,
    /// Exception record that produced this result, if any.
    pub exception: Option<ExceptionRecord>,
    /// Zone-exception record applied to this result, if any.
    pub zone_exception: Option<ZoneExceptionRecord>,
    /// Invalid-operation record that terminated this check, if any.
    pub invalid_record: Option<InvalidRecord>,
}

impl CheckResult {
    fn classification(name: &str) -> CheckResult {
        CheckResult {
            name: name.to_string(),
            invalid: true,
            ..CheckResult::default()
        }
    }
}

/// Resolve `call` at QSO time `t` against the database.
pub fn check_callsign(
    db: &CallsignDb,
    call: &str,
    t: DateTime<Utc>,
) -> Result<CheckResult, CheckError> {
    if !rules::is_wellformed_call(call) {
        return Err(CheckError::MalformedCallsign);
    }

    // Invalid operations win over every other classification.
    if let Some(record) = db.invalid(call, t) {
        log::debug!("{call}: invalid operation record {}", record.record);
        let mut result = CheckResult::classification(NAME_INVALID);
        result.invalid_record = Some(record.clone());
        return Ok(result);
    }

    let parts: Vec<&str> = call.split('/').collect();
    log::debug!("{call}: {} part(s) {parts:?}", parts.len());

    if parts.len() > 1 {
        if parts.iter().any(|p| p.is_empty()) {
            return Err(CheckError::MalformedCallsign);
        }
        // Literal classifications before any database lookup. A leading MM
        // is Scotland, so only later parts count as Maritime Mobile.
        if parts.iter().any(|p| *p == "AM") {
            return Ok(CheckResult::classification(NAME_AERONAUTICAL_MOBILE));
        }
        if parts[1..].iter().any(|p| rules::is_maritime_token(p)) {
            return Ok(CheckResult::classification(NAME_MARITIME_MOBILE));
        }
    }

    if parts.len() == 1 {
        return check_single(db, call, t);
    }

    if let Some(result) = exception_result(db, call, t) {
        return Ok(post_check(db, call, t, result));
    }
    // Operators log portable callsigns in either order, so a two-part call
    // is also tried swapped.
    if parts.len() == 2 {
        let swapped = format!("{}/{}", parts[1], parts[0]);
        if let Some(result) = exception_result(db, &swapped, t) {
            return Ok(post_check(db, call, t, result));
        }
    }

    if parts.len() == 3 {
        return check_three_part(db, call, &parts, t);
    }

    let stripped = rules::strip_distraction_suffixes(&parts);
    if stripped.is_empty() {
        return Err(CheckError::MalformedCallsign);
    }
    let reduced = stripped.join("/");
    log::debug!("{call}: reduced to {reduced}");

    if let Some(result) = exception_result(db, &reduced, t) {
        return Ok(post_check(db, &reduced, t, result));
    }
    if stripped.len() == 2 {
        let swapped = format!("{}/{}", stripped[1], stripped[0]);
        if let Some(result) = exception_result(db, &swapped, t) {
            return Ok(post_check(db, &reduced, t, result));
        }
    }

    if stripped.len() == 2 {
        let last = stripped[1];
        if last.len() == 1 && last.chars().all(|c| c.is_ascii_digit()) {
            return check_area_override(db, stripped[0], last, t);
        }
    }

    if stripped.len() == 1 {
        return check_single(db, &reduced, t);
    }

    check_multi_part(db, &reduced, &stripped, t)
}

/// Zero-slash resolution: exception lookup, then longest prefix, with the
/// KG4 disambiguation (only two-letter suffixes are Guantanamo Bay;
/// anything else is a stateside call).
fn check_single(db: &CallsignDb, call: &str, t: DateTime<Utc>) -> Result<CheckResult, CheckError> {
    if let Some(result) = exception_result(db, call, t) {
        return Ok(post_check(db, call, t, result));
    }

    let suffix = rules::split_prefix_suffix(call).map_or("", |(_, suffix)| suffix);

    let mut matched = db.longest_prefix(call, t);
    if let Some(("KG4", _)) = matched {
        if suffix.len() != 2 {
            log::debug!("{call}: KG4 with non-2-letter suffix, re-resolving under K");
            matched = db.longest_prefix("K", t);
        }
    }

    let mut result = CheckResult::default();
    populate_from_prefix(db, &mut result, matched);
    Ok(post_check(db, call, t, result))
}

/// Three-part grammar: exactly one part should be a full callsign; the
/// other two, joined, form the candidate reference prefix. Parts are tried
/// in order and the first grammar match wins.
fn check_three_part(
    db: &CallsignDb,
    call: &str,
    parts: &[&str],
    t: DateTime<Utc>,
) -> Result<CheckResult, CheckError> {
    let rp = if rules::split_prefix_suffix(parts[0]).is_some() {
        format!("{}/{}", parts[1], parts[2])
    } else if rules::split_prefix_suffix(parts[1]).is_some() {
        format!("{}/{}", parts[0], parts[2])
    } else if rules::split_prefix_suffix(parts[2]).is_some() {
        format!("{}/{}", parts[0], parts[1])
    } else {
        return Err(CheckError::MalformedCallsign);
    };

    let rp = rules::rewrite_three_part(&rp);
    log::debug!("{call}: three-part reference prefix {rp}");

    let mut result = CheckResult::default();
    let matched = db.longest_prefix(rp, t);
    populate_from_prefix(db, &mut result, matched);
    Ok(post_check(db, call, t, result))
}

/// Call-area override: `<full call>/<digit>` relocates the station, so the
/// digit replaces the call-area component and the synthesized callsign is
/// resolved as a zero-slash call.
fn check_area_override(
    db: &CallsignDb,
    first: &str,
    digit: &str,
    t: DateTime<Utc>,
) -> Result<CheckResult, CheckError> {
    let (prefix, _, suffix) =
        rules::split_area_parts(first).ok_or(CheckError::MalformedCallsign)?;

    let mut prefix = prefix.to_string();
    let mut area = digit.to_string();
    let mut suffix = suffix.to_string();

    // All US call areas resolve under the plain K prefix.
    if rules::is_us_prefix(&prefix) {
        prefix = "K".to_string();
    }
    // BS/7 is mainland China, not Scarborough Reef.
    if prefix == "BS" && area == "7" {
        area = "0".to_string();
    }
    // Russian /9 relocations land in zone 18: UA9AA/9 -> UA9VAA.
    if (prefix.starts_with('R') || prefix.starts_with('U')) && area == "9" {
        suffix = format!("V{suffix}");
    }

    let newcall = format!("{prefix}{area}{suffix}");
    log::debug!("{first}/{digit}: call-area override -> {newcall}");
    check_single(db, &newcall, t)
}

/// General two-or-more-part derivation: classify the first two parts as
/// bare prefix or full callsign, pick the reference prefix from the
/// decision table, then apply the location rewrites.
fn check_multi_part(
    db: &CallsignDb,
    reduced: &str,
    parts: &[&str],
    t: DateTime<Utc>,
) -> Result<CheckResult, CheckError> {
    let part0 = parts[0];
    let part1 = parts[1];
    let split0 = rules::split_prefix_suffix(part0);
    let split1 = rules::split_prefix_suffix(part1);

    let rp = match (split0.is_some(), split1.is_some()) {
        // Two bare prefixes: the shorter one names the location.
        (false, false) => shorter_of(part0, part1),
        // KL7/JJ1BDX: the leading bare prefix wins.
        (false, true) => part0,
        // JJ1BDX/KL7: the trailing bare prefix wins, except the /M and /N
        // qualifiers, which fall back to the full call.
        (true, false) => {
            if part1 == "M" || part1 == "N" {
                part0
            } else {
                part1
            }
        }
        // Two full callsigns: the shorter one.
        (true, true) => shorter_of(part0, part1),
    };

    let prefix0 = split0.map_or("", |(prefix, _)| prefix);
    let rp = rules::apply_area_rules(rp.to_string(), prefix0, part1);
    let rp = rules::rewrite_final_prefix(&rp);
    log::debug!("{reduced}: reference prefix {rp}");

    let mut result = CheckResult::default();
    let matched = db.longest_prefix(rp, t);
    populate_from_prefix(db, &mut result, matched);
    Ok(post_check(db, reduced, t, result))
}

fn shorter_of<'a>(a: &'a str, b: &'a str) -> &'a str {
    if a.len() <= b.len() {
        a
    } else {
        b
    }
}

/// Build a result from an exception record, if one is valid at `t`. The
/// matched prefix and the deleted flag come from the entity table.
fn exception_result(db: &CallsignDb, call: &str, t: DateTime<Utc>) -> Option<CheckResult> {
    let record = db.exception(call, t)?;
    log::debug!("{call}: exception record {}", record.record);

    let (prefix, deleted) = db
        .entity(record.adif)
        .map_or((String::new(), false), |e| (e.prefix.clone(), e.deleted));

    Some(CheckResult {
        adif: record.adif,
        name: record.entity.clone(),
        prefix,
        cqz: record.cqz,
        cont: record.cont.clone(),
        long: record.long,
        lat: record.lat,
        deleted,
        exception: Some(record.clone()),
        ..CheckResult::default()
    })
}

/// Copy a longest-prefix match into the result. A failed lookup leaves the
/// zeroed entity in place; that is a valid outcome, not an error.
fn populate_from_prefix(
    db: &CallsignDb,
    result: &mut CheckResult,
    matched: Option<(&str, &crate::db::PrefixRecord)>,
) {
    if let Some((prefix, record)) = matched {
        result.adif = record.adif;
        result.name = record.entity.clone();
        result.prefix = prefix.to_string();
        result.cqz = record.cqz;
        result.cont = record.cont.clone();
        result.long = record.long;
        result.lat = record.lat;
        result.deleted = db.entity(record.adif).is_some_and(|e| e.deleted);
    }
}

/// Post-resolution policy: overlay any zone exception for the call that
/// produced the result, then apply whitelist blocking. A whitelisted
/// entity invalidates prefix-derived matches inside its window, but an
/// explicit exception match always survives.
fn post_check(
    db: &CallsignDb,
    call: &str,
    t: DateTime<Utc>,
    mut result: CheckResult,
) -> CheckResult {
    if let Some(zone) = db.zone_exception(call, t) {
        log::debug!("{call}: zone exception {} -> zone {}", zone.record, zone.zone);
        result.cqz = zone.zone;
        result.zone_exception = Some(zone.clone());
    }

    if let Some(entity) = db.entity(result.adif) {
        if entity.whitelist
            && time_in_range(t, entity.whitelist_start, entity.whitelist_end)
            && result.exception.is_none()
        {
            log::debug!("{call}: blocked by whitelist for entity {}", entity.adif);
            result.adif = 0;
            result.name = NAME_INVALID.to_string();
            result.blocked_by_whitelist = true;
            result.invalid = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cty::CtyDataset;
    use crate::db::{max_time, min_time, EntityRecord, PrefixRecord};
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap()
    }

    fn entity(adif: u16, name: &str, prefix: &str) -> EntityRecord {
        EntityRecord {
            adif,
            name: name.to_string(),
            prefix: prefix.to_string(),
            deleted: false,
            cqz: 0,
            cont: String::new(),
            long: 0.0,
            lat: 0.0,
            start: min_time(),
            end: max_time(),
            whitelist: false,
            whitelist_start: min_time(),
            whitelist_end: max_time(),
        }
    }

    fn prefix(call: &str, adif: u16, name: &str, cqz: u8, cont: &str) -> PrefixRecord {
        PrefixRecord {
            call: call.to_string(),
            entity: name.to_string(),
            adif,
            cqz,
            cont: cont.to_string(),
            long: 0.0,
            lat: 0.0,
            start: min_time(),
            end: max_time(),
        }
    }

    fn exception(call: &str, adif: u16, name: &str, cqz: u8) -> ExceptionRecord {
        ExceptionRecord {
            record: 1,
            call: call.to_string(),
            entity: name.to_string(),
            adif,
            cqz,
            cont: "NA".to_string(),
            long: 0.0,
            lat: 0.0,
            start: min_time(),
            end: max_time(),
        }
    }

    /// A small synthetic dataset with enough entities and prefixes to
    /// exercise every stage of the checker.
    fn test_db() -> CallsignDb {
        let mut whitelisted = entity(247, "SPRATLY ISLANDS", "1S");
        whitelisted.whitelist = true;
        whitelisted.whitelist_start = ts(2000, 1, 1);
        whitelisted.whitelist_end = max_time();

        CallsignDb::from_dataset(CtyDataset {
            date: String::new(),
            entities: vec![
                entity(291, "UNITED STATES", "K"),
                entity(110, "HAWAII", "KH6"),
                entity(6, "ALASKA", "KL"),
                entity(105, "GUANTANAMO BAY", "KG4"),
                entity(339, "JAPAN", "JA"),
                entity(177, "MINAMI TORISHIMA", "JD1M"),
                entity(15, "ASIATIC RUSSIA", "UA9"),
                entity(54, "EUROPEAN RUSSIA", "UA"),
                entity(214, "CORSICA", "TK"),
                entity(225, "SARDINIA", "IS0"),
                entity(13, "ANTARCTICA", "CE9"),
                entity(191, "NORTH COOK ISLANDS", "E5/N"),
                entity(234, "SOUTH COOK ISLANDS", "E5"),
                whitelisted,
            ],
            exceptions: vec![
                exception("JJ1BDX/KL7", 6, "ALASKA", 1),
                exception("5B4AGN", 215, "CYPRUS", 20),
                exception("1S1AAA", 247, "SPRATLY ISLANDS", 26),
                exception("JD1BMM", 177, "MINAMI TORISHIMA", 27),
            ],
            prefixes: vec![
                prefix("K", 291, "UNITED STATES", 5, "NA"),
                prefix("W", 291, "UNITED STATES", 5, "NA"),
                prefix("KH6", 110, "HAWAII", 31, "OC"),
                prefix("KL", 6, "ALASKA", 1, "NA"),
                prefix("KG4", 105, "GUANTANAMO BAY", 8, "NA"),
                prefix("JA", 339, "JAPAN", 25, "AS"),
                prefix("JD1", 192, "OGASAWARA", 27, "AS"),
                prefix("JD1M", 177, "MINAMI TORISHIMA", 27, "AS"),
                prefix("UA", 54, "EUROPEAN RUSSIA", 16, "EU"),
                prefix("UA9", 15, "ASIATIC RUSSIA", 17, "AS"),
                prefix("UA9V", 15, "ASIATIC RUSSIA", 18, "AS"),
                prefix("TK", 214, "CORSICA", 15, "EU"),
                prefix("IS0", 225, "SARDINIA", 15, "EU"),
                prefix("CE9", 13, "ANTARCTICA", 13, "AN"),
                prefix("E5", 234, "SOUTH COOK ISLANDS", 32, "OC"),
                prefix("1S", 247, "SPRATLY ISLANDS", 26, "AS"),
                prefix("GM", 279, "SCOTLAND", 14, "EU"),
                prefix("MM", 279, "SCOTLAND", 14, "EU"),
            ],
            invalid_operations: vec![InvalidRecord {
                record: 10,
                call: "T32WW".to_string(),
                start: ts(2010, 1, 1),
                end: ts(2010, 12, 31),
            }],
            zone_exceptions: vec![ZoneExceptionRecord {
                record: 20,
                call: "KL7XYZ".to_string(),
                zone: 2,
                start: min_time(),
                end: max_time(),
            }],
        })
    }

    #[test]
    fn test_malformed_inputs() {
        let db = test_db();
        let t = ts(2020, 1, 1);
        for call in ["", "w1aw", "W1AW-1", "K1ABC//P", "W1AW/", "/W1AW", "/"] {
            assert_eq!(
                check_callsign(&db, call, t).unwrap_err(),
                CheckError::MalformedCallsign,
                "{call} should be malformed"
            );
        }
    }

    #[test]
    fn test_invalid_operation_window() {
        let db = test_db();

        let result = check_callsign(&db, "T32WW", ts(2010, 6, 1)).unwrap();
        assert!(result.invalid);
        assert_eq!(result.adif, 0);
        assert_eq!(result.name, NAME_INVALID);
        assert!(result.invalid_record.is_some());

        // Outside the window the callsign resolves normally (here: no
        // matching prefix, so an empty result).
        let result = check_callsign(&db, "T32WW", ts(2015, 6, 1)).unwrap();
        assert!(!result.invalid);
        assert!(result.invalid_record.is_none());
    }

    #[test]
    fn test_aeronautical_mobile() {
        let db = test_db();
        for call in ["W1AW/AM", "AM/W1AW", "KL7/W1AW/AM"] {
            let result = check_callsign(&db, call, ts(2020, 1, 1)).unwrap();
            assert_eq!(result.name, NAME_AERONAUTICAL_MOBILE, "{call}");
            assert!(result.invalid);
            assert_eq!(result.adif, 0);
        }
    }

    #[test]
    fn test_maritime_mobile_index_rule() {
        let db = test_db();
        let t = ts(2020, 1, 1);

        for call in ["W1AW/MM", "W1AW/MM3", "JA1ABC/MM/P"] {
            let result = check_callsign(&db, call, t).unwrap();
            assert_eq!(result.name, NAME_MARITIME_MOBILE, "{call}");
            assert!(result.invalid);
        }

        // A leading MM part is a Scottish prefix, not Maritime Mobile.
        let result = check_callsign(&db, "MM0ABC", t).unwrap();
        assert_eq!(result.name, "SCOTLAND");
        // Two-part form: MM/full-call keeps the leading part as a prefix.
        let result = check_callsign(&db, "MM/W1AW", t).unwrap();
        assert_eq!(result.name, "SCOTLAND");
    }

    #[test]
    fn test_zero_slash_resolves_directly() {
        let db = test_db();
        // Resolved through the single-call path: the exact exception wins
        // over the JD1 prefix, and the entity table supplies the prefix.
        let result = check_callsign(&db, "JD1BMM", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 177);
        assert_eq!(result.prefix, "JD1M");
        assert_eq!(result.name, "MINAMI TORISHIMA");
        assert!(result.exception.is_some());
    }

    #[test]
    fn test_exception_beats_prefix() {
        let db = test_db();
        let result = check_callsign(&db, "5B4AGN", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 215);
        assert_eq!(result.name, "CYPRUS");
        assert!(result.exception.is_some());
    }

    #[test]
    fn test_swapped_exception_order() {
        let db = test_db();
        // Only JJ1BDX/KL7 is in the exception table; the swapped logging
        // order must still find it.
        let result = check_callsign(&db, "KL7/JJ1BDX", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 6);
        assert_eq!(result.name, "ALASKA");
        assert!(result.exception.is_some());
    }

    #[test]
    fn test_three_part_grammar() {
        let db = test_db();
        let result = check_callsign(&db, "W1AW/KH6/P", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 110);
        assert_eq!(result.prefix, "KH6");

        let result = check_callsign(&db, "KH6/W1AW/P", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 110);

        // No part matches the full-callsign grammar.
        assert_eq!(
            check_callsign(&db, "KH6/KL7/TK", ts(2020, 1, 1)).unwrap_err(),
            CheckError::MalformedCallsign
        );
    }

    #[test]
    fn test_three_part_literal_rewrite() {
        let db = test_db();
        // JD1ABC/JD/M: the JD/M remainder names Minami Torishima.
        let result = check_callsign(&db, "JD1ABC/JD/M", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.prefix, "JD1M");
        assert_eq!(result.name, "MINAMI TORISHIMA");
    }

    #[test]
    fn test_distraction_suffix_stripping() {
        let db = test_db();
        // Four parts: P and QRP5W are stripped, then W1AW/KH6 resolves via
        // the two-part decision table.
        let result = check_callsign(&db, "W1AW/KH6/P/QRP5W", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 110);
        assert_eq!(result.prefix, "KH6");
    }

    #[test]
    fn test_call_area_override_russian_zone18() {
        let db = test_db();
        // UA9AA/9 -> prefix UA, area 9, suffix VAA -> UA9VAA -> zone 18.
        let result = check_callsign(&db, "UA9AA/9", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 15);
        assert_eq!(result.prefix, "UA9V");
        assert_eq!(result.cqz, 18);
    }

    #[test]
    fn test_call_area_override_us_canonicalization() {
        let db = test_db();
        // NH6ABC/1 -> prefix canonicalized to K -> K1ABC -> United States.
        let result = check_callsign(&db, "NH6ABC/1", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 291);
        assert_eq!(result.prefix, "K");

        // First part must be a full callsign for the override.
        assert_eq!(
            check_callsign(&db, "KH6/1", ts(2020, 1, 1)).unwrap_err(),
            CheckError::MalformedCallsign
        );
    }

    #[test]
    fn test_two_part_decision_table() {
        let db = test_db();
        let t = ts(2020, 1, 1);

        // prefix / full call
        let result = check_callsign(&db, "KL7/W1AW", t).unwrap();
        assert_eq!(result.adif, 6);
        // full call / prefix
        let result = check_callsign(&db, "W1AW/KH6", t).unwrap();
        assert_eq!(result.adif, 110);
        // full call / M qualifier falls back to the full call
        let result = check_callsign(&db, "JA1ABC/M", t).unwrap();
        assert_eq!(result.adif, 339);
        // two bare prefixes: shorter wins
        let result = check_callsign(&db, "KH6/JA", t).unwrap();
        assert_eq!(result.adif, 339);
        // two full callsigns: shorter wins
        let result = check_callsign(&db, "JA1ABCD/W1AW", t).unwrap();
        assert_eq!(result.adif, 291);
    }

    #[test]
    fn test_two_part_location_rewrites() {
        let db = test_db();
        let t = ts(2020, 1, 1);

        // TK5ABC/2A stays Corsica.
        let result = check_callsign(&db, "TK5ABC/2A", t).unwrap();
        assert_eq!(result.adif, 214);

        // E51ABC/N relocates to the North Cook Islands (synthesized E5/N).
        let result = check_callsign(&db, "E51ABC/N", t).unwrap();
        assert_eq!(result.adif, 191);
        assert_eq!(result.prefix, "E5/N");

        // W1AW/IS is Sardinia via the IS -> IS0 literal rewrite.
        let result = check_callsign(&db, "W1AW/IS", t).unwrap();
        assert_eq!(result.adif, 225);

        // W1AW/KC4 is Antarctica via KC4 -> CE9.
        let result = check_callsign(&db, "W1AW/KC4", t).unwrap();
        assert_eq!(result.adif, 13);
    }

    #[test]
    fn test_kg4_disambiguation() {
        let db = test_db();
        let t = ts(2020, 1, 1);

        // Two-letter suffix stays Guantanamo Bay.
        let result = check_callsign(&db, "KG4AB", t).unwrap();
        assert_eq!(result.adif, 105);
        // Three-letter suffix is a stateside call.
        let result = check_callsign(&db, "KG4ABC", t).unwrap();
        assert_eq!(result.adif, 291);
        assert_eq!(result.prefix, "K");
    }

    #[test]
    fn test_zone_exception_overrides_zone_only() {
        let db = test_db();
        let result = check_callsign(&db, "KL7XYZ", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 6);
        assert_eq!(result.cqz, 2);
        assert!(result.zone_exception.is_some());
    }

    #[test]
    fn test_whitelist_blocks_prefix_match() {
        let db = test_db();

        // Prefix-derived match on a whitelisted entity is blocked.
        let result = check_callsign(&db, "1S1ZZZ", ts(2020, 1, 1)).unwrap();
        assert!(result.blocked_by_whitelist);
        assert!(result.invalid);
        assert_eq!(result.adif, 0);
        assert_eq!(result.name, NAME_INVALID);

        // Before the whitelist window opens, the prefix match stands.
        let result = check_callsign(&db, "1S1ZZZ", ts(1995, 1, 1)).unwrap();
        assert!(!result.blocked_by_whitelist);
        assert_eq!(result.adif, 247);
    }

    #[test]
    fn test_whitelist_never_blocks_exception_match() {
        let db = test_db();
        let result = check_callsign(&db, "1S1AAA", ts(2020, 1, 1)).unwrap();
        assert!(!result.blocked_by_whitelist);
        assert_eq!(result.adif, 247);
        assert!(result.exception.is_some());
    }

    #[test]
    fn test_unmatched_prefix_yields_empty_result() {
        let db = test_db();
        let result = check_callsign(&db, "ZZ9ZZZ", ts(2020, 1, 1)).unwrap();
        assert_eq!(result.adif, 0);
        assert_eq!(result.name, "");
        assert!(!result.invalid);
    }

    #[test]
    fn test_check_is_pure() {
        let db = test_db();
        let t = ts(2020, 1, 1);
        let first = check_callsign(&db, "KL7/JJ1BDX", t).unwrap();
        for _ in 0..3 {
            let again = check_callsign(&db, "KL7/JJ1BDX", t).unwrap();
            assert_eq!(again.adif, first.adif);
            assert_eq!(again.name, first.name);
            assert_eq!(again.cqz, first.cqz);
        }
    }
}
