// Callsign grammar and the literal rule tables of the decomposition engine.
//
// The tables are data so the rule order and coverage can be audited and
// tested without running the engine; the control flow that applies them
// lives in the checker itself. Patterns compile once behind OnceLock.

use regex::Regex;
use std::sync::OnceLock;

fn wellformed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9A-Z/]{1,16}$").expect("valid callsign pattern"))
}

fn maritime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^MM[0-9]?$").expect("valid maritime pattern"))
}

fn prefix_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]?[A-Z]+[0-9]+)([0-9A-Z]+)$").expect("valid full-callsign pattern")
    })
}

fn area_parts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([0-9]?[A-Z]+)([0-9]+)([0-9A-Z]+)$").expect("valid call-area pattern")
    })
}

fn us_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[KNW][A-Z]?$|^A[A-L]$").expect("valid US prefix pattern"))
}

fn letters_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{3,}$").expect("valid letters-run pattern"))
}

fn digits_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{2,}$").expect("valid digits-run pattern"))
}

/// 1-16 characters of digits, uppercase letters, and slashes.
pub fn is_wellformed_call(call: &str) -> bool {
    wellformed_re().is_match(call)
}

/// `MM` plus an optional region digit; Maritime Mobile in any part but the
/// first (where it is a Scottish prefix).
pub fn is_maritime_token(part: &str) -> bool {
    maritime_re().is_match(part)
}

/// Split a full callsign into its prefix (letters plus call-area digits)
/// and suffix components. None means the string is a bare prefix, not a
/// complete callsign.
pub fn split_prefix_suffix(call: &str) -> Option<(&str, &str)> {
    let caps = prefix_suffix_re().captures(call)?;
    match (caps.get(1), caps.get(2)) {
        (Some(prefix), Some(suffix)) => Some((prefix.as_str(), suffix.as_str())),
        _ => None,
    }
}

/// Split a full callsign into prefix letters, call-area digits, and suffix,
/// for the call-area override stage.
pub fn split_area_parts(call: &str) -> Option<(&str, &str, &str)> {
    let caps = area_parts_re().captures(call)?;
    match (caps.get(1), caps.get(2), caps.get(3)) {
        (Some(prefix), Some(area), Some(suffix)) => {
            Some((prefix.as_str(), area.as_str(), suffix.as_str()))
        }
        _ => None,
    }
}

/// US prefix classes that all resolve under the plain `K` prefix once a
/// call-area digit override is applied.
pub fn is_us_prefix(prefix: &str) -> bool {
    us_prefix_re().is_match(prefix)
}

/// Trailing qualifier tokens that never identify an entity: portable,
/// mobile, contest, and power suffixes seen in logged callsigns.
pub const DISTRACTION_SUFFIXES: &[&str] = &[
    "P", "2K", "AE", "AG", "EO", "FF", "GA", "GP", "HQ", "KT", "LH", "LT", "PM", "RP", "SJ", "SK",
    "XA", "XB", "XP", "QRP1W", "QRP5W", "Y2K",
];

/// Trailing part pairs dropped together (club and expedition conventions).
pub const DISTRACTION_PAIRS: &[(&str, &str)] = &[("P", "M"), ("M", "P"), ("A", "M")];

/// Drop recognized distraction suffixes off the end of the part list until
/// no rule fires. Rules, in order: exact token membership, a run of three
/// or more letters, a run of two or more digits, a recognized trailing
/// part pair.
pub fn strip_distraction_suffixes<'a>(parts: &[&'a str]) -> Vec<&'a str> {
    let mut parts = parts.to_vec();
    loop {
        let n = parts.len();
        if n < 2 {
            return parts;
        }
        let last = parts[n - 1];

        if DISTRACTION_SUFFIXES.contains(&last)
            || letters_run_re().is_match(last)
            || digits_run_re().is_match(last)
        {
            log::debug!("dropping distraction suffix {last}");
            parts.truncate(n - 1);
            continue;
        }

        if n >= 3 && DISTRACTION_PAIRS.contains(&(parts[n - 2], last)) {
            log::debug!("dropping distraction pair {}/{last}", parts[n - 2]);
            parts.truncate(n - 2);
            continue;
        }

        return parts;
    }
}

/// Literal reference-prefix rewrites for the three-part stage, applied by
/// exact string match in this order.
pub const THREE_PART_REWRITES: &[(&str, &str)] = &[
    ("JD/M", "JD1M"), // Minami Torishima
    ("JD/O", "JD1"),  // Ogasawara
    ("HK0/M", "HK0M"), // Malpelo
    ("ZK1/S", "ZK1"), // South Cook Islands
    ("E5/S", "E5"),   // South Cook Islands
];

/// Apply the three-part literal rewrites.
pub fn rewrite_three_part(rp: &str) -> &str {
    for (from, to) in THREE_PART_REWRITES {
        if rp == *from {
            return to;
        }
    }
    rp
}

/// Location rewrites for the two-part stage, keyed on the prefix component
/// of the first part. The key prefixes are mutually exclusive, so at most
/// one rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaRule {
    /// `TK` with `2A`/`2B` area parts is Corsica itself.
    Corsica,
    /// Island designator joined with a slash (`3D2/C`, `FO/A`, `FR/G`, ...).
    JoinSlash,
    /// Island designator concatenated (`HK0M` for Malpelo).
    Concat,
    /// `N` selects the North Cook Islands; anything else stays South.
    CookIslands,
}

pub const AREA_RULES: &[(&str, AreaRule)] = &[
    ("TK", AreaRule::Corsica),
    ("3D2", AreaRule::JoinSlash),
    ("FO", AreaRule::JoinSlash),
    ("FR", AreaRule::JoinSlash),
    ("HK0", AreaRule::Concat),
    ("ZK1", AreaRule::CookIslands),
    ("E5", AreaRule::CookIslands),
];

/// Apply the location rewrite selected by the first part's prefix
/// component, if any. `prefix0` is empty when the first part is a bare
/// prefix, which disables every rule here.
pub fn apply_area_rules(rp: String, prefix0: &str, part1: &str) -> String {
    for (key, rule) in AREA_RULES {
        if !prefix0.starts_with(key) {
            continue;
        }
        return match rule {
            AreaRule::Corsica => {
                if part1 == "2A" || part1 == "2B" {
                    (*key).to_string()
                } else {
                    rp
                }
            }
            AreaRule::JoinSlash => format!("{key}/{part1}"),
            AreaRule::Concat => format!("{key}{part1}"),
            AreaRule::CookIslands => {
                if part1 == "N" {
                    format!("{key}/N")
                } else {
                    (*key).to_string()
                }
            }
        };
    }
    rp
}

/// Literal rewrites applied to the final reference prefix of the two-part
/// stage.
pub const FINAL_PREFIX_REWRITES: &[(&str, &str)] = &[
    ("IS", "IS0"),  // Sardinia
    ("IM", "IM0"),  // Sardinia
    ("KC4", "CE9"), // Antarctica
];

/// Apply the final literal rewrites.
pub fn rewrite_final_prefix(rp: &str) -> &str {
    for (from, to) in FINAL_PREFIX_REWRITES {
        if rp == *from {
            return to;
        }
    }
    rp
}
