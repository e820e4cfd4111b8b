use crate::domain::Shift;
use chrono::NaiveTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Result of normalizing one day's raw hours text. Unparseable pieces are
/// reported, never fatal: the day keeps whatever shifts survived.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursParse {
    pub shifts: Vec<Shift>,
    pub warnings: Vec<String>,
}

impl HoursParse {
    fn closed() -> Self {
        Self {
            shifts: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

static DAY_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z]{0,4}:\s*").unwrap());
static DOTTED_MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"([ap])\.m\.?").unwrap());
static BARE_A: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\s*a\b").unwrap());
static BARE_P: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\s*p\b").unwrap());
static DETACHED_MERIDIEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)\s+(am|pm)").unwrap());
static UNICODE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new(r"[—–−‒―]").unwrap());
static TO_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\bto\b\s*").unwrap());
static DASH_SPACING: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*-+\s*").unwrap());
static RANGE_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[,;\n]\s*").unwrap());
// Glued ranges with no separator at all, e.g. "9:00pm11pm" or "10am1:00pm"
static GLUED_AFTER_MINUTES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}:\d{2}(?:am|pm))(\d{1,2}(?::\d{2})?(?:am|pm))").unwrap());
static GLUED_AFTER_MERIDIEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d(?:am|pm))(\d{1,2}(?::\d{2})?(?:am|pm))").unwrap());
// Missing-colon clock like "600pm"
static MISSING_COLON: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})(\d{2})(am|pm)$").unwrap());

/// Normalizes one day's raw hours text into up to two shift windows.
///
/// Recognizes the closed sentinel (blank or "closed" → zero shifts) and the
/// "24 hours" sentinel (one 00:00–23:59 shift). Everything else is cleansed
/// of the source's formatting irregularities (unicode dashes, dotted or
/// detached am/pm, "to" separators, glued ranges, missing colons) and split
/// into range tokens, each parsed as a start-end pair of times of day.
pub fn parse_hours(raw: &str) -> HoursParse {
    let text = raw.trim().to_lowercase();
    if text.is_empty() || text.contains("closed") {
        return HoursParse::closed();
    }
    if text.contains("24 hours") {
        let start = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(23, 59, 0).unwrap();
        return HoursParse {
            shifts: vec![Shift { start, end }],
            warnings: Vec::new(),
        };
    }

    let text = text.replace('\u{202f}', " ");
    let text = DAY_PREFIX.replace(&text, "");
    let text = DOTTED_MERIDIEM.replace_all(&text, "${1}m");
    let text = BARE_A.replace_all(&text, "${1}am");
    let text = BARE_P.replace_all(&text, "${1}pm");
    let text = DETACHED_MERIDIEM.replace_all(&text, "${1}${2}");
    let text = UNICODE_DASH.replace_all(&text, "-");
    let text = TO_SEPARATOR.replace_all(&text, "-");
    let text = RANGE_SEPARATOR.replace_all(&text, " ");
    let text = DASH_SPACING.replace_all(&text, "-");
    let text = GLUED_AFTER_MINUTES.replace_all(&text, "${1}-${2}");
    let text = GLUED_AFTER_MERIDIEM.replace_all(&text, "${1}-${2}");

    let mut shifts = Vec::new();
    let mut warnings = Vec::new();

    // Remaining whitespace separates ranges; '-' separates a range's endpoints.
    for token in text.split_whitespace() {
        if shifts.len() == 2 {
            break;
        }
        let endpoints: Vec<&str> = token.split('-').filter(|s| !s.is_empty()).collect();
        if endpoints.len() != 2 {
            warnings.push(format!("unrecognized time range '{}'", token));
            continue;
        }
        let (start_text, end_text) = infer_missing_meridiem(endpoints[0], endpoints[1]);
        let start = match parse_time(&start_text) {
            Some(t) => t,
            None => {
                warnings.push(format!("unparseable time '{}'", start_text));
                continue;
            }
        };
        let end = match parse_time(&end_text) {
            Some(t) => t,
            None => {
                warnings.push(format!("unparseable time '{}'", end_text));
                continue;
            }
        };
        match Shift::new(start, end) {
            Some(shift) => shifts.push(shift),
            None => warnings.push(format!("empty or inverted range '{}'", token)),
        }
    }

    HoursParse { shifts, warnings }
}

fn meridiem(t: &str) -> Option<&'static str> {
    if t.contains("am") {
        Some("am")
    } else if t.contains("pm") {
        Some("pm")
    } else {
        None
    }
}

/// When only one endpoint carries am/pm, the other inherits it.
fn infer_missing_meridiem(start: &str, end: &str) -> (String, String) {
    let mut start = start.to_string();
    let mut end = end.to_string();
    match (meridiem(&start), meridiem(&end)) {
        (Some(m), None) => end.push_str(m),
        (None, Some(m)) => start.push_str(m),
        _ => {}
    }
    (start, end)
}

/// Parses a single endpoint: 12-hour forms with am/pm first, then 24-hour.
fn parse_time(t: &str) -> Option<NaiveTime> {
    let t = t.replace('.', ":");
    let t = MISSING_COLON.replace(&t, "${1}:${2}${3}");
    if meridiem(&t).is_some() {
        let format = if t.contains(':') { "%I:%M%p" } else { "%I%p" };
        NaiveTime::parse_from_str(&t, format).ok()
    } else {
        NaiveTime::parse_from_str(&t, "%H:%M").ok()
    }
}
