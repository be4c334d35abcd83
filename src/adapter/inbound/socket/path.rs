//! Helpers for the change paths carried by incremental frames, e.g.
//! `event[idfoevent='123'].markets[idfomarket='456'].istradable`.

pub(super) const EVENT_KEY: &str = "idfoevent";
pub(super) const MARKET_KEY: &str = "idfomarket";
pub(super) const SELECTION_KEY: &str = "idfoselection";

/// Value following `key` in `path`, skipping `=`, `:`, quotes and brackets.
pub(super) fn extract_id(path: &str, key: &str) -> Option<String> {
    let start = path.find(key)? + key.len();
    let rest = path[start..].trim_start_matches(['=', ':', '\'', '"', '[', ' ']);
    let end = rest
        .find(|c: char| matches!(c, '\'' | '"' | ']' | '/' | '.' | ',' | '&' | ';') || c.is_whitespace())
        .unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then(|| id.to_string())
}

/// Minutes part of a match clock such as `45:12`.
pub(super) fn match_minutes(match_time: &str) -> Option<String> {
    let minutes = match_time.split(':').next()?.trim();
    (!minutes.is_empty() && minutes.chars().all(|c| c.is_ascii_digit()))
        .then(|| minutes.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_quoted_and_plain_ids() {
        let path = "event[idfoevent='123'].markets[idfomarket='456'].istradable";
        assert_eq!(extract_id(path, EVENT_KEY).as_deref(), Some("123"));
        assert_eq!(extract_id(path, MARKET_KEY).as_deref(), Some("456"));
        assert_eq!(extract_id(path, SELECTION_KEY), None);

        assert_eq!(
            extract_id("idfoevent=9.liveDataSummary.status", EVENT_KEY).as_deref(),
            Some("9")
        );
        assert_eq!(extract_id("idfoevent=''", EVENT_KEY), None);
    }

    #[test]
    fn match_minutes_requires_digits() {
        assert_eq!(match_minutes("45:12").as_deref(), Some("45"));
        assert_eq!(match_minutes("7").as_deref(), Some("7"));
        assert_eq!(match_minutes("HT"), None);
    }
}
