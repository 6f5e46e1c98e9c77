//! Line-oriented people input.
//!
//! Each non-blank line reads `ROLE FIRSTNAME SURNAME [Y|N]`. Role and the
//! accommodation flag are case-insensitive; a missing flag means `N`.

use crate::engine::OnboardingReport;
use crate::error::{AllocationError, AllocationResult};
use crate::model::person::Role;

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonLine {
    pub role: Role,
    pub name: String,
    pub wants_accommodation: bool,
}

/// Per-line outcome of one bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkLoadReport {
    pub onboarded: Vec<OnboardingReport>,
    /// Lines that could not be parsed; the rest of the batch still ran.
    pub failures: Vec<AllocationError>,
}

impl BulkLoadReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parses one input line; `line` is 1-based and only used for reporting.
pub fn parse_person_line(line: usize, text: &str) -> AllocationResult<PersonLine> {
    let fields: Vec<&str> = text.split_whitespace().collect();
    let malformed = |reason: String| AllocationError::MalformedInputLine { line, reason };

    if fields.len() < 3 {
        return Err(malformed(format!(
            "expected `ROLE FIRSTNAME SURNAME [Y|N]`, got {} field(s)",
            fields.len()
        )));
    }
    if fields.len() > 4 {
        return Err(malformed(format!(
            "expected at most 4 fields, got {}",
            fields.len()
        )));
    }

    let role = fields[0]
        .parse::<Role>()
        .map_err(|err| malformed(err.to_string()))?;
    let wants_accommodation = match fields.get(3) {
        None => false,
        Some(flag) => parse_accommodation_flag(flag)
            .ok_or_else(|| malformed(format!("accommodation flag must be Y or N, got `{flag}`")))?,
    };

    Ok(PersonLine {
        role,
        name: format!("{} {}", fields[1], fields[2]),
        wants_accommodation,
    })
}

/// `Y`/`YES` and `N`/`NO`, case-insensitive.
pub fn parse_accommodation_flag(flag: &str) -> Option<bool> {
    match flag.trim().to_ascii_uppercase().as_str() {
        "Y" | "YES" => Some(true),
        "N" | "NO" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_accommodation_flag, parse_person_line};
    use crate::error::AllocationError;
    use crate::model::person::Role;

    #[test]
    fn parses_full_and_short_lines() {
        let full = parse_person_line(1, "FELLOW Sogeking Ussop Y").unwrap();
        assert_eq!(full.role, Role::Fellow);
        assert_eq!(full.name, "Sogeking Ussop");
        assert!(full.wants_accommodation);

        let short = parse_person_line(2, "  staff   Monkey Garp ").unwrap();
        assert_eq!(short.role, Role::Staff);
        assert!(!short.wants_accommodation);
    }

    #[test]
    fn rejects_missing_fields_unknown_role_and_bad_flag() {
        for (text, needle) in [
            ("FELLOW Brook", "field"),
            ("PIRATE Brook Soul N", "unknown role"),
            ("FELLOW Brook Soul MAYBE", "Y or N"),
            ("FELLOW Brook Soul King Y", "at most"),
        ] {
            match parse_person_line(7, text).unwrap_err() {
                AllocationError::MalformedInputLine { line, reason } => {
                    assert_eq!(line, 7);
                    assert!(reason.contains(needle), "{reason} should mention {needle}");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn accommodation_flags_are_case_insensitive() {
        assert_eq!(parse_accommodation_flag("y"), Some(true));
        assert_eq!(parse_accommodation_flag("No"), Some(false));
        assert_eq!(parse_accommodation_flag("x"), None);
    }
}
