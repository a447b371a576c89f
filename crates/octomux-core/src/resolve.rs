// ── Identifier resolution ──
//
// Reconciles user-supplied port identifiers (number, numeric string, or
// device-assigned name) against the matrix's configured naming. Matching
// is case-insensitive and whitespace-trimmed only; no fuzzy matching.

use std::collections::BTreeMap;

use octomux_api::{PORT_MAX, PORT_MIN};

use crate::error::CoreError;
use crate::model::{PortId, PortKind};

/// Resolve an identifier to a canonical port number.
///
/// Resolution order: a number in 1-8 passes through; a string parsing as
/// an integer is range-checked (out-of-range values fail with
/// [`CoreError::InvalidPort`], never clamped and never treated as a
/// name); anything else is compared case-insensitively and trimmed
/// against every known name, first match winning. An unmatched name
/// fails with [`CoreError::NameNotFound`] carrying the full list of
/// known names.
pub fn resolve_port(
    id: &PortId,
    kind: PortKind,
    names: &BTreeMap<u8, String>,
) -> Result<u8, CoreError> {
    match id {
        PortId::Number(n) => check_range(i64::from(*n), kind),
        PortId::Name(raw) => {
            let trimmed = raw.trim();

            if let Ok(n) = trimmed.parse::<i64>() {
                return check_range(n, kind);
            }

            let wanted = trimmed.to_lowercase();
            for (port, name) in names {
                if name.trim().to_lowercase() == wanted {
                    return Ok(*port);
                }
            }

            Err(CoreError::NameNotFound {
                kind,
                value: raw.clone(),
                available: names.values().cloned().collect(),
            })
        }
    }
}

fn check_range(value: i64, kind: PortKind) -> Result<u8, CoreError> {
    match u8::try_from(value) {
        Ok(n) if (PORT_MIN..=PORT_MAX).contains(&n) => Ok(n),
        _ => Err(CoreError::InvalidPort { kind, value }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn names() -> BTreeMap<u8, String> {
        [
            (1u8, "Apple TV".to_owned()),
            (2, "PlayStation 5".to_owned()),
            (3, "Input C".to_owned()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn numeric_in_range_passes_through() {
        for port in PORT_MIN..=PORT_MAX {
            let resolved = resolve_port(&PortId::Number(port), PortKind::Input, &names()).unwrap();
            assert_eq!(resolved, port);
        }
    }

    #[test]
    fn numeric_out_of_range_is_rejected() {
        for bad in [0u8, 9, 200] {
            let err = resolve_port(&PortId::Number(bad), PortKind::Input, &names()).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidPort { value, .. } if value == i64::from(bad)),
                "got: {err:?}"
            );
        }
    }

    #[test]
    fn numeric_string_parses() {
        let resolved = resolve_port(&PortId::from(" 3 "), PortKind::Output, &names()).unwrap();
        assert_eq!(resolved, 3);
    }

    #[test]
    fn numeric_string_out_of_range_is_a_range_error_not_a_name() {
        let err = resolve_port(&PortId::from("10"), PortKind::Output, &names()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidPort { value: 10, .. }), "got: {err:?}");
    }

    #[test]
    fn name_matching_ignores_case_and_whitespace() {
        for spelling in [" input c ", "INPUT C", "Input C", "input c"] {
            let resolved = resolve_port(&PortId::from(spelling), PortKind::Input, &names()).unwrap();
            assert_eq!(resolved, 3, "spelling {spelling:?}");
        }
    }

    #[test]
    fn names_with_device_side_whitespace_still_match() {
        let mut names = names();
        names.insert(4, " Projector ".to_owned());
        let resolved = resolve_port(&PortId::from("projector"), PortKind::Output, &names).unwrap();
        assert_eq!(resolved, 4);
    }

    #[test]
    fn unknown_name_reports_available_names() {
        let err = resolve_port(&PortId::from("Betamax"), PortKind::Input, &names()).unwrap_err();
        match err {
            CoreError::NameNotFound {
                value, available, ..
            } => {
                assert_eq!(value, "Betamax");
                assert_eq!(available.len(), 3);
                assert!(available.contains(&"Apple TV".to_owned()));
            }
            other => panic!("expected NameNotFound, got: {other:?}"),
        }
    }

    #[test]
    fn first_match_wins_for_duplicate_names() {
        let mut names = names();
        names.insert(5, "Apple TV".to_owned());
        let resolved = resolve_port(&PortId::from("apple tv"), PortKind::Input, &names).unwrap();
        assert_eq!(resolved, 1);
    }
}
