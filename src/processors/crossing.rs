//! Zero-crossing detection on line scans.
//!
//! A crossing is flagged at index `i` when `value[i - 1]` and `value[i]`
//! have strictly opposite signs. The first and last samples are never
//! flagged. Each flagged crossing is then resolved to the sample whose
//! magnitude equals the smallest magnitude around the sign change:
//!
//! 1. `m = min(|value[i - 1]|, |value[i]|, |value[i + 1]|)`
//! 2. the resolved index is the first index in ascending scan order,
//!    excluding index 0, with `|value| == m`
//!
//! The search in step 2 runs over the whole scan, so an equal magnitude
//! earlier in the scan wins over the one next to the sign change.

use std::fmt;

/// Why a flagged crossing produced no slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// The minimum magnitude was only found at index 0.
    NoMatchingIndex,
    /// The fit window around the resolved index leaves the scan.
    AtScanBoundary,
    /// All positions in the fit window coincide.
    DegenerateWindow,
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            DiscardReason::NoMatchingIndex => "no sample past index 0 matches the minimum magnitude",
            DiscardReason::AtScanBoundary => "resolved index lies at the scan boundary",
            DiscardReason::DegenerateWindow => "fit window has no spread in position",
        };
        f.write_str(text)
    }
}

/// A flagged sign change and the sample it resolved to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCrossing {
    /// Index `i` where `value[i - 1]` and `value[i]` differ in sign.
    pub flagged_index: usize,
    /// Index chosen by the nearest-magnitude rule.
    pub resolved_index: usize,
    /// Magnitude the resolution matched on.
    pub magnitude: f64,
}

/// True when `a` and `b` are strictly of opposite sign. Zero and NaN never
/// form a sign change.
#[inline]
pub fn is_sign_change(a: f64, b: f64) -> bool {
    (a > 0.0 && b < 0.0) || (a < 0.0 && b > 0.0)
}

/// Indices flagged as sign changes, skipping the first and last sample.
pub fn sign_changes(values: &[f64]) -> Vec<usize> {
    if values.len() < 3 {
        return Vec::new();
    }

    (1..values.len() - 1)
        .filter(|&i| is_sign_change(values[i - 1], values[i]))
        .collect()
}

/// Smallest magnitude among `values[flagged - 1..=flagged + 1]`.
fn local_min_magnitude(values: &[f64], flagged: usize) -> f64 {
    debug_assert!(flagged >= 1 && flagged + 1 < values.len());

    values[flagged - 1..=flagged + 1]
        .iter()
        .map(|v| v.abs())
        .fold(f64::INFINITY, f64::min)
}

/// Resolve the sign change flagged at `flagged` to a representative index.
///
/// `flagged` must satisfy `1 <= flagged < values.len() - 1`.
pub fn resolve(values: &[f64], flagged: usize) -> Result<ResolvedCrossing, DiscardReason> {
    let magnitude = local_min_magnitude(values, flagged);

    let resolved_index = values
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, v)| v.abs() == magnitude)
        .map(|(idx, _)| idx)
        .ok_or(DiscardReason::NoMatchingIndex)?;

    Ok(ResolvedCrossing {
        flagged_index: flagged,
        resolved_index,
        magnitude,
    })
}

/// Detect and resolve every crossing in `values`.
///
/// Each entry corresponds to one flagged sign change, in scan order.
/// Crossings are independent: a discard does not affect later ones.
pub fn detect(values: &[f64]) -> Vec<(usize, Result<ResolvedCrossing, DiscardReason>)> {
    sign_changes(values)
        .into_iter()
        .map(|flagged| (flagged, resolve(values, flagged)))
        .collect()
}

/// Resolve a profile crossing, preferring the positive sample.
///
/// The whole scan, index 0 included, is searched for `+m` first and only
/// then for `-m`. A resolution at index 0 is later discarded by the fitter.
pub fn resolve_signed(values: &[f64], flagged: usize) -> Result<ResolvedCrossing, DiscardReason> {
    let magnitude = local_min_magnitude(values, flagged);

    let resolved_index = values
        .iter()
        .position(|&v| v == magnitude)
        .or_else(|| values.iter().position(|&v| v == -magnitude))
        .ok_or(DiscardReason::NoMatchingIndex)?;

    Ok(ResolvedCrossing {
        flagged_index: flagged,
        resolved_index,
        magnitude,
    })
}

/// Like [`detect`], resolving with [`resolve_signed`].
pub fn detect_signed(values: &[f64]) -> Vec<(usize, Result<ResolvedCrossing, DiscardReason>)> {
    sign_changes(values)
        .into_iter()
        .map(|flagged| (flagged, resolve_signed(values, flagged)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_change_rules() {
        assert!(is_sign_change(-1.0, 0.5));
        assert!(is_sign_change(2.0, -0.1));
        assert!(!is_sign_change(0.0, 1.0));
        assert!(!is_sign_change(-1.0, 0.0));
        assert!(!is_sign_change(1.0, 2.0));
        assert!(!is_sign_change(f64::NAN, -1.0));
    }

    #[test]
    fn test_single_crossing_resolves_to_smallest_magnitude() {
        let values = [-3.0, -1.0, 0.5, 2.0, 4.0];

        assert_eq!(sign_changes(&values), vec![2]);

        let crossing = resolve(&values, 2).unwrap();
        assert_eq!(crossing.flagged_index, 2);
        assert_eq!(crossing.resolved_index, 2);
        assert_eq!(crossing.magnitude, 0.5);
    }

    #[test]
    fn test_alternating_signs_flag_every_interior_pair() {
        let values = [1.0, -2.0, 3.0, -4.0, 5.0, -6.0];
        // Pairs ending at indices 1..=4 change sign; index 5 is the last sample.
        assert_eq!(sign_changes(&values), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_last_pair_is_never_flagged() {
        let values = [1.0, 2.0, 3.0, -1.0];
        assert!(sign_changes(&values).is_empty());
    }

    #[test]
    fn test_zero_does_not_open_or_close_crossing() {
        let values = [-1.0, 0.0, 1.0, 2.0];
        assert!(sign_changes(&values).is_empty());
    }

    #[test]
    fn test_no_sign_change_yields_nothing() {
        assert!(detect(&[1.0, 2.0, 3.0, 4.0]).is_empty());
        assert!(detect(&[1.0, -1.0]).is_empty());
        assert!(detect(&[]).is_empty());
    }

    #[test]
    fn test_minimum_at_index_zero_is_discarded() {
        let values = [1.0, -2.0, 3.0, 4.0];
        assert_eq!(resolve(&values, 1), Err(DiscardReason::NoMatchingIndex));
    }

    #[test]
    fn test_tie_takes_first_index_in_scan_order() {
        let values = [-3.0, -1.0, 1.0, 2.0, 4.0];
        let crossing = resolve(&values, 2).unwrap();
        assert_eq!(crossing.resolved_index, 1);
    }

    #[test]
    fn test_resolution_searches_whole_scan() {
        // The second crossing's minimum magnitude 0.5 first appears at index 1.
        let values = [-4.0, 0.5, 3.0, 2.0, -0.5, -3.0];
        let detected = detect(&values);

        assert_eq!(detected.len(), 2);
        assert_eq!(detected[0].1.unwrap().resolved_index, 1);
        assert_eq!(detected[1].0, 4);
        assert_eq!(detected[1].1.unwrap().resolved_index, 1);
    }

    #[test]
    fn test_discard_does_not_affect_later_crossings() {
        let values = [1.0, -2.0, -3.0, -0.5, 0.25, 6.0];
        let detected = detect(&values);

        assert_eq!(detected.len(), 2);
        assert_eq!(detected[0], (1, Err(DiscardReason::NoMatchingIndex)));
        assert_eq!(detected[1].1.unwrap().resolved_index, 4);
    }

    #[test]
    fn test_signed_resolution_prefers_positive_sample() {
        let values = [-3.0, -0.5, 0.5, 2.0, 4.0];

        assert_eq!(resolve(&values, 2).unwrap().resolved_index, 1);
        assert_eq!(resolve_signed(&values, 2).unwrap().resolved_index, 2);
    }

    #[test]
    fn test_signed_resolution_falls_back_to_negative() {
        let values = [2.0, 1.0, -0.5, -3.0, -4.0];
        let detected = detect_signed(&values);

        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].0, 2);
        assert_eq!(detected[0].1.unwrap().resolved_index, 2);
    }

    #[test]
    fn test_signed_resolution_may_land_on_index_zero() {
        let values = [2.0, -2.0, -4.0, -6.0];
        assert_eq!(resolve_signed(&values, 1).unwrap().resolved_index, 0);
    }
}
