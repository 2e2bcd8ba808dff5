//! Synchronization gap selection and TDC anchoring.

use crate::error::ConfigError;
use crate::gap::GapTable;

/// How the decoder will recognize the sync point, in strict priority
/// order of reliability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncStrategy {
    /// Two back-to-back unusual gaps, possibly wrapping around the cycle
    /// boundary. `first` precedes `second` in rotational order.
    TwoConsecutive { first: usize, second: usize },
    /// Two unusual gaps with regular gaps between them, used as
    /// independent confirmation points.
    TwoSeparate { first: usize, second: usize },
    /// A single unusual gap, the one deviating furthest from 1.0.
    SingleGap { index: usize },
}

impl SyncStrategy {
    /// Picks a strategy from the gap table, or fails when the wheel has
    /// no distinguishing feature at all.
    pub fn select(gaps: &GapTable) -> Result<SyncStrategy, ConfigError> {
        let n = gaps.len();
        let unusual = gaps.unusual_indices();

        if unusual.is_empty() {
            return Err(ConfigError::NoSyncSignature);
        }

        // Two consecutive unusual gaps.
        for pair in unusual.windows(2) {
            if pair[1] == (pair[0] + 1) % n {
                return Ok(SyncStrategy::TwoConsecutive {
                    first: pair[0],
                    second: pair[1],
                });
            }
        }
        // Wraparound adjacency: last unusual gap followed by the first.
        if unusual.len() >= 2 {
            let last = unusual[unusual.len() - 1];
            if unusual[0] == (last + 1) % n {
                return Ok(SyncStrategy::TwoConsecutive {
                    first: last,
                    second: unusual[0],
                });
            }
            return Ok(SyncStrategy::TwoSeparate {
                first: unusual[0],
                second: unusual[1],
            });
        }

        // Exactly one unusual gap; among several non-adjacent ones this
        // is unreachable, so the deviation scan below also covers the
        // documented "most deviant" tie-break.
        let mut best = unusual[0];
        let mut best_deviation = 0.0f32;
        for &i in unusual.iter() {
            let deviation = gaps.get(i).deviation();
            if deviation > best_deviation {
                best_deviation = deviation;
                best = i;
            }
        }
        Ok(SyncStrategy::SingleGap { index: best })
    }

    /// The gap the decoder treats as "gap index 0"; the tooth ending
    /// this gap anchors TDC.
    pub fn anchor_gap(&self) -> usize {
        match *self {
            SyncStrategy::TwoConsecutive { second, .. } => second,
            SyncStrategy::TwoSeparate { second, .. } => second,
            SyncStrategy::SingleGap { index } => index,
        }
    }

    /// Rotational distance from the later window gap back to the
    /// earlier one, valid across the wraparound boundary. Never zero for
    /// two distinct gaps, so the two configured window indices cannot
    /// alias.
    pub fn confirmation_distance(&self, num_gaps: usize) -> Option<usize> {
        match *self {
            SyncStrategy::TwoConsecutive { first, second }
            | SyncStrategy::TwoSeparate { first, second } => {
                Some((second + num_gaps - first) % num_gaps)
            }
            SyncStrategy::SingleGap { .. } => None,
        }
    }
}

/// Crank-angle offset of TDC relative to the sync tooth, expressed in
/// the caller's original angle frame.
///
/// `sync_tooth_angle` is the normalized angle of the tooth ending the
/// anchor gap; subtracting `closing_offset` undoes the rotation applied
/// during normalization. The result is wrapped into `(0, cycle]`.
pub fn tdc_offset(cycle: f32, sync_tooth_angle: f32, closing_offset: f32) -> f32 {
    crate::angle::normalize_angle(cycle - (sync_tooth_angle - closing_offset), cycle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::NormalizedTeeth;
    use rstest::rstest;

    fn strategy(raw: &[f32], cycle: f32) -> Result<SyncStrategy, ConfigError> {
        let teeth = NormalizedTeeth::from_raw(raw, cycle).unwrap();
        SyncStrategy::select(&GapTable::analyze(teeth.angles(), cycle))
    }

    #[test]
    fn symmetric_wheel_is_fatal() {
        assert_eq!(
            Err(ConfigError::NoSyncSignature),
            strategy(&[90.0, 180.0, 270.0, 360.0], 360.0)
        );
    }

    #[test]
    fn tipo_selects_wraparound_consecutive_pair() {
        // Normalized: 85, 175, 265, 355, 360. Unusual gaps 0 and 4,
        // adjacent across the wrap.
        let s = strategy(&[0.0, 85.0, 175.0, 265.0, 355.0], 360.0).unwrap();
        assert_eq!(SyncStrategy::TwoConsecutive { first: 4, second: 0 }, s);
        assert_eq!(0, s.anchor_gap());
        assert_eq!(Some(1), s.confirmation_distance(5));
    }

    #[test]
    fn lone_void_yields_consecutive_pair() {
        // 10 deg pitch run, one 320 deg void: the void and the first
        // regular gap after it are both unusual and back to back.
        let s = strategy(&[15.0, 25.0, 35.0, 45.0, 55.0], 360.0).unwrap();
        assert_eq!(SyncStrategy::TwoConsecutive { first: 0, second: 1 }, s);
    }

    #[test]
    fn separated_unusual_gaps_pair_up() {
        // Gaps 90-30-30-90-60-60: the 30 deg gap after a 90 and the 90
        // after a 30 are unusual but two regular gaps apart.
        let s = strategy(&[90.0, 120.0, 150.0, 240.0, 300.0, 360.0], 360.0).unwrap();
        assert_eq!(SyncStrategy::TwoSeparate { first: 1, second: 3 }, s);
        assert_eq!(3, s.anchor_gap());
        assert_eq!(Some(2), s.confirmation_distance(6));
    }

    #[test]
    fn most_deviant_gap_wins() {
        // Gaps 135 - 90 - 60 - 40 - 35: ratios 3.857, 0.667, 0.667,
        // 0.667, 0.875 leave a lone unusual gap at index 0.
        let s = strategy(&[135.0, 225.0, 285.0, 325.0, 360.0], 360.0).unwrap();
        assert_eq!(SyncStrategy::SingleGap { index: 0 }, s);
    }

    #[rstest(raw, cycle,
        case(&[0.0, 85.0, 175.0, 265.0, 355.0][..], 360.0),
        case(&[15.0, 25.0, 35.0, 45.0, 55.0][..], 360.0),
        case(&[120.0, 240.0, 300.0][..], 360.0)
    )]
    fn window_indices_never_alias(raw: &[f32], cycle: f32) {
        let teeth = NormalizedTeeth::from_raw(raw, cycle).unwrap();
        let gaps = GapTable::analyze(teeth.angles(), cycle);
        if let Ok(s) = SyncStrategy::select(&gaps) {
            if let Some(dist) = s.confirmation_distance(gaps.len()) {
                assert_ne!(0, dist);
            }
        }
    }

    #[rstest(cycle, tooth, closing, expected,
        case(360.0, 85.0, 0.0, 275.0),
        case(360.0, 360.0, 0.0, 360.0),
        case(360.0, 60.0, 10.0, 310.0),
        case(720.0, 230.0, 0.0, 490.0)
    )]
    fn tdc_offset_in_original_frame(cycle: f32, tooth: f32, closing: f32, expected: f32) {
        assert!((tdc_offset(cycle, tooth, closing) - expected).abs() < 1e-3);
    }
}
