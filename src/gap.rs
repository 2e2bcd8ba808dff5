//! Inter-tooth gap structure and unusual-gap classification.
//!
//! Classification is ratio based rather than absolute-angle based: every
//! gap is compared against the one before it, so the result is invariant
//! under rotational speed (all gaps scale together with period).

use heapless::Vec;

use crate::MAX_TEETH;

/// Ratio below which a gap counts as unusually short relative to the
/// previous gap.
pub const MIN_GAP_RATIO: f32 = 0.5;
/// Ratio above which a gap counts as unusually long relative to the
/// previous gap.
pub const MAX_GAP_RATIO: f32 = 2.0;

/// One inter-tooth gap, derived from the sorted tooth sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GapRecord {
    /// Angular size in degrees, always positive.
    pub size: f32,
    /// `size / size_of_previous_gap`, wrapping at index 0.
    pub ratio_to_previous: f32,
    /// Outside the `[MIN_GAP_RATIO, MAX_GAP_RATIO]` uniform band.
    pub is_unusual: bool,
}

impl GapRecord {
    /// Deviation from a regular gap: `max(ratio, 1/ratio)`, so 1.0 means
    /// perfectly regular and larger is more distinctive.
    pub fn deviation(&self) -> f32 {
        self.ratio_to_previous.max(self.ratio_to_previous.recip())
    }
}

/// Gap table for one wheel: N gap records for N teeth, where `gap[0]` is
/// the wraparound gap from the last tooth back to the first.
pub struct GapTable {
    gaps: Vec<GapRecord, MAX_TEETH>,
}

impl GapTable {
    /// Derives the gap table from a normalized, strictly increasing tooth
    /// sequence spanning `(0, cycle]`.
    pub fn analyze(angles: &[f32], cycle: f32) -> Self {
        debug_assert!(angles.len() <= MAX_TEETH);
        let n = angles.len();
        let mut gaps: Vec<GapRecord, MAX_TEETH> = Vec::new();

        for i in 0..n {
            let size = if i == 0 {
                cycle - angles[n - 1] + angles[0]
            } else {
                angles[i] - angles[i - 1]
            };
            // Ratios are filled in a second pass once all sizes exist.
            let _ = gaps.push(GapRecord {
                size,
                ratio_to_previous: 0.0,
                is_unusual: false,
            });
        }

        for i in 0..n {
            let prev = if i == 0 { n - 1 } else { i - 1 };
            let ratio = gaps[i].size / gaps[prev].size;
            gaps[i].ratio_to_previous = ratio;
            gaps[i].is_unusual = ratio <= MIN_GAP_RATIO || ratio >= MAX_GAP_RATIO;
        }

        GapTable { gaps }
    }

    pub fn len(&self) -> usize {
        self.gaps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn get(&self, index: usize) -> &GapRecord {
        &self.gaps[index]
    }

    pub fn iter(&self) -> core::slice::Iter<'_, GapRecord> {
        self.gaps.iter()
    }

    /// Indices of all gaps outside the uniform band, in rotational order.
    pub fn unusual_indices(&self) -> Vec<usize, MAX_TEETH> {
        let mut out: Vec<usize, MAX_TEETH> = Vec::new();
        for (i, g) in self.gaps.iter().enumerate() {
            if g.is_unusual {
                let _ = out.push(i);
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::angle::NormalizedTeeth;
    use rstest::rstest;

    fn table(raw: &[f32], cycle: f32) -> GapTable {
        let teeth = NormalizedTeeth::from_raw(raw, cycle).unwrap();
        GapTable::analyze(teeth.angles(), cycle)
    }

    #[test]
    fn gap_sizes_close_the_cycle() {
        let gaps = table(&[0.0, 85.0, 175.0, 265.0, 355.0], 360.0);
        let sum: f32 = gaps.iter().map(|g| g.size).sum();
        assert!((sum - 360.0).abs() < 1e-3);
        for g in gaps.iter() {
            assert!(g.size > 0.0);
        }
    }

    #[test]
    fn tipo_pattern_flags_wrap_and_short_gap() {
        // Normalized Tipo teeth: 85, 175, 265, 355, 360.
        let gaps = table(&[0.0, 85.0, 175.0, 265.0, 355.0], 360.0);
        assert_eq!(5, gaps.len());
        // gap[0] wraps: 360 - 360 + 85 = 85, previous is the 5 deg gap.
        assert!((gaps.get(0).size - 85.0).abs() < 1e-3);
        assert!((gaps.get(0).ratio_to_previous - 17.0).abs() < 1e-2);
        assert!(gaps.get(0).is_unusual);
        assert!((gaps.get(4).size - 5.0).abs() < 1e-3);
        assert!(gaps.get(4).is_unusual);
        assert_eq!(2, gaps.unusual_indices().len());
    }

    #[test]
    #[should_panic]
    fn oversized_angle_list_is_refused() {
        let mut angles = [0.0f32; 61];
        for (i, a) in angles.iter_mut().enumerate() {
            *a = (i + 1) as f32;
        }
        GapTable::analyze(&angles, 360.0);
    }

    #[test]
    fn symmetric_wheel_has_no_unusual_gap() {
        let gaps = table(&[90.0, 180.0, 270.0, 360.0], 360.0);
        assert!(gaps.unusual_indices().is_empty());
        for g in gaps.iter() {
            assert!((g.ratio_to_previous - 1.0).abs() < 1e-3);
        }
    }

    #[rstest(ratio, unusual,
        case(0.4, true),
        case(0.5, true),
        case(0.6, false),
        case(1.0, false),
        case(1.9, false),
        case(2.0, true),
        case(2.5, true)
    )]
    fn uniform_band_limits(ratio: f32, unusual: bool) {
        // Two teeth give two gaps with reciprocal ratios; shape the first
        // so that gap[1]/gap[0] equals the requested ratio.
        let first = 360.0 / (1.0 + ratio);
        let gaps = table(&[first, 360.0], 360.0);
        assert_eq!(unusual, gaps.get(1).is_unusual);
    }

    #[test]
    fn deviation_is_symmetric() {
        let gaps = table(&[0.0, 85.0, 175.0, 265.0, 355.0], 360.0);
        // Long gap ratio 17, short gap ratio 1/18; both deviate well past 1.
        assert!((gaps.get(0).deviation() - 17.0).abs() < 1e-2);
        assert!(gaps.get(4).deviation() > 10.0);
    }
}
