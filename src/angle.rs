//! Canonicalization of raw tooth angles into one engine cycle.

use num::traits::float::FloatCore;

use crate::error::ConfigError;
use crate::MAX_TEETH;

/// Two teeth closer than this are the same physical tooth written two
/// ways (for example `0.0` and `360.0`).
pub const MIN_TOOTH_SEPARATION: f32 = 1e-3;

/// Magnitude (in cycles) above which the boundary-preserving loop is
/// preceded by a coarse division fold.
const COARSE_FOLD_LIMIT: f32 = 4.0;

/// Reduces an angle into `(0, cycle]` by repeated addition/subtraction.
///
/// Deliberately not a modulo so that an angle landing exactly on the cycle
/// boundary stays at `cycle` instead of collapsing to 0.
pub fn normalize_angle(mut angle: f32, cycle: f32) -> f32 {
    // Above ~2^23 degrees one ulp exceeds the cycle and the add/subtract
    // loop below would stop making progress. fmod is exact, so one fold
    // brings any finite magnitude into (-cycle, cycle) without touching
    // the boundary tie-break handled by the loop.
    if FloatCore::abs(angle) > COARSE_FOLD_LIMIT * cycle {
        angle %= cycle;
    }
    while angle <= 0.0 {
        angle += cycle;
    }
    while angle > cycle {
        angle -= cycle;
    }
    angle
}

/// A strictly increasing tooth sequence closing exactly on the cycle
/// boundary, together with the rotation applied to get there.
pub struct NormalizedTeeth {
    angles: [f32; MAX_TEETH],
    len: usize,
    closing_offset: f32,
}

impl NormalizedTeeth {
    /// Normalizes, sorts and closes a raw angle list.
    ///
    /// Every angle is reduced into `(0, cycle]`, the set is sorted
    /// ascending, then the whole sequence is shifted so the last tooth
    /// lands exactly at `cycle`. The shift is retained as
    /// [`closing_offset`](Self::closing_offset) so TDC can later be
    /// expressed in the caller's original angle frame.
    pub fn from_raw(raw: &[f32], cycle: f32) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::NoTeeth);
        }
        if raw.len() > MAX_TEETH {
            return Err(ConfigError::TooManyTeeth { count: raw.len() });
        }

        let mut angles = [0.0f32; MAX_TEETH];
        let len = raw.len();
        for (slot, &a) in angles.iter_mut().zip(raw.iter()) {
            *slot = normalize_angle(a, cycle);
        }
        angles[..len].sort_unstable_by(|a, b| {
            a.partial_cmp(b).unwrap_or(core::cmp::Ordering::Equal)
        });

        // Coincident teeth would produce a zero-size gap and poison
        // every ratio downstream; the wrap gap from the last tooth back
        // to the first is checked the same way.
        for (i, pair) in angles[..len].windows(2).enumerate() {
            if pair[1] - pair[0] < MIN_TOOTH_SEPARATION {
                return Err(ConfigError::CoincidentTeeth { index: (i + 1) as u16 });
            }
        }
        if len > 1 && cycle - angles[len - 1] + angles[0] < MIN_TOOTH_SEPARATION {
            return Err(ConfigError::CoincidentTeeth { index: 0 });
        }

        // Last event has to end on the full turn.
        let closing_offset = cycle - angles[len - 1];
        for a in angles[..len].iter_mut() {
            *a += closing_offset;
        }

        Ok(NormalizedTeeth {
            angles,
            len,
            closing_offset,
        })
    }

    pub fn angles(&self) -> &[f32] {
        &self.angles[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Rotation that was added to every tooth to close the cycle.
    pub fn closing_offset(&self) -> f32 {
        self.closing_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(raw, cycle, expected,
        case(0.0, 360.0, 360.0),
        case(360.0, 360.0, 360.0),
        case(365.0, 360.0, 5.0),
        case(-5.0, 360.0, 355.0),
        case(-725.0, 720.0, 715.0),
        case(90.0, 360.0, 90.0)
    )]
    fn angle_reduction(raw: f32, cycle: f32, expected: f32) {
        assert!((normalize_angle(raw, cycle) - expected).abs() < 1e-3);
    }

    #[test]
    fn strictly_increasing_and_closed() {
        let teeth =
            NormalizedTeeth::from_raw(&[265.0, 0.0, 175.0, 85.0, 355.0], 360.0).unwrap();
        let angles = teeth.angles();
        for pair in angles.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert!((angles[angles.len() - 1] - 360.0).abs() < 1e-3);
    }

    #[test]
    fn closing_offset_preserves_spacing() {
        // Last raw tooth at 350 means everything shifts up by 10.
        let teeth = NormalizedTeeth::from_raw(&[50.0, 150.0, 250.0, 350.0], 360.0).unwrap();
        assert!((teeth.closing_offset() - 10.0).abs() < 1e-3);
        let angles = teeth.angles();
        assert!((angles[0] - 60.0).abs() < 1e-3);
        assert!((angles[3] - 360.0).abs() < 1e-3);
    }

    #[test]
    fn huge_magnitudes_still_reduce() {
        for &raw in &[3.6e9f32, 3.0e9, -3.0e9, 1.0e9, f32::MAX, f32::MIN] {
            let a = normalize_angle(raw, 360.0);
            assert!(a > 0.0 && a <= 360.0, "{} reduced to {}", raw, a);
        }
        // Exact multiple of the cycle keeps the boundary tie-break.
        assert!((normalize_angle(3.6e9, 360.0) - 360.0).abs() < 1e-3);
    }

    #[rstest(raw,
        case(&[0.0, 360.0, 90.0, 180.0, 270.0][..]),
        case(&[90.0, 90.0, 180.0, 270.0][..]),
        case(&[0.0005, 90.0, 180.0, 360.0][..])
    )]
    fn rejects_coincident_teeth(raw: &[f32]) {
        match NormalizedTeeth::from_raw(raw, 360.0) {
            Err(ConfigError::CoincidentTeeth { .. }) => {}
            other => panic!("expected coincident-teeth rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn rejects_empty_and_oversized() {
        assert_eq!(
            Err(ConfigError::NoTeeth),
            NormalizedTeeth::from_raw(&[], 360.0).map(|_| ())
        );
        let too_many = [1.0f32; 61];
        assert_eq!(
            Err(ConfigError::TooManyTeeth { count: 61 }),
            NormalizedTeeth::from_raw(&too_many, 360.0).map(|_| ())
        );
    }
}
