//! Generalized N-tooth trigger configuration.
//!
//! Accepts arbitrary tooth angles and discovers the synchronization
//! signature from the gap structure: normalize, derive gaps, classify
//! unusual ones, pick a strategy, anchor TDC.

use num::traits::float::FloatCore;

use crate::angle::NormalizedTeeth;
use crate::error::ConfigError;
use crate::gap::GapTable;
use crate::sync::{tdc_offset, SyncStrategy};
use crate::waveform::{
    CycleKind, SyncEdge, SyncWindow, WaveformBuilder, WaveformDefinition, WheelId,
};

/// Builds a single-wheel waveform from arbitrary tooth angles.
///
/// Angles may be unordered and outside the nominal cycle range; they are
/// canonicalized first. Fails when the geometry provides no sync
/// signature or violates the tooth-count bounds.
pub fn generalized(tooth_angles: &[f32], tooth_width: f32) -> Result<WaveformDefinition, ConfigError> {
    let mut builder = WaveformBuilder::new(CycleKind::FourStrokeCrank, SyncEdge::RiseOnly);
    let cycle = builder.cycle_duration();

    let teeth = NormalizedTeeth::from_raw(tooth_angles, cycle)?;

    #[cfg(feature = "defmt")]
    for (i, a) in teeth.angles().iter().enumerate() {
        defmt::trace!("tooth[{}]: {} deg", i, a);
    }

    for &angle in teeth.angles() {
        builder.add_tooth_rise_fall(angle, tooth_width, WheelId::Primary)?;
    }

    let gaps = GapTable::analyze(teeth.angles(), cycle);

    #[cfg(feature = "defmt")]
    for (i, g) in gaps.iter().enumerate() {
        defmt::trace!(
            "gap[{}]: {} deg ratio {} unusual {}",
            i,
            g.size,
            g.ratio_to_previous,
            g.is_unusual
        );
    }

    let strategy = SyncStrategy::select(&gaps)?;

    #[cfg(feature = "defmt")]
    defmt::debug!("sync strategy: {}", strategy);

    match strategy {
        SyncStrategy::TwoConsecutive { first, second }
        | SyncStrategy::TwoSeparate { first, second } => {
            // Gap index 0 is the later gap at evaluation time; the
            // earlier one confirms at its rotational distance.
            let distance = strategy
                .confirmation_distance(gaps.len())
                .unwrap_or(gaps.len());
            builder.set_sync_window(SyncWindow::around_ratio(
                0,
                gaps.get(second).ratio_to_previous,
            ))?;
            builder.set_sync_window(SyncWindow::around_ratio(
                distance,
                gaps.get(first).ratio_to_previous,
            ))?;
        }
        SyncStrategy::SingleGap { index } => {
            builder.set_single_gap_ratio(gaps.get(index).ratio_to_previous)?;
        }
    }

    let anchor_angle = teeth.angles()[strategy.anchor_gap()];
    builder.set_tdc_offset(tdc_offset(cycle, anchor_angle, teeth.closing_offset()));

    Ok(builder.finish())
}

/// 4+1 pattern routed through gap discovery instead of the closed form:
/// four regular teeth at 90 degree pitch plus one sync tooth displaced
/// by `sync_tooth_offset` from the second regular tooth.
///
/// A positive offset puts the regular tooth ahead of the sync tooth
/// (short-then-long gaps, Tipo/Tempra), a negative one behind it
/// (long-then-short, Thema).
pub fn four_plus_one_generalized(sync_tooth_offset: f32) -> Result<WaveformDefinition, ConfigError> {
    const REGULAR_TOOTH_ANGLE: f32 = 90.0;
    const TOOTH_WIDTH: f32 = 3.0;

    if sync_tooth_offset == 0.0 {
        return Err(ConfigError::ZeroSyncOffset);
    }
    if FloatCore::abs(sync_tooth_offset) >= REGULAR_TOOTH_ANGLE / 2.0 {
        return Err(ConfigError::SyncOffsetTooLarge {
            offset: sync_tooth_offset as i16,
            limit: (REGULAR_TOOTH_ANGLE / 2.0) as u16,
        });
    }

    let mut tooth_angles = [0.0f32; 5];
    if sync_tooth_offset > 0.0 {
        // Regular tooth leads the sync tooth by the offset.
        let lead = REGULAR_TOOTH_ANGLE - sync_tooth_offset;
        tooth_angles[1] = lead;
        tooth_angles[2] = REGULAR_TOOTH_ANGLE + lead;
        tooth_angles[3] = 2.0 * REGULAR_TOOTH_ANGLE + lead;
        tooth_angles[4] = 3.0 * REGULAR_TOOTH_ANGLE + lead;
    } else {
        // Regular tooth trails the sync tooth.
        let trail = -sync_tooth_offset;
        tooth_angles[1] = trail;
        tooth_angles[2] = REGULAR_TOOTH_ANGLE + trail;
        tooth_angles[3] = 2.0 * REGULAR_TOOTH_ANGLE + trail;
        tooth_angles[4] = 3.0 * REGULAR_TOOTH_ANGLE + trail;
    }

    generalized(&tooth_angles, TOOTH_WIDTH)
}
