//! Fixed 4+1 crank pattern: four regular teeth at 90 degree pitch plus
//! one sync tooth near TDC, hand-tuned instead of running gap discovery.
//!
//! Known wheels:
//! - Fiat Tipo/Tempra 1.6 (Digiplex 2): regular tooth 5 deg before TDC,
//!   sync tooth at TDC (positive offset, short-then-long gaps).
//! - Lancia Thema 16v (Digiplex 2s): sync tooth at TDC, regular tooth
//!   5 deg after TDC (negative offset, long-then-short gaps).

use num::traits::float::FloatCore;

use crate::error::ConfigError;
use crate::waveform::{
    CycleKind, SyncEdge, SyncWindow, WaveformBuilder, WaveformDefinition, WheelId,
};

const NUM_REGULAR_TEETH: u16 = 4;
const TOOTH_WIDTH: f32 = 3.0;
/// The sync tooth is inserted around the second regular tooth.
const SYNC_TOOTH_INDEX: u16 = 2;
/// Below this long/short ratio the two-gap test cannot discriminate
/// reliably and the single-gap fallback takes over.
const MIN_TWO_GAP_RATIO: f32 = 3.0;

/// Builds the 4+1 single-wheel waveform.
///
/// The sign of `sync_tooth_offset` decides whether the regular tooth
/// leads (positive) or trails (negative) the sync tooth, which in turn
/// decides between the two-gap and single-gap strategies.
pub fn four_plus_one(sync_tooth_offset: f32) -> Result<WaveformDefinition, ConfigError> {
    let mut builder = WaveformBuilder::new(CycleKind::FourStrokeCrank, SyncEdge::RiseOnly);
    let cycle = builder.cycle_duration();

    if cycle as u32 % NUM_REGULAR_TEETH as u32 != 0 {
        return Err(ConfigError::UnevenToothPitch {
            cycle: cycle as u16,
            teeth: NUM_REGULAR_TEETH,
        });
    }
    let regular_pitch = cycle / NUM_REGULAR_TEETH as f32;

    if sync_tooth_offset == 0.0 {
        return Err(ConfigError::ZeroSyncOffset);
    }
    if FloatCore::abs(sync_tooth_offset) >= regular_pitch / 2.0 {
        return Err(ConfigError::SyncOffsetTooLarge {
            offset: sync_tooth_offset as i16,
            limit: (regular_pitch / 2.0) as u16,
        });
    }

    let sync_tooth_angle = SYNC_TOOTH_INDEX as f32 * regular_pitch + sync_tooth_offset;

    // Regular teeth at full pitch, sync tooth slotted into its interval.
    for i in 1..=NUM_REGULAR_TEETH {
        let curr_tooth_angle = i as f32 * regular_pitch;
        if sync_tooth_angle < curr_tooth_angle
            && sync_tooth_angle > curr_tooth_angle - regular_pitch
        {
            builder.add_tooth_rise_fall(sync_tooth_angle, TOOTH_WIDTH, WheelId::Primary)?;
        }
        builder.add_tooth_rise_fall(curr_tooth_angle, TOOTH_WIDTH, WheelId::Primary)?;
    }

    // Compensation applied when sync falls back to a different physical
    // tooth; without it, downstream angle-to-TDC reporting would be off
    // by the distance between the intended and actual reference tooth.
    let mut tdc_position_offset = 0.0f32;

    if sync_tooth_offset > 0.0 {
        // Short gap before the sync tooth, long gap after it.
        let short_gap = sync_tooth_offset;
        let long_gap = regular_pitch - sync_tooth_offset;
        let mut gap_index = 0;

        if long_gap > MIN_TWO_GAP_RATIO * short_gap {
            // Two-gap detection: the long-after-short ratio first.
            builder.set_sync_window(SyncWindow::around_ratio(gap_index, long_gap / short_gap))?;
            gap_index += 1;
        } else {
            tdc_position_offset = sync_tooth_offset - regular_pitch;
        }

        // Short gap against the regular pitch confirms the position.
        builder.set_sync_window(SyncWindow::around_ratio(
            gap_index,
            short_gap / regular_pitch,
        ))?;
    } else {
        // Sync tooth first: short gap, then a full regular pitch.
        let short_gap = -sync_tooth_offset;
        let long_gap = regular_pitch;

        builder.set_single_gap_ratio(long_gap / short_gap)?;

        if long_gap + sync_tooth_offset > MIN_TWO_GAP_RATIO * short_gap {
            builder.set_sync_window(SyncWindow::around_ratio(
                1,
                short_gap / (long_gap + sync_tooth_offset),
            ))?;
        }
    }

    builder.set_tdc_offset(cycle - regular_pitch + sync_tooth_offset - tdc_position_offset);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "4+1 trigger: offset {} deg, sync tooth at {} deg",
        sync_tooth_offset,
        sync_tooth_angle
    );

    Ok(builder.finish())
}
