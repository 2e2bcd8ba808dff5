//! Fixed 4+2 dual-wheel pattern: four equally spaced crank teeth on the
//! secondary wheel, two cam teeth 180 crank degrees apart on the primary
//! wheel, the first about 50 degrees after TDC.
//!
//! Sync here does not classify gap ratios on one wheel. The decoder
//! counts secondary teeth observed between consecutive primary teeth:
//! 2 between one cam pair, 6 between the other. Seeing one cam edge plus
//! a few crank edges is enough for position lock, instead of waiting out
//! a full 720 degree cycle.

use crate::error::ConfigError;
use crate::waveform::{
    CycleKind, SyncEdge, SyncWindow, WaveformBuilder, WaveformDefinition, WheelId,
};

/// First cam tooth comes approximately this many degrees after TDC #1;
/// adjust to the actual cam sensor position (plus/minus 15 degrees).
const CAM_OFFSET: f32 = 50.0;
const CAM_TOOTH_ANGLE: f32 = 180.0;
const CRANK_TOOTH_COUNT: u16 = 4;
const TOOTH_WIDTH: f32 = 5.0;

/// Declarative description of the cross-wheel fast-sync protocol: how
/// many secondary-wheel teeth the decoder must count between primary
/// teeth, and the acceptance windows for the resulting long/short
/// primary gap ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DualWheelCorrelation {
    /// Secondary teeth inside the short primary gap.
    pub short_count: u8,
    /// Secondary teeth inside the long primary gap.
    pub long_count: u8,
}

impl DualWheelCorrelation {
    pub const fn new() -> Self {
        DualWheelCorrelation {
            short_count: 2,
            long_count: 6,
        }
    }

    /// Short primary gap: nominal ratio 2/6, windowed wide enough for
    /// cranking transients but rejecting the regular 1.0 by a margin.
    pub const fn short_window(&self) -> SyncWindow {
        SyncWindow {
            gap_index: 0,
            min_ratio: 0.25,
            max_ratio: 0.75,
        }
    }

    /// Long primary gap: nominal ratio 6/2 = 3.0.
    pub const fn long_window(&self) -> SyncWindow {
        SyncWindow {
            gap_index: 1,
            min_ratio: 1.5,
            max_ratio: 3.5,
        }
    }

    pub fn nominal_short_ratio(&self) -> f32 {
        self.short_count as f32 / self.long_count as f32
    }

    pub fn nominal_long_ratio(&self) -> f32 {
        self.long_count as f32 / self.short_count as f32
    }
}

impl Default for DualWheelCorrelation {
    fn default() -> Self {
        DualWheelCorrelation::new()
    }
}

fn crank_pulse(builder: &mut WaveformBuilder, idx: u16, pitch: f32) -> Result<(), ConfigError> {
    builder.add_tooth_rise_fall(pitch * idx as f32, TOOTH_WIDTH, WheelId::Secondary)
}

fn cam_pulse(builder: &mut WaveformBuilder, idx: u16) -> Result<(), ConfigError> {
    builder.add_tooth_rise_fall(
        CAM_TOOTH_ANGLE * idx as f32 + CAM_OFFSET,
        TOOTH_WIDTH,
        WheelId::Primary,
    )
}

/// Builds the 4+2 dual-wheel waveform.
pub fn four_plus_two() -> Result<WaveformDefinition, ConfigError> {
    let mut builder = WaveformBuilder::new(CycleKind::FourStrokeCam, SyncEdge::RiseOnly);
    let cycle = builder.cycle_duration();

    // Crank pitch per revolution: (720 / 2) / 4 = 90 degrees.
    let crank_pitch = (cycle / 2.0) / CRANK_TOOTH_COUNT as f32;

    // Second cam tooth is the sync reference; TDC sits the rest of the
    // cycle away from it in rotation direction.
    let cam_angle_2 = CAM_OFFSET + CAM_TOOTH_ANGLE;
    builder.set_tdc_offset(cycle - cam_angle_2);

    // Both sensor channels must be wired for this waveform.
    builder.require_secondary_wheel();
    // Fast sync correlates crank teeth against cam teeth, so the decoder
    // must not restrict itself to the primary wheel.
    builder.set_use_only_primary_for_sync(false);
    // Engine may start before phase is identified (wasted spark until
    // full sequential is possible).
    builder.set_synchronization_needed(false);

    // Events in rotational order: cam tooth, two cranks, cam tooth, six
    // cranks closing the cycle.
    cam_pulse(&mut builder, 0)?;
    for i in 1..=2 {
        crank_pulse(&mut builder, i, crank_pitch)?;
    }
    cam_pulse(&mut builder, 1)?;
    for i in 3..=8 {
        crank_pulse(&mut builder, i, crank_pitch)?;
    }

    let correlation = DualWheelCorrelation::new();
    builder.set_sync_window(correlation.short_window())?;
    builder.set_sync_window(correlation.long_window())?;

    Ok(builder.finish())
}
