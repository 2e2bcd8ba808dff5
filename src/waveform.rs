//! Waveform value types and the builder that assembles them.
//!
//! A [`WaveformDefinition`] is constructed exactly once by a builder
//! function, then handed to the real-time decoder by value. Nothing here
//! is mutated after [`WaveformBuilder::finish`], which makes the
//! "configure once, never mutate after" rule structural rather than
//! conventional.

use heapless::Vec;

use crate::error::ConfigError;
use crate::MAX_EVENTS;

/// Lower bound factor of a gap-ratio acceptance window.
pub const RATIO_WINDOW_LOW: f32 = 0.66;
/// Upper bound factor of a gap-ratio acceptance window.
pub const RATIO_WINDOW_HIGH: f32 = 1.5;

/// Edge polarity of one electrical transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EdgeKind {
    Rise,
    Fall,
}

impl core::ops::Not for EdgeKind {
    type Output = EdgeKind;

    fn not(self) -> Self::Output {
        if self == EdgeKind::Rise {
            EdgeKind::Fall
        } else {
            EdgeKind::Rise
        }
    }
}

/// Which physical wheel an event belongs to. Primary is the cam wheel in
/// dual-wheel configurations, or the only wheel in single-wheel ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WheelId {
    Primary,
    Secondary,
}

/// Reference cycle the tooth angles are expressed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleKind {
    /// Crank-only sensor: one crank revolution, 360 degrees.
    FourStrokeCrank,
    /// Cam-keyed sensor set: full four-stroke cycle, 720 crank degrees.
    FourStrokeCam,
}

impl CycleKind {
    pub const fn duration(&self) -> f32 {
        match *self {
            CycleKind::FourStrokeCrank => 360.0,
            CycleKind::FourStrokeCam => 720.0,
        }
    }
}

/// Which edges the decoder synchronizes on. VR sensors give one clean
/// rising edge per tooth, so all current patterns use `RiseOnly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncEdge {
    RiseOnly,
    Both,
}

/// One electrical transition on the simulated or physical wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ToothEvent {
    /// Degrees from the cycle origin, in `(0, cycle]`.
    pub angle: f32,
    pub edge: EdgeKind,
    pub wheel: WheelId,
    /// Angular width of the tooth that produced this edge.
    pub width: f32,
}

/// Acceptance band the decoder checks a live-measured gap ratio against.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncWindow {
    /// Gap index relative to the current gap at evaluation time.
    pub gap_index: usize,
    pub min_ratio: f32,
    pub max_ratio: f32,
}

impl SyncWindow {
    /// Window around a nominal ratio with the standard slack, chosen to
    /// tolerate cranking-speed transients and sensor jitter without
    /// aliasing against the regular-gap ratio of 1.0.
    pub fn around_ratio(gap_index: usize, ratio: f32) -> Self {
        SyncWindow {
            gap_index,
            min_ratio: ratio * RATIO_WINDOW_LOW,
            max_ratio: ratio * RATIO_WINDOW_HIGH,
        }
    }

    pub fn admits(&self, ratio: f32) -> bool {
        ratio >= self.min_ratio && ratio <= self.max_ratio
    }
}

/// Static description of one trigger-wheel configuration, ready for the
/// real-time decoder. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveformDefinition {
    cycle_kind: CycleKind,
    sync_edge: SyncEdge,
    tooth_events: Vec<ToothEvent, MAX_EVENTS>,
    sync_windows: Vec<SyncWindow, 2>,
    tdc_offset: f32,
    requires_secondary_wheel: bool,
    use_only_primary_for_sync: bool,
    synchronization_needed: bool,
}

impl WaveformDefinition {
    pub fn cycle_kind(&self) -> CycleKind {
        self.cycle_kind
    }

    pub fn cycle_duration(&self) -> f32 {
        self.cycle_kind.duration()
    }

    pub fn sync_edge(&self) -> SyncEdge {
        self.sync_edge
    }

    pub fn tooth_events(&self) -> &[ToothEvent] {
        &self.tooth_events
    }

    pub fn sync_windows(&self) -> &[SyncWindow] {
        &self.sync_windows
    }

    /// Crank angle of TDC relative to the sync point, in the caller's
    /// original angle frame.
    pub fn tdc_offset(&self) -> f32 {
        self.tdc_offset
    }

    /// Both sensor channels must be present and wired before the decoder
    /// may trust this waveform.
    pub fn requires_secondary_wheel(&self) -> bool {
        self.requires_secondary_wheel
    }

    pub fn use_only_primary_for_sync(&self) -> bool {
        self.use_only_primary_for_sync
    }

    pub fn synchronization_needed(&self) -> bool {
        self.synchronization_needed
    }
}

/// Accumulates a [`WaveformDefinition`]. Consumed by `finish`, so a
/// definition can never be touched again through its builder.
pub struct WaveformBuilder {
    cycle_kind: CycleKind,
    sync_edge: SyncEdge,
    tooth_events: Vec<ToothEvent, MAX_EVENTS>,
    sync_windows: Vec<SyncWindow, 2>,
    tdc_offset: f32,
    requires_secondary_wheel: bool,
    use_only_primary_for_sync: bool,
    synchronization_needed: bool,
}

impl WaveformBuilder {
    pub fn new(cycle_kind: CycleKind, sync_edge: SyncEdge) -> Self {
        WaveformBuilder {
            cycle_kind,
            sync_edge,
            tooth_events: Vec::new(),
            sync_windows: Vec::new(),
            tdc_offset: 0.0,
            requires_secondary_wheel: false,
            use_only_primary_for_sync: true,
            synchronization_needed: true,
        }
    }

    pub fn cycle_duration(&self) -> f32 {
        self.cycle_kind.duration()
    }

    pub fn add_event(
        &mut self,
        angle: f32,
        edge: EdgeKind,
        wheel: WheelId,
        width: f32,
    ) -> Result<(), ConfigError> {
        self.tooth_events
            .push(ToothEvent {
                angle,
                edge,
                wheel,
                width,
            })
            .map_err(|_| ConfigError::TooManyEvents)
    }

    /// One full tooth: rising edge at `angle - width`, falling edge at
    /// `angle`. The tooth is defined as ending at `angle`.
    pub fn add_tooth_rise_fall(
        &mut self,
        angle: f32,
        width: f32,
        wheel: WheelId,
    ) -> Result<(), ConfigError> {
        self.add_event(angle - width, EdgeKind::Rise, wheel, width)?;
        self.add_event(angle, EdgeKind::Fall, wheel, width)
    }

    /// Registers an acceptance window for one gap index. A second window
    /// on the same index is rejected: the decoder evaluates each index
    /// against exactly one band.
    pub fn set_sync_window(&mut self, window: SyncWindow) -> Result<(), ConfigError> {
        if self
            .sync_windows
            .iter()
            .any(|w| w.gap_index == window.gap_index)
        {
            return Err(ConfigError::DuplicateSyncWindow {
                gap_index: window.gap_index as u16,
            });
        }
        self.sync_windows
            .push(window)
            .map_err(|_| ConfigError::DuplicateSyncWindow {
                gap_index: window.gap_index as u16,
            })
    }

    /// Single-gap synchronization: one window around the given nominal
    /// ratio at the current gap.
    pub fn set_single_gap_ratio(&mut self, ratio: f32) -> Result<(), ConfigError> {
        self.set_sync_window(SyncWindow::around_ratio(0, ratio))
    }

    pub fn set_tdc_offset(&mut self, tdc_offset: f32) {
        self.tdc_offset = tdc_offset;
    }

    pub fn require_secondary_wheel(&mut self) {
        self.requires_secondary_wheel = true;
    }

    pub fn set_use_only_primary_for_sync(&mut self, value: bool) {
        self.use_only_primary_for_sync = value;
    }

    pub fn set_synchronization_needed(&mut self, value: bool) {
        self.synchronization_needed = value;
    }

    pub fn finish(self) -> WaveformDefinition {
        WaveformDefinition {
            cycle_kind: self.cycle_kind,
            sync_edge: self.sync_edge,
            tooth_events: self.tooth_events,
            sync_windows: self.sync_windows,
            tdc_offset: self.tdc_offset,
            requires_secondary_wheel: self.requires_secondary_wheel,
            use_only_primary_for_sync: self.use_only_primary_for_sync,
            synchronization_needed: self.synchronization_needed,
        }
    }
}
