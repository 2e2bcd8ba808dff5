#![cfg_attr(not(test), no_std)]
//! Trigger-wheel synchronization configuration.
//!
//! Computes, once at ECU startup, how a crank/cam toothed wheel's edges
//! map onto crank angle and how the decoder can recognize the wheel's
//! sync point among otherwise-ambiguous repeating teeth. The real-time
//! edge capture and gap evaluation live in the decoder; this crate only
//! produces the immutable [`WaveformDefinition`] it consumes.
//!
//! Entry points, one per wheel-pattern variant:
//! - [`generalized()`]: arbitrary tooth angles, sync gaps discovered
//!   automatically.
//! - [`four_plus_one()`]: fixed 4 regular + 1 sync tooth crank wheel
//!   (Fiat Tipo/Tempra, Lancia Thema).
//! - [`four_plus_two()`]: fixed dual-wheel 4 crank + 2 cam pattern with
//!   cross-wheel fast sync.
//!
//! Everything is bounded by [`MAX_TEETH`] and stack allocated, suitable
//! for a constrained real-time target.

pub mod angle;
pub mod error;
pub mod four_plus_one;
pub mod four_plus_two;
pub mod gap;
pub mod generalized;
pub mod sync;
pub mod waveform;

/// Hard upper bound on teeth per wheel.
pub const MAX_TEETH: usize = 60;
/// Edge events per definition: rise and fall for up to [`MAX_TEETH`]
/// primary teeth plus the densest supported secondary pattern.
pub const MAX_EVENTS: usize = 2 * MAX_TEETH + 16;

pub use error::{ConfigError, ErrorClass};
pub use four_plus_one::four_plus_one;
pub use four_plus_two::{four_plus_two, DualWheelCorrelation};
pub use generalized::{four_plus_one_generalized, generalized};
pub use waveform::{
    CycleKind, EdgeKind, SyncEdge, SyncWindow, ToothEvent, WaveformBuilder, WaveformDefinition,
    WheelId,
};
