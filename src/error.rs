//! Fatal configuration errors. None of these are retried: any detected
//! error discards the whole configuration attempt and the decoder must
//! never be started from it.

use core::fmt;

/// Broad class of a configuration error, for fault reporting that only
/// cares about the family, not the exact variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorClass {
    /// Tooth count or wheel layout incompatible with the pattern.
    Geometry,
    /// Sync-tooth offset zero or ambiguously large.
    Offset,
    /// Wheel geometry provides no way to determine absolute position.
    SyncSignature,
}

/// A fatal trigger configuration error.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// No tooth angles provided.
    NoTeeth,
    /// More teeth than the fixed maximum of [`crate::MAX_TEETH`].
    TooManyTeeth { count: usize },
    /// Cycle duration is not evenly divisible by the pattern's tooth count.
    UnevenToothPitch { cycle: u16, teeth: u16 },
    /// More edge events than the waveform can hold.
    TooManyEvents,
    /// Two teeth normalized onto the same angle (zero-size gap).
    CoincidentTeeth { index: u16 },
    /// Sync tooth offset must be non-zero.
    ZeroSyncOffset,
    /// Sync tooth offset exceeds half the regular tooth pitch.
    SyncOffsetTooLarge { offset: i16, limit: u16 },
    /// No gap deviates from the uniform band; all gaps look alike.
    NoSyncSignature,
    /// Two sync windows were configured for the same gap index.
    DuplicateSyncWindow { gap_index: u16 },
}

impl ConfigError {
    /// Stable numeric code, grouped by class: 0x10xx geometry,
    /// 0x20xx offset, 0x30xx sync signature.
    pub const fn code(&self) -> u16 {
        match *self {
            ConfigError::NoTeeth => 0x1001,
            ConfigError::TooManyTeeth { .. } => 0x1002,
            ConfigError::UnevenToothPitch { .. } => 0x1003,
            ConfigError::TooManyEvents => 0x1004,
            ConfigError::CoincidentTeeth { .. } => 0x1005,
            ConfigError::ZeroSyncOffset => 0x2001,
            ConfigError::SyncOffsetTooLarge { .. } => 0x2002,
            ConfigError::NoSyncSignature => 0x3001,
            ConfigError::DuplicateSyncWindow { .. } => 0x3002,
        }
    }

    pub const fn class(&self) -> ErrorClass {
        match *self {
            ConfigError::NoTeeth
            | ConfigError::TooManyTeeth { .. }
            | ConfigError::UnevenToothPitch { .. }
            | ConfigError::TooManyEvents
            | ConfigError::CoincidentTeeth { .. } => ErrorClass::Geometry,
            ConfigError::ZeroSyncOffset | ConfigError::SyncOffsetTooLarge { .. } => {
                ErrorClass::Offset
            }
            ConfigError::NoSyncSignature | ConfigError::DuplicateSyncWindow { .. } => {
                ErrorClass::SyncSignature
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ConfigError::NoTeeth => write!(f, "no tooth angles provided"),
            ConfigError::TooManyTeeth { count } => {
                write!(f, "too many teeth ({} > {})", count, crate::MAX_TEETH)
            }
            ConfigError::UnevenToothPitch { cycle, teeth } => write!(
                f,
                "cycle duration {} not evenly divisible by {} teeth",
                cycle, teeth
            ),
            ConfigError::TooManyEvents => write!(f, "waveform event buffer full"),
            ConfigError::CoincidentTeeth { index } => {
                write!(f, "coincident tooth angles at sorted index {}", index)
            }
            ConfigError::ZeroSyncOffset => write!(f, "sync tooth offset must be non-zero"),
            ConfigError::SyncOffsetTooLarge { offset, limit } => write!(
                f,
                "sync tooth offset {} exceeds +/-{} (half of tooth pitch)",
                offset, limit
            ),
            ConfigError::NoSyncSignature => {
                write!(f, "no sync gaps found, all gaps similar")
            }
            ConfigError::DuplicateSyncWindow { gap_index } => {
                write!(f, "sync window for gap index {} already configured", gap_index)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest(err, class,
        case(ConfigError::NoTeeth, ErrorClass::Geometry),
        case(ConfigError::TooManyTeeth { count: 61 }, ErrorClass::Geometry),
        case(ConfigError::CoincidentTeeth { index: 4 }, ErrorClass::Geometry),
        case(ConfigError::ZeroSyncOffset, ErrorClass::Offset),
        case(ConfigError::SyncOffsetTooLarge { offset: 50, limit: 45 }, ErrorClass::Offset),
        case(ConfigError::NoSyncSignature, ErrorClass::SyncSignature),
        case(ConfigError::DuplicateSyncWindow { gap_index: 1 }, ErrorClass::SyncSignature)
    )]
    fn error_class(err: ConfigError, class: ErrorClass) {
        assert_eq!(class, err.class());
    }

    #[test]
    fn codes_are_distinct() {
        let all = [
            ConfigError::NoTeeth,
            ConfigError::TooManyTeeth { count: 61 },
            ConfigError::UnevenToothPitch { cycle: 360, teeth: 7 },
            ConfigError::TooManyEvents,
            ConfigError::CoincidentTeeth { index: 4 },
            ConfigError::ZeroSyncOffset,
            ConfigError::SyncOffsetTooLarge { offset: 50, limit: 45 },
            ConfigError::NoSyncSignature,
            ConfigError::DuplicateSyncWindow { gap_index: 0 },
        ];
        for (i, a) in all.iter().enumerate() {
            for b in all.iter().skip(i + 1) {
                assert_ne!(a.code(), b.code());
            }
        }
    }
}
