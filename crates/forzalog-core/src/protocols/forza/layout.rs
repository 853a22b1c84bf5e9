/// Sled: 58 four-byte scalars.
pub const SLED_FIELD_COUNT: usize = 58;
pub const SLED_LEN: usize = 232;

/// Car dash extension: 17 x f32, u16, 6 x u8, 3 x i8.
pub const DASH_EXTENSION_FIELD_COUNT: usize = 27;
pub const DASH_EXTENSION_LEN: usize = 79;

pub const DASH_FIELD_COUNT: usize = SLED_FIELD_COUNT + DASH_EXTENSION_FIELD_COUNT;
pub const DASH_LEN: usize = SLED_LEN + DASH_EXTENSION_LEN;

/// Forza Horizon 4 sends the dash struct with 12 extra bytes after the sled
/// block. Only these two ranges are kept.
pub const FH4_LEN: usize = 323;
pub const FH4_SLED_RANGE: std::ops::Range<usize> = 0..232;
pub const FH4_DASH_RANGE: std::ops::Range<usize> = 244..323;

pub const IS_RACE_ON_RANGE: std::ops::Range<usize> = 0..4;
pub const TIMESTAMP_RANGE: std::ops::Range<usize> = 4..8;
pub const DASH_EXTENSION_OFFSET: usize = SLED_LEN;

/// Largest datagram the listener reads in one call.
pub const MAX_DATAGRAM_LEN: usize = 1024;
