mod wheel;

pub use wheel::{DEFAULT_STEP, HueWheel, SECTORS};
use smart_leds::RGB8;

pub type Rgb = RGB8;

/// Number of bytes a single LED occupies in the frame buffer
pub const BYTES_PER_LED: usize = 3;

/// Pack a color into the wire byte order of the strand (green, red, blue)
#[inline]
pub const fn to_grb(color: Rgb) -> [u8; BYTES_PER_LED] {
    [color.g, color.r, color.b]
}

/// Unpack a color from the wire byte order of the strand
#[inline]
pub const fn from_grb(bytes: [u8; BYTES_PER_LED]) -> Rgb {
    Rgb {
        r: bytes[1],
        g: bytes[0],
        b: bytes[2],
    }
}
