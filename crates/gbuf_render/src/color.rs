//! Color token codec
//!
//! Tokens `0..=14` select the fixed palette, `15..=18` are reserved and
//! `> 18` carry a packed literal: `r` at bit 21, `g` at bit 13, `b` at bit 5,
//! each 8 bits wide. Anything else decodes to black.

use gbuf_paint::Color;

/// The named palette, in token order
pub const PALETTE: [Color; 15] = [
    Color::rgb(0x00, 0x00, 0x00), // black
    Color::rgb(0x00, 0x00, 0xFF), // blue
    Color::rgb(0x00, 0x80, 0x00), // green
    Color::rgb(0x00, 0xFF, 0xFF), // cyan
    Color::rgb(0xFF, 0x00, 0x00), // red
    Color::rgb(0xFF, 0x00, 0xFF), // magenta
    Color::rgb(0xA5, 0x2A, 0x2A), // brown
    Color::rgb(0xFF, 0xFF, 0xFF), // white
    Color::rgb(0x80, 0x80, 0x80), // gray
    Color::rgb(0xAD, 0xD8, 0xE6), // light blue
    Color::rgb(0x00, 0xFF, 0x00), // bright green
    Color::rgb(0xE0, 0xFF, 0xFF), // light cyan
    Color::rgb(0xFF, 0x14, 0x93), // deep pink
    Color::rgb(0x93, 0x70, 0xDB), // medium purple
    Color::rgb(0xFF, 0xFF, 0x00), // yellow
];

const R_SHIFT: u32 = 21;
const G_SHIFT: u32 = 13;
const B_SHIFT: u32 = 5;
const LAST_RESERVED: i64 = 18;

/// Decode an integer color token
pub fn decode_color(token: i64) -> Color {
    if let Some(color) = usize::try_from(token).ok().and_then(|i| PALETTE.get(i)) {
        return *color;
    }
    if token > LAST_RESERVED {
        return Color::rgb(
            ((token >> R_SHIFT) & 0xFF) as u8,
            ((token >> G_SHIFT) & 0xFF) as u8,
            ((token >> B_SHIFT) & 0xFF) as u8,
        );
    }
    Color::BLACK
}

/// Decode a token as it arrives on the wire (a JSON number).
///
/// Non-finite values and fractional palette indices are black; packed
/// literals are truncated toward zero first.
pub fn color_from_token(token: f64) -> Color {
    if !token.is_finite() {
        return Color::BLACK;
    }
    let whole = token.trunc();
    if whole <= LAST_RESERVED as f64 && whole != token {
        return Color::BLACK;
    }
    decode_color(whole as i64)
}

/// Pack an RGB triple into a literal token
pub fn pack_rgb(r: u8, g: u8, b: u8) -> i64 {
    (i64::from(r) << R_SHIFT) | (i64::from(g) << G_SHIFT) | (i64::from(b) << B_SHIFT)
}
