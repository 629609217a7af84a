//! Built-in 5x7 pixel font.
//!
//! Zone rendering needs nothing more than digits, upper-case letters, and a
//! little punctuation, drawn deterministically: the same text at the same
//! position always produces the same pixels, which is what makes rendered
//! zones fingerprintable. Glyphs are 5 columns by 7 rows, one byte per row,
//! bit 4 = leftmost column.

use epdash_core::Raster;

/// Glyph cell width in pixels (before scaling).
pub const GLYPH_W: u32 = 5;

/// Glyph cell height in pixels (before scaling).
pub const GLYPH_H: u32 = 7;

/// Horizontal advance per character: cell plus one column of spacing.
pub const GLYPH_ADVANCE: u32 = GLYPH_W + 1;

type Glyph = [u8; 7];

const DIGITS: [Glyph; 10] = [
    [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E], // 0
    [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E], // 1
    [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F], // 2
    [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E], // 3
    [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02], // 4
    [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E], // 5
    [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E], // 6
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08], // 7
    [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E], // 8
    [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C], // 9
];

const LETTERS: [Glyph; 26] = [
    [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // A
    [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E], // B
    [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E], // C
    [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C], // D
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F], // E
    [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10], // F
    [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F], // G
    [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11], // H
    [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E], // I
    [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C], // J
    [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11], // K
    [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F], // L
    [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11], // M
    [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11], // N
    [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // O
    [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10], // P
    [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D], // Q
    [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11], // R
    [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E], // S
    [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04], // T
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E], // U
    [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04], // V
    [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A], // W
    [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11], // X
    [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04], // Y
    [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F], // Z
];

const SPACE: Glyph = [0x00; 7];
const COLON: Glyph = [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00];
const DASH: Glyph = [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00];
const PERIOD: Glyph = [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C];
const SLASH: Glyph = [0x01, 0x01, 0x02, 0x04, 0x08, 0x10, 0x10];
const PERCENT: Glyph = [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03];

/// Look up a glyph. Lower-case letters map to upper-case; anything not in
/// the face renders as a space.
fn glyph_for(c: char) -> &'static Glyph {
    match c {
        '0'..='9' => &DIGITS[(c as usize) - ('0' as usize)],
        'A'..='Z' => &LETTERS[(c as usize) - ('A' as usize)],
        'a'..='z' => &LETTERS[(c as usize) - ('a' as usize)],
        ':' => &COLON,
        '-' => &DASH,
        '.' => &PERIOD,
        '/' => &SLASH,
        '%' => &PERCENT,
        _ => &SPACE,
    }
}

/// Pixel width of `text` at an integral `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    let chars = text.chars().count() as u32;
    if chars == 0 {
        return 0;
    }
    (chars * GLYPH_ADVANCE - 1) * scale
}

/// Draw `text` in black ink with its top-left corner at (x, y), scaled by
/// an integral factor. Pixels past the raster edge clip silently.
pub fn draw_text(raster: &mut Raster, x: i32, y: i32, scale: u32, text: &str) {
    let scale = scale.max(1);
    let mut pen_x = x;
    for c in text.chars() {
        let glyph = glyph_for(c);
        for (row, bits) in glyph.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (0x10 >> col) != 0 {
                    raster.fill_rect(
                        pen_x + (col * scale) as i32,
                        y + (row as u32 * scale) as i32,
                        scale,
                        scale,
                        false,
                    );
                }
            }
        }
        pen_x += (GLYPH_ADVANCE * scale) as i32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_width() {
        assert_eq!(text_width("", 1), 0);
        assert_eq!(text_width("A", 1), 5);
        assert_eq!(text_width("AB", 1), 11);
        assert_eq!(text_width("AB", 2), 22);
    }

    #[test]
    fn test_draw_marks_ink() {
        let mut raster = Raster::blank(16, 8);
        draw_text(&mut raster, 0, 0, 1, "1");
        assert!(!raster.is_all_white());
        // Digit 1 stem: column 2, row 1 of the cell.
        assert_eq!(raster.pixel(2, 1), Some(false));
    }

    #[test]
    fn test_lowercase_maps_to_uppercase() {
        let mut upper = Raster::blank(16, 8);
        let mut lower = Raster::blank(16, 8);
        draw_text(&mut upper, 0, 0, 1, "TRAM");
        draw_text(&mut lower, 0, 0, 1, "tram");
        assert_eq!(upper, lower);
    }

    #[test]
    fn test_unknown_chars_render_blank() {
        let mut raster = Raster::blank(16, 8);
        draw_text(&mut raster, 0, 0, 1, "\u{1F600}");
        assert!(raster.is_all_white());
    }

    #[test]
    fn test_drawing_is_deterministic() {
        let mut a = Raster::blank(64, 16);
        let mut b = Raster::blank(64, 16);
        draw_text(&mut a, 3, 2, 2, "08:15");
        draw_text(&mut b, 3, 2, 2, "08:15");
        assert_eq!(a, b);
    }

    #[test]
    fn test_clipping_at_edges() {
        let mut raster = Raster::blank(8, 8);
        // Mostly off-canvas; must not panic and must clip.
        draw_text(&mut raster, -3, -3, 2, "88");
        draw_text(&mut raster, 6, 6, 2, "88");
        assert!(raster.pixel(7, 7).is_some());
    }
}
