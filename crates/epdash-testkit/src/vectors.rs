//! Golden wire vectors.
//!
//! Hand-assembled encodings the codec must reproduce byte for byte. Any
//! implementation of this protocol (the server here, firmware decoders
//! elsewhere) must agree on exactly these bytes, so the vectors spell out
//! the whole container: headers, palette, row order, and padding.

use epdash_core::Raster;

/// One golden vector: a raster builder and the exact bytes it encodes to.
pub struct GoldenVector {
    pub name: &'static str,
    pub description: &'static str,
    pub build: fn() -> Raster,
    pub expected_hex: &'static str,
}

fn blank_2x2() -> Raster {
    Raster::blank(2, 2)
}

fn divider_3x1_top_down() -> Raster {
    Raster::divider(3, 1).with_orientation(epdash_core::Orientation::TopDown)
}

fn corner_dot_9x2() -> Raster {
    let mut raster = Raster::blank(9, 2);
    raster.set_pixel(0, 0, false);
    raster
}

/// All golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "blank_2x2_bottom_up",
            description: "Minimal all-white raster; bottom-up row order, \
                          1-byte rows padded to 4",
            build: blank_2x2,
            expected_hex: concat!(
                "424d46000000",         // magic, total size 70
                "00000000",             // reserved
                "3e000000",             // pixel offset 62
                "28000000",             // info header size 40
                "02000000", "02000000", // 2 x 2, positive height
                "0100", "0100",         // planes, 1 bpp
                "00000000",             // no compression
                "08000000",             // pixel bytes
                "130b0000", "130b0000", // resolution
                "02000000", "02000000", // palette counts
                "00000000", "ffffff00", // black, white
                "c0000000", "c0000000", // two white rows + padding
            ),
        },
        GoldenVector {
            name: "divider_3x1_top_down",
            description: "Canonical divider at 3x1; top-down order encoded \
                          as negative height",
            build: divider_3x1_top_down,
            expected_hex: concat!(
                "424d42000000",
                "00000000",
                "3e000000",
                "28000000",
                "03000000", "ffffffff", // 3 wide, height -1
                "0100", "0100",
                "00000000",
                "04000000",
                "130b0000", "130b0000",
                "02000000", "02000000",
                "00000000", "ffffff00",
                "00000000",             // one all-black row + padding
            ),
        },
        GoldenVector {
            name: "corner_dot_9x2_bottom_up",
            description: "9-wide raster (two bytes per row, 7 pad bits) \
                          with one black pixel at the top-left; bottom row \
                          travels first",
            build: corner_dot_9x2,
            expected_hex: concat!(
                "424d46000000",
                "00000000",
                "3e000000",
                "28000000",
                "09000000", "02000000",
                "0100", "0100",
                "00000000",
                "08000000",
                "130b0000", "130b0000",
                "02000000", "02000000",
                "00000000", "ffffff00",
                "ff800000",             // bottom row: all white
                "7f800000",             // top row: black dot at x=0
            ),
        },
    ]
}
