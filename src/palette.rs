//! The color table that turns iteration counts into something worth
//! looking at.  Built once, never mutated; everything that needs colors
//! shares it by reference.

/// One displayable color: red, green, blue.
pub type Rgb = (u8, u8, u8);

/// Number of entries in the palette cycle.
pub const PALETTE_SIZE: usize = 256;

/// An immutable 256-entry color lookup table.  Iteration-derived values
/// index into it modulo the table length, which is what makes deep
/// regions cycle back through the ramp instead of washing out to a
/// single color.
pub struct Palette {
    table: [Rgb; PALETTE_SIZE],
}

impl Palette {
    /// The house ramp.  Well, "nice" is a subjective thing: black at
    /// zero, climbing through red on a parabola over entries 1 to 32,
    /// red to yellow over 33 to 128, and yellow to white the rest of the
    /// way up.
    pub fn nice() -> Palette {
        let mut table = [(0u8, 0u8, 0u8); PALETTE_SIZE];
        for i in 1..=32 {
            table[i].0 = (2048.0 * i as f64).sqrt().min(255.0) as u8;
        }
        for i in 33..=128 {
            table[i].0 = 0xff;
            table[i].1 = (255.0 * i as f64 / 128.0).min(255.0) as u8;
        }
        for i in 129..256 {
            table[i].0 = 0xff;
            table[i].1 = 0xff;
            table[i].2 = (255.0 * i as f64 / 255.0) as u8;
        }
        Palette { table }
    }

    /// The color for an iteration-derived pixel value.  Values beyond
    /// the table length wrap around.
    pub fn color_for(&self, value: u32) -> Rgb {
        self.table[value as usize % PALETTE_SIZE]
    }
}
