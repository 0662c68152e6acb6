//! Gamma table and color adjustment
//!
//! Each display keeps two snapshots of its extended panel parameters: the
//! *working* copy written by callers and panel plugins, and the *applied*
//! copy that is derived from it by [`apply_color_adjust`] and pushed to
//! hardware.
//!
//! ## Entry Layout
//!
//! Gamma entries are packed 32-bit values `0xAARRGGBB`. The default table is
//! the identity ramp, with the index repeated in every byte.
//!
//! ## Color Temperature
//!
//! | Bias   | Red              | Green            | Blue             |
//! |--------|------------------|------------------|------------------|
//! | `t>0`  | unscaled         | `g*(512-t)/512`  | `b*(256-t)/256`  |
//! | `t<0`  | `r*(256+t)/256`  | `g*(512+t)/512`  | unscaled         |
//! | `t==0` | unscaled         | unscaled         | unscaled         |
//!
//! Scaled entries drop the top byte. Inversion complements the whole entry
//! after scaling.

/// Number of entries in a gamma table
pub const GAMMA_TABLE_LEN: usize = 256;

/// Bias magnitude limit for color temperature
pub const COLOR_TEMPERATURE_MAX: i32 = 256;

/// Extended panel parameters shared between the engine and panel plugins
#[derive(Clone, Debug, PartialEq)]
pub struct PanelExtendInfo {
    /// Whether the gamma table is in use
    pub gamma_en: bool,
    /// Packed `0xAARRGGBB` gamma entries
    pub gamma_tbl: [u32; GAMMA_TABLE_LEN],
}

impl Default for PanelExtendInfo {
    fn default() -> Self {
        Self {
            gamma_en: false,
            gamma_tbl: identity_ramp(),
        }
    }
}

/// Identity gamma ramp
pub fn identity_ramp() -> [u32; GAMMA_TABLE_LEN] {
    core::array::from_fn(|i| {
        let i = i as u32;
        (i << 24) | (i << 16) | (i << 8) | i
    })
}

/// Derive the applied snapshot from the working one
pub fn apply_color_adjust(
    working: &PanelExtendInfo,
    temperature: i32,
    inverse: bool,
) -> PanelExtendInfo {
    let mut applied = working.clone();

    if temperature != 0 {
        for (out, &entry) in applied.gamma_tbl.iter_mut().zip(working.gamma_tbl.iter()) {
            *out = scale_entry(entry, temperature);
        }
    }
    if inverse {
        for entry in &mut applied.gamma_tbl {
            *entry = !*entry;
        }
    }
    if inverse || temperature != 0 {
        applied.gamma_en = true;
    }

    applied
}

fn scale_entry(entry: u32, temperature: i32) -> u32 {
    let t = temperature.clamp(-COLOR_TEMPERATURE_MAX, COLOR_TEMPERATURE_MAX);
    let mut r = ((entry >> 16) & 0xff) as i32;
    let mut g = ((entry >> 8) & 0xff) as i32;
    let mut b = (entry & 0xff) as i32;

    if t > 0 {
        g = g * (512 - t) / 512;
        b = b * (256 - t) / 256;
    } else {
        r = r * (256 + t) / 256;
        g = g * (512 + t) / 512;
    }

    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}
