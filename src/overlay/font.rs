//! Label font resolution
//!
//! Fonts are looked up by family in common system locations unless an
//! explicit font file is configured. A missing font only disables labels.

use ab_glyph::FontVec;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::OverlaySettings;

const SERIF_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSerif.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSerif-Regular.ttf",
    "/usr/share/fonts/dejavu/DejaVuSerif.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];

const SANS_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const MONO_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "C:\\Windows\\Fonts\\cour.ttf",
];

/// Candidate font files for a family name
pub fn family_candidates(family: &str) -> &'static [&'static str] {
    match family.trim().to_ascii_lowercase().as_str() {
        "sans" | "sans-serif" | "sans serif" => SANS_FONTS,
        "mono" | "monospace" => MONO_FONTS,
        _ => SERIF_FONTS,
    }
}

/// Load a font file
pub fn load_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    FontVec::try_from_vec(data).ok()
}

/// Resolve the label font for the configured family or path
pub fn resolve_font(settings: &OverlaySettings) -> Option<FontVec> {
    if let Some(path) = &settings.font_path {
        return match load_font(path) {
            Some(font) => {
                debug!("Loaded label font from {:?}", path);
                Some(font)
            }
            None => {
                warn!("Could not load font {:?}; labels will not be drawn", path);
                None
            }
        };
    }

    let found = family_candidates(&settings.font_family)
        .iter()
        .find_map(|path| load_font(Path::new(path)).map(|font| (path, font)));

    match found {
        Some((path, font)) => {
            debug!("Resolved '{}' label font to {}", settings.font_family, path);
            Some(font)
        }
        None => {
            warn!(
                "No '{}' font found; labels will not be drawn (set overlay.font_path)",
                settings.font_family
            );
            None
        }
    }
}

/// Font size in points to pixels at 96 DPI
pub fn points_to_pixels(points: f32) -> f32 {
    points * 96.0 / 72.0
}
