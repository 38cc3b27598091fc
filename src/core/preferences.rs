//! Value conversions behind the preferences window.

/// Style names that add nothing to a font family for subtitle rendering
const IGNORED_STYLES: &[&str] = &[
    "Regular",
    "Normal",
    "Roman",
    "Book",
    "Standard",
    "Plain",
    "Text",
    "Semi",
    "Semi-Bold",
    "Demi",
    "Demi-Bold",
    "Upright",
    "Alt",
];

/// `#rrggbb` for a color picked with channels in `[0, 1]`; alpha is dropped.
pub fn rgba_to_hex(red: f32, green: f32, blue: f32) -> String {
    let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0) as u8;
    format!("#{:02x}{:02x}{:02x}", channel(red), channel(green), channel(blue))
}

/// Font name handed to the engine for a picked family and face.
///
/// Plain faces collapse to the family, and a style already spelled out in
/// the family name is not repeated ("Inter Bold" + "Bold" stays "Inter Bold").
pub fn font_face_name(family: &str, style: &str) -> String {
    let full = if style.is_empty() || IGNORED_STYLES.contains(&style) {
        family.to_string()
    } else if family.to_lowercase().contains(&style.to_lowercase()) {
        family.to_string()
    } else {
        format!("{} {}", family, style)
    };

    full.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Settings string for a list of language codes typed by the user.
pub fn normalize_languages(text: &str) -> String {
    text.split(',')
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}
