use std::fmt::Write as _;

use serde::Serialize;

use crate::models::PoiCategory;

pub const STOP_COLOR: &str = "#333333";
pub const STOP_EMPHASIZED_COLOR: &str = "#000000";
pub const FALLBACK_COLOR: &str = "#9ca3af";

const STOP_SIZE: f64 = 32.0;
const STOP_EMPHASIZED_SIZE: f64 = 40.0;
const POI_SIZE: f64 = 24.0;
const POI_EMPHASIZED_SIZE: f64 = 32.0;
const RESTING_LIGHTEN: u8 = 20;

// 24x24 viewBox paths
const FOOD_GLYPH: &str = "M12,2A3,3,0,0,0,9,5V8H7V5A3,3,0,0,0,1,5V8A3,3,0,0,0,4,11V22H8V11A3,3,0,0,0,11,8V5A3,3,0,0,0,12,2M16,2A3,3,0,0,0,13,5V8H15V5A1,1,0,0,1,17,5V8H19V5A3,3,0,0,0,16,2M22,19H14V22H22V19Z";
const HIKE_GLYPH: &str = "M13.5,5.5C14.59,5.5 15.5,4.58 15.5,3.5C15.5,2.38 14.59,1.5 13.5,1.5C12.39,1.5 11.5,2.38 11.5,3.5C11.5,4.58 12.39,5.5 13.5,5.5M9.8,8.9L7,23H9.1L10.9,15L13,17V23H15V15.5L12.9,13.5L13.5,10.5C14.8,12 16.8,13 19,13V11C17.1,11 15.5,10 14.7,8.6L13.7,7C13.3,6.4 12.7,6 12,6C11.7,6 11.5,6.1 11.2,6.1L6,8.3V13H8V9.6L9.8,8.9Z";
const SHOP_GLYPH: &str = "M19 6H17C17 3.2 14.8 1 12 1S7 3.2 7 6H5C3.9 6 3 6.9 3 8V20C3 21.1 3.9 22 5 22H19C20.1 22 21 21.1 21 20V8C21 6.9 20.1 6 19 6M12 3C13.7 3 15 4.3 15 6H9C9 4.3 10.3 3 12 3M19 20H5V8H19V20Z";
const CULTURAL_CENTER_GLYPH: &str =
    "M12,3L1,9L12,15L21,10.09V17H23V9M5,13.18V17.18L12,21L19,17.18V13.18L12,17L5,13.18Z";
const MUSEUM_GLYPH: &str = "M12,0L3,5V7H21V5M5,9V21H8V9M10,9V21H14V9M16,9V21H19V9";
const NATURE_SIGHT_GLYPH: &str = "M14,6L10.25,11L13.1,14.8L11.5,16C9.81,13.75 7,10 7,10L1,18H23L14,6Z";
const URBAN_SIGHT_GLYPH: &str = "M15,11V5L12,2L9,5V7H3V21H21V11H15M7,19H5V17H7V19M7,15H5V13H7V15M7,11H5V9H7V11M13,19H11V17H13V19M13,15H11V13H13V15M13,11H11V9H13V11M13,7H11V5H13V7M19,19H17V17H19V19M19,15H17V13H19V15Z";
const GENERIC_GLYPH: &str = "M12,2C8.13,2 5,5.13 5,9C5,14.25 12,22 12,22C12,22 19,14.25 19,9C19,5.13 15.87,2 12,2M12,11.5A2.5,2.5 0 0,1 9.5,9A2.5,2.5 0 0,1 12,6.5A2.5,2.5 0 0,1 14.5,9A2.5,2.5 0 0,1 12,11.5Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryStyle {
    pub color: &'static str,
    pub glyph: &'static str,
    pub label: &'static str,
}

pub const FALLBACK_STYLE: CategoryStyle = CategoryStyle {
    color: FALLBACK_COLOR,
    glyph: GENERIC_GLYPH,
    label: "Other",
};

pub fn style(category: &PoiCategory) -> CategoryStyle {
    let (color, glyph, label) = match category {
        PoiCategory::Food => ("#f59e0b", FOOD_GLYPH, "Food"),
        PoiCategory::Hike => ("#10b981", HIKE_GLYPH, "Hike"),
        PoiCategory::Shop => ("#3b82f6", SHOP_GLYPH, "Shop"),
        PoiCategory::CulturalCenter => ("#8b5cf6", CULTURAL_CENTER_GLYPH, "Cultural Center"),
        PoiCategory::Museum => ("#64748b", MUSEUM_GLYPH, "Museum"),
        PoiCategory::NatureSight => ("#22c55e", NATURE_SIGHT_GLYPH, "Nature Sight"),
        PoiCategory::UrbanSight => ("#71717a", URBAN_SIGHT_GLYPH, "Urban Sight"),
        PoiCategory::Other(_) => return FALLBACK_STYLE,
    };
    CategoryStyle {
        color,
        glyph,
        label,
    }
}

/// Convenience for raw, user supplied category strings.
pub fn style_for(raw: &str) -> CategoryStyle {
    style(&PoiCategory::parse(raw))
}

/// What a marker looks like at rest, before emphasis is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseIcon {
    Stop { number: u32 },
    Poi(PoiCategory),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Glyph {
    Number { value: u32 },
    Path { d: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerIcon {
    pub color: String,
    pub glyph: Glyph,
    pub size: f64,
}

pub fn marker_icon(base: &BaseIcon, emphasized: bool) -> MarkerIcon {
    match base {
        BaseIcon::Stop { number } => MarkerIcon {
            color: if emphasized {
                STOP_EMPHASIZED_COLOR
            } else {
                STOP_COLOR
            }
            .to_string(),
            glyph: Glyph::Number { value: *number },
            size: if emphasized {
                STOP_EMPHASIZED_SIZE
            } else {
                STOP_SIZE
            },
        },
        BaseIcon::Poi(category) => {
            let style = style(category);
            MarkerIcon {
                color: if emphasized {
                    style.color.to_string()
                } else {
                    lighten(style.color, RESTING_LIGHTEN)
                },
                glyph: Glyph::Path { d: style.glyph },
                size: if emphasized {
                    POI_EMPHASIZED_SIZE
                } else {
                    POI_SIZE
                },
            }
        }
    }
}

/// Color of the dashed connector drawn from a stop to one of its POIs.
pub fn connector_color(category: &PoiCategory) -> &'static str {
    style(category).color
}

/// Adds `amount` to each channel of a `#rrggbb` color, saturating at 255.
/// Anything that is not `#rrggbb` comes back unchanged.
pub fn lighten(color: &str, amount: u8) -> String {
    let hex = color.strip_prefix('#').unwrap_or(color);
    if hex.len() != 6 || !hex.is_ascii() {
        return color.to_string();
    }

    let mut out = String::with_capacity(7);
    out.push('#');
    for i in (0..6).step_by(2) {
        let Ok(channel) = u8::from_str_radix(&hex[i..i + 2], 16) else {
            return color.to_string();
        };
        let _ = write!(out, "{:02x}", channel.saturating_add(amount));
    }
    out
}

impl MarkerIcon {
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            size: self.size * factor,
            ..self.clone()
        }
    }

    /// White ringed disc filled with the marker color, glyph drawn in white.
    pub fn to_svg(&self) -> String {
        let size = self.size;
        let half = size / 2.0;
        let mut svg = format!(
            r#"<svg width="{size}" height="{size}" viewBox="0 0 {size} {size}" xmlns="http://www.w3.org/2000/svg"><defs><filter id="shadow" x="-20%" y="-20%" width="140%" height="140%"><feDropShadow dx="0" dy="1" stdDeviation="2" flood-opacity="0.3"/></filter></defs><circle cx="{half}" cy="{half}" r="{outer}" fill="white" filter="url(#shadow)"/><circle cx="{half}" cy="{half}" r="{inner}" fill="{color}"/>"#,
            outer = (half - 2.0).max(0.0),
            inner = (half - 4.0).max(0.0),
            color = self.color,
        );
        match &self.glyph {
            Glyph::Number { value } => {
                let _ = write!(
                    svg,
                    r#"<text x="{half}" y="{half}" font-family="Arial, sans-serif" font-size="{half}" font-weight="bold" fill="white" text-anchor="middle" dominant-baseline="central">{value}</text>"#
                );
            }
            Glyph::Path { d } => {
                let icon = size * 0.5;
                let offset = (size - icon) / 2.0;
                let _ = write!(
                    svg,
                    r#"<g transform="translate({offset}, {offset}) scale({scale})"><path d="{d}" fill="white"/></g>"#,
                    scale = icon / 24.0,
                );
            }
        }
        svg.push_str("</svg>");
        svg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_resolves_to_fallback() {
        assert_eq!(style_for("campsite"), FALLBACK_STYLE);
        assert_eq!(style_for("campsite").label, "Other");
        assert_eq!(style_for("").label, "Other");
    }

    #[test]
    fn every_known_category_has_its_own_style() {
        let styles: Vec<_> = PoiCategory::KNOWN.iter().map(style).collect();
        for (i, a) in styles.iter().enumerate() {
            assert_ne!(*a, FALLBACK_STYLE);
            for b in &styles[i + 1..] {
                assert_ne!(a.color, b.color);
                assert_ne!(a.label, b.label);
            }
        }
    }

    #[test]
    fn stop_icon_is_numbered_and_independent_of_palette() {
        let icon = marker_icon(&BaseIcon::Stop { number: 3 }, false);
        assert_eq!(icon.glyph, Glyph::Number { value: 3 });
        assert_eq!(icon.color, STOP_COLOR);
        assert!(
            PoiCategory::KNOWN
                .iter()
                .all(|category| style(category).color != STOP_COLOR)
        );

        let emphasized = marker_icon(&BaseIcon::Stop { number: 3 }, true);
        assert_eq!(emphasized.color, STOP_EMPHASIZED_COLOR);
        assert!(emphasized.size > icon.size);
    }

    #[test]
    fn resting_poi_icon_is_lightened() {
        let resting = marker_icon(&BaseIcon::Poi(PoiCategory::Food), false);
        let emphasized = marker_icon(&BaseIcon::Poi(PoiCategory::Food), true);
        assert_eq!(emphasized.color, "#f59e0b");
        assert_eq!(resting.color, "#ffb21f");
        assert_eq!(resting.size, POI_SIZE);
        assert_eq!(emphasized.size, POI_EMPHASIZED_SIZE);
    }

    #[test]
    fn lighten_saturates_and_tolerates_garbage() {
        assert_eq!(lighten("#f0f0f0", 20), "#ffffff");
        assert_eq!(lighten("#000000", 20), "#141414");
        assert_eq!(lighten("teal", 20), "teal");
        assert_eq!(lighten("#zzzzzz", 20), "#zzzzzz");
    }

    #[test]
    fn svg_carries_color_and_glyph() {
        let svg = marker_icon(&BaseIcon::Stop { number: 7 }, true).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(STOP_EMPHASIZED_COLOR));
        assert!(svg.contains(">7</text>"));

        let svg = marker_icon(&BaseIcon::Poi(PoiCategory::parse("campsite")), false).to_svg();
        assert!(svg.contains(GENERIC_GLYPH));
    }

    #[test]
    fn scaling_keeps_color_and_glyph() {
        let icon = marker_icon(&BaseIcon::Poi(PoiCategory::Hike), true);
        let pulsed = icon.scaled(1.3);
        assert_eq!(pulsed.color, icon.color);
        assert!((pulsed.size - icon.size * 1.3).abs() < 1e-9);
    }
}
