//! Pixel placement for text fields and overlays

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::display::font::Font;
use crate::models::animation::TextField;

/// Where a field sits on one screen axis.
///
/// Mirrors the classic position-code convention: "center", a non-negative
/// pixel offset from the near (left/top) edge, or a negative margin measured
/// from the far (right/bottom) edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    Center,
    /// Absolute pixel offset from the left/top edge (>= 0).
    FromNear(i32),
    /// Negative margin from the right/bottom edge (< 0).
    FromFar(i32),
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Center
    }
}

impl Serialize for Placement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Placement::Center => serializer.serialize_str("center"),
            Placement::FromNear(px) | Placement::FromFar(px) => serializer.serialize_i32(*px),
        }
    }
}

impl<'de> Deserialize<'de> for Placement {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Keyword(String),
            Pixels(i32),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Keyword(word) if word == "center" => Ok(Placement::Center),
            Repr::Keyword(word) => Err(D::Error::custom(format!(
                "unknown placement keyword '{}', expected \"center\" or a pixel offset",
                word
            ))),
            Repr::Pixels(px) if px >= 0 => Ok(Placement::FromNear(px)),
            Repr::Pixels(px) => Ok(Placement::FromFar(px)),
        }
    }
}

/// Active screen geometry for one layout pass.
///
/// `width` is the logical width of one panel half when the screen is split,
/// so it must be recomputed from the backend before every layout call to
/// stay correct across rotation and hotplug changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScreenGeometry {
    pub width: i32,
    pub height: i32,
    pub split_offset: i32,
}

/// Resolve a field's placement to absolute top-left pixel coordinates.
///
/// The split offset only participates on the horizontal axis, and only for
/// far-edge anchored fields; callers must not pass a font with zero cell
/// metrics.
pub fn determine_xy(field: &TextField, font: &Font, text_len: usize, geo: &ScreenGeometry) -> (i32, i32) {
    let text_width = text_len as i32 * font.char_width();

    let x = match field.pos_x {
        Placement::Center => (geo.width - text_width) / 2,
        Placement::FromNear(px) => px,
        Placement::FromFar(margin) => geo.width + margin - text_width - geo.split_offset,
    };

    let y = match field.pos_y {
        Placement::Center => (geo.height - font.char_height()) / 2,
        Placement::FromNear(px) => px,
        Placement::FromFar(margin) => geo.height + margin - font.char_height(),
    };

    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::font::Font;

    fn geometry() -> ScreenGeometry {
        ScreenGeometry {
            width: 1000,
            height: 600,
            split_offset: 0,
        }
    }

    fn field(pos_x: Placement, pos_y: Placement) -> TextField {
        TextField {
            pos_x,
            pos_y,
            ..TextField::default()
        }
    }

    #[test]
    fn absolute_positions_pass_through() {
        let font = Font::fixed_cell(10, 20);
        let field = field(Placement::FromNear(42), Placement::FromNear(7));
        let (x, y) = determine_xy(&field, &font, 5, &geometry());
        assert_eq!((x, y), (42, 7));
    }

    #[test]
    fn centered_text_is_centered() {
        let font = Font::fixed_cell(10, 20);
        let field = field(Placement::Center, Placement::Center);
        // 10 chars * 10 px = 100 px wide
        let (x, y) = determine_xy(&field, &font, 10, &geometry());
        assert_eq!(x + 100 / 2, 1000 / 2);
        assert_eq!(y + 20 / 2, 600 / 2);
    }

    #[test]
    fn far_edge_anchor_moves_away_from_edge() {
        let font = Font::fixed_cell(10, 20);
        let near = field(Placement::FromFar(-10), Placement::FromFar(-10));
        let far = field(Placement::FromFar(-40), Placement::FromFar(-40));
        let (x1, y1) = determine_xy(&near, &font, 4, &geometry());
        let (x2, y2) = determine_xy(&far, &font, 4, &geometry());
        assert!(x2 < x1);
        assert!(y2 < y1);
        assert_eq!(x1, 1000 - 10 - 40);
        assert_eq!(y1, 600 - 10 - 20);
    }

    #[test]
    fn far_edge_anchor_applies_split_offset_horizontally_only() {
        let font = Font::fixed_cell(10, 20);
        let geo = ScreenGeometry {
            split_offset: 12,
            ..geometry()
        };
        let f = field(Placement::FromFar(-10), Placement::FromFar(-10));
        let (x, y) = determine_xy(&f, &font, 4, &geo);
        assert_eq!(x, 1000 - 10 - 40 - 12);
        assert_eq!(y, 600 - 10 - 20);
    }

    #[test]
    fn placement_deserializes_from_codes() {
        let center: Placement = serde_json::from_str("\"center\"").unwrap();
        let near: Placement = serde_json::from_str("64").unwrap();
        let far: Placement = serde_json::from_str("-20").unwrap();
        assert_eq!(center, Placement::Center);
        assert_eq!(near, Placement::FromNear(64));
        assert_eq!(far, Placement::FromFar(-20));
    }

    #[test]
    fn placement_rejects_unknown_keyword() {
        assert!(serde_json::from_str::<Placement>("\"middle\"").is_err());
    }
}
