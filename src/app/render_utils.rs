use eframe::egui::{Color32, Painter, Pos2, Rect, Vec2};

/// Solarized colours for one display mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct Palette {
    pub background: Color32,
    pub node: Color32,
    pub node_hover: Color32,
    pub isolated: Color32,
    pub vertex: Color32,
    pub link: Color32,
    pub link_highlight: Color32,
    pub polygon_link: Color32,
    pub hub_link: Color32,
    pub anchor_link: Color32,
    pub text: Color32,
    pub text_hover: Color32,
    pub text_outline: Color32,
    pub sun: Color32,
    pub sun_core: Color32,
    pub sun_ray: Color32,
    pub pin: Color32,
}

const CYAN: Color32 = Color32::from_rgb(0x2a, 0xa1, 0x98);
const BLUE: Color32 = Color32::from_rgb(0x26, 0x8b, 0xd2);
const VIOLET: Color32 = Color32::from_rgb(0x6c, 0x71, 0xc4);
const MAGENTA: Color32 = Color32::from_rgb(0xd3, 0x36, 0x82);

impl Palette {
    pub(in crate::app) fn light() -> Self {
        Self {
            background: Color32::from_rgb(0xfd, 0xf6, 0xe3),
            node: CYAN,
            node_hover: BLUE,
            isolated: VIOLET,
            vertex: MAGENTA,
            link: Color32::from_rgba_unmultiplied(147, 161, 161, 102),
            link_highlight: Color32::from_rgba_unmultiplied(38, 139, 210, 204),
            polygon_link: Color32::from_rgba_unmultiplied(147, 161, 161, 64),
            hub_link: Color32::from_rgba_unmultiplied(108, 113, 196, 64),
            anchor_link: Color32::from_rgba_unmultiplied(42, 161, 152, 26),
            text: Color32::from_rgb(0x65, 0x7b, 0x83),
            text_hover: Color32::from_rgb(0x07, 0x36, 0x42),
            text_outline: Color32::from_rgba_unmultiplied(253, 246, 227, 250),
            sun: Color32::from_rgb(0xcb, 0x4b, 0x16),
            sun_core: Color32::from_rgb(0xa0, 0x38, 0x10),
            sun_ray: Color32::from_rgba_unmultiplied(203, 75, 22, 128),
            pin: Color32::from_rgb(0x07, 0x36, 0x42),
        }
    }

    pub(in crate::app) fn dark() -> Self {
        Self {
            background: Color32::from_rgb(0x00, 0x2b, 0x36),
            link: Color32::from_rgba_unmultiplied(88, 110, 117, 102),
            polygon_link: Color32::from_rgba_unmultiplied(88, 110, 117, 77),
            hub_link: Color32::from_rgba_unmultiplied(108, 113, 196, 90),
            anchor_link: Color32::from_rgba_unmultiplied(42, 161, 152, 38),
            text: Color32::from_rgb(0x93, 0xa1, 0xa1),
            text_hover: Color32::from_rgb(0xfd, 0xf6, 0xe3),
            text_outline: Color32::from_rgba_unmultiplied(0, 43, 54, 242),
            sun: Color32::from_rgb(0xb5, 0x89, 0x00),
            sun_core: Color32::from_rgb(0x85, 0x60, 0x00),
            sun_ray: Color32::from_rgba_unmultiplied(181, 137, 0, 153),
            pin: Color32::from_rgb(0xfd, 0xf6, 0xe3),
            ..Self::light()
        }
    }

    pub(in crate::app) fn for_mode(night: bool) -> Self {
        if night { Self::dark() } else { Self::light() }
    }
}

pub(super) fn with_alpha(color: Color32, alpha: f32) -> Color32 {
    let alpha = (alpha.clamp(0.0, 1.0) * 255.0) as u8;
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Radial glow approximated with concentric translucent discs.
pub(super) fn draw_glow(painter: &Painter, center: Pos2, inner: f32, outer: f32, color: Color32) {
    const RINGS: usize = 6;
    if outer <= inner || outer <= 0.0 {
        return;
    }
    let peak = color.a() as f32 / 255.0;
    for ring in 0..RINGS {
        let t = ring as f32 / RINGS as f32;
        let radius = outer - (outer - inner) * t;
        painter.circle_filled(center, radius, with_alpha(color, peak * (t + 0.15) / RINGS as f32 * 2.0));
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, palette: &Palette) {
    painter.rect_filled(rect, 0.0, palette.background);
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn edge_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;

    if max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom() {
        return false;
    }

    if rect.contains(start) || rect.contains(end) {
        return true;
    }

    let top_left = rect.left_top();
    let top_right = rect.right_top();
    let bottom_left = rect.left_bottom();
    let bottom_right = rect.right_bottom();

    segments_intersect(start, end, top_left, top_right)
        || segments_intersect(start, end, top_right, bottom_right)
        || segments_intersect(start, end, bottom_right, bottom_left)
        || segments_intersect(start, end, bottom_left, top_left)
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn cross(o: Pos2, a: Pos2, b: Pos2) -> f32 {
        let oa = a - o;
        let ob = b - o;
        (oa.x * ob.y) - (oa.y * ob.x)
    }

    let c1 = cross(a1, a2, b1);
    let c2 = cross(a1, a2, b2);
    let c3 = cross(b1, b2, a1);
    let c4 = cross(b1, b2, a2);

    (c1 <= 0.0 && c2 >= 0.0 || c1 >= 0.0 && c2 <= 0.0)
        && (c3 <= 0.0 && c4 >= 0.0 || c3 >= 0.0 && c4 <= 0.0)
}

pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn screen_world_round_trip() {
        let rect = Rect::from_min_size(pos2(10.0, 20.0), vec2(800.0, 600.0));
        let pan = vec2(-35.0, 12.0);
        let world = vec2(120.0, -48.0);
        let screen = world_to_screen(rect, pan, 2.5, world);
        let back = screen_to_world(rect, pan, 2.5, screen);
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn edge_crossing_the_viewport_is_visible() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, -20.0), 0.0));
    }

    #[test]
    fn night_palette_keeps_accents() {
        let light = Palette::light();
        let dark = Palette::dark();
        assert_eq!(light.node, dark.node);
        assert_eq!(light.vertex, dark.vertex);
        assert!(light.background != dark.background);
        assert_eq!(Palette::for_mode(true), dark);
    }
}
