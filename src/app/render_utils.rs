use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const FALLBACK_COLOR: Color32 = Color32::from_rgb(160, 160, 160);

pub(super) fn parse_color(hex: &str) -> Color32 {
    Color32::from_hex(hex).unwrap_or(FALLBACK_COLOR)
}

pub(super) fn dim_color(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    Color32::from_rgba_unmultiplied(
        color.r(),
        color.g(),
        color.b(),
        (color.a() as f32 * (0.2 + (factor * 0.8))) as u8,
    )
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(250, 250, 250));

    let step = (64.0 * zoom.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 205, 212, 90));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
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

    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
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

/// Triangle pointing at `end`, its tip on the rim of the target circle.
/// `None` when the circles leave no room for it.
pub(super) fn arrow_head(start: Pos2, end: Pos2, target_radius: f32, length: f32) -> Option<[Pos2; 3]> {
    let span = end - start;
    let distance = span.length();
    if distance <= target_radius + length {
        return None;
    }

    let direction = span / distance;
    let tip = end - direction * target_radius;
    let base = tip - direction * length;
    let half_width = direction.rot90() * (length * 0.5);
    Some([tip, base + half_width, base - half_width])
}

/// Layout coordinates span the simulation viewport; its center maps to the
/// canvas center before pan and zoom.
pub(super) fn world_to_screen(rect: Rect, world_center: Vec2, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.center() + pan + (world - world_center) * zoom
}

pub(super) fn screen_to_world(rect: Rect, world_center: Vec2, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.center() - pan) / zoom + world_center
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;

    #[test]
    fn screen_transform_inverts() {
        let rect = Rect::from_min_size(pos2(200.0, 40.0), vec2(800.0, 600.0));
        let center = vec2(400.0, 300.0);
        let pan = vec2(-35.0, 12.0);
        let world = vec2(123.0, 456.0);

        let screen = world_to_screen(rect, center, pan, 1.5, world);
        let back = screen_to_world(rect, center, pan, 1.5, screen);
        assert!((back - world).length() < 1e-3);
        assert_eq!(world_to_screen(rect, center, Vec2::ZERO, 2.0, center), rect.center());
    }

    #[test]
    fn edges_crossing_the_view_are_visible() {
        let rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        assert!(edge_visible(rect, pos2(-50.0, 50.0), pos2(150.0, 50.0), 0.0));
        assert!(edge_visible(rect, pos2(10.0, 10.0), pos2(500.0, 500.0), 0.0));
        assert!(!edge_visible(rect, pos2(-50.0, -50.0), pos2(-10.0, 300.0), 0.0));
        assert!(!edge_visible(rect, pos2(150.0, -20.0), pos2(300.0, 80.0), 2.0));
    }

    #[test]
    fn arrow_tip_touches_target_rim() {
        let [tip, left, right] = arrow_head(pos2(0.0, 0.0), pos2(100.0, 0.0), 10.0, 6.0).unwrap();
        assert_eq!(tip, pos2(90.0, 0.0));
        assert!((left.x - 84.0).abs() < 1e-4 && (right.x - 84.0).abs() < 1e-4);
        assert!((left.y.abs() - 3.0).abs() < 1e-4);
        assert!((left.y + right.y).abs() < 1e-4);

        assert_eq!(arrow_head(pos2(0.0, 0.0), pos2(12.0, 0.0), 10.0, 6.0), None);
        assert_eq!(arrow_head(pos2(5.0, 5.0), pos2(5.0, 5.0), 0.0, 6.0), None);
    }

    #[test]
    fn palette_hex_parses() {
        assert_eq!(parse_color("#ea4335"), Color32::from_rgb(0xea, 0x43, 0x35));
        assert_eq!(parse_color("nope"), FALLBACK_COLOR);
    }
}
