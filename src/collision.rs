/// Axis-aligned overlap testing.
///
/// Every entity collides with its render rectangle; the caller shrinks the
/// rectangle with explicit per-side insets where the gameplay collider is
/// narrower than the art (the player's sprite carries wide transparent
/// margins, so its hit box loses 20 px on each side).

/// Horizontal inset applied to the player's render rectangle on both sides.
pub const PLAYER_SIDE_INSET: f32 = 20.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SideInsets {
    pub left: f32,
    pub right: f32,
}

impl SideInsets {
    pub const NONE: SideInsets = SideInsets { left: 0.0, right: 0.0 };

    pub const PLAYER: SideInsets = SideInsets {
        left: PLAYER_SIDE_INSET,
        right: PLAYER_SIDE_INSET,
    };
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    /// Build a collision rectangle from a position and render size, shrunk
    /// by the given side insets.
    pub fn from_entity(pos: (f32, f32), render_size: (f32, f32), insets: SideInsets) -> Self {
        Rect {
            left: pos.0 + insets.left,
            top: pos.1,
            right: pos.0 + render_size.0 - insets.right,
            bottom: pos.1 + render_size.1,
        }
    }
}

/// Canonical AABB test with inclusive edges: rectangles that merely touch
/// count as overlapping.
pub fn overlap(a: &Rect, b: &Rect) -> bool {
    !(a.right < b.left || a.left > b.right || a.bottom < b.top || a.top > b.bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(l: f32, t: f32, r: f32, b: f32) -> Rect {
        Rect { left: l, top: t, right: r, bottom: b }
    }

    #[test]
    fn disjoint_rects_do_not_overlap() {
        assert!(!overlap(&rect(0.0, 0.0, 10.0, 10.0), &rect(11.0, 0.0, 20.0, 10.0)));
        assert!(!overlap(&rect(0.0, 0.0, 10.0, 10.0), &rect(0.0, 11.0, 10.0, 20.0)));
    }

    #[test]
    fn touching_edges_count_as_overlap() {
        assert!(overlap(&rect(0.0, 0.0, 10.0, 10.0), &rect(10.0, 0.0, 20.0, 10.0)));
    }

    #[test]
    fn containment_is_symmetric() {
        let big = rect(0.0, 0.0, 100.0, 100.0);
        let small = rect(40.0, 40.0, 60.0, 60.0);
        assert!(overlap(&big, &small));
        assert!(overlap(&small, &big));
    }

    #[test]
    fn insets_shrink_the_box() {
        let r = Rect::from_entity((100.0, 0.0), (104.0, 150.0), SideInsets::PLAYER);
        assert_eq!(r.left, 120.0);
        assert_eq!(r.right, 184.0);
        assert_eq!(r.top, 0.0);
        assert_eq!(r.bottom, 150.0);
    }
}
