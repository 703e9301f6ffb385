/// Collision layer: the single source of truth for overlap.
///
/// Everything in the world (actor, spikes, drop-spikes, ladders, floor
/// platforms, goal) is an axis-aligned rectangle anchored at its top-left
/// corner. Screen coordinates: y grows downward, so the floor line of a
/// world of height `H` is `H - sprite_height`.
///
/// ## Overlap
///
/// Two rectangles overlap iff their OPEN intervals intersect on both axes.
/// Touching edges are not an overlap:
///
/// ┌────────────────────────────────┬──────────┐
/// │ Case                            │ Overlap? │
/// ├────────────────────────────────┼──────────┤
/// │ a.right == b.left               │ NO       │
/// │ a.bottom == b.top               │ NO       │
/// │ interiors share any area        │ YES      │
/// │ zero-width a inside b           │ NO       │
/// └────────────────────────────────┴──────────┘

#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Same top-left corner, width divided by `divisor`.
    /// Hazards collide on a slimmer box than the sprite they draw.
    pub fn narrowed(self, divisor: f64) -> Rect {
        Rect { width: self.width / divisor, ..self }
    }

    /// The actor's hurtbox: half the sprite width, full height.
    pub fn hitbox(self) -> Rect {
        self.narrowed(2.0)
    }

    /// One-pixel strip directly under the bottom edge.
    /// Used to ask "is something standing on this?".
    pub fn feet(self) -> Rect {
        Rect { y: self.bottom(), height: 1.0, ..self }
    }
}

/// Does `a` overlap `b`? Symmetric; edges touching do not count.
#[inline]
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.x + b.width
        && a.x + a.width > b.x
        && a.y < b.y + b.height
        && a.y + a.height > b.y
}
