use crate::assets::Sprite;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub(crate) const ORANGE: Rgb = Rgb::new(255, 165, 0);

    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box. Left/top edges are inside, right/bottom are not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rect {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) w: f32,
    pub(crate) h: f32,
}

impl Rect {
    pub(crate) fn centered(center: Point, w: f32, h: f32) -> Self {
        Self {
            left: center.x - w / 2.0,
            top: center.y - h / 2.0,
            w,
            h,
        }
    }

    pub(crate) fn right(&self) -> f32 {
        self.left + self.w
    }

    pub(crate) fn bottom(&self) -> f32 {
        self.top + self.h
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub(crate) fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x < self.right() && p.y >= self.top && p.y < self.bottom()
    }

    /// Strict overlap. An empty box (zero width or height) hits nothing.
    pub(crate) fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }
}

/// The three item archetypes. Doubles as the selected mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ItemKind {
    Feed,
    Treat,
    Toy,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ItemEffect {
    pub(crate) health_delta: i32,
    pub(crate) happiness_delta: i32,
}

struct KindEntry {
    kind: ItemKind,
    effect: ItemEffect,
    asset: &'static str,
}

const KIND_TABLE: [KindEntry; 3] = [
    KindEntry {
        kind: ItemKind::Feed,
        effect: ItemEffect {
            health_delta: 20,
            happiness_delta: 0,
        },
        asset: "apple.png",
    },
    KindEntry {
        kind: ItemKind::Treat,
        effect: ItemEffect {
            health_delta: -10,
            happiness_delta: 60,
        },
        asset: "icecream.png",
    },
    KindEntry {
        kind: ItemKind::Toy,
        effect: ItemEffect {
            health_delta: 0,
            happiness_delta: 40,
        },
        asset: "toy.png",
    },
];

impl ItemKind {
    /// Menu order, which is also click priority.
    pub(crate) const ALL: [ItemKind; 3] = [ItemKind::Feed, ItemKind::Treat, ItemKind::Toy];

    pub(crate) fn index(self) -> usize {
        match self {
            ItemKind::Feed => 0,
            ItemKind::Treat => 1,
            ItemKind::Toy => 2,
        }
    }

    fn entry(self) -> &'static KindEntry {
        let e = &KIND_TABLE[self.index()];
        debug_assert_eq!(e.kind, self);
        e
    }

    pub(crate) fn effect(self) -> ItemEffect {
        self.entry().effect
    }

    pub(crate) fn asset_name(self) -> &'static str {
        self.entry().asset
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Item {
    kind: ItemKind,
    pos: Point,
    health_delta: i32,
    happiness_delta: i32,
    bounds: Rect,
}

impl Item {
    pub(crate) fn new(
        kind: ItemKind,
        pos: Point,
        health_delta: i32,
        happiness_delta: i32,
        sprite: &Sprite,
    ) -> Self {
        Self {
            kind,
            pos,
            health_delta,
            happiness_delta,
            bounds: Rect::centered(pos, sprite.width() as f32, sprite.height() as f32),
        }
    }

    /// Menu button: same sprite and box as the kind, but no effect.
    pub(crate) fn button(kind: ItemKind, pos: Point, sprite: &Sprite) -> Self {
        Self::new(kind, pos, 0, 0, sprite)
    }

    /// World item carrying the kind's fixed effect.
    pub(crate) fn place(kind: ItemKind, pos: Point, sprite: &Sprite) -> Self {
        let e = kind.effect();
        Self::new(kind, pos, e.health_delta, e.happiness_delta, sprite)
    }

    pub(crate) fn kind(&self) -> ItemKind {
        self.kind
    }

    pub(crate) fn pos(&self) -> Point {
        self.pos
    }

    pub(crate) fn health_delta(&self) -> i32 {
        self.health_delta
    }

    pub(crate) fn happiness_delta(&self) -> i32 {
        self.happiness_delta
    }

    pub(crate) fn bounds(&self) -> Rect {
        self.bounds
    }

    pub(crate) fn hit_test(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Pet {
    x: f32,
    y: f32,
    health: i32,
    max_health: i32,
    happiness: i32,
    max_happiness: i32,
    color: Rgb,
}

impl Pet {
    pub(crate) fn new(
        pos: Point,
        health: i32,
        max_health: i32,
        happiness: i32,
        max_happiness: i32,
    ) -> Self {
        let mut pet = Self {
            x: pos.x,
            y: pos.y,
            health: 0,
            max_health: max_health.max(0),
            happiness: 0,
            max_happiness: max_happiness.max(0),
            color: Rgb::new(0, 0, 0),
        };
        pet.apply_health_delta(health);
        pet.apply_happiness_delta(happiness);
        pet
    }

    pub(crate) fn health(&self) -> i32 {
        self.health
    }

    pub(crate) fn happiness(&self) -> i32 {
        self.happiness
    }

    pub(crate) fn color(&self) -> Rgb {
        self.color
    }

    pub(crate) fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub(crate) fn apply_health_delta(&mut self, d: i32) {
        self.health = self.health.saturating_add(d).clamp(0, self.max_health);
    }

    pub(crate) fn apply_happiness_delta(&mut self, d: i32) {
        self.happiness = self.happiness.saturating_add(d).clamp(0, self.max_happiness);
        self.color = Rgb::new(0, self.happiness.clamp(0, 255) as u8, 0);
    }

    pub(crate) fn consume(&mut self, item: &Item) {
        self.apply_happiness_delta(item.happiness_delta());
        self.apply_health_delta(item.health_delta());
    }

    pub(crate) fn move_by(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.health <= 0 || self.happiness <= 0
    }

    /// Health is both the collision half-extent and the drawn radius.
    pub(crate) fn current_bounds(&self) -> Rect {
        let side = self.health as f32 * 2.0;
        Rect::centered(self.pos(), side, side)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct Velocity {
    pub(crate) dx: f32,
    pub(crate) dy: f32,
}

impl Velocity {
    pub(crate) const ZERO: Velocity = Velocity { dx: 0.0, dy: 0.0 };
}
