use crate::assets::Assets;
use crate::config::{DecayCadence, Rules, Settings};
use crate::model::{Item, ItemKind, Pet, Point, Velocity};

#[derive(Clone, Debug)]
pub(crate) enum PlayerAction {
    Click(Point),
    Quit,
}

/// Why a session stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    Quit,
    PetExpired,
}

pub(crate) struct Game {
    rules: Rules,
    menu_bar_height: f32,
    assets: Assets,
    pub(crate) pet: Pet,
    pub(crate) mode: ItemKind,
    pub(crate) item: Option<Item>,
    pub(crate) buttons: [Item; 3],
    pub(crate) velocity: Velocity,
    pub(crate) current_tick: u32,
}

impl Game {
    pub(crate) fn new(settings: &Settings, rules: Rules, assets: Assets) -> Self {
        let bar_mid = settings.menu_bar_height / 2.0;
        let slot = |i: f32| Point::new(i * settings.width / 4.0, bar_mid);
        let buttons = [
            Item::button(ItemKind::Feed, slot(1.0), assets.sprite(ItemKind::Feed)),
            Item::button(ItemKind::Treat, slot(2.0), assets.sprite(ItemKind::Treat)),
            Item::button(ItemKind::Toy, slot(3.0), assets.sprite(ItemKind::Toy)),
        ];
        let pet = Pet::new(
            Point::new(settings.width / 2.0, settings.height / 2.0),
            rules.initial_health,
            rules.max_health,
            rules.initial_happiness,
            rules.max_happiness,
        );

        Self {
            rules,
            menu_bar_height: settings.menu_bar_height,
            assets,
            pet,
            mode: ItemKind::Feed,
            item: None,
            buttons,
            velocity: Velocity::ZERO,
            current_tick: 0,
        }
    }

    pub(crate) fn assets(&self) -> &Assets {
        &self.assets
    }

    pub(crate) fn handle_click(&mut self, pos: Point) {
        if let Some(b) = self.buttons.iter().find(|b| b.hit_test(pos)) {
            if self.mode != b.kind() {
                log::debug!("mode {:?} -> {:?}", self.mode, b.kind());
            }
            self.mode = b.kind();
            return;
        }
        if pos.y < self.menu_bar_height {
            return;
        }
        self.create_item(pos);
    }

    fn create_item(&mut self, pos: Point) {
        let item = Item::place(self.mode, pos, self.assets.sprite(self.mode));
        log::debug!("placed {:?} at ({:.0}, {:.0})", self.mode, pos.x, pos.y);
        self.velocity = seek_velocity(self.pet.pos(), item.pos(), self.rules.speed);
        self.item = Some(item);
    }

    pub(crate) fn handle_item_collision(&mut self) {
        let hit = matches!(&self.item, Some(item) if item.bounds().intersects(&self.pet.current_bounds()));
        if !hit {
            return;
        }
        if let Some(item) = self.item.take() {
            self.pet.consume(&item);
            self.velocity = Velocity::ZERO;
            log::debug!(
                "ate {:?}: health={} happiness={}",
                item.kind(),
                self.pet.health(),
                self.pet.happiness()
            );
        }
    }

    /// Movement plus frame-counted decay.
    pub(crate) fn update_pet(&mut self) {
        self.pet.move_by(self.velocity.dx, self.velocity.dy);
        self.current_tick += 1;

        if self.current_tick % self.rules.health_update_rate == 0 {
            self.pet.apply_health_delta(self.rules.decay_rate);
        }
        let on_period = self.current_tick % self.rules.happiness_update_rate == 0;
        let decay_happiness = match self.rules.happiness_cadence {
            DecayCadence::Periodic => on_period,
            DecayCadence::AllButPeriod => !on_period,
        };
        if decay_happiness {
            self.pet.apply_happiness_delta(self.rules.decay_rate);
        }

        if self.current_tick >= self.rules.tick_reset {
            self.current_tick = 0;
        }
    }

    /// One frame of simulation after input. `Some` means the session is over
    /// and nothing should be drawn this frame.
    pub(crate) fn step(&mut self) -> Option<SessionEnd> {
        self.handle_item_collision();
        if self.pet.is_expired() {
            return Some(SessionEnd::PetExpired);
        }
        self.update_pet();
        None
    }
}

/// Per-axis velocity toward `to`: the dominant axis moves at `speed`, the
/// other proportionally slower.
pub(crate) fn seek_velocity(from: Point, to: Point, speed: f32) -> Velocity {
    let ddx = (from.x - to.x).abs();
    let ddy = (from.y - to.y).abs();
    if ddx == 0.0 && ddy == 0.0 {
        return Velocity::ZERO;
    }

    let (mut dx, mut dy) = if ddx >= ddy {
        (speed, speed * (ddy / ddx))
    } else {
        (speed * (ddx / ddy), speed)
    };
    if from.x > to.x {
        dx = -dx;
    }
    if from.y > to.y {
        dy = -dy;
    }
    Velocity { dx, dy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::Sprite;

    fn assets() -> Assets {
        let s = || Sprite::from_image(image::RgbaImage::new(40, 40));
        Assets::from_sprites([s(), s(), s()])
    }

    fn game_with(rules: Rules) -> Game {
        Game::new(&Settings::default(), rules, assets())
    }

    fn game() -> Game {
        game_with(Rules::default())
    }

    #[test]
    fn seek_along_axes_and_diagonal() {
        let o = Point::new(0.0, 0.0);
        assert_eq!(
            seek_velocity(o, Point::new(10.0, 0.0), 2.0),
            Velocity { dx: 2.0, dy: 0.0 }
        );
        assert_eq!(
            seek_velocity(o, Point::new(0.0, 10.0), 2.0),
            Velocity { dx: 0.0, dy: 2.0 }
        );
        assert_eq!(
            seek_velocity(Point::new(10.0, 10.0), o, 2.0),
            Velocity { dx: -2.0, dy: -2.0 }
        );
    }

    #[test]
    fn seek_scales_the_minor_axis() {
        let v = seek_velocity(Point::new(100.0, 100.0), Point::new(60.0, 120.0), 2.0);
        assert_eq!(v, Velocity { dx: -2.0, dy: 1.0 });
        let v = seek_velocity(Point::new(0.0, 0.0), Point::new(-5.0, -20.0), 4.0);
        assert_eq!(v, Velocity { dx: -1.0, dy: -4.0 });
    }

    #[test]
    fn seek_onto_own_position_is_zero() {
        let p = Point::new(42.0, 7.0);
        assert_eq!(seek_velocity(p, p, 2.0), Velocity::ZERO);
    }

    #[test]
    fn starts_with_fixed_pet_and_buttons() {
        let g = game();
        assert_eq!((g.pet.health(), g.pet.happiness()), (50, 180));
        assert_eq!(g.pet.pos(), Point::new(250.0, 250.0));
        assert_eq!(g.mode, ItemKind::Feed);
        let centers: Vec<_> = g.buttons.iter().map(|b| b.pos()).collect();
        assert_eq!(
            centers,
            vec![
                Point::new(125.0, 50.0),
                Point::new(250.0, 50.0),
                Point::new(375.0, 50.0)
            ]
        );
    }

    #[test]
    fn button_click_switches_mode_without_placing() {
        let mut g = game();
        g.handle_click(Point::new(375.0, 50.0));
        assert_eq!(g.mode, ItemKind::Toy);
        assert!(g.item.is_none());
        g.handle_click(Point::new(250.0, 60.0));
        assert_eq!(g.mode, ItemKind::Treat);
    }

    #[test]
    fn feed_button_wins_inside_dead_zone() {
        let mut g = game();
        g.mode = ItemKind::Toy;
        g.handle_click(Point::new(125.0, 50.0));
        assert_eq!(g.mode, ItemKind::Feed);
        assert!(g.item.is_none());
    }

    #[test]
    fn menu_bar_clicks_off_buttons_are_ignored() {
        let mut g = game();
        g.handle_click(Point::new(20.0, 99.0));
        assert!(g.item.is_none());
        assert_eq!(g.velocity, Velocity::ZERO);
        assert_eq!(g.mode, ItemKind::Feed);
    }

    #[test]
    fn play_area_click_places_item_and_steers() {
        let mut g = game();
        g.handle_click(Point::new(450.0, 250.0));
        let item = g.item.as_ref().unwrap();
        assert_eq!(item.kind(), ItemKind::Feed);
        assert_eq!((item.health_delta(), item.happiness_delta()), (20, 0));
        assert_eq!(g.velocity, Velocity { dx: 2.0, dy: 0.0 });

        g.handle_click(Point::new(450.0, 100.0));
        g.handle_click(Point::new(250.0, 450.0));
        assert_eq!(g.item.as_ref().unwrap().pos(), Point::new(250.0, 450.0));
        assert_eq!(g.velocity, Velocity { dx: 0.0, dy: 2.0 });
    }

    #[test]
    fn consumption_applies_effect_and_stops() {
        let mut g = game();
        g.handle_click(Point::new(260.0, 260.0));
        g.handle_item_collision();
        assert_eq!(g.pet.health(), 70);
        assert_eq!(g.pet.happiness(), 180);
        assert!(g.item.is_none());
        assert_eq!(g.velocity, Velocity::ZERO);
    }

    #[test]
    fn each_mode_round_trips_its_effect() {
        for (button, kind) in [(125.0, ItemKind::Feed), (250.0, ItemKind::Treat), (375.0, ItemKind::Toy)] {
            let mut g = game();
            g.handle_click(Point::new(button, 50.0));
            g.handle_click(Point::new(250.0, 250.0));
            g.handle_item_collision();
            let e = kind.effect();
            assert_eq!(g.pet.health(), 50 + e.health_delta, "{kind:?}");
            assert_eq!(g.pet.happiness(), (180 + e.happiness_delta).min(255), "{kind:?}");
            assert!(g.item.is_none());
        }
    }

    #[test]
    fn distant_item_is_not_consumed() {
        let mut g = game();
        g.handle_click(Point::new(480.0, 480.0));
        g.handle_item_collision();
        assert!(g.item.is_some());
        assert_eq!(g.pet.health(), 50);
    }

    #[test]
    fn pet_walks_to_item_and_eats_it() {
        let mut g = game();
        g.handle_click(Point::new(450.0, 250.0));
        let mut frames = 0;
        while g.item.is_some() {
            assert_eq!(g.step(), None);
            frames += 1;
            assert!(frames < 200, "pet never reached the item");
        }
        assert!(g.pet.pos().x > 250.0);
        assert_eq!(g.velocity, Velocity::ZERO);
    }

    #[test]
    fn health_decays_on_frames_20_40_60() {
        let mut g = game();
        let mut decayed_at = Vec::new();
        for frame in 1..=120 {
            let before = g.pet.health();
            g.update_pet();
            if g.pet.health() < before {
                decayed_at.push(frame);
            }
        }
        assert_eq!(decayed_at, vec![20, 40, 60, 80, 100, 120]);
        assert_eq!(g.current_tick, 0);
    }

    #[test]
    fn counter_resets_after_sixty_frames() {
        let mut g = game();
        for _ in 0..59 {
            g.update_pet();
        }
        assert_eq!(g.current_tick, 59);
        g.update_pet();
        assert_eq!(g.current_tick, 0);
        g.update_pet();
        assert_eq!(g.current_tick, 1);
    }

    #[test]
    fn periodic_happiness_decays_every_sixth_frame() {
        let mut g = game();
        for _ in 0..60 {
            g.update_pet();
        }
        assert_eq!(g.pet.happiness(), 170);
    }

    #[test]
    fn literal_cadence_decays_off_period() {
        let mut rules = Rules::default();
        rules.happiness_cadence = DecayCadence::AllButPeriod;
        let mut g = game_with(rules);
        for _ in 0..6 {
            g.update_pet();
        }
        assert_eq!(g.pet.happiness(), 175);
        for _ in 6..60 {
            g.update_pet();
        }
        assert_eq!(g.pet.happiness(), 130);
    }

    #[test]
    fn movement_follows_velocity() {
        let mut g = game();
        g.velocity = Velocity { dx: -2.0, dy: 1.0 };
        g.update_pet();
        g.update_pet();
        assert_eq!(g.pet.pos(), Point::new(246.0, 252.0));
    }

    #[test]
    fn expired_pet_ends_without_update() {
        let mut g = game();
        g.pet.apply_health_delta(-50);
        g.velocity = Velocity { dx: 2.0, dy: 0.0 };
        assert_eq!(g.step(), Some(SessionEnd::PetExpired));
        assert_eq!(g.current_tick, 0);
        assert_eq!(g.pet.pos(), Point::new(250.0, 250.0));
    }

    #[test]
    fn zero_health_pet_cannot_eat_its_way_back() {
        let mut g = game();
        g.pet.apply_health_delta(-50);
        g.handle_click(Point::new(250.0, 250.0));
        assert!(g.item.is_some());
        assert_eq!(g.step(), Some(SessionEnd::PetExpired));
        assert_eq!(g.pet.health(), 0);
        assert!(g.item.is_some());
    }

    #[test]
    fn eating_can_save_a_dying_pet() {
        let mut g = game();
        g.pet.apply_happiness_delta(-179);
        g.handle_click(Point::new(375.0, 50.0));
        g.handle_click(Point::new(250.0, 250.0));
        assert_eq!(g.step(), None);
        assert_eq!(g.pet.happiness(), 41);
    }

    #[test]
    fn neglected_pet_eventually_expires() {
        let mut g = game();
        let mut frames = 0u32;
        let end = loop {
            if let Some(end) = g.step() {
                break end;
            }
            frames += 1;
            assert!(frames < 10_000);
        };
        assert_eq!(end, SessionEnd::PetExpired);
        // 50 health at 3 per 60 frames
        assert_eq!(frames, 1000);
    }
}
