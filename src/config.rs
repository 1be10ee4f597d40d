use crate::model::Rgb;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub(crate) struct Settings {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) menu_bar_height: f32,
    pub(crate) frame_rate: u32,
    pub(crate) asset_dir: PathBuf,
    pub(crate) background: Rgb,
    pub(crate) menu_bar_colour: Rgb,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 500.0,
            height: 500.0,
            menu_bar_height: 100.0,
            frame_rate: 60,
            asset_dir: PathBuf::from("assets"),
            background: Rgb::WHITE,
            menu_bar_colour: Rgb::ORANGE,
        }
    }
}

/// When happiness loses a point, relative to `happiness_update_rate`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DecayCadence {
    /// Once every `rate` frames.
    Periodic,
    /// Every frame except multiples of `rate`. Only tests select it.
    #[allow(dead_code)]
    AllButPeriod,
}

#[derive(Clone, Debug)]
pub(crate) struct Rules {
    pub(crate) speed: f32,
    pub(crate) decay_rate: i32,
    pub(crate) tick_reset: u32,
    pub(crate) health_update_rate: u32,
    pub(crate) happiness_update_rate: u32,
    pub(crate) happiness_cadence: DecayCadence,
    pub(crate) initial_health: i32,
    pub(crate) max_health: i32,
    pub(crate) initial_happiness: i32,
    pub(crate) max_happiness: i32,
}

impl Rules {
    pub(crate) fn for_frame_rate(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            speed: 2.0,
            decay_rate: -1,
            tick_reset: fps,
            health_update_rate: (fps / 3).max(1),
            happiness_update_rate: (fps / 10).max(1),
            happiness_cadence: DecayCadence::Periodic,
            initial_health: 50,
            max_health: 100,
            initial_happiness: 180,
            // never above 255: happiness is also the pet's green channel
            max_happiness: 255,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self::for_frame_rate(60)
    }
}
