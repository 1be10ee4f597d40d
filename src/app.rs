use crate::assets::Assets;
use crate::config::{Rules, Settings};
use crate::input::{collect_input_nonblocking, map_event_to_action};
use crate::render::{draw_scene, Terminal};
use crate::sim::{Game, PlayerAction, SessionEnd};
use anyhow::Context;
use std::time::{Duration, Instant};

pub(crate) struct App {
    settings: Settings,
    game: Game,
    term: Terminal,
}

impl App {
    fn init(settings: Settings) -> anyhow::Result<Self> {
        let rules = Rules::for_frame_rate(settings.frame_rate);
        // assets first: a missing file must fail before the screen is taken over
        let assets = Assets::load(&settings.asset_dir)
            .with_context(|| format!("loading assets from {}", settings.asset_dir.display()))?;
        let game = Game::new(&settings, rules, assets);
        let term = Terminal::begin().context("terminal setup failed")?;

        log::info!(
            "play area {}x{} at {} fps, terminal {}x{}",
            settings.width,
            settings.height,
            settings.frame_rate,
            term.cols,
            term.rows
        );

        Ok(Self {
            settings,
            game,
            term,
        })
    }

    fn run(&mut self) -> anyhow::Result<SessionEnd> {
        let fps = self.settings.frame_rate.max(1);
        let frame_dt = Duration::from_secs_f32(1.0 / fps as f32);
        let mut full_redraw = true;

        loop {
            let frame_start = Instant::now();
            if self.term.resize_if_needed()? {
                full_redraw = true;
            }
            let vp = self.term.viewport(&self.settings);

            // input
            for ev in collect_input_nonblocking(frame_dt)? {
                match map_event_to_action(&vp, ev) {
                    Some(PlayerAction::Quit) => return Ok(SessionEnd::Quit),
                    Some(PlayerAction::Click(pos)) => self.game.handle_click(pos),
                    None => {}
                }
            }

            // sim
            if let Some(end) = self.game.step() {
                return Ok(end);
            }

            // render
            draw_scene(&mut self.term.canvas, &self.game, &self.settings, vp);
            self.term.present(!full_redraw)?;
            full_redraw = false;

            // frame cap
            spin_sleep(frame_dt, frame_start);
        }
    }
}

pub(crate) fn run() -> anyhow::Result<SessionEnd> {
    let mut app = App::init(Settings::default())?;
    let end = app.run();
    // restores the terminal before the caller reports anything
    drop(app);
    let end = end?;
    log::info!("session ended: {end:?}");
    Ok(end)
}

/* -----------------------------
   Frame pacing helper
------------------------------ */

fn spin_sleep(target: Duration, start: Instant) {
    let end = start + target;
    loop {
        let t = Instant::now();
        if t >= end {
            break;
        }
        let left = end - t;
        if left > Duration::from_millis(2) {
            std::thread::sleep(Duration::from_millis(1));
        } else {
            std::hint::spin_loop();
        }
    }
}
