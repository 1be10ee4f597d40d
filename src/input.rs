use crate::render::Viewport;
use crate::sim::PlayerAction;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind,
};
use std::time::Duration;

#[derive(Clone, Debug)]
pub(crate) enum InputEvent {
    Key { key: KeyCode, mods: KeyModifiers },
    ButtonDown { column: u16, row: u16 },
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Some(ev) = translate(event::read()?) {
            out.push(ev);
        }
        if out.len() >= 32 {
            break;
        }
    }
    Ok(out)
}

/// Key presses and any mouse button going down; everything else is dropped.
pub(crate) fn translate(ev: Event) -> Option<InputEvent> {
    match ev {
        Event::Key(k) if k.kind == KeyEventKind::Press => Some(InputEvent::Key {
            key: k.code,
            mods: k.modifiers,
        }),
        Event::Mouse(m) if matches!(m.kind, MouseEventKind::Down(_)) => {
            Some(InputEvent::ButtonDown {
                column: m.column,
                row: m.row,
            })
        }
        _ => None,
    }
}

pub(crate) fn map_event_to_action(vp: &Viewport, ev: InputEvent) -> Option<PlayerAction> {
    match ev {
        InputEvent::Key { key, mods } => match key {
            KeyCode::Char('c') | KeyCode::Char('C') if mods.contains(KeyModifiers::CONTROL) => {
                Some(PlayerAction::Quit)
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(PlayerAction::Quit),
            _ => None,
        },
        InputEvent::ButtonDown { column, row } => vp.cell_to_world(column, row).map(PlayerAction::Click),
    }
}
