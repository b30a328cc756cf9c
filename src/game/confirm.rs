use crate::command::Command;
use crate::consts;
use crate::util::EnumExt;
use crossterm::event::Event;
use enum_map::Enum;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        block::{Block, Padding},
        Clear, Widget,
    },
};

/// A pop-up asking the player whether they really want to start over
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) struct ConfirmReset {
    /// The currently-selected choice
    selection: ConfirmOpt,
}

impl ConfirmReset {
    /// The height that should be used for the `Rect` passed to
    /// `ConfirmReset::render()`
    pub(super) const HEIGHT: u16 = 4;

    /// The width that should be used for the `Rect` passed to
    /// `ConfirmReset::render()`
    pub(super) const WIDTH: u16 = 17;

    /// Create a new `ConfirmReset` with "Cancel" selected
    pub(super) fn new() -> ConfirmReset {
        ConfirmReset {
            selection: ConfirmOpt::max(),
        }
    }

    /// Handle an input event.  Returns `Some` if the user made a choice.
    pub(super) fn handle_event(&mut self, event: Event) -> Option<ConfirmOpt> {
        match Command::from_key_event(event.as_key_press_event()?)? {
            Command::Esc | Command::N => return Some(ConfirmOpt::Cancel),
            Command::R | Command::Y => return Some(ConfirmOpt::Restart),
            Command::Enter => return Some(self.selection),
            Command::Up => {
                if let Some(opt) = self.selection.prev() {
                    self.selection = opt;
                }
            }
            Command::Down => {
                if let Some(opt) = self.selection.next() {
                    self.selection = opt;
                }
            }
            Command::Next => self.selection = self.selection.next().unwrap_or_else(ConfirmOpt::min),
            Command::Prev => self.selection = self.selection.prev().unwrap_or_else(ConfirmOpt::max),
            Command::Home => self.selection = ConfirmOpt::min(),
            Command::End => self.selection = ConfirmOpt::max(),
            _ => (),
        }
        None
    }
}

#[derive(Clone, Copy, Debug, Enum, Eq, PartialEq)]
pub(super) enum ConfirmOpt {
    /// Throw away the current game and start a new one
    Restart,

    /// Carry on with the current game
    Cancel,
}

impl ConfirmOpt {
    fn to_line(self, selected: bool) -> Line<'static> {
        let mut line = Line::default();
        if selected {
            line.push_span("» ");
        } else {
            line.push_span("  ");
        }
        let (label, key) = match self {
            ConfirmOpt::Restart => ("Restart (", "y"),
            ConfirmOpt::Cancel => ("Cancel (", "n"),
        };
        line.push_span(label);
        line.push_span(Span::styled(key, consts::KEY_STYLE));
        line.push_span(")");
        if selected {
            line = line.style(consts::MENU_SELECTION_STYLE);
        }
        line
    }
}

impl Widget for ConfirmReset {
    /*
     * ┌── RESTART? ───┐
     * │   Restart (y) │
     * │ » Cancel (n)  │
     * └───────────────┘
     */

    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered()
            .title(" RESTART? ")
            .title_alignment(Alignment::Center)
            .padding(Padding::horizontal(1))
            .style(Style::reset());
        let inner = block.inner(area);
        Clear.render(area, buf);
        block.render(area, buf);
        for (opt, row) in ConfirmOpt::iter().zip(inner.rows()) {
            opt.to_line(self.selection == opt).render(row, buf);
        }
    }
}
