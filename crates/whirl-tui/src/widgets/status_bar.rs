use std::time::Instant;

use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use whirl_core::Driver;

use crate::app::{App, Mode};

pub struct StatusBarWidget;

impl StatusBarWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App, now: Instant) {
        let theme = &app.theme;
        let bg = if app.haptics.is_flashing(now) {
            theme.flash
        } else {
            theme.bg2
        };

        let status_text = if let Some((msg, _)) = &app.status_message {
            format!(" {}", msg)
        } else {
            Self::summary(app)
        };

        let help_hint = " q:quit h/l:rotate p:hide ?:help ";
        let padding_len = area
            .width
            .saturating_sub(status_text.chars().count() as u16 + help_hint.len() as u16)
            as usize;

        let line = Line::from(vec![
            Span::styled(status_text, Style::default().fg(theme.fg0).bg(bg)),
            Span::styled(" ".repeat(padding_len), Style::default().bg(bg)),
            Span::styled(help_hint, Style::default().fg(theme.grey2).bg(bg)),
        ]);

        frame.render_widget(Paragraph::new(line), area);
    }

    fn summary(app: &App) -> String {
        let controller = &app.controller;
        let mode = match app.mode {
            Mode::Normal => "NORMAL",
            Mode::Help => "HELP",
        };
        let driver = match controller.driver() {
            Driver::Idle => "idle",
            Driver::Dragging(_) => "drag",
            Driver::Animating(_) => "anim",
        };
        let title = controller
            .presenters()
            .get(controller.current_index())
            .map(|presenter| presenter.sticker().title.as_str())
            .unwrap_or("-");

        format!(
            " {} | {} {}/{} | pos {:.3} | {} | assets {}/{}",
            mode,
            title,
            controller.current_index() + 1,
            controller.count(),
            controller.position(),
            driver,
            app.fetches.loaded,
            app.fetches.loaded + app.fetches.failed,
        )
    }
}
