use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use whirl_core::{ItemPresenter, Rect as LayoutRect};

use crate::app::App;
use crate::theme::blend;

pub struct CarouselWidget;

impl CarouselWidget {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let theme = &app.theme;
        frame.render_widget(Block::default().style(Style::default().bg(theme.bg0)), area);

        if !app.controller.is_visible() {
            let hint = Paragraph::new(Line::from(Span::styled(
                "carousel hidden, press p to show",
                Style::default().fg(theme.grey1),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(hint, centered_row(area));
            return;
        }

        let cell_width = app.config.ui.cell_width_pt;
        let cell_height = app.config.ui.cell_height_pt;
        let presenters = app.controller.presenters();

        for index in paint_order(app.controller.z_order(), presenters) {
            let presenter = &presenters[index];
            if !presenter.is_visible() || presenter.alpha() <= 0.0 {
                continue;
            }
            let transformed = presenter.frame().scaled_about_center(presenter.scale());
            let Some(cells) = to_cells(transformed, area, cell_width, cell_height) else {
                continue;
            };

            // Effect overlay sits behind the item
            if presenter.effect_visible() {
                if let Some(effect) = effect_rect(presenter)
                    .and_then(|rect| to_cells(rect, area, cell_width, cell_height))
                {
                    let alpha = presenter.effect_alpha() * presenter.alpha();
                    let block = Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(blend(theme.effect, theme.bg0, alpha)));
                    frame.render_widget(block, effect);
                }
            }

            Self::render_item(frame, cells, presenter, app);
        }
    }

    fn render_item(frame: &mut Frame, cells: Rect, presenter: &ItemPresenter, app: &App) {
        let theme = &app.theme;
        let alpha = presenter.alpha();
        let sticker = presenter.sticker();

        let border = if presenter.is_central() {
            theme.central
        } else {
            theme.fg1
        };
        let mut title_style = Style::default().fg(blend(theme.fg0, theme.bg0, alpha));
        if presenter.is_central() {
            title_style = title_style.add_modifier(Modifier::BOLD);
        }

        let block = Block::default()
            .title(format!(" {} ", sticker.title))
            .title_alignment(Alignment::Center)
            .title_style(title_style)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(blend(border, theme.bg0, alpha)))
            .style(Style::default().bg(theme.bg1));
        let inner = block.inner(cells);

        frame.render_widget(Clear, cells);
        frame.render_widget(block, cells);

        let detail_style = Style::default().fg(blend(theme.grey2, theme.bg1, alpha));
        let mut lines = Vec::new();
        match app.playback.get(&sticker.asset.id) {
            Some(state) if presenter.is_animated() => {
                let marker = if state.visible { "▶" } else { "⏸" };
                lines.push(Line::from(Span::styled(
                    format!("{} frame {}", marker, state.frame),
                    detail_style,
                )));
            }
            _ => lines.push(Line::from(Span::styled("still", detail_style))),
        }
        if let Some(effect) = sticker.effect.as_ref().and_then(|asset| app.playback.get(&asset.id)) {
            if presenter.effect_visible() {
                lines.push(Line::from(Span::styled(
                    format!("✦ effect {}", effect.frame),
                    Style::default().fg(blend(theme.effect, theme.bg1, presenter.effect_alpha())),
                )));
            }
        }

        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        frame.render_widget(paragraph, inner);
    }
}

/// Back items first; the controller's front-most item always last
fn paint_order(z_order: &[usize], presenters: &[ItemPresenter]) -> Vec<usize> {
    let Some((&front, rest)) = z_order.split_last() else {
        return Vec::new();
    };
    let mut order: Vec<usize> = rest.iter().copied().filter(|&i| i < presenters.len()).collect();
    order.sort_by(|&a, &b| presenters[a].scale().total_cmp(&presenters[b].scale()));
    if front < presenters.len() {
        order.push(front);
    }
    order
}

/// Effect frame in viewport points, scaled with its item
fn effect_rect(presenter: &ItemPresenter) -> Option<LayoutRect> {
    let local = presenter.effect_frame()?;
    let item = presenter.frame();
    let center = item.center();
    let scale = presenter.scale().abs();
    let x = item.min_x() + local.min_x();
    let y = item.min_y() + local.min_y();
    Some(LayoutRect::new(
        center.x + (x - center.x) * scale,
        center.y + (y - center.y) * scale,
        local.size.width * scale,
        local.size.height * scale,
    ))
}

/// Map a rect in points onto the terminal cells of `area`, clipped
pub fn to_cells(rect: LayoutRect, area: Rect, cell_width: f64, cell_height: f64) -> Option<Rect> {
    if cell_width <= 0.0 || cell_height <= 0.0 || area.width == 0 || area.height == 0 {
        return None;
    }
    let left = (rect.min_x() / cell_width).floor().max(0.0);
    let top = (rect.min_y() / cell_height).floor().max(0.0);
    let right = (rect.max_x() / cell_width).ceil().min(area.width as f64);
    let bottom = (rect.max_y() / cell_height).ceil().min(area.height as f64);
    if right - left < 2.0 || bottom - top < 2.0 {
        return None;
    }
    Some(Rect::new(
        area.x + left as u16,
        area.y + top as u16,
        (right - left) as u16,
        (bottom - top) as u16,
    ))
}

fn centered_row(area: Rect) -> Rect {
    Rect::new(area.x, area.y + area.height / 2, area.width, area.height.min(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::{Duration, Instant};
    use whirl_core::{AppConfig, ItemSet, StickerCatalog};

    #[test]
    fn test_to_cells_clips_to_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = LayoutRect::new(80.0, 32.0, 160.0, 64.0);
        assert_eq!(to_cells(rect, area, 8.0, 16.0), Some(Rect::new(10, 2, 20, 4)));

        // Partially off the left edge
        let rect = LayoutRect::new(-40.0, 0.0, 80.0, 32.0);
        assert_eq!(to_cells(rect, area, 8.0, 16.0), Some(Rect::new(0, 0, 5, 2)));

        // Entirely outside
        let rect = LayoutRect::new(-400.0, 0.0, 80.0, 32.0);
        assert_eq!(to_cells(rect, area, 8.0, 16.0), None);
    }

    #[test]
    fn test_to_cells_offsets_by_area_origin() {
        let area = Rect::new(5, 3, 100, 40);
        let rect = LayoutRect::new(0.0, 0.0, 80.0, 64.0);
        assert_eq!(to_cells(rect, area, 8.0, 16.0), Some(Rect::new(5, 3, 10, 4)));
    }

    #[test]
    fn test_render_draws_central_title() {
        let items = ItemSet::from_items(StickerCatalog::demo().stickers()[..6].to_vec());
        let mut app = App::headless(items, AppConfig::default());
        let area = Rect::new(0, 0, 120, 41);
        app.resize(area);
        let base = Instant::now();
        app.tick(base);
        app.tick(base + Duration::from_secs(1));

        let mut terminal = Terminal::new(TestBackend::new(120, 41)).unwrap();
        terminal
            .draw(|frame| CarouselWidget::render(frame, app.carousel_area, &app))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        let central = app.controller.presenters()[1].sticker().title.clone();
        assert!(text.contains(&central), "central title {central} drawn");
    }
}
