//! The player's screen: split menu, full-screen windows and cover flow

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};

use crate::model::{AlbumItem, AppModel, View};
use super::progress::render_scrubber;
use super::utils::{render_scrollable_list, truncate_string};

pub fn render_screen(frame: &mut Frame, area: Rect, model: &AppModel) {
    let windows = model.windows();
    let layout = windows.layout();

    if layout.all_hidden {
        if let Some(view) = layout.cover_flow.and_then(|w| windows.view(&w.id)) {
            render_view(frame, area, view, model);
        }
        return;
    }

    if !layout.menu_hidden {
        if let Some(view) = layout.split.last().and_then(|w| windows.view(&w.id)) {
            let halves = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(area);
            render_view(frame, halves[0], view, model);
            render_preview(frame, halves[1], model);
        }
    }

    if let Some(view) = layout.full.last().and_then(|w| windows.view(&w.id)) {
        render_view(frame, area, view, model);
    }
}

fn status_title(view: &View, model: &AppModel) -> Line<'static> {
    let state = if model.session().is_playing() { " ▶" } else { " ⏸" };
    Line::from(vec![
        Span::styled(
            format!(" {} ", view.title()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(state),
    ])
}

fn render_view(frame: &mut Frame, area: Rect, view: &View, model: &AppModel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray))
        .title(status_title(view, model));

    match view {
        View::NowPlaying { sync } => {
            let inner = block.inner(area);
            frame.render_widget(block, area);

            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(3)])
                .split(inner);
            render_song_info(frame, chunks[0], model);
            render_scrubber(frame, chunks[1], sync, model.session().is_loading());
        }
        View::CoverFlow { albums, selection, loading } => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            if *loading {
                render_placeholder(frame, inner, "Loading...");
            } else if albums.is_empty() {
                render_placeholder(frame, inner, "No saved albums");
            } else {
                render_cover_flow(frame, inner, albums, selection.index);
            }
        }
        _ if view.is_loading() => {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            render_placeholder(frame, inner, "Loading...");
        }
        _ => {
            let width = area.width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = view
                .rows()
                .iter()
                .map(|row| ListItem::new(format!(" {}", truncate_string(row, width))))
                .collect();
            let selected = view.selection().map(|s| s.index).unwrap_or(0);
            render_scrollable_list(frame, area, items, selected, block);
        }
    }
}

fn render_placeholder(frame: &mut Frame, area: Rect, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_song_info(frame: &mut Frame, area: Rect, model: &AppModel) {
    let state = model.session().state();
    let Some(song) = &state.source else {
        render_placeholder(frame, area, "Nothing playing");
        return;
    };

    let lines = vec![
        Line::from(Span::styled(
            format!("{} of {}", state.song_index + 1, state.playlist.len()),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            song.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(song.artist.clone()),
        Line::from(Span::styled(song.album.clone(), Style::default().fg(Color::Gray))),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

/// Split-screen companion pane showing what is playing
fn render_preview(frame: &mut Frame, area: Rect, model: &AppModel) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match model.session().source() {
        Some(song) => {
            let lines = vec![
                Line::from(Span::styled("Now Playing", Style::default().fg(Color::DarkGray))),
                Line::from(Span::styled(
                    song.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(song.artist.clone()),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
        }
        None => render_placeholder(frame, inner, &format!("♫ {}", model.device_name())),
    }
}

fn render_cover_flow(frame: &mut Frame, area: Rect, albums: &[AlbumItem], selected: usize) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(50),
            Constraint::Percentage(25),
        ])
        .split(area);

    let neighbours = [selected.checked_sub(1), Some(selected), selected.checked_add(1)];
    for (column, index) in columns.iter().zip(neighbours) {
        let Some(album) = index.and_then(|i| albums.get(i)) else {
            continue;
        };
        let focused = index == Some(selected);
        let border = if focused { Color::White } else { Color::DarkGray };
        let weight = if focused { Modifier::BOLD } else { Modifier::empty() };
        let width = column.width.saturating_sub(2) as usize;

        let cover = Paragraph::new(vec![
            Line::from(Span::styled(
                truncate_string(&album.name, width),
                Style::default().add_modifier(weight),
            )),
            Line::from(truncate_string(&album.artist, width)),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border)));
        frame.render_widget(cover, *column);
    }
}
