use crate::app::{App, Mode};
use crate::config::Theme;
use crate::storage::SlotStore;
use crate::task::Category;
use crossterm::event::{self, Event};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame, Terminal,
};
use std::io;

struct Palette {
    background: Color,
    text: Color,
    muted: Color,
    accent: Color,
    track: Color,
    done: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            background: Color::White,
            text: Color::Black,
            muted: Color::DarkGray,
            accent: Color::Blue,
            track: Color::Gray,
            done: Color::Green,
        },
        Theme::Dark => Palette {
            background: Color::Black,
            text: Color::White,
            muted: Color::Gray,
            accent: Color::LightBlue,
            track: Color::DarkGray,
            done: Color::LightGreen,
        },
    }
}

fn badge_color(category: Category) -> Color {
    match category {
        Category::Work => Color::Blue,
        Category::Personal => Color::Magenta,
        Category::Study => Color::Green,
    }
}

pub fn run_app<B: Backend, S: SlotStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    while !app.should_quit {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}

/// Runs `setup`, then `body` on what it produced, then `restore`. `restore`
/// always runs, also when `setup` or `body` failed partway, so the terminal
/// never stays in raw mode or on the alternate screen.
pub fn run_restoring<T>(
    setup: impl FnOnce() -> io::Result<T>,
    body: impl FnOnce(&mut T) -> io::Result<()>,
    restore: impl FnOnce() -> io::Result<()>,
) -> io::Result<()> {
    let result = setup().and_then(|mut entered| body(&mut entered));
    let restored = restore();
    result.and(restored)
}

pub fn draw<S: SlotStore>(f: &mut Frame, app: &App<S>) {
    let colors = palette(app.theme);
    let base = Style::default().bg(colors.background).fg(colors.text);
    f.render_widget(Block::default().style(base), f.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, app, &colors, chunks[0]);
    draw_progress(f, app, &colors, chunks[1]);
    draw_input(f, app, &colors, chunks[2]);
    if app.store.tasks().is_empty() {
        draw_empty_state(f, &colors, chunks[3]);
    } else {
        draw_tasks(f, app, &colors, chunks[3]);
    }
    draw_help(f, app, &colors, chunks[4]);
}

fn draw_header<S: SlotStore>(f: &mut Frame, app: &App<S>, colors: &Palette, area: Rect) {
    let theme_switch = match app.theme {
        Theme::Light => "🌙 Dark",
        Theme::Dark => "☀️ Light",
    };
    let header = vec![
        Line::from(vec![
            Span::styled(
                "Taskify",
                Style::default().fg(colors.text).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("   [t] {theme_switch}"), Style::default().fg(colors.muted)),
        ]),
        Line::from(Span::styled(
            format!(
                "{} tasks · {}% done",
                app.store.tasks().len(),
                app.store.progress()
            ),
            Style::default().fg(colors.muted),
        )),
    ];
    f.render_widget(Paragraph::new(header), area);
}

fn draw_progress<S: SlotStore>(f: &mut Frame, app: &App<S>, colors: &Palette, area: Rect) {
    let progress = app.store.progress();
    let fill = if progress == 100 {
        colors.done
    } else {
        colors.accent
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(fill).bg(colors.track))
        .percent(u16::from(progress));
    f.render_widget(gauge, area);
}

fn draw_input<S: SlotStore>(f: &mut Frame, app: &App<S>, colors: &Palette, area: Rect) {
    let editing = app.mode == Mode::Editing;
    let text = if app.input.is_empty() && !editing {
        Span::styled("Add a new task...", Style::default().fg(colors.muted))
    } else {
        Span::raw(app.input.as_str())
    };
    let input = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("New task [Tab] {}", app.category.label()))
            .border_style(if editing {
                Style::default().fg(colors.accent)
            } else {
                Style::default()
            }),
    );
    f.render_widget(input, area);

    if editing {
        f.set_cursor_position((input_cursor_x(area, &app.input), area.y + 1));
    }
}

/// Column just past the typed text, measured in terminal cells so wide
/// characters count twice. Kept inside the box border.
fn input_cursor_x(area: Rect, input: &str) -> u16 {
    let width = u16::try_from(Span::raw(input).width()).unwrap_or(u16::MAX);
    area.x
        .saturating_add(1)
        .saturating_add(width)
        .min(area.right().saturating_sub(2))
}

fn draw_tasks<S: SlotStore>(f: &mut Frame, app: &App<S>, colors: &Palette, area: Rect) {
    let items: Vec<ListItem> = app
        .store
        .tasks()
        .iter()
        .map(|t| {
            let (marker, text_style) = if t.completed {
                (
                    Span::styled("[✓] ", Style::default().fg(colors.done)),
                    Style::default()
                        .fg(colors.muted)
                        .add_modifier(Modifier::CROSSED_OUT),
                )
            } else {
                (Span::raw("[ ] "), Style::default().fg(colors.text))
            };
            ListItem::new(Line::from(vec![
                marker,
                Span::styled(t.text.as_str(), text_style),
                Span::raw("  "),
                Span::styled(t.category.label(), Style::default().fg(badge_color(t.category))),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Tasks").borders(Borders::ALL))
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED));

    let mut state = ListState::default().with_selected(Some(app.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_empty_state(f: &mut Frame, colors: &Palette, area: Rect) {
    let empty = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No tasks yet",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Add your first task above!"),
    ])
    .style(Style::default().fg(colors.muted))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(empty, area);
}

fn draw_help<S: SlotStore>(f: &mut Frame, app: &App<S>, colors: &Palette, area: Rect) {
    let help = match app.mode {
        Mode::Normal => "a add · space toggle · d delete · tab category · t theme · q quit",
        Mode::Editing => "enter submit · tab category · esc done",
    };
    f.render_widget(
        Paragraph::new(Span::styled(help, Style::default().fg(colors.muted))),
        area,
    );
}
