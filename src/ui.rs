//! Rendering. Pure function of [`App`] state; called once per processed event.

use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::app::App;
use crate::focus::Element;
use crate::gateway::DisplayControl;

// ═══════════════════════════════════════════════════════════════════════════════
//  Theme
// ═══════════════════════════════════════════════════════════════════════════════

struct Theme;

impl Theme {
    const ACCENT: Color = Color::Rgb(255, 200, 0);
    const DIM: Color = Color::Rgb(120, 120, 130);
    const DARK: Color = Color::Rgb(60, 60, 70);
    const BG_HEADER: Color = Color::Rgb(20, 20, 28);
    const FG: Color = Color::Rgb(220, 220, 225);
    const FG_DIM: Color = Color::Rgb(130, 130, 140);
    const LOW: Color = Color::Rgb(80, 140, 255);
    const MID: Color = Color::Rgb(120, 220, 120);
    const HIGH: Color = Color::Rgb(255, 240, 200);
    const ERR: Color = Color::Rgb(255, 70, 50);

    fn level_color(pct: u16) -> Color {
        if pct < 30 {
            Self::LOW
        } else if pct < 75 {
            Self::MID
        } else {
            Self::HIGH
        }
    }

    fn border(lit: bool) -> Style {
        if lit {
            Style::new().fg(Self::ACCENT).bold()
        } else {
            Style::new().fg(Self::DIM)
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Layout
// ═══════════════════════════════════════════════════════════════════════════════

pub fn draw<C: DisplayControl>(f: &mut Frame, app: &App<C>) {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(4),
    ])
    .areas(f.area());

    draw_header(f, header);

    let [left, right] =
        Layout::horizontal([Constraint::Ratio(1, 3), Constraint::Ratio(2, 3)]).areas(body);

    draw_presets(f, left, app);
    draw_gauges(f, right, app);
    draw_status(f, status, app);
}

// ─── Header ─────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect) {
    let block = Block::bordered()
        .border_type(BorderType::Double)
        .border_style(Style::new().fg(Theme::ACCENT))
        .style(Style::new().bg(Theme::BG_HEADER));

    let text = Line::from(vec![
        Span::styled("  ◐ ", Style::new().fg(Theme::ACCENT).bold()),
        Span::styled("M 1 D D C", Style::new().fg(Theme::ACCENT).bold()),
        Span::styled("  ◐  ", Style::new().fg(Theme::ACCENT)),
        Span::styled("External Display Control", Style::new().fg(Theme::FG_DIM)),
    ])
    .centered();

    f.render_widget(Paragraph::new(text).block(block), area);
}

// ─── Preset List ────────────────────────────────────────────────────────────

fn draw_presets<C: DisplayControl>(f: &mut Frame, area: Rect, app: &App<C>) {
    let lit = app.is_highlighted(Element::PresetList);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Theme::border(lit))
        .title(Span::styled(
            " (P)resets ",
            Style::new().fg(Theme::ACCENT).bold(),
        ));

    let items: Vec<ListItem> = app
        .list()
        .rows()
        .iter()
        .map(|r| ListItem::new(r.as_str()).style(Style::new().fg(Theme::FG)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::new().fg(Theme::ACCENT).bold())
        .highlight_symbol(if lit { "▸ " } else { "  " });

    let mut state = ListState::default().with_selected(Some(app.list().selected()));
    f.render_stateful_widget(list, area, &mut state);
}

// ─── Gauges ─────────────────────────────────────────────────────────────────

fn draw_gauges<C: DisplayControl>(f: &mut Frame, area: Rect, app: &App<C>) {
    let n = app.registry().len() as u32;
    let rows = Layout::vertical((0..n).map(|_| Constraint::Ratio(1, n))).split(area);

    for (i, (param, &value)) in app.registry().iter().zip(app.values()).enumerate() {
        let lit = app.is_highlighted(Element::Parameter(i));
        let pct = value.clamp(0, 100) as u16;
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Theme::border(lit))
            .title(Span::styled(
                format!(" {} ", param.title()),
                if lit {
                    Style::new().fg(Theme::ACCENT).bold()
                } else {
                    Style::new().fg(Theme::FG)
                },
            ));

        let gauge = Gauge::default()
            .block(block)
            .gauge_style(Style::new().fg(Theme::level_color(pct)).bg(Theme::DARK))
            .percent(pct)
            .label(Span::styled(format!("{value}%"), Style::new().fg(Theme::FG).bold()));

        f.render_widget(gauge, rows[i]);
    }
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn draw_status<C: DisplayControl>(f: &mut Frame, area: Rect, app: &App<C>) {
    let (msg, err) = app.status();
    let sc = if err { Theme::ERR } else { Theme::FG_DIM };

    let mut help = String::from(" Letter: Select │ ↑↓←→ Adjust │ P Presets │ Enter Apply");
    if app.keys().digit_presets {
        help.push_str(" │ 1-9 Preset");
    }
    if app.keys().vi_keys {
        help.push_str(" │ hjkl");
    }
    help.push_str(" │ q Quit ");

    let tag = match app.focus().parameter().and_then(|i| app.registry().get(i)) {
        Some(p) => Span::styled(
            format!(" {} ", p.label.to_uppercase()),
            Style::new().fg(Color::Black).bg(Theme::ACCENT).bold(),
        ),
        None if app.is_highlighted(Element::PresetList) => Span::styled(
            " PRESETS ",
            Style::new().fg(Color::Black).bg(Theme::ACCENT).bold(),
        ),
        None => Span::styled(" IDLE ", Style::new().fg(Theme::FG_DIM).bg(Theme::DARK)),
    };

    let lines = vec![
        Line::from(vec![
            tag,
            Span::raw(" "),
            Span::styled(msg.to_string(), Style::new().fg(sc)),
        ]),
        Line::from(Span::styled(help, Style::new().fg(Theme::FG_DIM))),
    ];

    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::new().fg(Theme::DARK));

    f.render_widget(Paragraph::new(lines).block(block), area);
}
