use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph,
        Row, Table, TableState, Wrap,
    },
    Frame, Terminal,
};
use rmb_dashboard::{company_totals, format_millions, Analytics, DashboardContext, Month};
use std::io;

const SERIES_COLORS: [Color; 6] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::Red,
    Color::Blue,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Converter,
    RawData,
    Totals,
    Trend,
}

impl Page {
    const ALL: [Page; 4] = [Page::Converter, Page::RawData, Page::Totals, Page::Trend];

    pub fn next(&self) -> Self {
        match self {
            Page::Converter => Page::RawData,
            Page::RawData => Page::Totals,
            Page::Totals => Page::Trend,
            Page::Trend => Page::Converter,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Converter => Page::Trend,
            Page::RawData => Page::Converter,
            Page::Totals => Page::RawData,
            Page::Trend => Page::Totals,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Converter => "RMB Converter",
            Page::RawData => "Raw Data",
            Page::Totals => "Revenue Total",
            Page::Trend => "Revenue Trend",
        }
    }
}

pub struct App {
    pub ctx: DashboardContext,
    pub current_page: Page,
    pub input: String,
    /// Last conversion: numeral or the error to show
    pub result: Option<std::result::Result<String, String>>,
    /// Sheet data, or why it could not be loaded
    pub analytics: std::result::Result<Analytics, String>,
    pub state: TableState,
}

impl App {
    pub fn new(ctx: DashboardContext, analytics: std::result::Result<Analytics, String>) -> Self {
        let mut state = TableState::default();
        if matches!(&analytics, Ok(a) if !a.rows.is_empty()) {
            state.select(Some(0));
        }

        Self {
            ctx,
            current_page: Page::Converter,
            input: String::new(),
            result: None,
            analytics,
            state,
        }
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }

    pub fn convert(&mut self) {
        self.result = Some(
            self.ctx
                .convert_input(&self.input)
                .map_err(|e| e.to_string()),
        );
    }

    fn row_count(&self) -> usize {
        self.analytics.as_ref().map(|a| a.rows.len()).unwrap_or(0)
    }

    pub fn next(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(_) => 0,
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let count = self.row_count();
        if count == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => count - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Esc => return Ok(()),
            KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => app.previous_page(),
            KeyCode::Tab => app.next_page(),
            KeyCode::BackTab => app.previous_page(),
            _ if app.current_page == Page::Converter => match key.code {
                KeyCode::Enter => app.convert(),
                KeyCode::Backspace => {
                    app.input.pop();
                }
                KeyCode::Char(c) => app.input.push(c),
                _ => {}
            },
            KeyCode::Char('q') => return Ok(()),
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.previous(),
            KeyCode::Home if app.row_count() > 0 => app.state.select(Some(0)),
            KeyCode::End if app.row_count() > 0 => app.state.select(Some(app.row_count() - 1)),
            _ => {}
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Converter => render_converter(f, chunks[1], app),
        Page::RawData => render_raw_data(f, chunks[1], app),
        Page::Totals => render_totals(f, chunks[1], app),
        Page::Trend => render_trend(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut tab_spans = vec![];
    for (i, page) in Page::ALL.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    match &app.analytics {
        Ok(analytics) => tab_spans.push(Span::styled(
            format!("Companies: {}", analytics.rows.len()),
            Style::default().fg(Color::White),
        )),
        Err(_) => tab_spans.push(Span::styled("No sheet", Style::default().fg(Color::Red))),
    }

    let header = Paragraph::new(vec![Line::from(tab_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(header, area);
}

fn render_converter(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let input = Paragraph::new(format!("{}▏", app.input)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Enter a number "),
    );
    f.render_widget(input, chunks[0]);

    let result_line = match &app.result {
        Some(Ok(numeral)) => Line::from(vec![
            Span::raw("Chinese Numerals: "),
            Span::styled(
                numeral.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            ),
        ]),
        Some(Err(message)) => Line::from(Span::styled(message.clone(), Style::default().fg(Color::Red))),
        None => Line::from(Span::styled(
            "Press Enter to convert",
            Style::default().fg(Color::DarkGray),
        )),
    };
    let result = Paragraph::new(result_line)
        .block(Block::default().borders(Borders::ALL).title(" Result "))
        .wrap(Wrap { trim: true });
    f.render_widget(result, chunks[1]);
}

/// Shown in place of a chart or table when the sheet failed to load
fn render_sheet_error(f: &mut Frame, area: Rect, title: &str, message: &str) {
    let paragraph = Paragraph::new(vec![
        Line::from(Span::styled(
            "❌ Revenue sheet not available",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
        Line::from(""),
        Line::from("Pass a CSV path (rmb-dashboard ui <sheet.csv>) or set sheet.path in the config."),
    ])
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(format!(" {} ", title)));

    f.render_widget(paragraph, area);
}

fn render_raw_data(f: &mut Frame, area: Rect, app: &mut App) {
    let analytics = match &app.analytics {
        Ok(analytics) => analytics,
        Err(message) => return render_sheet_error(f, area, "Raw Data Preview", message),
    };

    let header_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut header_cells = vec![
        Cell::from("公司").style(header_style),
        Cell::from("收入").style(header_style),
    ];
    header_cells.extend(Month::ALL.iter().map(|m| Cell::from(m.label()).style(header_style)));

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = analytics.rows.iter().map(|row| {
        let mut cells = vec![
            Cell::from(truncate(&row.company, 16)),
            Cell::from(format_value(row.total_revenue)).style(Style::default().fg(Color::Green)),
        ];
        cells.extend(row.months.iter().map(|v| Cell::from(format_value(*v))));
        Row::new(cells).height(1)
    });

    let mut widths = vec![Constraint::Length(18), Constraint::Length(14)];
    widths.extend(std::iter::repeat(Constraint::Length(10)).take(Month::ALL.len()));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Raw Data Preview "),
        )
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_totals(f: &mut Frame, area: Rect, app: &App) {
    let analytics = match &app.analytics {
        Ok(analytics) => analytics,
        Err(message) => return render_sheet_error(f, area, "Company Revenue Total", message),
    };

    let bars: Vec<Bar> = company_totals(&analytics.rows)
        .into_iter()
        .enumerate()
        .map(|(i, total)| {
            Bar::default()
                .label(Line::from(truncate(&total.company, 10)))
                .value(total.total_revenue.max(0.0).round() as u64)
                .text_value(format_millions(total.total_revenue))
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Company Revenue Total "),
        )
        .data(BarGroup::default().bars(&bars))
        .bar_width(10)
        .bar_gap(2)
        .value_style(Style::default().fg(Color::Black).bg(Color::White));

    f.render_widget(chart, area);
}

fn render_trend(f: &mut Frame, area: Rect, app: &App) {
    let analytics = match &app.analytics {
        Ok(analytics) => analytics,
        Err(message) => return render_sheet_error(f, area, "Company Revenue Trend", message),
    };

    let wide = &analytics.report.wide;
    let series: Vec<(String, Vec<(f64, f64)>)> = wide
        .companies
        .iter()
        .filter_map(|company| wide.series(company).map(|points| (company.clone(), points)))
        .collect();

    let (mut min_y, mut max_y) = series
        .iter()
        .flat_map(|(_, points)| points.iter().map(|(_, y)| *y))
        .fold((0.0_f64, 0.0_f64), |(lo, hi), y| (lo.min(y), hi.max(y)));
    if (max_y - min_y).abs() < f64::EPSILON {
        min_y -= 1.0;
        max_y += 1.0;
    }

    let datasets: Vec<Dataset> = series
        .iter()
        .enumerate()
        .map(|(i, (company, points))| {
            Dataset::default()
                .name(company.clone())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(points)
        })
        .collect();

    let x_labels = vec![
        Span::raw(Month::January.label()),
        Span::raw(Month::June.label()),
        Span::raw(Month::December.label()),
    ];
    let y_labels = vec![
        Span::raw(format_millions(min_y)),
        Span::raw(format_millions((min_y + max_y) / 2.0)),
        Span::raw(format_millions(max_y)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Company Revenue Trend "),
        )
        .x_axis(
            Axis::default()
                .title("月份")
                .style(Style::default().fg(Color::Gray))
                .bounds([1.0, 12.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("公司")
                .style(Style::default().fg(Color::Gray))
                .bounds([min_y, max_y])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    match app.current_page {
        Page::Converter => {
            status_spans.push(Span::styled(" Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Convert | "));
            status_spans.push(Span::styled("Backspace", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Delete | "));
        }
        Page::RawData => {
            let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);
            status_spans.push(Span::styled(
                format!(" Row: {}/{} ", selected, app.row_count()),
                Style::default().fg(Color::Cyan),
            ));
            status_spans.push(Span::raw(" | "));
            status_spans.push(Span::styled("↑/↓", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Nav | "));
        }
        Page::Totals | Page::Trend => {
            if let Ok(analytics) = &app.analytics {
                let digest = analytics.report.digest();
                status_spans.push(Span::styled(
                    format!(" Digest: {} ", &digest[..12]),
                    Style::default().fg(Color::Cyan),
                ));
                status_spans.push(Span::raw(" | "));
            }
        }
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Page | "));
    if app.current_page != Page::Converter {
        status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
        status_spans.push(Span::raw("/"));
    }
    status_spans.push(Span::styled("Esc", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmb_dashboard::{reshape_revenue, CompanyRevenueRow};

    fn sample_analytics() -> Analytics {
        let rows = vec![
            CompanyRevenueRow::new("甲公司", 12.0, [1.0; 12]),
            CompanyRevenueRow::new("乙公司", 24.0, [2.0; 12]),
        ];
        let report = reshape_revenue(&rows).unwrap();
        Analytics { rows, report }
    }

    #[test]
    fn test_page_cycle() {
        let mut page = Page::Converter;
        for _ in 0..Page::ALL.len() {
            page = page.next();
        }
        assert_eq!(page, Page::Converter);
        assert_eq!(Page::Converter.previous(), Page::Trend);
    }

    #[test]
    fn test_convert_updates_result() {
        let mut app = App::new(DashboardContext::default(), Err("none".to_string()));
        app.input = "100000005".to_string();
        app.convert();
        assert_eq!(app.result, Some(Ok("壹亿零伍".to_string())));

        app.input = "abc".to_string();
        app.convert();
        assert!(matches!(app.result, Some(Err(_))));
    }

    #[test]
    fn test_convert_rejects_surrounding_whitespace() {
        let mut app = App::new(DashboardContext::default(), Err("none".to_string()));
        app.input = " 12".to_string();
        app.convert();
        assert_eq!(
            app.result,
            Some(Err("Please enter a valid positive integer.".to_string()))
        );
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = App::new(DashboardContext::default(), Ok(sample_analytics()));
        assert_eq!(app.state.selected(), Some(0));
        app.next();
        assert_eq!(app.state.selected(), Some(1));
        app.next();
        assert_eq!(app.state.selected(), Some(0));
        app.previous();
        assert_eq!(app.state.selected(), Some(1));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("甲乙丙丁", 10), "甲乙丙丁");
        assert_eq!(truncate("甲乙丙丁", 3), "甲乙…");
    }
}
