use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use cpf_registry::classifier::{StyleToken, TierSummary};
use cpf_registry::formatter::{format_identifier, format_phone};
use cpf_registry::record::{Record, RecordDraft};
use cpf_registry::report::{export_registry, format_brl, format_date};
use cpf_registry::Registry;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

/// Input length limits of the masked fields
const CPF_MAX_LEN: usize = 14;
const PHONE_MAX_LEN: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Search,
    Register,
    List,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Search => Page::Register,
            Page::Register => Page::List,
            Page::List => Page::Search,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Search => Page::List,
            Page::Register => Page::Search,
            Page::List => Page::Register,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Search => "Consultar CPF",
            Page::Register => "Cadastrar",
            Page::List => "Base de Dados",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    GuardianName,
    Cpf,
    BirthDate,
    Address,
    Email,
    Phone,
    Income,
}

impl FormField {
    pub const ALL: [FormField; 8] = [
        FormField::Name,
        FormField::GuardianName,
        FormField::Cpf,
        FormField::BirthDate,
        FormField::Address,
        FormField::Email,
        FormField::Phone,
        FormField::Income,
    ];

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.position() + 1) % Self::ALL.len()]
    }

    pub fn previous(&self) -> Self {
        Self::ALL[(self.position() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::Name => "Nome Completo",
            FormField::GuardianName => "Nome da Mãe",
            FormField::Cpf => "CPF",
            FormField::BirthDate => "Data de Nascimento",
            FormField::Address => "Endereço",
            FormField::Email => "Email",
            FormField::Phone => "Telefone",
            FormField::Income => "Renda Mensal (R$)",
        }
    }

    pub fn placeholder(&self) -> &str {
        match self {
            FormField::Name => "Digite o nome completo",
            FormField::GuardianName => "Digite o nome da mãe",
            FormField::Cpf => "000.000.000-00",
            FormField::BirthDate => "AAAA-MM-DD",
            FormField::Address => "Rua, número, bairro, cidade - UF",
            FormField::Email => "email@exemplo.com",
            FormField::Phone => "(00) 00000-0000",
            FormField::Income => "0,00",
        }
    }

    fn value<'a>(&self, draft: &'a RecordDraft) -> &'a str {
        match self {
            FormField::Name => &draft.name,
            FormField::GuardianName => &draft.guardian_name,
            FormField::Cpf => &draft.cpf,
            FormField::BirthDate => &draft.birth_date,
            FormField::Address => &draft.address,
            FormField::Email => &draft.email,
            FormField::Phone => &draft.phone,
            FormField::Income => &draft.income,
        }
    }

    fn value_mut<'a>(&self, draft: &'a mut RecordDraft) -> &'a mut String {
        match self {
            FormField::Name => &mut draft.name,
            FormField::GuardianName => &mut draft.guardian_name,
            FormField::Cpf => &mut draft.cpf,
            FormField::BirthDate => &mut draft.birth_date,
            FormField::Address => &mut draft.address,
            FormField::Email => &mut draft.email,
            FormField::Phone => &mut draft.phone,
            FormField::Income => &mut draft.income,
        }
    }

    fn accepts(&self, c: char) -> bool {
        match self {
            FormField::BirthDate => c.is_ascii_digit() || c == '-',
            FormField::Income => c.is_ascii_digit() || c == '.' || c == ',',
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

pub struct App {
    pub registry: Registry,
    pub current_page: Page,
    pub search_input: String,
    pub search_result: Option<Record>,
    pub draft: RecordDraft,
    pub focused_field: FormField,
    pub list_state: TableState,
    pub show_detail: bool,
    pub status: Option<StatusMessage>,
    pub export_dir: PathBuf,
}

/// Re-apply a mask after an edit, honoring the field's max length
fn masked_edit(current: &str, edited: String, max_len: usize, mask: fn(&str) -> String) -> String {
    let masked = mask(&edited);
    if masked.chars().count() > max_len {
        current.to_string()
    } else {
        masked
    }
}

impl App {
    pub fn new(registry: Registry, export_dir: PathBuf) -> Self {
        let mut list_state = TableState::default();
        if !registry.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            registry,
            current_page: Page::Search,
            search_input: String::new(),
            search_result: None,
            draft: RecordDraft::default(),
            focused_field: FormField::Name,
            list_state,
            show_detail: false,
            status: None,
            export_dir,
        }
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            kind,
            text: text.into(),
        });
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        self.show_detail = false;
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        self.show_detail = false;
    }

    // ------------------------------------------------------------------------
    // Text input
    // ------------------------------------------------------------------------

    pub fn input_char(&mut self, c: char) {
        match self.current_page {
            Page::Search => {
                let edited = format!("{}{}", self.search_input, c);
                self.search_input =
                    masked_edit(&self.search_input, edited, CPF_MAX_LEN, format_identifier);
            }
            Page::Register => {
                let field = self.focused_field;
                if !field.accepts(c) {
                    return;
                }
                let current = field.value(&self.draft).to_string();
                let edited = format!("{}{}", current, c);
                *field.value_mut(&mut self.draft) = match field {
                    FormField::Cpf => masked_edit(&current, edited, CPF_MAX_LEN, format_identifier),
                    FormField::Phone => masked_edit(&current, edited, PHONE_MAX_LEN, format_phone),
                    _ => edited,
                };
            }
            Page::List => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.current_page {
            Page::Search => {
                self.search_input.pop();
                self.search_input = format_identifier(&self.search_input);
            }
            Page::Register => {
                let field = self.focused_field;
                let value = field.value_mut(&mut self.draft);
                value.pop();
                match field {
                    FormField::Cpf => *value = format_identifier(value),
                    FormField::Phone => *value = format_phone(value),
                    _ => {}
                }
            }
            Page::List => {}
        }
    }

    // ------------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------------

    pub fn search(&mut self) {
        match self.registry.lookup(&self.search_input) {
            Ok(record) => {
                self.search_result = Some(record.clone());
                self.set_status(StatusKind::Info, "Dados encontrados");
            }
            Err(e) => {
                self.search_result = None;
                self.set_status(StatusKind::Error, e.to_string());
            }
        }
    }

    pub fn submit_register(&mut self) {
        match self.draft.to_record() {
            Ok(record) => {
                self.registry.append(record);
                self.draft.clear();
                self.focused_field = FormField::Name;
                if self.list_state.selected().is_none() {
                    self.list_state.select(Some(0));
                }
                self.set_status(StatusKind::Success, "Pessoa cadastrada com sucesso!");
            }
            Err(e) => self.set_status(StatusKind::Error, e.to_string()),
        }
    }

    pub fn export<Tz: TimeZone>(&mut self, generated_at: &DateTime<Tz>) {
        let artifact = match export_registry(&self.registry, generated_at) {
            Ok(artifact) => artifact,
            Err(e) => {
                self.set_status(StatusKind::Error, e.to_string());
                return;
            }
        };

        match artifact.save_in(&self.export_dir) {
            Ok(path) => self.set_status(
                StatusKind::Success,
                format!("Exportado: {}", path.display()),
            ),
            Err(e) => {
                tracing::error!("export write failed: {:#}", e);
                self.set_status(StatusKind::Error, format!("{:#}", e));
            }
        }
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.list_state
            .selected()
            .and_then(|i| self.registry.all().get(i))
    }

    pub fn toggle_detail(&mut self) {
        self.show_detail = !self.show_detail;
    }

    pub fn next(&mut self) {
        let len = self.registry.size();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.registry.size();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    /// Returns false when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if ctrl => return false,
            KeyCode::Char('e') if ctrl => self.export(&Local::now()),
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Enter => match self.current_page {
                Page::Search => self.search(),
                Page::Register => {
                    if self.focused_field == FormField::Income {
                        self.submit_register();
                    } else {
                        self.focused_field = self.focused_field.next();
                    }
                }
                Page::List => self.toggle_detail(),
            },
            KeyCode::Down => match self.current_page {
                Page::Register => self.focused_field = self.focused_field.next(),
                Page::List => self.next(),
                Page::Search => {}
            },
            KeyCode::Up => match self.current_page {
                Page::Register => self.focused_field = self.focused_field.previous(),
                Page::List => self.previous(),
                Page::Search => {}
            },
            KeyCode::Char('j') if self.current_page == Page::List => self.next(),
            KeyCode::Char('k') if self.current_page == Page::List => self.previous(),
            KeyCode::Char('e') if self.current_page == Page::List => self.export(&Local::now()),
            KeyCode::Char(c) if !ctrl => self.input_char(c),
            _ => {}
        }
        true
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

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if !app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn style_color(style: StyleToken) -> Color {
    match style {
        StyleToken::Success => Color::Green,
        StyleToken::Warning => Color::Yellow,
        StyleToken::Danger => Color::Red,
    }
}

fn badge(record: &Record) -> Span<'static> {
    let label = record.tier_label();
    Span::styled(
        format!(" {} ", label.text),
        Style::default()
            .fg(Color::White)
            .bg(style_color(label.style))
            .add_modifier(Modifier::BOLD),
    )
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
        Page::Search => render_search(f, chunks[1], app),
        Page::Register => render_register(f, chunks[1], app),
        Page::List => {
            if app.show_detail {
                let content_chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[1]);
                render_list(f, content_chunks[0], app);
                render_detail_panel(f, content_chunks[1], app.selected_record());
            } else {
                render_list(f, chunks[1], app);
            }
        }
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::styled(
        " Consulta CPF ",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];

    for page in [Page::Search, Page::Register, Page::List] {
        let title = if page == Page::List {
            format!(" {} ({}) ", page.title(), app.registry.size())
        } else {
            format!(" {} ", page.title())
        };
        let style = if page == app.current_page {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(title, style));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));
    f.render_widget(header, area);
}

fn field_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("  {}: ", label),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let input_text = if app.search_input.is_empty() {
        Span::styled("000.000.000-00", Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.search_input.clone(), Style::default().fg(Color::White))
    };
    let input = Paragraph::new(Line::from(input_text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Buscar Informações por CPF (Enter para consultar) "),
    );
    f.render_widget(input, chunks[0]);

    render_detail_panel(f, chunks[1], app.search_result.as_ref());
}

fn render_register(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![Line::from("")];

    for field in FormField::ALL {
        let focused = field == app.focused_field;
        let value = field.value(&app.draft);
        let marker = if focused { "▶ " } else { "  " };

        let value_span = if value.is_empty() {
            Span::styled(field.placeholder().to_string(), Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(value.to_string(), Style::default().fg(Color::White))
        };

        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{}{:<20}", marker, field.label()), label_style),
            value_span,
        ]));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "  ↑/↓ muda de campo · Enter no último campo cadastra",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Cadastrar Nova Pessoa "),
    );
    f.render_widget(form, area);
}

fn render_list(f: &mut Frame, area: Rect, app: &mut App) {
    let summary = TierSummary::from_records(app.registry.all());
    let title = format!(
        " {} pessoa(s) · Boa {} · Moderada {} · Ruim {} · e: exportar TXT ",
        app.registry.size(),
        summary.high,
        summary.medium,
        summary.low
    );

    if app.registry.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("  Nenhuma pessoa cadastrada ainda"),
            Line::from(Span::styled(
                "  Use a aba Cadastrar para adicionar pessoas",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(Block::default().borders(Borders::ALL).title(title));
        f.render_widget(empty, area);
        return;
    }

    let header = Row::new(vec!["Nome", "CPF", "Renda", "Análise"])
        .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows: Vec<Row> = app
        .registry
        .all()
        .iter()
        .map(|record| {
            let label = record.tier_label();
            Row::new(vec![
                Cell::from(record.name.clone()),
                Cell::from(record.display_identifier()),
                Cell::from(format_brl(record.income)),
                Cell::from(label.text).style(Style::default().fg(style_color(label.style))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(35),
            Constraint::Length(16),
            Constraint::Length(18),
            Constraint::Min(14),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(title))
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("▶ ");

    f.render_stateful_widget(table, area, &mut app.list_state);
}

fn render_detail_panel(f: &mut Frame, area: Rect, record: Option<&Record>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Dados Encontrados ");

    let record = match record {
        Some(record) => record,
        None => {
            let none = Paragraph::new("  Nenhum registro selecionado")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(none, area);
            return;
        }
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::raw("  "), badge(record)]),
        Line::from(""),
        field_line("NOME", record.name.clone()),
        field_line("MÃE", record.guardian_name.clone()),
        field_line("DATA DE NASCIMENTO", format_date(&record.birth_date)),
        field_line("CPF", record.display_identifier()),
        field_line("ENDEREÇO", record.address.clone()),
        field_line("EMAIL", record.email.clone()),
        field_line("TELEFONE", record.display_phone()),
        field_line("RENDA", format_brl(record.income)),
    ];

    f.render_widget(Paragraph::new(content).block(block), area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let line = match &app.status {
        Some(status) => {
            let color = match status.kind {
                StatusKind::Info => Color::Cyan,
                StatusKind::Success => Color::Green,
                StatusKind::Error => Color::Red,
            };
            Line::from(Span::styled(status.text.clone(), Style::default().fg(color)))
        }
        None => Line::from(Span::styled(
            "Tab/Shift+Tab: abas · Ctrl+E: exportar · Esc: sair",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let status_bar = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(status_bar, area);
}

// ============================================================================
// TESTS
// ============================================================================
