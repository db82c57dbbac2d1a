use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::{debug, error, LevelFilter};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    DefaultTerminal, Frame,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::interval;
use uz_customs_fees::prelude::*;
use uz_customs_fees::validation::{check_bhm, RATE_TTL_MINUTES};
use uz_customs_fees::FeeSummary;

mod cli;
mod config;
mod form;
mod format;
mod widgets;

use cli::Command;
use config::{default_config_path, default_log_path, load_config, save_config, FeeConfig};
use form::{Forms, Tab};
use widgets::*;

#[derive(Debug, Clone, PartialEq)]
pub enum PopupType {
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    Field(usize),
    Bhm,
    Rate,
}

#[derive(Parser, Debug)]
#[clap(version, about)]
struct Args {
    /// Verbose logging (to ~/.customs-fees.log while the TUI runs)
    #[arg(short = 'v')]
    verbose: bool,

    /// Base calculation unit in so'm; saved to the config file
    #[arg(short = 'b', long = "bhm")]
    bhm: Option<f64>,

    /// USD rate in so'm, skips the central bank lookup
    #[arg(short = 'r', long = "rate")]
    rate: Option<f64>,

    /// Never contact the central bank; use the fallback rate
    #[arg(long)]
    offline: bool,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

fn init_logging(verbose: bool, to_file: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env();

    if to_file {
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(default_log_path())
        {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(_) => {
                // The TUI owns the terminal; without a log file stay quiet.
                builder.filter_level(LevelFilter::Off);
            }
        }
    }

    builder.init();
}

fn rate_cache(config: &FeeConfig) -> CachedRateProvider<CbuRateProvider> {
    let (min_ttl, max_ttl) = RATE_TTL_MINUTES;
    CachedRateProvider::new(
        CbuRateProvider::with_endpoint(config.rate_endpoint.clone()),
        chrono::Duration::minutes(config.rate_ttl_minutes.clamp(min_ttl, max_ttl)),
        config.fallback_rate,
    )
}

pub struct AppState {
    pub evaluator: FeeEvaluator,
    pub config: FeeConfig,
    pub config_path: PathBuf,
    pub bhm: f64,
    pub rates: CachedRateProvider<CbuRateProvider>,
    pub manual_rate: Option<f64>,
    pub offline: bool,
    pub forms: Forms,
    pub active_tab: Tab,
    pub selected_field: usize,
    pub editing: Option<(EditTarget, String)>,
    pub is_loading: bool,
    pub spinner_state: usize,
    pub last_update: Option<DateTime<Utc>>,
    pub status_message: Option<String>,
    pub active_popup: Option<PopupType>,
}

impl AppState {
    fn new(config: FeeConfig, config_path: PathBuf, manual_rate: Option<f64>, offline: bool) -> Self {
        Self {
            evaluator: FeeEvaluator::new(),
            bhm: config.bhm,
            rates: rate_cache(&config),
            config,
            config_path,
            manual_rate,
            offline,
            forms: Forms::default(),
            active_tab: Tab::Declaration,
            selected_field: 0,
            editing: None,
            is_loading: false,
            spinner_state: 0,
            last_update: None,
            status_message: None,
            active_popup: None,
        }
    }

    fn update_spinner(&mut self) {
        self.spinner_state = (self.spinner_state + 1) % 10;
    }

    pub fn get_spinner_char(&self) -> char {
        match self.spinner_state {
            0 => '⠋',
            1 => '⠙',
            2 => '⠹',
            3 => '⠸',
            4 => '⠼',
            5 => '⠴',
            6 => '⠦',
            7 => '⠧',
            8 => '⠇',
            9 => '⠏',
            _ => '⠋',
        }
    }

    /// The rate used for conversions: the user's own entry wins over the cache.
    pub fn exchange_rate(&self) -> ExchangeRate {
        match self.manual_rate {
            Some(rate) => ExchangeRate::fallback(rate),
            None => self.rates.peek(),
        }
    }

    pub fn rate_source(&self) -> &'static str {
        if self.manual_rate.is_some() {
            "manual"
        } else if self.exchange_rate().is_live() {
            "central bank"
        } else if self.offline {
            "offline fallback"
        } else {
            "fallback"
        }
    }

    pub fn current_command(&self) -> Option<FeeCommand> {
        self.forms.get(self.active_tab).map(|form| form.command())
    }

    pub fn current_summary(&self) -> Option<Result<FeeSummary, FeeError>> {
        self.current_command().map(|command| {
            self.evaluator
                .summarize(&command, self.bhm, &self.exchange_rate())
        })
    }

    /// Fee as a percentage of the goods' value in so'm, for declarations only.
    pub fn fee_share_of_value(&self) -> Option<f64> {
        if self.active_tab != Tab::Declaration {
            return None;
        }
        let summary = self.current_summary()?.ok()?;
        let value = self.evaluator.goods_value_local(
            self.forms.declaration.customs_value_usd(),
            summary.exchange_rate().rate(),
        );
        if value > 0.0 {
            Some(summary.total() / value * 100.0)
        } else {
            None
        }
    }

    pub fn field_count(&self) -> usize {
        self.forms
            .get(self.active_tab)
            .map(|form| form.fields().len())
            .unwrap_or(0)
    }

    fn switch_tab(&mut self, tab: Tab) {
        self.active_tab = tab;
        self.selected_field = 0;
        self.editing = None;
    }

    fn move_selection(&mut self, delta: i32) {
        let count = self.field_count() as i32;
        if count == 0 {
            return;
        }
        self.selected_field = (self.selected_field as i32 + delta).rem_euclid(count) as usize;
    }

    fn adjust_selected(&mut self, steps: i32) {
        let index = self.selected_field;
        if let Some(form) = self.forms.get_mut(self.active_tab) {
            form.adjust(index, steps);
        }
    }

    fn start_edit(&mut self, target: EditTarget, first: Option<char>) {
        if let EditTarget::Field(index) = target {
            let numeric = self
                .forms
                .get(self.active_tab)
                .and_then(|form| form.fields().get(index).map(|f| f.numeric))
                .unwrap_or(false);
            if !numeric {
                return;
            }
        }
        self.editing = Some((target, first.map(String::from).unwrap_or_default()));
    }

    fn commit_edit(&mut self) {
        let Some((target, buffer)) = self.editing.take() else {
            return;
        };
        let buffer = buffer.trim().replace(',', "");

        if target == EditTarget::Rate && buffer.is_empty() {
            self.manual_rate = None;
            self.status_message = Some("Using the central bank rate".to_string());
            return;
        }

        let value = match buffer.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.status_message = Some(format!("'{}' is not a number", buffer));
                return;
            }
        };

        match target {
            EditTarget::Field(index) => {
                if let Some(form) = self.forms.get_mut(self.active_tab) {
                    if !form.set_number(index, value) {
                        self.status_message = Some(format!("{} is not valid here", value));
                    }
                }
            }
            EditTarget::Bhm => self.bhm = value,
            EditTarget::Rate => self.manual_rate = Some(value),
        }
    }

    fn request_rate_refresh(&mut self) {
        if self.offline {
            self.status_message = Some("Offline: rate lookup disabled".to_string());
        } else if self.is_loading {
            self.status_message = Some("Rate lookup already running".to_string());
        } else {
            debug!("Manual rate refresh requested");
            self.manual_rate = None;
            self.rates.invalidate();
        }
    }

    fn save_settings(&mut self) {
        if let Err(e) = check_bhm(self.bhm) {
            self.status_message = Some(format!("Not saved: {}", e));
            return;
        }
        self.config.bhm = self.bhm;
        self.status_message = match save_config(&self.config_path, &self.config) {
            Ok(()) => Some(format!("Saved to {}", self.config_path.display())),
            Err(e) => Some(format!("Could not save config: {}", e)),
        };
    }
}

pub struct App {
    state: Arc<Mutex<AppState>>,
    exit: bool,
}

impl App {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            exit: false,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let state_clone = Arc::clone(&self.state);

        tokio::spawn(async move {
            let mut interval = interval(Duration::from_secs(1));
            loop {
                interval.tick().await;

                let provider = match state_clone.lock() {
                    Ok(mut state) => {
                        if state.offline || !state.rates.needs_refresh(Utc::now()) {
                            None
                        } else {
                            state.is_loading = true;
                            Some(state.rates.inner().clone())
                        }
                    }
                    Err(_) => None,
                };

                let Some(provider) = provider else {
                    continue;
                };

                let result = tokio::task::spawn_blocking(move || provider.fetch()).await;

                if let Ok(mut state) = state_clone.lock() {
                    match result {
                        Ok(fetched) => {
                            state.rates.record(fetched, Utc::now());
                            state.last_update = Some(Utc::now());
                        }
                        Err(e) => error!("Rate fetch task failed: {}", e),
                    }
                    state.is_loading = false;
                }
            }
        });

        let mut tick_interval = interval(Duration::from_millis(100));

        loop {
            tokio::select! {
                _ = tick_interval.tick() => {
                    if let Ok(mut state) = self.state.lock() {
                        state.update_spinner();
                    }

                    terminal.draw(|frame| self.draw(frame))?;
                }

                _ = async {
                    if event::poll(Duration::from_millis(0)).unwrap_or(false) {
                        if let Ok(event) = event::read() {
                            self.handle_event(event);
                        }
                    }
                } => {}
            }

            if self.exit {
                break;
            }
        }

        Ok(())
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
            ])
            .split(area);

        if let Ok(state) = self.state.lock() {
            HeaderWidget::render(frame, chunks[0], &state);
            TabsWidget::render(frame, chunks[1], &state);
            ProgressBarsWidget::render(frame, chunks[2], &state);

            if state.active_tab == Tab::Tariffs {
                TariffsWidget::render(frame, chunks[3], &state);
            } else {
                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
                    .split(chunks[3]);
                InputsWidget::render(frame, body[0], &state);
                BreakdownWidget::render(frame, body[1], &state);
            }

            ShortcutsWidget::render(frame, chunks[4], &state);

            if let Some(PopupType::Help) = &state.active_popup {
                PopupWidget::render(frame, area, &state);
            }
        }
    }

    fn handle_event(&mut self, event: Event) {
        let Event::Key(key_event) = event else {
            return;
        };
        if key_event.kind != KeyEventKind::Press {
            return;
        }

        let Ok(mut state) = self.state.lock() else {
            return;
        };

        if state.editing.is_some() {
            match key_event.code {
                KeyCode::Enter => state.commit_edit(),
                KeyCode::Esc => state.editing = None,
                KeyCode::Backspace => {
                    if let Some((_, buffer)) = state.editing.as_mut() {
                        buffer.pop();
                    }
                }
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == ',' => {
                    if let Some((_, buffer)) = state.editing.as_mut() {
                        buffer.push(c);
                    }
                }
                _ => {}
            }
            return;
        }

        if state.active_popup.is_some() {
            if matches!(key_event.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                state.active_popup = None;
            }
            return;
        }

        state.status_message = None;
        match key_event.code {
            KeyCode::Char('q') => self.exit = true,
            KeyCode::Tab => {
                let next = state.active_tab.next();
                state.switch_tab(next);
            }
            KeyCode::BackTab => {
                let previous = state.active_tab.previous();
                state.switch_tab(previous);
            }
            KeyCode::Up => state.move_selection(-1),
            KeyCode::Down => state.move_selection(1),
            KeyCode::Left | KeyCode::Char('-') => state.adjust_selected(-1),
            KeyCode::Right | KeyCode::Char('+') | KeyCode::Char(' ') => state.adjust_selected(1),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                let index = state.selected_field;
                state.start_edit(EditTarget::Field(index), Some(c));
            }
            KeyCode::Enter => {
                let index = state.selected_field;
                state.start_edit(EditTarget::Field(index), None);
            }
            KeyCode::Char('b') => state.start_edit(EditTarget::Bhm, None),
            KeyCode::Char('u') => state.start_edit(EditTarget::Rate, None),
            KeyCode::Char('r') => state.request_rate_refresh(),
            KeyCode::Char('s') => state.save_settings(),
            KeyCode::Char('?') => state.active_popup = Some(PopupType::Help),
            _ => {}
        }
    }
}

fn resolve_rate(
    mut rates: CachedRateProvider<CbuRateProvider>,
    manual_rate: Option<f64>,
    offline: bool,
) -> ExchangeRate {
    if let Some(rate) = manual_rate {
        return ExchangeRate::fallback(rate);
    }
    if offline {
        return rates.peek();
    }
    let rate = rates.current(Utc::now());
    if let Some(error) = rates.last_error() {
        eprintln!("Warning: central bank rate unavailable ({}), using fallback", error);
    }
    rate
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.command.is_none());

    let config_path = args.config.clone().unwrap_or_else(default_config_path);
    let mut config = load_config(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: {:#}, using defaults", e);
        FeeConfig::default()
    });

    // An explicitly passed BHM becomes the new default
    if let Some(bhm) = args.bhm {
        config.bhm = check_bhm(bhm).context("Invalid --bhm, config left unchanged")?;
        if let Err(e) = save_config(&config_path, &config) {
            eprintln!("Warning: Could not save config: {}", e);
        }
    }

    match args.command {
        Some(command) => {
            let evaluator = FeeEvaluator::new();
            let rates = rate_cache(&config);
            let manual_rate = args.rate;
            let offline = args.offline;
            let rate = tokio::task::spawn_blocking(move || resolve_rate(rates, manual_rate, offline))
                .await
                .context("Rate lookup task failed")?;

            cli::run(&command, &evaluator, config.bhm, &rate, args.json)
        }
        None => {
            let state = AppState::new(config, config_path, args.rate, args.offline);

            let mut terminal = ratatui::init();
            let mut app = App::new(state);

            let result = app.run(&mut terminal).await;

            ratatui::restore();

            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_in(dir: &tempfile::TempDir) -> AppState {
        AppState::new(
            FeeConfig::default(),
            dir.path().join("settings.json"),
            None,
            false,
        )
    }

    #[test]
    fn test_out_of_range_bhm_is_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);

        state.bhm = 5.0;
        state.save_settings();
        assert!(!state.config_path.exists());
        assert_eq!(state.config.bhm, DEFAULT_BHM);

        state.bhm = 375_000.0;
        state.save_settings();
        assert_eq!(load_config(&state.config_path).unwrap().bhm, 375_000.0);
    }

    #[test]
    fn test_refresh_is_ignored_while_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_in(&dir);
        let now = Utc::now();
        state.rates.record(Ok(ExchangeRate::fallback(12_800.0)), now);

        state.is_loading = true;
        state.request_rate_refresh();
        assert!(!state.rates.needs_refresh(now));

        state.is_loading = false;
        state.request_rate_refresh();
        assert!(state.rates.needs_refresh(now));
    }
}
