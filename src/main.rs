use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;
mod error;
mod fetcher;
mod hn_client;
mod models;
mod search_cache;
mod session;
mod sort_view;

use crate::config::Config;
use crate::fetcher::FetchWorker;
use crate::hn_client::AlgoliaClient;
use crate::models::StoryHit;
use crate::session::SearchSession;
use crate::sort_view::SortKey;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();

    let config = Config::parse();
    config.validate()?;

    let client = AlgoliaClient::new(&config).context("failed to build HTTP client")?;
    info!(api_base = %config.api_base, hits_per_page = config.hits_per_page, "starting search browser");

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1100.0, 780.0])
            .with_min_inner_size([720.0, 480.0])
            .with_title("HN Search Browser"),
        ..Default::default()
    };

    let initial_query = config.query.clone();
    eframe::run_native(
        "HN Search Browser",
        options,
        Box::new(move |cc| {
            let mut app = SearchBrowserApp::new(Arc::new(client), initial_query);

            // Restore the saved theme preference
            if let Some(storage) = cc.storage {
                if let Some(is_dark_mode) = storage
                    .get_string("is_dark_mode")
                    .and_then(|value| value.parse::<bool>().ok())
                {
                    app.set_dark_mode(is_dark_mode);
                }
            }

            app.submit_search();
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("failed to run the browser window: {}", e))
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error: Color32,
    points_hot: Color32,
    points_warm: Color32,
    points_cold: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(18, 18, 18),
            card_background: Color32::from_rgb(30, 30, 30),
            text: Color32::from_rgb(240, 240, 240),
            secondary_text: Color32::from_rgb(180, 180, 180),
            highlight: Color32::from_rgb(255, 102, 0), // HN orange
            separator: Color32::from_rgb(60, 60, 60),
            error: Color32::from_rgb(239, 83, 80),
            points_hot: Color32::from_rgb(102, 187, 106),
            points_warm: Color32::from_rgb(77, 182, 172),
            points_cold: Color32::from_rgb(144, 164, 174),
            button_background: Color32::from_rgb(66, 66, 66),
            button_foreground: Color32::from_rgb(240, 240, 240),
            button_active_background: Color32::from_rgb(255, 102, 0),
            button_hover_background: Color32::from_rgb(80, 80, 80),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(245, 245, 245),
            card_background: Color32::from_rgb(255, 255, 255),
            text: Color32::from_rgb(20, 20, 20),
            secondary_text: Color32::from_rgb(90, 90, 90),
            highlight: Color32::from_rgb(235, 92, 0),
            separator: Color32::from_rgb(200, 200, 200),
            error: Color32::from_rgb(198, 40, 40),
            points_hot: Color32::from_rgb(46, 125, 50),
            points_warm: Color32::from_rgb(0, 121, 107),
            points_cold: Color32::from_rgb(84, 110, 122),
            button_background: Color32::from_rgb(235, 235, 235),
            button_foreground: Color32::from_rgb(20, 20, 20),
            button_active_background: Color32::from_rgb(235, 92, 0),
            button_hover_background: Color32::from_rgb(210, 210, 210),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.widgets.noninteractive.bg_fill = self.card_background;
        style.visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);

        style.visuals.widgets.inactive.bg_fill = self.button_background;
        style.visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.active.bg_fill = self.button_active_background;
        style.visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        style.visuals.widgets.hovered.bg_fill = self.button_hover_background;
        style.visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.widgets.noninteractive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.inactive.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.hovered.corner_radius = CornerRadius::same(4);
        style.visuals.widgets.active.corner_radius = CornerRadius::same(4);

        ctx.set_style(style);
    }

    // Negative points only show up on flagged stories.
    fn points_color(&self, points: i64) -> Color32 {
        match points {
            i64::MIN..=-1 => self.error,
            0..=49 => self.points_cold,
            50..=499 => self.points_warm,
            _ => self.points_hot,
        }
    }
}

struct SearchBrowserApp {
    session: SearchSession,
    worker: FetchWorker,
    theme: AppTheme,
    is_dark_mode: bool,
    // Row and header clicks are applied after the table is drawn
    pending_dismiss: Option<String>,
    pending_sort: Option<SortKey>,
}

impl SearchBrowserApp {
    fn new(source: Arc<AlgoliaClient>, initial_query: String) -> Self {
        Self {
            session: SearchSession::new(initial_query),
            worker: FetchWorker::new(source),
            theme: AppTheme::dark(),
            is_dark_mode: true,
            pending_dismiss: None,
            pending_sort: None,
        }
    }

    fn set_dark_mode(&mut self, is_dark_mode: bool) {
        self.is_dark_mode = is_dark_mode;
        self.theme = if is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn toggle_theme(&mut self) {
        self.set_dark_mode(!self.is_dark_mode);
    }

    fn submit_search(&mut self) {
        if let Some(ticket) = self.session.submit() {
            self.worker.spawn(ticket);
        }
    }

    fn load_more_stories(&mut self) {
        if let Some(ticket) = self.session.request_more() {
            self.worker.spawn(ticket);
        }
    }

    fn apply_fetch_outcomes(&mut self) {
        for outcome in self.worker.drain() {
            self.session.complete_fetch(outcome.ticket, outcome.result);
        }
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(url, error = %e, "failed to open URL");
        }
    }

    fn process_keyboard_shortcuts(&mut self, ctx: &egui::Context) {
        let (more, theme) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::M),
                i.modifiers.command && i.key_pressed(egui::Key::T),
            )
        });

        if more && self.session.last_error().is_none() {
            self.load_more_stories();
        }
        if theme {
            self.toggle_theme();
        }
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading(
                RichText::new("HN Search")
                    .color(self.theme.highlight)
                    .size(24.0),
            );
            ui.add_space(20.0);

            let mut input = self.session.input().to_string();
            let response = ui.add(
                egui::TextEdit::singleline(&mut input)
                    .hint_text("Search stories")
                    .desired_width(320.0),
            );
            if response.changed() {
                self.session.set_input(input);
            }
            let enter_pressed =
                response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            let search_btn = ui.add(
                egui::Button::new(RichText::new("Search").color(self.theme.button_foreground))
                    .corner_radius(CornerRadius::same(6))
                    .fill(self.theme.button_background),
            );
            if search_btn.clicked() || enter_pressed {
                self.submit_search();
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "☀" } else { "☾" };
                let theme_btn = ui
                    .add(
                        egui::Button::new(
                            RichText::new(theme_icon)
                                .color(self.theme.button_foreground)
                                .size(20.0),
                        )
                        .min_size(egui::Vec2::new(32.0, 32.0))
                        .corner_radius(CornerRadius::same(16))
                        .fill(self.theme.button_background),
                    )
                    .on_hover_text(if self.is_dark_mode {
                        "Switch to Light Mode"
                    } else {
                        "Switch to Dark Mode"
                    });
                if theme_btn.clicked() {
                    self.toggle_theme();
                    ui.ctx().request_repaint();
                }

                if let Some(entry) = self.session.active_entry() {
                    ui.add_space(12.0);
                    ui.label(
                        RichText::new(format!(
                            "{} stories for \"{}\"",
                            entry.len(),
                            self.session.active_term()
                        ))
                        .color(self.theme.secondary_text),
                    )
                    .on_hover_text(format!(
                        "{} search terms cached",
                        self.session.cache().len()
                    ));
                }
            });
        });
    }

    fn render_sort_button(&mut self, ui: &mut Ui, column: SortKey) {
        let state = self.session.sort_state();
        let is_active = state.key == column;

        let label = if is_active {
            let arrow = if state.is_ascending() { "▲" } else { "▼" };
            format!("{} {}", column.label(), arrow)
        } else {
            column.label().to_string()
        };
        let (fill, color) = if is_active {
            (self.theme.button_active_background, self.theme.button_foreground)
        } else {
            (self.theme.button_background, self.theme.secondary_text)
        };

        let button = ui.add(
            egui::Button::new(RichText::new(label).color(color).strong())
                .corner_radius(CornerRadius::same(4))
                .fill(fill),
        );
        if button.clicked() {
            self.pending_sort = Some(column);
        }
    }

    fn render_story_row(&mut self, ui: &mut Ui, story: &StoryHit) {
        let title = ui
            .add(
                egui::Label::new(RichText::new(&story.title).color(self.theme.text).strong())
                    .sense(egui::Sense::click()),
            )
            .on_hover_cursor(egui::CursorIcon::PointingHand);
        if title.clicked() && !story.url.is_empty() {
            self.open_link(&story.url);
        }

        ui.label(RichText::new(&story.author).color(self.theme.secondary_text));
        ui.label(RichText::new(story.num_comments.to_string()).color(self.theme.text));
        ui.label(
            RichText::new(story.points.to_string())
                .color(self.theme.points_color(story.points))
                .strong(),
        );

        let dismiss_btn = ui.add(
            egui::Button::new(RichText::new("Dismiss").color(self.theme.button_foreground))
                .corner_radius(CornerRadius::same(6))
                .fill(self.theme.button_background),
        );
        if dismiss_btn.clicked() {
            self.pending_dismiss = Some(story.id.clone());
        }
        ui.end_row();
    }

    fn render_stories_table(&mut self, ui: &mut Ui) {
        let stories = self.session.display_list();

        ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            egui::Grid::new("stories_table")
                .num_columns(5)
                .striped(true)
                .spacing([16.0, 8.0])
                .show(ui, |ui| {
                    for column in SortKey::COLUMNS {
                        self.render_sort_button(ui, column);
                    }
                    ui.label(RichText::new("Archive").color(self.theme.secondary_text).strong());
                    ui.end_row();

                    for story in &stories {
                        self.render_story_row(ui, story);
                    }
                });

            if stories.is_empty() && !self.session.is_loading() {
                ui.add_space(20.0);
                ui.vertical_centered(|ui| {
                    ui.label(
                        RichText::new("No stories to show.")
                            .color(self.theme.secondary_text)
                            .italics(),
                    );
                });
            }
        });
    }

    fn render_error(&self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(40.0);
            ui.label(
                RichText::new("Something went wrong.")
                    .color(self.theme.error)
                    .size(20.0)
                    .strong(),
            );
            if let Some(err) = self.session.last_error() {
                ui.add_space(8.0);
                ui.label(RichText::new(err.message()).color(self.theme.secondary_text));
            }
            ui.add_space(8.0);
            ui.label(
                RichText::new("Submit a search to try again.").color(self.theme.secondary_text),
            );
        });
    }

    fn render_footer(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            if self.session.is_loading() {
                ui.spinner();
                ui.label(RichText::new("Loading ...").color(self.theme.secondary_text));
                if ui.button("Cancel").clicked() {
                    self.session.cancel_pending();
                }
            } else if self.session.last_error().is_none() && !self.session.active_term().is_empty()
            {
                let more_btn = ui.add(
                    egui::Button::new(
                        RichText::new("More stories").color(self.theme.button_foreground),
                    )
                    .corner_radius(CornerRadius::same(6))
                    .fill(self.theme.button_background),
                );
                if more_btn.clicked() {
                    self.load_more_stories();
                }
                ui.label(
                    RichText::new(format!("page {}", self.session.current_page().saturating_add(1)))
                        .color(self.theme.secondary_text),
                );
            }
        });
    }
}

impl eframe::App for SearchBrowserApp {
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);
        self.apply_fetch_outcomes();
        self.process_keyboard_shortcuts(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            self.render_header(ui);
            ui.add_space(6.0);
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            ui.add_space(6.0);
            self.render_footer(ui);
            ui.add_space(6.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if self.session.last_error().is_some() {
                self.render_error(ui);
            } else {
                self.render_stories_table(ui);
            }
        });

        if let Some(column) = self.pending_sort.take() {
            self.session.toggle_sort(column);
        }
        if let Some(id) = self.pending_dismiss.take() {
            self.session.dismiss(&id);
        }

        // Keep polling the worker channel while fetches are outstanding
        if self.session.has_pending() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_scale_covers_flagged_and_popular_hits() {
        for theme in [AppTheme::dark(), AppTheme::light()] {
            assert_eq!(theme.points_color(-4), theme.error);
            assert_eq!(theme.points_color(0), theme.points_cold);
            assert_eq!(theme.points_color(49), theme.points_cold);
            assert_eq!(theme.points_color(50), theme.points_warm);
            assert_eq!(theme.points_color(499), theme.points_warm);
            assert_eq!(theme.points_color(500), theme.points_hot);
        }
    }
}
