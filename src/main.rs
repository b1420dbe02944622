use eframe::egui;
use egui::{Color32, CornerRadius, RichText, ScrollArea, Stroke, Ui, ViewportBuilder};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, warn};

mod algolia;
mod db;
mod history;
mod models;
mod search;
mod store;

use crate::algolia::AlgoliaClient;
use crate::db::{KeyValueStore, MemoryStore, PersistedValue, SqliteStore};
use crate::models::SearchPage;
use crate::search::{SortKey, SortOrder, SortSpec};
use crate::store::{StoriesAction, StoriesState};

const SEARCH_KEY: &str = "search";
const DEFAULT_SEARCH_TERM: &str = "rust";

fn main() -> Result<(), eframe::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([700.0, 500.0])
            .with_title("Hacker Stories"),
        ..Default::default()
    };

    eframe::run_native(
        "Hacker Stories",
        options,
        Box::new(|cc| {
            let mut app = HackerStoriesApp::new();

            if let Some(storage) = cc.storage {
                // Restore the saved theme preference
                if let Some(theme_str) = storage.get_string("is_dark_mode") {
                    if let Ok(is_dark_mode) = theme_str.parse::<bool>() {
                        app.is_dark_mode = is_dark_mode;
                        app.theme = if is_dark_mode {
                            AppTheme::dark()
                        } else {
                            AppTheme::light()
                        };
                    }
                }
            }

            Ok(Box::new(app))
        }),
    )
}

struct AppTheme {
    background: Color32,
    card_background: Color32,
    text: Color32,
    secondary_text: Color32,
    highlight: Color32,
    separator: Color32,
    error: Color32,
    score_high: Color32,
    score_medium: Color32,
    score_low: Color32,
    button_background: Color32,
    button_foreground: Color32,
    button_active_background: Color32,
    button_hover_background: Color32,
}

impl AppTheme {
    fn dark() -> Self {
        Self {
            background: Color32::from_rgb(14, 15, 18),
            card_background: Color32::from_rgb(26, 28, 33),
            text: Color32::from_rgb(233, 234, 237),
            secondary_text: Color32::from_rgb(158, 162, 171),
            highlight: Color32::from_rgb(255, 110, 26), // HN-ish orange
            separator: Color32::from_rgb(52, 55, 62),
            error: Color32::from_rgb(240, 90, 82),
            score_high: Color32::from_rgb(110, 190, 112),
            score_medium: Color32::from_rgb(246, 196, 68),
            score_low: Color32::from_rgb(140, 144, 152),
            button_background: Color32::from_rgb(48, 52, 60),
            button_foreground: Color32::from_rgb(233, 234, 237),
            button_active_background: Color32::from_rgb(255, 110, 26),
            button_hover_background: Color32::from_rgb(64, 69, 79),
        }
    }

    fn light() -> Self {
        Self {
            background: Color32::from_rgb(249, 248, 245),
            card_background: Color32::from_rgb(255, 255, 254),
            text: Color32::from_rgb(28, 30, 34),
            secondary_text: Color32::from_rgb(98, 102, 110),
            highlight: Color32::from_rgb(209, 82, 10),
            separator: Color32::from_rgb(212, 210, 204),
            error: Color32::from_rgb(176, 42, 38),
            score_high: Color32::from_rgb(42, 118, 50),
            score_medium: Color32::from_rgb(168, 116, 8),
            score_low: Color32::from_rgb(104, 108, 114),
            button_background: Color32::from_rgb(234, 232, 227),
            button_foreground: Color32::from_rgb(28, 30, 34),
            button_active_background: Color32::from_rgb(209, 82, 10),
            button_hover_background: Color32::from_rgb(218, 216, 210),
        }
    }

    fn apply_to_ctx(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        style.visuals.panel_fill = self.background;
        style.visuals.window_fill = self.card_background;
        style.visuals.window_stroke = Stroke::new(1.0, self.separator);
        style.visuals.window_corner_radius = CornerRadius::same(8);
        style.visuals.menu_corner_radius = CornerRadius::same(6);

        let widgets = &mut style.visuals.widgets;
        widgets.noninteractive.bg_fill = self.card_background;
        widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text);
        widgets.inactive.bg_fill = self.button_background;
        widgets.inactive.fg_stroke = Stroke::new(1.0, self.button_foreground);
        widgets.active.bg_fill = self.button_active_background;
        widgets.active.fg_stroke = Stroke::new(1.0, self.button_foreground);
        widgets.hovered.bg_fill = self.button_hover_background;
        widgets.hovered.fg_stroke = Stroke::new(1.0, self.button_foreground);
        for widget in [
            &mut widgets.noninteractive,
            &mut widgets.inactive,
            &mut widgets.hovered,
            &mut widgets.active,
        ] {
            widget.corner_radius = CornerRadius::same(4);
        }

        style.visuals.selection.bg_fill = self.highlight;
        style.visuals.selection.stroke = Stroke::new(1.0, self.highlight);

        ctx.set_style(style);
    }

    fn points_color(&self, points: i64) -> Color32 {
        if points >= 300 {
            self.score_high
        } else if points >= 100 {
            self.score_medium
        } else {
            self.score_low
        }
    }
}

struct HackerStoriesApp {
    client: AlgoliaClient,
    stories: StoriesState,
    // Search input, persisted under the "search" key
    search_term: PersistedValue,
    // Client-side quick filter over the loaded list, never persisted
    filter_text: String,
    sort: SortSpec,
    // Every issued request URL, newest last; the recent-searches strip
    // is derived from this
    urls: Vec<String>,
    // All fetch workers send into this one channel. Responses are tagged
    // with the generation of the request that produced them; anything
    // older than the latest issue is dropped on receipt.
    fetch_generation: u64,
    fetch_tx: mpsc::Sender<(u64, anyhow::Result<SearchPage>)>,
    fetch_rx: mpsc::Receiver<(u64, anyhow::Result<SearchPage>)>,
    theme: AppTheme,
    is_dark_mode: bool,
    started: bool,
}

impl HackerStoriesApp {
    fn new() -> Self {
        let store: Arc<dyn KeyValueStore> = match SqliteStore::open_default() {
            Ok(store) => Arc::new(store),
            Err(e) => {
                warn!(error = %e, "settings database unavailable, search term will not persist");
                Arc::new(MemoryStore::default())
            }
        };

        Self::with_store(store)
    }

    fn with_store(store: Arc<dyn KeyValueStore>) -> Self {
        let search_term = PersistedValue::new(store, SEARCH_KEY, DEFAULT_SEARCH_TERM);
        let urls = vec![history::build_search_url(search_term.get(), 0)];
        let (fetch_tx, fetch_rx) = mpsc::channel();

        Self {
            client: AlgoliaClient::new(),
            stories: StoriesState::default(),
            search_term,
            filter_text: String::new(),
            sort: SortSpec::default(),
            urls,
            fetch_generation: 0,
            fetch_tx,
            fetch_rx,
            theme: AppTheme::dark(),
            is_dark_mode: true,
            started: false,
        }
    }

    fn dispatch(&mut self, action: StoriesAction) {
        self.stories = std::mem::take(&mut self.stories).reduce(action);
    }

    // Appends a request URL to the history and fetches it
    fn submit_search(&mut self, term: &str, page: u32) {
        let url = history::build_search_url(term, page);
        self.urls.push(url);
        self.start_fetch();
    }

    fn submit_search_input(&mut self) {
        let term = self.search_term.get().trim().to_string();
        if term.is_empty() {
            return;
        }
        self.submit_search(&term, 0);
    }

    fn handle_more(&mut self) {
        let Some(last_url) = self.urls.last() else {
            return;
        };
        let term = history::extract_search_term(last_url);
        self.submit_search(&term, self.stories.page + 1);
    }

    fn start_fetch(&mut self) {
        let Some(url) = self.urls.last().cloned() else {
            return;
        };

        self.fetch_generation += 1;
        let generation = self.fetch_generation;
        self.dispatch(StoriesAction::FetchInit);

        info!(%url, generation, "starting search fetch");

        let client = self.client.clone();
        let tx = self.fetch_tx.clone();
        thread::spawn(move || {
            let result = client.fetch(&url);
            // The app may have shut down and dropped the receiver
            let _ = tx.send((generation, result));
        });
    }

    fn poll_fetch(&mut self) {
        // Drain everything the workers delivered since the last frame;
        // slow responses from superseded requests land here too and are
        // recognized by their generation tag.
        while let Ok((generation, result)) = self.fetch_rx.try_recv() {
            if generation != self.fetch_generation {
                debug!(
                    generation,
                    latest = self.fetch_generation,
                    "dropping stale search response"
                );
                continue;
            }
            match result {
                Ok(page) => {
                    info!(hits = page.hits.len(), page = page.page, "search fetch done");
                    self.dispatch(StoriesAction::FetchSuccess {
                        list: page.hits,
                        page: page.page,
                    });
                }
                Err(e) => {
                    warn!(error = %e, "search fetch failed");
                    self.dispatch(StoriesAction::FetchFailure);
                }
            }
        }
    }

    fn open_link(&self, url: &str) {
        if let Err(e) = open::that(url) {
            warn!(%url, error = %e, "failed to open link in browser");
        }
    }

    fn toggle_theme(&mut self) {
        self.is_dark_mode = !self.is_dark_mode;
        self.theme = if self.is_dark_mode {
            AppTheme::dark()
        } else {
            AppTheme::light()
        };
    }

    fn render_header(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            let total_comments: i64 = self.stories.items.iter().map(|s| s.num_comments).sum();
            ui.heading(
                RichText::new(format!("Hacker Stories with {total_comments} comments"))
                    .color(self.theme.highlight)
                    .size(24.0),
            );

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let theme_icon = if self.is_dark_mode { "\u{2600}" } else { "\u{263e}" };
                let theme_btn = ui.add(
                    egui::Button::new(
                        RichText::new(theme_icon)
                            .color(self.theme.button_foreground)
                            .size(20.0),
                    )
                    .min_size(egui::Vec2::new(32.0, 32.0))
                    .corner_radius(CornerRadius::same(16))
                    .fill(self.theme.button_background),
                );
                if theme_btn.hovered() {
                    ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                }
                if theme_btn.clicked() {
                    self.toggle_theme();
                    ui.ctx().request_repaint();
                }
            });
        });
    }

    fn render_search_form(&mut self, ui: &mut Ui) {
        let mut submitted = false;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Search:")
                    .color(self.theme.text)
                    .size(16.0),
            );

            let response = ui.add(
                egui::TextEdit::singleline(self.search_term.value_mut())
                    .hint_text("Search Hacker News")
                    .desired_width(300.0),
            );
            if response.changed() {
                // Write-through on every edit after the initial read
                self.search_term.flush();
            }
            if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                submitted = true;
            }

            let can_submit = !self.search_term.get().trim().is_empty();
            if ui
                .add_enabled(
                    can_submit,
                    egui::Button::new(
                        RichText::new("Search")
                            .color(self.theme.button_foreground)
                            .size(14.0),
                    )
                    .corner_radius(CornerRadius::same(6))
                    .fill(self.theme.button_background),
                )
                .clicked()
            {
                submitted = true;
            }
        });

        if submitted {
            self.submit_search_input();
        }
    }

    fn render_last_searches(&mut self, ui: &mut Ui) {
        let recent = history::last_searches(&self.urls);
        if recent.is_empty() {
            return;
        }

        let mut picked = None;
        ui.horizontal_wrapped(|ui| {
            ui.label(
                RichText::new("Last searches:")
                    .color(self.theme.secondary_text)
                    .size(14.0),
            );
            for term in &recent {
                if ui
                    .add(
                        egui::Button::new(
                            RichText::new(term)
                                .color(self.theme.button_foreground)
                                .size(14.0),
                        )
                        .corner_radius(CornerRadius::same(6))
                        .fill(self.theme.button_background),
                    )
                    .clicked()
                {
                    picked = Some(term.clone());
                }
            }
        });

        if let Some(term) = picked {
            self.search_term.set(term.clone());
            self.submit_search(&term, 0);
        }
    }

    fn render_list_controls(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("Sort by:")
                    .color(self.theme.secondary_text)
                    .size(14.0),
            );

            let columns = [
                ("Title", SortKey::Title),
                ("Author", SortKey::Author),
                ("Comments", SortKey::Comments),
                ("Points", SortKey::Points),
            ];
            for (label, key) in columns {
                let active = self.sort.key == key;
                let arrow = if active {
                    match self.sort.order {
                        SortOrder::Ascending => " \u{25b2}",
                        SortOrder::Descending => " \u{25bc}",
                    }
                } else {
                    ""
                };
                let text = RichText::new(format!("{label}{arrow}")).size(14.0).color(
                    if active {
                        self.theme.highlight
                    } else {
                        self.theme.button_foreground
                    },
                );
                if ui
                    .add(
                        egui::Button::new(text)
                            .corner_radius(CornerRadius::same(6))
                            .fill(self.theme.button_background),
                    )
                    .clicked()
                {
                    self.sort.toggle(key);
                }
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.add(
                    egui::TextEdit::singleline(&mut self.filter_text)
                        .hint_text("Filter loaded titles")
                        .desired_width(200.0),
                );
            });
        });
    }

    fn render_story_list(&mut self, ui: &mut Ui) {
        let filtered = search::filter_by_title(&self.stories.items, self.filter_text.trim());
        let visible = self.sort.apply(&filtered);

        if visible.is_empty() && !self.stories.items.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(20.0);
                ui.label(
                    RichText::new(format!(
                        "No loaded stories match '{}'",
                        self.filter_text.trim()
                    ))
                    .color(self.theme.secondary_text)
                    .size(16.0)
                    .italics(),
                );
                ui.add_space(20.0);
            });
            return;
        }

        let mut story_to_remove = None;
        let mut link_to_open = None;

        for story in &visible {
            egui::Frame::new()
                .fill(self.theme.card_background)
                .corner_radius(CornerRadius::same(8))
                .stroke(Stroke::new(1.0, self.theme.separator))
                .inner_margin(10.0)
                .outer_margin(egui::vec2(4.0, 4.0))
                .show(ui, |ui| {
                    ui.horizontal(|ui| {
                        let title = if story.title.is_empty() {
                            "(untitled)"
                        } else {
                            &story.title
                        };
                        let title_label = ui.add(
                            egui::Label::new(
                                RichText::new(title)
                                    .color(self.theme.text)
                                    .size(16.0)
                                    .strong(),
                            )
                            .sense(egui::Sense::click()),
                        );
                        if title_label.clicked() && !story.url.is_empty() {
                            link_to_open = Some(story.url.clone());
                        }
                        if title_label.hovered() && !story.url.is_empty() {
                            ui.output_mut(|o| o.cursor_icon = egui::CursorIcon::PointingHand);
                        }

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.label(
                                RichText::new(format!("{} pts", story.points))
                                    .color(self.theme.points_color(story.points))
                                    .strong(),
                            );
                        });
                    });

                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new("by")
                                .color(self.theme.secondary_text)
                                .size(14.0),
                        );
                        ui.add_space(4.0);
                        ui.label(
                            RichText::new(&story.author)
                                .color(self.theme.text)
                                .size(14.0),
                        );
                        ui.add_space(8.0);
                        ui.label(
                            RichText::new(format!("{} comments", story.num_comments))
                                .color(self.theme.secondary_text)
                                .size(14.0),
                        );

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            let dismiss_btn = ui.add_sized(
                                [80.0, 26.0],
                                egui::Button::new(
                                    RichText::new("Dismiss")
                                        .size(14.0)
                                        .color(self.theme.button_foreground),
                                )
                                .corner_radius(CornerRadius::same(6))
                                .fill(self.theme.button_background),
                            );
                            if dismiss_btn.clicked() {
                                story_to_remove = Some(story.id.clone());
                            }
                        });
                    });
                });
        }

        if let Some(id) = story_to_remove {
            self.dispatch(StoriesAction::Remove { id });
        }
        if let Some(url) = link_to_open {
            self.open_link(&url);
        }
    }

    fn render_footer(&mut self, ui: &mut Ui) {
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            if self.stories.is_loading {
                ui.label(
                    RichText::new("Loading ...")
                        .color(self.theme.secondary_text)
                        .size(16.0),
                );
            } else {
                let more_btn = ui.add_sized(
                    [140.0, 32.0],
                    egui::Button::new(
                        RichText::new("More")
                            .size(16.0)
                            .color(self.theme.button_foreground),
                    )
                    .corner_radius(CornerRadius::same(6))
                    .fill(self.theme.button_background),
                );
                if more_btn.clicked() {
                    self.handle_more();
                }
            }
        });
        ui.add_space(8.0);
    }
}


impl eframe::App for HackerStoriesApp {
    // Save the theme preference when the app is closing
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string("is_dark_mode", self.is_dark_mode.to_string());
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.theme.apply_to_ctx(ctx);

        self.poll_fetch();

        // Kick off the fetch for the seeded URL on the first frame
        if !self.started {
            self.started = true;
            self.start_fetch();
        }

        // Keep polling while a fetch is in flight, otherwise the result
        // sits in the channel until the next input event
        if self.stories.is_loading {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_header(ui);
            ui.add_space(8.0);
            self.render_search_form(ui);
            ui.add_space(4.0);
            self.render_last_searches(ui);
            ui.add_space(8.0);
            ui.separator();

            if self.stories.is_error {
                ui.vertical_centered(|ui| {
                    ui.add_space(12.0);
                    ui.label(
                        RichText::new("Something went wrong ...")
                            .color(self.theme.error)
                            .size(18.0),
                    );
                    ui.add_space(12.0);
                });
            }

            self.render_list_controls(ui);
            ui.add_space(4.0);

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    self.render_story_list(ui);
                    self.render_footer(ui);
                });
        });
    }
}
