//! egui main window: current value, trend info, refresh, menus and the
//! setup, settings, about and help windows. Also owns the tray icon and
//! routes background events to the fetch cycle.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use anyhow::{Context as _, Result};
use eframe::egui;
use egui::emath::NumExt;
use log::{error, info, warn};
use reqwest::blocking::Client;

use crate::autostart;
use crate::config::{ConfigStore, MAX_REFRESH_SECS, MIN_REFRESH_SECS, Settings};
use crate::cycle::{FetchCycle, LOADING_TEXT, Outcome, Trigger};
use crate::forms::{SettingsForm, SourceKind};
use crate::icon::IconRenderer;
use crate::present::{self, ColorZone};
use crate::reading::Direction;
use crate::source::dexcom::Region;
use crate::source::{self, Source};
use crate::theme::Theme;
use crate::tray::Tray;
#[cfg(not(target_os = "linux"))]
use crate::tray::{self, TrayAction};
use crate::worker::{AppEvent, FetchReport, FetchWorker, Scheduler, Waker};

/// Window palette.
mod palette {
    pub const BG_RGB: (u8, u8, u8) = (0x2B, 0x2B, 0x2B);
    pub const TEXT_DIM: (u8, u8, u8) = (200, 200, 210);
    pub const ERROR_RGB: (u8, u8, u8) = (0xFF, 0x44, 0x44);
}

const VALUE_SIZE: f32 = 72.0;
/// "Caricamento..." and "Errore" do not fit at the value size.
const STATUS_SIZE: f32 = 32.0;
const INFO_SIZE: f32 = 14.0;

fn rgb((r, g, b): (u8, u8, u8)) -> egui::Color32 {
    egui::Color32::from_rgb(r, g, b)
}

/// Adds a system font with the trend arrows (⇈ ⇊ ⚡) as a fallback after
/// egui's own fonts.
fn setup_symbol_fonts(ctx: &egui::Context) {
    let mut fonts = egui::FontDefinitions::default();

    #[cfg(windows)]
    let system_font_paths = [
        r"C:\Windows\Fonts\seguisym.ttf", // Segoe UI Symbol
        r"C:\Windows\Fonts\segoeui.ttf",
    ];

    #[cfg(not(windows))]
    let system_font_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];

    for path in system_font_paths {
        if let Ok(bytes) = std::fs::read(path) {
            fonts
                .font_data
                .insert("symbols".to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
            for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
                fonts
                    .families
                    .entry(family)
                    .or_default()
                    .push("symbols".to_owned());
            }
            ctx.set_fonts(fonts);
            return;
        }
    }
}

/// Button with its label centered, returns the Response like `egui::Button`.
fn centered_button(ui: &mut egui::Ui, text: impl Into<egui::WidgetText>, size: egui::Vec2) -> egui::Response {
    let size = size.at_least(egui::vec2(ui.spacing().interact_size.x, ui.spacing().interact_size.y));
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    let visuals = ui.style().interact(&response);
    let expanded = rect.expand(visuals.expansion);
    ui.painter().rect_filled(expanded, visuals.corner_radius, visuals.bg_fill);
    ui.painter().rect_stroke(
        expanded,
        visuals.corner_radius,
        visuals.bg_stroke,
        egui::StrokeKind::Outside,
    );
    let widget_text: egui::WidgetText = text.into();
    let galley = widget_text.into_galley(ui, None, rect.width() - 8.0, egui::TextStyle::Button);
    let pos = rect.center() - galley.size() / 2.0;
    let text_color = if ui.is_enabled() {
        ui.visuals().text_color()
    } else {
        ui.visuals().gray_out(ui.visuals().text_color())
    };
    ui.painter().galley(pos, galley, text_color);
    response
}

fn trend_description(direction: Direction) -> &'static str {
    match direction {
        Direction::DoubleUp => "Aumento rapido (>3 mg/dL/min)",
        Direction::SingleUp => "Aumento (2-3 mg/dL/min)",
        Direction::FortyFiveUp => "Aumento lento (1-2 mg/dL/min)",
        Direction::Flat => "Stabile (0-1 mg/dL/min)",
        Direction::FortyFiveDown => "Diminuzione lenta (1-2 mg/dL/min)",
        Direction::SingleDown => "Diminuzione (2-3 mg/dL/min)",
        Direction::DoubleDown => "Diminuzione rapida (>3 mg/dL/min)",
        Direction::NotComputable => "Impossibile calcolare la tendenza",
        Direction::RateOutOfRange => "Variazione fuori range",
    }
}

/// What a form window asked for this frame.
enum FormAction {
    Save,
    Cancel,
}

/// Which window a form is shown in.
#[derive(Clone, Copy, PartialEq, Eq)]
enum FormKind {
    Welcome,
    Settings,
}

/// Connection state from the last finished fetch.
struct SourceStatus {
    label: &'static str,
    connected: bool,
    error: Option<String>,
}

pub struct GlikApp {
    store: Option<ConfigStore>,
    settings: Settings,
    http: Client,
    cycle: FetchCycle,
    worker: FetchWorker<Source>,
    scheduler: Scheduler,
    events: Receiver<AppEvent>,
    tray: Option<Tray>,
    renderer: Option<IconRenderer>,
    theme: Theme,
    status: Option<SourceStatus>,
    /// Settings saved while a fetch was running; fetch again once it lands.
    refetch_pending: bool,
    welcome: Option<SettingsForm>,
    settings_form: Option<SettingsForm>,
    show_about: bool,
    show_help: bool,
    /// No tray to restore from, so a window started hidden must be shown.
    force_visible: bool,
    quitting: bool,
}

impl GlikApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        setup_symbol_fonts(&cc.egui_ctx);

        let store = match ConfigStore::open_default() {
            Ok(store) => Some(store),
            Err(err) => {
                error!("Configuration store unavailable: {err:#}");
                None
            }
        };
        if let Some(store) = &store {
            info!("settings file: {}", store.config_path().display());
        }
        let settings = store.as_ref().map(ConfigStore::load).unwrap_or_default();
        info!(
            "settings loaded (refresh {}s, setup needed: {})",
            settings.refresh_interval_secs,
            settings.needs_setup()
        );
        if settings.autostart != autostart::is_enabled() {
            if let Err(err) = autostart::set_enabled(settings.autostart) {
                warn!("{err:#}");
            }
        }

        let ctx = cc.egui_ctx.clone();
        let waker: Waker = Arc::new(move || ctx.request_repaint());
        let (tx, events) = mpsc::channel();

        let http = source::http_client().context("Failed to build the HTTP client")?;
        let worker = FetchWorker::spawn(
            Source::from_connection(&settings.connection, http.clone()),
            tx.clone(),
            waker.clone(),
        );
        let scheduler = Scheduler::spawn(settings.refresh_interval(), tx.clone(), waker.clone());

        let theme = Theme::detect();
        let renderer = match IconRenderer::load() {
            Ok(renderer) => Some(renderer),
            Err(err) => {
                warn!("Tray icon font unavailable: {err:#}");
                None
            }
        };
        let tray = renderer
            .as_ref()
            .map(|r| Tray::build(r.render_placeholder(theme)))
            .transpose()
            .unwrap_or_else(|err| {
                warn!("{err:#}");
                None
            });
        #[cfg(not(target_os = "linux"))]
        if tray.is_some() {
            tray::forward_events(tx, waker);
        }

        let force_visible = tray.is_none();
        let welcome = settings
            .needs_setup()
            .then(|| SettingsForm::from_settings(&settings));

        let mut app = Self {
            store,
            settings,
            http,
            cycle: FetchCycle::default(),
            worker,
            scheduler,
            events,
            tray,
            renderer,
            theme,
            status: None,
            refetch_pending: false,
            welcome,
            settings_form: None,
            show_about: false,
            show_help: false,
            force_visible,
            quitting: false,
        };
        app.apply_visuals(&cc.egui_ctx);
        app.start_fetch(Trigger::Startup);
        Ok(app)
    }

    fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = if self.settings.dark_mode {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        };
        if self.settings.dark_mode {
            visuals.panel_fill = rgb(palette::BG_RGB);
        }
        ctx.set_visuals(visuals);
    }

    /// Starts a fetch unless one is running or there is nothing configured.
    fn start_fetch(&mut self, trigger: Trigger) {
        if self.settings.needs_setup() {
            return;
        }
        if !self.cycle.trigger(trigger) {
            if trigger == Trigger::SettingsSaved {
                self.refetch_pending = true;
            }
            return;
        }
        self.worker.fetch();
        if let Some(tray) = &self.tray {
            tray.set_refresh_enabled(false);
        }
    }

    #[cfg_attr(target_os = "linux", allow(unused_variables))]
    fn process_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::Tick => self.start_fetch(Trigger::Timer),
                AppEvent::Fetched(report) => self.on_fetched(report),
                #[cfg(not(target_os = "linux"))]
                AppEvent::Menu(event) => {
                    if let Some(action) = self.tray.as_ref().and_then(|t| t.menu_action(&event)) {
                        self.handle_tray_action(ctx, action);
                    }
                }
                #[cfg(not(target_os = "linux"))]
                AppEvent::Tray(event) => {
                    if let Some(action) = self.tray.as_ref().and_then(|t| t.icon_action(&event)) {
                        self.handle_tray_action(ctx, action);
                    }
                }
            }
        }
    }

    fn on_fetched(&mut self, report: FetchReport) {
        self.status = Some(SourceStatus {
            label: report.source,
            connected: report.connected,
            error: report.connection_error.map(|err| err.to_string()),
        });
        let trigger = self.cycle.last_trigger();
        match self.cycle.complete(report.result) {
            Outcome::Success(presentation) => {
                info!(
                    "{trigger:?}: {} mg/dL {} {}",
                    presentation.value, presentation.glyph, presentation.delta
                );
                self.theme = Theme::detect();
                if let (Some(tray), Some(renderer)) = (&self.tray, &self.renderer) {
                    tray.set_image(renderer.render(presentation.value, self.theme));
                    if let Some(tooltip) = &self.cycle.display().tooltip {
                        tray.set_tooltip(tooltip);
                    }
                }
            }
            Outcome::Error(err) => warn!("{trigger:?}: fetch failed: {err}"),
        }
        if let Some(tray) = &self.tray {
            tray.set_refresh_enabled(true);
        }
        if std::mem::take(&mut self.refetch_pending) {
            self.start_fetch(Trigger::SettingsSaved);
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn handle_tray_action(&mut self, ctx: &egui::Context, action: TrayAction) {
        match action {
            TrayAction::Show => self.show_window(ctx),
            TrayAction::Refresh => self.start_fetch(Trigger::Manual),
            TrayAction::Settings => {
                self.show_window(ctx);
                self.open_settings();
            }
            TrayAction::Quit => self.quit(ctx),
        }
    }

    #[cfg(not(target_os = "linux"))]
    fn show_window(&mut self, ctx: &egui::Context) {
        ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
    }

    fn quit(&mut self, ctx: &egui::Context) {
        self.quitting = true;
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn open_settings(&mut self) {
        if self.settings_form.is_none() {
            let mut form = SettingsForm::from_settings(&self.settings);
            form.autostart = autostart::is_enabled();
            self.settings_form = Some(form);
        }
    }

    /// Persists new settings and swaps them in: new data source, new timer
    /// period, then an immediate fetch.
    fn apply_settings(&mut self, ctx: &egui::Context, next: Settings) -> Result<()> {
        if let Some(store) = &self.store {
            store.save(&next)?;
        }
        if let Err(err) = autostart::set_enabled(next.autostart) {
            warn!("{err:#}");
        }
        self.worker
            .replace(Source::from_connection(&next.connection, self.http.clone()));
        self.scheduler.set_interval(next.refresh_interval());
        self.settings = next;
        self.apply_visuals(ctx);
        info!("settings saved");
        self.start_fetch(Trigger::SettingsSaved);
        Ok(())
    }
}

impl eframe::App for GlikApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if std::mem::take(&mut self.force_visible) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
        }
        self.process_events(ctx);

        if ctx.input_mut(|i| {
            i.consume_shortcut(&egui::KeyboardShortcut::new(egui::Modifiers::COMMAND, egui::Key::Q))
        }) {
            self.quit(ctx);
        }
        if !ctx.wants_keyboard_input()
            && ctx.input(|i| i.key_pressed(egui::Key::R) && i.modifiers.is_none())
        {
            self.start_fetch(Trigger::Manual);
        }

        // Closing the window keeps the app in the tray.
        if ctx.input(|i| i.viewport().close_requested())
            && !self.quitting
            && self.settings.minimize_to_tray
            && self.tray.is_some()
        {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
        }

        self.ui_menu_bar(ctx);
        self.ui_status_bar(ctx);
        self.ui_main(ctx);

        if self.welcome.is_some() {
            self.ui_form_window(ctx, FormKind::Welcome);
        }
        if self.settings_form.is_some() {
            self.ui_form_window(ctx, FormKind::Settings);
        }
        if self.show_about {
            self.ui_about(ctx);
        }
        if self.show_help {
            self.ui_help(ctx);
        }
    }
}

impl GlikApp {
    fn ui_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::MenuBar::new().ui(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Benvenuto").clicked() {
                        self.welcome = Some(SettingsForm::from_settings(&self.settings));
                    }
                    ui.separator();
                    if ui
                        .add(egui::Button::new("Esci").shortcut_text("Ctrl+Q"))
                        .clicked()
                    {
                        self.quit(ctx);
                    }
                });
                ui.menu_button("Strumenti", |ui| {
                    if ui.button("Impostazioni").clicked() {
                        self.open_settings();
                    }
                });
                ui.menu_button("Info", |ui| {
                    if ui.button("Informazioni").clicked() {
                        self.show_about = true;
                    }
                    if ui.button("Aiuto").clicked() {
                        self.show_help = true;
                    }
                });
            });
        });
    }

    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let text = match &self.status {
                    Some(status) if status.connected => format!("{}: connesso", status.label),
                    Some(status) => format!("{}: non connesso", status.label),
                    None if self.settings.needs_setup() => "Nessuna sorgente configurata".to_owned(),
                    None => "In attesa del primo aggiornamento".to_owned(),
                };
                let label = ui.label(egui::RichText::new(text).small().color(rgb(palette::TEXT_DIM)));
                if let Some(err) = self.status.as_ref().and_then(|s| s.error.as_deref()) {
                    label.on_hover_text(err);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!("ogni {}s", self.settings.refresh_interval().as_secs()))
                            .small()
                            .color(rgb(palette::TEXT_DIM)),
                    );
                });
            });
        });
    }

    fn ui_main(&mut self, ctx: &egui::Context) {
        let display = self.cycle.display().clone();
        let size = if display.value_text.parse::<i32>().is_ok() {
            VALUE_SIZE
        } else {
            STATUS_SIZE
        };
        let mut value = egui::RichText::new(&display.value_text).size(size).strong();
        if let Some(zone) = display.zone {
            value = value.color(rgb(zone.rgb()));
        }
        let fetching = self.cycle.is_fetching();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.label(value);
                ui.add_space(4.0);
                ui.label(egui::RichText::new(&display.info_text).size(INFO_SIZE));
                ui.add_space(16.0);

                let refresh = ui
                    .add_enabled_ui(!fetching, |ui| centered_button(ui, "Aggiorna", egui::vec2(110.0, 32.0)))
                    .inner
                    .on_hover_text("Aggiorna ora (R)")
                    .on_disabled_hover_text(LOADING_TEXT);
                if refresh.clicked() {
                    self.start_fetch(Trigger::Manual);
                }
            });
        });
    }

    fn ui_form_window(&mut self, ctx: &egui::Context, kind: FormKind) {
        let slot = match kind {
            FormKind::Welcome => &mut self.welcome,
            FormKind::Settings => &mut self.settings_form,
        };
        let Some(mut form) = slot.take() else {
            return;
        };

        let title = match kind {
            FormKind::Welcome => "Benvenuto in Glik",
            FormKind::Settings => "Impostazioni",
        };
        let mut open = true;
        let mut action = None;
        egui::Window::new(title)
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                if kind == FormKind::Welcome {
                    ui.label("Per iniziare scegli la sorgente dei dati e inserisci i dati di accesso.");
                    ui.add_space(8.0);
                }
                connection_fields(ui, &mut form);
                if kind == FormKind::Settings {
                    ui.separator();
                    general_fields(ui, &mut form);
                }
                if let Some(err) = &form.error {
                    ui.add_space(6.0);
                    ui.colored_label(rgb(palette::ERROR_RGB), err.as_str());
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    let save = match kind {
                        FormKind::Welcome => "Salva e inizia",
                        FormKind::Settings => "Salva",
                    };
                    if ui.button(save).clicked() {
                        action = Some(FormAction::Save);
                    }
                    if ui.button("Annulla").clicked() {
                        action = Some(FormAction::Cancel);
                    }
                });
            });

        match action {
            Some(FormAction::Save) => {
                let result = form
                    .build()
                    .map_err(anyhow::Error::from)
                    .and_then(|next| self.apply_settings(ctx, next));
                if let Err(err) = result {
                    form.error = Some(format!("{err:#}"));
                    self.put_back(kind, form);
                }
            }
            Some(FormAction::Cancel) => {}
            None if open => self.put_back(kind, form),
            None => {}
        }
    }

    fn put_back(&mut self, kind: FormKind, form: SettingsForm) {
        match kind {
            FormKind::Welcome => self.welcome = Some(form),
            FormKind::Settings => self.settings_form = Some(form),
        }
    }

    fn ui_about(&mut self, ctx: &egui::Context) {
        egui::Window::new("Informazioni")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(egui::RichText::new("Glik").size(20.0).strong());
                    ui.label(format!("Versione {}", env!("CARGO_PKG_VERSION")));
                    ui.add_space(6.0);
                    ui.label(
                        egui::RichText::new(
                            "Visualizzatore desktop della glicemia da Nightscout o Dexcom Share.",
                        )
                        .color(rgb(palette::TEXT_DIM)),
                    );
                    ui.hyperlink_to("Documentazione Nightscout", "https://nightscout.github.io/");
                    ui.label("Rilasciato sotto licenza GNU AGPL v3.0");
                    ui.add_space(12.0);
                    if ui.button("OK").clicked() {
                        self.show_about = false;
                    }
                });
            });
    }

    fn ui_help(&mut self, ctx: &egui::Context) {
        let mut open = true;
        egui::Window::new("Guida alla lettura dei dati")
            .open(&mut open)
            .collapsible(false)
            .default_width(360.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
                    ui.heading("Frecce di tendenza");
                    egui::Grid::new("help_trends").num_columns(2).show(ui, |ui| {
                        for direction in Direction::ALL {
                            ui.label(format!("{} ({})", present::glyph(Some(direction)), direction.name()));
                            ui.label(trend_description(direction));
                            ui.end_row();
                        }
                    });

                    ui.add_space(8.0);
                    ui.heading("Colori della glicemia");
                    egui::Grid::new("help_colors").num_columns(2).show(ui, |ui| {
                        for (zone, name, meaning) in [
                            (ColorZone::High, "Rosso", "Glicemia alta (>180 mg/dL)"),
                            (ColorZone::InRange, "Verde", "Glicemia in range (70-180 mg/dL)"),
                            (ColorZone::Low, "Arancione", "Glicemia bassa (<70 mg/dL)"),
                        ] {
                            ui.colored_label(rgb(zone.rgb()), format!("■ {name}"));
                            ui.label(meaning);
                            ui.end_row();
                        }
                    });

                    ui.add_space(8.0);
                    ui.heading("Delta (Δ)");
                    ui.label("Variazione rispetto alla lettura precedente: + indica un aumento, - una diminuzione.");
                    ui.label("Esempio: +5.0 mg/dL significa che la glicemia è salita di 5 mg/dL.");

                    ui.add_space(8.0);
                    ui.heading("Note");
                    ui.label(format!(
                        "I dati si aggiornano da soli ogni {} secondi (configurabile).",
                        self.settings.refresh_interval().as_secs()
                    ));
                    ui.label("Per aggiornare subito premi R o il pulsante Aggiorna.");
                    ui.label("Chiudendo la finestra l'app resta attiva nell'area di notifica.");
                });
            });
        if !open {
            self.show_help = false;
        }
    }
}

fn connection_fields(ui: &mut egui::Ui, form: &mut SettingsForm) {
    ui.horizontal(|ui| {
        ui.label("Sorgente:");
        for kind in [SourceKind::Nightscout, SourceKind::Dexcom] {
            ui.radio_value(&mut form.kind, kind, kind.label());
        }
    });
    ui.add_space(4.0);
    egui::Grid::new("connection_fields")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui| match form.kind {
            SourceKind::Nightscout => {
                ui.label("URL Nightscout:");
                ui.add(
                    egui::TextEdit::singleline(&mut form.nightscout_url)
                        .hint_text("https://tuosito.herokuapp.com"),
                );
                ui.end_row();
                ui.label("API Secret:");
                ui.add(egui::TextEdit::singleline(&mut form.token).password(true));
                ui.end_row();
                ui.label("SHA-1:");
                ui.label(egui::RichText::new(form.token_sha1()).monospace().small());
                ui.end_row();
            }
            SourceKind::Dexcom => {
                ui.label("Username:");
                ui.add(egui::TextEdit::singleline(&mut form.username).hint_text("email, telefono o username"));
                ui.end_row();
                ui.label("Password:");
                ui.add(egui::TextEdit::singleline(&mut form.password).password(true));
                ui.end_row();
                ui.label("Regione:");
                egui::ComboBox::from_id_salt("dexcom_region")
                    .selected_text(region_label(form.region))
                    .show_ui(ui, |ui| {
                        for region in Region::ALL {
                            ui.selectable_value(&mut form.region, region, region_label(region));
                        }
                    });
                ui.end_row();
            }
        });
}

fn general_fields(ui: &mut egui::Ui, form: &mut SettingsForm) {
    ui.horizontal(|ui| {
        ui.label("Aggiornamento:");
        ui.add(
            egui::Slider::new(&mut form.refresh_interval_secs, MIN_REFRESH_SECS..=MAX_REFRESH_SECS)
                .suffix(" s"),
        );
    });
    ui.checkbox(&mut form.minimize_to_tray, "Riduci nell'area di notifica alla chiusura");
    ui.checkbox(&mut form.autostart, "Avvia con il sistema");
}

fn region_label(region: Region) -> &'static str {
    match region {
        Region::Us => "Stati Uniti (us)",
        Region::Ous => "Fuori dagli USA (ous)",
        Region::Jp => "Giappone (jp)",
    }
}
