use serde_json::json;

use crate::client::NeoSource;
use crate::format;
use crate::logging::{add_records, log, log_batch, obj, v_str, Domain, Level};
use crate::model::NeoRecord;
use crate::render::{NoticeLevel, Pagination, Panel, Renderer, Widget};
use crate::view::ViewState;

use super::{fetch_section, hazard_badge, loading, PageOutcome};

const PAGE: &str = "neos";
const SECTION: &str = "neosGrid";
const CARD_NAME_CHARS: usize = 30;

/// Paginated NEO cards. Owns its [`ViewState`].
pub struct NeoListPage<'a> {
    neos: &'a (dyn NeoSource + Send + Sync),
    renderer: &'a dyn Renderer,
    view: ViewState,
    batch: Vec<NeoRecord>,
}

impl<'a> NeoListPage<'a> {
    pub fn new(neos: &'a (dyn NeoSource + Send + Sync), renderer: &'a dyn Renderer, view: ViewState) -> Self {
        Self {
            neos,
            renderer,
            view,
            batch: Vec::new(),
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Last fetched batch, before the name filter.
    pub fn batch(&self) -> &[NeoRecord] {
        &self.batch
    }

    pub async fn load(&mut self) -> PageOutcome {
        loading(self.renderer, SECTION, "Loading NEOs...");
        let query = self.view.query();
        let Some(records) = fetch_section(
            self.renderer,
            PAGE,
            SECTION,
            "Failed to load NEOs",
            self.neos.list(query),
        )
        .await
        else {
            return PageOutcome::failed(SECTION);
        };
        add_records(records.len());
        log_batch(
            PAGE,
            SECTION,
            records.len(),
            records.iter().filter(|r| r.hazardous).count(),
        );
        self.view.record_batch(records.len());
        self.batch = records;
        self.render_cards();
        self.renderer.render(Widget::Pagination(Pagination {
            page: self.view.current_page + 1,
            prev_enabled: self.view.has_previous(),
            next_enabled: self.view.has_next(),
        }));
        PageOutcome::ok()
    }

    fn render_cards(&self) {
        if self.batch.is_empty() {
            self.render_empty("No NEOs found");
            return;
        }
        let visible = self.view.visible(&self.batch);
        if visible.is_empty() {
            self.render_empty("No NEOs match the name filter");
            return;
        }
        for record in visible {
            self.renderer.render(Widget::Panel(neo_card(record)));
        }
    }

    fn render_empty(&self, message: &str) {
        self.renderer.render(Widget::Empty {
            section: SECTION.to_string(),
            message: message.to_string(),
        });
    }

    /// `None` when already on the last page.
    pub async fn next_page(&mut self) -> Option<PageOutcome> {
        if !self.view.next() {
            return None;
        }
        self.log_view("next_page");
        Some(self.load().await)
    }

    /// `None` when already on the first page.
    pub async fn previous_page(&mut self) -> Option<PageOutcome> {
        if !self.view.previous() {
            return None;
        }
        self.log_view("previous_page");
        Some(self.load().await)
    }

    pub async fn apply_filters(
        &mut self,
        danger: Option<bool>,
        name: Option<String>,
        page_size: u32,
    ) -> PageOutcome {
        self.view.apply_filters(danger, name, page_size);
        self.log_view("apply_filters");
        self.load().await
    }

    pub async fn clear_filters(&mut self) -> PageOutcome {
        self.view.clear_filters();
        self.log_view("clear_filters");
        self.load().await
    }

    pub async fn show_details(&self, id: i64) -> PageOutcome {
        let section = "neoModal";
        match fetch_section(
            self.renderer,
            PAGE,
            section,
            "Failed to load NEO details",
            self.neos.get(id),
        )
        .await
        {
            Some(record) => {
                self.renderer.render(Widget::Panel(neo_details(&record)));
                PageOutcome::ok()
            }
            None => {
                self.renderer
                    .notify(NoticeLevel::Error, "Failed to load NEO details");
                PageOutcome::failed(section)
            }
        }
    }

    fn log_view(&self, action: &str) {
        log(
            Level::Debug,
            Domain::View,
            action,
            obj(&[
                ("page", v_str(PAGE)),
                ("current_page", json!(self.view.current_page)),
                ("page_size", json!(self.view.page_size)),
                ("danger_filter", json!(self.view.danger_filter)),
                ("name_filter", json!(self.view.name_filter)),
            ]),
        );
    }
}

pub fn neo_card(r: &NeoRecord) -> Panel {
    Panel {
        id: format!("neo-{}", r.id),
        title: format::truncate(&r.name, CARD_NAME_CHARS),
        badge: Some(hazard_badge(r.hazardous)),
        items: vec![
            ("ID".to_string(), r.id.to_string()),
            ("Diameter".to_string(), format!("{} m", format::number(Some(r.diameter())))),
            ("Velocity".to_string(), format!("{} km/h", format::number(Some(r.velocity_kmh())))),
            ("Distance".to_string(), format!("{} km", format::number(Some(r.mock_distance_km())))),
            ("Approach".to_string(), format::date(r.first_approach_date.as_deref())),
        ],
        footer: None,
    }
}

pub fn neo_details(r: &NeoRecord) -> Panel {
    let text = |s: &Option<String>| s.clone().unwrap_or_else(|| format::NO_DATA.to_string());
    Panel {
        id: "neoModal".to_string(),
        title: r.name.clone(),
        badge: Some(hazard_badge(r.hazardous)),
        items: vec![
            ("Catalog ID".to_string(), text(&r.neo_id)),
            ("Name".to_string(), r.name.clone()),
            ("Min diameter".to_string(), format!("{} m", format::number(Some(r.min_diameter())))),
            ("Max diameter".to_string(), format!("{} m", format::number(Some(r.diameter())))),
            ("Relative velocity".to_string(), format!("{} km/h", format::number(Some(r.velocity_kmh())))),
            ("Velocity".to_string(), format!("{} km/s", format::number(Some(r.velocity_kms())))),
            ("Approach date".to_string(), format::date(r.first_approach_date.as_deref())),
            ("Target planet".to_string(), text(&r.target_planet)),
            ("Absolute magnitude".to_string(), format::number(r.absolute_magnitude)),
        ],
        footer: r.self_link.clone(),
    }
}
