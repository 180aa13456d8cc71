//! Recording fakes for the panel surfaces

use std::time::Duration;

use crate::app::Panel;
use crate::indicators::IndicatorWidget;
use crate::menu::MenuModel;
use crate::notification::Overlay;

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayCall {
    Show(String),
    SetText(String),
    FadeOut(Duration),
    Destroy,
}

#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub calls: Vec<OverlayCall>,
    live: usize,
}

impl RecordingOverlay {
    pub fn live_overlays(&self) -> usize {
        self.live
    }
}

impl Overlay for RecordingOverlay {
    fn show(&mut self, text: &str) {
        self.live += 1;
        self.calls.push(OverlayCall::Show(text.to_string()));
    }

    fn set_text(&mut self, text: &str) {
        self.calls.push(OverlayCall::SetText(text.to_string()));
    }

    fn fade_out(&mut self, duration: Duration) {
        self.calls.push(OverlayCall::FadeOut(duration));
    }

    fn destroy(&mut self) {
        self.live = self.live.saturating_sub(1);
        self.calls.push(OverlayCall::Destroy);
    }
}

#[derive(Debug, Default)]
pub struct RecordingPanel {
    pub menus: Vec<MenuModel>,
    pub indicators: Vec<Vec<IndicatorWidget>>,
    pub connected: Vec<bool>,
}

impl RecordingPanel {
    pub fn last_menu(&self) -> Option<&MenuModel> {
        self.menus.last()
    }

    pub fn last_indicators(&self) -> Option<&[IndicatorWidget]> {
        self.indicators.last().map(Vec::as_slice)
    }
}

impl Panel for RecordingPanel {
    fn render_menu(&mut self, menu: &MenuModel) {
        self.menus.push(menu.clone());
    }

    fn render_indicators(&mut self, widgets: &[IndicatorWidget]) {
        self.indicators.push(widgets.to_vec());
    }

    fn set_connected(&mut self, connected: bool) {
        self.connected.push(connected);
    }
}
