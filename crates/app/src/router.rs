//! Single active view plus fixed back-links.

use agrointel_core::FarmId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Home,
    Farms,
    FarmDetail,
    Community,
    Chat,
    CropDoctor,
    Detect,
    Settings,
}

impl ViewState {
    /// Bottom-navigation entries, left to right.
    pub const TABS: [ViewState; 5] = [
        ViewState::Home,
        ViewState::Farms,
        ViewState::Detect,
        ViewState::Chat,
        ViewState::Community,
    ];

    /// Where the back arrow leads. There is no history stack.
    pub fn back_target(&self) -> ViewState {
        match self {
            ViewState::FarmDetail => ViewState::Farms,
            _ => ViewState::Home,
        }
    }

    pub fn is_tab(&self) -> bool {
        Self::TABS.contains(self)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewRouter {
    current: ViewState,
    selected_farm: Option<FarmId>,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_view(&self) -> ViewState {
        self.current
    }

    /// Farm shown by `FarmDetail`; `None` on every other view.
    pub fn selected_farm(&self) -> Option<FarmId> {
        self.selected_farm
    }

    /// Replace the active view unconditionally.
    pub fn navigate(&mut self, target: ViewState) {
        tracing::info!(from = ?self.current, to = ?target, "navigate");
        if target != ViewState::FarmDetail {
            self.selected_farm = None;
        }
        self.current = target;
    }

    pub fn open_farm(&mut self, farm: FarmId) {
        self.navigate(ViewState::FarmDetail);
        self.selected_farm = Some(farm);
    }

    /// Navigate to the current view's fixed back target.
    pub fn back(&mut self) -> ViewState {
        let target = self.current.back_target();
        self.navigate(target);
        target
    }
}
