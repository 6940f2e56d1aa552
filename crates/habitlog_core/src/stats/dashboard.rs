//! Render-ready bundle of statistics for the current view settings.

use crate::model::state::{ViewMode, ViewSettings};
use crate::stats::engine::{
    DailyPoint, MonthSummary, PriorityStats, StatsEngine, TaskRow, WeekSummary,
};

/// Chart series selected by the view mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chart {
    Daily(Vec<DailyPoint>),
    Weekly(Vec<WeekSummary>),
    Monthly(Vec<MonthSummary>),
}

/// Contents of the summary panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryPanel {
    pub overall_score: u32,
    pub priority_breakdown: Vec<PriorityStats>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub view: ViewSettings,
    pub window_days: u32,
    pub rows: Vec<TaskRow>,
    /// `None` while the summary panel is hidden.
    pub summary: Option<SummaryPanel>,
    pub chart: Chart,
}

impl Dashboard {
    pub fn build(engine: &StatsEngine<'_>, view: ViewSettings) -> Self {
        let window_days = view.tracking_window.days();
        let summary = view.show_summary.then(|| SummaryPanel {
            overall_score: engine.overall_score(window_days),
            priority_breakdown: engine.priority_breakdown(window_days),
        });
        let chart = match view.view_mode {
            ViewMode::Daily => Chart::Daily(engine.daily_series(window_days)),
            ViewMode::Weekly => Chart::Weekly(engine.weekly_summary()),
            ViewMode::Monthly => Chart::Monthly(engine.monthly_summary()),
        };

        Self {
            view,
            window_days,
            rows: engine.task_rows(window_days),
            summary,
            chart,
        }
    }
}
