//! User-composed charts
//!
//! Users chart metrics one per chart, then combine and split charts by drag
//! and drop. This module holds:
//! - [`ChartSet`]: the grouping table, independent of any rendering
//! - [`SeriesBuilder`]: metric series and chart specs from record groups
//! - [`ChartRenderer`]: the seam to a drawing backend
//! - [`MultiChartManager`]: ties the three together and owns the handles

mod drag;
mod layout;
mod manager;
mod partition;
mod renderer;
mod series;

pub use drag::DragState;
pub use layout::{
    axis_label, color_indicator, display_name, metric_group, palette_color, MetricGroup,
    METRIC_GROUPS, PALETTE,
};
pub use manager::MultiChartManager;
pub use partition::{ChartChange, ChartGroup, ChartId, ChartSet};
pub use renderer::{
    chart_count_title, ChartRenderer, DragHighlight, MemoryChart, MemoryContainer,
    MemoryRenderer, Surface,
};
pub use series::{AxisPosition, AxisSpec, ChartSpec, DataPoint, DatasetSpec, SeriesBuilder};
