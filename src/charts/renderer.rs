//! Rendering collaborator
//!
//! The chart manager drives a [`ChartRenderer`]: it creates one container per
//! chart, draws [`ChartSpec`]s into it and releases every handle it was given.
//! [`MemoryRenderer`] keeps the drawn state in memory for the CLI and tests.

use super::partition::ChartId;
use super::series::ChartSpec;
use crate::error::AnalyzerError;
use serde::Serialize;
use std::collections::BTreeMap;

/// Visual drag feedback for a chart container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragHighlight {
    #[default]
    None,
    /// The chart being dragged
    Dragging,
    /// A chart that accepts the drop
    DropTarget,
}

/// Trait for chart rendering backends
pub trait ChartRenderer {
    /// Handle of the surface holding one chart
    type Container;
    /// Handle of one drawn chart
    type Chart;

    fn create_container(&mut self, id: ChartId, title: &str)
        -> Result<Self::Container, AnalyzerError>;

    fn draw(
        &mut self,
        container: &mut Self::Container,
        spec: &ChartSpec,
    ) -> Result<Self::Chart, AnalyzerError>;

    fn destroy_chart(&mut self, chart: Self::Chart);

    fn remove_container(&mut self, container: Self::Container);

    fn set_title(&mut self, container: &mut Self::Container, title: &str);

    /// Replace the per-metric unmerge controls; empty removes them
    fn set_unmerge_controls(&mut self, container: &mut Self::Container, metrics: &[String]);

    fn set_drag_highlight(&mut self, container: &mut Self::Container, highlight: DragHighlight);

    /// Heading above all charts
    fn set_chart_count(&mut self, title: &str);
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for &mut R {
    type Container = R::Container;
    type Chart = R::Chart;

    fn create_container(
        &mut self,
        id: ChartId,
        title: &str,
    ) -> Result<Self::Container, AnalyzerError> {
        (**self).create_container(id, title)
    }

    fn draw(
        &mut self,
        container: &mut Self::Container,
        spec: &ChartSpec,
    ) -> Result<Self::Chart, AnalyzerError> {
        (**self).draw(container, spec)
    }

    fn destroy_chart(&mut self, chart: Self::Chart) {
        (**self).destroy_chart(chart)
    }

    fn remove_container(&mut self, container: Self::Container) {
        (**self).remove_container(container)
    }

    fn set_title(&mut self, container: &mut Self::Container, title: &str) {
        (**self).set_title(container, title)
    }

    fn set_unmerge_controls(&mut self, container: &mut Self::Container, metrics: &[String]) {
        (**self).set_unmerge_controls(container, metrics)
    }

    fn set_drag_highlight(&mut self, container: &mut Self::Container, highlight: DragHighlight) {
        (**self).set_drag_highlight(container, highlight)
    }

    fn set_chart_count(&mut self, title: &str) {
        (**self).set_chart_count(title)
    }
}

/// Heading for `count` charts
pub fn chart_count_title(count: usize) -> String {
    match count {
        0 => "Select metrics to visualize".to_string(),
        1 => "1 Chart".to_string(),
        n => format!("{} Charts", n),
    }
}

/// State of one in-memory chart surface
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Surface {
    pub id: String,
    pub title: String,
    pub spec: Option<ChartSpec>,
    pub unmerge_controls: Vec<String>,
    pub highlight: DragHighlight,
}

/// Container handle of [`MemoryRenderer`]
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryContainer(ChartId);

/// Chart handle of [`MemoryRenderer`]
#[derive(Debug, PartialEq, Eq)]
pub struct MemoryChart(ChartId);

/// In-memory rendering backend
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderer {
    surfaces: BTreeMap<ChartId, Surface>,
    heading: String,
    charts_drawn: usize,
    charts_destroyed: usize,
    detached: bool,
}

impl MemoryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer with no surface to draw on; every container request fails
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    pub fn surface(&self, id: ChartId) -> Option<&Surface> {
        self.surfaces.get(&id)
    }

    /// Surfaces in chart creation order
    pub fn surfaces(&self) -> impl Iterator<Item = &Surface> {
        self.surfaces.values()
    }

    pub fn heading(&self) -> &str {
        &self.heading
    }

    /// Charts drawn and not yet destroyed
    pub fn live_charts(&self) -> usize {
        self.charts_drawn - self.charts_destroyed
    }

    pub fn charts_drawn(&self) -> usize {
        self.charts_drawn
    }

    pub fn containers(&self) -> usize {
        self.surfaces.len()
    }
}

impl ChartRenderer for MemoryRenderer {
    type Container = MemoryContainer;
    type Chart = MemoryChart;

    fn create_container(
        &mut self,
        id: ChartId,
        title: &str,
    ) -> Result<Self::Container, AnalyzerError> {
        if self.detached {
            return Err(AnalyzerError::RenderTarget(
                "no chart surface attached".to_string(),
            ));
        }
        self.surfaces.insert(
            id,
            Surface {
                id: id.to_string(),
                title: title.to_string(),
                ..Surface::default()
            },
        );
        Ok(MemoryContainer(id))
    }

    fn draw(
        &mut self,
        container: &mut Self::Container,
        spec: &ChartSpec,
    ) -> Result<Self::Chart, AnalyzerError> {
        let surface = self.surfaces.get_mut(&container.0).ok_or_else(|| {
            AnalyzerError::RenderTarget(format!("container {} was removed", container.0))
        })?;
        surface.spec = Some(spec.clone());
        self.charts_drawn += 1;
        Ok(MemoryChart(container.0))
    }

    fn destroy_chart(&mut self, chart: Self::Chart) {
        if let Some(surface) = self.surfaces.get_mut(&chart.0) {
            surface.spec = None;
        }
        self.charts_destroyed += 1;
    }

    fn remove_container(&mut self, container: Self::Container) {
        self.surfaces.remove(&container.0);
    }

    fn set_title(&mut self, container: &mut Self::Container, title: &str) {
        if let Some(surface) = self.surfaces.get_mut(&container.0) {
            surface.title = title.to_string();
        }
    }

    fn set_unmerge_controls(&mut self, container: &mut Self::Container, metrics: &[String]) {
        if let Some(surface) = self.surfaces.get_mut(&container.0) {
            surface.unmerge_controls = metrics.to_vec();
        }
    }

    fn set_drag_highlight(&mut self, container: &mut Self::Container, highlight: DragHighlight) {
        if let Some(surface) = self.surfaces.get_mut(&container.0) {
            surface.highlight = highlight;
        }
    }

    fn set_chart_count(&mut self, title: &str) {
        self.heading = title.to_string();
    }
}
