//! Multi-chart manager
//!
//! Owns the chart grouping table and the rendering handles of every chart.
//! Each user operation is applied to the [`ChartSet`] first; the resulting
//! change list is then replayed against the renderer, so a chart is drawn,
//! redrawn or released exactly when its membership changes.

use super::drag::DragState;
use super::partition::{ChartChange, ChartGroup, ChartId, ChartSet};
use super::renderer::{chart_count_title, ChartRenderer, DragHighlight};
use super::series::{ChartSpec, SeriesBuilder};
use crate::error::AnalyzerError;
use crate::types::{ActivityType, FieldMapping, RecordGroup, UnitSystem};
use std::collections::BTreeMap;
use tracing::debug;

/// Rendering handles held for one chart
struct Rendered<R: ChartRenderer> {
    container: R::Container,
    chart: Option<R::Chart>,
}

/// Manager for user-composed charts
pub struct MultiChartManager<R: ChartRenderer> {
    renderer: R,
    charts: ChartSet,
    rendered: BTreeMap<ChartId, Rendered<R>>,
    drag: DragState,
    data: Vec<RecordGroup>,
    mappings: FieldMapping,
    activity: ActivityType,
    units: UnitSystem,
}

impl<R: ChartRenderer> MultiChartManager<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            charts: ChartSet::new(),
            rendered: BTreeMap::new(),
            drag: DragState::default(),
            data: Vec::new(),
            mappings: FieldMapping::new(),
            activity: ActivityType::Unknown,
            units: UnitSystem::Metric,
        }
    }

    pub fn with_units(mut self, units: UnitSystem) -> Self {
        self.units = units;
        self
    }

    /// Replace the dataset. Existing charts keep what they already show.
    pub fn set_data(&mut self, data: Vec<RecordGroup>, activity: ActivityType) {
        self.data = data;
        self.activity = activity;
    }

    /// Replace the metric to raw field table used to locate series
    pub fn set_field_mappings(&mut self, mappings: FieldMapping) {
        self.mappings = mappings;
    }

    pub fn add_metric(&mut self, metric: &str) -> Result<(), AnalyzerError> {
        let changes = self.charts.add_metric(metric);
        self.apply(changes)
    }

    pub fn remove_metric(&mut self, metric: &str) -> Result<(), AnalyzerError> {
        let changes = self.charts.remove_metric(metric);
        self.apply(changes)
    }

    /// Chart `metrics` together on one new chart
    pub fn merge_metrics<S: AsRef<str>>(&mut self, metrics: &[S]) -> Result<(), AnalyzerError> {
        let changes = self.charts.merge_metrics(metrics);
        self.apply(changes)
    }

    /// Move `metric` off chart `id` onto a chart of its own
    pub fn unmerge_metric(&mut self, id: ChartId, metric: &str) -> Result<(), AnalyzerError> {
        let changes = self.charts.unmerge_metric(id, metric);
        self.apply(changes)
    }

    /// Fold chart `source` into chart `target`
    pub fn merge_charts(&mut self, source: ChartId, target: ChartId) -> Result<(), AnalyzerError> {
        debug!(%source, %target, "merging charts");
        let changes = self.charts.merge_groups(source, target);
        self.apply(changes)
    }

    pub fn remove_chart(&mut self, id: ChartId) {
        let changes = self.charts.remove_group(id);
        self.release(changes);
    }

    /// Destroy every chart and release every handle held
    pub fn clear_all_metrics(&mut self) {
        self.charts.clear();
        let ids: Vec<ChartId> = self.rendered.keys().copied().collect();
        for id in ids {
            self.destroy(id);
        }
        self.renderer
            .set_chart_count(&chart_count_title(self.charts.len()));
    }

    /// Start dragging chart `id`; every other chart becomes a drop target
    pub fn drag_start(&mut self, id: ChartId) {
        if self.charts.group(id).is_none() {
            return;
        }
        self.drag.start(id);
        for (chart_id, rendered) in self.rendered.iter_mut() {
            let highlight = if *chart_id == id {
                DragHighlight::Dragging
            } else {
                DragHighlight::DropTarget
            };
            self.renderer
                .set_drag_highlight(&mut rendered.container, highlight);
        }
    }

    /// Drop the dragged chart on `target` (`None` outside any chart)
    pub fn drop_on(&mut self, target: Option<ChartId>) -> Result<(), AnalyzerError> {
        let merge = self.drag.drop_on(target);
        self.clear_highlights();
        match merge {
            Some((source, target)) => self.merge_charts(source, target),
            None => Ok(()),
        }
    }

    /// End the drag gesture without a drop
    pub fn drag_end(&mut self) {
        self.drag.end();
        self.clear_highlights();
    }

    pub fn dragging(&self) -> Option<ChartId> {
        self.drag.dragged()
    }

    /// Charts in creation order
    pub fn groups(&self) -> impl Iterator<Item = &ChartGroup> {
        self.charts.groups()
    }

    pub fn group_of(&self, metric: &str) -> Option<ChartId> {
        self.charts.group_of(metric)
    }

    pub fn chart_count(&self) -> usize {
        self.charts.len()
    }

    /// Spec of chart `id` as it would be drawn now
    pub fn chart_spec(&self, id: ChartId) -> Option<ChartSpec> {
        self.charts
            .group(id)
            .map(|group| self.builder().build(&group.metrics))
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn builder(&self) -> SeriesBuilder<'_> {
        SeriesBuilder::new(&self.data, &self.mappings, self.activity, self.units)
    }

    /// Replay a change list against the renderer.
    ///
    /// Every change is replayed even after a failure; the first error is
    /// returned. A chart that cannot be drawn is dropped from the table.
    fn apply(&mut self, changes: Vec<ChartChange>) -> Result<(), AnalyzerError> {
        let mut result = Ok(());
        for change in changes {
            let step = match change {
                ChartChange::Created(id) => self.create(id),
                ChartChange::Updated(id) => self.redraw(id),
                ChartChange::Destroyed(id) => {
                    self.destroy(id);
                    Ok(())
                }
            };
            if let Err(err) = step {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }
        self.renderer
            .set_chart_count(&chart_count_title(self.charts.len()));
        result
    }

    fn release(&mut self, changes: Vec<ChartChange>) {
        for change in changes {
            self.destroy(change.id());
        }
        self.renderer
            .set_chart_count(&chart_count_title(self.charts.len()));
    }

    fn create(&mut self, id: ChartId) -> Result<(), AnalyzerError> {
        let Some(group) = self.charts.group(id) else {
            return Ok(());
        };
        let title = group.title();
        let controls = unmerge_controls(group);
        let spec = self.builder().build(&group.metrics);
        debug!(chart = %id, %title, datasets = spec.datasets.len(), "creating chart");

        let mut container = match self.renderer.create_container(id, &title) {
            Ok(container) => container,
            Err(err) => {
                self.charts.remove_group(id);
                return Err(err);
            }
        };
        let chart = match self.renderer.draw(&mut container, &spec) {
            Ok(chart) => chart,
            Err(err) => {
                self.renderer.remove_container(container);
                self.charts.remove_group(id);
                return Err(err);
            }
        };
        self.renderer
            .set_unmerge_controls(&mut container, &controls);

        self.rendered.insert(
            id,
            Rendered {
                container,
                chart: Some(chart),
            },
        );
        Ok(())
    }

    fn redraw(&mut self, id: ChartId) -> Result<(), AnalyzerError> {
        let Some(group) = self.charts.group(id) else {
            return Ok(());
        };
        let title = group.title();
        let controls = unmerge_controls(group);
        let spec = self.builder().build(&group.metrics);
        debug!(chart = %id, %title, datasets = spec.datasets.len(), "rebuilding chart");

        let Some(rendered) = self.rendered.get_mut(&id) else {
            return self.create(id);
        };
        if let Some(chart) = rendered.chart.take() {
            self.renderer.destroy_chart(chart);
        }
        self.renderer.set_title(&mut rendered.container, &title);
        self.renderer
            .set_unmerge_controls(&mut rendered.container, &controls);
        match self.renderer.draw(&mut rendered.container, &spec) {
            Ok(chart) => {
                rendered.chart = Some(chart);
                Ok(())
            }
            Err(err) => {
                self.charts.remove_group(id);
                self.destroy(id);
                Err(err)
            }
        }
    }

    fn destroy(&mut self, id: ChartId) {
        if let Some(rendered) = self.rendered.remove(&id) {
            debug!(chart = %id, "destroying chart");
            if let Some(chart) = rendered.chart {
                self.renderer.destroy_chart(chart);
            }
            self.renderer.remove_container(rendered.container);
        }
    }

    fn clear_highlights(&mut self) {
        for rendered in self.rendered.values_mut() {
            self.renderer
                .set_drag_highlight(&mut rendered.container, DragHighlight::None);
        }
    }
}

impl<R: ChartRenderer> Drop for MultiChartManager<R> {
    fn drop(&mut self) {
        self.clear_all_metrics();
    }
}

/// Metrics offered for unmerging; singleton charts offer none
fn unmerge_controls(group: &ChartGroup) -> Vec<String> {
    if group.is_merged() {
        group.metrics.clone()
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::MemoryRenderer;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn ride() -> Vec<RecordGroup> {
        let records = (0..30)
            .map(|i| {
                json!({
                    "timestamp": format!("2024-05-01T08:00:{:02}Z", i),
                    "power": 200 + i,
                    "heart_rate": 130,
                    "cadence": 88,
                    "speed": 8.0,
                })
                .as_object()
                .cloned()
                .unwrap()
            })
            .collect();
        vec![RecordGroup::new("records", records)]
    }

    fn manager(renderer: &mut MemoryRenderer) -> MultiChartManager<&mut MemoryRenderer> {
        let mut manager = MultiChartManager::new(renderer);
        manager.set_data(ride(), ActivityType::Cycling);
        manager.set_field_mappings(FieldMapping::from_table(&[
            ("Power", &["power"]),
            ("Heart Rate", &["heart_rate"]),
            ("Cadence", &["cadence"]),
            ("Speed", &["enhanced_speed", "speed"]),
        ]));
        manager
    }

    /// Memory renderer whose next `failures` draws fail
    #[derive(Default)]
    struct FailingDraws {
        inner: MemoryRenderer,
        failures: usize,
    }

    impl ChartRenderer for FailingDraws {
        type Container = <MemoryRenderer as ChartRenderer>::Container;
        type Chart = <MemoryRenderer as ChartRenderer>::Chart;

        fn create_container(
            &mut self,
            id: ChartId,
            title: &str,
        ) -> Result<Self::Container, AnalyzerError> {
            self.inner.create_container(id, title)
        }

        fn draw(
            &mut self,
            container: &mut Self::Container,
            spec: &ChartSpec,
        ) -> Result<Self::Chart, AnalyzerError> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(AnalyzerError::RenderTarget("canvas lost".to_string()));
            }
            self.inner.draw(container, spec)
        }

        fn destroy_chart(&mut self, chart: Self::Chart) {
            self.inner.destroy_chart(chart)
        }

        fn remove_container(&mut self, container: Self::Container) {
            self.inner.remove_container(container)
        }

        fn set_title(&mut self, container: &mut Self::Container, title: &str) {
            self.inner.set_title(container, title)
        }

        fn set_unmerge_controls(&mut self, container: &mut Self::Container, metrics: &[String]) {
            self.inner.set_unmerge_controls(container, metrics)
        }

        fn set_drag_highlight(&mut self, container: &mut Self::Container, highlight: DragHighlight) {
            self.inner.set_drag_highlight(container, highlight)
        }

        fn set_chart_count(&mut self, title: &str) {
            self.inner.set_chart_count(title)
        }
    }

    fn failing_manager(renderer: &mut FailingDraws) -> MultiChartManager<&mut FailingDraws> {
        let mut manager = MultiChartManager::new(renderer);
        manager.set_data(ride(), ActivityType::Cycling);
        manager.set_field_mappings(FieldMapping::from_table(&[
            ("Power", &["power"]),
            ("Heart Rate", &["heart_rate"]),
        ]));
        manager
    }

    fn memberships<R: ChartRenderer>(manager: &MultiChartManager<R>) -> Vec<Vec<String>> {
        manager.groups().map(|g| g.metrics.clone()).collect()
    }

    #[test]
    fn test_add_metric_renders_chart() {
        let mut renderer = MemoryRenderer::new();
        {
            let mut manager = manager(&mut renderer);
            manager.add_metric("Power").unwrap();
            manager.add_metric("Power").unwrap();

            let id = manager.group_of("Power").unwrap();
            let surface = manager.renderer().surface(id).unwrap();
            assert_eq!(surface.title, "Power");
            assert_eq!(surface.spec.as_ref().unwrap().datasets[0].points.len(), 30);
            assert!(surface.unmerge_controls.is_empty());
            assert_eq!(manager.renderer().heading(), "1 Chart");
            assert_eq!(manager.renderer().charts_drawn(), 1);
        }
        assert_eq!(renderer.containers(), 0);
        assert_eq!(renderer.live_charts(), 0);
    }

    #[test]
    fn test_drag_merge_and_unmerge_round_trip() {
        let mut renderer = MemoryRenderer::new();
        let mut manager = manager(&mut renderer);
        manager.add_metric("Power").unwrap();
        manager.add_metric("Heart Rate").unwrap();
        let power = manager.group_of("Power").unwrap();
        let heart_rate = manager.group_of("Heart Rate").unwrap();

        manager.drag_start(power);
        assert_eq!(
            manager.renderer().surface(heart_rate).unwrap().highlight,
            DragHighlight::DropTarget
        );
        assert_eq!(
            manager.renderer().surface(power).unwrap().highlight,
            DragHighlight::Dragging
        );
        manager.drop_on(Some(heart_rate)).unwrap();

        assert_eq!(memberships(&manager), vec![vec!["Heart Rate", "Power"]]);
        let surface = manager.renderer().surface(heart_rate).unwrap();
        assert_eq!(surface.title, "Heart Rate, Power");
        assert_eq!(surface.unmerge_controls, vec!["Heart Rate", "Power"]);
        assert_eq!(surface.highlight, DragHighlight::None);
        assert_eq!(surface.spec.as_ref().unwrap().datasets.len(), 2);
        assert!(manager.renderer().surface(power).is_none());

        manager.unmerge_metric(heart_rate, "Power").unwrap();
        assert_eq!(memberships(&manager), vec![vec!["Heart Rate"], vec!["Power"]]);
        assert!(manager
            .renderer()
            .surface(heart_rate)
            .unwrap()
            .unmerge_controls
            .is_empty());
        assert_eq!(manager.renderer().heading(), "2 Charts");
        assert_eq!(manager.renderer().live_charts(), 2);
    }

    #[test]
    fn test_drop_on_self_or_outside_changes_nothing() {
        let mut renderer = MemoryRenderer::new();
        let mut manager = manager(&mut renderer);
        manager.add_metric("Power").unwrap();
        manager.add_metric("Cadence").unwrap();
        let power = manager.group_of("Power").unwrap();

        manager.drag_start(power);
        manager.drop_on(Some(power)).unwrap();
        manager.drag_start(power);
        manager.drop_on(None).unwrap();
        manager.drag_start(power);
        manager.drag_end();

        assert_eq!(manager.dragging(), None);
        assert_eq!(manager.chart_count(), 2);
        assert!(manager
            .renderer()
            .surfaces()
            .all(|s| s.highlight == DragHighlight::None));
    }

    #[test]
    fn test_remove_metric_rebuilds_or_destroys() {
        let mut renderer = MemoryRenderer::new();
        let mut manager = manager(&mut renderer);
        manager.merge_metrics(&["Power", "Cadence"]).unwrap();
        let id = manager.group_of("Power").unwrap();

        manager.remove_metric("Cadence").unwrap();
        let surface = manager.renderer().surface(id).unwrap();
        assert_eq!(surface.title, "Power");
        assert!(surface.unmerge_controls.is_empty());

        manager.remove_metric("Power").unwrap();
        assert_eq!(manager.chart_count(), 0);
        assert_eq!(manager.renderer().heading(), "Select metrics to visualize");
        assert_eq!(manager.renderer().live_charts(), 0);
    }

    #[test]
    fn test_metric_without_data_keeps_empty_chart() {
        let mut renderer = MemoryRenderer::new();
        let mut manager = manager(&mut renderer);
        manager.add_metric("Temperature").unwrap();

        let id = manager.group_of("Temperature").unwrap();
        assert!(manager.chart_spec(id).unwrap().is_empty());
        assert_eq!(manager.chart_count(), 1);
    }

    #[test]
    fn test_clear_all_releases_every_handle() {
        let mut renderer = MemoryRenderer::new();
        let mut manager = manager(&mut renderer);
        manager.add_metric("Power").unwrap();
        manager.merge_metrics(&["Heart Rate", "Cadence", "Speed"]).unwrap();
        manager.remove_metric("Speed").unwrap();

        manager.clear_all_metrics();
        assert_eq!(manager.chart_count(), 0);
        assert_eq!(manager.renderer().containers(), 0);
        assert_eq!(manager.renderer().live_charts(), 0);
    }

    #[test]
    fn test_missing_render_target_rolls_back() {
        let mut manager = MultiChartManager::new(MemoryRenderer::detached());
        manager.set_data(ride(), ActivityType::Cycling);

        let err = manager.add_metric("Power").unwrap_err();
        assert!(matches!(err, AnalyzerError::RenderTarget(_)));
        assert_eq!(manager.chart_count(), 0);
        assert_eq!(manager.group_of("Power"), None);
    }

    #[test]
    fn test_failed_merge_redraw_releases_both_charts() {
        let mut renderer = FailingDraws::default();
        {
            let mut manager = failing_manager(&mut renderer);
            manager.add_metric("Power").unwrap();
            manager.add_metric("Heart Rate").unwrap();
            let power = manager.group_of("Power").unwrap();
            let heart_rate = manager.group_of("Heart Rate").unwrap();

            manager.renderer.failures = 1;
            let err = manager.merge_charts(power, heart_rate).unwrap_err();

            assert!(matches!(err, AnalyzerError::RenderTarget(_)));
            assert_eq!(manager.chart_count(), 0);
            assert_eq!(manager.renderer().inner.containers(), 0);
            assert_eq!(manager.renderer().inner.live_charts(), 0);
            assert_eq!(manager.renderer().inner.heading(), "Select metrics to visualize");
        }
        assert_eq!(renderer.inner.containers(), 0);
        assert_eq!(renderer.inner.live_charts(), 0);
    }

    #[test]
    fn test_failed_unmerge_redraw_still_draws_split_chart() {
        let mut renderer = FailingDraws::default();
        let mut manager = failing_manager(&mut renderer);
        manager.merge_metrics(&["Power", "Heart Rate"]).unwrap();
        let merged = manager.group_of("Power").unwrap();

        manager.renderer.failures = 1;
        assert!(manager.unmerge_metric(merged, "Power").is_err());

        assert_eq!(memberships(&manager), vec![vec!["Power"]]);
        let power = manager.group_of("Power").unwrap();
        let surface = manager.renderer().inner.surface(power).unwrap();
        assert_eq!(surface.spec.as_ref().unwrap().datasets.len(), 1);
        assert!(manager.renderer().inner.surface(merged).is_none());
        assert_eq!(manager.renderer().inner.containers(), 1);
        assert_eq!(manager.renderer().inner.live_charts(), 1);
        assert_eq!(manager.renderer().inner.heading(), "1 Chart");
    }

    #[test]
    fn test_every_charted_group_has_a_surface_after_failures() {
        let mut renderer = FailingDraws::default();
        let mut manager = failing_manager(&mut renderer);
        manager.add_metric("Power").unwrap();
        manager.add_metric("Heart Rate").unwrap();
        let heart_rate = manager.group_of("Heart Rate").unwrap();

        manager.renderer.failures = 2;
        assert!(manager.merge_metrics(&["Power", "Heart Rate"]).is_err());
        assert!(manager.add_metric("Cadence").is_err());
        manager.add_metric("Heart Rate").unwrap();

        for group in manager.groups() {
            assert!(manager.renderer().inner.surface(group.id).is_some());
        }
        assert_eq!(manager.renderer().inner.containers(), manager.chart_count());
        assert_eq!(manager.renderer().inner.live_charts(), manager.chart_count());
        assert!(manager.renderer().inner.surface(heart_rate).is_none());
    }
}
