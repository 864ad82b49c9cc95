use crate::stats::{MetricPair, SourceColumns};
use crate::theme::Theme;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which population to load and which entities to label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    pub metric_x: String,
    pub metric_y: String,
    pub season: Option<u32>,
    pub min_weight: f64,
    pub weight_column: String,
    pub extremes: usize,
    pub name_column: String,
    pub team_column: String,
    pub season_column: String,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            metric_x: "Zone%".to_string(),
            metric_y: "ISO".to_string(),
            season: Some(2025),
            min_weight: 500.0,
            weight_column: "PA".to_string(),
            extremes: 17,
            name_column: "Name".to_string(),
            team_column: "Team".to_string(),
            season_column: "Season".to_string(),
        }
    }
}

impl SelectionConfig {
    pub fn metrics(&self) -> MetricPair {
        MetricPair::new(self.metric_x.clone(), self.metric_y.clone())
    }

    pub fn source_columns(&self) -> SourceColumns {
        SourceColumns {
            name: self.name_column.clone(),
            team: self.team_column.clone(),
            season: self.season_column.clone(),
        }
    }
}

/// Tuning knobs of the force-directed label layout. Pairs are `(x, y)`.
/// Distances are canvas pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelLayoutConfig {
    pub max_rounds: usize,
    /// Total per-round displacement below which iteration stops early.
    pub convergence_threshold: f32,
    pub force_text: (f32, f32),
    pub force_points: (f32, f32),
    pub expand_text: (f32, f32),
    pub expand_points: (f32, f32),
    pub point_radius: f32,
    pub spring: f32,
    pub boundary_force: f32,
    pub step: f32,
    pub cooling: f32,
    pub min_step: f32,
    pub leader_threshold: f32,
    pub leader_shrink: f32,
    pub seed: u64,
}

impl Default for LabelLayoutConfig {
    fn default() -> Self {
        Self {
            max_rounds: 500,
            convergence_threshold: 0.05,
            force_text: (0.5, 0.75),
            force_points: (0.5, 0.5),
            expand_text: (1.05, 1.2),
            expand_points: (1.0, 1.0),
            point_radius: 4.0,
            spring: 0.05,
            boundary_force: 0.5,
            step: 1.0,
            cooling: 0.995,
            min_step: 0.2,
            leader_threshold: 6.0,
            leader_shrink: 2.0,
            seed: 0,
        }
    }
}

/// Canvas geometry of the figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    pub width: f32,
    pub height: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    /// Fraction of the data range added on each side of the axes.
    pub domain_margin: f32,
    pub tick_target: usize,
    pub line_height: f32,
    /// Estimate text widths from a character table instead of font files.
    pub fast_text_metrics: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 1500.0,
            height: 1000.0,
            margin_left: 100.0,
            margin_right: 40.0,
            margin_top: 70.0,
            margin_bottom: 80.0,
            domain_margin: 0.05,
            tick_target: 8,
            line_height: 1.2,
            fast_text_metrics: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1500.0,
            height: 1000.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub selection: SelectionConfig,
    pub labels: LabelLayoutConfig,
    pub plot: PlotConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::classic();
        let plot = PlotConfig::default();
        let render = RenderConfig {
            width: plot.width,
            height: plot.height,
            background: theme.background.clone(),
        };
        Self {
            theme,
            selection: SelectionConfig::default(),
            labels: LabelLayoutConfig::default(),
            plot,
            render,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    title_font_size: Option<f32>,
    label_font_size: Option<f32>,
    text_color: Option<String>,
    point_color: Option<String>,
    point_opacity: Option<f32>,
    average_x_color: Option<String>,
    average_y_color: Option<String>,
    leader_color: Option<String>,
    leader_width: Option<f32>,
    grid_color: Option<String>,
    axis_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SelectionConfigFile {
    metric_x: Option<String>,
    metric_y: Option<String>,
    season: Option<u32>,
    min_weight: Option<f64>,
    weight_column: Option<String>,
    extremes: Option<usize>,
    name_column: Option<String>,
    team_column: Option<String>,
    season_column: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LabelConfigFile {
    max_rounds: Option<usize>,
    convergence_threshold: Option<f32>,
    force_text: Option<(f32, f32)>,
    force_points: Option<(f32, f32)>,
    expand_text: Option<(f32, f32)>,
    expand_points: Option<(f32, f32)>,
    point_radius: Option<f32>,
    spring: Option<f32>,
    boundary_force: Option<f32>,
    step: Option<f32>,
    cooling: Option<f32>,
    min_step: Option<f32>,
    leader_threshold: Option<f32>,
    leader_shrink: Option<f32>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct PlotConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    margin_left: Option<f32>,
    margin_right: Option<f32>,
    margin_top: Option<f32>,
    margin_bottom: Option<f32>,
    domain_margin: Option<f32>,
    tick_target: Option<usize>,
    line_height: Option<f32>,
    fast_text_metrics: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    selection: Option<SelectionConfigFile>,
    labels: Option<LabelConfigFile>,
    plot: Option<PlotConfigFile>,
}

macro_rules! apply {
    ($target:expr, $source:expr, [$($field:ident),* $(,)?]) => {
        $(
            if let Some(v) = $source.$field {
                $target.$field = v;
            }
        )*
    };
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("parsing config file {}", path.display()))
}

/// Parse a JSON (or JSON5) config document over the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents).map_err(|_| json_err)?,
    };
    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = Theme::by_name(theme_name)
            .with_context(|| format!("unknown theme `{theme_name}`"))?;
    }

    if let Some(vars) = parsed.theme_variables {
        apply!(
            config.theme,
            vars,
            [
                font_family,
                font_size,
                title_font_size,
                label_font_size,
                text_color,
                point_color,
                point_opacity,
                average_x_color,
                average_y_color,
                leader_color,
                leader_width,
                grid_color,
                axis_color,
                background,
            ]
        );
    }

    if let Some(sel) = parsed.selection {
        apply!(
            config.selection,
            sel,
            [
                metric_x,
                metric_y,
                min_weight,
                weight_column,
                extremes,
                name_column,
                team_column,
                season_column,
            ]
        );
        if sel.season.is_some() {
            config.selection.season = sel.season;
        }
    }

    if let Some(labels) = parsed.labels {
        apply!(
            config.labels,
            labels,
            [
                max_rounds,
                convergence_threshold,
                force_text,
                force_points,
                expand_text,
                expand_points,
                point_radius,
                spring,
                boundary_force,
                step,
                cooling,
                min_step,
                leader_threshold,
                leader_shrink,
                seed,
            ]
        );
    }

    if let Some(plot) = parsed.plot {
        apply!(
            config.plot,
            plot,
            [
                width,
                height,
                margin_left,
                margin_right,
                margin_top,
                margin_bottom,
                domain_margin,
                tick_target,
                line_height,
                fast_text_metrics,
            ]
        );
    }

    config.render.width = config.plot.width;
    config.render.height = config.plot.height;
    config.render.background = config.theme.background.clone();
    Ok(config)
}
