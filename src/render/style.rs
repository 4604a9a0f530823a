use serde::{Deserialize, Serialize};

/// Cosmetic chart options. None of these touch the data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartStyle {
    pub title: String,
    pub actual_line: LineStyle,
    pub predicted_line: LineStyle,
    pub axis_titles: AxisTitles,
    pub grid: GridStyle,
    pub background: BackgroundStyle,
    pub font: FontStyle,
    pub legend_position: LegendPosition,
    pub margins: Margins,
    /// strftime format for x-axis ticks.
    pub time_tick_format: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub line_color: String,
    pub line_width: f64,
    pub dash_style: DashStyle,
    /// Marker size; the renderer's default when unset.
    pub marker_size: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTitles {
    pub x: String,
    pub y: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridStyle {
    pub visible: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundStyle {
    pub plot_color: String,
    pub plot_opacity: f64,
    pub paper_color: String,
    pub paper_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontStyle {
    pub family: String,
    pub size: u32,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegendPosition {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Margins {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "Real-time Stock Prices".to_string(),
            actual_line: LineStyle {
                line_color: "blue".to_string(),
                line_width: 2.0,
                dash_style: DashStyle::Solid,
                marker_size: None,
            },
            predicted_line: LineStyle {
                line_color: "gray".to_string(),
                line_width: 2.0,
                dash_style: DashStyle::Dash,
                marker_size: Some(8.0),
            },
            axis_titles: AxisTitles {
                x: "Time".to_string(),
                y: "Stock Price".to_string(),
            },
            grid: GridStyle {
                visible: true,
                color: "lightgrey".to_string(),
            },
            background: BackgroundStyle {
                plot_color: "240,240,240".to_string(),
                plot_opacity: 0.9,
                paper_color: "240,240,240".to_string(),
                paper_opacity: 0.7,
            },
            font: FontStyle {
                family: "Arial, sans-serif".to_string(),
                size: 12,
                color: "black".to_string(),
            },
            legend_position: LegendPosition { x: 0.0, y: 1.1 },
            margins: Margins {
                left: 40,
                right: 40,
                top: 80,
                bottom: 40,
            },
            time_tick_format: "%H:%M:%S".to_string(),
        }
    }
}

impl DashStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            DashStyle::Solid => "solid",
            DashStyle::Dash => "dash",
            DashStyle::Dot => "dot",
            DashStyle::DashDot => "dashdot",
        }
    }
}

impl BackgroundStyle {
    pub fn plot_rgba(&self) -> String {
        format!("rgba({},{})", self.plot_color, self.plot_opacity.clamp(0.0, 1.0))
    }

    pub fn paper_rgba(&self) -> String {
        format!("rgba({},{})", self.paper_color, self.paper_opacity.clamp(0.0, 1.0))
    }
}
