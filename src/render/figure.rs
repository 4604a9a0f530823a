use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use crate::data::types::{Frame, LabeledSeries, TIMESTAMP_FORMAT};
use crate::render::style::{ChartStyle, LineStyle};
use crate::render::Renderer;

/// Writes one chart figure document per frame, one JSON object per line.
pub struct FigureRenderer<W: Write> {
    style: ChartStyle,
    out: W,
}

impl FigureRenderer<Stdout> {
    pub fn stdout(style: ChartStyle) -> Self {
        Self::new(style, io::stdout())
    }
}

impl FigureRenderer<File> {
    pub fn file(style: ChartStyle, path: &str) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open figure output: {}", path))?;
        Ok(Self::new(style, file))
    }
}

impl<W: Write> FigureRenderer<W> {
    pub fn new(style: ChartStyle, out: W) -> Self {
        Self { style, out }
    }

    pub fn figure(&self, frame: &Frame) -> Value {
        json!({
            "tick": frame.tick,
            "data": [
                trace(&frame.actual, &self.style.actual_line),
                trace(&frame.predicted, &self.style.predicted_line),
            ],
            "layout": self.layout(),
        })
    }

    fn layout(&self) -> Value {
        let style = &self.style;
        json!({
            "title": style.title,
            "xaxis": {
                "title": style.axis_titles.x,
                "type": "date",
                "tickformat": style.time_tick_format,
                "showgrid": style.grid.visible,
                "gridcolor": style.grid.color,
            },
            "yaxis": {
                "title": style.axis_titles.y,
                "showgrid": style.grid.visible,
                "gridcolor": style.grid.color,
            },
            "plot_bgcolor": style.background.plot_rgba(),
            "paper_bgcolor": style.background.paper_rgba(),
            "font": {
                "family": style.font.family,
                "size": style.font.size,
                "color": style.font.color,
            },
            "legend": { "x": style.legend_position.x, "y": style.legend_position.y },
            "margin": {
                "l": style.margins.left,
                "r": style.margins.right,
                "t": style.margins.top,
                "b": style.margins.bottom,
            },
        })
    }
}

fn trace(series: &LabeledSeries, line: &LineStyle) -> Value {
    let x: Vec<String> = series
        .timestamps()
        .iter()
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .collect();

    let mut trace = json!({
        "x": x,
        "y": series.values(),
        "mode": "lines+markers",
        "name": series.name,
        "line": {
            "color": line.line_color,
            "width": line.line_width,
            "dash": line.dash_style.as_str(),
        },
    });

    if let Some(size) = line.marker_size {
        trace["marker"] = json!({ "size": size, "color": line.line_color });
    }
    trace
}

impl<W: Write> Renderer for FigureRenderer<W> {
    fn name(&self) -> &str {
        "figure"
    }

    fn render(&mut self, frame: &Frame) -> Result<()> {
        let figure = self.figure(frame);
        serde_json::to_writer(&mut self.out, &figure)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
