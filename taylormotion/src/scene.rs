//! `scene` turns numbers into pictures: a simulation drawn in world coordinates scaled onto a
//! canvas, and the radius vs term count chart of a sweep.

use crate::canvas::{self, Canvas, Color};
use crate::error::ConfigError;
use crate::motion::{Point2D, SimulationConfig};
use crate::search::ConvergenceResult;
use crate::svg::{Anchor, SvgDocument};

pub const DEFAULT_SCALE: f64 = 0.5;

const MARKER_RADIUS: f64 = 15.0;
const TRACK_RADIUS: f64 = 3.0;
const TRACE_RADIUS: f64 = 5.0;
const PADDING: f64 = 40.0;

/// Points of the straight track from start to end, one per unit of x. Empty when the end lies
/// to the left of the start.
pub fn track_points(config: &SimulationConfig) -> Vec<Point2D> {
    let (start, end) = (config.start, config.end);
    let m = (end.y - start.y) / (end.x - start.x);
    let c = start.y - m * start.x;
    let mut points = vec![];
    let mut x = start.x;
    while x <= end.x {
        points.push(Point2D::new(x, m * x + c));
        x += 1.0;
    }
    points
}

/// Canvases and charts need at least one pixel each way.
pub fn check_image_size(width: i64, height: i64) -> Result<(), ConfigError> {
    if width <= 0 || height <= 0 {
        return Err(ConfigError::ImageSize { width, height });
    }
    Ok(())
}

pub fn check_scale(scale: f64) -> Result<(), ConfigError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(ConfigError::Scale(scale));
    }
    Ok(())
}

pub struct Scene {
    config: SimulationConfig,
    scale: f64,
    canvas: Canvas,
}

impl Scene {
    pub fn new(config: &SimulationConfig) -> Result<Scene, ConfigError> {
        Scene::with_scale(config, DEFAULT_SCALE)
    }

    /// A blank scene large enough to hold both points, the tolerance circle and the bounds
    /// guard at the given world-to-pixel scale.
    pub fn with_scale(config: &SimulationConfig, scale: f64) -> Result<Scene, ConfigError> {
        check_scale(scale)?;
        let reach = config.bounds_margin().max(MARKER_RADIUS) + PADDING;
        let width = ((config.start.x.max(config.end.x) + reach) * scale).ceil();
        let height = ((config.start.y.max(config.end.y) + reach) * scale).ceil();
        if !(width.is_finite() && height.is_finite()) {
            return Err(ConfigError::Scale(scale));
        }
        check_image_size(width as i64, height as i64)?;
        Ok(Scene {
            config: *config,
            scale,
            canvas: Canvas::new(width as i64, height as i64, canvas::BLACK),
        })
    }

    fn dot(&mut self, p: Point2D, radius: f64, color: Color) {
        self.canvas
            .fill_disc(p.x * self.scale, p.y * self.scale, radius * self.scale, color);
    }

    /// Start and end markers plus the tolerance circle around the end.
    pub fn draw_markers(&mut self) {
        let (start, end) = (self.config.start, self.config.end);
        self.dot(start, MARKER_RADIUS, canvas::DARK_OLIVE_GREEN);
        self.dot(end, MARKER_RADIUS, canvas::TURQUOISE);
        self.canvas.stroke_circle(
            end.x * self.scale,
            end.y * self.scale,
            self.config.tolerance_radius * self.scale,
            canvas::DARK_ORCHID,
        );
    }

    pub fn draw_track(&mut self) {
        for p in track_points(&self.config) {
            self.dot(p, TRACK_RADIUS, canvas::IVORY);
        }
    }

    pub fn draw_trace_point(&mut self, p: Point2D) {
        self.dot(p, TRACE_RADIUS, canvas::DIM_GRAY);
    }

    pub fn draw_trace<I>(&mut self, points: I)
    where
        I: IntoIterator<Item = Point2D>,
    {
        for p in points {
            self.draw_trace_point(p);
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn into_canvas(self) -> Canvas {
        self.canvas
    }
}

pub const CHART_TITLE: &str = "Number of series terms against tolerance radius";
pub const CHART_X_LABEL: &str = "tolerance radius";
pub const CHART_Y_LABEL: &str = "number of series terms";

const CHART_MARGIN: i64 = 80;

// Pixel geometry shared by the raster and the SVG chart. The y axis starts at zero so
// differences of one term read as such, and tops out one term above the largest count.
struct ChartLayout {
    left: i64,
    right: i64,
    top: i64,
    bottom: i64,
    min_r: f64,
    r_span: f64,
    max_terms: u32,
}

impl ChartLayout {
    fn new(results: &[ConvergenceResult], width: i64, height: i64) -> ChartLayout {
        let min_r = results
            .iter()
            .fold(f64::INFINITY, |acc, r| acc.min(r.tolerance_radius));
        let max_r = results
            .iter()
            .fold(f64::NEG_INFINITY, |acc, r| acc.max(r.tolerance_radius));
        ChartLayout {
            left: CHART_MARGIN,
            right: width - CHART_MARGIN,
            top: CHART_MARGIN,
            bottom: height - CHART_MARGIN,
            min_r: if min_r.is_finite() { min_r } else { 0.0 },
            r_span: if max_r > min_r { max_r - min_r } else { 1.0 },
            max_terms: results.iter().map(|r| r.term_count).max().unwrap_or(0) + 1,
        }
    }

    fn x(&self, radius: f64) -> i64 {
        let fx = (radius - self.min_r) / self.r_span;
        self.left + (fx * (self.right - self.left) as f64).round() as i64
    }

    fn y(&self, terms: u32) -> i64 {
        let fy = terms as f64 / self.max_terms as f64;
        self.bottom - (fy * (self.bottom - self.top) as f64).round() as i64
    }

    fn point(&self, r: &ConvergenceResult) -> (i64, i64) {
        (self.x(r.tolerance_radius), self.y(r.term_count))
    }
}

/// Line and marker chart of tolerance radius (x) against minimal term count (y), with grid
/// lines and tick marks but no text. `render_chart_svg` draws the same chart labelled.
pub fn render_chart(
    results: &[ConvergenceResult],
    width: i64,
    height: i64,
) -> Result<Canvas, ConfigError> {
    check_image_size(width, height)?;
    let mut img = Canvas::new(width, height, canvas::WHITE);
    let layout = ChartLayout::new(results, width, height);
    let (left, right, top, bottom) = (layout.left, layout.right, layout.top, layout.bottom);

    img.draw_line(left, bottom, right, bottom, canvas::BLACK);
    img.draw_line(left, bottom, left, top, canvas::BLACK);
    if results.is_empty() {
        return Ok(img);
    }

    // Horizontal grid line and tick per whole term count.
    for t in 1..=layout.max_terms {
        let y = layout.y(t);
        img.draw_line(left + 1, y, right, y, canvas::LIGHT_GRAY);
        img.draw_line(left - 6, y, left, y, canvas::BLACK);
    }
    for r in results {
        let x = layout.x(r.tolerance_radius);
        img.draw_line(x, bottom, x, bottom + 6, canvas::BLACK);
    }

    let points: Vec<(i64, i64)> = results.iter().map(|r| layout.point(r)).collect();
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        img.draw_thick_line(x0, y0, x1, y1, 3.0, canvas::NAVY);
    }
    for &(x, y) in &points {
        img.fill_disc(x as f64 + 0.5, y as f64 + 0.5, 4.0, canvas::NAVY);
    }
    Ok(img)
}

/// The chart of `render_chart` with its title, axis labels and a value under every tick.
pub fn render_chart_svg(
    results: &[ConvergenceResult],
    width: i64,
    height: i64,
) -> Result<SvgDocument, ConfigError> {
    check_image_size(width, height)?;
    let mut doc = SvgDocument::new(width, height, canvas::WHITE);
    let layout = ChartLayout::new(results, width, height);
    let (left, right, top, bottom) = (
        layout.left as f64,
        layout.right as f64,
        layout.top as f64,
        layout.bottom as f64,
    );

    doc.text((width as f64 / 2.0, top / 2.0), CHART_TITLE, 20.0, Anchor::Middle);
    doc.text(
        ((left + right) / 2.0, height as f64 - 24.0),
        CHART_X_LABEL,
        14.0,
        Anchor::Middle,
    );
    doc.vertical_text((28.0, (top + bottom) / 2.0), CHART_Y_LABEL, 14.0);
    doc.line((left, bottom), (right, bottom), canvas::BLACK, 1.0);
    doc.line((left, bottom), (left, top), canvas::BLACK, 1.0);
    if results.is_empty() {
        return Ok(doc);
    }

    for t in 1..=layout.max_terms {
        let y = layout.y(t) as f64;
        doc.line((left, y), (right, y), canvas::LIGHT_GRAY, 1.0);
        doc.line((left - 6.0, y), (left, y), canvas::BLACK, 1.0);
        doc.text((left - 10.0, y + 4.0), &t.to_string(), 12.0, Anchor::End);
    }
    for r in results {
        let x = layout.x(r.tolerance_radius) as f64;
        doc.line((x, bottom), (x, bottom + 6.0), canvas::BLACK, 1.0);
        doc.text(
            (x, bottom + 20.0),
            &r.tolerance_radius.to_string(),
            12.0,
            Anchor::Middle,
        );
    }

    let points: Vec<(f64, f64)> = results
        .iter()
        .map(|r| {
            let (x, y) = layout.point(r);
            (x as f64, y as f64)
        })
        .collect();
    doc.polyline(&points, canvas::NAVY, 3.0);
    for &p in &points {
        doc.circle(p, 4.0, canvas::NAVY);
    }
    Ok(doc)
}
