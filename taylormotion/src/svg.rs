//! Just enough SVG to draw a labelled chart: lines, polylines, dots and text. The raster canvas
//! has no font, so anything that needs words goes through here.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use crate::canvas::Color;
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

impl Anchor {
    fn as_str(&self) -> &'static str {
        match *self {
            Anchor::Start => "start",
            Anchor::Middle => "middle",
            Anchor::End => "end",
        }
    }
}

#[derive(Debug, Clone)]
enum Element {
    Line {
        from: (f64, f64),
        to: (f64, f64),
        stroke: Color,
        width: f64,
    },
    Polyline {
        points: Vec<(f64, f64)>,
        stroke: Color,
        width: f64,
    },
    Circle {
        center: (f64, f64),
        r: f64,
        fill: Color,
    },
    Text {
        at: (f64, f64),
        text: String,
        size: f64,
        anchor: Anchor,
        // Turned a quarter counter-clockwise about `at`, for y axis labels.
        vertical: bool,
    },
}

#[derive(Debug, Clone)]
pub struct SvgDocument {
    width: i64,
    height: i64,
    background: Color,
    elements: Vec<Element>,
}

impl SvgDocument {
    pub fn new(width: i64, height: i64, background: Color) -> SvgDocument {
        SvgDocument {
            width,
            height,
            background,
            elements: vec![],
        }
    }

    pub fn line(&mut self, from: (f64, f64), to: (f64, f64), stroke: Color, width: f64) {
        self.elements.push(Element::Line {
            from,
            to,
            stroke,
            width,
        });
    }

    pub fn polyline(&mut self, points: &[(f64, f64)], stroke: Color, width: f64) {
        self.elements.push(Element::Polyline {
            points: points.to_vec(),
            stroke,
            width,
        });
    }

    pub fn circle(&mut self, center: (f64, f64), r: f64, fill: Color) {
        self.elements.push(Element::Circle { center, r, fill });
    }

    pub fn text(&mut self, at: (f64, f64), text: &str, size: f64, anchor: Anchor) {
        self.push_text(at, text, size, anchor, false);
    }

    pub fn vertical_text(&mut self, at: (f64, f64), text: &str, size: f64) {
        self.push_text(at, text, size, Anchor::Middle, true);
    }

    fn push_text(&mut self, at: (f64, f64), text: &str, size: f64, anchor: Anchor, vertical: bool) {
        self.elements.push(Element::Text {
            at,
            text: text.to_string(),
            size,
            anchor,
            vertical,
        });
    }

    /// Every text element in drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn render(&self) -> String {
        let mut svg = String::with_capacity(4096);
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            svg,
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            css(self.background)
        );
        for element in &self.elements {
            let _ = writeln!(svg, "  {}", element_to_svg(element));
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn element_to_svg(element: &Element) -> String {
    match element {
        Element::Line {
            from,
            to,
            stroke,
            width,
        } => format!(
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="{}"/>"#,
            from.0,
            from.1,
            to.0,
            to.1,
            css(*stroke),
            width
        ),
        Element::Polyline {
            points,
            stroke,
            width,
        } => {
            let points = points
                .iter()
                .map(|(x, y)| format!("{},{}", x, y))
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{}"/>"#,
                points,
                css(*stroke),
                width
            )
        }
        Element::Circle { center, r, fill } => format!(
            r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            center.0,
            center.1,
            r,
            css(*fill)
        ),
        Element::Text {
            at,
            text,
            size,
            anchor,
            vertical,
        } => {
            let transform = if *vertical {
                format!(r#" transform="rotate(-90 {} {})""#, at.0, at.1)
            } else {
                String::new()
            };
            format!(
                r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" text-anchor="{}"{}>{}</text>"#,
                at.0,
                at.1,
                size,
                anchor.as_str(),
                transform,
                escape(text)
            )
        }
    }
}

fn css(color: Color) -> String {
    format!("rgb({},{},{})", color[0], color[1], color[2])
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub fn write_svg<P: AsRef<Path>>(doc: &SvgDocument, path: P) -> Result<(), Error> {
    fs::write(path, doc.render())?;
    Ok(())
}
