use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Error;

pub type Color = [u8; 3];

pub const BLACK: Color = [0, 0, 0];
pub const WHITE: Color = [255, 255, 255];
pub const DARK_OLIVE_GREEN: Color = [85, 107, 47];
pub const TURQUOISE: Color = [64, 224, 208];
pub const DARK_ORCHID: Color = [153, 50, 204];
pub const IVORY: Color = [255, 255, 240];
pub const DIM_GRAY: Color = [105, 105, 105];
pub const NAVY: Color = [0, 0, 128];
pub const LIGHT_GRAY: Color = [211, 211, 211];

/// The Canvas struct is the simplest possible raster: a row-major vector of RGB pixels. Drawing
/// outside the canvas is silently clipped.
#[derive(Clone)]
pub struct Canvas {
    height: i64,
    width: i64,
    pixels: Vec<Color>,
}

impl Canvas {
    pub fn new(w: i64, h: i64, background: Color) -> Canvas {
        Canvas {
            height: h,
            width: w,
            pixels: vec![background; (h * w) as usize],
        }
    }
    pub fn width(&self) -> i64 {
        self.width
    }
    pub fn height(&self) -> i64 {
        self.height
    }
    pub fn set_px(&mut self, x: i64, y: i64, color: Color) {
        if x < self.width && x >= 0 {
            if y < self.height && y >= 0 {
                self.pixels[((self.width * y) + x) as usize] = color
            }
        }
    }
    pub fn px(&self, x: i64, y: i64) -> Option<Color> {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return None;
        }
        Some(self.pixels[((self.width * y) + x) as usize])
    }

    /// Fills every pixel whose center lies within `radius` of (cx, cy).
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let (x0, x1) = ((cx - radius).floor() as i64, (cx + radius).ceil() as i64);
        let (y0, y1) = ((cy - radius).floor() as i64, (cy + radius).ceil() as i64);
        let r2 = radius * radius;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.set_px(x, y, color);
                }
            }
        }
    }

    /// Draws the outline of a circle one pixel wide, using the midpoint circle algorithm.
    pub fn stroke_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Color) {
        let (cx, cy) = (cx.round() as i64, cy.round() as i64);
        let mut x = radius.round() as i64;
        let mut y = 0;
        let mut err = 1 - x;
        while x >= y {
            for &(px, py) in &[
                (x, y),
                (y, x),
                (-y, x),
                (-x, y),
                (-x, -y),
                (-y, -x),
                (y, -x),
                (x, -y),
            ] {
                self.set_px(cx + px, cy + py, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Color) {
        for (x, y) in line_points(x0, y0, x1, y1) {
            self.set_px(x, y, color);
        }
    }

    /// A line `width` pixels across, drawn as discs along a one pixel spine.
    pub fn draw_thick_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, width: f64, color: Color) {
        for (x, y) in line_points(x0, y0, x1, y1) {
            self.fill_disc(x as f64 + 0.5, y as f64 + 0.5, width / 2.0, color);
        }
    }
}

// Bresenham: every pixel on the line from (x0, y0) to (x1, y1), both ends included.
fn line_points(x0: i64, y0: i64, x1: i64, y1: i64) -> Vec<(i64, i64)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut points = vec![];
    loop {
        points.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

// write_ppm writes a plain (P3) PPM image of the canvas
pub fn write_ppm<W: Write>(canvas: &Canvas, out: W) -> Result<(), Error> {
    let mut ppm = BufWriter::new(out);

    write!(ppm, "P3\n# Created by taylormotion\n")?;
    write!(ppm, "{} {}\n", canvas.width, canvas.height)?;
    write!(ppm, "255\n")?;
    for px in &canvas.pixels {
        write!(ppm, "{} {} {}\n", px[0], px[1], px[2])?;
    }
    ppm.flush()?;
    Ok(())
}

pub fn write_ppm_file<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<(), Error> {
    write_ppm(canvas, File::create(path)?)
}

pub fn write_png<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<(), Error> {
    let mut imgbuf = image::ImageBuffer::<image::Rgb<u8>, Vec<u8>>::new(
        canvas.width as u32,
        canvas.height as u32,
    );
    for (x, y, pixel) in imgbuf.enumerate_pixels_mut() {
        let idx = (canvas.width * y as i64 + x as i64) as usize;
        *pixel = image::Rgb(canvas.pixels[idx]);
    }
    imgbuf.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Picks PNG or PPM from the file extension; anything other than `.png` is written as PPM.
pub fn write_image<P: AsRef<Path>>(canvas: &Canvas, path: P) -> Result<(), Error> {
    let is_png = path
        .as_ref()
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false);
    if is_png {
        write_png(canvas, path)
    } else {
        write_ppm_file(canvas, path)
    }
}
