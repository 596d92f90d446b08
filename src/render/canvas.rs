use std::io::{self, BufWriter, Write};

use crate::math::color::Color;

/// Still-image encodings a [`Canvas`] can be written in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ImageFormat {
    /// Plain-text `P3` pixmap.
    Ppm,
    Png,
}

/// Color buffer of a frame, stored row by row from the top-left pixel.
/// The renderer splits `pixels_mut` into row bands, so rows stay contiguous.
#[derive(Debug, Clone, PartialEq)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Canvas {
    pub const PPM_LINE_WIDTH: usize = 70;

    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, Color::black())
    }

    pub fn filled(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Panics when `(x, y)` lies outside the canvas.
    pub fn pixel_at(&self, x: usize, y: usize) -> Color {
        assert!(x < self.width, "column {x} outside a canvas {} wide", self.width);
        self.pixels[y * self.width + x]
    }

    pub fn fill(&mut self, color: Color) {
        self.pixels.fill(color);
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [Color] {
        &mut self.pixels
    }

    fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks(self.width.max(1))
    }

    /// Packed 8-bit RGB triples, the layout both PNG and GIF frames take.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(Color::to_rgb8).collect()
    }

    pub fn write_image<W: Write>(&self, out: W, format: ImageFormat) -> io::Result<()> {
        match format {
            ImageFormat::Ppm => self.write_ppm(out),
            ImageFormat::Png => self.write_png(out),
        }
    }

    /// Plain PPM. Each pixel row starts a new line and no line exceeds
    /// [`Self::PPM_LINE_WIDTH`] characters.
    pub fn write_ppm<W: Write>(&self, out: W) -> io::Result<()> {
        let mut out = BufWriter::new(out);
        writeln!(out, "P3\n{} {}\n255", self.width, self.height)?;
        for row in self.rows() {
            let mut column = 0;
            for sample in row.iter().flat_map(Color::to_rgb8) {
                let digits = sample.to_string();
                if column > 0 && column + 1 + digits.len() > Self::PPM_LINE_WIDTH {
                    out.write_all(b"\n")?;
                    column = 0;
                } else if column > 0 {
                    out.write_all(b" ")?;
                    column += 1;
                }
                out.write_all(digits.as_bytes())?;
                column += digits.len();
            }
            out.write_all(b"\n")?;
        }
        out.flush()
    }

    pub fn write_png<W: Write>(&self, out: W) -> io::Result<()> {
        let mut encoder = png::Encoder::new(out, self.width as u32, self.height as u32);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.to_rgb8())?;
        writer.finish()?;
        Ok(())
    }
}

impl From<&Canvas> for gif::Frame<'_> {
    fn from(canvas: &Canvas) -> Self {
        gif::Frame::from_rgb(canvas.width as u16, canvas.height as u16, &canvas.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ppm_text(canvas: &Canvas) -> String {
        let mut out = Vec::new();
        canvas.write_ppm(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn fill_then_read_back() {
        let mut canvas = Canvas::new(4, 3);
        assert_eq!(canvas.pixel_at(3, 2), Color::black());
        canvas.fill(Color::blue());
        assert!(canvas.pixels().iter().all(|&p| p == Color::blue()));

        canvas.pixels_mut()[2 * 4 + 1] = Color::red();
        assert_eq!(canvas.pixel_at(1, 2), Color::red());
        assert_eq!(canvas.pixel_at(2, 1), Color::blue());
    }

    #[test]
    #[should_panic]
    fn reading_past_the_right_edge_panics() {
        Canvas::new(4, 3).pixel_at(4, 0);
    }

    #[test]
    fn ppm_has_one_line_per_row() {
        let mut canvas = Canvas::new(3, 2);
        canvas.pixels_mut()[0] = Color::new(1.5, 0., 0.);
        canvas.pixels_mut()[5] = Color::new(0., 0.5, -1.);

        assert_eq!(
            ppm_text(&canvas),
            "P3\n3 2\n255\n255 0 0 0 0 0 0 0 0\n0 0 0 0 0 0 0 128 0\n"
        );
    }

    #[test]
    fn ppm_wraps_long_rows() {
        let text = ppm_text(&Canvas::filled(10, 2, Color::new(1., 0.8, 0.6)));
        let body: Vec<&str> = text.lines().skip(3).collect();

        assert_eq!(body.len(), 4);
        assert!(body.iter().all(|line| line.len() <= Canvas::PPM_LINE_WIDTH));
        assert_eq!(body[0], "255 204 153 255 204 153 255 204 153 255 204 153 255 204 153 255 204");
        assert_eq!(body[1], "153 255 204 153 255 204 153 255 204 153 255 204 153");
        assert_eq!(body[0..2], body[2..4]);
    }

    #[test]
    fn png_starts_with_signature() {
        let mut bytes = Vec::new();
        Canvas::filled(4, 2, Color::white())
            .write_image(&mut bytes, ImageFormat::Png)
            .unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn gif_frame_matches_canvas_size() {
        let frame = gif::Frame::from(&Canvas::new(6, 5));
        assert_eq!((frame.width, frame.height), (6, 5));
    }
}
