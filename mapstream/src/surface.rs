//! See [`Surface`].

use mapstream_types::{Contour, Point2d, Polygon, Size};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::color::Color;
use crate::error::RenderError;
use crate::style::MarkShape;

/// Raster image shapes are painted onto. Coordinates are in pixels with the origin in the top-left
/// corner.
#[derive(Debug, Clone)]
pub struct Surface {
    pixmap: Pixmap,
}

impl Surface {
    /// Allocates a transparent surface.
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        Pixmap::new(width, height)
            .map(|pixmap| Self { pixmap })
            .ok_or_else(|| {
                RenderError::OutOfMemory(format!("cannot allocate {width}x{height} surface"))
            })
    }

    /// Wraps an existing pixmap.
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Size in pixels.
    pub fn size(&self) -> Size<u32> {
        Size::new(self.width(), self.height())
    }

    /// Underlying pixmap.
    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Underlying pixmap.
    pub fn pixmap_mut(&mut self) -> &mut Pixmap {
        &mut self.pixmap
    }

    /// Consumes the surface returning the pixmap.
    pub fn into_pixmap(self) -> Pixmap {
        self.pixmap
    }

    /// Fills the whole surface with the color.
    pub fn clear(&mut self, color: Color) {
        self.pixmap.fill(color.to_skia());
    }

    /// Color of the pixel, `None` if the pixel is outside of the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        let pixel = self.pixmap.pixel(x, y)?.demultiply();
        Some(Color::rgba(
            pixel.red(),
            pixel.green(),
            pixel.blue(),
            pixel.alpha(),
        ))
    }

    /// Returns true if no pixel of the surface has been painted.
    pub fn is_blank(&self) -> bool {
        self.pixmap.pixels().iter().all(|p| p.alpha() == 0)
    }

    /// Fills the polygon with even-odd rule and strokes its rings.
    pub fn draw_polygon(
        &mut self,
        polygon: &Polygon,
        fill: Option<Color>,
        stroke: Option<(Color, f64)>,
        antialias: bool,
    ) {
        let Some(path) = polygon_path(polygon) else {
            return;
        };

        if let Some(fill) = fill {
            let paint = paint(fill, antialias);
            self.pixmap
                .fill_path(&path, &paint, FillRule::EvenOdd, Transform::identity(), None);
        }

        if let Some((color, width)) = stroke {
            self.stroke_path(&path, color, width, antialias);
        }
    }

    /// Strokes the contour.
    pub fn draw_contour(&mut self, contour: &Contour, color: Color, width: f64, antialias: bool) {
        let mut builder = PathBuilder::new();
        append_contour(&mut builder, contour);
        if let Some(path) = builder.finish() {
            self.stroke_path(&path, color, width, antialias);
        }
    }

    /// Draws a mark centered at the point.
    pub fn draw_mark(
        &mut self,
        center: &Point2d,
        shape: MarkShape,
        size: f64,
        fill: Color,
        stroke: Option<(Color, f64)>,
        antialias: bool,
    ) {
        let half = (size / 2.0) as f32;
        let (x, y) = (center.x as f32, center.y as f32);
        let path = match shape {
            MarkShape::Circle => PathBuilder::from_circle(x, y, half),
            MarkShape::Square => tiny_skia::Rect::from_xywh(x - half, y - half, half * 2.0, half * 2.0)
                .map(PathBuilder::from_rect),
        };

        let Some(path) = path else {
            return;
        };

        self.pixmap.fill_path(
            &path,
            &paint(fill, antialias),
            FillRule::Winding,
            Transform::identity(),
            None,
        );

        if let Some((color, width)) = stroke {
            self.stroke_path(&path, color, width, antialias);
        }
    }

    /// Paints the other surface over this one with source-over blending.
    pub fn composite(&mut self, other: &Surface) {
        self.pixmap.draw_pixmap(
            0,
            0,
            other.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn stroke_path(&mut self, path: &Path, color: Color, width: f64, antialias: bool) {
        if width.is_nan() || width <= 0.0 {
            return;
        }

        let stroke = Stroke {
            width: width as f32,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            path,
            &paint(color, antialias),
            &stroke,
            Transform::identity(),
            None,
        );
    }
}

fn paint(color: Color, antialias: bool) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color(color.to_skia());
    paint.anti_alias = antialias;
    paint
}

fn polygon_path(polygon: &Polygon) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for contour in polygon.iter_contours() {
        append_contour(&mut builder, contour);
    }

    builder.finish()
}

fn append_contour(builder: &mut PathBuilder, contour: &Contour) {
    let mut points = contour.points().iter();
    let Some(first) = points.next() else {
        return;
    };

    builder.move_to(first.x as f32, first.y as f32);
    for point in points {
        builder.line_to(point.x as f32, point.y as f32);
    }

    if contour.is_closed() {
        builder.close();
    }
}
