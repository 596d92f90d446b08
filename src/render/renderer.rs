use std::fmt::Display;

use derive_builder::Builder;
use log::{debug, trace};
use rayon::prelude::*;

use crate::{
    math::color::Color,
    scene::{Scene, camera::Camera},
};

use super::{
    canvas::Canvas,
    depth::DepthResolution,
    depth_buffer::{self, DepthBuffer},
    projection::{PolygonProjection, Projection, ProjectionMode},
    raster,
    shading::{FaceShading, ShadingMode, ToonRamp},
    visibility::{self, Visibility},
};

/// Rasterization bands per worker thread when rendering in parallel.
const BANDS_PER_THREAD: usize = 4;

#[derive(PartialEq, Debug, Clone, Builder)]
#[builder(default, derive(Debug, PartialEq))]
/// Every knob of a frame that does not belong to the scene or the camera.
pub struct RenderSettings {
    #[builder(default = "RenderSettings::DEFAULT_WIDTH")]
    width: usize,
    #[builder(default = "RenderSettings::DEFAULT_HEIGHT")]
    height: usize,
    projection: ProjectionMode,
    /// Perspective image plane distance, in pixels.
    #[builder(default = "Projection::DEFAULT_VIEW_DISTANCE")]
    view_distance: f64,
    /// Direction in which axonometric projection shears depth, in radians.
    #[builder(default = "Projection::DEFAULT_AXONOMETRIC_ANGLE")]
    axonometric_angle: f64,
    #[builder(default = "Projection::DEFAULT_DEPTH_RATIO")]
    axonometric_depth_ratio: f64,
    shading: ShadingMode,
    depth_resolution: DepthResolution,
    background: Color,
    toon_ramp: ToonRamp,
    /// Rasterize horizontal bands on the rayon pool.
    #[builder(default = "true")]
    parallel: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: Self::DEFAULT_WIDTH,
            height: Self::DEFAULT_HEIGHT,
            projection: ProjectionMode::Perspective,
            view_distance: Projection::DEFAULT_VIEW_DISTANCE,
            axonometric_angle: Projection::DEFAULT_AXONOMETRIC_ANGLE,
            axonometric_depth_ratio: Projection::DEFAULT_DEPTH_RATIO,
            shading: ShadingMode::default(),
            depth_resolution: DepthResolution::default(),
            background: Color::black(),
            toon_ramp: ToonRamp::default(),
            parallel: true,
        }
    }
}

impl RenderSettingsBuilder {
    pub fn z_buffer(&mut self, enabled: bool) -> &mut Self {
        self.depth_resolution(DepthResolution::from_z_buffer_flag(enabled))
    }
}

impl RenderSettings {
    pub const DEFAULT_WIDTH: usize = 400;
    pub const DEFAULT_HEIGHT: usize = 400;

    pub fn projection(&self) -> Projection {
        match self.projection {
            ProjectionMode::Perspective => Projection::perspective(self.view_distance),
            ProjectionMode::Axonometric => Projection::Axonometric {
                angle: self.axonometric_angle,
                depth_ratio: self.axonometric_depth_ratio,
            },
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shading(&self) -> ShadingMode {
        self.shading
    }

    pub fn depth_resolution(&self) -> DepthResolution {
        self.depth_resolution
    }

    pub fn background(&self) -> Color {
        self.background
    }

    pub fn toon_ramp(&self) -> &ToonRamp {
        &self.toon_ramp
    }

    pub fn parallel(&self) -> bool {
        self.parallel
    }

    fn center(&self) -> (f64, f64) {
        (self.width as f64 / 2., self.height as f64 / 2.)
    }
}

/// What happened to the scene's polygons in one frame. Skipped geometry is counted here
/// instead of being reported as an error.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    pub polygons: usize,
    /// Back-facing polygons.
    pub culled: usize,
    /// Polygons without a normal.
    pub degenerate: usize,
    /// Polygons with a vertex at or behind the camera plane.
    pub projection_failures: usize,
    /// Visible polygons handed to the rasterizer.
    pub visible: usize,
    pub triangles: usize,
    /// Fan triangles with no screen-space area.
    pub degenerate_triangles: usize,
}

impl Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} polygons: {} visible ({} triangles, {} degenerate), {} culled, {} degenerate, {} behind camera",
            self.polygons,
            self.visible,
            self.triangles,
            self.degenerate_triangles,
            self.culled,
            self.degenerate,
            self.projection_failures
        )
    }
}

#[derive(PartialEq, Debug, Clone, Default, Builder)]
#[builder(default)]
/// Runs the frame pipeline: visibility, projection, depth ordering, rasterization.
pub struct Renderer {
    scene: Scene,
    camera: Camera,
    settings: RenderSettings,
}

impl Renderer {
    pub fn new(scene: Scene, camera: Camera, settings: RenderSettings) -> Self {
        Self {
            scene,
            camera,
            settings,
        }
    }

    /// Visible, projected and shaded polygons in drawing order.
    pub fn project_scene(&self) -> (Vec<PolygonProjection>, FrameStats) {
        let view = self.camera.view_matrix();
        let mode = self.settings.projection;
        let projection = self.settings.projection();
        let center = self.settings.center();
        let light = self.scene.light();
        let eye = self.camera.position();

        let mut stats = FrameStats::default();
        let mut projections = Vec::new();
        for object in self.scene.objects() {
            for polygon in object.polygons() {
                stats.polygons += 1;
                match visibility::classify(&polygon, &view, mode) {
                    Visibility::Visible => {}
                    Visibility::BackFacing => {
                        stats.culled += 1;
                        continue;
                    }
                    Visibility::Degenerate => {
                        trace!("skipping degenerate polygon with {} vertices", polygon.len());
                        stats.degenerate += 1;
                        continue;
                    }
                }

                let view_points = polygon.positions().map(|p| &view * p);
                let Some(points) = projection.project_polygon(view_points, center) else {
                    trace!("dropping polygon crossing the camera plane");
                    stats.projection_failures += 1;
                    continue;
                };
                let Some(shading) = FaceShading::compute(
                    &polygon,
                    self.settings.shading,
                    light,
                    eye,
                    object.material(),
                ) else {
                    stats.degenerate += 1;
                    continue;
                };

                let projected = PolygonProjection::new(points, shading);
                for (_, tri) in projected.triangles() {
                    stats.triangles += 1;
                    if raster::is_degenerate(&tri) {
                        stats.degenerate_triangles += 1;
                    }
                }
                stats.visible += 1;
                projections.push(projected);
            }
        }
        self.settings.depth_resolution.order(&mut projections);
        (projections, stats)
    }

    pub fn render(&self) -> Canvas {
        self.render_with_stats().0
    }

    pub fn render_with_stats(&self) -> (Canvas, FrameStats) {
        let mut canvas = Canvas::new(self.settings.width, self.settings.height);
        let mut depth = DepthBuffer::new(self.settings.width, self.settings.height);
        let stats = self.render_into(&mut canvas, &mut depth);
        (canvas, stats)
    }

    /// Renders into existing buffers, reallocating them only when the viewport size changed.
    pub fn render_into(&self, canvas: &mut Canvas, depth: &mut DepthBuffer) -> FrameStats {
        let (width, height) = (self.settings.width, self.settings.height);
        if canvas.width() != width || canvas.height() != height {
            *canvas = Canvas::new(width, height);
        }
        if depth.width() != width || depth.height() != height {
            *depth = DepthBuffer::new(width, height);
        } else {
            depth.clear();
        }
        canvas.fill(self.settings.background);

        let (projections, stats) = self.project_scene();
        rasterize(&projections, &self.settings, canvas, depth);
        debug!("frame: {stats}");
        stats
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }
}

/// Fills the projections into the canvas in order. With `settings.parallel` the frame is cut
/// into horizontal bands drawn on the rayon pool; every band walks the whole list clipped to
/// its rows, so each pixel sees the same writes in the same order as a sequential pass.
pub fn rasterize(
    projections: &[PolygonProjection],
    settings: &RenderSettings,
    canvas: &mut Canvas,
    depth: &mut DepthBuffer,
) {
    let width = canvas.width();
    let height = canvas.height();
    if width == 0 || height == 0 {
        return;
    }
    let depth_test = settings.depth_resolution.uses_depth_test();
    let ramp = &settings.toon_ramp;
    let band_rows = if settings.parallel {
        let bands = rayon::current_num_threads().max(1) * BANDS_PER_THREAD;
        height.div_ceil(bands).max(1)
    } else {
        height
    };
    let chunk = band_rows * width;
    let draw = |(band, (pixels, depths)): (usize, (&mut [Color], &mut [f64]))| {
        draw_band(projections, ramp, depth_test, band * band_rows, pixels, depths, width)
    };

    if settings.parallel {
        canvas
            .pixels_mut()
            .par_chunks_mut(chunk)
            .zip(depth.depths_mut().par_chunks_mut(chunk))
            .enumerate()
            .for_each(draw);
    } else {
        canvas
            .pixels_mut()
            .chunks_mut(chunk)
            .zip(depth.depths_mut().chunks_mut(chunk))
            .enumerate()
            .for_each(draw);
    }
}

/// Draws every projection clipped to the rows stored in `pixels`, which start at row `y0`.
fn draw_band(
    projections: &[PolygonProjection],
    ramp: &ToonRamp,
    depth_test: bool,
    y0: usize,
    pixels: &mut [Color],
    depths: &mut [f64],
    width: usize,
) {
    let rows = y0..y0 + pixels.len() / width;
    for projection in projections {
        for (ids, tri) in projection.triangles() {
            raster::scan_triangle(&tri, rows.clone(), width, |x, y, weights| {
                let id = (y - y0) * width + x;
                if depth_test
                    && !depth_buffer::test_and_set(
                        &mut depths[id],
                        raster::interpolate_depth(&tri, weights),
                    )
                {
                    return;
                }
                pixels[id] = projection.shading().color_at(ids, weights, ramp);
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::{FRAC_PI_4, PI};

    use super::*;
    use crate::{
        assert_approx_eq_low_prec,
        math::{point::Point, transform::Transform, tuple::{Axis, Tuple}},
        render::projection::ScreenPoint,
        scene::{
            SceneBuilder,
            io::obj_model::ObjModelParser,
            light::point_light::PointLightSource,
            object::{generator, material::Material},
        },
    };

    fn flat_triangle(points: [(f64, f64, f64); 3], color: Color) -> PolygonProjection {
        PolygonProjection::new(
            points
                .iter()
                .map(|&(x, y, z)| ScreenPoint::new(x, y, z))
                .collect(),
            FaceShading::Flat(color),
        )
    }

    fn draw(projections: &[PolygonProjection], settings: &RenderSettings) -> Canvas {
        let mut canvas = Canvas::new(settings.width(), settings.height());
        let mut depth = DepthBuffer::new(settings.width(), settings.height());
        let mut ordered = projections.to_vec();
        settings.depth_resolution().order(&mut ordered);
        rasterize(&ordered, settings, &mut canvas, &mut depth);
        canvas
    }

    fn small_settings(depth_resolution: DepthResolution) -> RenderSettings {
        RenderSettingsBuilder::default()
            .width(40)
            .height(40)
            .depth_resolution(depth_resolution)
            .build()
            .unwrap()
    }

    #[test]
    fn z_buffer_is_order_independent() {
        let near = flat_triangle([(0., 0., 10.), (30., 0., 10.), (0., 30., 10.)], Color::red());
        let far = flat_triangle([(5., 5., 50.), (35., 5., 50.), (5., 35., 50.)], Color::green());
        let settings = small_settings(DepthResolution::ZBuffer);

        let near_first = draw(&[near.clone(), far.clone()], &settings);
        let far_first = draw(&[far, near], &settings);

        assert_eq!(near_first, far_first);
        assert_eq!(near_first.pixel_at(10, 10), Color::red());
        assert_eq!(near_first.pixel_at(30, 6), Color::green());
        assert_eq!(near_first.pixel_at(39, 39), Color::black());
    }

    #[test]
    fn painter_fails_where_z_buffer_succeeds() {
        // a steep triangle dips in front of a flat one: nearer at the top, farther below,
        // yet its mean depth (40) is behind the flat one (30)
        let steep = flat_triangle([(0., 0., 10.), (40., 0., 10.), (0., 40., 100.)], Color::red());
        let flat = flat_triangle([(0., 0., 30.), (40., 0., 30.), (0., 40., 30.)], Color::blue());
        let scene = [steep, flat];

        let painter = draw(&scene, &small_settings(DepthResolution::Painter));
        let z_buffer = draw(&scene, &small_settings(DepthResolution::ZBuffer));

        assert_eq!(painter.pixel_at(2, 2), Color::blue());
        assert_eq!(z_buffer.pixel_at(2, 2), Color::red());
        assert_eq!(z_buffer.pixel_at(2, 35), Color::blue());
    }

    #[test]
    fn gouraud_centroid_is_mean_of_vertex_colors() {
        let triangle = PolygonProjection::new(
            vec![
                ScreenPoint::new(1.5, 1.5, 1.),
                ScreenPoint::new(19.5, 1.5, 1.),
                ScreenPoint::new(10.5, 28.5, 1.),
            ],
            FaceShading::Gouraud(vec![Color::red(), Color::green(), Color::blue()]),
        );
        let canvas = draw(&[triangle], &small_settings(DepthResolution::ZBuffer));
        assert_eq!(canvas.pixel_at(10, 10).to_rgb8(), [85, 85, 85]);
    }

    fn busy_scene() -> Scene {
        let mut cube = generator::cube(120.);
        cube.rotate_about_center(Axis::Y, 0.6).rotate_about_center(Axis::X, 0.3);
        let mut ico = generator::icosahedron(90.);
        ico.translate(60., 40., 80.);
        let mut dodeca = generator::dodecahedron(70.).with_material(Material::with_color(Color::red()));
        dodeca.translate(-90., -50., -30.);

        SceneBuilder::default()
            .add_object(cube)
            .add_object(ico)
            .add_object(dodeca)
            .build()
            .unwrap()
    }

    #[test]
    fn parallel_matches_sequential() {
        let camera = Camera::looking_at(Point::new(150., 200., -500.), Point::zero());
        for projection in [ProjectionMode::Perspective, ProjectionMode::Axonometric] {
            for shading in [ShadingMode::Flat, ShadingMode::Gouraud, ShadingMode::PhongToon] {
                for z_buffer in [true, false] {
                    let settings = |parallel| {
                        RenderSettingsBuilder::default()
                            .width(97)
                            .height(61)
                            .projection(projection)
                            .shading(shading)
                            .z_buffer(z_buffer)
                            .parallel(parallel)
                            .build()
                            .unwrap()
                    };
                    let sequential =
                        Renderer::new(busy_scene(), camera.clone(), settings(false)).render();
                    let parallel =
                        Renderer::new(busy_scene(), camera.clone(), settings(true)).render();

                    assert_eq!(sequential.to_rgb8(), parallel.to_rgb8());
                }
            }
        }
    }

    #[test]
    fn axonometric_view_renders_front_faces() {
        let settings = RenderSettingsBuilder::default()
            .projection(ProjectionMode::Axonometric)
            .build()
            .unwrap();
        let renderer = Renderer::new(busy_scene(), Camera::new(Point::new(0., 0., -500.)), settings);
        let (canvas, stats) = renderer.render_with_stats();

        assert_eq!(stats.projection_failures, 0);
        assert!(stats.visible > 0 && stats.culled > 0);

        // depth shears the scene along the 45 degree angle, up and to the right of centre
        let lit: Vec<(usize, usize)> = (0..canvas.height())
            .flat_map(|y| (0..canvas.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| canvas.pixel_at(x, y) != Color::black())
            .collect();
        assert!(!lit.is_empty());
        let mean_x = lit.iter().map(|&(x, _)| x as f64).sum::<f64>() / lit.len() as f64;
        let mean_y = lit.iter().map(|&(_, y)| y as f64).sum::<f64>() / lit.len() as f64;
        assert!(mean_x > 200. && mean_y < 200.);

        // the cube's centre lands on its sheared image
        let offset = 500. * Projection::DEFAULT_DEPTH_RATIO * FRAC_PI_4.cos();
        let (x, y) = ((200. + offset) as usize, (200. - offset) as usize);
        assert_ne!(canvas.pixel_at(x, y), Color::black());
    }

    #[test]
    fn objects_behind_camera_are_dropped_not_drawn() {
        let mut cube = generator::cube(100.);
        cube.translate(0., 0., -600.);
        let scene = SceneBuilder::default().add_object(cube).build().unwrap();
        let camera = Camera::new(Point::new(0., 0., -500.));
        let (canvas, stats) = Renderer::new(scene, camera, RenderSettings::default()).render_with_stats();

        assert_eq!(stats.visible, 0);
        assert!(stats.projection_failures + stats.culled == 6);
        assert!(canvas.pixels().iter().all(|&p| p == Color::black()));
    }

    const CUBE_OBJ: &str = "\
# unit cube
v -0.5 -0.5 -0.5
v 0.5 -0.5 -0.5
v 0.5 0.5 -0.5
v -0.5 0.5 -0.5
v -0.5 -0.5 0.5
v 0.5 -0.5 0.5
v 0.5 0.5 0.5
v -0.5 0.5 0.5
f 1 4 3 2
f 5 6 7 8
f 1 2 6 5
f 4 8 7 3
f 1 5 8 4
f 2 3 7 6
";

    #[test]
    fn cube_end_to_end() {
        let mut cube = ObjModelParser::new().parse(CUBE_OBJ).unwrap();
        assert_eq!(cube.vertices().len(), 8);
        assert_eq!(cube.faces().len(), 6);

        cube.scale_about_center(200., 200., 200.)
            .rotate_about_center(Axis::Y, PI / 6.)
            .rotate_about_center(Axis::X, PI / 9.);

        let light = PointLightSource::new(Point::new(-300., 400., -600.), Color::white());
        let scene = SceneBuilder::default()
            .add_object(cube.clone())
            .light(light)
            .build()
            .unwrap();
        let camera = Camera::new(Point::new(0., 0., -500.));
        let settings = RenderSettingsBuilder::default()
            .projection(ProjectionMode::Perspective)
            .shading(ShadingMode::Flat)
            .z_buffer(true)
            .build()
            .unwrap();
        let renderer = Renderer::new(scene, camera.clone(), settings);

        let (projections, stats) = renderer.project_scene();
        assert_eq!(stats.polygons, 6);
        assert_eq!(stats.visible, 3);
        assert_eq!(stats.culled, 3);
        assert_eq!(projections.iter().map(|p| p.triangles().count()).sum::<usize>(), 6);

        let canvas = renderer.render();
        let front = cube
            .polygons()
            .into_iter()
            .min_by(|a, b| a.normal().unwrap().z().total_cmp(&b.normal().unwrap().z()))
            .unwrap();
        let expected = light.shade(
            front.centroid().unwrap(),
            front.normal().unwrap(),
            camera.position(),
            cube.material(),
        );
        assert_approx_eq_low_prec!(canvas.pixel_at(200, 200), expected);
    }
}
