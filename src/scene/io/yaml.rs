use std::{
    collections::HashMap,
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::ValueEnum;
use derive_builder::Builder;
use log::info;
use saphyr::Yaml;

use super::obj_model::{ObjModelParser, ObjParseError};
use crate::{
    math::{
        color::Color,
        point::Point,
        transform::Transformation,
        tuple::{Axis, Plane, Tuple},
    },
    render::{
        animator::FlightStep,
        renderer::RenderSettingsBuilder,
        shading::ToonRamp,
    },
    scene::{
        SceneBuilder,
        camera::{CameraBuilder, CameraInput},
        light::point_light::PointLightSource,
        object::{
            LocalTransformation, Object,
            generator::{self, SurfaceFunction},
            material::Material,
        },
    },
};

#[derive(Debug, PartialEq, Builder)]
/// The output of the parser. It contains builders for the scene, the camera and the render
/// settings, because the cli options can override the values in the yaml file.
/// It can also carry a camera flight and its framerate.
pub struct YamlSceneConfig {
    #[builder(setter(strip_option), default = "None")]
    pub animation_framerate: Option<u32>,
    #[builder(field(ty = "Vec<FlightStep>", build = "self.flight.clone()"))]
    pub flight: Vec<FlightStep>,

    #[builder(field(ty = "CameraBuilder", build = "self.camera_builder.clone()"))]
    pub camera_builder: CameraBuilder,
    #[builder(field(ty = "SceneBuilder", build = "self.scene_builder.clone()"))]
    pub scene_builder: SceneBuilder,
    #[builder(field(ty = "RenderSettingsBuilder", build = "self.settings_builder.clone()"))]
    pub settings_builder: RenderSettingsBuilder,
}

#[derive(Debug, Clone, PartialEq)]
pub enum YamlParseError {
    MissingField(String),
    InvalidField(String),
    UnexpectedValue,
    UnknownDefine(String),
    UnknownVariant(String),
    InvalidTransform(String),
    YamlSyntaxError(String),
    MultipleDocuments,
    FileReadError(String),
    ObjParsingError(String),
}

impl Display for YamlParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YamlParseError::MissingField(field) => write!(f, "missing field `{field}`"),
            YamlParseError::InvalidField(field) => write!(f, "invalid value of `{field}`"),
            YamlParseError::UnexpectedValue => {
                write!(f, "every entry has to start with `add`, `define`, `camera`, `options` or `flight`")
            }
            YamlParseError::UnknownDefine(name) => write!(f, "unknown define `{name}`"),
            YamlParseError::UnknownVariant(name) => write!(f, "unknown variant `{name}`"),
            YamlParseError::InvalidTransform(reason) => write!(f, "invalid transform: {reason}"),
            YamlParseError::YamlSyntaxError(reason) => write!(f, "yaml syntax error: {reason}"),
            YamlParseError::MultipleDocuments => write!(f, "multiple yaml documents in one file"),
            YamlParseError::FileReadError(reason) => write!(f, "{reason}"),
            YamlParseError::ObjParsingError(reason) => write!(f, "obj model: {reason}"),
        }
    }
}

impl From<ObjParseError> for YamlParseError {
    fn from(err: ObjParseError) -> Self {
        Self::ObjParsingError(err.to_string())
    }
}

const PREDEFINED_DEFINES: &str = r#"
- define: PI
  value: 3.141592653589793
- define: 2_PI
  value: 6.283185307179586
- define: FRAC_PI_2
  value: 1.5707963267948966
- define: FRAC_PI_3
  value: 1.0471975511965979
- define: FRAC_PI_4
  value: 0.7853981633974483
- define: FRAC_PI_6
  value: 0.5235987755982989
- define: FRAC_1_SQRT_2
  value: 0.7071067811865476

- define: WHITE
  value: [ 1, 1, 1 ]
- define: BLACK
  value: [ 0, 0, 0 ]
- define: RED
  value: [ 1, 0, 0 ]
- define: GREEN
  value: [ 0, 1, 0 ]
- define: BLUE
  value: [ 0, 0, 1 ]

- define: MATTE_MATERIAL
  value:
    specular: 0.05
    shininess: 15

- define: SHINY_MATERIAL
  value:
    specular: 1
    shininess: 300

- define: SCENE_LIGHT
  value:
    add: light
    at: [ -500, 500, -500 ]
    intensity: WHITE
"#;

pub struct YamlParser<'a> {
    yaml: &'a Yaml,
    input_path: Option<&'a Path>,
    result: YamlSceneConfigBuilder,
    defines: HashMap<String, Yaml>,
}

type YamlParseResult<T> = Result<T, YamlParseError>;
type YamlParserOutput = YamlParseResult<YamlSceneConfig>;

macro_rules! parse_optional_field {
    ($yaml_body:ident, $yaml_field:expr, |$val:ident| $apply:expr) => {
        match &$yaml_body[$yaml_field] {
            &Yaml::BadValue => {}
            $val => $apply,
        }
    };
}

fn expect_values(kind: &str, values: &[f64], n: usize) -> YamlParseResult<()> {
    if values.len() != n {
        return Err(YamlParseError::InvalidTransform(format!(
            "`{kind}` takes {n} values, got {}",
            values.len()
        )));
    }
    Ok(())
}

/// Overlays a use site on the define it names. Nested maps merge key by key, `transform`
/// lists concatenate, and a string equal to the define's own name keeps the inherited value.
fn overlay_define(name: &str, define: &Yaml, body: &Yaml) -> YamlParseResult<Yaml> {
    match (define, body) {
        (Yaml::Hash(define), Yaml::Hash(body)) => overlay_hash(name, define, body),
        _ => Err(YamlParseError::InvalidField(name.to_string())),
    }
}

fn overlay_hash(name: &str, base: &saphyr::Hash, over: &saphyr::Hash) -> YamlParseResult<Yaml> {
    let mut merged = base.clone();
    for (key, value) in over {
        // existing keys are updated in place, the first key names the operation
        match merged.get_mut(key) {
            Some(slot) => {
                let key = key
                    .as_str()
                    .ok_or_else(|| YamlParseError::InvalidField(format!("{key:?}")))?;
                let value = overlay(name, key, slot, value)?;
                *slot = value;
            }
            None => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(Yaml::Hash(merged))
}

fn overlay(name: &str, key: &str, base: &Yaml, over: &Yaml) -> YamlParseResult<Yaml> {
    Ok(match (base, over) {
        (Yaml::Hash(base), Yaml::Hash(over)) => return overlay_hash(name, base, over),
        (Yaml::Array(base), Yaml::Array(over)) if key == "transform" => {
            Yaml::Array(base.iter().chain(over).cloned().collect())
        }
        (Yaml::String(_), Yaml::String(s)) if s == name => base.clone(),
        (_, Yaml::BadValue) => base.clone(),
        (_, over) => over.clone(),
    })
}

impl<'a> YamlParser<'a> {
    fn file_read_error(&self, og_path: &str, path: &Path, err: std::io::Error) -> YamlParseError {
        let warning = if path.is_absolute() {
            ""
        } else {
            ". The path is relative, so it was resolved relative to the input file."
        };
        let scene_path = self.input_path.unwrap_or(Path::new(".")).to_string_lossy();
        let path = path.to_string_lossy();

        YamlParseError::FileReadError(format!(
            "Failed to read file `{path}`. Resolved from `{og_path}` specified in the scene `{scene_path}` : `{err}`{warning}"
        ))
    }
}

impl<'a> YamlParser<'a> {
    fn new(yaml: &'a Yaml, input_path: Option<&'a Path>, defines: HashMap<String, Yaml>) -> Self {
        Self {
            yaml,
            input_path,
            result: YamlSceneConfigBuilder::default(),
            defines,
        }
    }

    pub fn with_predefined_defines(
        yaml: &'a Yaml,
        input_path: Option<&'a Path>,
    ) -> YamlParseResult<Self> {
        let predefined = Self::str_to_yaml(PREDEFINED_DEFINES)?;
        let mut predefined_parser = YamlParser::new(&predefined, None, HashMap::new());
        predefined_parser.parse()?;

        Ok(YamlParser::new(yaml, input_path, predefined_parser.defines))
    }

    fn define(&self, name: &str) -> YamlParseResult<&Yaml> {
        self.defines
            .get(name)
            .ok_or_else(|| YamlParseError::UnknownDefine(name.to_string()))
    }

    fn parse_num(&self, value: &Yaml) -> YamlParseResult<f64> {
        match value {
            Yaml::Integer(value) => Ok(*value as f64),
            Yaml::Real(value) => value
                .parse()
                .map_err(|_| YamlParseError::InvalidField(value.to_string())),
            Yaml::String(name) => {
                if let Some(string) = name.strip_prefix('-') {
                    let yaml = Yaml::from_str(string);
                    return self.parse_num(&yaml).map(|v| -v);
                }
                self.parse_num(self.define(name)?)
            }
            _ => Err(YamlParseError::InvalidField(format!("{value:?} is not a number"))),
        }
    }

    fn parse_num_or(&self, body: &Yaml, key: &str, default: f64) -> YamlParseResult<f64> {
        match &body[key] {
            Yaml::BadValue => Ok(default),
            val => self.parse_num(val),
        }
    }

    fn parse_count(&self, value: &Yaml, key: &str) -> YamlParseResult<usize> {
        let num = self.parse_num(value)?;
        if num < 0. || num.fract() != 0. {
            return Err(YamlParseError::InvalidField(key.to_string()));
        }
        Ok(num as usize)
    }

    fn parse_vec(&self, vector: &[Yaml]) -> YamlParseResult<Vec<f64>> {
        vector.iter().map(|v| self.parse_num(v)).collect()
    }

    fn parse_vec_n<const N: usize>(&self, value: &Yaml) -> YamlParseResult<[f64; N]> {
        let vec = match value {
            Yaml::String(name) => return self.parse_vec_n(self.define(name)?),
            Yaml::BadValue => return Err(YamlParseError::MissingField(format!("{N} numbers"))),
            _ => value
                .as_vec()
                .ok_or_else(|| YamlParseError::InvalidField(format!("{value:?}")))?,
        };
        let values = self.parse_vec(vec)?;
        values
            .try_into()
            .map_err(|v: Vec<f64>| YamlParseError::InvalidField(format!("expected {N} numbers, got {}", v.len())))
    }

    fn parse_color(&self, value: &Yaml) -> YamlParseResult<Color> {
        let [r, g, b] = self.parse_vec_n(value)?;
        Ok(Color::new(r, g, b))
    }

    fn parse_point(&self, value: &Yaml) -> YamlParseResult<Point> {
        let [x, y, z] = self.parse_vec_n(value)?;
        Ok(Point::new(x, y, z))
    }

    fn parse_bool(&self, value: &Yaml, key: &str) -> YamlParseResult<bool> {
        value
            .as_bool()
            .ok_or_else(|| YamlParseError::InvalidField(key.to_string()))
    }

    fn parse_str<'b>(&self, value: &'b Yaml, key: &str) -> YamlParseResult<&'b str> {
        match value {
            Yaml::BadValue => Err(YamlParseError::MissingField(key.to_string())),
            _ => value
                .as_str()
                .ok_or_else(|| YamlParseError::InvalidField(key.to_string())),
        }
    }

    fn parse_variant<T: FromStr>(&self, value: &Yaml, key: &str) -> YamlParseResult<T> {
        let name = self.parse_str(value, key)?;
        name.parse()
            .map_err(|_| YamlParseError::UnknownVariant(name.to_string()))
    }

    fn parse_value_enum<T: ValueEnum>(&self, value: &Yaml, key: &str) -> YamlParseResult<T> {
        let name = self.parse_str(value, key)?;
        <T as ValueEnum>::from_str(name, true)
            .map_err(|_| YamlParseError::UnknownVariant(name.to_string()))
    }

    fn parse_light(&self, body: &Yaml) -> YamlParseResult<PointLightSource> {
        let at = self.parse_point(&body["at"])?;
        let intensity = match &body["intensity"] {
            Yaml::BadValue => Color::white(),
            val => self.parse_color(val)?,
        };

        Ok(PointLightSource::new(at, intensity))
    }

    fn parse_camera(&mut self, body: &Yaml) -> YamlParseResult<()> {
        parse_optional_field!(body, "move-step", |val| {
            self.result.camera_builder.move_step(self.parse_num(val)?);
        });
        parse_optional_field!(body, "turn-step", |val| {
            self.result.camera_builder.turn_step(self.parse_num(val)?);
        });

        match (&body["from"], &body["to"]) {
            (Yaml::BadValue, Yaml::BadValue) => {}
            (from, Yaml::BadValue) => {
                self.result.camera_builder.position(self.parse_point(from)?);
            }
            (Yaml::BadValue, _) => return Err(YamlParseError::MissingField("from".to_string())),
            (from, to) => {
                let (from, to) = (self.parse_point(from)?, self.parse_point(to)?);
                self.result.camera_builder.looking_at(from, to);
            }
        }
        parse_optional_field!(body, "angles", |val| {
            let [x, y, z] = self.parse_vec_n(val)?;
            self.result.camera_builder.angle_x(x).angle_y(y).angle_z(z);
        });

        Ok(())
    }

    /// Reflection coefficient: either a color, or a number scaling `base`.
    fn parse_coefficient(&self, value: &Yaml, base: Color) -> YamlParseResult<Color> {
        match value {
            Yaml::Integer(_) | Yaml::Real(_) => Ok(base * self.parse_num(value)?),
            Yaml::String(name) => self.parse_coefficient(self.define(name)?, base),
            _ => self.parse_color(value),
        }
    }

    fn parse_material(&self, body: &Yaml) -> YamlParseResult<Material> {
        match *body {
            Yaml::BadValue => {
                return Ok(Material::default());
            }
            Yaml::String(ref name) => {
                return self.parse_material(self.define(name)?);
            }
            _ => {}
        }
        let color = match &body["color"] {
            Yaml::BadValue => Color::white(),
            val => self.parse_color(val)?,
        };
        let mut res = Material::with_color(color);

        parse_optional_field!(body, "ambient", |val| res.ambient =
            self.parse_coefficient(val, color)?);
        parse_optional_field!(body, "diffuse", |val| res.diffuse =
            self.parse_coefficient(val, color)?);
        parse_optional_field!(body, "specular", |val| res.specular =
            self.parse_coefficient(val, Color::white())?);
        parse_optional_field!(body, "shininess", |val| res.shininess =
            self.parse_num(val)?);

        Ok(res)
    }

    fn parse_singular_transformation_literal(
        &self,
        kind: &str,
        values: Vec<f64>,
    ) -> YamlParseResult<LocalTransformation> {
        match kind {
            "translate" => {
                expect_values(kind, &values, 3)?;
                Ok(Transformation::Translation(values[0], values[1], values[2]).into())
            }
            "scale" => {
                expect_values(kind, &values, 3)?;
                Ok(Transformation::Scaling(values[0], values[1], values[2]).into())
            }
            "scale-uniform" => {
                expect_values(kind, &values, 1)?;
                Ok(Transformation::scaling_uniform(values[0]).into())
            }
            "shear" => {
                expect_values(kind, &values, 6)?;
                let [xy, xz, yx, yz, zx, zy] = [0, 1, 2, 3, 4, 5].map(|i| values[i]);
                Ok(Transformation::Shearing(xy, xz, yx, yz, zx, zy).into())
            }
            "scale-about-center" => match values[..] {
                [f] => Ok(LocalTransformation::ScaleAboutCenter(f, f, f)),
                [x, y, z] => Ok(LocalTransformation::ScaleAboutCenter(x, y, z)),
                _ => Err(YamlParseError::InvalidTransform(format!(
                    "`{kind}` takes 1 or 3 values, got {}",
                    values.len()
                ))),
            },
            "rotate-about-line" => {
                expect_values(kind, &values, 7)?;
                let p1 = Point::new(values[0], values[1], values[2]);
                let p2 = Point::new(values[3], values[4], values[5]);
                Ok(Transformation::RotationAboutLine(p1, p2, values[6]).into())
            }
            _ => {
                if let Some(axis) = kind.strip_prefix("rotate-about-center-") {
                    let axis = Axis::from_str(axis).map_err(YamlParseError::InvalidTransform)?;
                    expect_values(kind, &values, 1)?;
                    return Ok(LocalTransformation::RotateAboutCenter(axis, values[0]));
                }
                if let Some(axis) = kind.strip_prefix("rotate-") {
                    let axis = Axis::from_str(axis).map_err(YamlParseError::InvalidTransform)?;
                    expect_values(kind, &values, 1)?;
                    return Ok(Transformation::Rotation(axis, values[0]).into());
                }
                if let Some(plane) = kind.strip_prefix("reflect-") {
                    let plane = Plane::from_str(plane).map_err(YamlParseError::InvalidTransform)?;
                    expect_values(kind, &values, 0)?;
                    return Ok(Transformation::Reflection(plane).into());
                }
                Err(YamlParseError::InvalidTransform(format!("unknown transform `{kind}`")))
            }
        }
    }

    fn parse_singular_transformation(&self, body: &Yaml) -> YamlParseResult<LocalTransformation> {
        let values = body
            .as_vec()
            .ok_or_else(|| YamlParseError::InvalidTransform(format!("{body:?}")))?;
        let (kind, values) = values
            .split_first()
            .ok_or_else(|| YamlParseError::InvalidTransform("empty transform".to_string()))?;
        let kind = kind
            .as_str()
            .ok_or_else(|| YamlParseError::InvalidTransform(format!("{kind:?}")))?;
        let values = self.parse_vec(values)?;

        self.parse_singular_transformation_literal(kind, values)
    }

    fn parse_transformations(&self, body: &Yaml) -> YamlParseResult<Vec<LocalTransformation>> {
        match body {
            Yaml::BadValue => Ok(Vec::new()),
            Yaml::String(name) => self.parse_transformations(self.define(name)?),
            Yaml::Array(arr) => {
                let mut res = Vec::new();
                for val in arr {
                    match val {
                        Yaml::String(name) => {
                            res.extend(self.parse_transformations(self.define(name)?)?)
                        }
                        _ => res.push(self.parse_singular_transformation(val)?),
                    }
                }
                Ok(res)
            }
            _ => Err(YamlParseError::InvalidField("transform".to_string())),
        }
    }

    fn resolve_path_from_scene(&self, path: &Path) -> PathBuf {
        let input_dir = match self.input_path {
            Some(input_path) => input_path.parent().unwrap_or_else(|| Path::new(".")),
            None => Path::new("."),
        };

        input_dir.join(PathBuf::from(path))
    }

    fn parse_obj_model(&self, body: &Yaml) -> YamlParseResult<Object> {
        let file_path = self.parse_str(&body["file"], "file")?;
        let path = self.resolve_path_from_scene(&PathBuf::from(file_path));

        let data = std::fs::read_to_string(&path)
            .map_err(|err| self.file_read_error(file_path, &path, err))?;

        let mut object = ObjModelParser::parse_to_object(&data)?;
        info!(
            "loaded model {}: {} vertices, {} faces",
            path.display(),
            object.vertices().len(),
            object.faces().len()
        );
        match &body["smooth"] {
            Yaml::BadValue => {}
            val => {
                if self.parse_bool(val, "smooth")? {
                    object.smooth_normals();
                }
            }
        }
        Ok(object)
    }

    fn parse_profile(&self, body: &Yaml) -> YamlParseResult<Vec<(f64, f64)>> {
        let points = body["profile"]
            .as_vec()
            .ok_or_else(|| YamlParseError::MissingField("profile".to_string()))?;
        points
            .iter()
            .map(|p| self.parse_vec_n(p).map(|[x, r]| (x, r)))
            .collect()
    }

    fn parse_object_with_kind(&self, body: &Yaml, obj_kind: &str) -> YamlParseResult<Object> {
        let material = self.parse_material(&body["material"])?;
        let transformations = self.parse_transformations(&body["transform"])?;

        let mut object = match obj_kind {
            "cube" => generator::cube(self.parse_num_or(body, "size", 100.)?),
            "tetrahedron" => generator::tetrahedron(self.parse_num_or(body, "radius", 100.)?),
            "octahedron" => generator::octahedron(self.parse_num_or(body, "radius", 100.)?),
            "icosahedron" => generator::icosahedron(self.parse_num_or(body, "radius", 100.)?),
            "dodecahedron" => generator::dodecahedron(self.parse_num_or(body, "radius", 100.)?),
            "obj" => self.parse_obj_model(body)?,
            "revolution" => {
                let profile = self.parse_profile(body)?;
                let segments = match &body["segments"] {
                    Yaml::BadValue => 24,
                    val => self.parse_count(val, "segments")?,
                };
                generator::surface_of_revolution(&profile, segments)
            }
            "surface" => {
                let function: SurfaceFunction = self.parse_variant(&body["function"], "function")?;
                let [x0, x1] = self.parse_vec_n(&body["x-range"])?;
                let [y0, y1] = self.parse_vec_n(&body["y-range"])?;
                let steps = match &body["steps"] {
                    Yaml::BadValue => 20,
                    val => self.parse_count(val, "steps")?,
                };
                generator::function_surface(|x, y| function.eval(x, y), (x0, x1), (y0, y1), steps)
            }
            name => return Err(YamlParseError::UnknownVariant(name.to_string())),
        };
        object.set_material(material);
        object.local_transform(&transformations);
        Ok(object)
    }

    fn parse_toon_ramp(&self, body: &Yaml) -> YamlParseResult<ToonRamp> {
        let bands = body["bands"]
            .as_vec()
            .ok_or_else(|| YamlParseError::MissingField("toon-ramp.bands".to_string()))?
            .iter()
            .map(|band| self.parse_vec_n(band).map(|[threshold, level]| (threshold, level)))
            .collect::<YamlParseResult<Vec<_>>>()?;
        let floor = self.parse_num_or(body, "floor", ToonRamp::default().floor())?;
        Ok(ToonRamp::new(bands, floor))
    }

    fn parse_options(&mut self, body: &Yaml) -> YamlParseResult<()> {
        parse_optional_field!(body, "width", |val| {
            self.result.settings_builder.width(self.parse_count(val, "width")?);
        });
        parse_optional_field!(body, "height", |val| {
            self.result.settings_builder.height(self.parse_count(val, "height")?);
        });
        parse_optional_field!(body, "projection", |val| {
            self.result
                .settings_builder
                .projection(self.parse_value_enum(val, "projection")?);
        });
        parse_optional_field!(body, "shading", |val| {
            self.result
                .settings_builder
                .shading(self.parse_value_enum(val, "shading")?);
        });
        parse_optional_field!(body, "z-buffer", |val| {
            self.result
                .settings_builder
                .z_buffer(self.parse_bool(val, "z-buffer")?);
        });
        parse_optional_field!(body, "view-distance", |val| {
            self.result.settings_builder.view_distance(self.parse_num(val)?);
        });
        parse_optional_field!(body, "axonometric-angle", |val| {
            self.result
                .settings_builder
                .axonometric_angle(self.parse_num(val)?);
        });
        parse_optional_field!(body, "axonometric-depth-ratio", |val| {
            self.result
                .settings_builder
                .axonometric_depth_ratio(self.parse_num(val)?);
        });
        parse_optional_field!(body, "background", |val| {
            self.result.settings_builder.background(self.parse_color(val)?);
        });
        parse_optional_field!(body, "parallel", |val| {
            self.result
                .settings_builder
                .parallel(self.parse_bool(val, "parallel")?);
        });
        parse_optional_field!(body, "toon-ramp", |val| {
            self.result.settings_builder.toon_ramp(self.parse_toon_ramp(val)?);
        });
        parse_optional_field!(body, "framerate", |val| {
            self.result
                .animation_framerate(self.parse_count(val, "framerate")? as u32);
        });
        Ok(())
    }

    fn parse_flight_step(&self, body: &Yaml) -> YamlParseResult<FlightStep> {
        let frames = self.parse_count(&body["frames"], "frames")?;
        let input = match &body["input"] {
            Yaml::BadValue => CameraInput::none(),
            Yaml::Array(names) => {
                let names = names
                    .iter()
                    .map(|name| self.parse_str(name, "input"))
                    .collect::<YamlParseResult<Vec<_>>>()?;
                CameraInput::from_names(names).map_err(YamlParseError::UnknownVariant)?
            }
            val => self
                .parse_str(val, "input")?
                .parse()
                .map_err(YamlParseError::UnknownVariant)?,
        };
        Ok(FlightStep::new(frames, input))
    }

    fn parse_flight(&mut self, body: &Yaml) -> YamlParseResult<()> {
        let steps = body
            .as_vec()
            .ok_or_else(|| YamlParseError::InvalidField("flight".to_string()))?
            .iter()
            .map(|step| self.parse_flight_step(step))
            .collect::<YamlParseResult<Vec<_>>>()?;
        self.result.flight.extend(steps);
        Ok(())
    }

    fn parse_add(&mut self, what: &str, body: &Yaml) -> YamlParseResult<()> {
        match what {
            "camera" => self.parse_camera(body)?,
            "light" => {
                let light = self.parse_light(body)?;
                self.result.scene_builder.light(light);
            }
            "cube" | "tetrahedron" | "octahedron" | "icosahedron" | "dodecahedron" | "obj"
            | "revolution" | "surface" => {
                let object = self.parse_object_with_kind(body, what)?;
                self.result.scene_builder.add_object(object);
            }
            name => {
                let def = self
                    .defines
                    .get(name)
                    .ok_or_else(|| YamlParseError::UnknownVariant(name.to_string()))?;
                let body = overlay_define(name, def, body)?;
                if body["add"].as_str() == Some(name) {
                    return Err(YamlParseError::UnknownVariant(name.to_string()));
                }
                return self.parse_operation(&body);
            }
        }
        Ok(())
    }

    fn parse_define(
        &mut self,
        name: &str,
        extends: Option<&str>,
        body: &Yaml,
    ) -> YamlParseResult<()> {
        let value = match extends {
            Some(extend) => overlay_define(name, self.define(extend)?, body)?,
            None => body.clone(),
        };
        self.defines.insert(name.to_string(), value);
        Ok(())
    }

    fn parse_operation(&mut self, yaml_obj: &Yaml) -> YamlParseResult<()> {
        let Yaml::Hash(hash) = yaml_obj else {
            return Err(YamlParseError::UnexpectedValue);
        };
        match hash.front() {
            Some((Yaml::String(operation), Yaml::String(what))) => match operation.as_str() {
                "add" => self.parse_add(what, yaml_obj)?,
                "define" => {
                    let extends = yaml_obj["extend"].as_str();
                    let body = &yaml_obj["value"];
                    self.parse_define(what, extends, body)?;
                }
                _ => return Err(YamlParseError::UnexpectedValue),
            },
            Some((Yaml::String(operation), Yaml::Null)) => match operation.as_str() {
                "camera" => self.parse_camera(yaml_obj)?,
                "options" => self.parse_options(yaml_obj)?,
                _ => return Err(YamlParseError::UnexpectedValue),
            },
            Some((Yaml::String(operation), steps @ Yaml::Array(_))) if operation == "flight" => {
                self.parse_flight(steps)?
            }
            _ => return Err(YamlParseError::UnexpectedValue),
        }
        Ok(())
    }

    fn parse(&mut self) -> YamlParseResult<()> {
        let yaml = self.yaml;
        match yaml {
            Yaml::Array(operations) => {
                for yaml_obj in operations {
                    self.parse_operation(yaml_obj)?;
                }
                Ok(())
            }
            Yaml::Null | Yaml::BadValue => Ok(()),
            _ => Err(YamlParseError::UnexpectedValue),
        }
    }

    fn parse_consume(mut self) -> YamlParserOutput {
        self.parse()?;

        self.result
            .build()
            .map_err(|e| YamlParseError::MissingField(e.to_string()))
    }
}

impl YamlParser<'_> {
    fn str_to_yaml(source: &str) -> YamlParseResult<Yaml> {
        let mut docs = saphyr::Yaml::load_from_str(source)
            .map_err(|e| YamlParseError::YamlSyntaxError(e.to_string()))?;
        match docs.len() {
            1 => Ok(std::mem::replace(&mut docs[0], Yaml::BadValue)),
            0 => Ok(Yaml::Array(vec![])),
            _ => Err(YamlParseError::MultipleDocuments),
        }
    }
}

pub fn parse(source: &str, input_path: Option<&Path>) -> YamlParserOutput {
    let yaml = YamlParser::str_to_yaml(source)?;
    let parser = YamlParser::with_predefined_defines(&yaml, input_path)?;

    parser.parse_consume()
}

pub fn parse_file(source: &str, input_path: &Path) -> YamlParserOutput {
    parse(source, Some(input_path))
}
