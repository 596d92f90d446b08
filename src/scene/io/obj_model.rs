use std::{collections::HashMap, fmt::Display, fs, path::Path};

use log::trace;

use crate::{
    math::{point::Point, tuple::Tuple, vector::Vector},
    scene::object::{
        Object,
        polygon::{TexCoord, Vertex},
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum ObjParseError {
    InvalidNumber { line: usize, value: String },
    MissingValue { line: usize, keyword: String },
    IndexOutOfRange { line: usize, index: i64 },
    MalformedFace { line: usize, reason: String },
}

impl Display for ObjParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjParseError::InvalidNumber { line, value } => {
                write!(f, "line {line}: invalid number '{value}'")
            }
            ObjParseError::MissingValue { line, keyword } => {
                write!(f, "line {line}: '{keyword}' is missing a value")
            }
            ObjParseError::IndexOutOfRange { line, index } => {
                write!(f, "line {line}: index {index} is out of range")
            }
            ObjParseError::MalformedFace { line, reason } => {
                write!(f, "line {line}: malformed face, {reason}")
            }
        }
    }
}

/// Position, texture and normal ids of one face corner, already resolved to 0-based indices.
type CornerKey = (usize, Option<usize>, Option<usize>);

/// Reads the `v`/`vt`/`vn`/`f` subset of Wavefront OBJ into a single [`Object`].
/// Faces keep their full vertex lists; corners that reference the same position, texture
/// coordinate and normal share one arena vertex.
pub struct ObjModelParser {
    ignored: usize,
    line: usize,
    positions: Vec<Point>,
    tex_coords: Vec<TexCoord>,
    normals: Vec<Vector>,
    vertices: Vec<Vertex>,
    corners: HashMap<CornerKey, usize>,
    faces: Vec<Vec<usize>>,
}

impl ObjModelParser {
    pub fn new() -> ObjModelParser {
        ObjModelParser {
            ignored: 0,
            line: 0,
            positions: Vec::new(),
            tex_coords: Vec::new(),
            normals: Vec::new(),
            vertices: Vec::new(),
            corners: HashMap::new(),
            faces: Vec::new(),
        }
    }

    pub fn ignored(&self) -> usize {
        self.ignored
    }

    pub fn positions(&self) -> &[Point] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vector] {
        &self.normals
    }

    pub fn tex_coords(&self) -> &[TexCoord] {
        &self.tex_coords
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    fn number<T: std::str::FromStr>(&self, value: &str) -> Result<T, ObjParseError> {
        value.parse().map_err(|_| ObjParseError::InvalidNumber {
            line: self.line,
            value: value.to_string(),
        })
    }

    fn parse_values<'a, const N: usize>(
        &self,
        keyword: &str,
        iter: &mut impl Iterator<Item = &'a str>,
    ) -> Result<[f64; N], ObjParseError> {
        let mut values = [0.; N];
        for value in values.iter_mut() {
            let token = iter.next().ok_or_else(|| ObjParseError::MissingValue {
                line: self.line,
                keyword: keyword.to_string(),
            })?;
            *value = self.number(token)?;
        }
        Ok(values)
    }

    /// 1-based index, or negative counting back from the last element read so far.
    fn resolve(&self, token: &str, len: usize) -> Result<usize, ObjParseError> {
        let index: i64 = self.number(token)?;
        let resolved = match index {
            i if i > 0 && i as usize <= len => Some(i as usize - 1),
            i if i < 0 && i.unsigned_abs() as usize <= len => Some(len - i.unsigned_abs() as usize),
            _ => None,
        };
        resolved.ok_or(ObjParseError::IndexOutOfRange {
            line: self.line,
            index,
        })
    }

    fn corner(&mut self, reference: &str) -> Result<usize, ObjParseError> {
        let parts: Vec<&str> = reference.split('/').collect();
        if parts.len() > 3 {
            return Err(ObjParseError::MalformedFace {
                line: self.line,
                reason: format!("'{reference}' has too many components"),
            });
        }
        let position = match parts.first() {
            Some(token) if !token.is_empty() => self.resolve(token, self.positions.len())?,
            _ => {
                return Err(ObjParseError::MalformedFace {
                    line: self.line,
                    reason: format!("'{reference}' has no vertex index"),
                });
            }
        };
        let tex_coord = match parts.get(1) {
            Some(token) if !token.is_empty() => Some(self.resolve(token, self.tex_coords.len())?),
            _ => None,
        };
        let normal = match parts.get(2) {
            Some(token) if !token.is_empty() => Some(self.resolve(token, self.normals.len())?),
            _ => None,
        };

        let key = (position, tex_coord, normal);
        if let Some(&id) = self.corners.get(&key) {
            return Ok(id);
        }
        let id = self.vertices.len();
        self.vertices.push(Vertex {
            position: self.positions[position],
            uv: tex_coord.map(|t| self.tex_coords[t]),
            normal: normal.map(|n| self.normals[n]),
        });
        self.corners.insert(key, id);
        Ok(id)
    }

    fn face<'a>(&mut self, iter: impl Iterator<Item = &'a str>) -> Result<(), ObjParseError> {
        let face = iter
            .map(|reference| self.corner(reference))
            .collect::<Result<Vec<_>, _>>()?;
        if face.len() < 3 {
            return Err(ObjParseError::MalformedFace {
                line: self.line,
                reason: format!("{} vertices, at least 3 are needed", face.len()),
            });
        }
        self.faces.push(face);
        Ok(())
    }

    fn parse_line(&mut self, line: &str) -> Result<(), ObjParseError> {
        if line.starts_with('#') || line.is_empty() {
            return Ok(());
        }

        let mut iter = line.split_whitespace();
        match iter.next() {
            Some("v") => {
                let [x, y, z] = self.parse_values("v", &mut iter)?;
                self.positions.push(Point::new(x, y, z));
            }
            Some("vt") => {
                // `vt u [v [w]]`, depth is dropped
                let [u] = self.parse_values("vt", &mut iter)?;
                let v = match iter.next() {
                    Some(token) => self.number(token)?,
                    None => 0.,
                };
                self.tex_coords.push(TexCoord { u, v });
            }
            Some("vn") => {
                let [x, y, z] = self.parse_values("vn", &mut iter)?;
                self.normals.push(Vector::new(x, y, z));
            }
            Some("f") => self.face(iter)?,
            _ => {
                trace!("obj line {} ignored: {line}", self.line);
                self.ignored += 1;
            }
        }
        Ok(())
    }

    pub fn not_consuming_parse(&mut self, source: &str) -> Result<(), ObjParseError> {
        for line in source.lines() {
            self.line += 1;
            self.parse_line(line.trim())?;
        }
        Ok(())
    }

    pub fn parse(mut self, source: &str) -> Result<Object, ObjParseError> {
        self.not_consuming_parse(source)?;
        Ok(self.into_object())
    }

    pub fn into_object(self) -> Object {
        Object::new(self.vertices, self.faces)
    }

    pub fn parse_to_object(source: &str) -> Result<Object, ObjParseError> {
        Self::default().parse(source)
    }

    pub fn load_file(path: impl AsRef<Path>) -> Result<Object, String> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {e}", path.display()))?;
        Self::parse_to_object(&source).map_err(|e| format!("'{}': {e}", path.display()))
    }
}

impl Default for ObjModelParser {
    fn default() -> Self {
        Self::new()
    }
}
