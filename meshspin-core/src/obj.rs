/// Wavefront OBJ reader for the geometry subset: `v` points and `f` faces
use std::fs;
use std::path::{Path, PathBuf};

use nom::{
    bytes::complete::take_till,
    character::complete::{char, i64 as integer, space0, space1},
    combinator::{all_consuming, opt},
    multi::many0,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use tracing::{debug, info, warn};

use crate::error::ParseError;
use crate::geometry::{Point3D, Triangulation};

/// Loads a mesh file into a [`Triangulation`].
#[derive(Debug, Clone)]
pub struct Reader {
    path: PathBuf,
}

impl Reader {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and register its points and triangles in `target`.
    ///
    /// On error `target` is left exactly as it was passed in.
    #[tracing::instrument(skip_all, fields(path = %self.path.display()))]
    pub fn read_file(&self, target: &mut Triangulation) -> Result<(), ParseError> {
        debug!("Reading mesh file");
        let text = fs::read_to_string(&self.path).map_err(|source| {
            warn!("Failed to read mesh file: {}", source);
            ParseError::Io {
                path: self.path.clone(),
                source,
            }
        })?;

        parse_str(&text, target).map_err(|e| {
            warn!("Failed to parse mesh file: {}", e);
            e
        })?;

        info!(
            "Mesh loaded: {} unique points, {} triangles",
            target.point_count(),
            target.triangle_count()
        );
        Ok(())
    }
}

/// Parse OBJ text and register its geometry in `target`.
///
/// The whole input is validated before `target` is modified.
pub fn parse_str(input: &str, target: &mut Triangulation) -> Result<(), ParseError> {
    let document = parse_document(input)?;

    let declared = document.points.len();
    let mut indices = Vec::with_capacity(declared);
    for point in document.points {
        indices.push(target.register_point(point));
    }
    for [a, b, c] in document.faces {
        target.add_triangle(indices[a], indices[b], indices[c]);
    }

    debug!(
        "Registered {} declared points as {} unique points",
        declared,
        target.point_count()
    );
    Ok(())
}

/// Raw file contents with face references resolved to 0-based declaration order
#[derive(Debug, Default)]
struct Document {
    points: Vec<Point3D>,
    faces: Vec<[usize; 3]>,
}

fn parse_document(input: &str) -> Result<Document, ParseError> {
    let mut document = Document::default();

    for (number, raw) in input.lines().enumerate() {
        let line = number + 1;
        let content = raw
            .split_once('#')
            .map_or(raw, |(before, _)| before)
            .trim();
        if content.is_empty() {
            continue;
        }

        let (keyword, rest) = content
            .split_once(|c: char| c.is_whitespace())
            .unwrap_or((content, ""));

        match keyword {
            "v" => {
                let [x, y, z] = parse_line(vertex_coords, rest, line, "expected `v x y z [w]`")?;
                let point = Point3D::new(x, y, z);
                if !point.is_finite() {
                    return Err(ParseError::NonFiniteCoordinate { line });
                }
                document.points.push(point);
            }
            "f" => {
                let ids = parse_line(face_refs, rest, line, "expected `f a b c ...`")?;
                if ids.len() < 3 {
                    return Err(ParseError::DegenerateFace {
                        line,
                        count: ids.len(),
                    });
                }
                let resolved = ids
                    .iter()
                    .map(|&id| resolve(id, document.points.len(), line))
                    .collect::<Result<Vec<_>, _>>()?;

                // Fan out polygons around their first corner
                for pair in resolved[1..].windows(2) {
                    document.faces.push([resolved[0], pair[0], pair[1]]);
                }
            }
            // Normals, texture coordinates, groups and materials carry no geometry
            _ => {}
        }
    }

    Ok(document)
}

fn parse_line<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O>,
    input: &'a str,
    line: usize,
    expected: &str,
) -> Result<O, ParseError> {
    all_consuming(parser)(input)
        .map(|(_, output)| output)
        .map_err(|_| ParseError::Syntax {
            line,
            message: format!("{}, found `{}`", expected, input.trim()),
        })
}

fn vertex_coords(input: &str) -> IResult<&str, [f32; 3]> {
    let (input, x) = preceded(space0, float)(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    // Optional homogeneous weight
    let (input, _) = opt(preceded(space1, float))(input)?;
    let (input, _) = space0(input)?;
    Ok((input, [x, y, z]))
}

/// `a`, `a/t`, `a/t/n` or `a//n`; only the point id is kept
fn face_ref(input: &str) -> IResult<&str, i64> {
    terminated(
        integer,
        opt(preceded(char('/'), take_till(|c: char| c.is_whitespace()))),
    )(input)
}

fn face_refs(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, first) = preceded(space0, face_ref)(input)?;
    let (input, rest) = many0(preceded(space1, face_ref))(input)?;
    let (input, _) = space0(input)?;

    let mut ids = Vec::with_capacity(rest.len() + 1);
    ids.push(first);
    ids.extend(rest);
    Ok((input, ids))
}

/// Map a 1-based (or negative, relative) id onto a point declared so far
fn resolve(id: i64, declared: usize, line: usize) -> Result<usize, ParseError> {
    let unknown = || ParseError::UnknownPoint { line, id, declared };

    let index = if id > 0 {
        usize::try_from(id - 1).map_err(|_| unknown())?
    } else if id < 0 {
        let back = usize::try_from(id.unsigned_abs()).map_err(|_| unknown())?;
        declared.checked_sub(back).ok_or_else(unknown)?
    } else {
        return Err(unknown());
    };

    if index < declared {
        Ok(index)
    } else {
        Err(unknown())
    }
}
