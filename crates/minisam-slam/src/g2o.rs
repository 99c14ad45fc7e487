use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use glam::{DVec2, DVec3};
use minisam_core::{key, Key, KeyError, Variable, VariableError, Variables};
use minisam_lie::{LieError, SE2, SE3, SO2, SO3};

/// Error types for the g2o reader.
#[derive(Debug, thiserror::Error)]
pub enum G2oError {
    /// Error reading the file
    #[error("error reading file")]
    IoError(#[from] std::io::Error),

    /// Parse error, with the 1-based line number
    #[error("Parse error at line {line}: {message}")]
    ParseError { line: usize, message: String },

    /// The file mixes 2D and 3D records
    #[error("Line {line} is a {found}D record in a {expected}D file")]
    MixedDimensions {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Variable(#[from] VariableError),
}

/// A relative pose measurement between two vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct G2oEdge {
    pub key1: Key,
    pub key2: Key,
    /// Either a [`Variable::SE2`] or a [`Variable::SE3`].
    pub measurement: Variable,
    /// Row-major symmetric information matrix, 3x3 for SE2 and 6x6 for SE3.
    pub information: Vec<f64>,
}

impl G2oEdge {
    /// Dimension of the information matrix.
    pub fn dim(&self) -> usize {
        self.measurement.dim()
    }
}

/// The content of a g2o file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct G2oGraph {
    /// Initial vertex estimates keyed by `key('x', id)`.
    pub variables: Variables,
    pub edges: Vec<G2oEdge>,
    /// `true` for SE3 data, `false` for SE2 data or an empty file.
    pub is_3d: bool,
}

/// Read a g2o file with `VERTEX_SE2`, `EDGE_SE2`, `VERTEX_SE3:QUAT` and
/// `EDGE_SE3:QUAT` records.
///
/// # Arguments
///
/// * `path` - The path to the g2o file.
///
/// # Returns
///
/// The vertices as [`Variables`] and the edges in file order.
pub fn load_g2o(path: impl AsRef<Path>) -> Result<G2oGraph, G2oError> {
    let file = File::open(path)?;
    parse_g2o(BufReader::new(file))
}

/// Parse g2o records from any buffered reader.
///
/// Unknown record types are skipped with a warning.
pub fn parse_g2o(reader: impl BufRead) -> Result<G2oGraph, G2oError> {
    let mut graph = G2oGraph::default();
    let mut dimension: Option<usize> = None;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let parts = line.split_whitespace().collect::<Vec<_>>();

        let Some((&tag, fields)) = parts.split_first() else {
            continue;
        };
        if tag.starts_with('#') {
            continue;
        }

        let record_dim = match tag {
            "VERTEX_SE2" | "EDGE_SE2" => 2,
            "VERTEX_SE3:QUAT" | "EDGE_SE3:QUAT" => 3,
            _ => {
                log::warn!("g2o: skipping unsupported record {tag} at line {line_number}");
                continue;
            }
        };

        match dimension {
            Some(expected) if expected != record_dim => {
                return Err(G2oError::MixedDimensions {
                    line: line_number,
                    expected,
                    found: record_dim,
                });
            }
            _ => dimension = Some(record_dim),
        }

        let parser = LineParser {
            line: line_number,
            fields,
        };
        match tag {
            "VERTEX_SE2" => {
                let (id, pose) = parser.vertex_se2()?;
                graph.variables.add(key('x', id)?, pose)?;
            }
            "VERTEX_SE3:QUAT" => {
                let (id, pose) = parser.vertex_se3()?;
                graph.variables.add(key('x', id)?, pose)?;
            }
            "EDGE_SE2" => graph.edges.push(parser.edge_se2()?),
            _ => graph.edges.push(parser.edge_se3()?),
        }
    }

    graph.is_3d = dimension == Some(3);
    log::debug!(
        "g2o: loaded {} vertices and {} edges",
        graph.variables.len(),
        graph.edges.len()
    );
    Ok(graph)
}

/// Fields of one record, after the tag.
struct LineParser<'a> {
    line: usize,
    fields: &'a [&'a str],
}

impl LineParser<'_> {
    fn error(&self, message: impl Into<String>) -> G2oError {
        G2oError::ParseError {
            line: self.line,
            message: message.into(),
        }
    }

    fn expect_len(&self, expected: usize) -> Result<(), G2oError> {
        if self.fields.len() != expected {
            return Err(self.error(format!(
                "expected {expected} fields, got {}",
                self.fields.len()
            )));
        }
        Ok(())
    }

    fn part<T: std::str::FromStr>(&self, index: usize) -> Result<T, G2oError>
    where
        T::Err: std::fmt::Display,
    {
        let s = self.fields[index];
        s.parse::<T>()
            .map_err(|e| self.error(format!("{s}: {e}")))
    }

    fn floats(&self, start: usize, count: usize) -> Result<Vec<f64>, G2oError> {
        (start..start + count).map(|i| self.part(i)).collect()
    }

    fn lie(&self, result: Result<SO3, LieError>) -> Result<SO3, G2oError> {
        result.map_err(|e| self.error(e.to_string()))
    }

    fn se2(&self, start: usize) -> Result<SE2, G2oError> {
        let v = self.floats(start, 3)?;
        Ok(SE2::new(SO2::exp(v[2]), DVec2::new(v[0], v[1])))
    }

    fn se3(&self, start: usize) -> Result<SE3, G2oError> {
        let v = self.floats(start, 7)?;
        let rotation = self.lie(SO3::from_xyzw(v[3], v[4], v[5], v[6]))?;
        Ok(SE3::new(rotation, DVec3::new(v[0], v[1], v[2])))
    }

    /// `VERTEX_SE2 id x y theta`
    fn vertex_se2(&self) -> Result<(u64, SE2), G2oError> {
        self.expect_len(4)?;
        Ok((self.part(0)?, self.se2(1)?))
    }

    /// `VERTEX_SE3:QUAT id x y z qx qy qz qw`
    fn vertex_se3(&self) -> Result<(u64, SE3), G2oError> {
        self.expect_len(8)?;
        Ok((self.part(0)?, self.se3(1)?))
    }

    /// `EDGE_SE2 id1 id2 dx dy dtheta` followed by the 6 upper triangular
    /// information entries.
    fn edge_se2(&self) -> Result<G2oEdge, G2oError> {
        self.expect_len(2 + 3 + 6)?;
        Ok(G2oEdge {
            key1: key('x', self.part(0)?)?,
            key2: key('x', self.part(1)?)?,
            measurement: Variable::SE2(self.se2(2)?),
            information: symmetric_from_upper(&self.floats(5, 6)?, 3),
        })
    }

    /// `EDGE_SE3:QUAT id1 id2 x y z qx qy qz qw` followed by the 21 upper
    /// triangular information entries.
    fn edge_se3(&self) -> Result<G2oEdge, G2oError> {
        self.expect_len(2 + 7 + 21)?;
        Ok(G2oEdge {
            key1: key('x', self.part(0)?)?,
            key2: key('x', self.part(1)?)?,
            measurement: Variable::SE3(self.se3(2)?),
            information: symmetric_from_upper(&self.floats(9, 21)?, 6),
        })
    }
}

/// Expand row-wise upper triangular entries into a full row-major matrix.
fn symmetric_from_upper(upper: &[f64], n: usize) -> Vec<f64> {
    let mut mat = vec![0.0; n * n];
    let mut values = upper.iter();
    for i in 0..n {
        for j in i..n {
            let v = values.next().copied().unwrap_or_default();
            mat[i * n + j] = v;
            mat[j * n + i] = v;
        }
    }
    mat
}
