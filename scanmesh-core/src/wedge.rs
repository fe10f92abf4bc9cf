//! Wedge expansion: decoupled geometry and texture indices to unshared corners
//!
//! Scanner exports store positions and texture coordinates in separate
//! arrays with separate per-face index lists, because one position can carry
//! different texture coordinates on adjacent faces. Renderers want one index
//! list, so every triangle corner becomes its own vertex here.

use crate::error::{Diagnostic, IndexKind, MAX_DIAGNOSTIC_SAMPLES};
use crate::mesh::TexturedMesh;
use crate::raw::RawGeometry;
use crate::transform::CoordinateConversion;
use serde::{Deserialize, Serialize};

/// How the flat wedge-index cursor moves past faces that are not triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WedgeAlignment {
    /// Advance by the face's arity, so later triangles read their own wedges.
    #[default]
    FaceArity,
    /// Do not advance. Every triangle after a non-triangular face reads
    /// wedges belonging to an earlier face. Kept for byte-compatible output
    /// with meshes converted by older tooling.
    TrianglesOnly,
}

/// Expansion settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExpandOptions {
    pub conversion: CoordinateConversion,
    pub alignment: WedgeAlignment,
}

/// What happened to a single face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceOutcome {
    /// Three new corners were appended
    Emitted,
    /// The face is not a triangle and was ignored
    NotTriangle,
    /// A geometry or wedge index was out of range; the face was skipped
    OutOfRange(IndexKind),
    /// The wedge list ended; this and all later faces were not processed
    Truncated,
}

/// Aggregate outcome of an expansion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpandReport {
    pub faces_seen: usize,
    pub triangles_emitted: usize,
    pub non_triangle_faces: usize,
    pub wedge_out_of_range: usize,
    pub geometry_out_of_range: usize,
    /// Face index at which the wedge list ran out, if it did
    pub truncated_at: Option<usize>,
    /// The first few recoverable problems, in encounter order
    pub samples: Vec<Diagnostic>,
}

impl ExpandReport {
    /// Faces skipped because of out-of-range indices
    pub fn skipped_faces(&self) -> usize {
        self.wedge_out_of_range + self.geometry_out_of_range
    }

    fn record(&mut self, face: usize, outcome: FaceOutcome) {
        let diagnostic = match outcome {
            FaceOutcome::Emitted => {
                self.triangles_emitted += 1;
                None
            }
            FaceOutcome::NotTriangle => {
                self.non_triangle_faces += 1;
                None
            }
            FaceOutcome::OutOfRange(kind) => {
                match kind {
                    IndexKind::Wedge => self.wedge_out_of_range += 1,
                    IndexKind::Geometry => self.geometry_out_of_range += 1,
                }
                Some(Diagnostic::OutOfRangeIndex { face, kind })
            }
            FaceOutcome::Truncated => {
                self.truncated_at = Some(face);
                Some(Diagnostic::TruncatedWedgeData { face })
            }
        };
        if let Some(d) = diagnostic {
            if self.samples.len() < MAX_DIAGNOSTIC_SAMPLES {
                self.samples.push(d);
            }
        }
    }
}

/// Expands [`RawGeometry`] into a [`TexturedMesh`] with one vertex per corner.
#[derive(Debug, Clone, Default)]
pub struct WedgeExpander {
    pub options: ExpandOptions,
}

impl WedgeExpander {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExpandOptions) -> Self {
        Self { options }
    }

    /// Expand every triangular face. Never fails; problems are counted in the report.
    pub fn expand(&self, raw: &RawGeometry) -> (TexturedMesh, ExpandReport) {
        let _span = tracing::debug_span!("expand_wedges").entered();

        let mut mesh = TexturedMesh::with_triangle_capacity(raw.triangle_face_count());
        let mut report = ExpandReport::default();
        let mut offset = 0usize;

        for (face_index, face) in raw.faces.iter().enumerate() {
            report.faces_seen += 1;
            let outcome = self.expand_face(raw, face, offset, &mut mesh);
            report.record(face_index, outcome);

            match outcome {
                FaceOutcome::Truncated => break,
                FaceOutcome::NotTriangle => {
                    if self.options.alignment == WedgeAlignment::FaceArity {
                        offset += face.len();
                    }
                }
                FaceOutcome::Emitted | FaceOutcome::OutOfRange(_) => offset += 3,
            }
        }

        if let Some(face) = report.truncated_at {
            tracing::warn!(
                face,
                remaining = raw.faces.len() - face,
                "wedge index list shorter than expected; stopped face processing"
            );
        }
        if report.skipped_faces() > 0 {
            tracing::warn!(
                wedge = report.wedge_out_of_range,
                geometry = report.geometry_out_of_range,
                "skipped faces with out-of-range indices"
            );
        }
        tracing::debug!(
            faces = report.faces_seen,
            triangles = report.triangles_emitted,
            non_triangles = report.non_triangle_faces,
            "expanded wedges"
        );

        (mesh, report)
    }

    fn expand_face(
        &self,
        raw: &RawGeometry,
        face: &[i64],
        offset: usize,
        mesh: &mut TexturedMesh,
    ) -> FaceOutcome {
        if face.len() != 3 {
            return FaceOutcome::NotTriangle;
        }
        if offset + 2 >= raw.face_wedges.len() {
            return FaceOutcome::Truncated;
        }

        let wedges = &raw.face_wedges[offset..offset + 3];
        let Some(w) = resolve_triangle(wedges, raw.wedge_uvs.len()) else {
            return FaceOutcome::OutOfRange(IndexKind::Wedge);
        };
        let Some(g) = resolve_triangle(face, raw.positions.len()) else {
            return FaceOutcome::OutOfRange(IndexKind::Geometry);
        };

        let conversion = &self.options.conversion;
        let corners = conversion.corner_order().map(|k| {
            (
                conversion.convert_position(&raw.positions[g[k]]),
                conversion.convert_uv(&raw.wedge_uvs[w[k]]),
            )
        });
        mesh.add_unshared_triangle(corners);
        FaceOutcome::Emitted
    }
}

/// Convert three source indices to `usize`, or `None` if any is outside `0..len`
fn resolve_triangle(indices: &[i64], len: usize) -> Option<[usize; 3]> {
    let resolve = |i: i64| usize::try_from(i).ok().filter(|&i| i < len);
    Some([
        resolve(indices[0])?,
        resolve(indices[1])?,
        resolve(indices[2])?,
    ])
}

/// Expand with the default right-to-left-handed conversion
pub fn expand_wedges(raw: &RawGeometry) -> (TexturedMesh, ExpandReport) {
    WedgeExpander::new().expand(raw)
}
