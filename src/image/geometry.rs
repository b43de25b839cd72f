//! Geometric frame assembly.
//!
//! Turns the raw orientation, spacing and extent attributes of a file into a
//! [`GeometrySpec`]: an orthonormal N-dimensional frame (N = 3, or 4 for
//! multi-phase acquisitions) with per-axis spacing and origin.
//!
//! Stored orientation vectors are frequently not exactly orthogonal because
//! of rounding. The slice direction is taken as given, the row direction is
//! recomputed from the column and slice directions, and the column direction
//! is then completed from slice and row so all three are exactly orthogonal.

use serde::Serialize;

use crate::error::GeometryError;

/// A 3-component vector in patient space.
pub type Vector3 = [f64; 3];

// =============================================================================
// Vector Helpers
// =============================================================================

#[inline]
pub fn dot(a: &Vector3, b: &Vector3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn cross(a: &Vector3, b: &Vector3) -> Vector3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Scale a vector to unit length. A zero vector is returned unchanged.
pub fn normalize(v: &Vector3) -> Vector3 {
    let length = dot(v, v).sqrt();
    if length == 0.0 {
        return *v;
    }
    [v[0] / length, v[1] / length, v[2] / length]
}

/// Vectors shorter than this cannot be normalized reliably.
const MIN_DIRECTION_LENGTH: f64 = 1e-6;

/// Normalize a direction, rejecting vectors with no usable length.
fn unit_direction(v: &Vector3, field: &'static str) -> Result<Vector3, GeometryError> {
    let length = dot(v, v).sqrt();
    if !length.is_finite() || length < MIN_DIRECTION_LENGTH {
        return Err(GeometryError::DegenerateDirection { field });
    }
    Ok(normalize(v))
}

// =============================================================================
// GeometryInput
// =============================================================================

/// Raw geometry attributes, as read from the element stream.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryInput {
    /// Total number of frames in the file
    pub frame_count: u32,

    /// Number of phases; 0 or 1 means a single phase
    pub phase_count: i32,

    pub rows: u16,
    pub columns: u16,

    /// Direction along a row (first axis), possibly not orthogonal
    pub row_direction: Vector3,

    /// Direction along a column (second axis)
    pub column_direction: Vector3,

    /// Direction between slices (third axis)
    pub slice_direction: Vector3,

    /// Spacing along x, y and z
    pub spacing: [f64; 3],

    /// Position of the first voxel
    pub origin: [f64; 3],

    pub rescale_slope: f64,
    pub rescale_intercept: f64,
}

impl Default for GeometryInput {
    fn default() -> Self {
        Self {
            frame_count: 1,
            phase_count: 1,
            rows: 0,
            columns: 0,
            row_direction: [1.0, 0.0, 0.0],
            column_direction: [0.0, 1.0, 0.0],
            slice_direction: [0.0, 0.0, 1.0],
            spacing: [1.0, 1.0, 1.0],
            origin: [0.0, 0.0, 0.0],
            rescale_slope: 1.0,
            rescale_intercept: 0.0,
        }
    }
}

// =============================================================================
// GeometrySpec
// =============================================================================

/// Normalized geometric description of an image.
///
/// `extents` always lists the three spatial sizes (columns, rows, slices).
/// For 4D data the phase axis is described by the fourth direction, spacing
/// and origin entries, and its size by [`GeometrySpec::phase_count`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeometrySpec {
    dimension_count: usize,
    extents: Vec<u32>,
    phase_count: u32,
    directions: Vec<Vec<f64>>,
    spacing: Vec<f64>,
    origin: Vec<f64>,
    rescale_slope: f64,
    rescale_intercept: f64,
}

impl GeometrySpec {
    /// Number of axes: 3, or 4 when the file holds more than one phase.
    pub fn dimension_count(&self) -> usize {
        self.dimension_count
    }

    /// Spatial sizes: columns, rows, slices per phase.
    pub fn extents(&self) -> &[u32] {
        &self.extents
    }

    /// Number of phases along the fourth axis (1 for 3D data).
    pub fn phase_count(&self) -> u32 {
        self.phase_count
    }

    /// Unit direction of every axis, each with `dimension_count` components.
    pub fn directions(&self) -> &[Vec<f64>] {
        &self.directions
    }

    pub fn direction(&self, axis: usize) -> Option<&[f64]> {
        self.directions.get(axis).map(Vec::as_slice)
    }

    pub fn spacing(&self) -> &[f64] {
        &self.spacing
    }

    pub fn origin(&self) -> &[f64] {
        &self.origin
    }

    pub fn rescale_slope(&self) -> f64 {
        self.rescale_slope
    }

    pub fn rescale_intercept(&self) -> f64 {
        self.rescale_intercept
    }

    /// Map a stored sample value to its calibrated value.
    #[inline]
    pub fn rescale(&self, stored: f64) -> f64 {
        stored * self.rescale_slope + self.rescale_intercept
    }
}

// =============================================================================
// Assembly
// =============================================================================

/// Build the geometric frame from raw attributes.
///
/// # Errors
/// - `GeometryError::InvalidDimension` if `rows` or `columns` is zero
/// - `GeometryError::DegenerateDirection` if the slice or column direction
///   has zero length, or the column direction is parallel to the slice
///   direction
///
/// # Directions
/// The returned directions are orthonormal for any input. The row direction
/// is `cross(column, slice)` and the column direction is recomputed as
/// `cross(slice, row)`, which removes any component along the slice
/// direction.
///
/// # Frame Count
/// With more than one phase, slices per phase is `frame_count / phase_count`
/// using integer division. Frames beyond the last whole phase are not
/// counted.
pub fn build_geometry(input: &GeometryInput) -> Result<GeometrySpec, GeometryError> {
    if input.rows == 0 {
        return Err(GeometryError::InvalidDimension {
            field: "rows",
            value: i64::from(input.rows),
        });
    }
    if input.columns == 0 {
        return Err(GeometryError::InvalidDimension {
            field: "columns",
            value: i64::from(input.columns),
        });
    }

    let phases = input.phase_count.max(1) as u32;
    let dimension_count = if phases > 1 { 4 } else { 3 };

    let slices = if phases > 1 {
        input.frame_count / phases
    } else {
        input.frame_count
    };
    let extents = vec![u32::from(input.columns), u32::from(input.rows), slices];

    let slice_direction = unit_direction(&input.slice_direction, "slice direction")?;
    unit_direction(&input.column_direction, "column direction")?;
    let row_direction = unit_direction(
        &cross(&input.column_direction, &slice_direction),
        "row direction (column parallel to slice)",
    )?;
    let column_direction = normalize(&cross(&slice_direction, &row_direction));

    let mut directions: Vec<Vec<f64>> = vec![row_direction.to_vec(), column_direction.to_vec()];
    if dimension_count > 2 {
        directions.push(slice_direction.to_vec());
    }

    let mut spacing = input.spacing.to_vec();
    let mut origin = input.origin.to_vec();

    if dimension_count == 4 {
        for direction in &mut directions {
            direction.push(0.0);
        }
        directions.push(vec![0.0, 0.0, 0.0, 1.0]);
        spacing.push(1.0);
        origin.push(0.0);
    }

    Ok(GeometrySpec {
        dimension_count,
        extents,
        phase_count: phases,
        directions,
        spacing,
        origin,
        rescale_slope: input.rescale_slope,
        rescale_intercept: input.rescale_intercept,
    })
}

// =============================================================================
// Tests
// =============================================================================
