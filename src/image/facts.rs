//! Image attributes gathered from a parsed data set.
//!
//! [`ImageFacts`] collects everything geometry assembly and pixel decoding
//! need, resolving the fallbacks between classic attributes and the
//! functional group macros of enhanced multi-frame objects.

use bytes::Bytes;
use tracing::debug;

use crate::error::{DecodeError, ParseError};
use crate::format::dicom::{tags, DataSet, Tag};

use super::geometry::{cross, GeometryInput, Vector3};
use super::pixel::{ComponentKind, PixelEncoding, PixelKind};

/// Raw pixel payload and the element it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPayload {
    pub tag: Tag,
    pub data: Bytes,
}

/// Attributes of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFacts {
    pub frame_count: u32,
    pub phase_count: i32,
    pub rows: u16,
    pub columns: u16,
    pub row_direction: Vector3,
    pub column_direction: Vector3,
    pub slice_direction: Vector3,
    pub spacing: [f64; 3],
    pub origin: [f64; 3],
    pub rescale_slope: f64,
    pub rescale_intercept: f64,
    pub bits_allocated: u16,
    pub signed: bool,
    pub samples_per_pixel: u16,
    pub planar_configuration: u16,
    pub pixel_data: Option<PixelPayload>,
}

impl ImageFacts {
    /// Gather image attributes from a data set.
    ///
    /// # Errors
    /// - `MissingElement` if rows, columns or bits allocated is absent
    /// - `InvalidValue` if an attribute cannot be interpreted, or the number
    ///   of frames is not positive
    pub fn from_dataset(dataset: &DataSet) -> Result<Self, ParseError> {
        let rows = required_u16(dataset, tags::ROWS, "Rows")?;
        let columns = required_u16(dataset, tags::COLUMNS, "Columns")?;
        let bits_allocated = required_u16(dataset, tags::BITS_ALLOCATED, "BitsAllocated")?;

        let frame_count = match dataset.get_integer(tags::NUMBER_OF_FRAMES, "NumberOfFrames")? {
            None => 1,
            Some(frames) => u32::try_from(frames)
                .ok()
                .filter(|&f| f > 0)
                .ok_or_else(|| ParseError::InvalidValue {
                    name: "NumberOfFrames",
                    tag: tags::NUMBER_OF_FRAMES,
                    message: format!("{} is not a positive frame count", frames),
                })?,
        };

        let phase_count = match dataset.get_integer(tags::PHASE_COUNT, "PhaseCount")? {
            None => 1,
            Some(phases) => i32::try_from(phases).map_err(|_| ParseError::InvalidValue {
                name: "PhaseCount",
                tag: tags::PHASE_COUNT,
                message: format!("{} is out of range", phases),
            })?,
        };

        let (row_direction, column_direction) = orientation(dataset)?;
        let slice_direction = cross(&row_direction, &column_direction);

        let samples_per_pixel = dataset
            .get_u16(tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")?
            .unwrap_or(1);
        let planar_configuration = dataset
            .get_u16(tags::PLANAR_CONFIGURATION, "PlanarConfiguration")?
            .unwrap_or(0);
        let signed = dataset
            .get_u16(tags::PIXEL_REPRESENTATION, "PixelRepresentation")?
            .unwrap_or(0)
            == 1;

        let (rescale_slope, rescale_intercept) = rescale(dataset)?;

        let facts = Self {
            frame_count,
            phase_count,
            rows,
            columns,
            row_direction,
            column_direction,
            slice_direction,
            spacing: spacing(dataset)?,
            origin: origin(dataset)?,
            rescale_slope,
            rescale_intercept,
            bits_allocated,
            signed,
            samples_per_pixel,
            planar_configuration,
            pixel_data: pixel_payload(dataset),
        };

        debug!(
            "Image facts: {}x{} x{} frames, {} phases, {} bits, {} samples per pixel",
            facts.columns,
            facts.rows,
            facts.frame_count,
            facts.phase_count,
            facts.bits_allocated,
            facts.samples_per_pixel
        );

        Ok(facts)
    }

    /// Inputs for [`super::build_geometry`].
    pub fn geometry_input(&self) -> GeometryInput {
        GeometryInput {
            frame_count: self.frame_count,
            phase_count: self.phase_count,
            rows: self.rows,
            columns: self.columns,
            row_direction: self.row_direction,
            column_direction: self.column_direction,
            slice_direction: self.slice_direction,
            spacing: self.spacing,
            origin: self.origin,
            rescale_slope: self.rescale_slope,
            rescale_intercept: self.rescale_intercept,
        }
    }

    /// Classify the pixel samples.
    ///
    /// Float and double float pixel data elements select a floating point
    /// component regardless of the pixel representation.
    pub fn encoding(&self) -> Result<PixelEncoding, DecodeError> {
        let tag = self.pixel_data.as_ref().map(|p| p.tag);
        match tag {
            Some(t) if t == tags::FLOAT_PIXEL_DATA => Ok(PixelEncoding::new(
                ComponentKind::Float32,
                PixelKind::from_planes(self.samples_per_pixel)?,
            )),
            Some(t) if t == tags::DOUBLE_FLOAT_PIXEL_DATA => Ok(PixelEncoding::new(
                ComponentKind::Float64,
                PixelKind::from_planes(self.samples_per_pixel)?,
            )),
            _ => PixelEncoding::classify(self.bits_allocated, self.signed, self.samples_per_pixel),
        }
    }

    /// Pixels in one frame.
    pub fn pixels_per_frame(&self) -> usize {
        usize::from(self.rows) * usize::from(self.columns)
    }
}

fn required_u16(dataset: &DataSet, tag: Tag, name: &'static str) -> Result<u16, ParseError> {
    dataset
        .get_u16(tag, name)?
        .ok_or(ParseError::MissingElement { name, tag })
}

/// Look a decimal attribute up in the data set, then in a functional group.
fn decimals_with_fallback<const N: usize>(
    dataset: &DataSet,
    macro_sequence: Tag,
    tag: Tag,
    name: &'static str,
) -> Result<Option<[f64; N]>, ParseError> {
    if let Some(values) = dataset.get_decimal_array::<N>(tag, name)? {
        return Ok(Some(values));
    }
    match dataset.functional_group_item(macro_sequence) {
        Some(item) => item.get_decimal_array::<N>(tag, name),
        None => Ok(None),
    }
}

fn orientation(dataset: &DataSet) -> Result<(Vector3, Vector3), ParseError> {
    let cosines = decimals_with_fallback::<6>(
        dataset,
        tags::PLANE_ORIENTATION_SEQUENCE,
        tags::IMAGE_ORIENTATION_PATIENT,
        "ImageOrientationPatient",
    )?;
    Ok(match cosines {
        Some(c) => ([c[0], c[1], c[2]], [c[3], c[4], c[5]]),
        None => ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    })
}

fn origin(dataset: &DataSet) -> Result<[f64; 3], ParseError> {
    Ok(decimals_with_fallback::<3>(
        dataset,
        tags::PLANE_POSITION_SEQUENCE,
        tags::IMAGE_POSITION_PATIENT,
        "ImagePositionPatient",
    )?
    .unwrap_or([0.0; 3]))
}

/// In-plane spacing is stored as row spacing then column spacing, so x is
/// the second value.
fn spacing(dataset: &DataSet) -> Result<[f64; 3], ParseError> {
    let in_plane = [
        (tags::PIXEL_SPACING, "PixelSpacing"),
        (tags::IMAGER_PIXEL_SPACING, "ImagerPixelSpacing"),
        (tags::NOMINAL_SCANNED_PIXEL_SPACING, "NominalScannedPixelSpacing"),
    ]
    .into_iter()
    .find_map(|(tag, name)| dataset.get_decimal_array::<2>(tag, name).transpose())
    .transpose()?;

    let measures = dataset.functional_group_item(tags::PIXEL_MEASURES_SEQUENCE);
    let in_plane = match (in_plane, measures) {
        (Some(values), _) => Some(values),
        (None, Some(item)) => item.get_decimal_array::<2>(tags::PIXEL_SPACING, "PixelSpacing")?,
        (None, None) => None,
    };
    let [row_spacing, column_spacing] = in_plane.unwrap_or([1.0, 1.0]);

    let mut z = None;
    for source in std::iter::once(dataset).chain(measures) {
        z = first_decimal(source, tags::SPACING_BETWEEN_SLICES, "SpacingBetweenSlices")?;
        if z.is_none() {
            z = first_decimal(source, tags::SLICE_THICKNESS, "SliceThickness")?;
        }
        if z.is_some() {
            break;
        }
    }

    Ok([column_spacing, row_spacing, z.unwrap_or(1.0)])
}

fn rescale(dataset: &DataSet) -> Result<(f64, f64), ParseError> {
    let transformation = dataset.functional_group_item(tags::PIXEL_VALUE_TRANSFORMATION_SEQUENCE);
    let lookup = |tag: Tag, name: &'static str| -> Result<Option<f64>, ParseError> {
        match first_decimal(dataset, tag, name)? {
            Some(value) => Ok(Some(value)),
            None => match transformation {
                Some(item) => first_decimal(item, tag, name),
                None => Ok(None),
            },
        }
    };

    let slope = lookup(tags::RESCALE_SLOPE, "RescaleSlope")?.unwrap_or(1.0);
    let intercept = lookup(tags::RESCALE_INTERCEPT, "RescaleIntercept")?.unwrap_or(0.0);
    Ok((slope, intercept))
}

fn first_decimal(
    dataset: &DataSet,
    tag: Tag,
    name: &'static str,
) -> Result<Option<f64>, ParseError> {
    Ok(dataset
        .get_decimals(tag, name)?
        .and_then(|values| values.first().copied()))
}

fn pixel_payload(dataset: &DataSet) -> Option<PixelPayload> {
    [
        tags::PIXEL_DATA,
        tags::FLOAT_PIXEL_DATA,
        tags::DOUBLE_FLOAT_PIXEL_DATA,
    ]
    .into_iter()
    .find_map(|tag| {
        dataset.bytes(tag).map(|data| PixelPayload {
            tag,
            data: data.clone(),
        })
    })
}

// =============================================================================
// Tests
// =============================================================================
