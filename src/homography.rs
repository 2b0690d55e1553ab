/*
 * The $1 Unistroke Recognizer and four-point pointer mapper (rust version)
 *
 * Maintained by Ferran Pujol Camins.
 *
 * This software is distributed under the "New BSD License" agreement.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
 * IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
 * THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
 * PURPOSE ARE DISCLAIMED.
**/

//! Projective mapping from a camera-observed quad onto a screen rectangle.
//!
//! Both quads are expressed in a common projective basis: the first three
//! corners span the basis and the fourth fixes the scale of each basis vector.
//! Going through that unit frame gives the source to destination mapping
//! without solving the general eight-unknown system.

use crate::{point::Point, quad::OrderedQuad};
use nalgebra as na;
use thiserror::Error;

/// A determinant below this fraction of the Hadamard bound counts as singular
const SINGULAR_RATIO: f64 = 1e-10;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProjectionError {
    #[error("quad corners are collinear or coincident")]
    SingularGeometry,
    #[error("point maps to infinity")]
    PointAtInfinity,
    #[error("destination rectangle {width}x{height} is empty")]
    InvalidDestination { width: f64, height: f64 },
}

/// Which way the destination y axis runs relative to the camera's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalAxis {
    /// The camera's top edge lands at the bottom of the destination.
    /// This is what an IR camera held by the player needs, since the image
    /// moves opposite to the pointing direction.
    #[default]
    Inverted,
    /// Top stays top
    Upright,
}

/// The rectangle pointer positions are mapped into, anchored at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationRect {
    pub width: f64,
    pub height: f64,
    pub vertical_axis: VerticalAxis,
}

impl DestinationRect {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            vertical_axis: VerticalAxis::default(),
        }
    }

    pub fn upright(width: f64, height: f64) -> Self {
        Self {
            vertical_axis: VerticalAxis::Upright,
            ..Self::new(width, height)
        }
    }

    /// The points that the top-left, bottom-left, bottom-right and top-right
    /// source corners map to
    pub fn corners(&self) -> OrderedQuad {
        let (w, h) = (self.width, self.height);
        match self.vertical_axis {
            VerticalAxis::Inverted => OrderedQuad {
                top_left: Point::new(0.0, h),
                bottom_left: Point::new(0.0, 0.0),
                bottom_right: Point::new(w, 0.0),
                top_right: Point::new(w, h),
            },
            VerticalAxis::Upright => OrderedQuad {
                top_left: Point::new(0.0, 0.0),
                bottom_left: Point::new(0.0, h),
                bottom_right: Point::new(w, h),
                top_right: Point::new(w, 0.0),
            },
        }
    }

    fn validate(&self) -> Result<(), ProjectionError> {
        let valid = |v: f64| v > 0.0 && v.is_finite();
        if valid(self.width) && valid(self.height) {
            Ok(())
        } else {
            Err(ProjectionError::InvalidDestination {
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// True if the determinant is negligible next to the largest value it could take
/// for rows of these lengths. NaN entries count as singular.
fn is_singular(m: &na::Matrix3<f64>) -> bool {
    let bound: f64 = m.row_iter().map(|row| row.norm()).product();
    !(m.determinant().abs() > SINGULAR_RATIO * bound)
}

fn homogeneous(p: &Point) -> na::Vector3<f64> {
    na::Vector3::new(p.x, p.y, 1.0)
}

/// Maps the unit frame onto the quad: columns l*A, m*B, t*C where
/// l*A + m*B + t*C = D in homogeneous coordinates
fn unit_to_quad(quad: &OrderedQuad) -> Result<na::Matrix3<f64>, ProjectionError> {
    let [a, b, c, d] = quad.corners().map(|p| homogeneous(&p));
    let basis = na::Matrix3::from_columns(&[a, b, c]);
    if is_singular(&basis) {
        return Err(ProjectionError::SingularGeometry);
    }
    let lmt = basis.lu().solve(&d).ok_or(ProjectionError::SingularGeometry)?;
    Ok(na::Matrix3::from_columns(&[a * lmt[0], b * lmt[1], c * lmt[2]]))
}

/// Source to destination projective transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Homography {
    matrix: na::Matrix3<f64>,
}

impl Homography {
    /// Computes the transform taking each source corner to the destination
    /// corner with the same role
    pub fn from_quad(source: &OrderedQuad, dest: &DestinationRect) -> Result<Self, ProjectionError> {
        dest.validate()?;
        let unit_to_source = unit_to_quad(source)?;
        let unit_to_dest = unit_to_quad(&dest.corners())?;
        if is_singular(&unit_to_source) {
            return Err(ProjectionError::SingularGeometry);
        }
        let source_to_unit = unit_to_source
            .try_inverse()
            .ok_or(ProjectionError::SingularGeometry)?;
        Ok(Self {
            matrix: unit_to_dest * source_to_unit,
        })
    }

    pub fn matrix(&self) -> &na::Matrix3<f64> {
        &self.matrix
    }

    /// Maps a source point into the destination rectangle's coordinates
    pub fn project(&self, p: &Point) -> Result<Point, ProjectionError> {
        let v = self.matrix * homogeneous(p);
        let (x, y, z) = (v[0], v[1], v[2]);
        // z within rounding error of zero
        let w = self.matrix.row(2);
        let magnitude = (w[0] * p.x).abs() + (w[1] * p.y).abs() + w[2].abs();
        if !(z.abs() > 4.0 * f64::EPSILON * magnitude) {
            return Err(ProjectionError::PointAtInfinity);
        }
        let projected = Point::new(x / z, y / z);
        if projected.is_finite() {
            Ok(projected)
        } else {
            Err(ProjectionError::PointAtInfinity)
        }
    }
}
