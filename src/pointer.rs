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

//! Turns the IR markers seen by a hand-held camera into a screen position.

use crate::{
    homography::{DestinationRect, Homography, ProjectionError},
    point::Point,
    quad::{sort_corners, Quad, QuadError},
};
use log::debug;
use thiserror::Error;

/// Resolution of the IR camera, in camera pixels
pub const IR_CAMERA_RESOLUTION: (f64, f64) = (1024.0, 768.0);

/// Centre of the IR camera image. The camera looks along the pointing
/// direction, so this is the sample to project for the pointer position.
pub const IR_CAMERA_CENTER: Point = Point::new(IR_CAMERA_RESOLUTION.0 / 2.0, IR_CAMERA_RESOLUTION.1 / 2.0);

/// Position reported when no pointer position can be computed
pub const OFF_SCREEN: Point = Point::new(-1.0, -1.0);

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PointerError {
    #[error(transparent)]
    Quad(#[from] QuadError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
}

/// Maps `pointer`, in camera coordinates, into `dest` using the four marker samples
pub fn try_map_pointer(samples: &[Point], dest: &DestinationRect, pointer: &Point) -> Result<Point, PointerError> {
    let quad = Quad::try_from(samples)?;
    let homography = Homography::from_quad(&sort_corners(&quad), dest)?;
    Ok(homography.project(pointer)?)
}

/// Like [`try_map_pointer`], but reports [`OFF_SCREEN`] instead of failing
pub fn map_pointer(samples: &[Point], dest: &DestinationRect, pointer: &Point) -> Point {
    try_map_pointer(samples, dest, pointer).unwrap_or_else(|e| {
        debug!("pointer off screen: {}", e);
        OFF_SCREEN
    })
}
