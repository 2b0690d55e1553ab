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

use crate::point::Point;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuadError {
    #[error("a quad needs exactly 4 points, got {0}")]
    WrongPointCount(usize),
}

/// Four camera-observed markers in no particular order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quad(pub [Point; 4]);

impl Quad {
    pub fn new(points: [Point; 4]) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point; 4] {
        &self.0
    }
}

impl TryFrom<&[Point]> for Quad {
    type Error = QuadError;

    fn try_from(points: &[Point]) -> Result<Self, Self::Error> {
        <[Point; 4]>::try_from(points)
            .map(Quad)
            .map_err(|_| QuadError::WrongPointCount(points.len()))
    }
}

/// The corners of a quad by role.
/// "Top" is the smaller y of each side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedQuad {
    pub top_left: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
    pub top_right: Point,
}

impl OrderedQuad {
    /// Corners in top-left, bottom-left, bottom-right, top-right order
    pub fn corners(&self) -> [Point; 4] {
        [self.top_left, self.bottom_left, self.bottom_right, self.top_right]
    }
}

/// Assigns corner roles to four unordered points.
/// The two points with the smallest x form the left side, the other two the right side.
/// Ties in x are broken by y so any permutation of the same points gives the same result.
pub fn sort_corners(quad: &Quad) -> OrderedQuad {
    let mut p = quad.0;
    p.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    let (top_left, bottom_left) = split_side(p[0], p[1]);
    let (top_right, bottom_right) = split_side(p[2], p[3]);
    OrderedQuad {
        top_left,
        bottom_left,
        bottom_right,
        top_right,
    }
}

/// (top, bottom) of two points on the same side
fn split_side(a: Point, b: Point) -> (Point, Point) {
    if a.y.total_cmp(&b.y).is_le() {
        (a, b)
    } else {
        (b, a)
    }
}
