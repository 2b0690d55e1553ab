/*
 * The $1 Unistroke Recognizer and four-point pointer mapper (rust version)
 *
 * Maintained by Ferran Pujol Camins.
 *
 * $1 recognizer authors:
 *
 *	    Jacob O. Wobbrock, Ph.D.
 * 	    The Information School
 *	    University of Washington
 *	    Seattle, WA 98195-2840
 *	    wobbrock@uw.edu
 *
 *	    Andrew D. Wilson, Ph.D.
 *	    Microsoft Research
 *	    One Microsoft Way
 *	    Redmond, WA 98052
 *	    awilson@microsoft.com
 *
 *	    Yang Li, Ph.D.
 *	    Department of Computer Science and Engineering
 *	    University of Washington
 *	    Seattle, WA 98195-2840
 *	    yangli@cs.washington.edu
 *
 * The academic publication for the $1 recognizer, and what should be
 * used to cite it, is:
 *
 *	Wobbrock, J.O., Wilson, A.D. and Li, Y. (2007).
 *	  Gestures without libraries, toolkits or training: A $1 recognizer
 *	  for user interface prototypes. Proceedings of the ACM Symposium
 *	  on User Interface Software and Technology (UIST '07). Newport,
 *	  Rhode Island (October 7-10, 2007). New York: ACM Press, pp. 159-168.
 *
 * This software is distributed under the "New BSD License" agreement:
 *
 * Copyright (C) 2007-2012, Jacob O. Wobbrock, Andrew D. Wilson and Yang Li.
 * All rights reserved.
 *
 * Redistribution and use in source and binary forms, with or without
 * modification, are permitted provided that the following conditions are met:
 *    * Redistributions of source code must retain the above copyright
 *      notice, this list of conditions and the following disclaimer.
 *    * Redistributions in binary form must reproduce the above copyright
 *      notice, this list of conditions and the following disclaimer in the
 *      documentation and/or other materials provided with the distribution.
 *    * Neither the names of the University of Washington nor Microsoft,
 *      nor the names of its contributors may be used to endorse or promote
 *      products derived from this software without specific prior written
 *      permission.
 *
 * THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS
 * IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO,
 * THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR
 * PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL Jacob O. Wobbrock OR Andrew D. Wilson
 * OR Yang Li OR Ferran Pujol Camins BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL,
 * EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT
 * OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS
 * INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT,
 * STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY
 * OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF
 * SUCH DAMAGE.
**/

use crate::{
    geometry::{self, BoundingBox},
    one_dollar_recognizer::RecognizerParameters,
    point::Point,
};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// Below this fraction of the larger bounding box side, a side is treated as
/// flat and left unscaled.
const FLAT_EXTENT_RATIO: f64 = 1e-9;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("a stroke needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("stroke has zero path length")]
    DegenerateStroke,
    #[error("sampling resolution must be at least 2, got {0}")]
    InvalidResolution(usize),
}

/// A named unistroke.
/// Templates loaded from a corpus and templates built with [`Template::new`]
/// hold normalized points: resampled, rotated to zero indicative angle,
/// scaled to the reference square and centred at the origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Template {
    /// Gesture class
    pub name: String,
    /// Gesture points
    pub points: Vec<Point>,
}

impl Template {
    /// Constructs a new template from a raw stroke and a name
    pub fn new(
        pts: &[Point],
        name: &str,
        params: &RecognizerParameters,
    ) -> Result<Self, NormalizeError> {
        Ok(Self {
            name: name.trim().into(),
            points: normalize(pts, params)?,
        })
    }

    /// Wraps points exactly as they are stored, without normalizing them.
    /// Surrounding whitespace is not part of a name.
    pub fn from_stored(name: &str, points: Vec<Point>) -> Self {
        Self {
            name: name.trim().into(),
            points,
        }
    }

    /// Prepares a stored template for matching.
    /// Templates that already have the sampling resolution are taken to be
    /// normalized and returned unchanged. Anything else, such as a raw stroke
    /// written into the corpus by hand, is normalized first.
    pub fn into_normalized(self, params: &RecognizerParameters) -> Result<Self, NormalizeError> {
        if self.points.len() == params.sampling_resolution {
            return Ok(self);
        }
        Self::new(&self.points, &self.name, params)
    }
}

/// Normalizes a unistroke path.
/// Standard $1 processing: resample, rotate to zero, scale to square and translate to origin.
pub fn normalize(points: &[Point], params: &RecognizerParameters) -> Result<Vec<Point>, NormalizeError> {
    let points = resample(points, params.sampling_resolution)?;
    let points = rotate_to_zero(&points);
    let points = scale_to_square(&points, params.square_size);
    let c = geometry::centroid(&points);
    Ok(geometry::translate_to(&points, &c))
}

/// Resamples the array of points into n equally-distanced points.
/// Always returns exactly n points.
pub fn resample(points: &[Point], n: usize) -> Result<Vec<Point>, NormalizeError> {
    if n < 2 {
        return Err(NormalizeError::InvalidResolution(n));
    }
    let (first, last) = match points {
        [first, .., last] => (*first, *last),
        _ => return Err(NormalizeError::TooFewPoints(points.len())),
    };
    let length = geometry::path_length(points);
    if !(length > 0.0 && length.is_finite()) {
        return Err(NormalizeError::DegenerateStroke);
    }

    let interval = length / (n as f64 - 1.0);
    let mut new_points = Vec::with_capacity(n);
    new_points.push(first);

    let mut d = 0.0;
    let mut prev = first;
    for &current in &points[1..] {
        let mut dist = geometry::euclidean_distance(&prev, &current);
        // d < interval holds here, so dist > 0 whenever the loop body runs
        while d + dist >= interval && new_points.len() < n {
            let t = ((interval - d) / dist).clamp(0.0, 1.0);
            let q = Point::new(
                prev.x + t * (current.x - prev.x),
                prev.y + t * (current.y - prev.y),
            );
            new_points.push(q);
            // continue walking from the new point
            prev = q;
            dist = geometry::euclidean_distance(&q, &current);
            d = 0.0;
        }
        d += dist;
        prev = current;
    }

    // rounding can leave us a point or so short of n
    new_points.resize(n, last);
    Ok(new_points)
}

/// Angle from the first point to the centroid
pub fn indicative_angle(points: &[Point]) -> f64 {
    match points.first() {
        Some(first) => {
            let c = geometry::centroid(points);
            (c.y - first.y).atan2(c.x - first.x)
        }
        None => 0.0,
    }
}

/// Rotates the points about their centroid so that the indicative angle is 0
pub fn rotate_to_zero(points: &[Point]) -> Vec<Point> {
    geometry::rotate_by(points, -indicative_angle(points))
}

/// Scales each axis independently so the bounding box becomes size x size.
/// A flat axis keeps its scale.
pub fn scale_to_square(points: &[Point], size: f64) -> Vec<Point> {
    let Some(bb) = BoundingBox::of(points) else {
        return Vec::new();
    };
    let (w, h) = (bb.width(), bb.height());
    let largest = w.max(h);
    let factor = |extent: f64| {
        if extent > FLAT_EXTENT_RATIO * largest {
            size / extent
        } else {
            1.0
        }
    };
    let (fx, fy) = (factor(w), factor(h));
    points.iter().map(|p| Point::new(p.x * fx, p.y * fy)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 30.0),
            Point::new(20.0, 0.0),
            Point::new(30.0, 30.0),
            Point::new(40.0, 0.0),
        ]
    }

    #[test]
    fn resample_returns_exactly_n_points() {
        for n in [2, 3, 16, 64, 200] {
            let pts = resample(&zigzag(), n).unwrap();
            assert_eq!(pts.len(), n);
        }
    }

    #[test]
    fn resample_keeps_endpoints_and_spacing() {
        let line = [Point::new(0.0, 0.0), Point::new(63.0, 0.0)];
        let pts = resample(&line, 64).unwrap();
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert!((pts[63].x - 63.0).abs() < 1e-9);
        for (i, p) in pts.iter().enumerate() {
            assert!((p.x - i as f64).abs() < 1e-9);
        }
    }

    #[test]
    fn resample_skips_repeated_samples() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0),
        ];
        let out = resample(&pts, 11).unwrap();
        assert_eq!(out.len(), 11);
        assert!(out.iter().all(Point::is_finite));
    }

    #[test]
    fn resample_rejects_degenerate_input() {
        assert_eq!(
            resample(&[Point::new(1.0, 1.0)], 64),
            Err(NormalizeError::TooFewPoints(1))
        );
        assert_eq!(resample(&[], 64), Err(NormalizeError::TooFewPoints(0)));
        let still = [Point::new(3.0, 3.0); 5];
        assert_eq!(resample(&still, 64), Err(NormalizeError::DegenerateStroke));
        assert_eq!(
            resample(&zigzag(), 1),
            Err(NormalizeError::InvalidResolution(1))
        );
    }

    #[test]
    fn rotate_to_zero_aligns_first_point_with_centroid() {
        let pts = rotate_to_zero(&zigzag());
        assert!(indicative_angle(&pts).abs() < 1e-9);
    }

    #[test]
    fn scale_to_square_guards_flat_axis() {
        let pts = [Point::new(0.0, 5.0), Point::new(20.0, 5.0)];
        let scaled = scale_to_square(&pts, 100.0);
        assert_eq!(scaled[1].x - scaled[0].x, 100.0);
        assert_eq!(scaled[0].y, 5.0);
        assert!(scaled.iter().all(Point::is_finite));
    }

    #[test]
    fn normalized_path_is_centred_and_sized() {
        let params = RecognizerParameters::default();
        let pts = normalize(&zigzag(), &params).unwrap();
        assert_eq!(pts.len(), params.sampling_resolution);
        let c = geometry::centroid(&pts);
        assert!(c.x.abs() < 1e-9 && c.y.abs() < 1e-9);
        let bb = BoundingBox::of(&pts).unwrap();
        assert!((bb.width() - params.square_size).abs() < 1e-9);
        assert!((bb.height() - params.square_size).abs() < 1e-9);
    }

    #[test]
    fn straight_stroke_normalizes_without_blowing_up() {
        let params = RecognizerParameters::default();
        let diagonal = [Point::new(0.0, 0.0), Point::new(30.0, 40.0)];
        let pts = normalize(&diagonal, &params).unwrap();
        assert_eq!(pts.len(), 64);
        assert!(pts.iter().all(|p| p.is_finite() && p.y.abs() < 1e-6));
    }

    #[test]
    fn stored_normalized_template_is_kept_as_is() {
        let params = RecognizerParameters::default();
        let template = Template::new(&zigzag(), "zigzag", &params).unwrap();
        let prepared = template.clone().into_normalized(&params).unwrap();
        assert_eq!(prepared, template);
    }

    #[test]
    fn raw_stored_template_is_normalized() {
        let params = RecognizerParameters::default();
        let raw = Template::from_stored("zigzag", zigzag());
        let prepared = raw.into_normalized(&params).unwrap();
        assert_eq!(prepared.name, "zigzag");
        assert_eq!(prepared.points.len(), params.sampling_resolution);
    }
}
