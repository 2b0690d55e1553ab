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
    geometry,
    gesture::{self, NormalizeError, Template},
    point::Point,
    template_store::{StoreError, TemplateStore},
};
use log::{debug, trace, warn};
#[cfg(feature = "serde")]
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// Name reported when there is no template to match against
pub const NO_MATCH: &str = "none";

/// Golden ratio conjugate, 0.5 * (-1 + sqrt(5))
const PHI: f64 = 0.618_033_988_749_894_8;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecognizerParameters {
    /// Number of points on a normalized path
    pub sampling_resolution: usize,
    /// Side of the reference square paths are scaled into
    pub square_size: f64,
    /// The rotation search covers [-angle_range, angle_range], in radians
    pub angle_range: f64,
    /// The rotation search stops once its bracket is this narrow, in radians
    pub angle_precision: f64,
}

impl Default for RecognizerParameters {
    fn default() -> Self {
        RecognizerParameters {
            sampling_resolution: 64,
            square_size: 100.0,
            angle_range: 45f64.to_radians(),
            angle_precision: 2f64.to_radians(),
        }
    }
}

impl RecognizerParameters {
    /// Half the diagonal of the reference square, the distance that maps to a score of 0
    pub fn half_diagonal(&self) -> f64 {
        0.5 * 2f64.sqrt() * self.square_size
    }
}

/// Outcome of one recognition call
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RecognitionResult {
    /// Name of the best matching template, or [`NO_MATCH`]
    pub name: String,
    /// 1 for a perfect match, decreasing with the distance to the template
    pub score: f64,
    /// Caller supplied tag, passed through unchanged
    pub tag: String,
}

impl RecognitionResult {
    pub fn is_match(&self) -> bool {
        self.name != NO_MATCH
    }
}

#[derive(Debug, Error)]
pub enum RecognizeError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("cannot normalize stroke: {0}")]
    Normalize(#[from] NormalizeError),
}

/// The $1 unistroke recognizer.
/// Matches strokes against the templates of a [`TemplateStore`], which is read on every call
/// so templates appended in the meantime take part.
#[derive(Debug, Clone)]
pub struct Recognizer<S> {
    store: S,
    params: RecognizerParameters,
}

impl<S: TemplateStore> Recognizer<S> {
    pub fn new(store: S) -> Self {
        Self::with_parameters(store, RecognizerParameters::default())
    }

    pub fn with_parameters(store: S, params: RecognizerParameters) -> Self {
        Self { store, params }
    }

    pub fn parameters(&self) -> &RecognizerParameters {
        &self.params
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Classifies a raw stroke against the stored templates.
    /// Returns `Ok(None)` for strokes of fewer than 2 points, and a [`NO_MATCH`] result with
    /// score 0 when there are no usable templates.
    pub fn recognize(&self, stroke: &[Point], tag: &str) -> Result<Option<RecognitionResult>, RecognizeError> {
        if stroke.len() < 2 {
            debug!("ignoring stroke of {} point(s) from {:?}", stroke.len(), tag);
            return Ok(None);
        }
        let stored = self.store.load()?;
        let candidate = gesture::normalize(stroke, &self.params)?;

        let templates: Vec<Template> = stored
            .into_iter()
            .filter_map(|t| {
                let name = t.name.clone();
                t.into_normalized(&self.params)
                    .map_err(|e| warn!("ignoring template {:?}: {}", name, e))
                    .ok()
            })
            .collect();

        let result = match classify(&candidate, &templates, &self.params) {
            Some((template, distance)) => RecognitionResult {
                name: template.name.clone(),
                score: score(distance, &self.params),
                tag: tag.into(),
            },
            None => RecognitionResult {
                name: NO_MATCH.into(),
                score: 0.0,
                tag: tag.into(),
            },
        };
        debug!("recognized {:?} with score {:.3} for {:?}", result.name, result.score, tag);
        Ok(Some(result))
    }

    /// Normalizes a raw stroke and appends it to the store under `name`
    pub fn add_template(&mut self, name: &str, stroke: &[Point]) -> Result<Template, RecognizeError> {
        let template = Template::new(stroke, name, &self.params)?;
        self.store.append(&template)?;
        debug!("added template {:?}", name);
        Ok(template)
    }
}

/// Main function of the $1 recognizer.
/// Finds the template closest to a normalized candidate.
/// Returns the template and its distance, or `None` for an empty template set.
/// On equal distances the earlier template wins.
pub fn classify<'a>(
    candidate: &[Point],
    templates: &'a [Template],
    params: &RecognizerParameters,
) -> Option<(&'a Template, f64)> {
    let mut best: Option<(&Template, f64)> = None;
    for template in templates {
        let d = distance_at_best_angle(candidate, &template.points, params);
        trace!("distance to {:?}: {}", template.name, d);
        if best.map_or(true, |(_, min)| d < min) {
            best = Some((template, d));
        }
    }
    best
}

/// Converts a path distance into a score, 1 meaning identical paths
pub fn score(distance: f64, params: &RecognizerParameters) -> f64 {
    1.0 - distance / params.half_diagonal()
}

/// Golden section search for the rotation of `points` that brings them closest to `template`
pub fn distance_at_best_angle(points: &[Point], template: &[Point], params: &RecognizerParameters) -> f64 {
    let mut a = -params.angle_range;
    let mut b = params.angle_range;
    let mut x1 = PHI * a + (1.0 - PHI) * b;
    let mut f1 = distance_at_angle(points, template, x1);
    let mut x2 = (1.0 - PHI) * a + PHI * b;
    let mut f2 = distance_at_angle(points, template, x2);
    while (b - a).abs() > params.angle_precision {
        if f1 < f2 {
            b = x2;
            x2 = x1;
            f2 = f1;
            x1 = PHI * a + (1.0 - PHI) * b;
            f1 = distance_at_angle(points, template, x1);
        } else {
            a = x1;
            x1 = x2;
            f1 = f2;
            x2 = (1.0 - PHI) * a + PHI * b;
            f2 = distance_at_angle(points, template, x2);
        }
    }
    f1.min(f2)
}

/// Path distance after rotating `points` by `radians` about their centroid
pub fn distance_at_angle(points: &[Point], template: &[Point], radians: f64) -> f64 {
    path_distance(&geometry::rotate_by(points, radians), template)
}

/// Average distance between corresponding points of two paths.
/// Infinite when there is nothing to compare.
pub fn path_distance(a: &[Point], b: &[Point]) -> f64 {
    let n = a.len().min(b.len());
    if n == 0 {
        return f64::INFINITY;
    }
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(p, q)| geometry::euclidean_distance(p, q))
        .sum();
    sum / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template_store::MemoryTemplateStore;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 50.0),
            Point::new(50.0, 50.0),
            Point::new(50.0, 0.0),
            Point::new(0.0, 0.0),
        ]
    }

    fn caret() -> Vec<Point> {
        vec![Point::new(0.0, 0.0), Point::new(20.0, 40.0), Point::new(40.0, 0.0)]
    }

    fn recognizer() -> Recognizer<MemoryTemplateStore> {
        let mut r = Recognizer::new(MemoryTemplateStore::new());
        r.add_template("square", &square()).unwrap();
        r.add_template("caret", &caret()).unwrap();
        r
    }

    #[test]
    fn path_distance_is_mean_of_pairwise_distances() {
        let a = [Point::new(0.0, 0.0), Point::new(1.0, 0.0)];
        let b = [Point::new(0.0, 2.0), Point::new(1.0, 4.0)];
        assert_eq!(path_distance(&a, &b), 3.0);
        assert_eq!(path_distance(&a, &a), 0.0);
        assert_eq!(path_distance(&[], &a), f64::INFINITY);
    }

    #[test]
    fn best_angle_search_undoes_small_rotations() {
        let params = RecognizerParameters::default();
        let template = gesture::normalize(&caret(), &params).unwrap();
        let turned = geometry::rotate_by(&template, 20f64.to_radians());
        let straight = distance_at_angle(&turned, &template, 0.0);
        let best = distance_at_best_angle(&turned, &template, &params);
        assert!(best < straight / 5.0, "best {} straight {}", best, straight);
    }

    #[test]
    fn score_of_zero_distance_is_one() {
        let params = RecognizerParameters::default();
        assert_eq!(score(0.0, &params), 1.0);
        assert!((score(params.half_diagonal(), &params)).abs() < 1e-12);
    }

    #[test]
    fn recognizes_stored_shape() {
        let result = recognizer().recognize(&caret(), "player").unwrap().unwrap();
        assert_eq!(result.name, "caret");
        assert_eq!(result.tag, "player");
        assert!(result.score >= 0.95, "score {}", result.score);
        assert!(result.is_match());
    }

    #[test]
    fn short_stroke_yields_no_result() {
        let r = recognizer();
        assert!(r.recognize(&[], "player").unwrap().is_none());
        assert!(r.recognize(&[Point::new(1.0, 1.0)], "player").unwrap().is_none());
    }

    #[test]
    fn zero_length_stroke_is_an_error() {
        let r = recognizer();
        let err = r.recognize(&[Point::new(2.0, 2.0); 3], "player").unwrap_err();
        assert!(matches!(err, RecognizeError::Normalize(NormalizeError::DegenerateStroke)));
    }

    #[test]
    fn empty_corpus_reports_no_match() {
        let r = Recognizer::new(MemoryTemplateStore::new());
        let result = r.recognize(&square(), "conductor").unwrap().unwrap();
        assert_eq!(
            result,
            RecognitionResult {
                name: NO_MATCH.into(),
                score: 0.0,
                tag: "conductor".into(),
            }
        );
        assert!(!result.is_match());
    }

    #[test]
    fn first_template_wins_ties() {
        let params = RecognizerParameters::default();
        let t = Template::new(&square(), "first", &params).unwrap();
        let mut twin = t.clone();
        twin.name = "second".into();
        let templates = [t.clone(), twin];
        let (best, _) = classify(&t.points, &templates, &params).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn names_are_trimmed_in_memory_like_on_disk() {
        let mut r = Recognizer::new(MemoryTemplateStore::new());
        let template = r.add_template(" tri ", &caret()).unwrap();
        assert_eq!(template.name, "tri");
        let result = r.recognize(&caret(), "player").unwrap().unwrap();
        assert_eq!(result.name, "tri");
    }

    #[test]
    fn store_and_parameters_are_reachable() {
        let params = RecognizerParameters {
            sampling_resolution: 32,
            ..RecognizerParameters::default()
        };
        let square = Template::new(&square(), "square", &params).unwrap();
        let mut r = Recognizer::with_parameters(MemoryTemplateStore::from(vec![square]), params.clone());
        assert_eq!(r.parameters(), &params);

        let caret = Template::new(&caret(), "caret", &params).unwrap();
        r.store_mut().append(&caret).unwrap();
        let result = r.recognize(&caret.points, "player").unwrap().unwrap();
        assert_eq!(result.name, "caret");

        let names: Vec<&str> = r.store().templates().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["square", "caret"]);
        assert_eq!(r.into_store().templates().len(), 2);
    }

    #[test]
    fn custom_search_bracket_is_honoured() {
        let params = RecognizerParameters {
            angle_range: 0.0,
            ..RecognizerParameters::default()
        };
        let template = gesture::normalize(&caret(), &params).unwrap();
        let turned = geometry::rotate_by(&template, 20f64.to_radians());
        let best = distance_at_best_angle(&turned, &template, &params);
        let straight = distance_at_angle(&turned, &template, 0.0);
        assert!((best - straight).abs() < 1e-9);
    }
}
