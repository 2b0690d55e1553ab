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

//! Line format of the template corpus.
//!
//! Each line holds one template, `name:[(x, y), (x, y), ...]`. The point list
//! is read by a strict parser that accepts a bracketed list of numeric pairs
//! and nothing else.

use crate::{gesture::Template, point::Point};
use log::warn;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CorpusError {
    #[error("missing ':' between template name and points")]
    MissingSeparator,
    #[error("template name {0:?} is empty or contains ':' or a line break")]
    InvalidName(String),
    #[error("expected {expected} at column {column}, found {found:?}")]
    Unexpected {
        column: usize,
        expected: &'static str,
        found: char,
    },
    #[error("expected {0}, found end of line")]
    UnexpectedEnd(&'static str),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
}

/// Parses one corpus line into a template holding the points as stored
pub fn parse_line(line: &str) -> Result<Template, CorpusError> {
    let (raw_name, list) = line.split_once(':').ok_or(CorpusError::MissingSeparator)?;
    let name = raw_name.trim();
    if name.is_empty() {
        return Err(CorpusError::InvalidName(name.into()));
    }
    let offset = raw_name.chars().count() + 1;
    let points = PointListParser::new(list, offset).parse()?;
    Ok(Template::from_stored(name, points))
}

/// Parses a whole corpus.
/// Blank lines are ignored, malformed lines are logged and skipped.
pub fn parse_corpus(text: &str) -> Vec<Template> {
    let mut templates = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(template) => templates.push(template),
            Err(e) => warn!("skipping template corpus line {}: {}", index + 1, e),
        }
    }
    templates
}

/// Formats a template as a corpus line, without the trailing newline
pub fn format_line(template: &Template) -> Result<String, CorpusError> {
    let name = template.name.trim();
    if name.is_empty() || name.contains(|c: char| matches!(c, ':' | '\n' | '\r')) {
        return Err(CorpusError::InvalidName(template.name.clone()));
    }
    let pairs: Vec<String> = template
        .points
        .iter()
        .map(|p| format!("({:?}, {:?})", p.x, p.y))
        .collect();
    Ok(format!("{}:[{}]", name, pairs.join(", ")))
}

struct PointListParser<'a> {
    text: &'a str,
    pos: usize,
    /// column of `text` within the whole line, for error messages
    offset: usize,
}

impl<'a> PointListParser<'a> {
    fn new(text: &'a str, offset: usize) -> Self {
        Self {
            text,
            pos: 0,
            offset,
        }
    }

    /// list := '[' (pair (',' pair)* ','?)? ']'
    fn parse(mut self) -> Result<Vec<Point>, CorpusError> {
        let mut points = Vec::new();
        self.expect('[', "'['")?;
        if !self.eat(']') {
            loop {
                points.push(self.pair()?);
                if self.eat(']') {
                    break;
                }
                self.expect(',', "',' or ']'")?;
                if self.eat(']') {
                    break;
                }
            }
        }
        self.skip_whitespace();
        if let Some(c) = self.peek() {
            return Err(self.unexpected("end of line", c));
        }
        Ok(points)
    }

    /// pair := '(' number ',' number ','? ')'
    fn pair(&mut self) -> Result<Point, CorpusError> {
        self.expect('(', "'('")?;
        let x = self.number()?;
        self.expect(',', "','")?;
        let y = self.number()?;
        self.eat(',');
        self.expect(')', "')'")?;
        Ok(Point::new(x, y))
    }

    fn number(&mut self) -> Result<f64, CorpusError> {
        self.skip_whitespace();
        let start = self.pos;
        let len = self.text[start..]
            .find(|c: char| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
            .unwrap_or(self.text.len() - start);
        let token = &self.text[start..start + len];
        if token.is_empty() {
            return match self.peek() {
                Some(c) => Err(self.unexpected("a number", c)),
                None => Err(CorpusError::UnexpectedEnd("a number")),
            };
        }
        self.pos += len;
        match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(CorpusError::InvalidNumber(token.into())),
        }
    }

    fn expect(&mut self, wanted: char, expected: &'static str) -> Result<(), CorpusError> {
        self.skip_whitespace();
        match self.peek() {
            Some(c) if c == wanted => {
                self.pos += c.len_utf8();
                Ok(())
            }
            Some(c) => Err(self.unexpected(expected, c)),
            None => Err(CorpusError::UnexpectedEnd(expected)),
        }
    }

    fn eat(&mut self, wanted: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(wanted) {
            self.pos += wanted.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn unexpected(&self, expected: &'static str, found: char) -> CorpusError {
        CorpusError::Unexpected {
            column: self.offset + self.text[..self.pos].chars().count() + 1,
            expected,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_documented_example() {
        let t = parse_line("triangle:[(0,0),(10,0),(5,10),(0,0)]").unwrap();
        assert_eq!(t.name, "triangle");
        assert_eq!(
            t.points,
            vec![
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(5.0, 10.0),
                Point::new(0.0, 0.0),
            ]
        );
    }

    #[test]
    fn accepts_whitespace_signs_exponents_and_trailing_commas() {
        let t = parse_line("  wave : [ ( -1.5 , +2e1 ,) , (.5, 3.) , ]\r").unwrap();
        assert_eq!(t.name, "wave");
        assert_eq!(t.points, vec![Point::new(-1.5, 20.0), Point::new(0.5, 3.0)]);
        assert!(parse_line("empty:[]").unwrap().points.is_empty());
    }

    #[test]
    fn rejects_anything_but_a_list_of_pairs() {
        assert_eq!(parse_line("no separator"), Err(CorpusError::MissingSeparator));
        assert!(matches!(parse_line(":[(1,2)]"), Err(CorpusError::InvalidName(_))));
        assert!(matches!(
            parse_line("x:__import__('os')"),
            Err(CorpusError::Unexpected { expected: "'['", found: '_', .. })
        ));
        assert!(matches!(
            parse_line("x:[(1,2,3)]"),
            Err(CorpusError::Unexpected { expected: "')'", .. })
        ));
        assert!(matches!(
            parse_line("x:[[1,2]]"),
            Err(CorpusError::Unexpected { expected: "'('", .. })
        ));
        assert!(matches!(
            parse_line("x:[(1,2)] + []"),
            Err(CorpusError::Unexpected { expected: "end of line", .. })
        ));
        assert_eq!(
            parse_line("x:[(1,2)"),
            Err(CorpusError::UnexpectedEnd("',' or ']'"))
        );
        assert_eq!(
            parse_line("x:[(1e,2)]"),
            Err(CorpusError::InvalidNumber("1e".into()))
        );
    }

    #[test]
    fn reports_column_of_the_offending_character() {
        match parse_line("ab:[(1;2)]") {
            Err(CorpusError::Unexpected { column, found, .. }) => {
                assert_eq!(found, ';');
                assert_eq!(column, 7);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn formatted_line_parses_back() {
        let t = Template::from_stored(
            "check",
            vec![Point::new(-0.25, 1e-7), Point::new(42.0, -3.5)],
        );
        let line = format_line(&t).unwrap();
        assert_eq!(line, "check:[(-0.25, 1e-7), (42.0, -3.5)]");
        assert_eq!(parse_line(&line).unwrap(), t);
    }

    #[test]
    fn format_rejects_names_that_cannot_be_read_back() {
        for name in ["", "a:b", "two\nlines"] {
            let t = Template::from_stored(name, vec![Point::new(0.0, 0.0)]);
            assert!(matches!(format_line(&t), Err(CorpusError::InvalidName(_))));
        }
    }

    #[test]
    fn corpus_skips_blank_and_malformed_lines() {
        let text = "a:[(0,0),(1,1)]\n\nbroken:[(0,0)\nb:[(2,2),(3,3)]\n";
        let names: Vec<String> = parse_corpus(text).into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
