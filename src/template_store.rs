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
    corpus::{self, CorpusError},
    gesture::Template,
};
use log::debug;
use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Default file name of the template corpus
pub const DEFAULT_CORPUS_FILE: &str = "strokes.map";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open template corpus {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("failed to read template corpus {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write template corpus {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("cannot store template: {0}")]
    Format(#[from] CorpusError),
}

/// Source of the templates a recognizer matches against
pub trait TemplateStore {
    /// Loads every readable template, in corpus order
    fn load(&self) -> Result<Vec<Template>, StoreError>;

    /// Appends a template at the end of the corpus
    fn append(&mut self, template: &Template) -> Result<(), StoreError>;
}

/// Templates kept in a newline-delimited corpus file.
/// The file is created empty the first time it is needed.
#[derive(Debug, Clone)]
pub struct FileTemplateStore {
    path: PathBuf,
}

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_append(&self) -> Result<fs::File, StoreError> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| StoreError::Open {
                path: self.path.clone(),
                source,
            })
    }

    fn read(&self) -> Result<String, StoreError> {
        fs::read_to_string(&self.path).map_err(|source| StoreError::Read {
            path: self.path.clone(),
            source,
        })
    }
}

impl Default for FileTemplateStore {
    fn default() -> Self {
        Self::new(DEFAULT_CORPUS_FILE)
    }
}

impl TemplateStore for FileTemplateStore {
    fn load(&self) -> Result<Vec<Template>, StoreError> {
        if !self.path.exists() {
            debug!("creating empty template corpus {}", self.path.display());
            self.open_for_append()?;
        }
        let text = self.read()?;
        Ok(corpus::parse_corpus(&text))
    }

    fn append(&mut self, template: &Template) -> Result<(), StoreError> {
        let mut line = corpus::format_line(template)?;
        line.push('\n');
        let mut file = self.open_for_append()?;
        // don't glue the new line onto an unterminated last line
        let text = self.read()?;
        if !text.is_empty() && !text.ends_with('\n') {
            line.insert(0, '\n');
        }
        file.write_all(line.as_bytes())
            .map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            })
    }
}

/// Templates kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplateStore {
    templates: Vec<Template>,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from corpus text, with the same line handling as the file store
    pub fn from_corpus(text: &str) -> Self {
        Self {
            templates: corpus::parse_corpus(text),
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }
}

impl From<Vec<Template>> for MemoryTemplateStore {
    fn from(templates: Vec<Template>) -> Self {
        Self { templates }
    }
}

impl TemplateStore for MemoryTemplateStore {
    fn load(&self) -> Result<Vec<Template>, StoreError> {
        Ok(self.templates.clone())
    }

    fn append(&mut self, template: &Template) -> Result<(), StoreError> {
        // keep the same naming rules as the file corpus
        corpus::format_line(template)?;
        self.templates.push(template.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::Point;
    use tempfile::tempdir;

    fn line_template(name: &str) -> Template {
        Template::from_stored(name, vec![Point::new(0.0, 0.0), Point::new(1.0, 2.0)])
    }

    #[test]
    fn load_creates_missing_corpus() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strokes.map");
        let store = FileTemplateStore::new(&path);
        assert!(store.load().unwrap().is_empty());
        assert!(path.exists());
    }

    #[test]
    fn appended_templates_load_in_order() {
        let dir = tempdir().unwrap();
        let mut store = FileTemplateStore::new(dir.path().join("strokes.map"));
        store.append(&line_template("first")).unwrap();
        store.append(&line_template("second")).unwrap();
        let loaded = store.load().unwrap();
        assert_eq!(loaded, vec![line_template("first"), line_template("second")]);
    }

    #[test]
    fn append_after_unterminated_line() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strokes.map");
        fs::write(&path, "hand:[(0,0),(5,5)]").unwrap();
        let mut store = FileTemplateStore::new(&path);
        store.append(&line_template("added")).unwrap();
        let names: Vec<String> = store.load().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["hand", "added"]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strokes.map");
        fs::write(&path, "ok:[(0,0),(1,1)]\nbad:os.system('x')\n").unwrap();
        let loaded = FileTemplateStore::new(&path).load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "ok");
    }

    #[test]
    fn invalid_name_is_not_written() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("strokes.map");
        let mut store = FileTemplateStore::new(&path);
        let err = store.append(&line_template("a:b")).unwrap_err();
        assert!(matches!(err, StoreError::Format(CorpusError::InvalidName(_))));
        assert!(store.load().unwrap().is_empty());

        let mut memory = MemoryTemplateStore::new();
        assert!(memory.append(&line_template("")).is_err());
        assert!(memory.templates().is_empty());
    }

    #[test]
    fn memory_store_round_trips_corpus_text() {
        let mut store = MemoryTemplateStore::from_corpus("v:[(0,0),(1,0)]\n");
        store.append(&line_template("w")).unwrap();
        let names: Vec<String> = store.load().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["v", "w"]);
    }
}
