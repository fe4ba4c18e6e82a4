//! Match paths: where in the actual value a comparison happens.
//!
//! A [`Path`] is a persistent list of [`Segment`]s under a root name. Pushing
//! a segment returns a new path sharing its prefix with the old one, so
//! sibling branches never see each other's segments. Segments stay data
//! until the path is rendered.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::Value;

/// One step of a [`Path`].
#[derive(Debug, Clone)]
pub enum Segment {
    /// Record field.
    Field(Arc<str>),
    /// Sequence index.
    Index(usize),
    /// Map key.
    Key(Value),
    /// Pointer dereference.
    Deref,
    /// Synthetic label explaining how a value was derived (`<All#1/2>`,
    /// `.len()`, `<captures>`...). Rendered verbatim.
    Custom(Cow<'static, str>),
}

#[derive(Debug)]
struct Node {
    segment: Segment,
    parent: Option<Arc<Node>>,
}

/// Qualified location inside the actual value.
///
/// # Example
///
/// ```
/// use deepmatch::Path;
///
/// let path = Path::new("DATA").field("a").field("b").index(1);
/// assert_eq!(path.to_string(), "DATA.a.b[1]");
/// ```
#[derive(Debug, Clone)]
pub struct Path {
    root: Arc<str>,
    tail: Option<Arc<Node>>,
    len: usize,
}

impl Path {
    /// An empty path under `root`.
    pub fn new(root: impl Into<Arc<str>>) -> Self {
        Self {
            root: root.into(),
            tail: None,
            len: 0,
        }
    }

    /// A new path with `segment` appended.
    #[must_use]
    pub fn push(&self, segment: Segment) -> Self {
        Self {
            root: Arc::clone(&self.root),
            tail: Some(Arc::new(Node {
                segment,
                parent: self.tail.clone(),
            })),
            len: self.len + 1,
        }
    }

    #[must_use]
    pub fn field(&self, name: impl Into<Arc<str>>) -> Self {
        self.push(Segment::Field(name.into()))
    }

    #[must_use]
    pub fn index(&self, i: usize) -> Self {
        self.push(Segment::Index(i))
    }

    #[must_use]
    pub fn key(&self, key: Value) -> Self {
        self.push(Segment::Key(key))
    }

    #[must_use]
    pub fn deref(&self) -> Self {
        self.push(Segment::Deref)
    }

    #[must_use]
    pub fn label(&self, label: impl Into<Cow<'static, str>>) -> Self {
        self.push(Segment::Custom(label.into()))
    }

    /// The root name.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a bare root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Segments from the root outwards.
    #[must_use]
    pub fn segments(&self) -> Vec<&Segment> {
        let mut out = Vec::with_capacity(self.len);
        let mut node = self.tail.as_deref();
        while let Some(n) = node {
            out.push(&n.segment);
            node = n.parent.as_deref();
        }
        out.reverse();
        out
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = self.root.to_string();
        let mut derefs = 0;
        for segment in self.segments() {
            match segment {
                // fields auto-dereference
                Segment::Field(name) => {
                    derefs = 0;
                    out.push('.');
                    out.push_str(name);
                }
                Segment::Index(i) => {
                    out = flush(out, &mut derefs, true);
                    out.push_str(&format!("[{i}]"));
                }
                Segment::Key(k) => {
                    out = flush(out, &mut derefs, true);
                    out.push_str(&format!("[{k}]"));
                }
                Segment::Deref => derefs += 1,
                Segment::Custom(label) => {
                    out = flush(out, &mut derefs, false);
                    out.push_str(label);
                }
            }
        }
        f.write_str(&flush(out, &mut derefs, false))
    }
}

/// Prefix pending dereferences as stars, parenthesized when followed by an
/// index or key.
fn flush(out: String, derefs: &mut usize, parens: bool) -> String {
    if *derefs == 0 {
        return out;
    }
    let stars = "*".repeat(*derefs);
    *derefs = 0;
    if parens {
        format!("({stars}{out})")
    } else {
        format!("{stars}{out}")
    }
}
