//! Radix tree nodes.
//!
//! Each node owns one path segment. Static children are kept sorted for
//! binary search. Parameter and wildcard children are shared by every
//! pattern that captures at that position; capture names are stored with
//! the route at its terminal node, so `/pet/{petId}` and
//! `/pet/{id}/uploadImage` can coexist.
//!
//! Request segments are percent-decoded before matching.

use std::borrow::Cow;

use http::Method;
use smallvec::SmallVec;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Kind of path segment in a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    /// Literal segment (`pet`)
    Static,
    /// Named single-segment capture (`{petId}`)
    Param(String),
    /// Trailing catch-all capture (`*rest`)
    Wildcard(String),
}

/// Raw captured values, in path order.
pub(crate) type Captures = SmallVec<[String; 4]>;

/// An endpoint and the capture names of the pattern it was registered under.
#[derive(Debug, Clone)]
pub(crate) struct Route<T> {
    names: Vec<String>,
    pub(crate) endpoint: T,
}

impl<T> Route<T> {
    /// Names positional captures.
    pub(crate) fn bind(&self, captures: Captures) -> Params {
        let mut params = Params::new();
        for (name, value) in self.names.iter().zip(captures) {
            params.push(name.as_str(), value);
        }
        params
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    segment: String,
    methods: Option<MethodRouter<Route<T>>>,
    static_children: Vec<Node<T>>,
    param_child: Option<Box<Node<T>>>,
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: impl Into<String>) -> Self {
        Self {
            segment: segment.into(),
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    pub(crate) fn root() -> Self {
        Self::new("")
    }

    /// Registers `endpoint` for `method` at `pattern`.
    pub(crate) fn insert(&mut self, pattern: &str, method: Method, endpoint: T) -> Result<(), RouteError> {
        let segments = parse_pattern(pattern)?;
        let names = segments
            .iter()
            .filter_map(|(_, kind)| match kind {
                SegmentKind::Param(name) | SegmentKind::Wildcard(name) => Some(name.clone()),
                SegmentKind::Static => None,
            })
            .collect();

        let node = self.descend(&segments);
        let methods = node.methods.get_or_insert_with(MethodRouter::new);
        if methods.insert(method.clone(), Route { names, endpoint }).is_some() {
            return Err(RouteError::DuplicateRoute {
                method,
                pattern: pattern.to_string(),
            });
        }
        Ok(())
    }

    fn descend(&mut self, segments: &[(String, SegmentKind)]) -> &mut Self {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self;
        };

        let child = match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children.insert(index, Node::new(segment.clone()));
                        index
                    }
                };
                &mut self.static_children[index]
            }
            SegmentKind::Param(_) => &mut **self
                .param_child
                .get_or_insert_with(|| Box::new(Node::new(segment.clone()))),
            SegmentKind::Wildcard(_) => &mut **self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Node::new(segment.clone()))),
        };
        child.descend(remaining)
    }

    /// Matches a concrete request path.
    ///
    /// Returns the method table of the matching route and the decoded
    /// captures, in path order.
    pub(crate) fn match_path(&self, path: &str) -> Option<(&MethodRouter<Route<T>>, Captures)> {
        let segments: Vec<Cow<'_, str>> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).unwrap_or(Cow::Borrowed(s)))
            .collect();
        let mut captures = Captures::new();
        let methods = self.match_segments(&segments, &mut captures)?;
        Some((methods, captures))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[Cow<'_, str>],
        captures: &mut Captures,
    ) -> Option<&'a MethodRouter<Route<T>>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Ok(index) = self
            .static_children
            .binary_search_by(|c| c.segment.as_str().cmp(&**segment))
        {
            if let Some(found) = self.static_children[index].match_segments(remaining, captures) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = captures.len();
            captures.push(segment.to_string());
            if let Some(found) = child.match_segments(remaining, captures) {
                return Some(found);
            }
            captures.truncate(mark);
        }

        if let Some(child) = &self.wildcard_child {
            if child.methods.is_some() {
                captures.push(segments.join("/"));
                return child.methods.as_ref();
            }
        }

        None
    }
}

fn parse_pattern(pattern: &str) -> Result<Vec<(String, SegmentKind)>, RouteError> {
    let raw: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());
    for (position, segment) in raw.iter().enumerate() {
        let kind = if let Some(name) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = segment.strip_prefix('*') {
            if position + 1 != raw.len() {
                return Err(RouteError::WildcardNotLast {
                    segment: (*segment).to_string(),
                    pattern: pattern.to_string(),
                });
            }
            SegmentKind::Wildcard(name.to_string())
        } else {
            SegmentKind::Static
        };
        if let SegmentKind::Param(name) | SegmentKind::Wildcard(name) = &kind {
            if name.is_empty() {
                return Err(RouteError::UnnamedParameter {
                    pattern: pattern.to_string(),
                });
            }
        }
        segments.push(((*segment).to_string(), kind));
    }
    Ok(segments)
}
