//! Call-site traces
//!
//! Each environment extends its caller's trace with its own location. Traces
//! are persistent linked lists, so a child shares its caller's chain instead
//! of copying it and never keeps the caller environment itself alive.

use crate::location::SourceLocation;
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
struct TraceNode {
    location: SourceLocation,
    parent: Option<Arc<TraceNode>>,
}

impl Drop for TraceNode {
    // Unlink iteratively so dropping a deep chain does not recurse.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// Call sites of an environment and its callers, innermost first
#[derive(Debug, Clone, Default)]
pub struct StackTrace {
    head: Option<Arc<TraceNode>>,
    depth: usize,
}

impl StackTrace {
    /// Trace of a call with no interpreted caller
    pub fn root(location: SourceLocation) -> Self {
        Self::default().push(location)
    }

    /// New trace with `location` as the innermost call site
    pub fn push(&self, location: SourceLocation) -> Self {
        Self {
            head: Some(Arc::new(TraceNode {
                location,
                parent: self.head.clone(),
            })),
            depth: self.depth + 1,
        }
    }

    /// Rebuild a trace from locations listed innermost first
    pub fn from_locations(locations: impl IntoIterator<Item = SourceLocation>) -> Self {
        let locations: Vec<SourceLocation> = locations.into_iter().collect();
        locations
            .into_iter()
            .rev()
            .fold(Self::default(), |trace, location| trace.push(location))
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Innermost call site
    pub fn innermost(&self) -> Option<&SourceLocation> {
        self.head.as_deref().map(|node| &node.location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceLocation> {
        let mut current = self.head.as_deref();
        std::iter::from_fn(move || {
            let node = current?;
            current = node.parent.as_deref();
            Some(&node.location)
        })
    }

    pub fn to_vec(&self) -> Vec<SourceLocation> {
        self.iter().cloned().collect()
    }
}

impl fmt::Display for StackTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for location in self.iter() {
            writeln!(f, "\tat {}", location)?;
        }
        Ok(())
    }
}
