// Trie storage engine for MemDb
// One node per key segment, children kept in insertion order.
// Not synchronized: MemoryDb owns the lock around it.

use crate::keypath::{KeyPath, SEPARATOR};

#[derive(Debug)]
struct Node {
    segment: String,
    value: Option<String>,
    children: Vec<Node>,
}

impl Node {
    fn leaf(segment: &str, value: Option<String>) -> Self {
        Node {
            segment: segment.to_string(),
            value,
            children: Vec::new(),
        }
    }

    /// Build a fresh branch for `segments`, with `value` on the last node.
    fn chain(segments: &[&str], value: String) -> Self {
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Node::leaf("", Some(value)),
        };

        let mut node = Node::leaf(last, Some(value));
        for segment in parents.iter().rev() {
            let mut parent = Node::leaf(segment, None);
            parent.children.push(node);
            node = parent;
        }
        node
    }

    fn is_vacant(&self) -> bool {
        self.value.is_none() && self.children.is_empty()
    }
}

/// Treat empty and whitespace-only values as a tombstone.
pub fn normalize_value(value: Option<&str>) -> Option<String> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
}

#[derive(Debug, Default)]
pub struct TrieStore {
    roots: Vec<Node>,
}

impl TrieStore {
    pub fn new() -> Self {
        TrieStore { roots: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total resident nodes, including valueless directory nodes.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&Node> = self.roots.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }

    /// Set or clear the value at `path`.
    ///
    /// Missing nodes are created on the way down. Only the addressed node
    /// is pruned when it ends up with no value and no children; its
    /// ancestors are left alone even if they are now empty.
    pub fn add(&mut self, path: &KeyPath<'_>, value: Option<String>, visited: &mut usize) {
        let segments = path.segments();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut nodes = &mut self.roots;
        for (depth, segment) in parents.iter().enumerate() {
            *visited += nodes.len();
            match nodes.iter().position(|n| n.segment == *segment) {
                Some(idx) => nodes = &mut nodes[idx].children,
                None => {
                    // Clearing a path that was never created is a no-op
                    let Some(value) = value else { return };
                    *visited += segments.len() - depth;
                    nodes.push(Node::chain(&segments[depth..], value));
                    return;
                }
            }
        }

        *visited += nodes.len();
        match nodes.iter().position(|n| n.segment == *last) {
            Some(idx) => {
                nodes[idx].value = value;
                if nodes[idx].is_vacant() {
                    nodes.remove(idx);
                }
            }
            None => {
                if let Some(value) = value {
                    *visited += 1;
                    nodes.push(Node::leaf(last, Some(value)));
                }
            }
        }
    }

    fn find(&self, path: &KeyPath<'_>, visited: &mut usize) -> Option<&Node> {
        let mut nodes = &self.roots;
        let mut found = None;
        for segment in path.segments() {
            let node = nodes.iter().find(|n| {
                *visited += 1;
                n.segment == *segment
            })?;
            nodes = &node.children;
            found = Some(node);
        }
        found
    }

    /// Exact lookup. `None` for a missing path or a valueless node.
    pub fn select(&self, path: &KeyPath<'_>, visited: &mut usize) -> Option<String> {
        self.find(path, visited).and_then(|node| node.value.clone())
    }

    /// Every present value, keyed by full path, in pre-order.
    pub fn list_all(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        collect(&self.roots, "", &mut out);
        out
    }

    /// Everything at or below `path`. The directory's own value, if any,
    /// comes first under the literal `path`.
    pub fn list_dir(&self, path: &KeyPath<'_>, visited: &mut usize) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let node = match self.find(path, visited) {
            Some(node) => node,
            None => return out,
        };

        if let Some(value) = &node.value {
            out.push((path.as_str().to_string(), value.clone()));
        }
        let prefix = format!("{}{}", path.as_str(), SEPARATOR);
        collect(&node.children, &prefix, &mut out);

        *visited += out.len() + 1;
        out
    }

    /// Drop every node.
    pub fn remove_all(&mut self, visited: &mut usize) {
        *visited += teardown(std::mem::take(&mut self.roots));
    }

    /// Detach the node at `path` together with its subtree. Missing paths
    /// are ignored.
    pub fn remove_dir(&mut self, path: &KeyPath<'_>, visited: &mut usize) {
        let segments = path.segments();
        let (last, parents) = match segments.split_last() {
            Some(split) => split,
            None => return,
        };

        let mut nodes = &mut self.roots;
        for segment in parents {
            *visited += nodes.len();
            match nodes.iter().position(|n| n.segment == *segment) {
                Some(idx) => nodes = &mut nodes[idx].children,
                None => return,
            }
        }

        *visited += nodes.len();
        if let Some(idx) = nodes.iter().position(|n| n.segment == *last) {
            let detached = nodes.remove(idx);
            *visited += teardown(vec![detached]);
        }
    }
}

impl Drop for TrieStore {
    fn drop(&mut self) {
        teardown(std::mem::take(&mut self.roots));
    }
}

// Pre-order walk with an explicit stack. `key` is one shared path buffer;
// each stack entry records the length to cut it back to before appending
// its own segment. Siblings are pushed in reverse so they pop in insertion
// order.
fn collect(nodes: &[Node], prefix: &str, out: &mut Vec<(String, String)>) {
    let mut key = prefix.to_string();
    let mut stack: Vec<(usize, &Node)> = nodes.iter().rev().map(|n| (prefix.len(), n)).collect();

    while let Some((base, node)) = stack.pop() {
        key.truncate(base);
        key.push_str(&node.segment);
        if let Some(value) = &node.value {
            out.push((key.clone(), value.clone()));
        }
        if !node.children.is_empty() {
            key.push(SEPARATOR);
            let base = key.len();
            stack.extend(node.children.iter().rev().map(|child| (base, child)));
        }
    }
}

// Frees children before their parent without recursing, so deep paths
// cannot exhaust the stack.
fn teardown(nodes: Vec<Node>) -> usize {
    let mut freed = 0;
    let mut stack = nodes;
    while let Some(mut node) = stack.pop() {
        stack.append(&mut node.children);
        freed += 1;
    }
    freed
}
