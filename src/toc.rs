// ABOUTME: Table of contents for the slidedeck compiler
// ABOUTME: Folds a flat stream of (title, level, slide number) entries into a nested outline

use serde::Serialize;

/// One outline entry and the entries nested below it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub title: String,
    pub level: u32,
    /// Number of the slide that introduced the entry
    pub number: usize,
    pub children: Vec<TocNode>,
}

/// Incremental outline builder.
///
/// Keeps the path of open entries from the root to the most recent one. A new
/// entry closes every open entry whose level is not strictly lower than its
/// own, then becomes the last child of whatever is left on top (or a root).
#[derive(Debug, Default)]
pub struct TocBuilder {
    roots: Vec<TocNode>,
    open: Vec<(usize, u32)>,
}

impl TocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_entry(&mut self, title: impl Into<String>, level: u32, number: usize) {
        while let Some(&(_, open_level)) = self.open.last() {
            if open_level < level {
                break;
            }
            self.open.pop();
        }

        let siblings = self.open_children();
        siblings.push(TocNode {
            title: title.into(),
            level,
            number,
            children: Vec::new(),
        });
        let index = siblings.len() - 1;
        self.open.push((index, level));
    }

    /// Children list of the innermost open entry (the roots when nothing is open)
    fn open_children(&mut self) -> &mut Vec<TocNode> {
        let mut children = &mut self.roots;
        for &(index, _) in &self.open {
            children = &mut children[index].children;
        }
        children
    }

    pub fn toc(&self) -> &[TocNode] {
        &self.roots
    }

    pub fn into_toc(self) -> Vec<TocNode> {
        self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
