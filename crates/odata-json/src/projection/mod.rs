//! Select and expand projections.
//!
//! A [`SelectTree`] decides which structural properties are written at a
//! node; an [`ExpandTree`] decides which navigation properties are written
//! inline. While the serializer descends, an [`ExpandScope`] carries the
//! active expand state, including the remaining hop count of `$levels`.

use std::str::FromStr;

use crate::edm::KeyRef;

// =============================================================================
// SELECT
// =============================================================================

/// Selected structural properties.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectTree {
    /// Every property (no select, or `*`).
    #[default]
    All,
    /// Explicit property paths, deduplicated, in first-seen order.
    Paths(Vec<Vec<String>>),
}

impl SelectTree {
    /// Builds a select tree from `/`-separated paths; `*` selects everything.
    pub fn paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut out: Vec<Vec<String>> = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if path == "*" {
                return SelectTree::All;
            }
            let segments: Vec<String> = path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !segments.is_empty() && !out.contains(&segments) {
                out.push(segments);
            }
        }
        SelectTree::Paths(out)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SelectTree::All)
    }

    /// Returns true if the property is written at this level.
    pub fn includes(&self, name: &str) -> bool {
        match self {
            SelectTree::All => true,
            SelectTree::Paths(paths) => paths.iter().any(|p| p.first().is_some_and(|s| s == name)),
        }
    }

    /// Returns the selection one level below `name`.
    ///
    /// Selecting the property itself selects all of its members.
    pub fn nested(&self, name: &str) -> SelectTree {
        let SelectTree::Paths(paths) = self else {
            return SelectTree::All;
        };
        let mut tails = Vec::new();
        for path in paths {
            let Some((head, rest)) = path.split_first() else {
                continue;
            };
            if head != name {
                continue;
            }
            if rest.is_empty() {
                return SelectTree::All;
            }
            let tail = rest.to_vec();
            if !tails.contains(&tail) {
                tails.push(tail);
            }
        }
        SelectTree::Paths(tails)
    }

    /// Returns true if every key property is written.
    ///
    /// A selected path covers every path below it.
    pub fn covers_keys(&self, keys: &[KeyRef]) -> bool {
        match self {
            SelectTree::All => true,
            SelectTree::Paths(paths) => keys
                .iter()
                .all(|key| paths.iter().any(|p| !p.is_empty() && key.path.starts_with(p))),
        }
    }

    /// Renders the selection as a comma-separated list of paths.
    pub fn render(&self) -> Option<String> {
        match self {
            SelectTree::All => None,
            SelectTree::Paths(paths) => Some(
                paths
                    .iter()
                    .map(|p| p.join("/"))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }
}

// =============================================================================
// EXPAND
// =============================================================================

/// Level limit of a recursive expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpandLevel {
    Finite(u32),
    Max,
}

impl FromStr for ExpandLevel {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("max") {
            Ok(ExpandLevel::Max)
        } else {
            s.parse().map(ExpandLevel::Finite)
        }
    }
}

/// What an expand item applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandTarget {
    /// Every navigation property not named by another item.
    Star,
    /// A navigation property, optionally reached through complex properties.
    Navigation(Vec<String>),
}

/// One entry of an expand tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandItem {
    pub target: ExpandTarget,
    pub select: SelectTree,
    pub expand: Option<ExpandTree>,
    pub levels: Option<ExpandLevel>,
    /// Render targets as references (`Nav/$ref`).
    pub refs_only: bool,
    /// Write `Nav@odata.count` before the inline collection.
    pub count: bool,
}

impl ExpandItem {
    fn new(target: ExpandTarget) -> Self {
        Self {
            target,
            select: SelectTree::All,
            expand: None,
            levels: None,
            refs_only: false,
            count: false,
        }
    }

    /// Expands the navigation property at `path` (`Nav` or `Complex/Nav`).
    pub fn navigation(path: &str) -> Self {
        Self::new(ExpandTarget::Navigation(
            path.split('/').filter(|s| !s.is_empty()).map(str::to_string).collect(),
        ))
    }

    /// Expands every navigation property not named explicitly.
    pub fn star() -> Self {
        Self::new(ExpandTarget::Star)
    }

    pub fn select(mut self, select: SelectTree) -> Self {
        self.select = select;
        self
    }

    pub fn expand(mut self, expand: ExpandTree) -> Self {
        self.expand = Some(expand);
        self
    }

    pub fn levels(mut self, levels: ExpandLevel) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn refs_only(mut self) -> Self {
        self.refs_only = true;
        self
    }

    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    fn matches(&self, prefix: &[String], nav: &str) -> bool {
        match &self.target {
            ExpandTarget::Star => prefix.is_empty(),
            ExpandTarget::Navigation(path) => {
                path.len() == prefix.len() + 1
                    && path.starts_with(prefix)
                    && path.last().is_some_and(|last| last == nav)
            }
        }
    }

    /// Returns the navigation path rendered for context URLs.
    pub fn path(&self) -> String {
        match &self.target {
            ExpandTarget::Star => "*".to_string(),
            ExpandTarget::Navigation(path) => path.join("/"),
        }
    }
}

/// A set of expand items.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExpandTree {
    pub items: Vec<ExpandItem>,
}

impl ExpandTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(mut self, item: ExpandItem) -> Self {
        self.items.push(item);
        self
    }

    /// Finds the item for `nav` below the complex path `prefix`.
    ///
    /// An explicitly named item wins over a star item.
    pub fn find(&self, prefix: &[String], nav: &str) -> Option<&ExpandItem> {
        self.items
            .iter()
            .find(|i| matches!(i.target, ExpandTarget::Navigation(_)) && i.matches(prefix, nav))
            .or_else(|| {
                self.items
                    .iter()
                    .find(|i| i.target == ExpandTarget::Star && i.matches(prefix, nav))
            })
    }

    /// Returns true if some item expands a navigation property below `prefix`.
    pub fn reaches_into(&self, prefix: &[String]) -> bool {
        self.items.iter().any(|i| match &i.target {
            ExpandTarget::Navigation(path) => path.len() > prefix.len() && path.starts_with(prefix),
            ExpandTarget::Star => false,
        })
    }
}

// =============================================================================
// TRAVERSAL STATE
// =============================================================================

/// Expand state at one node of the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandScope<'a> {
    /// Nothing below this node is expanded.
    None,
    /// Items of a tree apply; `prefix` is the complex property path walked so far.
    Tree {
        tree: &'a ExpandTree,
        prefix: Vec<String>,
    },
    /// A `$levels` item repeating itself; `remaining` counts further hops (`None` is max).
    Recursive {
        item: &'a ExpandItem,
        remaining: Option<u32>,
    },
}

/// How a navigation property is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expansion<'a> {
    /// Targets are written as `{"@odata.id"}` references.
    References { item: &'a ExpandItem },
    /// Targets are written inline.
    Inline {
        item: &'a ExpandItem,
        /// Scope for the targets' own navigation properties.
        scope: ExpandScope<'a>,
        /// Expansion is driven by `$levels`; targets are checked for cycles.
        levels: bool,
    },
}

impl<'a> ExpandScope<'a> {
    /// Scope for the top of a response.
    pub fn root(tree: Option<&'a ExpandTree>) -> Self {
        match tree {
            Some(tree) => ExpandScope::Tree {
                tree,
                prefix: Vec::new(),
            },
            None => ExpandScope::None,
        }
    }

    fn from_item(item: &'a ExpandItem, levels: ExpandLevel) -> Expansion<'a> {
        match levels {
            ExpandLevel::Finite(0) => Expansion::References { item },
            ExpandLevel::Finite(n) => Expansion::Inline {
                item,
                scope: ExpandScope::Recursive {
                    item,
                    remaining: Some(n - 1),
                },
                levels: true,
            },
            ExpandLevel::Max => Expansion::Inline {
                item,
                scope: ExpandScope::Recursive {
                    item,
                    remaining: None,
                },
                levels: true,
            },
        }
    }

    fn expand_item(item: &'a ExpandItem) -> Expansion<'a> {
        if item.refs_only {
            return Expansion::References { item };
        }
        if let Some(levels) = item.levels {
            return Self::from_item(item, levels);
        }
        Expansion::Inline {
            item,
            scope: ExpandScope::root(item.expand.as_ref()),
            levels: false,
        }
    }

    /// Decides how the navigation property `nav` is written, if at all.
    pub fn resolve(&self, nav: &str) -> Option<Expansion<'a>> {
        match self {
            ExpandScope::None => None,
            ExpandScope::Tree { tree, prefix } => {
                let tree: &'a ExpandTree = tree;
                tree.find(prefix, nav).map(Self::expand_item)
            }
            ExpandScope::Recursive { item, remaining } => {
                let item: &'a ExpandItem = item;
                if item.matches(&[], nav) {
                    return Some(match remaining {
                        Some(0) => Expansion::References { item },
                        Some(n) => Expansion::Inline {
                            item,
                            scope: ExpandScope::Recursive {
                                item,
                                remaining: Some(n - 1),
                            },
                            levels: true,
                        },
                        None => Expansion::Inline {
                            item,
                            scope: ExpandScope::Recursive {
                                item,
                                remaining: None,
                            },
                            levels: true,
                        },
                    });
                }
                item.expand
                    .as_ref()
                    .and_then(|tree| tree.find(&[], nav))
                    .map(Self::expand_item)
            }
        }
    }

    /// Returns true if some expansion below this node is driven by `$levels`.
    ///
    /// Only then do entities need to be recorded in the [`Ancestry`].
    pub fn tracks_ancestry(&self) -> bool {
        match self {
            ExpandScope::None => false,
            ExpandScope::Tree { tree, .. } => tree.items.iter().any(|i| i.levels.is_some()),
            ExpandScope::Recursive { .. } => true,
        }
    }

    /// Scope for the members of the complex property `name`.
    pub fn descend(&self, name: &str) -> ExpandScope<'a> {
        match self {
            ExpandScope::Tree { tree, prefix } => {
                let mut prefix = prefix.clone();
                prefix.push(name.to_string());
                if tree.reaches_into(&prefix) {
                    ExpandScope::Tree { tree: *tree, prefix }
                } else {
                    ExpandScope::None
                }
            }
            _ => ExpandScope::None,
        }
    }
}

/// Identity of an entity on the current expansion path: type name and key predicate.
pub type Identity = (String, String);

/// Entities on the current expansion path, root first.
///
/// Entries are pushed on entry to an entity and popped on exit, so sibling
/// branches never see each other.
#[derive(Debug, Clone, Default)]
pub struct Ancestry {
    chain: Vec<Identity>,
}

impl Ancestry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, identity: Identity) {
        self.chain.push(identity);
    }

    pub fn pop(&mut self) {
        self.chain.pop();
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.chain.contains(identity)
    }

    pub fn depth(&self) -> usize {
        self.chain.len()
    }
}
