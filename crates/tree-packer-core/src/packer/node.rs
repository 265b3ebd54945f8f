use crate::model::Region;
use std::{fmt, mem};
use tracing::trace;

/// Allocation state of a leaf. Branches carry no state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafState {
    Free,
    Occupied,
}

/// Direction of the single guillotine cut that turned a leaf into a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// Cut parallel to the y axis: `left` keeps the requested width, `right` gets the remaining width.
    Vertical,
    /// Cut parallel to the x axis: `left` keeps the requested height, `right` gets the remaining height.
    Horizontal,
}

impl SplitAxis {
    /// Chooses the cut for the unused slack of a leaf.
    /// Wider-than-tall slack cuts vertically; everything else, equal slack included, cuts horizontally.
    pub fn for_slack(remaining_width: u32, remaining_height: u32) -> Self {
        if remaining_width > remaining_height {
            SplitAxis::Vertical
        } else {
            SplitAxis::Horizontal
        }
    }
}

#[derive(Debug)]
enum NodeKind {
    Leaf(LeafState),
    Branch { left: Box<Node>, right: Box<Node> },
}

/// A sub-rectangle of the canvas.
///
/// A node is either a leaf (free or occupied) or a branch whose two children
/// partition its region exactly. Splits are permanent: nothing in this type
/// merges children back or frees an occupied leaf.
pub struct Node {
    region: Region,
    kind: NodeKind,
}

impl Node {
    /// Free leaf covering `region`.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            kind: NodeKind::Leaf(LeafState::Free),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    /// Leaf state, or `None` for a branch.
    pub fn state(&self) -> Option<LeafState> {
        match self.kind {
            NodeKind::Leaf(state) => Some(state),
            NodeKind::Branch { .. } => None,
        }
    }

    pub fn children(&self) -> Option<(&Node, &Node)> {
        match &self.kind {
            NodeKind::Leaf(_) => None,
            NodeKind::Branch { left, right } => Some((left, right)),
        }
    }

    /// How this branch was cut, or `None` for a leaf.
    pub fn split_axis(&self) -> Option<SplitAxis> {
        self.children().map(|(left, right)| {
            if right.region.x > left.region.x {
                SplitAxis::Vertical
            } else {
                SplitAxis::Horizontal
            }
        })
    }

    /// Finds or carves a leaf of exactly `w` x `h`, marks it occupied and returns its region.
    ///
    /// Depth-first and left-biased. A free leaf larger than the request is split
    /// once along the axis picked by [`SplitAxis::for_slack`] and the search
    /// continues into the new left child, so one request splits at most twice.
    pub fn try_insert(&mut self, w: u32, h: u32) -> Option<Region> {
        self.insert_with(w, h, true)
    }

    /// Same walk as [`Node::try_insert`] without occupying the leaf it finds.
    ///
    /// This is not a read-only query: leaves on the path are split exactly as an
    /// insertion would split them, which is what guarantees that an immediately
    /// following `try_insert(w, h)` lands on the leaf this call found.
    pub fn can_insert(&mut self, w: u32, h: u32) -> bool {
        self.insert_with(w, h, false).is_some()
    }

    /// Like [`Node::can_insert`], returning the region the next `try_insert(w, h)` will occupy.
    pub fn find_slot(&mut self, w: u32, h: u32) -> Option<Region> {
        self.insert_with(w, h, false)
    }

    fn insert_with(&mut self, w: u32, h: u32, occupy: bool) -> Option<Region> {
        let path = self.path_to_free_leaf(w, h)?;
        let mut node = self;
        for go_right in path {
            node = match &mut node.kind {
                NodeKind::Branch { left, right } => {
                    if go_right {
                        &mut **right
                    } else {
                        &mut **left
                    }
                }
                NodeKind::Leaf(_) => return None,
            };
        }
        node.carve(w, h, occupy)
    }

    /// Left-biased pre-order search for the first free leaf at least `w` x `h`.
    /// Returns the turns taken from `self` (`true` = right child).
    fn path_to_free_leaf(&self, w: u32, h: u32) -> Option<Vec<bool>> {
        let mut path = Vec::new();
        let mut stack = vec![(self, 0usize, false)];
        while let Some((node, depth, went_right)) = stack.pop() {
            path.truncate(depth.saturating_sub(1));
            if depth > 0 {
                path.push(went_right);
            }
            match &node.kind {
                NodeKind::Leaf(LeafState::Occupied) => {}
                NodeKind::Leaf(LeafState::Free) => {
                    if w <= node.region.w && h <= node.region.h {
                        return Some(path);
                    }
                }
                NodeKind::Branch { left, right } => {
                    stack.push((&**right, depth + 1, true));
                    stack.push((&**left, depth + 1, false));
                }
            }
        }
        None
    }

    /// Splits a free leaf until its left-most descendant is exactly `w` x `h`.
    fn carve(&mut self, w: u32, h: u32, occupy: bool) -> Option<Region> {
        let mut node = self;
        loop {
            let r = node.region;
            if !matches!(node.kind, NodeKind::Leaf(LeafState::Free)) || w > r.w || h > r.h {
                return None;
            }
            if w == r.w && h == r.h {
                if occupy {
                    node.kind = NodeKind::Leaf(LeafState::Occupied);
                }
                return Some(r);
            }

            let remaining_width = r.w - w;
            let remaining_height = r.h - h;
            let axis = SplitAxis::for_slack(remaining_width, remaining_height);
            let (left, right) = match axis {
                SplitAxis::Vertical => (
                    Region::new(r.x, r.y, w, r.h),
                    Region::new(r.x + w, r.y, remaining_width, r.h),
                ),
                SplitAxis::Horizontal => (
                    Region::new(r.x, r.y, r.w, h),
                    Region::new(r.x, r.y + h, r.w, remaining_height),
                ),
            };
            trace!(?r, ?axis, ?left, ?right, "split leaf");

            node.kind = NodeKind::Branch {
                left: Box::new(Node::new(left)),
                right: Box::new(Node::new(right)),
            };
            node = match &mut node.kind {
                NodeKind::Branch { left, .. } => &mut **left,
                NodeKind::Leaf(_) => return None,
            };
        }
    }

    /// Visits every leaf, left subtree first.
    pub fn for_each_leaf<F: FnMut(&Node)>(&self, f: &mut F) {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            match &node.kind {
                NodeKind::Leaf(_) => f(node),
                NodeKind::Branch { left, right } => {
                    stack.push(&**right);
                    stack.push(&**left);
                }
            }
        }
    }

    /// Number of nodes on the longest path from this node to a leaf, this node included.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let NodeKind::Branch { left, right } = &node.kind {
                stack.push((&**left, depth + 1));
                stack.push((&**right, depth + 1));
            }
        }
        deepest
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let NodeKind::Branch { left, right } = &node.kind {
                stack.push(&**left);
                stack.push(&**right);
            }
        }
        count
    }
}

impl fmt::Debug for Node {
    // Summary only; trees can be tens of thousands of nodes deep.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("region", &self.region)
            .field("state", &self.state())
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl Drop for Node {
    // Unlink children iteratively; deep chains would overflow the call stack.
    fn drop(&mut self) {
        let mut stack = Vec::new();
        if let NodeKind::Branch { left, right } =
            mem::replace(&mut self.kind, NodeKind::Leaf(LeafState::Free))
        {
            stack.push(left);
            stack.push(right);
        }
        while let Some(mut node) = stack.pop() {
            if let NodeKind::Branch { left, right } =
                mem::replace(&mut node.kind, NodeKind::Leaf(LeafState::Free))
            {
                stack.push(left);
                stack.push(right);
            }
        }
    }
}
