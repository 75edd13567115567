//! Reply tree reconstruction for the comments of a single post.
//!
//! The store hands back a flat list; the tree is rebuilt from scratch on every
//! load and after every mutation.

use crate::models::{Comment, CommentId};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentTreeNode {
    pub comment: Comment,
    pub replies: Vec<CommentTreeNode>,
}

impl CommentTreeNode {
    /// Number of comments in this subtree, including this one.
    pub fn size(&self) -> usize {
        self.walk().count()
    }

    /// Pre-order traversal yielding each comment with its depth below this node.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            stack: vec![(0, self)],
        }
    }
}

pub struct Walk<'a> {
    stack: Vec<(usize, &'a CommentTreeNode)>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a Comment);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.replies.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, &node.comment))
    }
}

/// Flattens a forest into render order: every root followed by its replies,
/// each tagged with its indentation depth.
pub fn flatten(roots: &[CommentTreeNode]) -> Vec<(usize, &Comment)> {
    roots.iter().flat_map(CommentTreeNode::walk).collect()
}

pub fn find<'a>(roots: &'a [CommentTreeNode], id: CommentId) -> Option<&'a Comment> {
    roots
        .iter()
        .flat_map(CommentTreeNode::walk)
        .map(|(_, c)| c)
        .find(|c| c.id == id)
}

/// Builds the reply forest from comments of one post.
///
/// Input order is preserved among siblings, so callers pass comments sorted
/// by creation time. A comment whose `parent_id` names an id missing from the
/// input is dropped together with its replies. When an id occurs twice the
/// first occurrence wins.
pub fn build_comment_tree(comments: Vec<Comment>) -> Vec<CommentTreeNode> {
    let mut index: HashMap<CommentId, usize> = HashMap::with_capacity(comments.len());
    for (i, c) in comments.iter().enumerate() {
        index.entry(c.id).or_insert(i);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
    let mut roots = Vec::new();
    for (i, c) in comments.iter().enumerate() {
        if index.get(&c.id) != Some(&i) {
            continue;
        }
        match c.parent_id {
            None => roots.push(i),
            Some(parent) => {
                if let Some(&p) = index.get(&parent) {
                    children[p].push(i);
                }
            }
        }
    }

    // Pre-order over everything reachable from a root. Nodes hanging off a
    // missing parent (or caught in a cycle) are never visited.
    let mut order = Vec::with_capacity(comments.len());
    let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
    while let Some(i) = stack.pop() {
        order.push(i);
        stack.extend(children[i].iter().rev());
    }

    // Children come after their parent in pre-order, so walking it backwards
    // assembles every subtree before the node that owns it. No recursion, so
    // depth is bounded only by memory.
    let mut slots: Vec<Option<Comment>> = comments.into_iter().map(Some).collect();
    let mut built: Vec<Option<CommentTreeNode>> = (0..slots.len()).map(|_| None).collect();
    for &i in order.iter().rev() {
        let replies = children[i]
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        if let Some(comment) = slots[i].take() {
            built[i] = Some(CommentTreeNode { comment, replies });
        }
    }

    roots
        .into_iter()
        .filter_map(|i| built[i].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostId, UserId};
    use chrono::NaiveDateTime;

    fn comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: parent.map(CommentId),
            author_id: UserId::new_unchecked("ash".into()),
            author: None,
            content: format!("comment {}", id),
            created_at: NaiveDateTime::default(),
            updated_at: None,
        }
    }

    fn ids(nodes: &[CommentTreeNode]) -> Vec<i64> {
        nodes.iter().map(|n| n.comment.id.0).collect()
    }

    #[test]
    fn dangling_parent_is_dropped() {
        let roots = build_comment_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(99)),
        ]);

        assert_eq!(ids(&roots), vec![1]);
        assert_eq!(ids(&roots[0].replies), vec![2]);
        assert!(find(&roots, CommentId(3)).is_none());
    }

    #[test]
    fn subtree_of_dangling_comment_is_dropped_too() {
        let roots = build_comment_tree(vec![
            comment(1, None),
            comment(3, Some(99)),
            comment(4, Some(3)),
            comment(5, Some(4)),
        ]);

        assert_eq!(flatten(&roots).len(), 1);
    }

    #[test]
    fn siblings_keep_input_order() {
        let roots = build_comment_tree(vec![
            comment(10, None),
            comment(12, Some(10)),
            comment(11, Some(10)),
            comment(13, None),
        ]);

        assert_eq!(ids(&roots), vec![10, 13]);
        assert_eq!(ids(&roots[0].replies), vec![12, 11]);
    }

    #[test]
    fn reply_before_parent_still_attaches() {
        let roots = build_comment_tree(vec![comment(2, Some(1)), comment(1, None)]);

        assert_eq!(ids(&roots), vec![1]);
        assert_eq!(ids(&roots[0].replies), vec![2]);
    }

    #[test]
    fn every_reachable_comment_appears_once() {
        let input = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, Some(1)),
            comment(5, None),
            comment(6, Some(5)),
            comment(7, Some(3)),
        ];
        let roots = build_comment_tree(input.clone());

        let mut seen: Vec<i64> = flatten(&roots).iter().map(|(_, c)| c.id.0).collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 6, 7]);

        for c in input.iter().filter(|c| c.parent_id.is_some()) {
            assert!(!ids(&roots).contains(&c.id.0));
        }
    }

    #[test]
    fn depth_follows_distance_from_root() {
        let roots = build_comment_tree(vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(2)),
            comment(4, None),
        ]);

        let depths: Vec<(i64, usize)> = flatten(&roots)
            .into_iter()
            .map(|(d, c)| (c.id.0, d))
            .collect();
        assert_eq!(depths, vec![(1, 0), (2, 1), (3, 2), (4, 0)]);
        assert_eq!(roots[0].size(), 3);
    }

    #[test]
    fn deep_chain_builds_without_recursion() {
        let mut input = vec![comment(0, None)];
        input.extend((1..5_000).map(|i| comment(i, Some(i - 1))));

        let roots = build_comment_tree(input);

        assert_eq!(roots.len(), 1);
        let (depth, last) = roots[0].walk().last().unwrap();
        assert_eq!(depth, 4_999);
        assert_eq!(last.id, CommentId(4_999));
    }

    #[test]
    fn self_reference_is_unreachable() {
        let roots = build_comment_tree(vec![comment(1, None), comment(2, Some(2))]);
        assert_eq!(flatten(&roots).len(), 1);
    }

    #[test]
    fn duplicate_id_keeps_first() {
        let mut dup = comment(1, None);
        dup.content = "second copy".into();
        let roots = build_comment_tree(vec![comment(1, None), dup]);

        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].comment.content, "comment 1");
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let input = vec![
            comment(1, None),
            comment(2, Some(1)),
            comment(3, Some(1)),
            comment(4, Some(2)),
        ];

        assert_eq!(
            build_comment_tree(input.clone()),
            build_comment_tree(input)
        );
    }
}
