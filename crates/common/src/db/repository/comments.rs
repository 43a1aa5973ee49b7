//! Threaded framework discussion

use super::{fetch_by_id, lock_by_id, Repository};
use crate::db::models::*;
use crate::errors::{AppError, Result};
use crate::metrics;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Comments of one framework arranged as a forest.
///
/// Each comment keeps its `parent_id`; the thread adds a parent -> children
/// index so replies can be walked without re-querying.
#[derive(Debug, Default)]
pub struct CommentThread {
    comments: HashMap<Uuid, Comment>,
    roots: Vec<Uuid>,
    children: HashMap<Uuid, Vec<Uuid>>,
}

/// A comment together with its nesting depth (roots are 0)
#[derive(Debug, Clone, Copy)]
pub struct CommentNode<'a> {
    pub comment: &'a Comment,
    pub depth: usize,
}

impl CommentThread {
    /// Build from comments sorted oldest first. A reply whose parent is not
    /// in the set is treated as a root.
    pub fn from_comments(comments: Vec<Comment>) -> Self {
        let mut thread = Self::default();

        for comment in &comments {
            match comment.parent_id {
                Some(parent) if comments.iter().any(|c| c.id == parent) => {
                    thread.children.entry(parent).or_default().push(comment.id)
                }
                _ => thread.roots.push(comment.id),
            }
        }

        thread.comments = comments.into_iter().map(|c| (c.id, c)).collect();
        thread
    }

    pub fn len(&self) -> usize {
        self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Comment> {
        self.comments.get(&id)
    }

    /// Top-level comments, oldest first
    pub fn roots(&self) -> impl Iterator<Item = &Comment> {
        self.roots.iter().filter_map(|id| self.comments.get(id))
    }

    /// Direct replies to `id`, oldest first
    pub fn replies(&self, id: Uuid) -> impl Iterator<Item = &Comment> {
        self.children
            .get(&id)
            .into_iter()
            .flatten()
            .filter_map(|child| self.comments.get(child))
    }

    /// Depth-first walk: every root followed by its replies
    pub fn walk(&self) -> Vec<CommentNode<'_>> {
        let mut out = Vec::with_capacity(self.comments.len());
        let mut stack: Vec<(Uuid, usize)> =
            self.roots.iter().rev().map(|id| (*id, 0)).collect();

        while let Some((id, depth)) = stack.pop() {
            let Some(comment) = self.comments.get(&id) else {
                continue;
            };
            out.push(CommentNode { comment, depth });

            if let Some(children) = self.children.get(&id) {
                stack.extend(children.iter().rev().map(|child| (*child, depth + 1)));
            }
        }

        out
    }
}

impl Repository {
    /// Start a new top-level comment
    pub async fn add_comment(
        &self,
        text: &str,
        framework_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment> {
        let comment = new_comment(text, framework_id, user_id, None)
            .insert(self.write_conn())
            .await?;

        metrics::record_contribution("comment");
        info!(comment_id = %comment.id, framework_id = %framework_id, "Comment added");

        Ok(comment)
    }

    /// Reply to an existing comment, holding a lock on the parent.
    /// The reply must belong to the parent's framework.
    pub async fn add_reply(
        &self,
        parent_id: Uuid,
        text: &str,
        framework_id: Uuid,
        user_id: Uuid,
    ) -> Result<Comment> {
        let txn = self.write_conn().begin().await?;

        let parent = lock_by_id::<CommentEntity>(&txn, parent_id, "comment").await?;
        if parent.framework_id != framework_id {
            return Err(AppError::Validation {
                message: format!("Comment {parent_id} belongs to another framework"),
                field: Some("framework_id".to_string()),
            });
        }

        let reply = new_comment(text, framework_id, user_id, Some(parent_id))
            .insert(&txn)
            .await?;

        txn.commit().await?;

        metrics::record_contribution("comment");
        info!(comment_id = %reply.id, parent_id = %parent_id, "Reply added");

        Ok(reply)
    }

    /// Delete a comment; its replies go with it
    pub async fn delete_comment(&self, id: Uuid) -> Result<()> {
        let txn = self.write_conn().begin().await?;

        lock_by_id::<CommentEntity>(&txn, id, "comment").await?;
        CommentEntity::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;

        info!(comment_id = %id, "Comment deleted");
        Ok(())
    }

    /// Full discussion of a framework
    pub async fn comment_thread(&self, framework_id: Uuid) -> Result<CommentThread> {
        let comments = CommentEntity::find()
            .filter(CommentColumn::FrameworkId.eq(framework_id))
            .order_by_asc(CommentColumn::CreatedAt)
            .all(self.read_conn())
            .await?;

        Ok(CommentThread::from_comments(comments))
    }

    /// Text of a comment, as shown next to a report
    pub async fn comment_text(&self, id: Uuid) -> Result<String> {
        Ok(fetch_by_id::<CommentEntity, _>(self.read_conn(), id, "comment")
            .await?
            .text)
    }
}

fn new_comment(
    text: &str,
    framework_id: Uuid,
    user_id: Uuid,
    parent_id: Option<Uuid>,
) -> CommentActiveModel {
    CommentActiveModel {
        id: Set(Uuid::new_v4()),
        text: Set(text.to_string()),
        created_at: Set(chrono::Utc::now().into()),
        framework_id: Set(framework_id),
        user_id: Set(user_id),
        parent_id: Set(parent_id),
    }
}
