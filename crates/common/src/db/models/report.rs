//! Moderation report ("flag") raised by a user against a piece of content

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of content a report points at, stored next to the target id
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "snake_case")]
pub enum ReportTargetKind {
    #[sea_orm(string_value = "language")]
    Language,
    #[sea_orm(string_value = "framework")]
    Framework,
    #[sea_orm(string_value = "opinion")]
    Opinion,
    #[sea_orm(string_value = "comment")]
    Comment,
}

/// Reported content. Exactly one target per report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ReportTarget {
    Language(Uuid),
    Framework(Uuid),
    Opinion(Uuid),
    Comment(Uuid),
}

impl ReportTarget {
    pub fn kind(&self) -> ReportTargetKind {
        match self {
            ReportTarget::Language(_) => ReportTargetKind::Language,
            ReportTarget::Framework(_) => ReportTargetKind::Framework,
            ReportTarget::Opinion(_) => ReportTargetKind::Opinion,
            ReportTarget::Comment(_) => ReportTargetKind::Comment,
        }
    }

    pub fn id(&self) -> Uuid {
        match *self {
            ReportTarget::Language(id)
            | ReportTarget::Framework(id)
            | ReportTarget::Opinion(id)
            | ReportTarget::Comment(id) => id,
        }
    }

    pub fn from_parts(kind: ReportTargetKind, id: Uuid) -> Self {
        match kind {
            ReportTargetKind::Language => ReportTarget::Language(id),
            ReportTargetKind::Framework => ReportTarget::Framework(id),
            ReportTargetKind::Opinion => ReportTarget::Opinion(id),
            ReportTargetKind::Comment => ReportTarget::Comment(id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(column_type = "Text")]
    pub reason: String,

    pub resolved: bool,

    /// Reporting user
    pub reporter_id: Uuid,

    pub target_kind: ReportTargetKind,

    /// Not a foreign key: the report outlives the reported content
    pub target_id: Uuid,
}

impl Model {
    pub fn target(&self) -> ReportTarget {
        ReportTarget::from_parts(self.target_kind, self.target_id)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Reporter,
}

impl ActiveModelBehavior for ActiveModel {}
