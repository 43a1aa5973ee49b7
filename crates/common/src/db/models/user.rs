//! User account entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Label shown instead of the real name for private profiles
pub const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous User";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub email: String,

    /// National taxpayer ID
    #[sea_orm(column_type = "Text", unique)]
    pub national_id: String,

    #[sea_orm(column_type = "Text")]
    pub first_name: String,

    #[sea_orm(column_type = "Text")]
    pub last_name: String,

    /// Argon2 PHC string, absent for accounts without a usable password
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text", nullable)]
    pub password_hash: Option<String>,

    pub is_active: bool,

    pub is_admin: bool,

    pub is_public: bool,

    #[sea_orm(column_type = "Text", nullable)]
    pub education: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub profession: Option<String>,

    pub registered_at: DateTimeWithTimeZone,
}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Name shown next to contributions
    pub fn display_name(&self) -> String {
        if self.is_public {
            self.full_name()
        } else {
            ANONYMOUS_DISPLAY_NAME.to_string()
        }
    }

    pub fn profession(&self) -> Option<&str> {
        self.profession.as_deref().filter(|p| !p.is_empty())
    }

    pub fn is_staff(&self) -> bool {
        self.is_admin
    }

    pub fn is_superuser(&self) -> bool {
        self.is_admin
    }

    /// Every account holds every permission; staff-only surfaces check `is_staff`
    pub fn has_perm(&self, _perm: &str) -> bool {
        true
    }

    pub fn has_module_perms(&self, _module: &str) -> bool {
        true
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::language::Entity")]
    Languages,

    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::language::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Languages.def()
    }
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
