//! Initial catalog schema: users, taxonomy, contributions, discussion,
//! moderation and login sessions.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).text().not_null().unique_key())
                    .col(ColumnDef::new(Users::NationalId).text().not_null().unique_key())
                    .col(ColumnDef::new(Users::FirstName).text().not_null())
                    .col(ColumnDef::new(Users::LastName).text().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).text())
                    .col(ColumnDef::new(Users::IsActive).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::IsAdmin).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::IsPublic).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::Education).text())
                    .col(ColumnDef::new(Users::Profession).text())
                    .col(
                        ColumnDef::new(Users::RegisteredAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Languages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Languages::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Languages::Name).text().not_null())
                    .col(ColumnDef::new(Languages::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_languages_user_id")
                            .from(Languages::Table, Languages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Frameworks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Frameworks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Frameworks::Name).text().not_null())
                    .col(ColumnDef::new(Frameworks::LanguageId).uuid().not_null())
                    .col(ColumnDef::new(Frameworks::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frameworks_language_id")
                            .from(Frameworks::Table, Frameworks::LanguageId)
                            .to(Languages::Table, Languages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_frameworks_user_id")
                            .from(Frameworks::Table, Frameworks::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(FrameworkFavorites::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(FrameworkFavorites::FrameworkId).uuid().not_null())
                    .col(ColumnDef::new(FrameworkFavorites::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(FrameworkFavorites::FrameworkId)
                            .col(FrameworkFavorites::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_framework_favorites_framework_id")
                            .from(FrameworkFavorites::Table, FrameworkFavorites::FrameworkId)
                            .to(Frameworks::Table, Frameworks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_framework_favorites_user_id")
                            .from(FrameworkFavorites::Table, FrameworkFavorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Versions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Versions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Versions::Number).decimal_len(10, 3).not_null().default(0))
                    .col(ColumnDef::new(Versions::FrameworkId).uuid().not_null())
                    .col(ColumnDef::new(Versions::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_versions_framework_id")
                            .from(Versions::Table, Versions::FrameworkId)
                            .to(Frameworks::Table, Frameworks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_versions_user_id")
                            .from(Versions::Table, Versions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HelloWorlds::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(HelloWorlds::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(HelloWorlds::Description).text().not_null())
                    .col(ColumnDef::new(HelloWorlds::ExampleCode).text().not_null())
                    .col(ColumnDef::new(HelloWorlds::UserId).uuid().not_null())
                    .col(ColumnDef::new(HelloWorlds::VersionId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hello_worlds_user_id")
                            .from(HelloWorlds::Table, HelloWorlds::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hello_worlds_version_id")
                            .from(HelloWorlds::Table, HelloWorlds::VersionId)
                            .to(Versions::Table, Versions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Features::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Features::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Features::Description).text().not_null())
                    .col(ColumnDef::new(Features::UserId).uuid().not_null())
                    .col(ColumnDef::new(Features::VersionId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_features_user_id")
                            .from(Features::Table, Features::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_features_version_id")
                            .from(Features::Table, Features::VersionId)
                            .to(Versions::Table, Versions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Opinions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Opinions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Opinions::Text).text().not_null())
                    .col(ColumnDef::new(Opinions::IsFavorable).boolean().not_null().default(true))
                    .col(ColumnDef::new(Opinions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Opinions::VersionId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opinions_user_id")
                            .from(Opinions::Table, Opinions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_opinions_version_id")
                            .from(Opinions::Table, Opinions::VersionId)
                            .to(Versions::Table, Versions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Links::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Links::Path).text().not_null())
                    .col(ColumnDef::new(Links::FrameworkId).uuid().not_null())
                    .col(ColumnDef::new(Links::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_framework_id")
                            .from(Links::Table, Links::FrameworkId)
                            .to(Frameworks::Table, Frameworks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_links_user_id")
                            .from(Links::Table, Links::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Votes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Votes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Votes::LinkId).uuid().not_null())
                    .col(ColumnDef::new(Votes::UserId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_link_id")
                            .from(Votes::Table, Votes::LinkId)
                            .to(Links::Table, Links::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_votes_user_id")
                            .from(Votes::Table, Votes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Comments::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Comments::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Comments::Text).text().not_null())
                    .col(
                        ColumnDef::new(Comments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Comments::FrameworkId).uuid().not_null())
                    .col(ColumnDef::new(Comments::UserId).uuid().not_null())
                    .col(ColumnDef::new(Comments::ParentId).uuid())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_framework_id")
                            .from(Comments::Table, Comments::FrameworkId)
                            .to(Frameworks::Table, Frameworks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_user_id")
                            .from(Comments::Table, Comments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comments_parent_id")
                            .from(Comments::Table, Comments::ParentId)
                            .to(Comments::Table, Comments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Reports::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Reports::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Reports::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Reports::Reason).text().not_null())
                    .col(ColumnDef::new(Reports::Resolved).boolean().not_null().default(false))
                    .col(ColumnDef::new(Reports::ReporterId).uuid().not_null())
                    .col(ColumnDef::new(Reports::TargetKind).text().not_null())
                    .col(ColumnDef::new(Reports::TargetId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_reports_reporter_id")
                            .from(Reports::Table, Reports::ReporterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Sessions::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Sessions::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Sessions::UserId).uuid().not_null())
                    .col(ColumnDef::new(Sessions::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Sessions::ExpiresAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sessions_user_id")
                            .from(Sessions::Table, Sessions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Lookup paths used by the duplicate checks and per-framework listings
        manager
            .create_index(
                Index::create()
                    .name("idx_versions_framework_number")
                    .table(Versions::Table)
                    .col(Versions::FrameworkId)
                    .col(Versions::Number)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_votes_link_user")
                    .table(Votes::Table)
                    .col(Votes::LinkId)
                    .col(Votes::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_comments_framework_id")
                    .table(Comments::Table)
                    .col(Comments::FrameworkId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_reports_target_reporter")
                    .table(Reports::Table)
                    .col(Reports::TargetKind)
                    .col(Reports::TargetId)
                    .col(Reports::ReporterId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Sessions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Reports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Comments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Votes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Opinions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Features::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(HelloWorlds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Versions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FrameworkFavorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Frameworks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Languages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    NationalId,
    FirstName,
    LastName,
    PasswordHash,
    IsActive,
    IsAdmin,
    IsPublic,
    Education,
    Profession,
    RegisteredAt,
}

#[derive(DeriveIden)]
enum Languages {
    Table,
    Id,
    Name,
    UserId,
}

#[derive(DeriveIden)]
enum Frameworks {
    Table,
    Id,
    Name,
    LanguageId,
    UserId,
}

#[derive(DeriveIden)]
enum FrameworkFavorites {
    Table,
    FrameworkId,
    UserId,
}

#[derive(DeriveIden)]
enum Versions {
    Table,
    Id,
    Number,
    FrameworkId,
    UserId,
}

#[derive(DeriveIden)]
enum HelloWorlds {
    Table,
    Id,
    Description,
    ExampleCode,
    UserId,
    VersionId,
}

#[derive(DeriveIden)]
enum Features {
    Table,
    Id,
    Description,
    UserId,
    VersionId,
}

#[derive(DeriveIden)]
enum Opinions {
    Table,
    Id,
    Text,
    IsFavorable,
    UserId,
    VersionId,
}

#[derive(DeriveIden)]
enum Links {
    Table,
    Id,
    Path,
    FrameworkId,
    UserId,
}

#[derive(DeriveIden)]
enum Votes {
    Table,
    Id,
    LinkId,
    UserId,
}

#[derive(DeriveIden)]
enum Comments {
    Table,
    Id,
    Text,
    CreatedAt,
    FrameworkId,
    UserId,
    ParentId,
}

#[derive(DeriveIden)]
enum Reports {
    Table,
    Id,
    CreatedAt,
    Reason,
    Resolved,
    ReporterId,
    TargetKind,
    TargetId,
}

#[derive(DeriveIden)]
enum Sessions {
    Table,
    Id,
    UserId,
    CreatedAt,
    ExpiresAt,
}
