//! SeaORM entity models
//!
//! One table per catalog entity. Every contribution row carries its author
//! as `user_id` and is removed when the author is deleted.

mod comment;
mod feature;
mod framework;
mod framework_favorite;
mod hello_world;
mod language;
mod link;
mod opinion;
mod report;
mod session;
mod user;
mod version;
mod vote;

pub use user::{
    Entity as UserEntity,
    Model as User,
    ActiveModel as UserActiveModel,
    Column as UserColumn,
    ANONYMOUS_DISPLAY_NAME,
};

pub use language::{
    Entity as LanguageEntity,
    Model as Language,
    ActiveModel as LanguageActiveModel,
    Column as LanguageColumn,
};

pub use framework::{
    Entity as FrameworkEntity,
    Model as Framework,
    ActiveModel as FrameworkActiveModel,
    Column as FrameworkColumn,
};

pub use framework_favorite::{
    Entity as FrameworkFavoriteEntity,
    Model as FrameworkFavorite,
    ActiveModel as FrameworkFavoriteActiveModel,
    Column as FrameworkFavoriteColumn,
};

pub use version::{
    Entity as VersionEntity,
    Model as Version,
    ActiveModel as VersionActiveModel,
    Column as VersionColumn,
};

pub use hello_world::{
    Entity as HelloWorldEntity,
    Model as HelloWorld,
    ActiveModel as HelloWorldActiveModel,
    Column as HelloWorldColumn,
};

pub use feature::{
    Entity as FeatureEntity,
    Model as Feature,
    ActiveModel as FeatureActiveModel,
    Column as FeatureColumn,
};

pub use opinion::{
    Entity as OpinionEntity,
    Model as Opinion,
    ActiveModel as OpinionActiveModel,
    Column as OpinionColumn,
};

pub use link::{
    Entity as LinkEntity,
    Model as Link,
    ActiveModel as LinkActiveModel,
    Column as LinkColumn,
};

pub use vote::{
    Entity as VoteEntity,
    Model as Vote,
    ActiveModel as VoteActiveModel,
    Column as VoteColumn,
};

pub use comment::{
    Entity as CommentEntity,
    Model as Comment,
    ActiveModel as CommentActiveModel,
    Column as CommentColumn,
};

pub use report::{
    Entity as ReportEntity,
    Model as Report,
    ActiveModel as ReportActiveModel,
    Column as ReportColumn,
    ReportTarget,
    ReportTargetKind,
};

pub use session::{
    Entity as SessionEntity,
    Model as Session,
    ActiveModel as SessionActiveModel,
    Column as SessionColumn,
};
