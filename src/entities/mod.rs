//! Content entities
//!
//! Each module declares a column enum, a record, a schema marker and its
//! create/update shapes, then adds semantic helpers on `Model<Schema, H>`.

pub mod comment;
pub mod media;
pub mod option;
pub mod page;
pub mod plugin;
pub mod post;
pub mod role;
pub mod site;
pub mod template;
pub mod theme;
pub mod user;

pub use comment::{CommentColumn, CommentRecord, CommentStatus, Comments, CreateComment, UpdateComment};
pub use media::{CreateMedia, MediaColumn, MediaItems, MediaRecord, UpdateMedia};
pub use option::{OptionColumn, OptionRecord, SiteOptions};
pub use page::{CreatePage, PageColumn, PageRecord, Pages, UpdatePage};
pub use plugin::{CreatePlugin, PluginColumn, PluginRecord, Plugins};
pub use post::{CreatePost, PostColumn, PostRecord, Posts, PublishStatus, UpdatePost};
pub use role::{CreateRole, RoleColumn, RoleRecord, Roles, UpdateRole};
pub use site::{CreateSite, SiteColumn, SiteRecord, Sites, UpdateSite};
pub use template::{CreateTemplate, TemplateColumn, TemplateRecord, Templates, UpdateTemplate};
pub use theme::{CreateTheme, ThemeColumn, ThemeRecord, Themes};
pub use user::{CreateUser, UpdateUser, UserColumn, UserRecord, Users};

use crate::db::Database;
use crate::orm::{Model, Store};

/// Every entity model bound to one store handle.
///
/// Built once from the pool ([`Database::models`]) and shared, or per transaction
/// with `Models::new(tx)` so every write lands in that transaction.
#[derive(Debug, Clone)]
pub struct Models<H: Store + Clone = Database> {
    pub users: Model<Users, H>,
    pub roles: Model<Roles, H>,
    pub sites: Model<Sites, H>,
    pub posts: Model<Posts, H>,
    pub pages: Model<Pages, H>,
    pub comments: Model<Comments, H>,
    pub media: Model<MediaItems, H>,
    pub templates: Model<Templates, H>,
    pub themes: Model<Themes, H>,
    pub plugins: Model<Plugins, H>,
    pub options: Model<SiteOptions, H>,
}

impl<H: Store + Clone> Models<H> {
    pub fn new(store: H) -> Self {
        Self {
            users: Model::new(store.clone()),
            roles: Model::new(store.clone()),
            sites: Model::new(store.clone()),
            posts: Model::new(store.clone()),
            pages: Model::new(store.clone()),
            comments: Model::new(store.clone()),
            media: Model::new(store.clone()),
            templates: Model::new(store.clone()),
            themes: Model::new(store.clone()),
            plugins: Model::new(store.clone()),
            options: Model::new(store),
        }
    }
}
