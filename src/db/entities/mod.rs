//! SeaORM entities that map to database tables.

pub mod tag;

pub mod prelude {
    pub use super::tag::ActiveModel as TagActiveModel;
    pub use super::tag::Column as TagColumn;
    pub use super::tag::Entity as Tag;
    pub use super::tag::Model as TagModel;
}
