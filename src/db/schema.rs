use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, Schema};
use tracing::info;

use crate::db::entities::tag;

/// Creates the `tags` table when it does not exist yet.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    let mut create_tags = schema.create_table_from_entity(tag::Entity);
    create_tags.if_not_exists();
    db.execute(backend.build(&create_tags)).await?;

    info!(backend = ?backend, "Database schema is ready.");
    Ok(())
}
