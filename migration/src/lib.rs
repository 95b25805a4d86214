use sea_orm_migration::prelude::*;
pub use sea_orm_migration::prelude::{MigrationTrait, MigratorTrait};

mod m20240301_000001_create_table;
mod m20240301_000002_add_images;
mod m20240412_000003_blob_attachment_storage;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_table::Migration),
            Box::new(m20240301_000002_add_images::Migration),
            Box::new(m20240412_000003_blob_attachment_storage::Migration),
        ]
    }
}
