pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20250301_000001_create_urls;
mod m20250315_000001_owner_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_urls::Migration),
            Box::new(m20250315_000001_owner_index::Migration),
        ]
    }
}
