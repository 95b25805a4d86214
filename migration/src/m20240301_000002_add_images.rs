use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UploadedImage::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UploadedImage::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(UploadedImage::Bytes).text().not_null())
                    .col(ColumnDef::new(UploadedImage::Filename).string_len(255).not_null())
                    .col(ColumnDef::new(UploadedImage::Mimetype).string_len(50).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlobAttachment::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlobAttachment::Uuid).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BlobAttachment::Name).string_len(255))
                    .col(ColumnDef::new(BlobAttachment::File).string_len(100).not_null())
                    .col(ColumnDef::new(BlobAttachment::Uploaded).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlobAttachment::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UploadedImage::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UploadedImage {
    Table,
    Uuid,
    Bytes,
    Filename,
    Mimetype,
}

#[derive(DeriveIden)]
enum BlobAttachment {
    Table,
    Uuid,
    Name,
    File,
    Uploaded,
}
