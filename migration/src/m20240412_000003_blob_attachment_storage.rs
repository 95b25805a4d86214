use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Attachment files now live in uploaded_image, addressed by filename.
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("uploaded_image_filename")
                    .table(UploadedImage::Table)
                    .col(UploadedImage::Filename)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("blob_attachment_file")
                    .table(BlobAttachment::Table)
                    .col(BlobAttachment::File)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("blob_attachment_file").table(BlobAttachment::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("uploaded_image_filename").table(UploadedImage::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum UploadedImage {
    Table,
    Filename,
}

#[derive(DeriveIden)]
enum BlobAttachment {
    Table,
    File,
}
