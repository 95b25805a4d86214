use base64::{Engine as _, engine::general_purpose::STANDARD};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::{prelude::*, ActiveValue};
use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::schema;


/// Names the model and fields that back attachment files.
pub const UPLOAD_TO: &str = "images.UploadedImage/bytes/filename/mimetype";

pub const MAX_FILE_NAME_LENGTH: usize = 100;
const SUFFIX_LENGTH: usize = 7;
const MAX_SAVE_ATTEMPTS: usize = 16;

const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("File {0} does not exist")]
    NotFound(String),
    #[error("Invalid storage descriptor {0}")]
    InvalidDescriptor(String),
    #[error("Invalid file name {0}")]
    InvalidName(String),
    #[error("Could not find a free name for {0}")]
    NoAvailableName(String),
    #[error("Stored content of {0} is not valid base64")]
    CorruptContent(String),
    #[error("Invalid data url")]
    InvalidDataUrl,
    #[error(transparent)]
    DbErr(#[from] DbErr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageDescriptor {
    pub model: String,
    pub bytes_field: String,
    pub filename_field: String,
    pub mimetype_field: String,
}

impl StorageDescriptor {
    pub fn parse(descriptor: &str) -> Result<Self, StorageError> {
        let parts = descriptor.split('/').collect::<Vec<_>>();
        match parts.as_slice() {
            [model, bytes, filename, mimetype] if parts.iter().all(|p| !p.is_empty()) => {
                Ok(StorageDescriptor {
                    model: String::from(*model),
                    bytes_field: String::from(*bytes),
                    filename_field: String::from(*filename),
                    mimetype_field: String::from(*mimetype),
                })
            },
            _ => Err(StorageError::InvalidDescriptor(descriptor.to_string()))
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub content: Vec<u8>,
    pub mimetype: String,
}

/// File storage that keeps contents base64 encoded in the `uploaded_image` table.
#[derive(Debug, Clone)]
pub struct DatabaseFileStorage {
    descriptor: StorageDescriptor,
}

impl DatabaseFileStorage {
    pub fn new(descriptor: &str) -> Result<Self, StorageError> {
        let parsed = StorageDescriptor::parse(descriptor)?;
        let supported = parsed.model == "images.UploadedImage"
            && parsed.bytes_field == schema::uploaded_image::Column::Bytes.as_str()
            && parsed.filename_field == schema::uploaded_image::Column::Filename.as_str()
            && parsed.mimetype_field == schema::uploaded_image::Column::Mimetype.as_str();
        if !supported {
            return Err(StorageError::InvalidDescriptor(descriptor.to_string()));
        }
        Ok(DatabaseFileStorage { descriptor: parsed })
    }

    async fn find<C>(db: &C, name: &str) -> Result<Option<schema::uploaded_image::Model>, DbErr> where C: ConnectionTrait {
        schema::uploaded_image::Entity::find()
            .filter(schema::uploaded_image::Column::Filename.eq(name))
            .one(db)
            .await
    }

    pub async fn exists<C>(&self, db: &C, name: &str) -> Result<bool, StorageError> where C: ConnectionTrait {
        Ok(Self::find(db, name).await?.is_some())
    }

    pub async fn open<C>(&self, db: &C, name: &str) -> Result<StoredFile, StorageError> where C: ConnectionTrait {
        let model = Self::find(db, name).await?.ok_or_else(|| StorageError::NotFound(name.to_string()))?;
        let content = STANDARD.decode(model.bytes.as_bytes()).map_err(|_| StorageError::CorruptContent(name.to_string()))?;
        Ok(StoredFile { name: model.filename, content, mimetype: model.mimetype })
    }

    pub async fn size<C>(&self, db: &C, name: &str) -> Result<usize, StorageError> where C: ConnectionTrait {
        Ok(self.open(db, name).await?.content.len())
    }

    pub async fn delete<C>(&self, db: &C, name: &str) -> Result<(), StorageError> where C: ConnectionTrait {
        schema::uploaded_image::Entity::delete_many()
            .filter(schema::uploaded_image::Column::Filename.eq(name))
            .exec(db)
            .await?;
        Ok(())
    }

    /// Path the file is served under, with the name percent-encoded as a single segment.
    pub fn url(&self, name: &str) -> String {
        format!("/images/file/{}", utf8_percent_encode(name, PATH_SEGMENT))
    }

    /// Stores `content` and returns the name it was stored under,
    /// which differs from `name` if that was already taken.
    pub async fn save<C>(&self, db: &C, name: &str, content: &[u8], mimetype: &str) -> Result<String, StorageError> where C: ConnectionTrait {
        let name = clean_name(name)?;
        let name = self.get_available_name(db, &name).await?;

        schema::uploaded_image::ActiveModel {
            uuid: ActiveValue::Set(Uuid::new_v4()),
            bytes: ActiveValue::Set(STANDARD.encode(content)),
            filename: ActiveValue::Set(name.clone()),
            mimetype: ActiveValue::Set(mimetype.to_string()),
        }.insert(db).await?;

        tracing::debug!("Stored {} ({} bytes, {})", name, content.len(), mimetype);
        Ok(name)
    }

    pub async fn get_available_name<C>(&self, db: &C, name: &str) -> Result<String, StorageError> where C: ConnectionTrait {
        let candidate = truncate_name(name, "");
        if !self.exists(db, &candidate).await? {
            return Ok(candidate);
        }

        for _ in 0..MAX_SAVE_ATTEMPTS {
            let suffix: String = rand::thread_rng().sample_iter(&Alphanumeric).take(SUFFIX_LENGTH).map(char::from).collect();
            let candidate = truncate_name(name, &suffix);
            if !self.exists(db, &candidate).await? {
                return Ok(candidate);
            }
        }
        Err(StorageError::NoAvailableName(name.to_string()))
    }
}

impl Default for DatabaseFileStorage {
    fn default() -> Self {
        DatabaseFileStorage {
            descriptor: StorageDescriptor {
                model: "images.UploadedImage".into(),
                bytes_field: "bytes".into(),
                filename_field: "filename".into(),
                mimetype_field: "mimetype".into(),
            }
        }
    }
}

fn clean_name(name: &str) -> Result<String, StorageError> {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if base.is_empty() || base == "." || base == ".." {
        return Err(StorageError::InvalidName(name.to_string()));
    }
    Ok(base.to_string())
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Builds `<root>_<suffix><ext>`, shortening the root so the result fits in a file column.
fn truncate_name(name: &str, suffix: &str) -> String {
    let (root, ext) = split_extension(name);
    let suffix = if suffix.is_empty() { String::new() } else { format!("_{}", suffix) };
    let budget = MAX_FILE_NAME_LENGTH.saturating_sub(suffix.chars().count() + ext.chars().count()).max(1);
    let root: String = root.chars().take(budget).collect();
    format!("{}{}{}", root, suffix, ext)
}

/// Splits a `data:<mime>;base64,<payload>` url.
pub fn parse_data_url(url: &str) -> Result<(String, Vec<u8>), StorageError> {
    let rest = url.strip_prefix("data:").ok_or(StorageError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(StorageError::InvalidDataUrl)?;
    let mimetype = header.strip_suffix(";base64").ok_or(StorageError::InvalidDataUrl)?;
    if mimetype.is_empty() {
        return Err(StorageError::InvalidDataUrl);
    }
    let content = STANDARD.decode(payload.trim()).map_err(|_| StorageError::InvalidDataUrl)?;
    Ok((mimetype.to_string(), content))
}


#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, Clone)]
pub struct BlobAttachment {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub file: String,
    pub uploaded: chrono::NaiveDateTime,
}

impl From<schema::blob_attachment::Model> for BlobAttachment {
    fn from(model: schema::blob_attachment::Model) -> Self {
        BlobAttachment {
            uuid: model.uuid,
            name: model.name,
            file: model.file,
            uploaded: model.uploaded,
        }
    }
}

impl BlobAttachment {
    pub async fn create<C>(db: &C, storage: &DatabaseFileStorage, name: Option<String>, filename: &str, content: &[u8], mimetype: &str) -> Result<BlobAttachment, StorageError> where C: ConnectionTrait {
        let file = storage.save(db, filename, content, mimetype).await?;
        let attachment = BlobAttachment {
            uuid: Uuid::new_v4(),
            name,
            file,
            uploaded: chrono::Utc::now().naive_utc(),
        };

        schema::blob_attachment::ActiveModel {
            uuid: ActiveValue::Set(attachment.uuid),
            name: ActiveValue::Set(attachment.name.clone()),
            file: ActiveValue::Set(attachment.file.clone()),
            uploaded: ActiveValue::Set(attachment.uploaded),
        }.insert(db).await?;

        Ok(attachment)
    }

    pub async fn get<C>(db: &C, uuid: Uuid) -> Result<Option<BlobAttachment>, DbErr> where C: ConnectionTrait {
        Ok(schema::blob_attachment::Entity::find_by_id(uuid).one(db).await?.map(BlobAttachment::from))
    }

    pub async fn delete<C>(self, db: &C, storage: &DatabaseFileStorage) -> Result<(), StorageError> where C: ConnectionTrait {
        schema::blob_attachment::Entity::delete_by_id(self.uuid).exec(db).await?;
        storage.delete(db, &self.file).await
    }
}
