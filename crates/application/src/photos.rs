// Photo commands: the binary content lives behind the `FileManager`, the
// person row only stores the path it was filed under.

use crate::files::FileManager;
use crate::pipeline;
use crate::validation::{Rules, ValidateRequest};
use person_registry_domain::unit_of_work::UnitOfWork;
use person_registry_domain::{DomainError, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct UploadPhotoRequest {
    pub person_id: i32,
    pub file_name: String,
    pub content: Vec<u8>,
}

impl ValidateRequest for UploadPhotoRequest {
    fn validate(&self) -> Result<()> {
        Rules::new()
            .positive("person id", self.person_id)
            .not_empty("file name", &self.file_name)
            .must(!self.content.is_empty(), "photo content must not be empty")
            .finish()
    }
}

pub struct UploadPhotoUseCase {
    uow: Arc<dyn UnitOfWork>,
    files: Arc<dyn FileManager>,
}

impl UploadPhotoUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>, files: Arc<dyn FileManager>) -> Self {
        Self { uow, files }
    }

    /// Stores the photo and returns the path it is served from. A person who
    /// already has a photo gets it replaced.
    pub async fn execute(&self, request: UploadPhotoRequest) -> Result<String> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            let path = if person.has_photo() {
                self.files
                    .replace(&request.file_name, &request.content, &person.photo)
                    .await?
            } else {
                self.files.upload(&request.file_name, &request.content).await?
            };

            person.update_photo_url(&path);
            self.uow.persons().update(&person).await?;

            info!(person_id = person.id, %path, "photo stored");
            Ok(path)
        })
        .await
    }
}

#[derive(Debug, Clone)]
pub struct DeletePhotoRequest {
    pub person_id: i32,
}

impl ValidateRequest for DeletePhotoRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().positive("person id", self.person_id).finish()
    }
}

pub struct DeletePhotoUseCase {
    uow: Arc<dyn UnitOfWork>,
    files: Arc<dyn FileManager>,
}

impl DeletePhotoUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>, files: Arc<dyn FileManager>) -> Self {
        Self { uow, files }
    }

    /// Deletes the person's photo. A person without a photo is left as-is.
    pub async fn execute(&self, request: DeletePhotoRequest) -> Result<()> {
        pipeline::execute_in_tx(self.uow.as_ref(), &request, || async {
            let mut person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            if !person.has_photo() {
                return Ok(());
            }

            self.files.delete(&person.photo).await?;
            person.delete_photo();
            self.uow.persons().update(&person).await?;

            info!(person_id = person.id, "photo deleted");
            Ok(())
        })
        .await
    }
}

#[derive(Debug, Clone)]
pub struct DownloadPhotoRequest {
    pub person_id: i32,
}

impl ValidateRequest for DownloadPhotoRequest {
    fn validate(&self) -> Result<()> {
        Rules::new().positive("person id", self.person_id).finish()
    }
}

/// A photo's path and raw bytes as handed back to the transport layer.
#[derive(Debug)]
pub struct PhotoContent {
    pub path: String,
    pub content: Vec<u8>,
}

pub struct DownloadPhotoUseCase {
    uow: Arc<dyn UnitOfWork>,
    files: Arc<dyn FileManager>,
}

impl DownloadPhotoUseCase {
    pub fn new(uow: Arc<dyn UnitOfWork>, files: Arc<dyn FileManager>) -> Self {
        Self { uow, files }
    }

    pub async fn execute(&self, request: DownloadPhotoRequest) -> Result<PhotoContent> {
        pipeline::execute(&request, || async {
            let person = self
                .uow
                .persons()
                .get_by_id(request.person_id)
                .await?
                .ok_or(DomainError::not_found("person", request.person_id))?;

            if !person.has_photo() {
                return Err(DomainError::not_found("photo", request.person_id));
            }

            let content = self.files.download(&person.photo).await?;
            Ok(PhotoContent {
                path: person.photo,
                content,
            })
        })
        .await
    }
}
