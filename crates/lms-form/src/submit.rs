use async_trait::async_trait;
use lms_core::{
    LessonType, UploadKind,
    i18n::Lang,
    payload::{CoursePayload, LessonPayload, SavedEntity, SectionPayload, SimulationPayload, StepPayload},
};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    draft::{Body, ItemId, PendingFile},
    errors::ErrorKey,
    state::FormState,
};

/// Which kind of entity a form saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Course,
    Simulation,
}

/// Failure reported by a [`FormBackend`].
#[derive(Debug, Error)]
pub enum BackendError {
    /// The slug derived from the title belongs to another entity.
    #[error("slug already taken")]
    Conflict,
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The services the form talks to on submit: slug check, file storage and
/// persistence.
#[async_trait]
pub trait FormBackend: Send + Sync {
    /// `Ok(())` when the title's slug is free for this entity.
    async fn check_slug(&self, kind: EntityKind, id: Option<Uuid>, title: &str, lang: Lang) -> Result<(), BackendError>;

    /// Store a file and return its public URL.
    async fn upload(&self, kind: UploadKind, file: &PendingFile) -> Result<String, BackendError>;

    /// Create (`id == None`) or replace a course.
    async fn save_course(&self, id: Option<Uuid>, payload: &CoursePayload) -> Result<SavedEntity, BackendError>;

    /// Create (`id == None`) or replace a simulation.
    async fn save_simulation(
        &self,
        id: Option<Uuid>,
        payload: &SimulationPayload,
    ) -> Result<SavedEntity, BackendError>;
}

/// Why a submit did not save the entity.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// Another submit on this form has not finished.
    #[error("a submit is already in progress")]
    Busy,
    /// Validation failed; the messages are in the form's error map.
    #[error("form has {count} invalid field(s)")]
    Invalid { count: usize },
    #[error("slug already taken")]
    SlugTaken,
    /// Some files failed to upload; they stay pending for a retry.
    #[error("{failed} upload(s) failed")]
    Upload { failed: usize },
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Holds the form's `loading` flag for one submit and clears it on drop,
/// including when the submit future is dropped mid-await.
struct LoadingGuard<'a>(&'a mut FormState);

impl<'a> LoadingGuard<'a> {
    fn new(form: &'a mut FormState) -> Self {
        form.loading = true;
        Self(form)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.loading = false;
    }
}

/// A pending file with the item that owns it and where it goes.
struct UploadJob {
    owner: ItemId,
    kind: UploadKind,
}

impl FormState {
    /// Whether the form edits a course or a simulation.
    pub fn entity_kind(&self) -> EntityKind {
        match self.body {
            Body::Course { .. } => EntityKind::Course,
            Body::Simulation { .. } => EntityKind::Simulation,
        }
    }

    /// Validate, upload pending files and save the entity.
    ///
    /// Nothing is uploaded unless the draft is valid and its slug is free.
    /// The cover image goes first, then item files one at a time in display
    /// order. Files that uploaded successfully leave the pending set even if
    /// a later one fails, so a retry only re-sends the failures.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<SavedEntity, SubmitError>
    where
        B: FormBackend + ?Sized,
    {
        if self.loading {
            return Err(SubmitError::Busy);
        }
        let result = {
            let mut guard = LoadingGuard::new(self);
            guard.0.submit_inner(backend).await
        };

        match &result {
            Ok(saved) => tracing::info!(id = %saved.id, slug = %saved.slug, version = saved.version, "form saved"),
            Err(e) => tracing::warn!(error = %e, "form submit failed"),
        }
        result
    }

    async fn submit_inner<B>(&mut self, backend: &B) -> Result<SavedEntity, SubmitError>
    where
        B: FormBackend + ?Sized,
    {
        if !self.validate() {
            return Err(SubmitError::Invalid {
                count: self.errors.len(),
            });
        }

        let messages = self.ctx.lang.messages();
        let kind = self.entity_kind();

        match backend
            .check_slug(kind, self.ctx.entity_id, self.title.trim(), self.ctx.lang)
            .await
        {
            Ok(()) => {}
            Err(BackendError::Conflict) => return Err(self.slug_taken()),
            Err(e) => return Err(e.into()),
        }

        if let Some(image) = self.pending_image.clone() {
            match backend.upload(UploadKind::Images, &image).await {
                Ok(url) => {
                    self.image_url = Some(url);
                    self.pending_image = None;
                }
                Err(e) => {
                    tracing::warn!(error = %e, file = %image.name, "cover image upload failed");
                    self.errors.insert(ErrorKey::Image, messages.image_upload_failed);
                    return Err(SubmitError::Upload { failed: 1 });
                }
            }
        }

        let mut failed = 0;
        for job in self.upload_jobs() {
            let Some(file) = self.pending_files.get(&job.owner).cloned() else {
                continue;
            };
            match backend.upload(job.kind, &file).await {
                Ok(url) => {
                    self.pending_files.remove(&job.owner);
                    self.attach_uploaded(job.owner, url);
                }
                Err(e) => {
                    tracing::warn!(error = %e, file = %file.name, "item upload failed");
                    failed += 1;
                    self.mark_upload_failed(job.owner, messages.file_upload_failed);
                }
            }
        }
        if failed > 0 {
            return Err(SubmitError::Upload { failed });
        }

        let id = self.ctx.entity_id;
        let saved = match &self.body {
            Body::Course { .. } => backend.save_course(id, &self.course_payload()).await,
            Body::Simulation { .. } => backend.save_simulation(id, &self.simulation_payload()).await,
        };
        let saved = match saved {
            Ok(saved) => saved,
            Err(BackendError::Conflict) => return Err(self.slug_taken()),
            Err(e) => return Err(e.into()),
        };

        self.ctx.entity_id = Some(saved.id);
        self.mark_clean();
        Ok(saved)
    }

    fn slug_taken(&mut self) -> SubmitError {
        let messages = self.ctx.lang.messages();
        let message = match self.entity_kind() {
            EntityKind::Course => messages.course_already_exists,
            EntityKind::Simulation => messages.simulation_already_exists,
        };
        self.errors.insert(ErrorKey::Title, message);
        SubmitError::SlugTaken
    }

    fn upload_jobs(&self) -> Vec<UploadJob> {
        match &self.body {
            Body::Course { sections } => sections
                .iter()
                .flat_map(|s| &s.lessons)
                .filter(|l| self.pending_files.contains_key(&l.id))
                .filter_map(|l| {
                    let kind = match l.lesson_type {
                        LessonType::Video => UploadKind::Videos,
                        LessonType::Document => UploadKind::Documents,
                        _ => return None,
                    };
                    Some(UploadJob { owner: l.id, kind })
                })
                .collect(),
            Body::Simulation { steps } => steps
                .iter()
                .filter(|s| self.pending_files.contains_key(&s.id))
                .map(|s| UploadJob {
                    owner: s.id,
                    kind: UploadKind::Videos,
                })
                .collect(),
        }
    }

    fn attach_uploaded(&mut self, owner: ItemId, url: String) {
        match &mut self.body {
            Body::Course { sections } => {
                if let Some(lesson) = sections.iter_mut().flat_map(|s| &mut s.lessons).find(|l| l.id == owner) {
                    match lesson.lesson_type {
                        LessonType::Document => lesson.document_url = Some(url),
                        _ => lesson.video_url = Some(url),
                    }
                    lesson.upload_error = None;
                }
            }
            Body::Simulation { steps } => {
                if let Some(step) = steps.iter_mut().find(|s| s.id == owner) {
                    step.video_url = Some(url);
                    step.upload_error = None;
                }
            }
        }
    }

    fn mark_upload_failed(&mut self, owner: ItemId, message: &str) {
        match &mut self.body {
            Body::Course { sections } => {
                for (s, section) in sections.iter_mut().enumerate() {
                    if let Some(l) = section.lessons.iter().position(|l| l.id == owner) {
                        section.lessons[l].upload_error = Some(message.to_string());
                        self.errors.insert(ErrorKey::LessonContent { section: s, lesson: l }, message);
                        return;
                    }
                }
            }
            Body::Simulation { steps } => {
                if let Some(i) = steps.iter().position(|s| s.id == owner) {
                    steps[i].upload_error = Some(message.to_string());
                    self.errors.insert(ErrorKey::StepVideo(i), message);
                }
            }
        }
    }

    /// The course as it will be sent, with positions taken from the current order.
    pub fn course_payload(&self) -> CoursePayload {
        let sections: Vec<SectionPayload> = self
            .sections()
            .iter()
            .enumerate()
            .map(|(s, section)| SectionPayload {
                title: section.title.trim().to_string(),
                order: s as i32,
                lessons: section
                    .lessons
                    .iter()
                    .enumerate()
                    .map(|(l, lesson)| LessonPayload {
                        title: lesson.title.trim().to_string(),
                        lesson_type: lesson.lesson_type,
                        content: lesson.content.clone(),
                        video_url: lesson.video_url.clone(),
                        document_url: lesson.document_url.clone(),
                        test: lesson.test.clone(),
                        order: l as i32,
                    })
                    .collect(),
            })
            .collect();
        let total_lessons = sections.iter().map(|s| s.lessons.len()).sum::<usize>() as i32;

        CoursePayload {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            keywords: self.keywords.clone(),
            sections,
            total_lessons,
            lang: self.ctx.lang,
        }
    }

    /// The simulation as it will be sent, steps numbered in display order.
    pub fn simulation_payload(&self) -> SimulationPayload {
        SimulationPayload {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            image_url: self.image_url.clone(),
            keywords: self.keywords.clone(),
            steps: self
                .steps()
                .iter()
                .enumerate()
                .map(|(i, step)| StepPayload {
                    title: step.title.trim().to_string(),
                    content: step.content.clone(),
                    video_url: step.video_url.clone(),
                    video_preview_url: step.video_preview_url.clone(),
                    order: i as i32,
                })
                .collect(),
            lang: self.ctx.lang,
        }
    }
}
