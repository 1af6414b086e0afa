//! Admin create path: optional image upload, then a single insert.
//!
//! ```text
//! validate ─▶ upload image? ─▶ public URL ─▶ insert ─▶ reset + refetch
//!    │             │                           │
//!    ▼             ▼                           ▼
//!  Invalid       Upload                      Insert (image orphaned)
//! ```
//!
//! Any failure leaves the form and the selected image exactly as they were.

use labsite_core::{FormError, MemberForm, MemberId, NewMember, NewPost, PostForm, PostId};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::gateway::{GatewayError, RemoteGateway, Table};
use crate::image::ImageFile;
use crate::store::ListStore;

/// Why a submission did not create a record.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// A required field is blank. Nothing was sent.
    #[error(transparent)]
    Invalid(#[from] FormError),

    /// A submission from this form is still in flight.
    #[error("a submission is already in progress")]
    Busy,

    /// The image upload was rejected; no record was inserted.
    #[error("image upload failed: {0}")]
    Upload(#[source] GatewayError),

    /// The insert was rejected.
    #[error("insert failed: {0}")]
    Insert(#[source] GatewayError),
}

impl SubmitError {
    /// Short message for the admin.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Invalid(e) => e.to_string(),
            Self::Busy => "A submission is already in progress".to_string(),
            Self::Upload(e) => format!("Image upload failed: {e}"),
            Self::Insert(e) => format!("Save failed: {e}"),
        }
    }
}

/// A form whose contents become one row in one table.
pub trait RecordForm: Clone + Send + Sync {
    type Record: Serialize + Sync;
    type Id: From<i64>;

    const TABLE: Table;

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns the first missing field.
    fn validate(&self) -> Result<(), FormError>;

    fn to_record(&self, image_url: Option<String>) -> Self::Record;
}

impl RecordForm for PostForm {
    type Record = NewPost;
    type Id = PostId;

    const TABLE: Table = Table::Posts;

    fn validate(&self) -> Result<(), FormError> {
        Self::validate(self)
    }

    fn to_record(&self, image_url: Option<String>) -> NewPost {
        Self::to_record(self, image_url)
    }
}

impl RecordForm for MemberForm {
    type Record = NewMember;
    type Id = MemberId;

    const TABLE: Table = Table::Members;

    fn validate(&self) -> Result<(), FormError> {
        Self::validate(self)
    }

    fn to_record(&self, image_url: Option<String>) -> NewMember {
        Self::to_record(self, image_url)
    }
}

/// Form state plus the selected image and the in-flight flag.
#[derive(Debug, Clone)]
pub struct Submission<F> {
    defaults: F,
    form: F,
    image: Option<ImageFile>,
    pending: bool,
}

impl<F: RecordForm> Submission<F> {
    /// Start from `defaults`; the form is reset to them after each success.
    #[must_use]
    pub fn new(defaults: F) -> Self {
        Self {
            form: defaults.clone(),
            defaults,
            image: None,
            pending: false,
        }
    }

    #[must_use]
    pub const fn form(&self) -> &F {
        &self.form
    }

    pub const fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    #[must_use]
    pub const fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    pub fn select_image(&mut self, image: Option<ImageFile>) {
        self.image = image;
    }

    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Back to defaults with no image selected.
    pub fn reset(&mut self) {
        self.form = self.defaults.clone();
        self.image = None;
        self.pending = false;
    }

    /// Create the record.
    ///
    /// On success the form is reset, the store is refetched once and the new
    /// id is returned.
    ///
    /// # Errors
    ///
    /// See [`SubmitError`]. The form is untouched on every error.
    #[instrument(skip_all, fields(table = ?F::TABLE))]
    pub async fn submit<G: RemoteGateway>(
        &mut self,
        gateway: &G,
        store: &mut ListStore,
    ) -> Result<F::Id, SubmitError> {
        if self.pending {
            return Err(SubmitError::Busy);
        }
        self.form.validate()?;

        let table = store.tables().name(F::TABLE).to_owned();

        self.pending = true;
        let result = {
            let _pending = PendingGuard(&mut self.pending);
            upload_and_insert(&self.form, self.image.as_ref(), gateway, &table).await
        };
        let id = result?;

        info!(table = %table, id, "Record created");
        self.reset();
        store.refetch(gateway).await;

        Ok(F::Id::from(id))
    }
}

/// Clears the in-flight flag on every exit, including a dropped future.
struct PendingGuard<'a>(&'a mut bool);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

async fn upload_and_insert<F: RecordForm, G: RemoteGateway>(
    form: &F,
    image: Option<&ImageFile>,
    gateway: &G,
    table: &str,
) -> Result<i64, SubmitError> {
    let uploaded = match image {
        Some(image) => {
            let key = image.upload_key();
            gateway
                .upload(&key, image)
                .await
                .map_err(SubmitError::Upload)?;
            debug!(key = %key, "Uploaded image");
            let url = gateway.public_url(&key);
            Some((key, url))
        }
        None => None,
    };

    let record = form.to_record(uploaded.as_ref().map(|(_, url)| url.clone()));

    match gateway.insert(table, &record).await {
        Ok(id) => Ok(id),
        Err(e) => {
            if let Some((key, _)) = &uploaded {
                warn!(key = %key, "Insert failed; uploaded image is orphaned");
            }
            Err(SubmitError::Insert(e))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use labsite_core::Category;

    use super::*;
    use crate::gateway::Tables;
    use crate::gateway::fake::{Call, FakeGateway};

    fn post_submission() -> Submission<PostForm> {
        let today = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        Submission::new(PostForm::new(today, "BVI Lab"))
    }

    fn png() -> ImageFile {
        ImageFile::new("poster.png", vec![0x89, b'P', b'N', b'G'])
    }

    #[tokio::test]
    async fn test_empty_title_makes_no_call() {
        let gateway = FakeGateway::new();
        let mut store = ListStore::new(Tables::default());
        let mut submission = post_submission();
        submission.form_mut().description = "draft".to_string();
        submission.select_image(Some(png()));
        let before = submission.form().clone();

        let err = submission.submit(&gateway, &mut store).await.unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(FormError::MissingTitle)));
        assert!(gateway.calls().is_empty());
        assert_eq!(submission.form(), &before);
        assert!(submission.image().is_some());
        assert!(!submission.is_pending());
    }

    #[tokio::test]
    async fn test_failed_upload_skips_insert_and_keeps_form() {
        let gateway = FakeGateway::new();
        gateway.fail_upload("Payload too large");
        let mut store = ListStore::new(Tables::default());
        let mut submission = post_submission();
        submission.form_mut().title = "Best paper".to_string();
        submission.form_mut().category = Category::Award;
        submission.select_image(Some(png()));
        let before = submission.form().clone();

        let err = submission.submit(&gateway, &mut store).await.unwrap_err();

        assert_eq!(err.notice(), "Image upload failed: Payload too large");
        let calls = gateway.calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(calls[0], Call::Upload(_)));
        assert_eq!(submission.form(), &before);
        assert_eq!(submission.image(), Some(&png()));
        assert!(!submission.is_pending());
    }

    #[tokio::test]
    async fn test_success_resets_form_and_refetches_once() {
        let gateway = FakeGateway::new();
        let mut store = ListStore::new(Tables::default());
        let mut submission = post_submission();
        submission.form_mut().title = "Seminar on diffusion".to_string();
        submission.form_mut().category = Category::Seminar;
        submission.select_image(Some(png()));

        let id = submission.submit(&gateway, &mut store).await.unwrap();

        assert_eq!(id, PostId::new(101));
        assert_eq!(submission.form(), post_submission().form());
        assert!(submission.image().is_none());

        let calls = gateway.calls();
        let Call::Upload(key) = &calls[0] else {
            panic!("expected upload first, got {calls:?}");
        };
        assert!(key.ends_with(".png"));
        assert_eq!(
            calls[1..],
            [
                Call::Insert("news".to_string()),
                Call::Select("news".to_string()),
                Call::Select("members".to_string()),
            ]
        );

        let row = &gateway.rows("news")[0];
        assert_eq!(row["title"], "Seminar on diffusion");
        assert_eq!(row["category"], "Seminar");
        assert_eq!(
            row["image_url"],
            format!("https://fake.local/storage/v1/object/public/images/{key}")
        );
        assert_eq!(gateway.object(key).unwrap(), png().bytes());

        assert_eq!(store.posts().len(), 1);
        assert_eq!(store.posts()[0].id, id);
    }

    #[tokio::test]
    async fn test_without_image_inserts_null_url() {
        let gateway = FakeGateway::new();
        let mut store = ListStore::new(Tables::default());
        let mut submission = Submission::new(MemberForm::default());
        submission.form_mut().name = "Kim".to_string();
        submission.form_mut().tags = "AI, Web3".to_string();

        let id = submission.submit(&gateway, &mut store).await.unwrap();

        assert_eq!(id, MemberId::new(101));
        assert_eq!(gateway.object_count(), 0);
        let row = &gateway.rows("members")[0];
        assert!(row["image_url"].is_null());
        assert_eq!(row["role"], "Ph.D. Student");
        assert_eq!(row["status"], "in progress");
        assert_eq!(store.members()[0].name, "Kim");
    }

    #[tokio::test]
    async fn test_failed_insert_keeps_form_and_orphans_image() {
        let gateway = FakeGateway::new();
        gateway.fail_insert("new row violates row-level security policy");
        let mut store = ListStore::new(Tables::default());
        let mut submission = Submission::new(MemberForm::default());
        submission.form_mut().name = "Park".to_string();
        submission.select_image(Some(png()));
        let before = submission.form().clone();

        let err = submission.submit(&gateway, &mut store).await.unwrap_err();

        assert_eq!(
            err.notice(),
            "Save failed: new row violates row-level security policy"
        );
        assert_eq!(submission.form(), &before);
        assert!(submission.image().is_some());
        assert_eq!(gateway.object_count(), 1);
        assert!(
            !gateway
                .calls()
                .iter()
                .any(|c| matches!(c, Call::Select(_)))
        );
    }

    #[tokio::test]
    async fn test_pending_submission_is_busy() {
        let gateway = FakeGateway::new();
        let mut store = ListStore::new(Tables::default());
        let mut submission = post_submission();
        submission.form_mut().title = "Twice".to_string();
        submission.pending = true;

        let err = submission.submit(&gateway, &mut store).await.unwrap_err();

        assert!(matches!(err, SubmitError::Busy));
        assert!(gateway.calls().is_empty());

        submission.reset();
        assert!(!submission.is_pending());
    }

    #[tokio::test]
    async fn test_abandoned_submit_does_not_lock_form() {
        let gateway = FakeGateway::new();
        gateway.hang_upload();
        let mut store = ListStore::new(Tables::default());
        let mut submission = Submission::new(MemberForm::default());
        submission.form_mut().name = "Yoon".to_string();
        submission.select_image(Some(png()));

        let timed_out = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            submission.submit(&gateway, &mut store),
        )
        .await;

        assert!(timed_out.is_err());
        assert!(!submission.is_pending());
        assert_eq!(submission.form().name, "Yoon");

        submission.select_image(None);
        let id = submission.submit(&gateway, &mut store).await.unwrap();
        assert_eq!(id, MemberId::new(101));
    }
}
