//! HTTP route handlers for the paper translator web application.
//!
//! Pages are full HTML renders; every POST answers with a 303 redirect back
//! to the session page, carrying its outcome as a flash message.

mod download;
mod history;
mod pages;
mod translate;
mod upload;

pub use download::{download_export, view_pdf};
pub use history::{cancel_delete, delete_translation, new_translation, restore_translation};
pub use pages::{index, view_session};
pub use translate::translate;
pub use upload::upload_pdf;

use serde::Deserialize;

/// Query params for the session page.
#[derive(Deserialize, Default)]
pub struct ViewQuery {
    /// `pdf` or `text`
    #[serde(default)]
    pub view: Option<String>,
}
