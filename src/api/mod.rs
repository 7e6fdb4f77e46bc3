//! API endpoint modules.

pub mod health;
pub mod openapi;
pub mod test_results;

use std::sync::Arc;

use actix_web::http::header::{AcceptLanguage, Preference, Quality};
use actix_web::{HttpMessage, HttpRequest, web};

use crate::error::{ApiError, AppError};
use crate::i18n::{BuiltinCatalog, Language, MessageCatalog};

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use test_results::configure_routes as configure_test_results_routes;

/// Message catalog shared by every worker.
pub type SharedCatalog = Arc<dyn MessageCatalog>;

/// Pick the best supported language from the request's `Accept-Language`.
///
/// Falls back to American English when the header is missing, malformed or
/// names nothing supported.
pub fn negotiate_language(req: &HttpRequest) -> Language {
    let Some(AcceptLanguage(items)) = req.get_header::<AcceptLanguage>() else {
        return Language::AmericanEnglish;
    };

    // q=0 means "not acceptable"
    let acceptable = AcceptLanguage(
        items
            .into_iter()
            .filter(|item| item.quality > Quality::ZERO)
            .collect(),
    );

    acceptable
        .ranked()
        .into_iter()
        .find_map(|preference| match preference {
            Preference::Specific(tag) => Language::from_tag(tag.primary_language()),
            Preference::Any => None,
        })
        .unwrap_or(Language::AmericanEnglish)
}

/// Render an error in the language negotiated from the request.
///
/// Uses the [`SharedCatalog`] registered as app data, or the built-in one.
pub fn localize(req: &HttpRequest, error: AppError) -> ApiError {
    let language = negotiate_language(req);

    match req.app_data::<web::Data<SharedCatalog>>() {
        Some(catalog) => ApiError::localized(error, catalog.get_ref().as_ref(), language),
        None => ApiError::localized(error, &BuiltinCatalog, language),
    }
}
