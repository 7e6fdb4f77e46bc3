//! Localized error messages.
//!
//! The catalog is a lookup service from [`ErrorCode`] to a user-facing string.
//! [`BuiltinCatalog`] ships American English and French; callers may provide
//! their own [`MessageCatalog`] implementation.

use crate::error::{AppError, ErrorCode};

/// Languages with a message catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    AmericanEnglish,
    French,
}

impl Language {
    /// Supported languages, default first.
    pub const SUPPORTED: [Language; 2] = [Language::AmericanEnglish, Language::French];

    /// Map a BCP 47 tag to a supported language by its primary subtag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Self::AmericanEnglish),
            "fr" => Some(Self::French),
            _ => None,
        }
    }
}

/// Lookup service turning an error code into a localized message.
pub trait MessageCatalog: Send + Sync {
    fn message(&self, code: ErrorCode, language: Language) -> Option<&str>;
}

/// Built-in American English / French catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinCatalog;

impl MessageCatalog for BuiltinCatalog {
    fn message(&self, code: ErrorCode, language: Language) -> Option<&str> {
        let msg = match language {
            Language::AmericanEnglish => match code {
                ErrorCode::UnknownError => "internal server error",
                ErrorCode::InvalidId => "ID must be an integer",
                ErrorCode::NoPipelineBuild => "this pipeline build does not exist",
                ErrorCode::InvalidInput => "invalid request body",
                ErrorCode::Database => "internal database error",
                ErrorCode::InvalidConfiguration => "test report step is misconfigured",
                ErrorCode::InvalidPattern => "cannot find requested files, invalid pattern",
                ErrorCode::FileUnreadable => "cannot read test report file",
                ErrorCode::InvalidReport => "cannot interpret test report",
                ErrorCode::ReportingFailed => "failed to send tests details",
            },
            Language::French => match code {
                ErrorCode::UnknownError => "erreur interne",
                ErrorCode::InvalidId => "l'ID doit être un nombre entier",
                ErrorCode::NoPipelineBuild => "ce build n'existe pas",
                ErrorCode::InvalidInput => "corps de requête invalide",
                ErrorCode::Database => "erreur interne de base de données",
                ErrorCode::InvalidConfiguration => "l'étape de rapport de tests est mal configurée",
                ErrorCode::InvalidPattern => "fichiers introuvables, motif invalide",
                ErrorCode::FileUnreadable => "impossible de lire le rapport de tests",
                ErrorCode::InvalidReport => "impossible d'interpréter le rapport de tests",
                ErrorCode::ReportingFailed => "échec de l'envoi du détail des tests",
            },
        };
        Some(msg)
    }
}

/// Render an error as a localized message, appending its cause when present.
pub fn render(catalog: &dyn MessageCatalog, error: &AppError, language: Language) -> String {
    let code = error.code();
    let msg = catalog
        .message(code, language)
        .or_else(|| catalog.message(code, Language::AmericanEnglish))
        .or_else(|| catalog.message(ErrorCode::UnknownError, Language::AmericanEnglish))
        .unwrap_or("internal server error");

    match error.cause() {
        Some(cause) => format!("{} (caused by: {})", msg, cause),
        None => msg.to_string(),
    }
}
