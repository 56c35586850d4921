use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::error_code::catalog::{installed_catalog, MessageCatalog};
use crate::error_code::ErrorCode;
use crate::stage_error::Param;

/// Why a template could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template expects more than {provided} argument(s)")]
    MissingArgument { provided: usize },
    #[error("unmatched '{brace}' at byte {position}")]
    UnmatchedBrace { brace: char, position: usize },
}

/// Substitute `params` into a `{}` template.
///
/// Placeholders are filled left to right. Surplus params are ignored, so a
/// trailing cause never has to be referenced. `{{` and `}}` render literal
/// braces.
pub fn format_template(template: &str, params: &[Param]) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len() + params.len() * 8);
    let mut next = 0;
    let mut chars = template.char_indices().peekable();

    while let Some((position, c)) = chars.next() {
        match c {
            '{' => match chars.peek() {
                Some((_, '{')) => {
                    chars.next();
                    out.push('{');
                }
                Some((_, '}')) => {
                    chars.next();
                    let param = params
                        .get(next)
                        .ok_or(TemplateError::MissingArgument { provided: params.len() })?;
                    out.push_str(&param.to_string());
                    next += 1;
                }
                _ => return Err(TemplateError::UnmatchedBrace { brace: '{', position }),
            },
            '}' => match chars.peek() {
                Some((_, '}')) => {
                    chars.next();
                    out.push('}');
                }
                _ => return Err(TemplateError::UnmatchedBrace { brace: '}', position }),
            },
            other => out.push(other),
        }
    }

    Ok(out)
}

/// Render `code - template`, degrading to a raw form when formatting fails.
fn render(code: &dyn ErrorCode, template: &str, params: &[Param]) -> String {
    match format_template(template, params) {
        Ok(text) => format!("{} - {}", code.code(), text),
        Err(e) => {
            log::debug!("Falling back to raw message for {}: {}", code.code(), e);
            let joined = params
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} - {} (params: {})", code.code(), template, joined)
        }
    }
}

/// The message of an error code instantiated with parameters.
///
/// Both renderings are computed on first access and cached. The localized
/// form reads the process-wide catalog, which can only be installed once, so
/// each rendering is a pure function of `(code, params)` for the life of the
/// value.
#[derive(Clone)]
pub struct ErrorMessage {
    code: Arc<dyn ErrorCode>,
    params: Arc<[Param]>,
    non_localized: OnceLock<String>,
    localized: OnceLock<String>,
}

impl ErrorMessage {
    pub fn new(code: Arc<dyn ErrorCode>, params: Vec<Param>) -> Self {
        Self {
            code,
            params: params.into(),
            non_localized: OnceLock::new(),
            localized: OnceLock::new(),
        }
    }

    pub fn error_code(&self) -> &dyn ErrorCode {
        self.code.as_ref()
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Message rendered with the code's default template.
    pub fn non_localized(&self) -> &str {
        self.non_localized
            .get_or_init(|| render(self.code.as_ref(), self.code.message(), &self.params))
    }

    /// Message rendered with the installed catalog, if any.
    pub fn localized(&self) -> &str {
        self.localized.get_or_init(|| match installed_catalog() {
            Some(catalog) => self.localized_with(catalog),
            None => self.non_localized().to_string(),
        })
    }

    /// Render against an explicit catalog. Not cached.
    pub fn localized_with(&self, catalog: &MessageCatalog) -> String {
        let template = catalog
            .template(self.code.code())
            .unwrap_or_else(|| self.code.message());
        render(self.code.as_ref(), template, &self.params)
    }
}

impl fmt::Debug for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorMessage")
            .field("code", &self.code.code())
            .field("params", &self.params)
            .finish()
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.non_localized())
    }
}
