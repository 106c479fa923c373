use serde::Deserialize;

use crate::errors::{AppError, AppResult};

pub const ALLOWED_EXTENSIONS: [&str; 4] = [".png", ".jpg", ".jpeg", ".gif"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionCase {
    /// `.PNG` is rejected.
    #[default]
    Sensitive,
    Insensitive,
}

/// Extension of the final path component, dot included; `""` if there is none.
pub fn extension_of(name: &str) -> &str {
    let base = base_name(name);
    match base.rfind('.') {
        Some(pos) => &base[pos..],
        None => "",
    }
}

/// Strips any directory part a client may have put in a filename.
pub fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

pub fn is_allowed(ext: &str, case: ExtensionCase) -> bool {
    match case {
        ExtensionCase::Sensitive => ALLOWED_EXTENSIONS.contains(&ext),
        ExtensionCase::Insensitive => ALLOWED_EXTENSIONS
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext)),
    }
}

/// `index` is the 0-based entry index; errors name the 1-based row.
pub fn check_extension(ext: &str, index: u32, case: ExtensionCase) -> AppResult<()> {
    if is_allowed(ext, case) {
        Ok(())
    } else {
        Err(AppError::DisallowedExtension {
            row: u64::from(index) + 1,
        })
    }
}

pub fn check_title(title: &str, index: u32) -> AppResult<()> {
    if title.contains(['/', '\\']) || title == "." || title == ".." {
        return Err(AppError::InvalidTitle {
            row: u64::from(index) + 1,
        });
    }
    Ok(())
}
