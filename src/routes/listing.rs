use std::path::Path;

use axum::Extension;
use tokio::{fs, io};

use crate::{
    config::ListingPolicy,
    errors::{AppError, AppResult},
    response::SuccessEnvelope,
    validation::{extension_of, is_allowed, ExtensionCase},
    AppContext,
};

/// Names of the non-directory entries in `dir`, sorted.
async fn stored_file_names(dir: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();

    let mut dir = fs::read_dir(dir).await?;
    while let Some(entry) = dir.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => tracing::warn!("skipping non utf-8 file name {name:?}"),
        }
    }

    names.sort();
    Ok(names)
}

pub fn filter_listing(
    names: Vec<String>,
    policy: ListingPolicy,
    case: ExtensionCase,
) -> Vec<String> {
    let mut listed = Vec::with_capacity(names.len());

    for name in names {
        if is_allowed(extension_of(&name), case) {
            listed.push(name);
            continue;
        }

        match policy {
            ListingPolicy::Stop => {
                tracing::debug!("listing stopped at `{name}`");
                break;
            }
            ListingPolicy::Skip => continue,
        }
    }

    listed
}

#[tracing::instrument(skip_all)]
pub async fn list_endpoint(ctx: Extension<AppContext>) -> AppResult<SuccessEnvelope> {
    let general = &ctx.cfg.general;

    let names = stored_file_names(&general.storage_dir)
        .await
        .map_err(AppError::UnreadableDirectory)?;

    let listed = filter_listing(
        names,
        ctx.cfg.policy.listing_on_disallowed,
        ctx.cfg.policy.extension_case,
    );

    Ok(SuccessEnvelope::new(
        listed.iter().map(|name| general.public_path(name)).collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn stop_policy_truncates() {
        let listed = filter_listing(
            names(&["a.png", "b.txt", "c.gif"]),
            ListingPolicy::Stop,
            ExtensionCase::Sensitive,
        );
        assert_eq!(listed, ["a.png"]);
    }

    #[test]
    fn skip_policy_continues() {
        let listed = filter_listing(
            names(&["a.png", "b.txt", "c.gif", "D.JPG"]),
            ListingPolicy::Skip,
            ExtensionCase::Sensitive,
        );
        assert_eq!(listed, ["a.png", "c.gif"]);

        let listed = filter_listing(
            names(&["a.png", "b.txt", "c.gif", "D.JPG"]),
            ListingPolicy::Skip,
            ExtensionCase::Insensitive,
        );
        assert_eq!(listed, ["a.png", "c.gif", "D.JPG"]);
    }

    #[tokio::test]
    async fn scan_skips_directories_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.jpg", "c.jpeg"] {
            fs::write(dir.path().join(name), b"x").await.unwrap();
        }
        fs::create_dir(dir.path().join("nested.txt")).await.unwrap();

        let scanned = stored_file_names(dir.path()).await.unwrap();
        assert_eq!(scanned, ["a.jpg", "b.png", "c.jpeg"]);
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(stored_file_names(&dir.path().join("nope")).await.is_err());
    }
}
