use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use axum::{extract::multipart::Field, Extension};
use chrono::Local;
use futures::TryStreamExt;
use tokio::{
    fs::{self, File},
    io::{self, AsyncSeekExt, AsyncWriteExt},
};
use tokio_util::io::StreamReader;

use crate::{
    errors::{AppError, AppResult},
    extractors,
    models::{parse_field_name, EntryField, SpooledImage, UploadEntry},
    response::SuccessEnvelope,
    utilities::{read_chunk, spool_file, stored_file_name, timestamp, CHUNK_SIZE},
    validation::{base_name, check_extension, check_title, extension_of, ExtensionCase},
    AppContext,
};

/// Everything pulled out of one multipart body, keyed by entry index.
#[derive(Debug, Default)]
struct UploadForm {
    titles: BTreeMap<u32, String>,
    images: BTreeMap<u32, SpooledImage>,
    file_parts: usize,
}

async fn spool_field(spool_dir: PathBuf, field: Field<'_>) -> AppResult<File> {
    let mut file = spool_file(spool_dir).await.map_err(AppError::Spool)?;

    let body = field.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let mut body_reader = StreamReader::new(body);

    loop {
        let chunk = read_chunk(&mut body_reader, CHUNK_SIZE)
            .await
            .map_err(|why| {
                tracing::debug!("failed to read image part: {why}");
                AppError::MalformedForm
            })?;

        file.write_all(&chunk).await.map_err(AppError::Spool)?;
        if chunk.len() < CHUNK_SIZE {
            break;
        }
    }

    file.flush().await.map_err(AppError::Spool)?;
    file.rewind().await.map_err(AppError::Spool)?;
    Ok(file)
}

async fn read_form(
    spool_dir: &Path,
    multipart: &mut axum::extract::Multipart,
) -> AppResult<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        // parts with an empty filename are plain values, same as browsers send for empty inputs
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(|name| base_name(name).to_string());
        let entry_field = field.name().and_then(parse_field_name);

        if file_name.is_some() {
            form.file_parts += 1;
        }

        match (entry_field, file_name) {
            (Some((index, EntryField::Image)), Some(file_name)) => {
                if form.images.contains_key(&index) {
                    continue;
                }
                let file = spool_field(spool_dir.to_path_buf(), field).await?;
                form.images.insert(index, SpooledImage { file_name, file });
            }
            (Some((index, EntryField::Title)), None) => {
                let title = field.text().await?;
                form.titles.entry(index).or_insert(title);
            }
            _ => continue,
        }
    }

    Ok(form)
}

/// Checks every image in index order and pairs it with its title. Nothing is
/// written unless the whole batch passes.
fn validate_entries(form: UploadForm, case: ExtensionCase) -> AppResult<Vec<UploadEntry>> {
    let UploadForm {
        mut titles, images, ..
    } = form;

    images
        .into_iter()
        .map(|(index, image)| -> AppResult<UploadEntry> {
            check_extension(extension_of(&image.file_name), index, case)?;

            let title = titles.remove(&index).ok_or(AppError::MissingTitle {
                row: u64::from(index) + 1,
            })?;
            check_title(&title, index)?;

            Ok(UploadEntry {
                index,
                title,
                image,
            })
        })
        .collect()
}

async fn store_entry(path: &Path, mut source: File) -> AppResult<u64> {
    let mut destination = File::create(path).await.map_err(AppError::Save)?;
    let bytes = io::copy(&mut source, &mut destination)
        .await
        .map_err(AppError::Copy)?;
    destination.flush().await.map_err(AppError::Copy)?;
    Ok(bytes)
}

/// Removes files written earlier in a batch that failed halfway.
async fn discard(storage_dir: &Path, names: &[String]) {
    for name in names {
        if let Err(why) = fs::remove_file(storage_dir.join(name)).await {
            tracing::error!("failed to remove partially uploaded file `{name}`: {why:?}");
        }
    }
}

async fn store_entries(
    storage_dir: &Path,
    entries: Vec<UploadEntry>,
    stamp: &str,
) -> AppResult<Vec<String>> {
    let mut stored = Vec::with_capacity(entries.len());

    for entry in entries {
        let name = stored_file_name(&entry.title, stamp, &entry.image.file_name);

        match store_entry(&storage_dir.join(&name), entry.image.file).await {
            Ok(bytes) => {
                tracing::info!(index = entry.index, bytes, "stored `{name}`");
                stored.push(name);
            }
            Err(err) => {
                if matches!(err, AppError::Copy(_)) {
                    stored.push(name);
                }
                discard(storage_dir, &stored).await;
                return Err(err);
            }
        }
    }

    Ok(stored)
}

#[tracing::instrument(skip_all)]
pub async fn upload_endpoint(
    ctx: Extension<AppContext>,
    extractors::Multipart(mut multipart): extractors::Multipart,
) -> AppResult<SuccessEnvelope> {
    let general = &ctx.cfg.general;

    let form = read_form(&general.spool_dir(), &mut multipart).await?;
    if form.file_parts == 0 {
        return Err(AppError::EmptyUpload);
    }

    fs::create_dir_all(&general.storage_dir)
        .await
        .map_err(AppError::Save)?;

    let entries = validate_entries(form, ctx.cfg.policy.extension_case)?;

    let stamp = timestamp(Local::now());
    let stored = store_entries(&general.storage_dir, entries, &stamp).await?;

    Ok(SuccessEnvelope::new(
        stored.iter().map(|name| general.public_path(name)).collect(),
    ))
}
