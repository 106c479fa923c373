use std::path::PathBuf;

use chrono::{DateTime, Local};
use nanoid::nanoid;
use tokio::{
    fs::File,
    io::{self, AsyncRead, AsyncReadExt},
    task,
};

const NANOID_ALPHABET: &[char] = &[
    '1', '2', '3', '4', '5', '6', '7', '8', '9', '0', 'a', 'A', 'b', 'B', 'c', 'C', 'd', 'D', 'e',
    'E', 'f', 'F', 'g', 'G', 'h', 'H', 'i', 'I', 'j', 'J', 'k', 'K', 'l', 'L', 'm', 'M', 'n', 'N',
    'o', 'O', 'p', 'P', 'q', 'Q', 'r', 'R', 's', 'S', 't', 'T', 'u', 'U', 'v', 'V', 'w', 'W', 'x',
    'X', 'y', 'Y', 'z', 'Z',
];
pub const CHUNK_SIZE: usize = 8192;
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

pub async fn read_chunk<R>(reader: &mut R, size: usize) -> io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut chunk = Vec::with_capacity(size);
    let mut take = reader.take(size as u64);
    take.read_to_end(&mut chunk).await?;

    Ok(chunk)
}

/// Anonymous temp file, unlinked by the OS once the handle is dropped.
pub async fn spool_file(dir: PathBuf) -> io::Result<File> {
    let file = task::spawn_blocking(move || tempfile::tempfile_in(dir))
        .await
        .map_err(io::Error::other)??;
    Ok(File::from_std(file))
}

pub fn timestamp(now: DateTime<Local>) -> String {
    now.format(TIMESTAMP_FORMAT).to_string()
}

/// `<title>_<timestamp><original filename>`
pub fn stored_file_name(title: &str, timestamp: &str, original: &str) -> String {
    format!("{title}_{timestamp}{original}")
}

pub fn friendly_id(len: usize) -> String {
    nanoid!(len, &NANOID_ALPHABET)
}
