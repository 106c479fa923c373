
use std::path::Path;

use axum_test::TestServer;

use crate::{config::Config, router};

pub const PNG_BYTES: &[u8] = include_bytes!("./fixtures/pixel.png");

pub type TestResult = anyhow::Result<()>;

pub fn test_config(storage_dir: &Path) -> Config {
    let mut cfg = Config::default();
    cfg.general.storage_dir = storage_dir.to_path_buf();
    cfg
}

pub fn test_server(cfg: Config) -> anyhow::Result<TestServer> {
    TestServer::new(router(cfg))
}

pub fn stored_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|dir| dir.count()).unwrap_or(0)
}
