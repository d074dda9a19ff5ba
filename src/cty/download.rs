// cty.xml download module
//
// Fetches the gzip-compressed cty.xml from the Club Log API and stores the
// decompressed document where the loader can find it. Access requires a
// Club Log API key.

use crate::cty::CtyError;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Club Log cty.xml endpoint; responds with cty.xml.gz.
const CLUBLOG_CTY_URL: &str = "https://cdn.clublog.org/cty.php";

/// Download and decompress cty.xml into `dest_dir`.
///
/// Returns the path of the written cty.xml.
pub async fn download_cty_xml(api_key: &str, dest_dir: &Path) -> Result<PathBuf, CtyError> {
    log::info!("downloading cty.xml from {}", CLUBLOG_CTY_URL);

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|source| CtyError::Io {
            path: dest_dir.to_path_buf(),
            source,
        })?;

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()?;

    let response = client
        .get(CLUBLOG_CTY_URL)
        .query(&[("api", api_key)])
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(CtyError::Download(format!(
            "Club Log responded with status {}",
            response.status()
        )));
    }

    let bytes = response.bytes().await?;
    log::info!("downloaded {} bytes, decompressing", bytes.len());

    // GzDecoder is synchronous, so the decompression runs off the runtime.
    let xml = tokio::task::spawn_blocking(move || gunzip(&bytes))
        .await
        .map_err(|e| CtyError::Download(format!("decompression task failed: {e}")))?
        .map_err(CtyError::Gzip)?;

    let dest = dest_dir.join("cty.xml");
    tokio::fs::write(&dest, &xml)
        .await
        .map_err(|source| CtyError::Io {
            path: dest.clone(),
            source,
        })?;

    log::info!("wrote {} ({} bytes)", dest.display(), xml.len());
    Ok(dest)
}

fn gunzip(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(bytes);
    let mut xml = Vec::new();
    decoder.read_to_end(&mut xml)?;
    Ok(xml)
}
