use std::path::Path;

use anyhow::{Context, Result, bail};
use oblivion_core::ArtifactClient;

use crate::ObjectsCmd;

pub async fn run_objects(cmd: ObjectsCmd, client: &ArtifactClient) -> Result<()> {
    match cmd {
        ObjectsCmd::Upload { path, name } => {
            let cid = client
                .upload_file(&path, name.as_deref())
                .await
                .with_context(|| format!("failed to upload {}", path.display()))?;
            println!("uploaded: cid={cid} backend={}", client.backend());
            println!("{}", client.gateway_url(cid.as_str())?);
        }
        ObjectsCmd::UploadJson { path, name } => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let doc: serde_json::Value = serde_json::from_str(&text)
                .with_context(|| format!("{} is not valid JSON", path.display()))?;
            let name = match name {
                Some(name) => name,
                None => file_name(&path)?,
            };
            let cid = client
                .upload_json(&doc, &name)
                .await
                .context("failed to upload json")?;
            println!("uploaded: cid={cid} backend={}", client.backend());
            println!("{}", client.gateway_url(cid.as_str())?);
        }
        ObjectsCmd::Download { cid, out } => {
            let size = client
                .download_to_file(&cid, &out)
                .await
                .with_context(|| format!("failed to download {cid}"))?;
            println!("downloaded {size} bytes to {}", out.display());
        }
        ObjectsCmd::CatJson { cid } => {
            let doc: serde_json::Value = client
                .download_json(&cid)
                .await
                .with_context(|| format!("failed to download {cid}"))?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        ObjectsCmd::Pin { cid, name } => {
            client
                .pin(&cid, name.as_deref())
                .await
                .with_context(|| format!("failed to pin {cid}"))?;
            println!("pinned {cid} on {}", client.backend());
        }
        ObjectsCmd::Gateway { cid } => {
            println!("{}", client.gateway_url(&cid)?);
        }
    }
    Ok(())
}

fn file_name(path: &Path) -> Result<String> {
    match path.file_name() {
        Some(name) => Ok(name.to_string_lossy().into_owned()),
        None => bail!("{} has no file name; pass --name", path.display()),
    }
}
