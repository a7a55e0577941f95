use std::path::{Path, PathBuf};

use pdf::ExtractedDocument;
use serde::Serialize;

use crate::prelude::{eprintln, println, *};

#[derive(Debug, clap::Parser)]
#[command(name = "extract")]
#[command(about = "Dump the positioned text spans and images of a PDF as JSON")]
pub struct App {
    /// Path to the PDF
    path: PathBuf,

    /// Also write every decodable image into this directory
    #[clap(long)]
    images_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ExtractOutput {
    #[serde(flatten)]
    document: ExtractedDocument,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    image_files: Vec<PathBuf>,
}

/// Write each image as `page<N>_image<M>.<ext>` and return the paths.
/// Images that cannot be exported are logged and left out.
fn write_images(document: &ExtractedDocument, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).wrap_err_with(|| f!("Cannot create {}", dir.display()))?;

    let mut written = Vec::new();
    let mut per_page = 0;
    let mut current_page = None;

    for image in &document.images {
        if current_page != Some(image.page_index) {
            current_page = Some(image.page_index);
            per_page = 0;
        }
        per_page += 1;

        let (ext, bytes) = match pdf::export_image(image) {
            Ok(exported) => exported,
            Err(err) => {
                log::warn!("Skipping image {per_page} on page {}: {err}", image.page_index + 1);
                continue;
            }
        };

        let path = dir.join(f!("page{}_image{}.{}", image.page_index + 1, per_page, ext));
        std::fs::write(&path, bytes).wrap_err_with(|| f!("Cannot write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        eprintln!("Extracting {}", app.path.display());
    }

    let document = {
        let path = app.path.clone();
        tokio::task::spawn_blocking(move || pdf::extract_file(&path).map_err(Error::from)).await??
    };

    let image_files = match &app.images_dir {
        Some(dir) => write_images(&document, dir)?,
        None => Vec::new(),
    };

    let output = ExtractOutput {
        document,
        image_files,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
