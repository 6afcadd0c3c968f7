use axum::extract::Multipart;
use spots::{ImageUpload, SpotDraft, SpotForm};
use tracing::debug;

use crate::error::AppError;

/// Reads the admin form. Unknown fields are ignored, the image is required.
pub async fn read_spot_form(mut multipart: Multipart) -> Result<(SpotDraft, ImageUpload), AppError> {
    let mut form = SpotForm::default();
    let mut image = None;

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await?;

            if !file_name.is_empty() && !bytes.is_empty() {
                image = Some(ImageUpload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }

            continue;
        }

        let value = field.text().await?;

        if !form.set(&name, value) {
            debug!("Ignoring form field {name}");
        }
    }

    let draft = SpotDraft::try_from(form)?;
    let image = image.ok_or_else(|| AppError::MalformedPayload("Missing required field: image".into()))?;

    Ok((draft, image))
}
