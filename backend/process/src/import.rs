//! # Bulk Import
//!
//! Loads a spot sheet exported as CSV and runs every row through the same
//! submission flow as the admin form.
//!
//! ## Sheet
//! - First line is a header and is skipped
//! - Blank lines are skipped
//! - Columns: name, area, station, walkMinutes, address, placeType, lines, description, imageFileName, safetyNote (optional)
//! - Commas inside double quotes stay in the column
//!
//! ## Images
//! - Looked up by `imageFileName` inside the images directory
//! - A missing image fails the row before anything is uploaded
//!
//! Rows are independent. A failed row is counted and reported, never retried, and
//! does not stop the rows after it.
use std::{fs, path::Path};

use anyhow::{Context, Error};
use chrono::Utc;
use indicatif::ProgressBar;
use spots::{ImageUpload, ObjectStore, RecordStore, SpotDraft, submit};
use tracing::{info, warn};

use crate::{
    models::CsvSpot,
    utils::{content_type, parse_csv_line, progress_bar},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub succeeded: usize,
    pub failed: usize,
}

pub async fn import_csv(
    records: &dyn RecordStore,
    objects: &dyn ObjectStore,
    csv_path: &Path,
    images_dir: &Path,
) -> Result<ImportSummary, Error> {
    let contents = fs::read_to_string(csv_path)
        .with_context(|| format!("{} not found", csv_path.display()))?;

    let rows: Vec<&str> = contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .collect();

    info!("Processing {} spots from {}", rows.len(), csv_path.display());

    let pb = progress_bar(rows.len())?;

    let mut summary = ImportSummary::default();

    for row in rows {
        match import_row(records, objects, row, images_dir, &pb).await {
            Ok(name) => {
                pb.println(format!("✅ {name}"));
                summary.succeeded += 1;
            }
            Err(e) => {
                warn!("Row failed: {e:#}");
                pb.println(format!("❌ {e:#}"));
                summary.failed += 1;
            }
        }

        pb.inc(1);
    }

    pb.finish_with_message("Done");

    Ok(summary)
}

async fn import_row(
    records: &dyn RecordStore,
    objects: &dyn ObjectStore,
    row: &str,
    images_dir: &Path,
    pb: &ProgressBar,
) -> Result<String, Error> {
    let spot = CsvSpot::from_columns(parse_csv_line(row))
        .with_context(|| format!("Too few columns in row: {row}"))?;

    pb.set_message(spot.name.clone());

    let image_path = images_dir.join(&spot.image_file_name);
    let bytes = fs::read(&image_path)
        .with_context(|| format!("Image not found: {}", image_path.display()))?;

    let image = ImageUpload {
        file_name: spot.image_file_name.clone(),
        content_type: content_type(&image_path),
        bytes,
    };

    let name = spot.name.clone();
    let draft = SpotDraft::try_from(spot.into_form()).with_context(|| name.clone())?;

    submit(records, objects, draft, image, Utc::now().timestamp_millis())
        .await
        .with_context(|| name.clone())?;

    Ok(name)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use spots::{NewSpot, RemoteError, SeedSpot, Spot};

    use super::*;

    #[derive(Default)]
    pub struct FakeSupabase {
        pub uploads: Mutex<Vec<String>>,
        pub inserts: Mutex<Vec<NewSpot>>,
        pub rows: Mutex<Vec<SeedSpot>>,
        /// Ids the table already holds.
        pub taken: Vec<&'static str>,
    }

    #[async_trait]
    impl RecordStore for FakeSupabase {
        async fn list_approved(&self) -> Result<Vec<Spot>, RemoteError> {
            Ok(Vec::new())
        }

        async fn get_by_id(&self, _id: &str) -> Result<Option<Spot>, RemoteError> {
            Ok(None)
        }

        async fn insert(&self, spot: &NewSpot) -> Result<(), RemoteError> {
            self.inserts.lock().unwrap().push(spot.clone());
            Ok(())
        }

        async fn insert_row(&self, spot: &SeedSpot) -> Result<(), RemoteError> {
            if self.taken.contains(&spot.id.as_str()) {
                return Err(RemoteError::Status {
                    status: 409,
                    message: "duplicate key value violates unique constraint \"spots_pkey\"".to_string(),
                });
            }

            self.rows.lock().unwrap().push(spot.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl ObjectStore for FakeSupabase {
        async fn upload(
            &self,
            name: &str,
            _bytes: Vec<u8>,
            content_type: Option<&str>,
        ) -> Result<(), RemoteError> {
            assert_eq!(content_type, Some("image/jpeg"));
            self.uploads.lock().unwrap().push(name.to_string());
            Ok(())
        }

        fn public_url(&self, name: &str) -> String {
            format!("https://demo.supabase.co/storage/v1/object/public/spots/{name}")
        }
    }

    const SHEET: &str = "name,area,station,walkMinutes,address,placeType,lines,description,imageFileName,safetyNote
田端大橋 跨線橋,東京23区,田端駅,3,東京都北区田端,跨線橋,\"山手線, 京浜東北線\",複数路線を見下ろせる,tabata.jpg,柵あり

聖橋,東京23区,御茶ノ水駅,3,東京都千代田区,橋,中央線（快速）,カーブを正面から,missing.jpg,
短い行,東京23区
西大井,東京23区,西大井駅,1,東京都品川区,公園端,東海道線,ベンチあり,tabata.jpg,
品川,東京23区,品川駅,5,東京都港区高輪,跨線橋,\"東海道線,東海道新幹線\",新幹線も見られる,Shinagawa Photo.jpg
";

    #[tokio::test]
    async fn test_import_csv() {
        let dir = tempfile::tempdir().unwrap();
        let images = dir.path().join("temp-images");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("tabata.jpg"), b"\xff\xd8").unwrap();
        fs::write(images.join("Shinagawa Photo.jpg"), b"\xff\xd8").unwrap();

        let csv = dir.path().join("spots.csv");
        fs::write(&csv, SHEET).unwrap();

        let fake = FakeSupabase::default();
        let summary = import_csv(&fake, &fake, &csv, &images).await.unwrap();

        // missing image, short row and unknown place type fail
        assert_eq!(
            summary,
            ImportSummary {
                succeeded: 2,
                failed: 3
            }
        );

        let inserts = fake.inserts.lock().unwrap();
        assert_eq!(inserts[0].name, "田端大橋 跨線橋");
        assert_eq!(inserts[0].lines, vec!["山手線", "京浜東北線"]);
        assert_eq!(inserts[0].safety_note.as_deref(), Some("柵あり"));
        assert_eq!(inserts[1].lines, vec!["東海道線", "東海道新幹線"]);
        assert_eq!(inserts[1].safety_note, None);

        let uploads = fake.uploads.lock().unwrap();
        assert!(uploads[1].ends_with("-shinagawa_photo.jpg"));
    }

    #[tokio::test]
    async fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let fake = FakeSupabase::default();

        let result = import_csv(&fake, &fake, &dir.path().join("spots.csv"), dir.path()).await;

        assert!(result.is_err());
    }
}
