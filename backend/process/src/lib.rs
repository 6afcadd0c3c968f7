//! # Kotetsu
//!
//! Terminal client for the spot book.
//!
//! ## Visitor state
//! - Liked / visited / stamped ids live in a local JSON file (`--state`, default `kotetsu-state.json`)
//! - Keys `likedSpots`, `visitedSpots`, `stampedSpots`, each a JSON array of ids
//! - Toggling writes the file straight away, a failed write only warns
//! - Only visited spots can be stamped
//!
//! ## Browsing
//! ```sh
//! kotetsu list --area 東京 --condition near-station --condition multi-line
//! kotetsu list --line 東武線
//! kotetsu show <id>
//! kotetsu filters
//! ```
//!
//! ## Stamp book
//! ```sh
//! kotetsu visit <id>
//! kotetsu stamp <id>
//! kotetsu stamps
//! ```
//!
//! ## Import
//! Both need the service role key.
//! ```sh
//! kotetsu import spots.csv --images temp-images
//! kotetsu seed spots.json
//! ```
//! `import` takes the sheet the editors fill in and runs each row through the
//! admin create flow. `seed` takes full spot rows (ids, display order and
//! timestamps included) and inserts them unchanged.
use std::path::PathBuf;

use anyhow::{Error, bail};
use clap::{Parser, Subcommand};
use spots::{
    Collection, Collections, Condition, FileStore, Filters, KeyValueStore, Spot, Supabase,
    approved_spot, approved_spots, compute_visible,
    remote::{DEFAULT_BUCKET, DEFAULT_TABLE},
};
use tracing_subscriber::{EnvFilter, fmt};

use import::ImportSummary;

pub mod import;
pub mod models;
pub mod render;
pub mod seed;
pub mod utils;

#[derive(Parser, Debug)]
#[command(name = "kotetsu", author, version, about)]
pub struct Cli {
    #[arg(long, env = "SUPABASE_URL", default_value = "http://localhost:54321", global = true)]
    pub supabase_url: String,

    #[arg(long, env = "SUPABASE_ANON_KEY", default_value = "", hide_env_values = true, global = true)]
    pub anon_key: String,

    #[arg(long, env = "SPOTS_TABLE", default_value = DEFAULT_TABLE, global = true)]
    pub table: String,

    #[arg(long, env = "KOTETSU_STATE", default_value = "kotetsu-state.json", global = true)]
    pub state: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List approved spots
    List {
        #[arg(long)]
        area: Option<String>,

        #[arg(long)]
        line: Option<String>,

        /// near-station, has-park, multi-line, express-or-bullet (or their labels)
        #[arg(long = "condition")]
        conditions: Vec<Condition>,

        /// Only spots marked いいね
        #[arg(long)]
        liked: bool,
    },

    /// Show one spot
    Show { id: String },

    /// Toggle いいね
    Like { id: String },

    /// Toggle 行った
    Visit { id: String },

    /// Toggle the stamp on a visited spot
    Stamp { id: String },

    /// Show the stamp book
    Stamps,

    /// Show the areas, lines and conditions to filter by
    Filters,

    /// Bulk import spots from a CSV sheet
    Import {
        csv: PathBuf,

        #[arg(long, default_value = "temp-images")]
        images: PathBuf,

        #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
        service_role_key: String,

        #[arg(long, env = "SPOTS_BUCKET", default_value = DEFAULT_BUCKET)]
        bucket: String,
    },

    /// Insert full spot rows from a JSON file, ids and display order included
    Seed {
        json: PathBuf,

        #[arg(long, env = "SUPABASE_SERVICE_ROLE_KEY", hide_env_values = true)]
        service_role_key: String,
    },
}

pub async fn run(cli: Cli) -> Result<(), Error> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let records = Supabase::new(&cli.supabase_url, &cli.anon_key).with_table(&cli.table);
    let mut collections = Collections::restore(FileStore::open(&cli.state));

    match cli.command {
        Command::List {
            area,
            line,
            conditions,
            liked,
        } => {
            let filters = conditions.into_iter().fold(
                Filters::new()
                    .with_area(area.unwrap_or_default())
                    .with_line(line.unwrap_or_default()),
                Filters::with_condition,
            );

            let spots = approved_spots(&records).await;
            print!("{}", list(&spots, &filters, &collections, liked));
        }
        Command::Show { id } => match approved_spot(&records, &id).await {
            Some(spot) => print!("{}", render::detail(&spot, &collections)),
            None => println!("スポットが見つかりませんでした: {id}"),
        },
        Command::Like { id } => println!("{}", toggle(&mut collections, Collection::Liked, &id)?),
        Command::Visit { id } => println!("{}", toggle(&mut collections, Collection::Visited, &id)?),
        Command::Stamp { id } => println!("{}", toggle(&mut collections, Collection::Stamped, &id)?),
        Command::Stamps => {
            let spots = approved_spots(&records).await;
            print!("{}", render::stamp_book(&collections.stamp_book(&spots)));
        }
        Command::Filters => print!("{}", render::filter_catalog()),
        Command::Import {
            csv,
            images,
            service_role_key,
            bucket,
        } => {
            let admin = Supabase::new(&cli.supabase_url, &service_role_key)
                .with_table(&cli.table)
                .with_bucket(&bucket);

            let summary = import::import_csv(&admin, &admin, &csv, &images).await?;
            print_summary(summary);
        }
        Command::Seed {
            json,
            service_role_key,
        } => {
            let admin = Supabase::new(&cli.supabase_url, &service_role_key).with_table(&cli.table);

            let summary = seed::seed_json(&admin, &json).await?;
            print_summary(summary);
        }
    }

    Ok(())
}

fn print_summary(summary: ImportSummary) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("インポート完了");
    println!("✅ 成功: {}件", summary.succeeded);
    println!("❌ 失敗: {}件", summary.failed);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

pub fn list<S: KeyValueStore>(
    spots: &[Spot],
    filters: &Filters,
    collections: &Collections<S>,
    liked_only: bool,
) -> String {
    let visible: Vec<&Spot> = compute_visible(spots, filters)
        .into_iter()
        .filter(|spot| !liked_only || collections.contains(Collection::Liked, &spot.id))
        .collect();

    if visible.is_empty() {
        return format!("{}\n", render::NO_RESULTS);
    }

    visible
        .into_iter()
        .map(|spot| render::card(spot, collections))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Toggles `id` in `collection`, refusing to stamp a spot that was never visited.
pub fn toggle<S: KeyValueStore>(
    collections: &mut Collections<S>,
    collection: Collection,
    id: &str,
) -> Result<String, Error> {
    if collection == Collection::Stamped
        && !collections.contains(Collection::Visited, id)
        && !collections.contains(Collection::Stamped, id)
    {
        bail!("{id} はまだ「行った」になっていません");
    }

    let added = !collections.contains(collection, id);
    collections.toggle(collection, id);

    let message = match (collection, added) {
        (Collection::Liked, true) => "いいねしました",
        (Collection::Liked, false) => "いいねを取り消しました",
        (Collection::Visited, true) => "行ったに追加しました",
        (Collection::Visited, false) => "行ったから外しました",
        (Collection::Stamped, true) => "スタンプを押しました",
        (Collection::Stamped, false) => "スタンプを消しました",
    };

    Ok(format!("{message}: {id}"))
}
