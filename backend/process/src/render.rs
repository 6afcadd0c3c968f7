use std::fmt::Write;

use spots::{
    Collection, Collections, Condition, KeyValueStore, Spot,
    collections::StampBook,
    filter::{AREAS, LINE_COMPANIES, POPULAR_LINES, tags},
};

pub const CARD_LINES: usize = 3;

pub const NO_RESULTS: &str = "条件に合うスポットが見つかりませんでした\n条件を変更してみてください";

pub const EMPTY_STAMP_BOOK: &str = "まだ行った場所がないよ！\nスポット一覧で「行った」を押してね";

pub fn card_lines(lines: &[String]) -> String {
    let mut shown = lines
        .iter()
        .take(CARD_LINES)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if lines.len() > CARD_LINES {
        let _ = write!(shown, " 他{}路線", lines.len() - CARD_LINES);
    }

    shown
}

fn marks<S: KeyValueStore>(spot: &Spot, collections: &Collections<S>) -> (&'static str, &'static str) {
    let liked = if collections.contains(Collection::Liked, &spot.id) { "♥" } else { "♡" };
    let visited = if collections.contains(Collection::Visited, &spot.id) { "✓" } else { " " };

    (liked, visited)
}

pub fn card<S: KeyValueStore>(spot: &Spot, collections: &Collections<S>) -> String {
    let (liked, visited) = marks(spot, collections);

    let mut card = format!("{liked} {visited} {} ({})\n", spot.name, spot.id);
    let _ = writeln!(card, "    {} / {} 徒歩{}分 / {}", spot.area, spot.station, spot.walk_minutes, spot.place_type);

    let tags = tags(spot);
    if !tags.is_empty() {
        let _ = writeln!(card, "    {}", tags.join(" "));
    }

    if !spot.lines.is_empty() {
        let _ = writeln!(card, "    見れる路線: {}", card_lines(&spot.lines));
    }

    card
}

pub fn detail<S: KeyValueStore>(spot: &Spot, collections: &Collections<S>) -> String {
    let (liked, visited) = marks(spot, collections);
    let mut detail = format!("{liked} {visited} {}\n", spot.name);

    if collections.contains(Collection::Liked, &spot.id) {
        let _ = writeln!(detail, "いいね済み");
    }
    if collections.contains(Collection::Visited, &spot.id) {
        let _ = writeln!(detail, "行った");
    }

    let _ = writeln!(detail, "エリア: {}", spot.area);
    let _ = writeln!(detail, "住所: {}", spot.address);
    let _ = writeln!(detail, "最寄り駅: {} 徒歩{}分", spot.station, spot.walk_minutes);
    let _ = writeln!(detail, "場所: {}", spot.place_type);
    let _ = writeln!(detail, "見れる路線: {}", spot.lines.join(", "));
    let _ = writeln!(detail, "\n{}", spot.description);

    if let Some(note) = &spot.safety_note {
        let _ = writeln!(detail, "\n安全メモ: {note}");
    }

    let _ = writeln!(detail, "\n{}", spot.image);

    detail
}

pub fn stamp_book(book: &StampBook) -> String {
    let mut out = format!("{}こ いったよ！\n", book.visited);

    if book.pages.is_empty() {
        let _ = writeln!(out, "\n{EMPTY_STAMP_BOOK}");
        return out;
    }

    for page in &book.pages {
        let (mark, hint) = if page.stamped {
            ("[済]", "スタンプ済み")
        } else {
            ("[  ]", "タップしてスタンプ")
        };

        let _ = writeln!(out, "{mark} {} ({}) {hint}", page.spot.name, page.spot.id);
    }

    out
}

pub fn filter_catalog() -> String {
    let mut catalog = format!("エリア: {}\n", AREAS.join(" "));

    let _ = writeln!(catalog, "よく見る路線: {}", POPULAR_LINES.join(" "));
    for (company, lines) in LINE_COMPANIES {
        let _ = writeln!(catalog, "{company}: {}", lines.join(" "));
    }

    let _ = writeln!(catalog, "条件:");
    for condition in Condition::ALL {
        let _ = writeln!(catalog, "    {} ({})", condition.slug(), condition.label());
    }

    catalog
}
