use std::path::Path;

use indicatif::{ProgressBar, ProgressStyle, style::TemplateError};

/// Splits one sheet row on commas outside double quotes. Quotes only toggle
/// quoting and never reach the output.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in line.trim_end_matches(['\r', '\n']).chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => columns.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }

    columns.push(current);
    columns
}

/// Row counter shared by the bulk loaders. Per-row results go through `println`.
pub fn progress_bar(len: usize) -> Result<ProgressBar, TemplateError> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );

    Ok(pb)
}

pub fn content_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_line("a,,c\r\n"), vec!["a", "", "c"]);
        assert_eq!(parse_csv_line(""), vec![""]);
    }

    #[test]
    fn test_quoted_commas() {
        assert_eq!(
            parse_csv_line(r#"聖橋,"山手線, 中央線",3"#),
            vec!["聖橋", "山手線, 中央線", "3"]
        );
    }

    #[test]
    fn test_doubled_quotes_vanish() {
        assert_eq!(parse_csv_line(r#""say ""hi""",x"#), vec!["say hi", "x"]);
    }

    #[test]
    fn test_content_type() {
        assert_eq!(content_type(Path::new("tabata.JPG")).as_deref(), Some("image/jpeg"));
        assert_eq!(content_type(Path::new("a.png")).as_deref(), Some("image/png"));
        assert_eq!(content_type(Path::new("noext")), None);
    }
}
