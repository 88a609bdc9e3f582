//! The navigation block embedded in every train PR
//!
//! A delimited fragment listing every branch/PR of the train, regenerated on
//! each run and spliced into each PR body by delimiter replacement, so the
//! operation is idempotent.

use crate::reconcile::PullRequestRecord;

/// Opening delimiter of the navigation block
pub const NAV_START: &str = "<railyard-toc>";
/// Closing delimiter of the navigation block
pub const NAV_END: &str = "</railyard-toc>";

/// Render the navigation block for one PR of the train
///
/// One row per record, in train order: index, PR number, title. The row of
/// `current_branch` (the branch whose PR body this block lands in) and the
/// combined branch's row are marked distinctly.
pub fn render_navigation(
    records: &[PullRequestRecord],
    current_branch: &str,
    combined_branch: Option<&str>,
) -> String {
    let mut block = String::new();
    block.push_str(NAV_START);
    block.push_str("\n\n#### Branch train:\n");

    for (index, record) in records.iter().enumerate() {
        let here = record.branch == current_branch;
        let marker_left = if here { "\u{1F449} " } else { "" };
        let marker_right = if here { " \u{1F448} **you are here**" } else { "" };
        let combined_info = if combined_branch == Some(record.branch.as_str()) {
            " **[combined]**"
        } else {
            ""
        };

        block.push_str(&format!(
            "{}. {}#{}{} ({}){}\n",
            index,
            marker_left,
            record.number,
            combined_info,
            record.title.trim(),
            marker_right,
        ));
    }

    block.push('\n');
    block.push_str(NAV_END);
    block
}

/// Splice a navigation block into a PR body
///
/// Replaces an existing delimited block in place; otherwise appends the block
/// after a separating blank line. Applying the same block twice yields the
/// same body as applying it once.
pub fn upsert_navigation(navigation: &str, body: &str) -> String {
    if let Some(start) = body.find(NAV_START) {
        if let Some(end) = body[start..].find(NAV_END) {
            let end = start + end + NAV_END.len();
            let mut spliced = String::with_capacity(body.len() + navigation.len());
            spliced.push_str(&body[..start]);
            spliced.push_str(navigation);
            spliced.push_str(&body[end..]);
            return spliced;
        }
    }

    if body.is_empty() {
        navigation.to_string()
    } else {
        format!("{}\n\n{}", body, navigation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(branch: &str, number: u64, title: &str) -> PullRequestRecord {
        PullRequestRecord {
            branch: branch.to_string(),
            number,
            title: title.to_string(),
            body: String::new(),
            html_url: format!("https://github.com/acme/widgets/pull/{}", number),
            preexisting: false,
        }
    }

    fn sample_records() -> Vec<PullRequestRecord> {
        vec![
            record("part-1", 11, "Add billing tables"),
            record("part-2", 12, "Dedupe invoices"),
            record("combined", 13, "All billing changes"),
        ]
    }

    // One row per branch, each with its PR number and title.
    #[test]
    fn test_navigation_has_one_row_per_branch() {
        let records = sample_records();
        let block = render_navigation(&records, "part-1", Some("combined"));

        let rows: Vec<&str> = block
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit()))
            .collect();
        assert_eq!(rows.len(), records.len());
        for (record, row) in records.iter().zip(&rows) {
            assert!(row.contains(&format!("#{}", record.number)));
            assert!(row.contains(&record.title));
        }
    }

    #[test]
    fn test_navigation_marks_exactly_one_current_row() {
        let block = render_navigation(&sample_records(), "part-2", Some("combined"));
        assert_eq!(block.matches("**you are here**").count(), 1);
        assert!(block.contains("1. \u{1F449} #12 (Dedupe invoices)"));
    }

    #[test]
    fn test_navigation_marks_combined_row() {
        let block = render_navigation(&sample_records(), "part-1", Some("combined"));
        assert!(block.contains("2. #13 **[combined]** (All billing changes)"));
    }

    #[test]
    fn test_upsert_appends_after_blank_line() {
        let body = "Original description.";
        let spliced = upsert_navigation("<railyard-toc>\nnav\n</railyard-toc>", body);
        assert_eq!(
            spliced,
            "Original description.\n\n<railyard-toc>\nnav\n</railyard-toc>"
        );
    }

    #[test]
    fn test_upsert_replaces_existing_block_in_place() {
        let body = "Intro.\n\n<railyard-toc>\nold\n</railyard-toc>\n\nOutro.";
        let spliced = upsert_navigation("<railyard-toc>\nnew\n</railyard-toc>", body);
        assert_eq!(spliced, "Intro.\n\n<railyard-toc>\nnew\n</railyard-toc>\n\nOutro.");
    }

    // Applying the same block twice must equal applying it once.
    #[test]
    fn test_upsert_is_idempotent() {
        let block = render_navigation(&sample_records(), "part-1", Some("combined"));
        let once = upsert_navigation(&block, "Some description.");
        let twice = upsert_navigation(&block, &once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_upsert_into_empty_body() {
        let spliced = upsert_navigation("<railyard-toc>\nnav\n</railyard-toc>", "");
        assert_eq!(spliced, "<railyard-toc>\nnav\n</railyard-toc>");
    }
}
