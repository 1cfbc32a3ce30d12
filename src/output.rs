//! CLI output formatting.
//!
//! Every article gets a header line (positional index + title, or the input
//! path when no title could be read) followed by indented context lines:
//!
//! ```text
//! 001 Hello, world → content/posts/hello/ogp.png
//!     Source: content/posts/hello/index.md
//! 002 content/posts/draft.md
//!     Skipped: autoGenOgpImg is false
//! 003 content/posts/broken.md
//!     Error: front-matter has no `title` key
//!
//! Generated 1 image, skipped 1, failed 1
//! ```
//!
//! `format_*` functions return lines and do no I/O; `print_*` wrappers
//! write them to stdout.

use crate::pipeline::{FileReport, Outcome, RunSummary, SkipReason};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Lines for one article.
pub fn format_report(report: &FileReport) -> Vec<String> {
    let index = format_index(report.index);
    let input = report.input.display();
    match &report.outcome {
        Outcome::Written { title, output } => vec![
            format!("{index} {title} → {}", output.display()),
            format!("{}Source: {input}", indent(1)),
        ],
        Outcome::Planned { title, output } => vec![
            format!("{index} {title} → {} (not rendered)", output.display()),
            format!("{}Source: {input}", indent(1)),
        ],
        Outcome::Skipped(reason) => vec![
            format!("{index} {input}"),
            format!("{}Skipped: {}", indent(1), skip_reason(reason)),
        ],
        Outcome::Failed(error) => vec![
            format!("{index} {input}"),
            format!("{}Error: {error}", indent(1)),
        ],
    }
}

fn skip_reason(reason: &SkipReason) -> String {
    match reason {
        SkipReason::OptedOut { key } => format!("{key} is false"),
        SkipReason::NotOptedIn { key } => format!("{key} is not set"),
    }
}

/// Closing line of a render run.
pub fn format_summary(summary: &RunSummary) -> String {
    format!(
        "Generated {}, skipped {}, failed {}",
        plural(summary.written(), "image"),
        summary.skipped(),
        summary.failed()
    )
}

/// Closing line of a `check` run.
pub fn format_check_summary(summary: &RunSummary) -> String {
    format!(
        "{} ready, skipped {}, failed {}",
        plural(summary.planned(), "article"),
        summary.skipped(),
        summary.failed()
    )
}

/// One line per destination that more than one article wrote to.
pub fn format_repeated_outputs(summary: &RunSummary) -> Vec<String> {
    summary
        .repeated_outputs()
        .into_iter()
        .map(|path| format!("Warning: {} was used by more than one article", path.display()))
        .collect()
}

pub fn print_report(report: &FileReport) {
    for line in format_report(report) {
        println!("{}", line);
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!();
    for line in format_repeated_outputs(summary) {
        println!("{}", line);
    }
    println!("{}", format_summary(summary));
}

pub fn print_check_summary(summary: &RunSummary) {
    println!();
    for line in format_repeated_outputs(summary) {
        println!("{}", line);
    }
    println!("{}", format_check_summary(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontmatter::FrontmatterError;
    use crate::pipeline::FileError;
    use std::path::PathBuf;

    fn report(index: usize, input: &str, outcome: Outcome) -> FileReport {
        FileReport {
            index,
            input: PathBuf::from(input),
            outcome,
        }
    }

    #[test]
    fn written_shows_title_and_destination() {
        let lines = format_report(&report(
            1,
            "content/posts/hello/index.md",
            Outcome::Written {
                title: "Hello, world".into(),
                output: PathBuf::from("content/posts/hello/ogp.png"),
            },
        ));
        assert_eq!(
            lines,
            vec![
                "001 Hello, world → content/posts/hello/ogp.png",
                "    Source: content/posts/hello/index.md",
            ]
        );
    }

    #[test]
    fn planned_is_marked_not_rendered() {
        let lines = format_report(&report(
            4,
            "a.md",
            Outcome::Planned {
                title: "A".into(),
                output: PathBuf::from("a.png"),
            },
        ));
        assert_eq!(lines[0], "004 A → a.png (not rendered)");
    }

    #[test]
    fn skipped_names_the_gate_key() {
        let off = format_report(&report(
            2,
            "draft.md",
            Outcome::Skipped(SkipReason::OptedOut {
                key: "autoGenOgpImg".into(),
            }),
        ));
        assert_eq!(off, vec!["002 draft.md", "    Skipped: autoGenOgpImg is false"]);

        let absent = format_report(&report(
            3,
            "quiet.md",
            Outcome::Skipped(SkipReason::NotOptedIn {
                key: "autoGenOgpImg".into(),
            }),
        ));
        assert_eq!(absent[1], "    Skipped: autoGenOgpImg is not set");
    }

    #[test]
    fn failed_shows_error_message() {
        let lines = format_report(&report(
            3,
            "broken.md",
            Outcome::Failed(FileError::Frontmatter(FrontmatterError::MissingKey(
                "title".into(),
            ))),
        ));
        assert_eq!(
            lines,
            vec!["003 broken.md", "    Error: front-matter has no `title` key"]
        );
    }

    #[test]
    fn summary_line_counts_outcomes() {
        let summary = RunSummary {
            reports: vec![
                report(
                    1,
                    "a.md",
                    Outcome::Written {
                        title: "A".into(),
                        output: PathBuf::from("a.png"),
                    },
                ),
                report(
                    2,
                    "b.md",
                    Outcome::Skipped(SkipReason::NotOptedIn { key: "k".into() }),
                ),
                report(
                    3,
                    "c.md",
                    Outcome::Failed(FileError::Frontmatter(FrontmatterError::Missing)),
                ),
            ],
        };
        assert_eq!(
            format_summary(&summary),
            "Generated 1 image, skipped 1, failed 1"
        );
    }

    #[test]
    fn repeated_destination_is_flagged_once() {
        let written = |index, input: &str| {
            report(
                index,
                input,
                Outcome::Written {
                    title: input.into(),
                    output: PathBuf::from("posts/ogp.png"),
                },
            )
        };
        let summary = RunSummary {
            reports: vec![
                written(1, "posts/a.md"),
                written(2, "posts/b.md"),
                written(3, "posts/c.md"),
            ],
        };
        assert_eq!(
            format_repeated_outputs(&summary),
            vec!["Warning: posts/ogp.png was used by more than one article"]
        );
        assert!(format_repeated_outputs(&RunSummary::default()).is_empty());
    }

    #[test]
    fn summary_pluralizes() {
        let summary = RunSummary::default();
        assert_eq!(
            format_summary(&summary),
            "Generated 0 images, skipped 0, failed 0"
        );
        assert_eq!(
            format_check_summary(&summary),
            "0 articles ready, skipped 0, failed 0"
        );
    }
}
