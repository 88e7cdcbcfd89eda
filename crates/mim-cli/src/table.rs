//! Status table.
//!
//! Each column group contributes its titles, alignment tokens and cells;
//! [`StatusPresenter`] concatenates the groups left to right and pads every
//! cell to its column's display width. Rendering never fails: a metric with
//! nothing in it, or that couldn't be measured, shows [`PLACEHOLDER`].

use colored::Colorize;
use console::measure_text_width;
use mim_core::{DivergenceMetric, DivergenceReport, Relation, RepositoryState, Settings};

use crate::output;

/// Cell shown for an empty or unavailable metric.
pub const PLACEHOLDER: &str = "0/files";

const GAP: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
}

impl Align {
    pub const fn token(self) -> char {
        match self {
            Self::Left => 'l',
            Self::Right => 'r',
            Self::Center => 'c',
        }
    }

    fn pad(self, text: &str, width: usize) -> String {
        let fill = width.saturating_sub(measure_text_width(text));
        match self {
            Self::Left => format!("{text}{}", " ".repeat(fill)),
            Self::Right => format!("{}{text}", " ".repeat(fill)),
            Self::Center => {
                let left = fill / 2;
                format!("{}{text}{}", " ".repeat(left), " ".repeat(fill - left))
            }
        }
    }
}

/// What every column group reads from.
pub struct StatusView<'a> {
    pub state: &'a RepositoryState,
    pub report: &'a DivergenceReport,
    pub settings: &'a Settings,
}

trait ColumnGroup {
    fn titles(&self) -> Vec<String>;
    fn align(&self) -> Vec<Align>;
    fn cells(&self, view: &StatusView<'_>) -> Vec<String>;
}

struct BranchColumn;

impl ColumnGroup for BranchColumn {
    fn titles(&self) -> Vec<String> {
        vec!["branch".into()]
    }

    fn align(&self) -> Vec<Align> {
        vec![Align::Left]
    }

    fn cells(&self, view: &StatusView<'_>) -> Vec<String> {
        let branch = &view.state.branch;
        let mut cell = output::branch_name(branch, view.settings.is_main(branch));
        if view.state.rebase_in_progress {
            cell = format!("{cell} {}", "rebasing".yellow());
        }
        vec![cell]
    }
}

/// Columns for a set of directional relations.
struct RelationColumns(&'static [Relation]);

impl RelationColumns {
    /// Short name of each side: the local branch, its remote copy, main.
    const fn title(relation: Relation) -> &'static str {
        match relation {
            Relation::LocalAheadOfRemote => "local>remote",
            Relation::RemoteAheadOfLocal => "remote>local",
            Relation::LocalAheadOfMain => "local>main",
            Relation::MainAheadOfLocal => "main>local",
            Relation::RemoteAheadOfMain => "remote>main",
            Relation::MainAheadOfRemote => "main>remote",
        }
    }
}

impl ColumnGroup for RelationColumns {
    fn titles(&self) -> Vec<String> {
        self.0.iter().map(|r| Self::title(*r).to_owned()).collect()
    }

    fn align(&self) -> Vec<Align> {
        vec![Align::Right; self.0.len()]
    }

    fn cells(&self, view: &StatusView<'_>) -> Vec<String> {
        self.0
            .iter()
            .map(|r| metric_cell(view.report.metric(*r)))
            .collect()
    }
}

struct WorkingTreeColumns;

impl ColumnGroup for WorkingTreeColumns {
    fn titles(&self) -> Vec<String> {
        vec!["uncommitted".into(), "untracked".into()]
    }

    fn align(&self) -> Vec<Align> {
        vec![Align::Right, Align::Center]
    }

    fn cells(&self, view: &StatusView<'_>) -> Vec<String> {
        let tree = &view.report.working_tree;
        let uncommitted = if tree.uncommitted.is_empty() {
            PLACEHOLDER.to_owned()
        } else {
            let mut cell = format!("{}/files", tree.uncommitted.len());
            if let Some(age) = tree.uncommitted_age {
                cell = format!("{cell} {age}");
            }
            cell.yellow().to_string()
        };
        vec![uncommitted, format!("{}/files", tree.untracked)]
    }
}

/// `N/files dd:hh:mm author`, or the placeholder.
fn metric_cell(metric: &DivergenceMetric) -> String {
    if metric.is_empty() {
        return PLACEHOLDER.to_owned();
    }
    let mut parts = vec![format!("{}/files", metric.file_count())];
    if let Some(age) = metric.age {
        parts.push(age.to_string());
    }
    if let Some(author) = &metric.last_author {
        parts.push(author.clone());
    }
    parts.join(" ")
}

/// Renders a [`StatusView`] as a warning line (on main only) and a table.
pub struct StatusPresenter {
    groups: Vec<Box<dyn ColumnGroup>>,
}

impl Default for StatusPresenter {
    fn default() -> Self {
        Self {
            groups: vec![
                Box::new(BranchColumn),
                Box::new(RelationColumns(&[
                    Relation::LocalAheadOfRemote,
                    Relation::RemoteAheadOfLocal,
                ])),
                Box::new(RelationColumns(&[
                    Relation::RemoteAheadOfMain,
                    Relation::MainAheadOfRemote,
                ])),
                Box::new(RelationColumns(&[
                    Relation::LocalAheadOfMain,
                    Relation::MainAheadOfLocal,
                ])),
                Box::new(WorkingTreeColumns),
            ],
        }
    }
}

impl StatusPresenter {
    pub fn titles(&self) -> Vec<String> {
        self.groups.iter().flat_map(|g| g.titles()).collect()
    }

    /// Alignment tokens, one per column (`l`, `r` or `c`).
    pub fn align_tokens(&self) -> String {
        self.groups
            .iter()
            .flat_map(|g| g.align())
            .map(Align::token)
            .collect()
    }

    pub fn render(&self, view: &StatusView<'_>) -> Vec<String> {
        let titles = self.titles();
        let columns = titles.len();

        let mut align: Vec<Align> = self.groups.iter().flat_map(|g| g.align()).collect();
        align.resize(columns, Align::Left);
        let mut cells: Vec<String> = self.groups.iter().flat_map(|g| g.cells(view)).collect();
        cells.resize(columns, PLACEHOLDER.to_owned());

        let widths: Vec<usize> = titles
            .iter()
            .zip(&cells)
            .map(|(t, c)| measure_text_width(t).max(measure_text_width(c)))
            .collect();

        let row = |texts: &[String]| -> String {
            texts
                .iter()
                .zip(&align)
                .zip(&widths)
                .map(|((text, a), w)| a.pad(text, *w))
                .collect::<Vec<_>>()
                .join(GAP)
        };
        let bold: Vec<String> = titles.iter().map(|t| t.bold().to_string()).collect();
        let rule: Vec<String> = widths.iter().map(|w| "─".repeat(*w)).collect();

        let mut lines = Vec::with_capacity(4);
        if view.settings.is_main(&view.state.branch) {
            lines.push(format!(
                "{} on {}: no isolation from the integration branch - `mim branch <name>` to start one",
                "!".yellow(),
                view.settings.main_branch()
            ));
        }
        lines.push(row(&bold));
        lines.push(row(&rule).dimmed().to_string());
        lines.push(row(&cells));
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn state(branch: &str) -> RepositoryState {
        RepositoryState {
            branch: branch.into(),
            tracked: true,
            rebase_in_progress: false,
            behind_upstream: false,
            uncommitted: vec![],
            untracked: vec![],
        }
    }

    fn render(state: &RepositoryState, report: &DivergenceReport) -> Vec<String> {
        let settings = Settings::default();
        let view = StatusView {
            state,
            report,
            settings: &settings,
        };
        StatusPresenter::default().render(&view)
    }

    #[test]
    fn every_group_declares_matching_columns() {
        let settings = Settings::default();
        let state = state("feature");
        let report = DivergenceReport::empty("feature");
        let view = StatusView {
            state: &state,
            report: &report,
            settings: &settings,
        };
        for group in StatusPresenter::default().groups {
            let titles = group.titles().len();
            assert_eq!(titles, group.align().len());
            assert_eq!(titles, group.cells(&view).len());
        }
    }

    #[test]
    fn titles_and_alignment_are_concatenated_in_order() {
        let presenter = StatusPresenter::default();
        assert_eq!(presenter.align_tokens(), "lrrrrrrrc");
        let titles = presenter.titles();
        assert_eq!(titles.first().map(String::as_str), Some("branch"));
        assert_eq!(titles.last().map(String::as_str), Some("untracked"));
        assert_eq!(titles.len(), presenter.align_tokens().len());
    }

    #[test]
    #[serial]
    fn empty_report_is_well_formed_without_warning() {
        colored::control::set_override(false);
        let lines = render(&state("feature"), &DivergenceReport::empty("feature"));

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("branch"));
        let width = measure_text_width(&lines[0]);
        assert!(lines.iter().all(|l| measure_text_width(l) == width));
        // Six relations, uncommitted and untracked.
        assert_eq!(lines[2].matches(PLACEHOLDER).count(), 8);
        colored::control::unset_override();
    }

    #[test]
    #[serial]
    fn warning_comes_first_on_main() {
        colored::control::set_override(false);
        let lines = render(&state("main"), &DivergenceReport::empty("main"));

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("! on main"));
        assert!(lines[1].starts_with("branch"));
        colored::control::unset_override();
    }

    #[test]
    #[serial]
    fn colored_cells_stay_aligned() {
        colored::control::set_override(true);
        let mut state = state("feature");
        state.rebase_in_progress = true;
        let mut report = DivergenceReport::empty("feature");
        report.working_tree.uncommitted = vec!["a.rs".into(), "b.rs".into()];

        let lines = render(&state, &report);
        let width = measure_text_width(&lines[0]);
        assert!(lines.iter().all(|l| measure_text_width(l) == width));
        colored::control::unset_override();
    }

    #[test]
    fn metric_cells() {
        assert_eq!(metric_cell(&DivergenceMetric::unavailable()), PLACEHOLDER);
        assert_eq!(metric_cell(&DivergenceMetric::default()), PLACEHOLDER);

        let metric = DivergenceMetric {
            available: true,
            files: vec!["a.rs".into(), "b.rs".into(), "c.rs".into()],
            commits: 2,
            age: None,
            last_author: Some("alice".into()),
        };
        assert_eq!(metric_cell(&metric), "3/files alice");
    }
}
