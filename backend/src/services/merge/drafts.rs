//! The mail-merge pipeline: one personalized draft per roster row.
//!
//! Running it has a lasting side effect beyond the drafts: every file that
//! matches a roster name is re-shared as "anyone with the link can view" so the
//! link in the draft works. Re-running recreates drafts for every eligible row.

use super::personalize::{link_anchor, parse_recipients, Personalizer, NO_FILE_FOUND};
use crate::a1::{CellRange, CellRef};
use crate::error::AutomationError;
use crate::services::lookup::{first_file_named, first_parent};
use crate::workspace::{DraftMailer, FileStore, SheetId, SpreadsheetStore, TabularSource};
use common::model::cell::CellValue;
use common::model::draft::{DraftMessage, DraftOptions};
use common::model::roster::RosterRow;
use common::model::sharing::{Access, Permission};
use common::model::template::MailTemplate;
use common::requests::StartMergeRequest;
use log::{error, info};

/// Roster rows for the mail merge: names in A, emails in B, from row 2 down.
const ROSTER_RANGE: &str = "A2:B";

#[derive(Debug, Default)]
pub struct MergeSummary {
    pub drafted: Vec<DraftMessage>,
    pub skipped: usize,
}

impl MergeSummary {
    pub fn message(&self) -> String {
        format!(
            "Created {} draft(s), skipped {} row(s)",
            self.drafted.len(),
            self.skipped
        )
    }
}

/// Resolves the request against the workspace and runs the merge.
///
/// The folder holding the roster spreadsheet is where linked files are looked up.
pub fn draft_emails<W>(
    ws: &W,
    req: &StartMergeRequest,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<MergeSummary, AutomationError>
where
    W: TabularSource + SpreadsheetStore + FileStore + DraftMailer,
{
    let sheet = ws.sheet_by_name(&req.spreadsheet_id, &req.sheet)?.ok_or_else(|| {
        let msg = format!("No '{}' sheet found in the roster spreadsheet.", req.sheet);
        error!("{}", msg);
        AutomationError::MissingPrecondition(msg)
    })?;

    let folder = first_parent(ws, &req.spreadsheet_id)?.ok_or_else(|| {
        let msg = "No parent folder found for this spreadsheet.".to_string();
        error!("{}", msg);
        AutomationError::MissingPrecondition(msg)
    })?;

    let template = read_template(ws, sheet.id, &req.subject_cell, &req.body_cell)?;
    let rows = read_roster(ws, sheet.id)?;
    info!(
        "Merging {} roster row(s) against folder '{}'",
        rows.len(),
        folder.name
    );

    merge_roster(ws, ws, &folder.id, &template, &rows, progress)
}

/// Reads the subject and body cells of the roster sheet.
pub fn read_template<T>(
    source: &T,
    sheet: SheetId,
    subject_cell: &str,
    body_cell: &str,
) -> Result<MailTemplate, AutomationError>
where
    T: TabularSource + ?Sized,
{
    let subject_ref = CellRef::parse(subject_cell)
        .map_err(|_| AutomationError::InvalidInput(format!("bad subject cell '{}'", subject_cell)))?;
    let body_ref = CellRef::parse(body_cell)
        .map_err(|_| AutomationError::InvalidInput(format!("bad body cell '{}'", body_cell)))?;
    Ok(MailTemplate {
        subject: source.value(sheet, subject_ref)?.to_string(),
        body: source.value(sheet, body_ref)?.to_string(),
    })
}

/// Reads `A2:B{last_row}` as roster rows.
pub fn read_roster<T>(source: &T, sheet: SheetId) -> Result<Vec<RosterRow>, AutomationError>
where
    T: TabularSource + ?Sized,
{
    let range = CellRange::parse(ROSTER_RANGE)?;
    Ok(source
        .read_range(sheet, &range)?
        .into_iter()
        .map(|cells| {
            let mut cells = cells.into_iter();
            let name = cells.next().unwrap_or_default().to_string();
            let emails = match cells.next().unwrap_or_default() {
                CellValue::Empty => None,
                value => Some(value.to_string()),
            };
            RosterRow { name, emails }
        })
        .collect())
}

/// Creates one draft per eligible row, in roster order.
///
/// Rows without a name, without email text, or whose email text holds no
/// address are skipped before anything is looked up or shared.
pub fn merge_roster<F, M>(
    files: &F,
    mailer: &M,
    folder_id: &str,
    template: &MailTemplate,
    rows: &[RosterRow],
    progress: &mut dyn FnMut(usize, usize),
) -> Result<MergeSummary, AutomationError>
where
    F: FileStore + ?Sized,
    M: DraftMailer + ?Sized,
{
    let personalizer = Personalizer::new()?;
    let mut summary = MergeSummary::default();
    let total = rows.len();

    for (i, row) in rows.iter().enumerate() {
        progress(i, total);

        let emails = match row.emails.as_deref() {
            Some(emails) if !row.is_inert() => emails,
            _ => {
                summary.skipped += 1;
                continue;
            }
        };
        let recipients = parse_recipients(emails);
        if recipients.is_empty() {
            summary.skipped += 1;
            continue;
        }

        let subject = personalizer.fill_name(&template.subject, &row.name);
        let body = personalizer.fill_name(&template.body, &row.name);

        let link = match first_file_named(files, folder_id, &row.name)? {
            Some(file) => {
                files.set_sharing(&file.id, Access::Anyone, Permission::View)?;
                link_anchor(&files.url(&file.id)?)
            }
            None => NO_FILE_FOUND.to_string(),
        };
        let body_html = personalizer.fill_link(&body, &link);

        let draft = DraftMessage {
            recipients,
            subject,
            body_html,
        };
        let options = DraftOptions {
            html_body: Some(draft.body_html.clone()),
        };
        mailer.create_draft(&draft.recipient_line(), &draft.subject, &draft.body_html, &options)?;
        info!("Drafted '{}' to {}", draft.subject, draft.recipient_line());
        summary.drafted.push(draft);
    }

    progress(total, total);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::sqlite::ROOT_FOLDER_ID;
    use crate::workspace::SqliteWorkspace;
    use std::collections::HashSet;

    fn no_progress() -> impl FnMut(usize, usize) {
        |_, _| {}
    }

    fn template(subject: &str, body: &str) -> MailTemplate {
        MailTemplate {
            subject: subject.to_string(),
            body: body.to_string(),
        }
    }

    /// Roster spreadsheet moved into its own folder, like a real class folder.
    fn roster_in_folder(ws: &SqliteWorkspace) -> (String, String, SheetId) {
        let folder = ws.create_folder("Class", ROOT_FOLDER_ID).unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        ws.add_file(&folder.id, &id).unwrap();
        ws.remove_file(ROOT_FOLDER_ID, &id).unwrap();
        let sheet = ws.sheets(&id).unwrap()[0].id;
        (folder.id, id, sheet)
    }

    fn put(ws: &SqliteWorkspace, sheet: SheetId, cell: &str, value: &str) {
        ws.set_value(sheet, CellRef::parse(cell).unwrap(), &CellValue::from_raw(value))
            .unwrap();
    }

    #[test]
    fn end_to_end_without_matching_files() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);
        let rows = vec![
            RosterRow::new("Sue", Some("sue@x.com")),
            RosterRow::new("", Some("bob@x.com")),
            RosterRow::new("Ann", Some("a@x.com,a@x.com")),
        ];

        let summary = merge_roster(
            &ws,
            &ws,
            &folder,
            &template("Hi [name]", "See [link]"),
            &rows,
            &mut no_progress(),
        )
        .unwrap();

        assert_eq!(summary.drafted.len(), 2);
        assert_eq!(summary.skipped, 1);

        let drafts = ws.drafts().unwrap();
        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].recipients, "sue@x.com");
        assert_eq!(drafts[0].subject, "Hi Sue");
        assert!(drafts[0].body.contains(NO_FILE_FOUND));
        assert!(!drafts[0].body.contains("<a "));
        assert_eq!(drafts[1].recipients, "a@x.com");
        assert_eq!(drafts[1].subject, "Hi Ann");
        assert_eq!(drafts[1].html_body.as_deref(), Some("See No file found with the matching name."));
    }

    #[test]
    fn matching_file_is_linked_and_shared() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);
        let file = ws.create_file("Rose", &folder).unwrap();
        let url = ws.url(&file.id).unwrap();

        let summary = merge_roster(
            &ws,
            &ws,
            &folder,
            &template("Report for [NAME]", "[Name], your report: [Link]"),
            &[RosterRow::new("Rose", Some("rose@x.com"))],
            &mut no_progress(),
        )
        .unwrap();

        let draft = &summary.drafted[0];
        assert_eq!(draft.subject, "Report for Rose");
        assert_eq!(
            draft.body_html,
            format!("Rose, your report: <a href=\"{}\" target=\"_blank\">Link</a>", url)
        );
        assert_eq!(ws.sharing(&file.id).unwrap(), (Access::Anyone, Permission::View));
    }

    #[test]
    fn files_outside_the_folder_are_not_linked() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);
        let stray = ws.create_file("Rose", ROOT_FOLDER_ID).unwrap();

        let summary = merge_roster(
            &ws,
            &ws,
            &folder,
            &template("s", "[link]"),
            &[RosterRow::new("Rose", Some("rose@x.com"))],
            &mut no_progress(),
        )
        .unwrap();

        assert_eq!(summary.drafted[0].body_html, NO_FILE_FOUND);
        assert_eq!(ws.sharing(&stray.id).unwrap(), (Access::Private, Permission::Edit));
    }

    #[test]
    fn inert_rows_touch_nothing() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);
        let file = ws.create_file("Rose", &folder).unwrap();
        let rows = vec![
            RosterRow::new("Rose", None),
            RosterRow::new("Rose", Some("")),
            RosterRow::new("Rose", Some(" , ")),
            RosterRow::new("  ", Some("rose@x.com")),
        ];

        let summary = merge_roster(
            &ws,
            &ws,
            &folder,
            &template("s", "[link]"),
            &rows,
            &mut no_progress(),
        )
        .unwrap();

        assert!(summary.drafted.is_empty());
        assert_eq!(summary.skipped, 4);
        assert!(ws.drafts().unwrap().is_empty());
        assert_eq!(ws.sharing(&file.id).unwrap(), (Access::Private, Permission::Edit));
    }

    #[test]
    fn duplicate_addresses_collapse_into_one_draft() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);

        let summary = merge_roster(
            &ws,
            &ws,
            &folder,
            &template("s", "b"),
            &[RosterRow::new("Ann", Some("a@x.com, a@x.com,b@x.com"))],
            &mut no_progress(),
        )
        .unwrap();

        assert_eq!(summary.drafted.len(), 1);
        let got: HashSet<&str> = summary.drafted[0].recipients.iter().map(String::as_str).collect();
        assert_eq!(got, HashSet::from(["a@x.com", "b@x.com"]));
    }

    #[test]
    fn progress_reaches_total() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, _, _) = roster_in_folder(&ws);
        let mut seen = Vec::new();
        merge_roster(
            &ws,
            &ws,
            &folder,
            &template("s", "b"),
            &[RosterRow::new("Ann", Some("a@x.com")), RosterRow::new("Bo", Some("b@x.com"))],
            &mut |done, total| seen.push((done, total)),
        )
        .unwrap();
        assert_eq!(seen, vec![(0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn draft_emails_reads_template_and_roster_from_the_sheet() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let (folder, id, sheet) = roster_in_folder(&ws);
        put(&ws, sheet, "A1", "Name");
        put(&ws, sheet, "B1", "Emails");
        put(&ws, sheet, "D2", "Hello [name]");
        put(&ws, sheet, "D5", "Your file: [link]");
        put(&ws, sheet, "A2", "Sue");
        put(&ws, sheet, "B2", "sue@x.com, parent@x.com");
        put(&ws, sheet, "A3", "Bob");
        put(&ws, sheet, "A4", "Ann");
        put(&ws, sheet, "B4", "ann@x.com");
        ws.create_file("Ann", &folder).unwrap();

        let req = StartMergeRequest {
            spreadsheet_id: id,
            sheet: "Sheet1".to_string(),
            subject_cell: "D2".to_string(),
            body_cell: "D5".to_string(),
        };
        let summary = draft_emails(&ws, &req, &mut no_progress()).unwrap();

        assert_eq!(summary.drafted.len(), 2);
        assert_eq!(summary.skipped, 2); // Bob has no emails, row 5 holds only the body template
        assert_eq!(summary.drafted[0].recipient_line(), "sue@x.com,parent@x.com");
        assert_eq!(summary.drafted[0].body_html, format!("Your file: {}", NO_FILE_FOUND));
        assert_eq!(summary.drafted[1].subject, "Hello Ann");
        assert!(summary.drafted[1].body_html.contains(">Link</a>"));
    }

    #[test]
    fn roster_without_folder_is_a_missing_precondition() {
        let ws = SqliteWorkspace::open_in_memory().unwrap();
        let id = ws.create_spreadsheet("Roster").unwrap();
        ws.remove_file(ROOT_FOLDER_ID, &id).unwrap();
        let req = StartMergeRequest {
            spreadsheet_id: id,
            sheet: "Sheet1".to_string(),
            subject_cell: "D2".to_string(),
            body_cell: "D5".to_string(),
        };

        let err = draft_emails(&ws, &req, &mut no_progress()).unwrap_err();
        assert!(matches!(err, AutomationError::MissingPrecondition(_)));
        assert!(ws.drafts().unwrap().is_empty());
    }
}
