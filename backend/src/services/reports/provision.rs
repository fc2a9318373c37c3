//! The report provisioner: one spreadsheet per roster name, cloned from the template sheet.
//!
//! A run is idempotent by name. Anything already called after a roster entry in
//! the target folder is left alone, so an aborted run is recovered by running it
//! again.

use super::formulas::{report_card_formulas, MasterSource};
use crate::a1::{CellRange, CellRef};
use crate::error::{AutomationError, StoreError};
use crate::services::lookup::{file_exists_in_folder, first_parent};
use crate::workspace::{FileStore, Sheet, SheetId, SpreadsheetStore, TabularSource};
use common::model::formula::FormulaDescriptor;
use common::requests::ProvisionReportsRequest;
use log::{error, info, warn};

/// Names start on row 3 of column A and run to the last used row.
const NAMES_RANGE: &str = "A3:A";

#[derive(Debug, Default)]
pub struct ProvisionSummary {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

impl ProvisionSummary {
    pub fn message(&self) -> String {
        format!(
            "Created {} report(s), skipped {}",
            self.created.len(),
            self.skipped.len()
        )
    }
}

fn missing(msg: String) -> AutomationError {
    error!("{}", msg);
    AutomationError::MissingPrecondition(msg)
}

/// Everything a single report needs besides the name and its roster index.
struct ReportPlan<'a> {
    template: &'a Sheet,
    folder_id: &'a str,
    root_id: &'a str,
    master: &'a MasterSource,
    formulas: &'a [FormulaDescriptor],
}

pub fn provision_reports<W>(
    ws: &W,
    req: &ProvisionReportsRequest,
    progress: &mut dyn FnMut(usize, usize),
) -> Result<ProvisionSummary, AutomationError>
where
    W: TabularSource + SpreadsheetStore + FileStore,
{
    let folder = first_parent(ws, &req.spreadsheet_id)?
        .ok_or_else(|| missing("No parent folder found for this spreadsheet.".to_string()))?;
    info!("Using folder: {}", folder.name);

    let template = ws
        .sheet_by_name(&req.spreadsheet_id, &req.template_sheet)?
        .ok_or_else(|| {
            missing(format!(
                "No '{}' sheet found in the source spreadsheet.",
                req.template_sheet
            ))
        })?;
    let roster = ws
        .sheet_by_name(&req.spreadsheet_id, &req.sheet)?
        .ok_or_else(|| missing(format!("No '{}' sheet found in the source spreadsheet.", req.sheet)))?;

    let gid = ws
        .sheet_by_name(&req.spreadsheet_id, &req.master_sheet)?
        .map(|sheet| sheet.id);
    if gid.is_none() {
        warn!(
            "No '{}' sheet in the source spreadsheet; formulas will not pin a gid",
            req.master_sheet
        );
    }
    let master = MasterSource {
        spreadsheet_url: ws.url(&req.spreadsheet_id)?,
        gid,
        sheet: req.master_sheet.clone(),
    };

    let names = read_names(ws, roster.id)?;
    let root = ws.root_folder()?;
    let formulas = report_card_formulas();
    let plan = ReportPlan {
        template: &template,
        folder_id: &folder.id,
        root_id: &root.id,
        master: &master,
        formulas: &formulas,
    };

    let mut summary = ProvisionSummary::default();
    let total = names.len();
    for (i, name) in names.iter().enumerate() {
        progress(i, total);
        if name.trim().is_empty() || file_exists_in_folder(ws, &folder.id, name)? {
            info!("Sheet already exists or name is empty: {}", name);
            summary.skipped.push(name.clone());
            continue;
        }
        info!("Creating sheet for: {}", name);
        provision_one(ws, &plan, name, i)?;
        summary.created.push(name.clone());
    }
    progress(total, total);

    Ok(summary)
}

/// Column A from row 3 down, as displayed. Empty rows are kept so indexes match master rows.
pub fn read_names<T>(source: &T, sheet: SheetId) -> Result<Vec<String>, AutomationError>
where
    T: TabularSource + ?Sized,
{
    let range = CellRange::parse(NAMES_RANGE)?;
    Ok(source
        .read_range(sheet, &range)?
        .into_iter()
        .map(|row| row.into_iter().next().unwrap_or_default().to_string())
        .collect())
}

/// Creates, fills and files the report for roster entry `index`. Order matters:
/// the default sheet can only go once the template copy exists, and the file
/// only leaves the root folder once it is linked into the target.
fn provision_one<W>(ws: &W, plan: &ReportPlan<'_>, name: &str, index: usize) -> Result<(), AutomationError>
where
    W: TabularSource + SpreadsheetStore + FileStore,
{
    let report_id = ws.create_spreadsheet(name)?;
    ws.copy_sheet(plan.template.id, &report_id)?;

    let default = first_sheet(ws, &report_id)?;
    ws.delete_sheet(default.id)?;

    let report = first_sheet(ws, &report_id)?;
    ws.rename_sheet(report.id, &plan.template.name)?;

    for descriptor in plan.formulas {
        let cell = CellRef::parse(&descriptor.cell)?;
        ws.set_formula(report.id, cell, &plan.master.render(descriptor, index))?;
    }

    ws.add_file(plan.folder_id, &report_id)?;
    if plan.folder_id != plan.root_id {
        ws.remove_file(plan.root_id, &report_id)?;
    }
    Ok(())
}

fn first_sheet<W>(ws: &W, spreadsheet_id: &str) -> Result<Sheet, StoreError>
where
    W: SpreadsheetStore + ?Sized,
{
    ws.sheets(spreadsheet_id)?
        .into_iter()
        .next()
        .ok_or_else(|| StoreError::not_found("sheet", spreadsheet_id))
}
