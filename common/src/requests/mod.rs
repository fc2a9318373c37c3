use serde::Deserialize;

fn default_roster_sheet() -> String {
    "Sheet1".to_string()
}

fn default_subject_cell() -> String {
    "D2".to_string()
}

fn default_body_cell() -> String {
    "D5".to_string()
}

fn default_template_sheet() -> String {
    "Report Card".to_string()
}

fn default_master_sheet() -> String {
    "Master".to_string()
}

fn default_start_cell() -> String {
    "A1".to_string()
}

#[derive(Deserialize, Debug, Clone)]
/// Request payload for starting a mail-merge job.
/// The subject and body are read from the roster sheet itself.
pub struct StartMergeRequest {
    pub spreadsheet_id: String,
    #[serde(default = "default_roster_sheet")]
    pub sheet: String,
    #[serde(default = "default_subject_cell")]
    pub subject_cell: String,
    #[serde(default = "default_body_cell")]
    pub body_cell: String,
}

#[derive(Deserialize, Debug, Clone)]
/// Request payload for provisioning one report spreadsheet per roster name.
pub struct ProvisionReportsRequest {
    pub spreadsheet_id: String,
    #[serde(default = "default_roster_sheet")]
    pub sheet: String,
    #[serde(default = "default_template_sheet")]
    pub template_sheet: String,
    #[serde(default = "default_master_sheet")]
    pub master_sheet: String,
}

#[derive(Deserialize, Debug, Clone)]
/// Request payload for writing CSV text into a sheet.
pub struct ImportRosterRequest {
    pub spreadsheet_id: String,
    #[serde(default = "default_roster_sheet")]
    pub sheet: String,
    #[serde(default = "default_start_cell")]
    pub start_cell: String,
    pub csv: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateFolderRequest {
    pub name: String,
    pub parent_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateSpreadsheetRequest {
    pub name: String,
    pub folder_id: String,
    /// Extra sheets to add after the default one.
    #[serde(default)]
    pub sheets: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateFileRequest {
    pub name: String,
    pub folder_id: String,
}
