//! Upload / process orchestration over a session-keyed batch store.
//!
//! A [`Service`] owns the settings, the text extractor and every batch
//! currently held. Each batch collects the parsed error records from one
//! PDF upload and the normalized records from one import upload; `process`
//! joins them and writes the result workbook into the upload directory.
//!
//! Uploads are all-or-nothing: a failed request removes the files it saved
//! and leaves the batch exactly as it was.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Local;
use entrymatch_config::Settings;
use entrymatch_io::files::{check_extension, output_file_name, resolve_in_dir, save_upload, unique_path};
use entrymatch_io::{export, spreadsheet, IoError, TextExtractor};
use entrymatch_recon::model::{ErrorRecord, ImportSet, ReconMeta, ReconSummary};
use entrymatch_recon::{combine, normalize, ErrorParser, ReconError};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no files provided")]
    NoFiles,

    #[error("invalid file type: '{file}' (allowed: {})", allowed.join(", "))]
    InvalidFileType { file: String, allowed: Vec<String> },

    #[error("file '{file}' is {size} bytes, over the {limit}-byte limit")]
    FileTooLarge { file: String, size: u64, limit: u64 },

    #[error("upload both error-report PDFs and an import-record file first (missing: {})", missing.join(", "))]
    BatchIncomplete { missing: Vec<&'static str> },

    #[error("unknown artifact '{0}'")]
    UnknownArtifact(String),

    #[error(transparent)]
    Recon(#[from] ReconError),

    #[error(transparent)]
    Io(#[from] IoError),
}

impl ServiceError {
    /// Stable snake_case identifier for machine-readable output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoFiles => "no_files",
            Self::InvalidFileType { .. } => "invalid_file_type",
            Self::FileTooLarge { .. } => "file_too_large",
            Self::BatchIncomplete { .. } => "batch_incomplete",
            Self::UnknownArtifact(_) => "unknown_artifact",
            Self::Recon(e) => match e {
                ReconError::ExtractionEmpty { .. } => "extraction_empty",
                ReconError::NoInput => "no_input",
                ReconError::MissingColumns { .. } => "missing_columns",
                ReconError::SpreadsheetLoadFailed { .. } => "spreadsheet_load_failed",
                ReconError::NoMatches => "no_matches",
                ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => "invalid_config",
            },
            Self::Io(e) => match e {
                IoError::InvalidFileType { .. } => "invalid_file_type",
                IoError::ToolMissing { .. } => "tool_missing",
                IoError::Extraction { .. } => "extraction_failed",
                IoError::Read { .. } => "read_failed",
                IoError::Write { .. } => "write_failed",
                IoError::Decode { .. } => "decode_failed",
            },
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Io(e) => e.hint(),
            Self::BatchIncomplete { .. } => Some("upload the missing files, then process again"),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Inputs and summaries
// ---------------------------------------------------------------------------

/// A client-supplied file: original name plus content.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { filename: filename.into(), bytes: bytes.into() }
    }

    pub fn from_path(path: &Path) -> Result<Self, IoError> {
        let bytes = std::fs::read(path).map_err(|e| IoError::read(path, e))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, bytes })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfUploadSummary {
    pub files: usize,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportUploadSummary {
    pub file: String,
    pub records: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessSummary {
    /// Bare name of the workbook inside the upload directory.
    pub output_file: String,
    pub summary: ReconSummary,
    pub meta: ReconMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStatus {
    pub pdf_files: usize,
    pub error_records: usize,
    pub import_file: Option<String>,
    pub import_records: usize,
    pub last_output: Option<String>,
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

/// Everything held for one session between requests.
#[derive(Debug, Default)]
pub struct Batch {
    pdfs: Vec<PathBuf>,
    errors: Option<Vec<ErrorRecord>>,
    import_file: Option<PathBuf>,
    imports: Option<ImportSet>,
    last_output: Option<String>,
}

impl Batch {
    fn status(&self) -> BatchStatus {
        BatchStatus {
            pdf_files: self.pdfs.len(),
            error_records: self.errors.as_ref().map_or(0, Vec::len),
            import_file: self
                .import_file
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
            import_records: self.imports.as_ref().map_or(0, ImportSet::len),
            last_output: self.last_output.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct SessionStore {
    batches: HashMap<String, Batch>,
}

impl SessionStore {
    /// Fresh random session id; no batch is created until first use.
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    pub fn get(&self, session: &str) -> Option<&Batch> {
        self.batches.get(session)
    }

    fn entry(&mut self, session: &str) -> &mut Batch {
        self.batches.entry(session.to_string()).or_default()
    }

    pub fn remove(&mut self, session: &str) -> Option<Batch> {
        self.batches.remove(session)
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

pub struct Service<E: TextExtractor> {
    settings: Settings,
    extractor: E,
    parser: ErrorParser,
    sessions: SessionStore,
}

impl<E: TextExtractor> Service<E> {
    pub fn new(settings: Settings, extractor: E) -> Result<Self, ServiceError> {
        settings.recon.validate()?;
        let parser = ErrorParser::new(&settings.recon.patterns)?;
        Ok(Self {
            settings,
            extractor,
            parser,
            sessions: SessionStore::default(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Save, extract and parse every PDF, replacing the session's error
    /// records on success.
    pub fn upload_pdfs(
        &mut self,
        session: &str,
        files: Vec<Upload>,
    ) -> Result<PdfUploadSummary, ServiceError> {
        if files.is_empty() || files.iter().all(|f| f.filename.trim().is_empty()) {
            return Err(ServiceError::NoFiles);
        }
        for file in &files {
            self.check_upload(file, &self.settings.pdf_extensions)?;
        }

        let mut saved = Vec::with_capacity(files.len());
        match self.extract_all(&files, &mut saved) {
            Ok(records) => {
                let summary = PdfUploadSummary { files: saved.len(), records: records.len() };
                let batch = self.sessions.entry(session);
                batch.pdfs = saved;
                batch.errors = Some(records);
                info!(session, files = summary.files, records = summary.records, "pdf upload accepted");
                Ok(summary)
            }
            Err(e) => {
                remove_files(&saved);
                warn!(session, error = %e, "pdf upload rejected");
                Err(e)
            }
        }
    }

    fn extract_all(
        &self,
        files: &[Upload],
        saved: &mut Vec<PathBuf>,
    ) -> Result<Vec<ErrorRecord>, ServiceError> {
        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let path = save_upload(&self.settings.upload_dir, &file.filename, &file.bytes)?;
            saved.push(path.clone());
            let text = self.extractor.extract(&path)?;
            documents.push(self.parser.parse_document(&file.filename, &text)?);
        }
        Ok(combine(documents)?)
    }

    /// Save, decode and normalize one import spreadsheet, replacing the
    /// session's import records on success.
    pub fn upload_import(
        &mut self,
        session: &str,
        file: Upload,
    ) -> Result<ImportUploadSummary, ServiceError> {
        if file.filename.trim().is_empty() {
            return Err(ServiceError::NoFiles);
        }
        self.check_upload(&file, &self.settings.spreadsheet_extensions)?;

        let path = save_upload(&self.settings.upload_dir, &file.filename, &file.bytes)?;
        let loaded = spreadsheet::read_table(&path)
            .map_err(|e| ReconError::load_failed(&file.filename, e))
            .and_then(|raw| normalize(&raw, &self.settings.recon));

        match loaded {
            Ok(imports) => {
                let summary = ImportUploadSummary { file: file.filename, records: imports.len() };
                let batch = self.sessions.entry(session);
                batch.import_file = Some(path);
                batch.imports = Some(imports);
                info!(session, file = %summary.file, records = summary.records, "import upload accepted");
                Ok(summary)
            }
            Err(e) => {
                remove_files(std::slice::from_ref(&path));
                warn!(session, error = %e, "import upload rejected");
                Err(e.into())
            }
        }
    }

    /// Join the held records and write the output workbook.
    pub fn process(&mut self, session: &str) -> Result<ProcessSummary, ServiceError> {
        let batch = self.sessions.get(session);
        let errors = batch.and_then(|b| b.errors.as_ref());
        let imports = batch.and_then(|b| b.imports.as_ref());

        let (errors, imports) = match (errors, imports) {
            (Some(e), Some(i)) => (e, i),
            (e, i) => {
                let mut missing = Vec::new();
                if e.is_none() {
                    missing.push("error-report PDFs");
                }
                if i.is_none() {
                    missing.push("import-record file");
                }
                return Err(ServiceError::BatchIncomplete { missing });
            }
        };

        let result = entrymatch_recon::run(&self.settings.recon, errors, imports)?;

        let dir = &self.settings.upload_dir;
        std::fs::create_dir_all(dir).map_err(|e| IoError::write(dir, e))?;
        let path = unique_path(dir, &output_file_name(Local::now()));
        export::write_xlsx(&result.table, &path)?;

        let output_file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        info!(
            session,
            output = %output_file,
            rows = result.summary.output_rows,
            unmatched = result.summary.unmatched_errors,
            "processed batch"
        );

        self.sessions.entry(session).last_output = Some(output_file.clone());
        Ok(ProcessSummary {
            output_file,
            summary: result.summary,
            meta: result.meta,
        })
    }

    /// Resolve a download name to a file inside the upload directory.
    pub fn artifact_path(&self, name: &str) -> Result<PathBuf, ServiceError> {
        resolve_in_dir(&self.settings.upload_dir, name)
            .ok_or_else(|| ServiceError::UnknownArtifact(name.to_string()))
    }

    /// Drop everything held for `session`. Returns whether anything was held.
    pub fn reset(&mut self, session: &str) -> bool {
        let existed = self.sessions.remove(session).is_some();
        info!(session, existed, "batch reset");
        existed
    }

    /// Like [`reset`](Self::reset), but also deletes the uploaded PDFs and
    /// import file saved for `session`. Generated workbooks are kept.
    pub fn discard(&mut self, session: &str) -> bool {
        let Some(batch) = self.sessions.remove(session) else {
            return false;
        };
        let mut removed = 0usize;
        for path in batch.pdfs.iter().chain(batch.import_file.iter()) {
            match std::fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "could not remove upload"),
            }
        }
        info!(session, removed, "batch discarded");
        true
    }

    pub fn status(&self, session: &str) -> BatchStatus {
        self.sessions.get(session).map(Batch::status).unwrap_or_default()
    }

    fn check_upload(&self, file: &Upload, allowed: &[String]) -> Result<(), ServiceError> {
        check_extension(&file.filename, allowed).map_err(|_| ServiceError::InvalidFileType {
            file: file.filename.clone(),
            allowed: allowed.to_vec(),
        })?;
        let size = file.bytes.len() as u64;
        if size > self.settings.max_upload_bytes {
            return Err(ServiceError::FileTooLarge {
                file: file.filename.clone(),
                size,
                limit: self.settings.max_upload_bytes,
            });
        }
        Ok(())
    }
}

fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(path = %path.display(), error = %e, "could not remove rejected upload");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entrymatch_recon::UnmatchedPolicy;
    use rust_xlsxwriter::Workbook;

    /// Serves PDF "text" straight from the uploaded bytes.
    struct PlainText;

    impl TextExtractor for PlainText {
        fn extract(&self, path: &Path) -> Result<String, IoError> {
            let text = std::fs::read_to_string(path).map_err(|e| IoError::read(path, e))?;
            if text.trim().is_empty() {
                return Err(IoError::Extraction {
                    file: path.display().to_string(),
                    reason: "no text layer".into(),
                });
            }
            Ok(text)
        }
    }

    const SESSION: &str = "s1";

    fn service(dir: &Path) -> Service<PlainText> {
        let mut settings = Settings::default();
        settings.upload_dir = dir.join("uploads");
        Service::new(settings, PlainText).unwrap()
    }

    fn xlsx_bytes(rows: &[[&str; 4]]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (c, h) in ["Filer Code", "Entry Number", "7501 Line Number", "Additional Data"]
            .iter()
            .enumerate()
        {
            sheet.write_string(0, c as u16, *h).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                sheet.write_string((r + 1) as u32, c as u16, *v).unwrap();
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    fn pdf(name: &str, text: &str) -> Upload {
        Upload::new(name, text.as_bytes())
    }

    fn files_in(dir: &Path) -> usize {
        std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
    }

    #[test]
    fn full_pipeline_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());

        let pdfs = svc
            .upload_pdfs(
                SESSION,
                vec![pdf("a.pdf", "E1 F551 [EXCESS DUTY CLAIMED] [GU660061040] [25]\n")],
            )
            .unwrap();
        assert_eq!(pdfs, PdfUploadSummary { files: 1, records: 1 });

        let import = svc
            .upload_import(
                SESSION,
                Upload::new("imports.xlsx", xlsx_bytes(&[["GU6", "60061040", "25", "x"]])),
            )
            .unwrap();
        assert_eq!(import.records, 1);

        let out = svc.process(SESSION).unwrap();
        assert!(out.output_file.starts_with("processed_data_"));
        assert!(out.output_file.ends_with(".xlsx"));
        assert_eq!(out.summary.output_rows, 1);
        assert_eq!(out.summary.matched_rows, 1);

        let path = svc.artifact_path(&out.output_file).unwrap();
        let table = spreadsheet::read_table(&path).unwrap();
        assert_eq!(table.headers[..5], ["error_code", "error_description", "filer_code", "entry_number", "line_number"]);
        assert_eq!(table.headers[5], "Additional Data");

        let status = svc.status(SESSION);
        assert_eq!(status.pdf_files, 1);
        assert_eq!(status.error_records, 1);
        assert_eq!(status.import_records, 1);
        assert_eq!(status.last_output.as_deref(), Some(out.output_file.as_str()));
    }

    #[test]
    fn empty_pdf_list_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        assert!(matches!(svc.upload_pdfs(SESSION, vec![]), Err(ServiceError::NoFiles)));
        assert!(matches!(
            svc.upload_pdfs(SESSION, vec![pdf("", "x")]),
            Err(ServiceError::NoFiles)
        ));
    }

    #[test]
    fn wrong_extension_rejected_before_saving() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        let err = svc
            .upload_pdfs(SESSION, vec![pdf("a.pdf", "x"), pdf("notes.txt", "x")])
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidFileType { ref file, .. } if file == "notes.txt"));
        assert_eq!(files_in(&dir.path().join("uploads")), 0);
    }

    #[test]
    fn oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.upload_dir = dir.path().join("uploads");
        settings.max_upload_bytes = 8;
        let mut svc = Service::new(settings, PlainText).unwrap();
        let err = svc
            .upload_pdfs(SESSION, vec![pdf("a.pdf", "E1 F551 [A] [GU61] [1]")])
            .unwrap_err();
        assert!(matches!(err, ServiceError::FileTooLarge { limit: 8, .. }));
    }

    #[test]
    fn failed_pdf_upload_keeps_previous_batch_and_removes_its_files() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let mut svc = service(dir.path());

        svc.upload_pdfs(SESSION, vec![pdf("good.pdf", "E1 F551 [A] [GU61] [1]\n")])
            .unwrap();
        assert_eq!(files_in(&uploads), 1);

        let err = svc
            .upload_pdfs(
                SESSION,
                vec![
                    pdf("second.pdf", "E1 F551 [B] [GU62] [2]\n"),
                    pdf("cover.pdf", "COVER PAGE ONLY\n"),
                ],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Recon(ReconError::ExtractionEmpty { ref document }) if document == "cover.pdf"
        ));

        assert_eq!(files_in(&uploads), 1, "files of the failed request are removed");
        let status = svc.status(SESSION);
        assert_eq!(status.pdf_files, 1);
        assert_eq!(status.error_records, 1);
    }

    #[test]
    fn extraction_failure_surfaces_as_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        let err = svc.upload_pdfs(SESSION, vec![pdf("scan.pdf", "   ")]).unwrap_err();
        assert!(matches!(err, ServiceError::Io(IoError::Extraction { .. })));
        assert_eq!(err.kind(), "extraction_failed");
    }

    #[test]
    fn missing_columns_stay_typed() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Filer Code").unwrap();
        sheet.write_string(0, 1, "Entry Number").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let err = svc.upload_import(SESSION, Upload::new("imports.xlsx", bytes)).unwrap_err();
        match err {
            ServiceError::Recon(ReconError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["7501 Line Number".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(svc.status(SESSION), BatchStatus::default());
        assert_eq!(files_in(&dir.path().join("uploads")), 0);
    }

    #[test]
    fn undecodable_import_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        let err = svc
            .upload_import(SESSION, Upload::new("imports.xlsx", b"garbage".to_vec()))
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Recon(ReconError::SpreadsheetLoadFailed { ref file, .. }) if file == "imports.xlsx"
        ));
    }

    #[test]
    fn failed_import_keeps_previous_import() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        svc.upload_import(
            SESSION,
            Upload::new("first.xlsx", xlsx_bytes(&[["GU6", "1", "1", "a"], ["GU6", "2", "1", "b"]])),
        )
        .unwrap();

        assert!(svc
            .upload_import(SESSION, Upload::new("bad.xlsx", b"garbage".to_vec()))
            .is_err());
        let status = svc.status(SESSION);
        assert_eq!(status.import_records, 2);
        assert!(status.import_file.unwrap().ends_with("first.xlsx"));
    }

    #[test]
    fn process_requires_both_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        match svc.process(SESSION).unwrap_err() {
            ServiceError::BatchIncomplete { missing } => assert_eq!(missing.len(), 2),
            other => panic!("unexpected error: {other}"),
        }

        svc.upload_pdfs(SESSION, vec![pdf("a.pdf", "E1 F551 [A] [GU61] [1]\n")])
            .unwrap();
        match svc.process(SESSION).unwrap_err() {
            ServiceError::BatchIncomplete { missing } => {
                assert_eq!(missing, vec!["import-record file"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sessions_are_isolated_and_reset() {
        let dir = tempfile::tempdir().unwrap();
        let mut svc = service(dir.path());
        svc.upload_pdfs("a", vec![pdf("a.pdf", "E1 F551 [A] [GU61] [1]\n")])
            .unwrap();

        assert_eq!(svc.status("b"), BatchStatus::default());
        assert!(matches!(svc.process("b"), Err(ServiceError::BatchIncomplete { .. })));

        assert!(svc.reset("a"));
        assert!(!svc.reset("a"));
        assert_eq!(svc.status("a"), BatchStatus::default());
        assert!(svc.sessions().is_empty());
    }

    #[test]
    fn discard_removes_saved_uploads_but_keeps_output() {
        let dir = tempfile::tempdir().unwrap();
        let uploads = dir.path().join("uploads");
        let mut svc = service(dir.path());
        svc.upload_pdfs(SESSION, vec![pdf("a.pdf", "E1 F551 [A] [GU61] [1]\n")])
            .unwrap();
        svc.upload_import(SESSION, Upload::new("i.xlsx", xlsx_bytes(&[["GU6", "1", "1", ""]])))
            .unwrap();
        let out = svc.process(SESSION).unwrap();
        assert_eq!(files_in(&uploads), 3);

        assert!(svc.discard(SESSION));
        assert_eq!(files_in(&uploads), 1);
        assert!(svc.artifact_path(&out.output_file).is_ok());
        assert_eq!(svc.status(SESSION), BatchStatus::default());
        assert!(!svc.discard(SESSION));
    }

    #[test]
    fn fail_when_empty_policy_blocks_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.upload_dir = dir.path().join("uploads");
        settings.recon.unmatched_policy = UnmatchedPolicy::FailWhenEmpty;
        let mut svc = Service::new(settings, PlainText).unwrap();

        svc.upload_pdfs(SESSION, vec![pdf("a.pdf", "E1 F551 [A] [GU61] [1]\n")])
            .unwrap();
        svc.upload_import(SESSION, Upload::new("i.xlsx", xlsx_bytes(&[["XYZ", "9", "9", ""]])))
            .unwrap();

        let err = svc.process(SESSION).unwrap_err();
        assert!(matches!(err, ServiceError::Recon(ReconError::NoMatches)));
        assert_eq!(svc.status(SESSION).last_output, None);
    }

    #[test]
    fn artifact_names_are_confined() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path());
        assert!(matches!(
            svc.artifact_path("../secret.xlsx"),
            Err(ServiceError::UnknownArtifact(_))
        ));
        assert!(matches!(
            svc.artifact_path("processed_data_19990101_000000.xlsx"),
            Err(ServiceError::UnknownArtifact(_))
        ));
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionStore::new_session_id(), SessionStore::new_session_id());
    }
}
