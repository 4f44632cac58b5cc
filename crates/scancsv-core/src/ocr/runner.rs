//! Runs the external layout model over a folder of scanned invoices.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use glob::MatchOptions;
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::error::{OcrError, Result, ScanError};
use crate::models::config::OcrConfig;

use super::{OcrBatch, OcrPayload, OcrResult, PageInfo, TextBlock};

/// Invokes the layout model once per document and collects its JSON output.
pub struct OcrRunner {
    config: OcrConfig,
}

impl OcrRunner {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// First configured model directory that exists.
    pub fn locate_model(&self) -> Option<PathBuf> {
        self.config
            .model_candidates
            .iter()
            .find(|p| p.is_dir())
            .cloned()
    }

    /// Whether the model script is present.
    pub fn script_available(&self) -> bool {
        self.config.script.is_file()
    }

    /// Whether a path has one of the supported extensions.
    pub fn is_supported(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        self.config.supported_formats.iter().any(|f| *f == ext)
    }

    /// Supported documents directly inside `in_dir`, sorted by path.
    pub fn discover_documents(&self, in_dir: &Path) -> Result<Vec<PathBuf>> {
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };
        let base = glob::Pattern::escape(&in_dir.to_string_lossy());

        let mut files = BTreeSet::new();
        for ext in &self.config.supported_formats {
            let pattern = format!("{}/*.{}", base, ext);
            let entries = glob::glob_with(&pattern, options)
                .map_err(|e| ScanError::Config(format!("bad glob {}: {}", pattern, e)))?;
            files.extend(entries.filter_map(|r| r.ok()).filter(|p| p.is_file()));
        }

        Ok(files.into_iter().collect())
    }

    /// Run the model on every supported document in `in_dir`.
    ///
    /// Documents that time out or produce no output are logged and left out
    /// of the returned batch.
    pub async fn run_on_folder(&self, in_dir: &Path, out_dir: &Path) -> Result<OcrBatch> {
        self.run_on_folder_with_progress(in_dir, out_dir, |_| {}).await
    }

    /// Like [`run_on_folder`](Self::run_on_folder), calling `progress` after each document.
    pub async fn run_on_folder_with_progress<F>(
        &self,
        in_dir: &Path,
        out_dir: &Path,
        mut progress: F,
    ) -> Result<OcrBatch>
    where
        F: FnMut(&Path),
    {
        if !in_dir.is_dir() {
            return Err(OcrError::InputNotFound(in_dir.to_path_buf()).into());
        }

        let mut batch = OcrBatch::new();
        let files = self.discover_documents(in_dir)?;
        if files.is_empty() {
            warn!("No supported files found in {}", in_dir.display());
            return Ok(batch);
        }

        info!("Found {} files to process", files.len());
        tokio::fs::create_dir_all(out_dir).await?;

        for path in &files {
            let file_id = file_stem(path);
            match self.process_document(path, out_dir).await {
                Ok(payload) => {
                    info!(
                        "Processed {} in {:.2}s",
                        file_id,
                        payload.processing_time()
                    );
                    if batch.insert(file_id.clone(), payload).is_some() {
                        warn!("Duplicate file identifier {}, keeping the latest result", file_id);
                    }
                }
                Err(e) => error!("Error processing {}: {}", path.display(), e),
            }
            progress(path);
        }

        Ok(batch)
    }

    async fn process_document(&self, path: &Path, out_dir: &Path) -> Result<OcrPayload> {
        let file_id = file_stem(path);
        let output_path = out_dir.join(format!("{}.json", file_id));

        info!("Processing {}...", path.display());
        let start = Instant::now();

        if self.script_available() {
            match self.invoke_model(path, out_dir).await {
                Ok(()) => {}
                Err(e @ OcrError::Failed { .. }) => {
                    error!("{}", e);
                    if self.config.mock_fallback {
                        write_mock(&file_id, &output_path).await?;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            warn!("Layout model not found, creating mock OCR data for testing");
            if self.config.mock_fallback {
                write_mock(&file_id, &output_path).await?;
            }
        }

        let elapsed = start.elapsed().as_secs_f64();

        if !output_path.exists() {
            return Err(OcrError::MissingOutput(output_path).into());
        }

        let json = tokio::fs::read_to_string(&output_path).await?;
        let payload = match OcrPayload::from_json(&json) {
            OcrPayload::WellFormed(result) => {
                OcrPayload::WellFormed(result.with_processing_time(elapsed))
            }
            malformed => malformed,
        };

        Ok(payload)
    }

    async fn invoke_model(&self, path: &Path, out_dir: &Path) -> std::result::Result<(), OcrError> {
        let mut cmd = Command::new(&self.config.python);
        cmd.arg(&self.config.script)
            .arg("--model_path")
            .arg(self.config.model_path())
            .arg("--input_path")
            .arg(path)
            .arg("--save_dir")
            .arg(out_dir)
            .kill_on_drop(true);

        debug!("Running {:?}", cmd);

        let secs = self.config.timeout_secs;
        let output = match tokio::time::timeout(Duration::from_secs(secs), cmd.output()).await {
            Ok(result) => result.map_err(|e| OcrError::Spawn(e.to_string()))?,
            Err(_) => {
                return Err(OcrError::Timeout {
                    path: path.to_path_buf(),
                    secs,
                });
            }
        };

        if !output.status.success() {
            return Err(OcrError::Failed {
                path: path.to_path_buf(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }

    /// Load a directory of previously written raw JSON files as a batch.
    ///
    /// Unreadable files become malformed payloads rather than errors.
    pub fn load_raw_dir(dir: &Path) -> Result<OcrBatch> {
        if !dir.is_dir() {
            return Err(OcrError::InputNotFound(dir.to_path_buf()).into());
        }

        let pattern = format!("{}/*.json", glob::Pattern::escape(&dir.to_string_lossy()));
        let mut files: Vec<PathBuf> = glob::glob(&pattern)
            .map_err(|e| ScanError::Config(format!("bad glob {}: {}", pattern, e)))?
            .filter_map(|r| r.ok())
            .collect();
        files.sort();

        let mut batch = OcrBatch::new();
        for path in files {
            let payload = match std::fs::read_to_string(&path) {
                Ok(json) => OcrPayload::from_json(&json),
                Err(e) => OcrPayload::malformed(e.to_string()),
            };
            batch.insert(file_stem(&path), payload);
        }

        debug!("Loaded {} raw OCR payloads from {}", batch.len(), dir.display());
        Ok(batch)
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Synthetic three-block invoice used when the layout model is unavailable.
pub fn mock_payload(file_id: &str) -> OcrResult {
    let chars: Vec<char> = file_id.chars().collect();
    let suffix: String = chars[chars.len().saturating_sub(3)..].iter().collect();

    OcrResult {
        blocks: vec![
            TextBlock::new(
                format!(
                    "ABC Corporation Ltd\nInvoice #: INV-2024-{}\nDate: 15/01/2024\nBill To: Customer Name\n",
                    suffix
                ),
                [50.0, 50.0, 300.0, 150.0],
            ),
            TextBlock::new(
                "Description\tQty\tRate\tAmount\nConsulting Services\t10\t100.00\t1000.00\nTravel Expenses\t1\t250.00\t250.00\n",
                [50.0, 200.0, 500.0, 300.0],
            ),
            TextBlock::new(
                "Total Amount: INR 1,250.00\nGrand Total: INR 1,250.00",
                [50.0, 350.0, 300.0, 400.0],
            ),
        ],
        page_info: Some(PageInfo {
            width: 595.0,
            height: 842.0,
        }),
        processing_time: 0.0,
    }
}

async fn write_mock(file_id: &str, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_string_pretty(&mock_payload(file_id))?;
    tokio::fs::write(output_path, json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn runner_without_model(dir: &Path) -> OcrRunner {
        OcrRunner::new(OcrConfig {
            script: dir.join("missing/demo_page_hf.py"),
            model_candidates: vec![dir.join("missing")],
            ..OcrConfig::default()
        })
    }

    #[test]
    fn test_discover_documents_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.PDF", "a.png", "notes.txt", "c.jpeg"] {
            fs::write(dir.path().join(name), "dummy content").unwrap();
        }

        let runner = runner_without_model(dir.path());
        let files = runner.discover_documents(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a.png", "b.PDF", "c.jpeg"]);
        assert!(runner.locate_model().is_none());
    }

    #[test]
    fn test_mock_payload_suffix() {
        let text = mock_payload("invoice_001").text();
        assert!(text.contains("INV-2024-001"));
        assert!(mock_payload("ab").text().contains("INV-2024-ab\n"));
    }

    #[test]
    fn test_mock_payload_parses() {
        use crate::invoice::{InvoiceExtractor, PatternInvoiceParser};

        let parsed = PatternInvoiceParser::new().extract("invoice_001", &mock_payload("invoice_001"));
        assert_eq!(parsed.header.vendor_name, "ABC Corporation Ltd");
        assert_eq!(parsed.header.invoice_no, "INV-2024-001");
        assert_eq!(parsed.header.invoice_date, "15/01/2024");
        assert_eq!(parsed.header.grand_total, "1,250.00");
        assert_eq!(parsed.line_items.len(), 2);
        assert_eq!(parsed.line_items[1].description, "Travel Expenses");
    }

    #[tokio::test]
    async fn test_missing_model_falls_back_to_mock() {
        let dir = tempfile::tempdir().unwrap();
        let in_dir = dir.path().join("in");
        let out_dir = dir.path().join("out/raw");
        fs::create_dir_all(&in_dir).unwrap();
        fs::write(in_dir.join("invoice_001.pdf"), "dummy content").unwrap();
        fs::write(in_dir.join("invoice_002.png"), "dummy content").unwrap();

        let runner = runner_without_model(dir.path());
        let batch = runner.run_on_folder(&in_dir, &out_dir).await.unwrap();

        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["invoice_001", "invoice_002"]);
        assert!(out_dir.join("invoice_001.json").exists());
        assert!(matches!(batch["invoice_001"], OcrPayload::WellFormed(_)));
    }

    #[tokio::test]
    async fn test_missing_model_without_fallback_skips_documents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.pdf"), "dummy content").unwrap();

        let mut runner = runner_without_model(dir.path());
        runner.config.mock_fallback = false;
        let batch = runner
            .run_on_folder(dir.path(), &dir.path().join("raw"))
            .await
            .unwrap();

        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_missing_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner_without_model(dir.path());
        let err = runner
            .run_on_folder(&dir.path().join("nope"), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::Ocr(OcrError::InputNotFound(_))));
    }

    #[cfg(unix)]
    fn shell_runner(dir: &Path, script_body: &str, timeout_secs: u64) -> OcrRunner {
        let script = dir.join("model.sh");
        fs::write(&script, script_body).unwrap();
        OcrRunner::new(OcrConfig {
            python: "sh".to_string(),
            script,
            timeout_secs,
            ..OcrConfig::default()
        })
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_model_output_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let in_dir = dir.path().join("in");
        let out_dir = dir.path().join("raw");
        fs::create_dir_all(&in_dir).unwrap();
        fs::write(in_dir.join("scan.png"), "dummy content").unwrap();

        let body = r#"name=$(basename "$4"); name="${name%.*}"
printf '{"blocks":[{"text":"Vendor: Shell Co","bbox":[0,0,1,1]}]}' > "$6/$name.json"
"#;
        let runner = shell_runner(dir.path(), body, 30);
        let batch = runner.run_on_folder(&in_dir, &out_dir).await.unwrap();

        let OcrPayload::WellFormed(result) = &batch["scan"] else {
            panic!("expected well-formed payload");
        };
        assert_eq!(result.text(), "Vendor: Shell Co");
        assert!(result.processing_time >= 0.0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failing_model_uses_mock() {
        let dir = tempfile::tempdir().unwrap();
        let in_dir = dir.path().join("in");
        fs::create_dir_all(&in_dir).unwrap();
        fs::write(in_dir.join("inv_042.pdf"), "dummy content").unwrap();

        let runner = shell_runner(dir.path(), "echo broken >&2\nexit 3\n", 30);
        let batch = runner
            .run_on_folder(&in_dir, &dir.path().join("raw"))
            .await
            .unwrap();

        let OcrPayload::WellFormed(result) = &batch["inv_042"] else {
            panic!("expected mock payload");
        };
        assert!(result.text().contains("INV-2024-042"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_omits_document() {
        let dir = tempfile::tempdir().unwrap();
        let in_dir = dir.path().join("in");
        fs::create_dir_all(&in_dir).unwrap();
        fs::write(in_dir.join("slow.pdf"), "dummy content").unwrap();

        let runner = shell_runner(dir.path(), "sleep 5\n", 1);
        let batch = runner
            .run_on_folder(&in_dir, &dir.path().join("raw"))
            .await
            .unwrap();

        assert!(batch.is_empty());
    }

    #[test]
    fn test_load_raw_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.json"), r#"{"blocks": [{"text": "x"}]}"#).unwrap();
        fs::write(dir.path().join("a.json"), "not json").unwrap();
        fs::write(dir.path().join("c.txt"), "ignored").unwrap();

        let batch = OcrRunner::load_raw_dir(dir.path()).unwrap();
        assert_eq!(batch.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert!(matches!(batch["a"], OcrPayload::Malformed { .. }));
        assert!(matches!(batch["b"], OcrPayload::WellFormed(_)));
    }
}
