//! Pipeline driver: read JSONL record files from an input directory, run
//! each record through classification then (for clarifying questions)
//! rating, and write the annotated records to the output directory.
//!
//! Processing is strictly sequential: files in sorted name order, lines in
//! file order. A failure on one record leaves its annotation fields absent
//! and never aborts the rest of the run.

use crate::classify::Classifier;
use crate::config::RunConfig;
use crate::errors::ConfigError;
use crate::judge::Jury;
use crate::record::{Label, Record};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Read all records from every file (no per-file limit).
pub const UNBOUNDED: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    /// Input files processed.
    pub files: usize,
    /// Records written to output.
    pub records: usize,
    /// Records that went through the jury.
    pub rated: usize,
    /// Records whose annotation failed plus input lines that would not parse.
    pub failed: usize,
}

pub struct Pipeline {
    classifier: Classifier,
    jury: Jury,
}

impl Pipeline {
    pub fn new(classifier: Classifier, jury: Jury) -> Self {
        Self { classifier, jury }
    }

    pub fn from_config(cfg: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(Classifier::from_config(cfg)?, Jury::from_config(cfg)?))
    }

    /// Process every `*.jsonl` file under `input_dir`, writing one output
    /// file of the same name under `output_dir`. At most `samples` records
    /// per file ([`UNBOUNDED`] for all).
    pub async fn run(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        samples: i64,
    ) -> anyhow::Result<PipelineSummary> {
        fs::create_dir_all(output_dir)?;

        let mut files: Vec<_> = fs::read_dir(input_dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "jsonl"))
            .collect();
        files.sort();

        let mut summary = PipelineSummary::default();
        for path in files {
            let file_name = path
                .file_name()
                .ok_or_else(|| anyhow::anyhow!("input path has no file name: {}", path.display()))?;
            let out_path = output_dir.join(file_name);
            tracing::info!(file = %path.display(), "processing input file");

            let mut reader = BufReader::new(File::open(&path)?);
            let mut writer = BufWriter::new(File::create(&out_path)?);
            let mut taken: i64 = 0;
            let mut line_no = 0usize;
            let mut buf = Vec::new();

            loop {
                if samples != UNBOUNDED && taken >= samples {
                    break;
                }
                // Read raw bytes so one bad line (invalid UTF-8, transient
                // read error) is skippable instead of aborting the run.
                buf.clear();
                match reader.read_until(b'\n', &mut buf) {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(
                            file = %path.display(),
                            line = line_no + 1,
                            error = %err,
                            "read error; abandoning the rest of this file"
                        );
                        summary.failed += 1;
                        break;
                    }
                }
                line_no += 1;
                let line = match std::str::from_utf8(&buf) {
                    Ok(line) => line,
                    Err(err) => {
                        tracing::warn!(
                            file = %path.display(),
                            line = line_no,
                            error = %err,
                            "skipping non-UTF-8 line"
                        );
                        summary.failed += 1;
                        continue;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                let mut record: Record = match serde_json::from_str(line) {
                    Ok(record) => record,
                    Err(err) => {
                        tracing::warn!(
                            file = %path.display(),
                            line = line_no,
                            error = %err,
                            "skipping malformed record line"
                        );
                        summary.failed += 1;
                        continue;
                    }
                };
                taken += 1;

                if !self.annotate(&mut record).await {
                    summary.failed += 1;
                } else if record.label == Some(Label::ClarifyingQuestion) {
                    summary.rated += 1;
                }

                serde_json::to_writer(&mut writer, &record)?;
                writer.write_all(b"\n")?;
                summary.records += 1;
            }
            writer.flush()?;
            summary.files += 1;
            tracing::info!(file = %out_path.display(), "wrote annotated records");
        }

        tracing::info!(
            files = summary.files,
            records = summary.records,
            rated = summary.rated,
            failed = summary.failed,
            "pipeline run complete"
        );
        Ok(summary)
    }

    /// Annotate one record in place. Returns false when a stage error
    /// aborted the annotation; the record is still written as-is.
    async fn annotate(&self, record: &mut Record) -> bool {
        let label = match self.classifier.classify(&record.reply).await {
            Ok(label) => label,
            Err(err) => {
                tracing::warn!(id = %record.id, error = %err, "classification aborted");
                record.note = Some(format!("classification failed: {err}"));
                return false;
            }
        };
        record.label = Some(label);
        record.evaluated_at = Some(chrono::Utc::now().to_rfc3339());

        if label != Label::ClarifyingQuestion {
            record.note = Some(format!("scoring skipped: reply classified as {label}"));
            return true;
        }

        let modified = record.modified_or_problem().to_string();
        match self.jury.score(&record.problem, &modified, &record.reply).await {
            Ok(verdict) => {
                record.votes = verdict.votes;
                record.final_score = Some(verdict.final_score);
                record.note = Some(verdict.note);
                true
            }
            Err(err) => {
                // Template rendering cannot fail for the built-in juror
                // prompt; treat it like any other aborted stage if it does.
                tracing::warn!(id = %record.id, error = %err, "rating aborted");
                record.note = Some(format!("rating failed: {err}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CompletionError;
    use crate::judge::{Juror, JuryOptions};
    use crate::providers::llm::testing::ScriptedClient;
    use crate::providers::llm::SamplingParams;
    use crate::record::FinalScore;
    use std::sync::Arc;

    const CLARIFY: &str = r#"{"classification": "Clarifying Question"}"#;
    const SOLUTION: &str = r#"{"classification": "Code Solution"}"#;

    fn write_input(dir: &Path, name: &str, lines: &[&str]) {
        fs::write(dir.join(name), lines.join("\n")).unwrap();
    }

    fn read_output(dir: &Path, name: &str) -> Vec<Record> {
        fs::read_to_string(dir.join(name))
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn pipeline(
        classifier_replies: Vec<Result<String, CompletionError>>,
        judge_replies: &[&str],
    ) -> (Pipeline, Arc<ScriptedClient>) {
        let classifier_client = ScriptedClient::new("openai", classifier_replies);
        let judge_client = ScriptedClient::replying("openai", judge_replies);
        let classifier = Classifier::new(
            classifier_client,
            SamplingParams {
                temperature: 0.0,
                max_tokens: 50,
            },
        );
        let jury = Jury::new(
            vec![Juror::new("judge-a", judge_client.clone())],
            JuryOptions::default(),
        );
        (Pipeline::new(classifier, jury), judge_client)
    }

    fn ok(text: &str) -> Result<String, CompletionError> {
        Ok(text.to_string())
    }

    #[tokio::test]
    async fn clarifying_question_record_gets_label_votes_and_score() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "sample.jsonl",
            &[r#"{"id":"1","problem":"Write a function to sort a list","reply":"Can you clarify whether the list may contain duplicates?"}"#],
        );
        let (pipeline, _) = pipeline(vec![ok(CLARIFY)], &[r#"{"score": 4}"#]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary, PipelineSummary { files: 1, records: 1, rated: 1, failed: 0 });

        let out = read_output(tmp_out.path(), "sample.jsonl");
        assert_eq!(out[0].label, Some(Label::ClarifyingQuestion));
        assert_eq!(out[0].votes.len(), 1);
        assert_eq!(out[0].final_score, Some(FinalScore::Score(4)));
        assert!(out[0].evaluated_at.is_some());
    }

    #[tokio::test]
    async fn non_question_records_never_reach_the_jury() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "data.jsonl",
            &[
                r#"{"id":"1","problem":"p","reply":"```python\nprint(1)\n```"}"#,
                r#"{"id":"2","problem":"p","reply":"   "}"#,
            ],
        );
        let (pipeline, judge_client) = pipeline(vec![ok(SOLUTION)], &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.rated, 0);
        assert_eq!(judge_client.call_count(), 0);

        let out = read_output(tmp_out.path(), "data.jsonl");
        assert_eq!(out[0].label, Some(Label::DirectAttempt));
        assert!(out[0].votes.is_empty());
        assert!(out[0].final_score.is_none());
        assert_eq!(out[1].label, Some(Label::EmptyReply));
        assert!(out[1].note.as_deref().unwrap().contains("scoring skipped"));
    }

    #[tokio::test]
    async fn sample_limit_takes_first_records_in_order() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "data.jsonl",
            &[
                r#"{"id":"1","problem":"p","reply":"```code```"}"#,
                r#"{"id":"2","problem":"p","reply":"```code```"}"#,
                r#"{"id":"3","problem":"p","reply":"```code```"}"#,
            ],
        );
        let (pipeline, _) = pipeline(vec![ok(SOLUTION), ok(SOLUTION)], &[]);

        let summary = pipeline.run(tmp_in.path(), tmp_out.path(), 2).await.unwrap();
        assert_eq!(summary.records, 2);
        let out = read_output(tmp_out.path(), "data.jsonl");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, "1");
        assert_eq!(out[1].id, "2");
    }

    #[tokio::test]
    async fn unbounded_sample_count_takes_everything() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "data.jsonl",
            &[
                r#"{"id":"1","problem":"p","reply":"```code```"}"#,
                r#"{"id":"2","problem":"p","reply":"```code```"}"#,
            ],
        );
        let (pipeline, _) = pipeline(vec![ok(SOLUTION), ok(SOLUTION)], &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(read_output(tmp_out.path(), "data.jsonl").len(), 2);
    }

    #[tokio::test]
    async fn fatal_error_on_one_record_does_not_stop_the_next() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "data.jsonl",
            &[
                r#"{"id":"1","problem":"p","reply":"a genuine reply"}"#,
                r#"{"id":"2","problem":"p","reply":"another genuine reply"}"#,
            ],
        );
        let classifier_replies = vec![
            Err(CompletionError::Fatal {
                provider: "openai".into(),
                status: Some(401),
                message: "invalid api key".into(),
            }),
            ok(SOLUTION),
        ];
        let (pipeline, _) = pipeline(classifier_replies, &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.records, 2);
        assert_eq!(summary.failed, 1);

        let out = read_output(tmp_out.path(), "data.jsonl");
        // Record 1: annotation aborted, fields absent, note explains why.
        assert_eq!(out[0].label, None);
        assert!(out[0].votes.is_empty());
        assert!(out[0].note.as_deref().unwrap().contains("classification failed"));
        // Record 2 still processed and labeled.
        assert_eq!(out[1].label, Some(Label::DirectAttempt));
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped_without_aborting_the_file() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(
            tmp_in.path(),
            "data.jsonl",
            &[
                "{not json at all",
                r#"{"id":"2","problem":"p","reply":"```code```"}"#,
            ],
        );
        let (pipeline, _) = pipeline(vec![ok(SOLUTION)], &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.records, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(read_output(tmp_out.path(), "data.jsonl")[0].id, "2");
    }

    #[tokio::test]
    async fn non_utf8_line_is_skipped_and_later_files_still_process() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(br#"{"id":"1","problem":"p","reply":"```code```"}"#);
        bytes.extend_from_slice(b"\n\xFF\xFE\n");
        bytes.extend_from_slice(br#"{"id":"2","problem":"p","reply":"```code```"}"#);
        bytes.push(b'\n');
        fs::write(tmp_in.path().join("a.jsonl"), bytes).unwrap();
        write_input(
            tmp_in.path(),
            "b.jsonl",
            &[r#"{"id":"3","problem":"p","reply":"```code```"}"#],
        );
        let (pipeline, _) = pipeline(vec![ok(SOLUTION), ok(SOLUTION), ok(SOLUTION)], &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.files, 2);
        assert_eq!(summary.records, 3);
        assert_eq!(summary.failed, 1);

        // Both records around the bad line survive, and the next file is
        // still processed.
        let a = read_output(tmp_out.path(), "a.jsonl");
        assert_eq!(a.len(), 2);
        assert_eq!(a[0].id, "1");
        assert_eq!(a[1].id, "2");
        assert_eq!(read_output(tmp_out.path(), "b.jsonl")[0].id, "3");
    }

    #[tokio::test]
    async fn files_process_in_sorted_name_order() {
        let tmp_in = tempfile::tempdir().unwrap();
        let tmp_out = tempfile::tempdir().unwrap();
        write_input(tmp_in.path(), "b.jsonl", &[r#"{"id":"b1","problem":"p","reply":"```x```"}"#]);
        write_input(tmp_in.path(), "a.jsonl", &[r#"{"id":"a1","problem":"p","reply":"```x```"}"#]);
        write_input(tmp_in.path(), "notes.txt", &["ignored"]);
        let (pipeline, _) = pipeline(vec![ok(SOLUTION), ok(SOLUTION)], &[]);

        let summary = pipeline
            .run(tmp_in.path(), tmp_out.path(), UNBOUNDED)
            .await
            .unwrap();
        assert_eq!(summary.files, 2);
        assert!(tmp_out.path().join("a.jsonl").exists());
        assert!(tmp_out.path().join("b.jsonl").exists());
        assert!(!tmp_out.path().join("notes.txt").exists());
    }
}
