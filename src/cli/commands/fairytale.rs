//! Fairytale Command
//!
//! Runs the end-to-end generation pipeline and prints the response
//! envelope: `{status, success, script}` on success, `{status, error}` on
//! an abort or failure.

use console::style;

use crate::cli::util::print_error_response;
use crate::pipeline::{PipelineOutcome, StoryPipeline};
use crate::types::{GenerationRequest, LanguageCode, Result};

pub async fn run(pipeline: &StoryPipeline, subject: &str, target_language: &str) -> Result<()> {
    let target = LanguageCode::new(target_language)?;
    let request = GenerationRequest::new(subject, target);

    match pipeline.generate_fairytale(&request).await {
        Ok(run) => match run.outcome {
            PipelineOutcome::Done { script } => {
                eprintln!("{} fairy tale generated", style("✓").green());
                let body = serde_json::json!({
                    "status": "201",
                    "success": "동화를 성공적으로 생성했습니다.",
                    "script": script,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                Ok(())
            }
            PipelineOutcome::Aborted { reason } => {
                eprintln!("{} generation aborted: {}", style("✗").red(), reason.code());
                let body = serde_json::json!({
                    "status": "400",
                    "error": reason.user_message(),
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
                Ok(())
            }
        },
        Err(err) => {
            print_error_response(&err);
            Err(err)
        }
    }
}
