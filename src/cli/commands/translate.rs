//! Translate Command
//!
//! Translates a story detail page (title plus paragraphs) to a target
//! language. Prints `{status, translated_title, translated_scripts}`.

use console::style;

use crate::cli::util::print_error_response;
use crate::pipeline::StoryPipeline;
use crate::types::{LanguageCode, Result};

pub async fn run(
    pipeline: &StoryPipeline,
    title: &str,
    paragraphs: &[String],
    target_language: &str,
) -> Result<()> {
    let target = LanguageCode::new(target_language)?;

    match pipeline.translate_story(title, paragraphs, &target).await {
        Ok(story) => {
            eprintln!(
                "{} story translated to {}",
                style("✓").green(),
                target.as_str()
            );
            let body = serde_json::json!({
                "status": "200",
                "translated_title": story.title,
                "translated_scripts": story.paragraphs,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
            Ok(())
        }
        Err(err) => {
            print_error_response(&err);
            Err(err)
        }
    }
}
