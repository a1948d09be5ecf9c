//! Image Command
//!
//! Illustrates one story paragraph, consuming one ticket of the chosen
//! tier. Prints `{status, image_url}` or `{status, error}`.

use console::style;

use crate::cli::util::{LOCAL_USER, print_error_response};
use crate::pipeline::StoryPipeline;
use crate::types::{IllustrationRequest, Result, TicketTier, UserId};

pub async fn run(pipeline: &StoryPipeline, script: &str, tier: TicketTier) -> Result<()> {
    let request = IllustrationRequest {
        user: UserId::from(LOCAL_USER),
        script: script.to_string(),
        tier,
    };

    match pipeline.generate_illustration(&request).await {
        Ok(image_url) => {
            eprintln!("{} illustration generated ({} ticket)", style("✓").green(), tier);
            let body = serde_json::json!({
                "status": "201",
                "image_url": image_url,
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
