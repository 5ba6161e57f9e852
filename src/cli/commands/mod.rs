//! Command execution.
//!
//! Runs either the release itself or its preview and turns failures into an
//! exit code plus recovery suggestions.

mod preview;
mod release;

use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;

use preview::execute_preview;
use release::execute_release;

/// Execute the command described by parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Validate arguments
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&validation_error.to_string());
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);
    let name = if args.preview { "preview" } else { "release" };

    let result = if args.preview {
        execute_preview(&args, &config).await
    } else {
        execute_release(&args, &config).await
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", name, e));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            if !e.is_precondition_failure() {
                config.warning_println(
                    "Steps that already ran were not rolled back; check the version in package.json and your git tags",
                );
            }

            Ok(1)
        }
    }
}
