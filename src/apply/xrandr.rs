// SPDX-License-Identifier: GPL-3.0-only
//! Applies directives by running the `xrandr` command line tool once per pass

use std::process::Command;

use super::Apply;
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::layout::Directive;

/// Runs one `xrandr` invocation covering every output
#[derive(Debug, Clone)]
pub struct XrandrCommand {
    program: String,
    display: Option<String>,
    dry_run: bool,
}

impl XrandrCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            display: None,
            dry_run: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            display: config.display.clone(),
            dry_run: config.dry_run,
            ..Self::new(config.xrandr_command.clone())
        }
    }

    /// Arguments for one invocation, in directive order
    pub fn arguments(directives: &[Directive]) -> Vec<String> {
        let mut args = Vec::with_capacity(directives.len() * 5);

        for directive in directives {
            args.push("--output".to_string());
            args.push(directive.output().to_string());
            match directive {
                Directive::SetMode { resolution, .. } => {
                    args.push("--mode".to_string());
                    args.push(resolution.to_string());
                    // Every output shows the same picture
                    args.push("--pos".to_string());
                    args.push("0x0".to_string());
                }
                Directive::SetAuto { .. } => args.push("--auto".to_string()),
                Directive::Disable { .. } => args.push("--off".to_string()),
            }
        }

        args
    }
}

impl Apply for XrandrCommand {
    fn apply(&mut self, directives: &[Directive]) -> Result<()> {
        let args = Self::arguments(directives);
        let command_line = format!("{} {}", self.program, args.join(" "));

        if self.dry_run {
            info!("dry run, not running: {}", command_line);
            return Ok(());
        }

        debug!("Running {}", command_line);
        let mut command = Command::new(&self.program);
        command.args(&args);
        if let Some(display) = &self.display {
            command.env("DISPLAY", display);
        }

        let output = command
            .output()
            .map_err(|e| AppError::Apply(format!("could not run {}: {}", self.program, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(AppError::Apply(format!(
                "`{}` exited with {}: {}",
                command_line,
                output.status,
                stderr.trim()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Resolution;

    fn create_test_directives() -> Vec<Directive> {
        vec![
            Directive::SetMode {
                output: "eDP-1".to_string(),
                resolution: Resolution::new(1920, 1080),
            },
            Directive::SetAuto { output: "DP-1".to_string() },
            Directive::Disable { output: "HDMI-1".to_string() },
        ]
    }

    #[test]
    fn test_arguments() {
        let args = XrandrCommand::arguments(&create_test_directives());
        assert_eq!(
            args,
            [
                "--output", "eDP-1", "--mode", "1920x1080", "--pos", "0x0",
                "--output", "DP-1", "--auto",
                "--output", "HDMI-1", "--off",
            ]
        );
    }

    #[test]
    fn test_successful_command() {
        let mut applier = XrandrCommand::new("true");
        assert!(applier.apply(&create_test_directives()).is_ok());
    }

    #[test]
    fn test_failing_command() {
        let mut applier = XrandrCommand::new("false");
        let err = applier.apply(&create_test_directives()).unwrap_err();
        assert!(matches!(err, AppError::Apply(_)));
    }

    #[test]
    fn test_missing_program() {
        let mut applier = XrandrCommand::new("/nonexistent/xrandr");
        assert!(matches!(
            applier.apply(&create_test_directives()),
            Err(AppError::Apply(_))
        ));
    }

    #[test]
    fn test_dry_run_never_spawns() {
        let mut applier = XrandrCommand {
            program: "/nonexistent/xrandr".to_string(),
            display: None,
            dry_run: true,
        };
        assert!(applier.apply(&create_test_directives()).is_ok());
    }
}
