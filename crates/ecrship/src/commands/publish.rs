//! ecrship publish

use crate::publish::{Progress, PublishReport, Publisher, Step, StepOutcome, StepStatus};
use colored::Colorize;
use std::path::Path;

/// ステップの開始と終了を表示
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn started(&mut self, step: Step) {
        println!();
        println!(
            "{}",
            format!("[{}/{}] {}...", step.number(), Step::ALL.len(), step)
                .blue()
                .bold()
        );
    }

    fn finished(&mut self, outcome: &StepOutcome) {
        match &outcome.status {
            StepStatus::Done(Some(detail)) => println!("  {} {}", "✓".green(), detail.cyan()),
            StepStatus::Done(None) => println!("  {} done", "✓".green()),
            StepStatus::Skipped(reason) => {
                println!("  {} skipped ({})", "-".dimmed(), reason.dimmed())
            }
            StepStatus::Failed(message) => eprintln!("  {} {}", "✗".red().bold(), message),
        }
    }
}

pub async fn handle(publisher: &Publisher, source: Option<&Path>, yes: bool) -> anyhow::Result<()> {
    let config = publisher.config();

    println!("{}", "Publishing image to Amazon ECR...".green());
    super::print_config_summary(config, source);

    if config.prune && !yes {
        println!();
        println!(
            "{}",
            "Warning: the prune step removes ALL unused local images and the whole build cache, \
             not only this application's."
                .yellow()
        );
        anyhow::bail!(
            "prune not confirmed: re-run as `ecrship publish --yes`, or pass --no-prune to keep the local cache"
        );
    }

    match publisher.run(&mut ConsoleProgress).await {
        Ok(report) => {
            print_summary(&report);
            let failed = report.failed().count();
            if failed > 0 {
                return Err(anyhow::anyhow!(
                    "{} of {} steps failed",
                    failed,
                    report.steps.len()
                ));
            }
            Ok(())
        }
        Err(err) => {
            let completed = err
                .report
                .steps
                .iter()
                .filter(|o| matches!(o.status, StepStatus::Done(_)))
                .count();
            eprintln!();
            eprintln!("{} {}", "✗".red().bold(), err.hint);
            eprintln!("  {} step(s) completed before the failure", completed);
            Err(anyhow::anyhow!(
                "publish stopped at step {}/{} ({})",
                err.step.number(),
                Step::ALL.len(),
                err.step
            ))
        }
    }
}

fn print_summary(report: &PublishReport) {
    println!();
    if report.is_success() {
        println!("{}", "✓ Image published!".green().bold());
    } else {
        println!("{}", "⚠ Publish finished with failures".yellow().bold());
        for outcome in report.failed() {
            if let StepStatus::Failed(message) = &outcome.status {
                println!("  {} {}: {}", "✗".red(), outcome.step, message);
            }
        }
    }

    if let Some(uri) = &report.image_uri {
        println!();
        println!("{}", "Result:".bold());
        println!("  {}", uri.cyan());
    }
}
