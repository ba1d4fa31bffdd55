//! ecrship plan

use crate::publish::{Publisher, Step};
use colored::Colorize;
use std::path::Path;

pub fn handle(publisher: &Publisher, source: Option<&Path>) {
    println!("{}", "Planned commands (nothing is executed):".green());
    super::print_config_summary(publisher.config(), source);

    let mut current: Option<Step> = None;
    for (step, spec) in publisher.plan() {
        if current != Some(step) {
            println!();
            println!(
                "{}",
                format!("[{}/{}] {}", step.number(), Step::ALL.len(), step).bold()
            );
            current = Some(step);
        }

        if spec.stdin.is_some() {
            println!("  $ {} {}", spec, "(password on stdin)".dimmed());
        } else {
            println!("  $ {}", spec);
        }
    }

    if publisher.config().account_id.is_none() {
        println!();
        println!(
            "{}",
            "<account-id> is resolved at run time; pass --account-id to fill it in.".dimmed()
        );
    }
}
