//! ecrship run

use crate::publish::Publisher;
use colored::Colorize;

pub async fn handle(publisher: &Publisher) -> anyhow::Result<()> {
    let config = publisher.config();
    let image = config.local_image();

    println!("  → {}", image.cyan());
    let container_id = publisher
        .docker()
        .run_detached(&image, config.local_port)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    println!(
        "  {} started {}",
        "✓".green(),
        container_id.chars().take(12).collect::<String>()
    );
    println!("  → http://localhost:{}", config.local_port);
    Ok(())
}
