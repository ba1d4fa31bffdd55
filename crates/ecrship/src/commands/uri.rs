//! ecrship uri

use crate::publish::Publisher;

/// イメージURIを出力する。stdoutには他に何も書かない
pub async fn handle(publisher: &Publisher) -> anyhow::Result<()> {
    let config = publisher.config();
    let registry = match &config.account_id {
        Some(account) => publisher.registry(account),
        None => publisher
            .aws()
            .own_registry()
            .await
            .map_err(|e| anyhow::anyhow!(e.user_message()))?,
    };

    println!("{}", registry.image_uri(&config.app_name, &config.tag));
    Ok(())
}
