use futures::StreamExt;
use qaffee_http::{QaffeeClient, DEFAULT_WATCH_INTERVAL};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api = QaffeeClient::from_env().map_err(anyhow::Error::msg)?;
    let email = std::env::var("QAFFEE_EMAIL")?;
    let password = std::env::var("QAFFEE_PASSWORD")?;

    let login = api.auth().login(&email, &password).await?;
    println!("signed in as {}", login.user.email);

    let items = api.menu().items().await?;
    println!("{items:#}");

    if let Some(order_id) = std::env::args().nth(1).and_then(|arg| arg.parse().ok()) {
        let mut updates = Box::pin(api.orders().watch(order_id, DEFAULT_WATCH_INTERVAL));
        while let Some(snapshot) = updates.next().await {
            println!("order {order_id}: {}", snapshot?.status);
        }
    }

    Ok(())
}
