//! Issue an address on one provider, wait for mail, then clean up.
//!
//! ```text
//! RUST_LOG=tempmail_client=debug cargo run --example demo -- gptmail
//! ```

use std::time::Duration;
use tempmail_client::{
    AddressOptions, Error, InboxIdentity, Provider, ProviderKind, emailmux, gptmail, kyfudao,
    mailtd, normalize_all, tempmail_lol,
};

const POLL_INTERVAL: Duration = Duration::from_secs(5);
const POLL_ATTEMPTS: usize = 12;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let name = std::env::args().nth(1).unwrap_or_else(|| "gptmail".to_string());
    let Some(kind) = ProviderKind::ALL.into_iter().find(|kind| kind.name() == name) else {
        let known: Vec<&str> = ProviderKind::ALL.iter().map(ProviderKind::name).collect();
        eprintln!("unknown provider {name:?}; try one of {}", known.join(", "));
        return Ok(());
    };

    match kind {
        ProviderKind::MailTd => run(mailtd::Client::new()?).await,
        ProviderKind::Emailmux => run(emailmux::Client::new()?).await,
        ProviderKind::Kyfudao => run(kyfudao::Client::new()?).await,
        ProviderKind::TempMailLol => run(tempmail_lol::Client::new()?).await,
        ProviderKind::GptMail => run(gptmail::Client::new()?).await,
    }
}

async fn run<P: Provider>(client: P) -> Result<(), Error> {
    let inbox = client.issue_address(&AddressOptions::new()).await?;
    let address = inbox.address().to_string();
    println!("{}: send mail to {address}", client.kind());

    for _ in 0..POLL_ATTEMPTS {
        let messages = client.list_messages(&inbox).await?;
        let emails = normalize_all(&messages, &address);
        if let Some(email) = emails.first() {
            let from = email
                .from
                .primary()
                .map(|a| a.address.as_str())
                .unwrap_or("unknown sender");
            println!("[{}] {} from {from}", email.created_at, email.subject);

            match client.get_message(&inbox, &email.id).await {
                Ok(raw) => {
                    if let Some(full) = raw.normalize(&address) {
                        let body = if full.text.is_empty() { &full.html } else { &full.text };
                        println!("{body}");
                    }
                }
                Err(e) => tracing::warn!(error = %e, "could not fetch message body"),
            }
            break;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    match client.clear_inbox(&inbox).await {
        Ok(()) => println!("inbox cleared"),
        Err(Error::Unsupported { .. }) => println!("{} keeps mail until it expires", client.kind()),
        Err(e) => return Err(e),
    }
    Ok(())
}
