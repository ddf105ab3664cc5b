//! digipost: send letters and inspect a Digipost account from the shell.
//!
//! Connection settings come from `DIGIPOST_API_URL`, `DIGIPOST_BROKER_ID`
//! and `DIGIPOST_SERVER_CERTIFICATE`; logging from `DIGIPOST_LOG_LEVEL` and
//! `DIGIPOST_LOG_JSON`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use clap::{Args, Parser, Subcommand};
use digipost_client::{
    ClientConfig, DigipostApi, DigipostClient, DocumentEventsQuery, InboxPage, MAX_INBOX_PAGE_SIZE,
};
use digipost_representations::{Document, FileType, Message, SenderId};
use digipost_telemetry::{init_logging, TelemetryConfig};
use tracing::{debug, info};
use uuid::Uuid;

/// Environment variable holding the key passphrase, kept off the command line.
const PASSPHRASE_VAR: &str = "DIGIPOST_KEY_PASSPHRASE";

/// Digipost command-line client
#[derive(Parser, Debug)]
#[command(name = "digipost", version)]
#[command(about = "Send letters and inspect a Digipost account")]
struct Cli {
    /// Broker credential: PKCS#12 container or PEM private key
    #[arg(short, long)]
    key: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one document to one recipient
    Send(SendArgs),
    /// List documents in a sender's inbox
    Inbox {
        /// Sender whose inbox to read (defaults to the broker)
        #[arg(long)]
        sender: Option<u64>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 100)]
        limit: u32,
    },
    /// Fetch document events in a time window
    Events {
        /// Window start, RFC 3339
        #[arg(long, value_parser = parse_time)]
        from: DateTime<FixedOffset>,
        /// Window end, RFC 3339 (defaults to now)
        #[arg(long, value_parser = parse_time)]
        to: Option<DateTime<FixedOffset>>,
        /// Organisation number to filter on
        #[arg(long)]
        organisation: Option<String>,
        /// Part id within the organisation
        #[arg(long, requires = "organisation")]
        part_id: Option<String>,
        #[arg(long, default_value_t = 0)]
        offset: u32,
        #[arg(long, default_value_t = 100)]
        max_results: u32,
    },
    /// Show the delivery status of a sent document
    Status {
        uuid: Uuid,
        #[arg(long)]
        sender: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct SendArgs {
    /// File to send; its extension is the file type
    file: PathBuf,

    #[arg(short, long)]
    subject: String,

    /// Message id (defaults to a random UUID)
    #[arg(long)]
    message_id: Option<String>,

    #[command(flatten)]
    recipient: RecipientArgs,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct RecipientArgs {
    /// Digipost address, e.g. ola.nordmann#1234
    #[arg(long)]
    digipost_address: Option<String>,

    /// Norwegian personal identification number
    #[arg(long)]
    pin: Option<String>,

    /// Organisation number
    #[arg(long)]
    organisation_number: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&TelemetryConfig::from_env())?;

    let config = ClientConfig::from_env().context("reading client configuration")?;
    let broker = SenderId(config.broker_id);
    let passphrase = std::env::var(PASSPHRASE_VAR).ok();
    let client = DigipostClient::from_key_file(config, &cli.key, passphrase.as_deref())
        .with_context(|| format!("loading key {}", cli.key.display()))?;
    debug!(broker = broker.0, key = %cli.key.display(), "Client ready");

    match cli.command {
        Command::Send(args) => send(&client, args).await,
        Command::Inbox {
            sender,
            offset,
            limit,
        } => {
            if limit > MAX_INBOX_PAGE_SIZE {
                bail!("--limit must be at most {MAX_INBOX_PAGE_SIZE}");
            }
            let sender = sender.map(SenderId).unwrap_or(broker);
            let inbox = client.inbox(sender, InboxPage::new(offset, limit)?).await?;
            info!(sender = sender.0, offset, documents = inbox.documents.len(), "Inbox listed");
            for document in &inbox.documents {
                println!(
                    "{}\t{}\t{}\t{}",
                    document.id, document.delivery_time, document.sender, document.subject
                );
            }
            Ok(())
        }
        Command::Events {
            from,
            to,
            organisation,
            part_id,
            offset,
            max_results,
        } => {
            let to = to.unwrap_or_else(|| Utc::now().fixed_offset());
            let mut query = DocumentEventsQuery::new(from, to).page(offset, max_results);
            if let Some(organisation) = organisation {
                query = query.for_organisation(organisation, part_id);
            }
            let events = client.document_events(&query).await?;
            info!(offset, events = events.events.len(), "Document events fetched");
            for event in &events.events {
                println!("{}\t{}\t{}", event.created, event.uuid, event.event_type);
            }
            if events.next_link().is_some() {
                println!("(more events after offset {})", offset + max_results);
            }
            Ok(())
        }
        Command::Status { uuid, sender } => {
            let sender = sender.map(SenderId).unwrap_or(broker);
            let status = client.document_status_by_uuid(sender, uuid).await?;
            info!(document = %uuid, status = %status.delivery_status, "Document status fetched");
            println!("{}\t{}", status.uuid, status.delivery_status);
            if let Some(delivered) = status.delivered {
                println!("delivered {delivered}");
            }
            Ok(())
        }
    }
}

async fn send(client: &DigipostClient, args: SendArgs) -> Result<()> {
    let uuid = Uuid::new_v4();
    let message_id = args.message_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let document = Document::new(uuid, args.subject, file_type(&args.file)?);

    let builder = Message::builder(message_id.clone(), document);
    let RecipientArgs {
        digipost_address,
        pin,
        organisation_number,
    } = args.recipient;
    let builder = match (digipost_address, pin, organisation_number) {
        (Some(address), _, _) => builder.digipost_address(address),
        (_, Some(pin), _) => builder.personal_identification_number(pin),
        (_, _, Some(number)) => builder.organisation_number(number),
        (None, None, None) => bail!("a recipient is required"),
    };

    let content = tokio::fs::File::open(&args.file)
        .await
        .with_context(|| format!("opening {}", args.file.display()))?;

    let mut delivery = client.create_message(builder.build()?).await?;
    delivery.add_content(uuid, content).await?;
    let sent = delivery.send().await?;
    info!(
        message_id = %sent.message_id,
        document = %uuid,
        channel = %sent.delivery_method,
        "Message sent"
    );
    println!(
        "{}\t{}\t{}",
        sent.message_id, sent.delivery_method, sent.status
    );
    Ok(())
}

fn file_type(path: &Path) -> Result<FileType> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(extension) if !extension.is_empty() => Ok(FileType::new(extension)),
        _ => bail!("{} has no file extension", path.display()),
    }
}

fn parse_time(value: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(value).map_err(|e| format!("{value}: {e}"))
}
