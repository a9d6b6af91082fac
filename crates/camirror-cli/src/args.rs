use std::path::PathBuf;

use clap::{Parser, Subcommand};

use camirror_core::MirrorConfig;

#[derive(Parser)]
#[command(
    name = "camirror",
    version,
    about = "Mirror a remote certificate collection and emit a concatenated trust-anchor bundle"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Fetch the record list, mirror all attachments, and write the bundle
    Sync(SyncArgs),
}

#[derive(Parser, Debug)]
pub struct SyncArgs {
    /// Destination directory. Must already exist; files in it may be overwritten.
    #[arg(long, env = "CAMIRROR_DEST_DIR")]
    pub dest_dir: PathBuf,

    /// Records endpoint URL
    #[arg(long, env = "CAMIRROR_RECORDS_URL")]
    pub records_url: Option<String>,

    /// Attachment CDN base URL (must end with a slash)
    #[arg(long, env = "CAMIRROR_ATTACHMENT_BASE_URL")]
    pub attachment_base_url: Option<String>,

    /// Contact email embedded in the User-Agent, so the remote host can
    /// reach you if the crawler misbehaves
    #[arg(long, env = "CAMIRROR_CONTACT_EMAIL")]
    pub contact_email: Option<String>,

    /// Courtesy delay before every request, in seconds
    #[arg(long, env = "CAMIRROR_REQUEST_DELAY")]
    pub request_delay: Option<u64>,

    /// Bundle filename, relative to the destination directory
    #[arg(long)]
    pub bundle_filename: Option<String>,
}

impl SyncArgs {
    pub fn into_config(self) -> MirrorConfig {
        let mut config = MirrorConfig::default().with_dest_dir(self.dest_dir);

        if let Some(url) = self.records_url {
            config = config.with_records_url(url);
        }
        if let Some(url) = self.attachment_base_url {
            config = config.with_attachment_base_url(url);
        }
        if let Some(email) = self.contact_email {
            config = config.with_contact_email(email);
        }
        if let Some(secs) = self.request_delay {
            config = config.with_request_delay_secs(secs);
        }
        if let Some(name) = self.bundle_filename {
            config = config.with_bundle_filename(name);
        }

        config
    }
}
