use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "tndtransfer",
    version,
    about = "Upload a folder to S3 and share it with presigned links"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Default)]
pub struct GlobalArgs {
    /// Bucket name (overrides BUCKET_NAME)
    #[arg(long, global = true, value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// AWS region (overrides AWS_REGION)
    #[arg(long, global = true, value_name = "REGION")]
    pub region: Option<String>,

    /// S3-compatible endpoint such as MinIO (overrides S3_ENDPOINT_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Address objects as `http://host/bucket/key`
    #[arg(long, global = true)]
    pub force_path_style: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Print results as JSON on stdout
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload every file under DIR into a fresh session prefix
    Upload(UploadArgs),
    /// Print one presigned URL per object under PREFIX
    Links(LinksArgs),
    /// Zip every object under PREFIX and print one presigned URL for the archive
    Archive(ArchiveArgs),
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Local folder to upload
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Optional label appended to the session prefix
    #[arg(short, long)]
    pub label: Option<String>,

    /// Also print presigned URLs for the uploaded objects
    #[arg(long)]
    pub share: bool,

    /// Link lifetime in seconds (defaults to SHARE_TTL_SECS)
    #[arg(long, value_name = "SECS")]
    pub ttl: Option<u64>,
}

#[derive(Args, Debug)]
pub struct LinksArgs {
    /// Session prefix printed by `upload`
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Link lifetime in seconds (defaults to SHARE_TTL_SECS)
    #[arg(long, value_name = "SECS")]
    pub ttl: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ArchiveArgs {
    /// Session prefix printed by `upload`
    #[arg(value_name = "PREFIX")]
    pub prefix: String,

    /// Archive name, stored as `temp/<label>-<timestamp>.zip`
    #[arg(short, long)]
    pub label: String,

    /// Link lifetime in seconds (defaults to SHARE_TTL_SECS)
    #[arg(long, value_name = "SECS")]
    pub ttl: Option<u64>,

    /// Name entries by file name only (later duplicates win)
    #[arg(long)]
    pub flat: bool,
}
