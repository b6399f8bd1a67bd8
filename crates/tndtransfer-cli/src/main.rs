mod args;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use args::{ArchiveArgs, Cli, Commands, GlobalArgs, LinksArgs, UploadArgs};
use tndtransfer_core::app::{AppBuilder, TransferApp};
use tndtransfer_core::config::{self, TransferConfig};
use tndtransfer_core::domain::{
    EntryNaming, FailedUpload, FolderUpload, PresignTtl, SessionLabel, SessionPrefix,
    TransferError, UploadedObject,
};
use tndtransfer_core::impls::S3BlobStore;
use tndtransfer_core::ports::TracingProgress;

/// ログは stderr、結果は stdout に出す
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// CLI の指定 > 環境変数 (.env を含む) の順で設定を決める
fn load_config(global: &GlobalArgs) -> anyhow::Result<TransferConfig> {
    let force_path_style = global.force_path_style.then(|| "true".to_string());
    TransferConfig::from_env_with(|name| match name {
        config::BUCKET_NAME => global.bucket.clone(),
        config::AWS_REGION => global.region.clone(),
        config::S3_ENDPOINT_URL => global.endpoint_url.clone(),
        config::S3_FORCE_PATH_STYLE => force_path_style.clone(),
        _ => None,
    })
    .context("failed to load configuration")
}

fn ttl_or_default(secs: Option<u64>, config: &TransferConfig) -> anyhow::Result<PresignTtl> {
    match secs {
        Some(secs) => PresignTtl::from_secs(secs).context("invalid --ttl"),
        None => Ok(config.default_ttl),
    }
}

async fn build_app(config: &TransferConfig, naming: EntryNaming) -> anyhow::Result<TransferApp> {
    let store = S3BlobStore::connect(&config.s3_options()).await;
    let app = AppBuilder::new()
        .store(Arc::new(store))
        .bucket(config.bucket.clone())
        .progress(Arc::new(TracingProgress))
        .entry_naming(naming)
        .default_ttl(config.default_ttl)
        .build()?;
    Ok(app)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_links(urls: &BTreeMap<String, String>, json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(urls);
    }
    for (key, url) in urls {
        println!("{key}\t{url}");
    }
    Ok(())
}

/// 途中まで送ったアップロードの報告
///
/// prefix を失うと送信済みの object に辿り着けないので、失敗時も必ず出す。
#[derive(Debug, Serialize)]
struct UploadFailure<'a> {
    prefix: &'a SessionPrefix,
    uploaded: &'a [UploadedObject],
    failed: &'a [FailedUpload],
    error: String,
}

impl<'a> UploadFailure<'a> {
    fn from_error(err: &'a TransferError) -> Option<Self> {
        match err {
            TransferError::PartialUpload {
                prefix,
                uploaded,
                failed,
            } => Some(Self {
                prefix,
                uploaded,
                failed,
                error: err.to_string(),
            }),
            TransferError::UploadAborted {
                prefix, uploaded, ..
            } => Some(Self {
                prefix,
                uploaded,
                failed: &[],
                error: err.to_string(),
            }),
            _ => None,
        }
    }
}

fn report_upload_failure(err: TransferError, dir: &Path, json: bool) -> anyhow::Error {
    if let Some(report) = UploadFailure::from_error(&err) {
        if json {
            if let Err(e) = print_json(&report) {
                return e;
            }
        } else {
            println!("{}", report.prefix);
            for failure in report.failed {
                eprintln!("failed: {} ({})", failure.local_path.display(), failure.reason);
            }
            eprintln!(
                "{} file(s) already uploaded remain under {}",
                report.uploaded.len(),
                report.prefix
            );
        }
    }
    anyhow::Error::new(err).context(format!("failed to upload {}", dir.display()))
}

async fn run_upload(
    app: &TransferApp,
    args: UploadArgs,
    ttl: PresignTtl,
    json: bool,
) -> anyhow::Result<()> {
    let upload = match app
        .uploader
        .upload_folder(&args.dir, args.label.as_deref())
        .await
    {
        Ok(upload) => upload,
        Err(e) => return Err(report_upload_failure(e, &args.dir, json)),
    };

    let urls = if args.share {
        Some(app.links.list_presigned_urls(&upload.prefix, ttl).await?)
    } else {
        None
    };

    if json {
        #[derive(Serialize)]
        struct UploadReport<'a> {
            #[serde(flatten)]
            upload: &'a FolderUpload,
            #[serde(skip_serializing_if = "Option::is_none")]
            urls: Option<&'a BTreeMap<String, String>>,
        }
        return print_json(&UploadReport {
            upload: &upload,
            urls: urls.as_ref(),
        });
    }

    println!("{}", upload.prefix);
    println!(
        "uploaded {} file(s), {} byte(s)",
        upload.uploaded.len(),
        upload.total_bytes()
    );
    if let Some(urls) = &urls {
        print_links(urls, false)?;
    }
    Ok(())
}

async fn run_links(
    app: &TransferApp,
    args: LinksArgs,
    ttl: PresignTtl,
    json: bool,
) -> anyhow::Result<()> {
    let prefix = SessionPrefix::parse(&args.prefix)?;
    let urls = app.links.list_presigned_urls(&prefix, ttl).await?;
    if urls.is_empty() {
        tracing::warn!(prefix = %prefix, "no objects found");
    }
    print_links(&urls, json)
}

async fn run_archive(
    app: &TransferApp,
    args: ArchiveArgs,
    ttl: PresignTtl,
    json: bool,
) -> anyhow::Result<()> {
    let prefix = SessionPrefix::parse(&args.prefix)?;
    let label = SessionLabel::required(&args.label)?;
    let link = app
        .links
        .build_archive_link(&prefix, &label, ttl)
        .await
        .with_context(|| format!("failed to build archive for {prefix}"))?;

    if json {
        return print_json(&link);
    }
    println!("{}", link.url);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.log_json);

    let config = load_config(&cli.global)?;
    let json = cli.global.json;

    match cli.command {
        Commands::Upload(args) => {
            let ttl = ttl_or_default(args.ttl, &config)?;
            let app = build_app(&config, EntryNaming::default()).await?;
            run_upload(&app, args, ttl, json).await
        }
        Commands::Links(args) => {
            let ttl = ttl_or_default(args.ttl, &config)?;
            let app = build_app(&config, EntryNaming::default()).await?;
            run_links(&app, args, ttl, json).await
        }
        Commands::Archive(args) => {
            let ttl = ttl_or_default(args.ttl, &config)?;
            let naming = if args.flat {
                EntryNaming::BaseName
            } else {
                EntryNaming::RelativePath
            };
            let app = build_app(&config, naming).await?;
            run_archive(&app, args, ttl, json).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn prefix() -> SessionPrefix {
        SessionPrefix::parse("abc/demo/").unwrap()
    }

    fn sent() -> Vec<UploadedObject> {
        vec![UploadedObject {
            local_path: "a.txt".into(),
            key: "abc/demo/a.txt".into(),
            bytes: 5,
        }]
    }

    #[test]
    fn partial_upload_is_reported_with_prefix() {
        let err = TransferError::PartialUpload {
            prefix: prefix(),
            uploaded: sent(),
            failed: vec![FailedUpload {
                local_path: "b.txt".into(),
                key: "abc/demo/b.txt".into(),
                reason: "boom".into(),
            }],
        };

        let report = serde_json::to_value(UploadFailure::from_error(&err).unwrap()).unwrap();

        assert_eq!(report["prefix"], "abc/demo/");
        assert_eq!(report["uploaded"][0]["key"], "abc/demo/a.txt");
        assert_eq!(report["failed"][0]["key"], "abc/demo/b.txt");
        assert_eq!(report["error"], err.to_string());
    }

    #[test]
    fn aborted_upload_is_reported_with_prefix() {
        let err = TransferError::UploadAborted {
            prefix: prefix(),
            uploaded: sent(),
            path: "b.txt".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };

        let report = serde_json::to_value(UploadFailure::from_error(&err).unwrap()).unwrap();

        assert_eq!(report["prefix"], "abc/demo/");
        assert_eq!(report["uploaded"].as_array().unwrap().len(), 1);
        assert!(report["failed"].as_array().unwrap().is_empty());
    }

    #[test]
    fn other_errors_have_no_report() {
        let err = TransferError::NotADirectory("missing".into());
        assert!(UploadFailure::from_error(&err).is_none());
    }
}
