//! Opening result URLs in the browser

use crate::output::report::{OpenFilter, OpenGroup};
use async_trait::async_trait;
use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;

/// Opens a URL somewhere the user will see it
#[async_trait]
pub trait UrlOpener: Send + Sync {
    async fn open(&self, url: &str) -> io::Result<()>;
}

/// Runs `<binary> <url>` (e.g. `open`, `xdg-open`)
#[derive(Debug, Clone)]
pub struct CommandOpener {
    binary: String,
}

impl CommandOpener {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl UrlOpener for CommandOpener {
    async fn open(&self, url: &str) -> io::Result<()> {
        let status = Command::new(&self.binary)
            .arg(url)
            .stdout(Stdio::null())
            .status()
            .await?;
        if status.success() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::Other,
                format!("{} exited with {}", self.binary, status),
            ))
        }
    }
}

/// Counts from one pass of [`open_candidates`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpenSummary {
    pub opened: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Prints each group and opens its URLs, pausing `delay` between opens
///
/// Groups the filter excludes are announced and left closed. A URL that fails
/// to open is logged and does not stop the rest.
pub async fn open_candidates<O>(
    opener: &O,
    groups: &[OpenGroup<'_>],
    filter: &OpenFilter,
    delay: Duration,
) -> OpenSummary
where
    O: UrlOpener + ?Sized,
{
    let mut summary = OpenSummary::default();
    let mut first = true;

    for group in groups {
        if let Some(notice) = filter.skip_notice(group.kind) {
            println!("{}\n", notice);
            summary.skipped += group.urls.len();
            continue;
        }

        print!("{}", group.render());
        for tracked in &group.urls {
            if !first && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            first = false;

            match opener.open(tracked.url()).await {
                Ok(()) => summary.opened += 1,
                Err(e) => {
                    tracing::error!("Failed to open {}: {}", tracked.url(), e);
                    summary.failed += 1;
                }
            }
        }
        println!();
    }

    summary
}

/// Prints `prompt` and waits for the user to press enter
pub async fn wait_for_enter(prompt: &str) -> io::Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(())
}
