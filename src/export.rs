use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::cli::ExportArgs;
use crate::config;
use crate::events;
use crate::registry;
use crate::session::Session;
use crate::utils;

fn staged_name(index: usize, event_id: u64) -> String {
    // Zero-padded so lexical order matches fetch (chronological) order.
    format!("{:05}-event-{}.mp4", index + 1, event_id)
}

pub fn handle(args: ExportArgs, config_path: &Path) -> Result<()> {
    let config = config::load_config(config_path)?;
    let session = Session::connect(&config).context("failed to open server session")?;
    let registry = registry::fetch_registry(&session)?;
    let query = events::build_query(
        &registry,
        &args.from,
        args.to.as_deref(),
        &args.monitors,
        args.notes.as_deref(),
    )?;
    let matched = events::fetch_query(&session, &query)?;
    if matched.is_empty() {
        println!("no events matched");
        return Ok(());
    }

    let output = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.export_root));
    fs::create_dir_all(&output)
        .with_context(|| format!("Failed to create staging dir {}", output.display()))?;

    let mut staged: Vec<PathBuf> = Vec::new();
    let mut skipped = 0usize;
    for (index, event) in matched.iter().enumerate() {
        let dest = output.join(staged_name(index, event.id));
        let url = session.video_url(event.id)?;
        match session.download_to(url, &dest) {
            Ok(bytes) => {
                println!("staged {} ({bytes} bytes)", dest.display());
                staged.push(dest);
            }
            Err(err) => {
                // One missing clip should not abort the whole batch.
                warn!(event = event.id, %err, "skipping event");
                eprintln!("skipping event {}: {err}", event.id);
                skipped += 1;
            }
        }
    }
    println!("{} staged, {skipped} skipped", staged.len());

    if let Some(concat) = args.concat {
        concat_videos(&staged, &concat)?;
        println!("wrote {}", concat.display());
    }
    Ok(())
}

fn concat_videos(staged: &[PathBuf], output: &Path) -> Result<()> {
    if staged.is_empty() {
        bail!("nothing staged to concatenate");
    }
    if utils::which("ffmpeg").is_none() {
        bail!("ffmpeg not found on PATH; cannot concatenate");
    }
    let mut list = tempfile::NamedTempFile::new()?;
    for path in staged {
        // The concat demuxer resolves relative paths against the list file,
        // which lives in the temp dir; absolute paths sidestep that.
        let absolute = fs::canonicalize(path)
            .with_context(|| format!("Failed to resolve {}", path.display()))?;
        writeln!(list, "file '{}'", absolute.display())?;
    }
    list.flush()?;

    let mut command = Command::new("ffmpeg");
    command
        .arg("-y")
        .arg("-f")
        .arg("concat")
        .arg("-safe")
        .arg("0")
        .arg("-i")
        .arg(list.path())
        .arg("-c")
        .arg("copy")
        .arg(output);
    let (ok, stderr) = utils::run_cmd_capture(command)?;
    if !ok {
        bail!("ffmpeg concat failed: {stderr}");
    }
    Ok(())
}
