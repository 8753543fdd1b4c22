use anyhow::Context;
use mailparse::{MailHeaderMap, ParsedMail};
use std::fs;
use std::path::{Path, PathBuf};

/// Headers copied into the header block handed to the explainer, in order.
const SUMMARY_HEADERS: [&str; 5] = ["From", "To", "Subject", "Date", "Reply-To"];

/// A message split into a raw header block and a plain-text body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedMessage {
    pub headers: String,
    pub body: String,
}

impl LoadedMessage {
    /// Text scored by the classifier for file input.
    pub fn classifier_text(&self) -> String {
        format!("{}\n{}", self.headers, self.body)
    }
}

/// Load a `.eml` file as MIME, anything else as a plain-text body.
pub fn load_message(path: &Path) -> anyhow::Result<LoadedMessage> {
    let raw = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if has_extension(path, "eml") {
        parse_eml(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    } else {
        Ok(LoadedMessage {
            headers: String::new(),
            body: String::from_utf8_lossy(&raw).into_owned(),
        })
    }
}

pub fn parse_eml(raw: &[u8]) -> anyhow::Result<LoadedMessage> {
    let mail = mailparse::parse_mail(raw)?;

    let headers = SUMMARY_HEADERS
        .iter()
        .filter_map(|name| {
            mail.headers
                .get_first_value(name)
                .filter(|v| !v.trim().is_empty())
                .map(|v| format!("{}: {}", name, v.trim()))
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut body = String::new();
    collect_plain_text(&mail, &mut body)?;

    Ok(LoadedMessage { headers, body })
}

fn collect_plain_text(part: &ParsedMail<'_>, body: &mut String) -> anyhow::Result<()> {
    if part.subparts.is_empty() {
        if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
            body.push_str(&part.get_body()?);
        }
        return Ok(());
    }

    for sub in &part.subparts {
        collect_plain_text(sub, body)?;
    }
    Ok(())
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

/// Every `.eml`/`.txt` file below `dir`, sorted by path.
pub fn collect_message_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(dir, &mut files)?;
    files.sort();
    log::info!("Found {} message files in {}", files.len(), dir.display());
    Ok(files)
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> anyhow::Result<()> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory {}", dir.display()))?;

    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else if has_extension(&path, "eml") || has_extension(&path, "txt") {
            files.push(path);
        }
    }
    Ok(())
}
