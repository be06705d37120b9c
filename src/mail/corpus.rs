use std::{fs, path::Path};

use crate::{
    config::CorpusConfig,
    domain::{Label, ParsedEmail},
};

use super::{normalizer::parse_email, MailError};

/// Parses every file in `dir`, tagging each record with `label`.
///
/// A file that cannot be read or parsed is logged and skipped; only a missing
/// or unreadable directory fails the call.
pub fn read_emails_from_folder(dir: &Path, label: Label) -> Result<Vec<ParsedEmail>, MailError> {
    let entries = fs::read_dir(dir).map_err(|source| MailError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut emails = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(target: "corpus", dir = %dir.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().into_owned();

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(target: "corpus", file = %filename, error = %err, "error reading email");
                continue;
            }
        };
        let raw = String::from_utf8_lossy(&bytes);

        match parse_email(&raw, &filename, Some(label)) {
            Ok(email) => emails.push(email),
            Err(err) => {
                tracing::warn!(target: "corpus", file = %filename, error = %err, "error parsing email");
            }
        }
    }

    tracing::info!(
        target: "corpus",
        dir = %dir.display(),
        label = %label,
        parsed = emails.len(),
        "folder parsed"
    );
    Ok(emails)
}

pub fn label_corpus(root: &Path, corpus: &CorpusConfig) -> Result<Vec<ParsedEmail>, MailError> {
    let categories = corpus
        .ham_categories
        .iter()
        .map(|name| (name, Label::Ham))
        .chain(corpus.spam_categories.iter().map(|name| (name, Label::Spam)));

    let mut records = Vec::new();
    for (name, label) in categories {
        let dir = root.join(name);
        tracing::info!(target: "corpus", category = %name, label = %label, "parsing & labeling category");
        records.extend(read_emails_from_folder(&dir, label)?);
    }
    Ok(records)
}
