use mailparse::{MailHeaderMap, ParsedMail};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Label, ParsedEmail};

use super::MailError;

static QUOTED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[^\n]*").expect("valid quoted line regex"));
static URL: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").expect("valid url regex"));
static SIGNATURE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n--[ \t]*\n").expect("valid signature regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Plain,
    Html,
}

pub fn parse_email(raw: &str, filename: &str, label: Option<Label>) -> Result<ParsedEmail, MailError> {
    let mail = mailparse::parse_mail(raw.as_bytes())?;

    let body = match find_body_part(&mail) {
        Some((BodyKind::Plain, part)) => decode_part(part),
        Some((BodyKind::Html, part)) => html_to_text(&decode_part(part)),
        None => String::new(),
    };

    Ok(ParsedEmail {
        filename: filename.to_string(),
        date: header(&mail, "Date"),
        from: header(&mail, "From"),
        to: header(&mail, "To"),
        subject: header(&mail, "Subject"),
        body: clean_body(&body),
        label,
    })
}

pub fn clean_body(body: &str) -> String {
    let body = body.replace("\r\n", "\n");
    let body = QUOTED_LINE.replace_all(&body, "");
    let body = URL.replace_all(&body, "");
    let body = match SIGNATURE.find(&body) {
        Some(delimiter) => &body[..delimiter.start()],
        None => &body[..],
    };
    WHITESPACE.replace_all(body, " ").trim().to_string()
}

/// Visible text of an HTML document, one space between the text of adjacent nodes.
pub fn html_to_text(html: &str) -> String {
    // html2text drops unknown tags without a separator; pad every boundary
    // so `<td>a</td><td>b</td>` stays two words.
    let padded = html.replace('<', " <").replace('>', "> ");
    let text = nanohtml2text::html2text(&padded);
    WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// First `text/plain` or `text/html` part in document order, the message itself first.
fn find_body_part<'m, 'a>(part: &'m ParsedMail<'a>) -> Option<(BodyKind, &'m ParsedMail<'a>)> {
    match part.ctype.mimetype.to_ascii_lowercase().as_str() {
        "text/plain" => return Some((BodyKind::Plain, part)),
        "text/html" => return Some((BodyKind::Html, part)),
        _ => {}
    }
    part.subparts.iter().find_map(find_body_part)
}

fn decode_part(part: &ParsedMail<'_>) -> String {
    match part.get_body() {
        Ok(text) => text,
        Err(err) => {
            tracing::debug!(target: "corpus", error = %err, "falling back to raw part bytes");
            part.get_body_raw()
                .map(|raw| String::from_utf8_lossy(&raw).into_owned())
                .unwrap_or_default()
        }
    }
}

fn header(mail: &ParsedMail<'_>, name: &str) -> Option<String> {
    mail.headers
        .get_first_value(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
