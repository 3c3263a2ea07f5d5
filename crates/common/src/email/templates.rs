//! HTML bodies for transactional email. Copy is in Italian, like the site.

use crate::email::EmailMessage;

/// Minimal escaping for user-supplied text placed in HTML
fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif\">\
         <h1>{}</h1>{}\
         <p style=\"color:#888\">Morgana &amp; O.R.U.M.</p></body></html>",
        title, content
    )
}

pub fn welcome_email(to: &str, name: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Benvenuto nella rete Morgana".to_string(),
        html: layout(
            &format!("Ciao {}!", escape_html(name)),
            "<p>Il tuo account è stato creato correttamente.</p>",
        ),
    }
}

pub fn password_reset_email(
    to: &str,
    name: &str,
    reset_link: &str,
    ttl_minutes: u64,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Reimposta la tua password".to_string(),
        html: layout(
            &format!("Ciao {}", escape_html(name)),
            &format!(
                "<p>Abbiamo ricevuto una richiesta di reimpostazione della password.</p>\
                 <p><a href=\"{}\">Reimposta la password</a></p>\
                 <p>Il link scade tra {} minuti. Se non hai richiesto tu il cambio, ignora questa email.</p>",
                escape_html(reset_link),
                ttl_minutes
            ),
        ),
    }
}

pub fn registration_confirmation_email(
    to: &str,
    name: &str,
    event_title: &str,
    starts_at: &str,
    location: &str,
) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: format!("Iscrizione confermata: {}", event_title),
        html: layout(
            &format!("Ciao {}", escape_html(name)),
            &format!(
                "<p>La tua iscrizione a <strong>{}</strong> è confermata.</p>\
                 <p>Quando: {}<br>Dove: {}</p>",
                escape_html(event_title),
                escape_html(starts_at),
                escape_html(location)
            ),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_text_is_escaped() {
        let message = welcome_email("a@b.it", "<script>alert(1)</script>");
        assert!(!message.html.contains("<script>"));
        assert!(message.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_reset_email_carries_link_and_ttl() {
        let message = password_reset_email(
            "a@b.it",
            "Anna",
            "https://morgana.example/reset-password?token=abc",
            60,
        );
        assert_eq!(message.to, "a@b.it");
        assert!(message
            .html
            .contains("https://morgana.example/reset-password?token=abc"));
        assert!(message.html.contains("60 minuti"));
    }

    #[test]
    fn test_confirmation_subject_names_event() {
        let message = registration_confirmation_email(
            "a@b.it",
            "Anna",
            "Festa di benvenuto",
            "01/10/2025 18:00",
            "Aula Magna",
        );
        assert_eq!(message.subject, "Iscrizione confermata: Festa di benvenuto");
        assert!(message.html.contains("Aula Magna"));
    }
}
