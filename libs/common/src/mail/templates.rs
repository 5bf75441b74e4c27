//! Email bodies rendered with Tera
//!
//! Templates are compiled into the binary. HTML templates are autoescaped,
//! plain-text ones are not.

use chrono::NaiveDate;
use std::sync::OnceLock;
use tera::{Context, Tera};

use super::OutgoingEmail;
use crate::error::MailResult;
use crate::models::{Application, ApplicationStatus, User};

const NOT_AVAILABLE: &str = "N/A";

fn tera() -> &'static Tera {
    static TERA: OnceLock<Tera> = OnceLock::new();
    TERA.get_or_init(|| {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("reminder.txt", include_str!("../../templates/reminder.txt")),
            ("reminder.html", include_str!("../../templates/reminder.html")),
            ("welcome.txt", include_str!("../../templates/welcome.txt")),
            ("welcome.html", include_str!("../../templates/welcome.html")),
            ("status_change.txt", include_str!("../../templates/status_change.txt")),
            ("status_change.html", include_str!("../../templates/status_change.html")),
        ])
        .expect("Invalid email template");
        tera
    })
}

/// `October 16, 2026`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}

fn or_not_available(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() { NOT_AVAILABLE } else { value }
}

fn render_pair(name: &str, context: &Context) -> MailResult<(String, String)> {
    let text = tera().render(&format!("{name}.txt"), context)?;
    let html = tera().render(&format!("{name}.html"), context)?;
    Ok((text, html))
}

/// Follow-up reminder for one application
pub fn reminder_email(user: &User, application: &Application) -> MailResult<OutgoingEmail> {
    let notes = application
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|notes| !notes.is_empty());

    let mut context = Context::new();
    context.insert("name", user.greeting_name());
    context.insert("company", &application.company);
    context.insert("position", or_not_available(&application.position));
    context.insert("status", application.status.as_str());
    context.insert("status_color", application.status.badge_color());
    context.insert("date_applied", &format_date(application.date_applied));
    context.insert(
        "follow_up_date",
        &application
            .follow_up_date
            .map(format_date)
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    );
    context.insert("notes", notes.unwrap_or("None"));
    context.insert("has_notes", &notes.is_some());

    let (text_body, html_body) = render_pair("reminder", &context)?;
    Ok(OutgoingEmail {
        to: user.email.clone(),
        subject: format!("Follow-up reminder: {}", application.company),
        text_body,
        html_body,
    })
}

/// Sent once after registration
pub fn welcome_email(user: &User) -> MailResult<OutgoingEmail> {
    let mut context = Context::new();
    context.insert("name", user.greeting_name());

    let (text_body, html_body) = render_pair("welcome", &context)?;
    Ok(OutgoingEmail {
        to: user.email.clone(),
        subject: "Welcome to Job Application Tracker!".to_string(),
        text_body,
        html_body,
    })
}

/// Sent when an application moves from `old` to `new`
pub fn status_change_email(
    user: &User,
    application: &Application,
    old: ApplicationStatus,
    new: ApplicationStatus,
) -> MailResult<OutgoingEmail> {
    let mut context = Context::new();
    context.insert("name", user.greeting_name());
    context.insert("company", &application.company);
    context.insert("position", or_not_available(&application.position));
    context.insert("old_status", old.as_str());
    context.insert("old_status_color", old.badge_color());
    context.insert("new_status", new.as_str());
    context.insert("new_status_color", new.badge_color());

    let (text_body, html_body) = render_pair("status_change", &context)?;
    Ok(OutgoingEmail {
        to: user.email.clone(),
        subject: format!("Status Update: {} - {}", application.company, new),
        text_body,
        html_body,
    })
}
