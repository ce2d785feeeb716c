//! Message templates for new-lead notifications.

use chrono::{DateTime, Datelike, FixedOffset, Offset, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::clients::mailer::OutboundMail;
use crate::config::{Config, MailConfig};
use crate::models::lead::Lead;

const CONFIRMATION_PREVIEW_CHARS: usize = 300;
const DEFAULT_SUBJECT: &str = "General Inquiry";

const WRAPPER_STYLE: &str = "font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; max-width: 600px; margin: 0 auto; border-radius: 10px; overflow: hidden; box-shadow: 0 10px 25px rgba(0,0,0,0.2);";
const LABEL_STYLE: &str = "padding: 12px 0; color: #666; font-weight: 500; border-bottom: 1px solid #e0e0e0; vertical-align: top;";
const VALUE_STYLE: &str = "padding: 12px 0 12px 20px; color: #333; font-weight: 600; border-bottom: 1px solid #e0e0e0;";
const FOOTER_STYLE: &str = "background: #667eea; color: white; text-align: center; padding: 20px; font-size: 12px;";

/// Renders the two messages sent for every lead.
#[derive(Debug, Clone)]
pub struct LeadTemplates {
    site_name: String,
    admin_email: String,
    offset: FixedOffset,
}

impl LeadTemplates {
    #[must_use]
    pub fn new(site_name: &str, mail: &MailConfig) -> Self {
        let offset = FixedOffset::east_opt(mail.timezone_offset_minutes * 60)
            .unwrap_or_else(|| Utc.fix());

        Self {
            site_name: site_name.to_string(),
            admin_email: mail.admin_email.clone(),
            offset,
        }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.general.site_name, &config.mail)
    }

    fn received_at(&self, lead: &Lead) -> String {
        DateTime::parse_from_rfc3339(&lead.created_at)
            .map_or_else(|_| Utc::now().fixed_offset(), |t| t)
            .with_timezone(&self.offset)
            .format("%d/%m/%Y, %I:%M:%S %p")
            .to_string()
    }

    fn footer(&self, extra: &str) -> String {
        format!(
            r#"<div style="{FOOTER_STYLE}"><p style="margin: 0;">&copy; {} {}. All rights reserved.</p>{extra}</div>"#,
            Utc::now().year(),
            encode_text(&self.site_name)
        )
    }

    /// Sent to the business. Replies go straight to the submitter.
    #[must_use]
    pub fn admin_notification(&self, lead: &Lead) -> OutboundMail {
        let received = self.received_at(lead);

        let mut rows = vec![
            ("Name", encode_text(&lead.name).into_owned()),
            (
                "Email",
                format!(
                    r#"<a href="mailto:{}" style="text-decoration: none; color: #667eea;">{}</a>"#,
                    encode_double_quoted_attribute(&lead.email),
                    encode_text(&lead.email)
                ),
            ),
        ];
        let mut text = format!("New contact form submission\n\nName: {}\nEmail: {}\n", lead.name, lead.email);

        if let Some(phone) = lead.phone.as_deref() {
            rows.push(("Phone", encode_text(phone).into_owned()));
            text.push_str(&format!("Phone: {phone}\n"));
        }
        if let Some(subject) = lead.subject.as_deref() {
            rows.push(("Subject", encode_text(subject).into_owned()));
            text.push_str(&format!("Subject: {subject}\n"));
        }
        text.push_str(&format!("\nMessage:\n{}\n\nReceived on: {received}\n", lead.message));

        let table = rows
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"<tr><td style="{LABEL_STYLE}">{label}:</td><td style="{VALUE_STYLE}">{value}</td></tr>"#
                )
            })
            .collect::<String>();

        let html = format!(
            r#"<div style="{WRAPPER_STYLE}">
<div style="background-color: #fff; padding: 40px;">
<h2 style="color: #333; margin: 0 0 30px 0; font-size: 24px; border-bottom: 3px solid #667eea; padding-bottom: 20px;">New Contact Submission</h2>
<div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 30px;"><table style="width: 100%; border-collapse: collapse;">{table}</table></div>
<h3 style="color: #333; font-size: 16px; margin: 0 0 15px 0;">Message:</h3>
<div style="border-left: 4px solid #667eea; padding: 15px; color: #555; line-height: 1.6; white-space: pre-wrap; word-wrap: break-word;">{message}</div>
<div style="background: #f0f4ff; padding: 15px; border-radius: 8px; text-align: center; color: #666; font-size: 13px; margin-top: 30px;"><p style="margin: 0;">Received on: <strong>{received}</strong></p></div>
</div>
{footer}
</div>"#,
            message = encode_text(&lead.message),
            footer = self.footer(""),
        );

        OutboundMail {
            to: self.admin_email.clone(),
            reply_to: Some(lead.email.clone()),
            subject: format!("New Contact Form Submission from {}", lead.name),
            text,
            html,
        }
    }

    /// Sent to the submitter. Replies go to the business.
    #[must_use]
    pub fn confirmation(&self, lead: &Lead) -> OutboundMail {
        let subject = lead.subject.as_deref().unwrap_or(DEFAULT_SUBJECT);
        let preview = preview(&lead.message);

        let text = format!(
            "Hi {name},\n\nThank you for contacting {site}. We have received your message and will review it shortly.\nOur team typically responds within 24-48 hours.\n\nSubject: {subject}\nMessage: {preview}\n\nWe will be in touch soon!\n{site}\n",
            name = lead.name,
            site = self.site_name,
        );

        let html = format!(
            r#"<div style="{WRAPPER_STYLE}">
<div style="background-color: #fff; padding: 40px;">
<h2 style="color: #333; margin: 0 0 30px 0; font-size: 24px; border-bottom: 3px solid #667eea; padding-bottom: 20px;">Thank You for Reaching Out!</h2>
<div style="margin-bottom: 30px; color: #555; line-height: 1.8;">
<p>Hi <strong>{name}</strong>,</p>
<p>Thank you for contacting {site}. We have successfully received your message and will review it shortly.</p>
<p>Our team typically responds within <strong>24-48 hours</strong>.</p>
</div>
<div style="background: #f8f9fa; padding: 20px; border-radius: 8px; margin-bottom: 30px;">
<h3 style="color: #667eea; margin: 0 0 15px 0; font-size: 16px;">Your Submission Details:</h3>
<table style="width: 100%; border-collapse: collapse;">
<tr><td style="{LABEL_STYLE}">Subject:</td><td style="{VALUE_STYLE}">{subject}</td></tr>
<tr><td style="{LABEL_STYLE}">Message:</td><td style="{VALUE_STYLE} white-space: pre-wrap; word-wrap: break-word;">{preview}</td></tr>
</table>
</div>
<div style="background: #e8f3ff; padding: 15px; border-radius: 8px; text-align: center; border-left: 4px solid #667eea;"><p style="margin: 0; font-size: 14px; font-weight: 600;">We will be in touch soon!</p></div>
<div style="border-top: 1px solid #e0e0e0; padding-top: 20px; margin-top: 30px; text-align: center; color: #999; font-size: 12px;">
<p style="margin: 0;">If you have any questions, feel free to contact us:</p>
<p style="margin: 10px 0 0 0;"><a href="mailto:{admin}" style="color: #667eea; text-decoration: none; font-weight: 600;">Contact Us</a></p>
</div>
</div>
{footer}
</div>"#,
            name = encode_text(&lead.name),
            site = encode_text(&self.site_name),
            subject = encode_text(subject),
            preview = encode_text(&preview),
            admin = encode_double_quoted_attribute(&self.admin_email),
            footer = self.footer(
                r#"<p style="margin: 8px 0 0 0;">This is an automated message from our contact form.</p>"#
            ),
        );

        OutboundMail {
            to: lead.email.clone(),
            reply_to: Some(self.admin_email.clone()),
            subject: format!("Thank You for Contacting {}", self.site_name),
            text,
            html,
        }
    }
}

fn preview(message: &str) -> String {
    if message.chars().count() > CONFIRMATION_PREVIEW_CHARS {
        let cut: String = message.chars().take(CONFIRMATION_PREVIEW_CHARS).collect();
        format!("{cut}...")
    } else {
        message.to_string()
    }
}
