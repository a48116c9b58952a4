//! Mail templates
//!
//! Plain string builders. Every user-provided value goes through
//! [`escape_html`] before it is placed in markup.

use crate::domain::mailer::MailMessage;

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
</head>
<body style="font-family: sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
{content}
<hr style="border: none; border-top: 1px solid #eee; margin-top: 32px;">
<p style="font-size: 12px; color: #999;">This message was sent automatically. Please do not reply.</p>
</body>
</html>
"#
    )
}

/// Mail carrying the reset link
pub fn password_reset(to: &str, username: &str, reset_url: &str, ttl_minutes: i64) -> MailMessage {
    let username = escape_html(username);
    let reset_url = escape_html(reset_url);
    let content = format!(
        r#"<h2>Password reset</h2>
<p>Hello {username},</p>
<p>We received a request to reset your password. Click the button below to choose a new one.</p>
<p style="margin: 24px 0;"><a href="{reset_url}" style="background: #2563eb; color: #fff; padding: 12px 24px; border-radius: 4px; text-decoration: none;">Reset password</a></p>
<p>Or open this link: <br><a href="{reset_url}">{reset_url}</a></p>
<p>This link expires in {ttl_minutes} minutes and can be used once.</p>
<p>If you did not request a password reset, you can ignore this email.</p>"#
    );

    MailMessage {
        to: to.to_string(),
        subject: "Password reset request".to_string(),
        html_body: layout("Password reset", &content),
    }
}

/// Mail sent after registration
pub fn welcome(to: &str, username: &str) -> MailMessage {
    let username = escape_html(username);
    let content = format!(
        r#"<h2>Welcome!</h2>
<p>Hello {username},</p>
<p>Your account has been created. You can now sign in and start writing.</p>"#
    );

    MailMessage {
        to: to.to_string(),
        subject: "Welcome to the blog".to_string(),
        html_body: layout("Welcome", &content),
    }
}

/// Header block plus body, ready for an SMTP `DATA` command
pub fn render_rfc822(from: &str, message: &MailMessage) -> String {
    // Header injection guard
    let clean = |s: &str| s.replace(['\r', '\n'], " ");

    format!(
        "From: {}\r\nTo: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/html; charset=UTF-8\r\n\r\n{}",
        clean(from),
        clean(&message.to),
        clean(&message.subject),
        message.html_body
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn test_password_reset_mail() {
        let mail = password_reset(
            "alice@example.com",
            "<alice>",
            "http://localhost:3000/reset-password?token=abc",
            60,
        );
        assert_eq!(mail.to, "alice@example.com");
        assert!(mail.html_body.contains("&lt;alice&gt;"));
        assert!(!mail.html_body.contains("<alice>"));
        assert!(mail.html_body.contains("reset-password?token=abc"));
        assert!(mail.html_body.contains("60 minutes"));
    }

    #[test]
    fn test_welcome_mail() {
        let mail = welcome("bob@example.com", "bob");
        assert!(mail.html_body.contains("Hello bob"));
    }

    #[test]
    fn test_render_rfc822() {
        let mail = MailMessage {
            to: "bob@example.com".to_string(),
            subject: "Hi\r\nBcc: evil@example.com".to_string(),
            html_body: "<p>x</p>".to_string(),
        };
        let raw = render_rfc822("Blog App <noreply@localhost>", &mail);

        assert!(raw.starts_with("From: Blog App <noreply@localhost>\r\n"));
        assert!(raw.contains("Content-Type: text/html; charset=UTF-8\r\n\r\n<p>x</p>"));
        assert!(raw.contains("Subject: Hi  Bcc: evil@example.com\r\n"));
    }
}
