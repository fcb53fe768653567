use super::handler::CallbackOutcome;

pub(super) fn render(outcome: &CallbackOutcome) -> String {
    match outcome {
        CallbackOutcome::Verified(user) => page(
            "Verified",
            "✅ Verification complete",
            &format!(
                "GitHub account <b>@{}</b> is confirmed. You can close this page and return to Telegram.",
                escape_html(&user.login)
            ),
        ),
        CallbackOutcome::Mismatch { requested, actual } => page(
            "Verification failed",
            "❌ Verification failed",
            &format!(
                "You signed in as <b>@{}</b>, but <b>@{}</b> was requested. Return to Telegram and try again with the right account.",
                escape_html(actual),
                escape_html(requested)
            ),
        ),
    }
}

fn page(title: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
</head>
<body style="font-family: sans-serif; text-align: center; padding: 50px;">
<h1>{heading}</h1>
<p>{body}</p>
</body>
</html>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
