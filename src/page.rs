//! HTML for the question page.

use crate::config::UiConfig;

/// What the response area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Nothing asked yet.
    Idle,
    Answer(String),
    Error(String),
}

/// Render the single page: one form with the question input, the response
/// area and the submit button.
pub fn render(ui: &UiConfig, question: &str, response: &Response) -> String {
    let title = escape(&ui.title);

    let response_html = match response {
        Response::Idle => r#"<div id="answer" class="answer" role="status"></div>"#.to_string(),
        Response::Answer(text) => format!(
            r#"<div id="answer" class="answer" role="status">{}</div>"#,
            escape(text)
        ),
        Response::Error(message) => format!(
            r#"<div id="answer" class="answer error" role="alert">{}</div>"#,
            escape(message)
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
  body {{ font-family: sans-serif; margin: 0; }}
  main {{ max-width: 46rem; margin: 3rem auto; padding: 0 1rem; }}
  textarea {{ width: 100%; box-sizing: border-box; font: inherit; padding: 0.5rem; }}
  .answer {{ white-space: pre-wrap; min-height: 2rem; margin-bottom: 1rem; }}
  .error {{ color: #b00020; }}
</style>
</head>
<body>
<main>
<h1>{title}</h1>
<form id="qna" method="post" action="/">
<label for="question">Question: </label>
<textarea id="question" name="question" maxlength="{max_chars}" style="min-height: {height}px">{question}</textarea>
<p>Response: </p>
{response_html}
<button type="submit">Ask</button>
</form>
</main>
</body>
</html>
"#,
        title = title,
        max_chars = ui.max_chars,
        height = ui.height,
        question = escape(question),
        response_html = response_html,
    )
}

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
