// src/recording/record.rs
//! Mock record text format
//!
//! A stored mock is `METHOD URL POSTBODY\n\n<response body>`. The request line
//! is only there for humans reading or diffing the file; replay uses whatever
//! follows the first blank line.

const SEPARATOR: &str = "\n\n";

/// A parsed mock file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockRecord {
    pub request_line: String,
    pub body: String,
}

impl MockRecord {
    /// Render the stored text for a captured exchange
    pub fn render(method: &str, url: &str, post_body: &str, response_text: &str) -> String {
        format!(
            "{} {} {}{}{}",
            method.to_uppercase(),
            url,
            post_body,
            SEPARATOR,
            response_text
        )
    }

    /// Split stored text on the first blank line
    ///
    /// Text without a request line is treated as a bare payload.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(SEPARATOR) {
            Some((request_line, body)) => Self {
                request_line: request_line.to_string(),
                body: body.to_string(),
            },
            None => Self {
                request_line: String::new(),
                body: raw.to_string(),
            },
        }
    }
}
