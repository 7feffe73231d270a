// SPDX-FileCopyrightText: 2026 Renewbot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! MarkdownV2 escaping for Telegram Bot API.
//!
//! Outbound "markdown" text uses exactly one construct: inline code spans
//! delimited by single backticks. Everything outside a span is escaped so it
//! renders literally. Inside a span only `\` needs escaping. A backtick with
//! no partner is escaped and shown as-is.

/// Characters that must be escaped in MarkdownV2 outside code spans.
const SPECIAL_CHARS: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

/// Escapes text for Telegram MarkdownV2 parse mode, keeping inline code spans.
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);
    let mut rest = text;

    while let Some(open) = rest.find('`') {
        let (before, after_open) = rest.split_at(open);
        push_escaped(&mut result, before);

        let body = &after_open[1..];
        match body.find('`') {
            Some(close) => {
                result.push('`');
                for c in body[..close].chars() {
                    if c == '\\' {
                        result.push('\\');
                    }
                    result.push(c);
                }
                result.push('`');
                rest = &body[close + 1..];
            }
            None => {
                result.push_str("\\`");
                rest = body;
            }
        }
    }

    push_escaped(&mut result, rest);
    result
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if SPECIAL_CHARS.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}
