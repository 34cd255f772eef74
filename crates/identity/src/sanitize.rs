// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Name sanitization for derived instance names.

const MAX_LEN: usize = 256;

/// Lowercase, replace `/` with `-`, strip anything outside `[a-z0-9-]`
/// to `-`, collapse repeated `-`, trim leading/trailing `-`, and
/// truncate to 256 bytes.
pub fn sanitize(candidate: &str) -> String {
    let lower = candidate.to_lowercase();

    let mut out = String::with_capacity(lower.len());
    let mut last_was_hyphen = false;
    for ch in lower.chars() {
        let mapped = if ch == '/' {
            '-'
        } else if ch.is_ascii_alphanumeric() || ch == '-' {
            ch
        } else {
            '-'
        };
        if mapped == '-' {
            if !last_was_hyphen {
                out.push('-');
                last_was_hyphen = true;
            }
        } else {
            out.push(mapped);
            last_was_hyphen = false;
        }
    }

    let trimmed = out.trim_matches('-');
    let mut result = trimmed.to_string();
    if result.len() > MAX_LEN {
        result.truncate(MAX_LEN);
        result = result.trim_end_matches('-').to_string();
    }
    result
}
