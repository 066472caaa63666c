// YelpCamp
// Copyright 2024 The YelpCamp Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Minimal templating for HTML pages.
//!
//! Templates are static strings, usually loaded with `include_str!`, in which `%key%` markers are
//! substituted by caller-provided values and `%%` stands for a literal `%`.  Values are inserted
//! verbatim, so anything that comes from user input must go through `escape` first.

/// Returns the value for `key` in `replacements`.
///
/// Templates are static, so a missing or duplicate key is a programming error and panics.
fn lookup<'a>(key: &str, replacements: &[(&'static str, &'a str)]) -> &'a str {
    let mut values = replacements.iter().filter(|(k, _)| *k == key).map(|(_, v)| *v);
    let value = values.next();
    assert!(values.next().is_none(), "Found two values for replacement {}", key);
    match value {
        Some(value) => value,
        None => panic!("No replacement for {} in template", key),
    }
}

/// Expands every `%key%` in `input` with its value in `replacements`.
///
/// Expanded values are not scanned again, so they can contain `%` freely.
pub fn apply(input: &'static str, replacements: &[(&'static str, &str)]) -> String {
    let mut output = String::with_capacity(input.len());

    // Splitting on the delimiter leaves literal text at even positions and keys at odd ones.
    let mut parts = input.split('%');
    output.push_str(parts.next().unwrap_or_default());
    while let Some(key) = parts.next() {
        let text = parts.next();
        assert!(text.is_some(), "Unterminated key %{} in template", key);

        if key.is_empty() {
            output.push('%');
        } else {
            output.push_str(lookup(key, replacements));
        }
        output.push_str(text.unwrap_or_default());
    }
    output
}

/// Escapes `input` so that it can be embedded in HTML text and in quoted attributes.
pub fn escape(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#39;"),
            ch => output.push(ch),
        }
    }
    output
}
