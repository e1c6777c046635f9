use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// `1234.5` -> `1,234.50`; the sign stays in front of the grouped digits.
pub fn format_money(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int_part, dec_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut out = String::new();
    let chars: Vec<char> = int_part.chars().collect();
    let mut cnt = 0;
    for i in (0..chars.len()).rev() {
        if cnt == 3 {
            out.push(',');
            cnt = 0;
        }
        out.push(chars[i]);
        cnt += 1;
    }
    let int_with_sep: String = out.chars().rev().collect();
    // -0.004 formats as 0.00, which should not read as negative.
    let negative = v < 0.0 && (int_with_sep.chars().any(|c| c != '0' && c != ',') || dec_part != "00");
    format!("{}{}.{}", if negative { "-" } else { "" }, int_with_sep, dec_part)
}

pub fn format_currency(symbol: &str, v: f64) -> String {
    let s = format_money(v);
    match s.strip_prefix('-') {
        Some(rest) => format!("-{symbol}{rest}"),
        None => format!("{symbol}{s}"),
    }
}

/// Renders `YYYY-MM-DD` or an RFC3339 timestamp as `M/D/YYYY`. Anything else
/// is shown as entered.
pub fn display_date(input: &str) -> String {
    let s = input.trim();
    let date = OffsetDateTime::parse(s, &Rfc3339)
        .map(|dt| dt.date())
        .or_else(|_| Date::parse(s, format_description!("[year]-[month]-[day]")));
    match date {
        Ok(d) => format!("{}/{}/{}", u8::from(d.month()), d.day(), d.year()),
        Err(_) => s.to_string(),
    }
}

pub fn wrap_text_lines(input: &str, max_chars: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in input.split_whitespace() {
        let mut word = word.to_string();
        // Hard-split words that could never fit on a line.
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            out.push(head);
        }
        if word.is_empty() {
            continue;
        }

        if current.is_empty() {
            current.push_str(&word);
            continue;
        }

        if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(&word);
        } else {
            out.push(std::mem::replace(&mut current, word));
        }
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

pub fn split_and_wrap_lines(input: &str, max_chars: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for raw in input.lines() {
        let s = raw.trim();
        if s.is_empty() {
            continue;
        }
        out.extend(wrap_text_lines(s, max_chars));
    }
    out
}

/// Cuts `input` to `max_chars`, marking the cut with `...`.
pub fn fit_chars(input: &str, max_chars: usize) -> String {
    let s = input.trim();
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

pub fn sanitize_filename(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '.' || ch == ' ';
        out.push(if ok { ch } else { '_' });
    }
    let trimmed = out.trim().to_string();
    if trimmed.is_empty() {
        "invoice".to_string()
    } else {
        trimmed
    }
}
