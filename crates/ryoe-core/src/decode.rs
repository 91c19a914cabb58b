// CSV decoding: raw text to header-keyed records.
//
// Deliberately lenient: quoting mistakes never raise, they just change how
// the remaining characters of the line are grouped into fields.

use std::mem::take;
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// One decoded data line, keyed by the header row.
///
/// Every record holds exactly one value per header column. Missing trailing
/// fields are stored as `""` and fields past the header width are dropped.
/// The header row is shared between all records of one `parse` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    headers: Arc<[String]>,
    values: Vec<String>,
}

impl Record {
    fn new(headers: Arc<[String]>, mut fields: Vec<String>) -> Self {
        fields.resize(headers.len(), String::new());
        Self {
            headers,
            values: fields,
        }
    }

    /// Value for `key`, or `None` when the header row has no such column.
    ///
    /// If a header name repeats, the value of its last occurrence wins.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rposition(|h| h == key)
            .map(|idx| self.values[idx].as_str())
    }

    /// Whether the header row contains `key`.
    pub fn has_column(&self, key: &str) -> bool {
        self.headers.iter().any(|h| h == key)
    }

    /// Header names in column order.
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// `(header, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Split one line into fields.
///
/// A `"` outside a quoted region opens one (even mid-field); inside a quoted
/// region `""` is a literal quote and a lone `"` closes it. Commas inside a
/// quoted region are literal. An unterminated quote runs to end of line.
/// Always returns at least one field.
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(take(&mut field)),
            _ => field.push(ch),
        }
    }

    fields.push(field);
    fields
}

/// Decode CSV text into records.
///
/// Lines end at `\n` or `\r\n`; empty lines are ignored. The first remaining
/// line is the header row. A leading UTF-8 byte order mark is dropped.
/// Returns an empty vec when there is no header.
pub fn parse(text: &str) -> Vec<Record> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.lines().filter(|line| !line.is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Arc<[String]> = split_line(header_line).into();

    let mut records = Vec::new();
    for line in lines {
        let fields = split_line(line);
        if fields.is_empty() {
            continue;
        }
        records.push(Record::new(Arc::clone(&headers), fields));
    }
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    // -- split_line --

    #[test]
    fn split_plain_fields() {
        assert_eq!(split_line("a,b,c"), strings(&["a", "b", "c"]));
    }

    #[test]
    fn split_quoted_comma_is_literal() {
        assert_eq!(split_line("a,\"b,c\",d"), strings(&["a", "b,c", "d"]));
    }

    #[test]
    fn split_doubled_quote_is_escaped() {
        assert_eq!(split_line("a,\"b\"\"c\",d"), strings(&["a", "b\"c", "d"]));
    }

    #[test]
    fn split_empty_line_yields_one_empty_field() {
        assert_eq!(split_line(""), strings(&[""]));
    }

    #[test]
    fn split_trailing_comma_yields_trailing_empty_field() {
        assert_eq!(split_line("a,b,"), strings(&["a", "b", ""]));
        assert_eq!(split_line(","), strings(&["", ""]));
    }

    #[test]
    fn split_unterminated_quote_runs_to_end_of_line() {
        assert_eq!(split_line("a,\"b,c"), strings(&["a", "b,c"]));
    }

    #[test]
    fn split_quote_mid_field_toggles_quoting() {
        assert_eq!(split_line("ab\"c,d\"e,f"), strings(&["abc,de", "f"]));
    }

    #[test]
    fn split_empty_quoted_field() {
        assert_eq!(split_line("\"\",x"), strings(&["", "x"]));
    }

    #[test]
    fn split_keeps_whitespace() {
        assert_eq!(split_line(" a , b "), strings(&[" a ", " b "]));
    }

    // -- parse --

    #[test]
    fn parse_two_records() {
        let records = parse("name,count\nAlice,3\nBob,5\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("name"), Some("Alice"));
        assert_eq!(records[0].get("count"), Some("3"));
        assert_eq!(records[1].get("name"), Some("Bob"));
        assert_eq!(records[1].get("count"), Some("5"));
    }

    #[test]
    fn parse_crlf_line_endings() {
        let records = parse("name,count\r\nAlice,3\r\nBob,5\r\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("count"), Some("3"));
        assert_eq!(records[1].get("count"), Some("5"));
    }

    #[test]
    fn parse_skips_blank_lines() {
        let records = parse("\n\nname,count\n\nAlice,3\n\n\nBob,5\n\n");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].get("name"), Some("Bob"));
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse("\n\r\n\n").is_empty());
    }

    #[test]
    fn parse_header_only() {
        assert!(parse("name,count\n").is_empty());
    }

    #[test]
    fn parse_pads_short_rows() {
        let records = parse("a,b,c\n1\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("a"), Some("1"));
        assert_eq!(records[0].get("b"), Some(""));
        assert_eq!(records[0].get("c"), Some(""));
    }

    #[test]
    fn parse_drops_extra_fields() {
        let records = parse("a,b\n1,2,3,4\n");
        let pairs: Vec<(&str, &str)> = records[0].iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn parse_missing_column_is_none() {
        let records = parse("a,b\n1,2\n");
        assert_eq!(records[0].get("zzz"), None);
        assert!(records[0].has_column("a"));
        assert!(!records[0].has_column("zzz"));
    }

    #[test]
    fn parse_duplicate_header_last_wins() {
        let records = parse("x,y,x\n1,2,3\n");
        assert_eq!(records[0].get("x"), Some("3"));
        assert_eq!(records[0].headers().len(), 3);
    }

    #[test]
    fn parse_quoted_fields_in_rows() {
        let records = parse("name,team\n\"Smith, John\",\"The \"\"Best\"\"\"\n");
        assert_eq!(records[0].get("name"), Some("Smith, John"));
        assert_eq!(records[0].get("team"), Some("The \"Best\""));
    }

    #[test]
    fn parse_strips_leading_bom() {
        let records = parse("\u{feff}name,count\nAlice,3\n");
        assert_eq!(records[0].headers(), ["name", "count"]);
        assert_eq!(records[0].get("name"), Some("Alice"));
    }

    #[test]
    fn parse_keeps_bom_inside_fields() {
        let records = parse("name\n\u{feff}Alice\n");
        assert_eq!(records[0].get("name"), Some("\u{feff}Alice"));
    }

    #[test]
    fn parse_whitespace_line_is_not_blank() {
        let records = parse("a,b\n   \n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("a"), Some("   "));
        assert_eq!(records[0].get("b"), Some(""));
    }
}
