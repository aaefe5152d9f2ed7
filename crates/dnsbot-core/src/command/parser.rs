//! Command argument parsing
//!
//! Splits raw message text into positional tokens and decides whether the
//! command carries arguments. That single verdict picks between showing
//! usage text and executing; no command runs partially.

/// A parsed chat command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    tokens: Vec<String>,
    has_arguments: bool,
}

impl CommandInvocation {
    /// All whitespace-separated tokens, command name first
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// True iff at least one token follows the command name
    pub fn has_arguments(&self) -> bool {
        self.has_arguments
    }

    /// Command name without the leading `/` and any `@botname` suffix,
    /// lowercased. `None` when the text is not a command.
    pub fn command(&self) -> Option<String> {
        let first = self.tokens.first()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        if name.is_empty() {
            return None;
        }
        Some(name.to_lowercase())
    }

    /// Tokens after the command name
    pub fn args(&self) -> &[String] {
        self.tokens.get(1..).unwrap_or(&[])
    }

    /// Argument at `index` (0 = first argument after the command name)
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args().get(index).map(String::as_str)
    }
}

/// Parse raw message text
pub fn parse(raw_text: &str) -> CommandInvocation {
    let tokens: Vec<String> = raw_text.split_whitespace().map(str::to_string).collect();
    let has_arguments = tokens.len() > 1;

    CommandInvocation {
        tokens,
        has_arguments,
    }
}

/// Integer parsing with prefix semantics
///
/// Leading whitespace and one sign are accepted, digits are consumed up to
/// the first non-digit, and anything after is ignored. Input with no leading
/// digits yields `None`. `"300s"` parses as 300, `"abc"` does not parse.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_command_has_no_arguments() {
        let invocation = parse("/createdns");
        assert!(!invocation.has_arguments());
        assert_eq!(invocation.tokens().len(), 1);
        assert!(invocation.args().is_empty());
        assert_eq!(invocation.command().as_deref(), Some("createdns"));
    }

    #[test]
    fn full_command_has_arguments() {
        let invocation = parse("/createdns example.com A @ 1.2.3.4");
        assert!(invocation.has_arguments());
        assert_eq!(invocation.tokens().len(), 5);
        assert_eq!(invocation.args(), ["example.com", "A", "@", "1.2.3.4"]);
        assert_eq!(invocation.arg(2), Some("@"));
        assert_eq!(invocation.arg(4), None);
    }

    #[test]
    fn repeated_whitespace_is_one_separator() {
        let invocation = parse("  /deletedns   example.com\t@  A \n");
        assert_eq!(invocation.args(), ["example.com", "@", "A"]);
    }

    #[test]
    fn trailing_whitespace_alone_is_not_an_argument() {
        assert!(!parse("/updatedns   ").has_arguments());
        assert!(!parse("").has_arguments());
    }

    #[test]
    fn command_name_strips_bot_mention() {
        assert_eq!(
            parse("/ListDNS@zone_bot example.com").command().as_deref(),
            Some("listdns")
        );
        assert_eq!(parse("hello there").command(), None);
        assert_eq!(parse("/").command(), None);
    }

    #[test]
    fn leading_int_parsing() {
        assert_eq!(parse_leading_int("3600"), Some(3600));
        assert_eq!(parse_leading_int("  120"), Some(120));
        assert_eq!(parse_leading_int("300s"), Some(300));
        assert_eq!(parse_leading_int("10.5"), Some(10));
        assert_eq!(parse_leading_int("-5"), Some(-5));
        assert_eq!(parse_leading_int("+7"), Some(7));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("x10"), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int(""), None);
    }
}
